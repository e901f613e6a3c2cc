pub mod notify;
pub mod payment;
pub mod repository;

/// Boxed error type used across repository seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
