pub mod cart;
pub mod gateway;
pub mod partition;
pub mod service;

pub use cart::{CartLine, CheckoutError, ResolvedLine};
pub use gateway::MockPaymentGateway;
pub use partition::StorePartition;
pub use service::{CheckoutOutcome, CheckoutRequest, CheckoutRules, CheckoutService};
