pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod events;
pub mod notifier;
pub mod order_repo;
pub mod redis_repo;
pub mod seller_repo;

pub use catalog_repo::PgCatalogRepository;
pub use database::DbClient;
pub use events::{EventProducer, Telemetry};
pub use notifier::{LogDispatcher, RetryingDispatcher};
pub use order_repo::PgOrderRepository;
pub use redis_repo::RedisClient;
pub use seller_repo::PgSellerRepository;
