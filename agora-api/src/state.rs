use agora_checkout::CheckoutService;
use agora_core::notify::NotificationDispatcher;
use agora_core::repository::{
    OrderRepository, ProductRepository, StoreRepository, VerificationRepository,
};
use agora_db::app_config::BusinessRules;
use agora_db::{DbClient, RedisClient, Telemetry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbClient>,
    pub redis: Arc<RedisClient>,
    pub products: Arc<dyn ProductRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub sellers: Arc<dyn VerificationRepository>,
    pub checkout: Arc<CheckoutService>,
    pub telemetry: Arc<Telemetry>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub auth: AuthConfig,
    pub rules: BusinessRules,
}
