use agora_catalog::store::CommissionRates;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub shipping_fee_cents: i64,
    #[serde(default = "default_rate_basic")]
    pub commission_rate_basic: f64,
    #[serde(default = "default_rate_growth")]
    pub commission_rate_growth: f64,
    #[serde(default = "default_rate_pro")]
    pub commission_rate_pro: f64,
    #[serde(default = "default_link_ttl")]
    pub verification_link_ttl_seconds: u64,
    #[serde(default = "default_notify_attempts")]
    pub notify_max_attempts: u32,
    #[serde(default = "default_notify_backoff")]
    pub notify_backoff_ms: u64,
}

fn default_currency() -> String {
    "USD".to_string()
}
fn default_rate_basic() -> f64 {
    0.15
}
fn default_rate_growth() -> f64 {
    0.10
}
fn default_rate_pro() -> f64 {
    0.05
}
fn default_link_ttl() -> u64 {
    86_400
}
fn default_notify_attempts() -> u32 {
    3
}
fn default_notify_backoff() -> u64 {
    500
}

impl BusinessRules {
    pub fn commission_rates(&self) -> CommissionRates {
        CommissionRates {
            basic: self.commission_rate_basic,
            growth: self.commission_rate_growth,
            pro: self.commission_rate_pro,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default = "default_topic")]
    pub telemetry_topic: String,
}

fn default_topic() -> String {
    "agora.telemetry".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Settings from the environment (with a prefix of AGORA)
            // E.g. `AGORA__SERVER__PORT=8081` sets `server.port`
            .add_source(config::Environment::with_prefix("AGORA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
