use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    /// Build a pool without touching the network. Used by tests that only
    /// need a pool-shaped value.
    pub fn new_lazy(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(connection_string)?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Overlay business-rule overrides stored in the database on top of the
    /// configured defaults. Rows are {rule_key, rule_value} with the value
    /// wrapped as {"value": ...}.
    pub async fn fetch_business_rules(
        &self,
        defaults: crate::app_config::BusinessRules,
    ) -> Result<crate::app_config::BusinessRules, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct RuleRow {
            rule_key: String,
            rule_value: Value,
        }

        let rows = sqlx::query_as::<_, RuleRow>("SELECT rule_key, rule_value FROM business_rules")
            .fetch_all(&self.pool)
            .await?;

        let mut rules = defaults;

        for row in rows {
            let val = row.rule_value;

            if let Some(v) = val.get("value") {
                match row.rule_key.as_str() {
                    "currency" => {
                        if let Some(s) = v.as_str() {
                            rules.currency = s.to_string();
                        }
                    }
                    "shipping_fee_cents" => {
                        if let Some(n) = v.as_i64() {
                            rules.shipping_fee_cents = n;
                        }
                    }
                    "commission_rate_basic" => {
                        if let Some(f) = v.as_f64() {
                            rules.commission_rate_basic = f;
                        }
                    }
                    "commission_rate_growth" => {
                        if let Some(f) = v.as_f64() {
                            rules.commission_rate_growth = f;
                        }
                    }
                    "commission_rate_pro" => {
                        if let Some(f) = v.as_f64() {
                            rules.commission_rate_pro = f;
                        }
                    }
                    "verification_link_ttl_seconds" => {
                        if let Some(u) = v.as_u64() {
                            rules.verification_link_ttl_seconds = u;
                        }
                    }
                    "notify_max_attempts" => {
                        if let Some(u) = v.as_u64() {
                            rules.notify_max_attempts = u as u32;
                        }
                    }
                    "notify_backoff_ms" => {
                        if let Some(u) = v.as_u64() {
                            rules.notify_backoff_ms = u;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(rules)
    }
}
