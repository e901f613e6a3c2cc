use crate::BoxError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the gateway hands back for one order. The URLs are passed through
/// to the client unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPreference {
    /// Provider's ID (e.g. pref_123)
    pub id: String,
    pub order_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub redirect_url: String,
    pub sandbox_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a gateway callback, as reported by the webhook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Approved,
    Rejected,
    Cancelled,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Ask the provider for a checkout redirect for one order.
    async fn create_preference(
        &self,
        order_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentPreference, BoxError>;
}
