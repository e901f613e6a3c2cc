use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan tier. Selects the platform commission rate applied to
/// every sale the store makes while on that tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Basic,
    Growth,
    Pro,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Basic => "BASIC",
            SubscriptionTier::Growth => "GROWTH",
            SubscriptionTier::Pro => "PRO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BASIC" => Some(SubscriptionTier::Basic),
            "GROWTH" => Some(SubscriptionTier::Growth),
            "PRO" => Some(SubscriptionTier::Pro),
            _ => None,
        }
    }
}

/// Commission rates per tier, as fractions in [0, 1).
///
/// Defaults follow the standard plan sheet; deployments override them through
/// configuration or the business_rules table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRates {
    pub basic: f64,
    pub growth: f64,
    pub pro: f64,
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self {
            basic: 0.15,
            growth: 0.10,
            pro: 0.05,
        }
    }
}

impl CommissionRates {
    pub fn rate_for(&self, tier: SubscriptionTier) -> f64 {
        match tier {
            SubscriptionTier::Basic => self.basic,
            SubscriptionTier::Growth => self.growth,
            SubscriptionTier::Pro => self.pro,
        }
    }

    /// Every rate must be a fraction in [0, 1); a rate of 1.0 or more would
    /// let the platform's cut exceed the sale itself.
    pub fn validate(&self) -> Result<(), StoreError> {
        for rate in [self.basic, self.growth, self.pro] {
            if !(0.0..1.0).contains(&rate) {
                return Err(StoreError::InvalidCommissionRate(rate));
            }
        }
        Ok(())
    }
}

/// A seller's shop. Owns products and receives one order per checkout that
/// contains any of its products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub tier: SubscriptionTier,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store not found: {0}")]
    NotFound(String),

    #[error("Commission rate out of range [0, 1): {0}")]
    InvalidCommissionRate(f64),
}
