use crate::models::Order;
use agora_catalog::store::{CommissionRates, StoreError, SubscriptionTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Computes the platform's cut per order line.
///
/// Rates come from the store's subscription tier at the moment the order is
/// written; the resulting amounts are stored and never recomputed, so later
/// tier changes leave historic orders untouched.
#[derive(Debug, Clone)]
pub struct CommissionPolicy {
    rates: CommissionRates,
}

impl CommissionPolicy {
    pub fn new(rates: CommissionRates) -> Result<Self, StoreError> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rate_for(&self, tier: SubscriptionTier) -> f64 {
        self.rates.rate_for(tier)
    }

    /// Commission in cents for one order line: round(line total × rate),
    /// clamped to the line total. With rates below 1.0 the clamp only
    /// matters for rounding at the boundary, but the invariant is cheap to
    /// state exactly once here.
    pub fn commission_for(&self, unit_price_cents: i64, quantity: i32, tier: SubscriptionTier) -> i64 {
        let line_total = unit_price_cents * quantity as i64;
        let amount = (line_total as f64 * self.rate_for(tier)).round() as i64;
        amount.min(line_total)
    }
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        Self {
            rates: CommissionRates::default(),
        }
    }
}

/// Append-only record of the commission charged for one order item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_item_id: Uuid,
    pub store_id: Uuid,
    pub rate: f64,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Gross / commission / net split for one order, derived from its stored
/// item amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub order_id: Uuid,
    pub store_id: Uuid,
    pub gross_cents: i64,
    pub commission_cents: i64,
    pub net_cents: i64,
}

/// Derive the settlement split for an order from its items. Shipping is
/// collected on the seller's behalf and is not commissioned.
pub fn settle(order: &Order) -> SettlementSummary {
    let gross: i64 = order.items.iter().map(|item| item.total_cents).sum();
    let commission: i64 = order.items.iter().map(|item| item.commission_cents).sum();
    SettlementSummary {
        order_id: order.id,
        store_id: order.store_id,
        gross_cents: gross,
        commission_cents: commission,
        net_cents: gross - commission,
    }
}
