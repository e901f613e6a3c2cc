use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    /// `value` is a whole percentage, e.g. 10 for 10% off.
    Percent,
    /// `value` is an amount in cents.
    Fixed,
}

impl CouponKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Percent => "PERCENT",
            CouponKind::Fixed => "FIXED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PERCENT" => Some(CouponKind::Percent),
            "FIXED" => Some(CouponKind::Fixed),
            _ => None,
        }
    }
}

/// A discount code. Store-scoped coupons only apply to that store's order
/// within a checkout; global coupons (store_id = None) apply to every order
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub store_id: Option<Uuid>,
    pub kind: CouponKind,
    pub value: i64,
    pub min_subtotal_cents: i64,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Coupon {
    /// Discount in cents for one store's order, or why the coupon does not
    /// apply. The discount never exceeds the subtotal.
    pub fn discount_for(
        &self,
        store_id: Uuid,
        subtotal_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive);
        }
        if let Some(scope) = self.store_id {
            if scope != store_id {
                return Err(CouponError::WrongStore);
            }
        }
        if let Some(starts_at) = self.starts_at {
            if now < starts_at {
                return Err(CouponError::NotYetActive);
            }
        }
        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return Err(CouponError::Expired);
            }
        }
        if subtotal_cents < self.min_subtotal_cents {
            return Err(CouponError::MinSubtotalNotMet {
                required: self.min_subtotal_cents,
                actual: subtotal_cents,
            });
        }

        let discount = match self.kind {
            CouponKind::Percent => subtotal_cents * self.value.clamp(0, 100) / 100,
            CouponKind::Fixed => self.value.max(0),
        };
        Ok(discount.min(subtotal_cents))
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("Coupon is not active")]
    Inactive,

    #[error("Coupon is not valid yet")]
    NotYetActive,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon does not apply to this store")]
    WrongStore,

    #[error("Order subtotal {actual} below coupon minimum {required}")]
    MinSubtotalNotMet { required: i64, actual: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(kind: CouponKind, value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SAVE".into(),
            store_id: None,
            kind,
            value,
            min_subtotal_cents: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_percent_discount() {
        let c = coupon(CouponKind::Percent, 10);
        let discount = c.discount_for(Uuid::new_v4(), 20000, Utc::now()).unwrap();
        assert_eq!(discount, 2000);
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let c = coupon(CouponKind::Fixed, 5000);
        let discount = c.discount_for(Uuid::new_v4(), 3000, Utc::now()).unwrap();
        assert_eq!(discount, 3000);
    }

    #[test]
    fn test_store_scoping() {
        let store_id = Uuid::new_v4();
        let mut c = coupon(CouponKind::Percent, 10);
        c.store_id = Some(store_id);

        assert!(c.discount_for(store_id, 10000, Utc::now()).is_ok());
        assert_eq!(
            c.discount_for(Uuid::new_v4(), 10000, Utc::now()),
            Err(CouponError::WrongStore)
        );
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut c = coupon(CouponKind::Percent, 10);
        c.starts_at = Some(now + Duration::hours(1));
        assert_eq!(
            c.discount_for(Uuid::new_v4(), 10000, now),
            Err(CouponError::NotYetActive)
        );

        c.starts_at = None;
        c.expires_at = Some(now - Duration::hours(1));
        assert_eq!(
            c.discount_for(Uuid::new_v4(), 10000, now),
            Err(CouponError::Expired)
        );
    }

    #[test]
    fn test_minimum_subtotal() {
        let mut c = coupon(CouponKind::Fixed, 500);
        c.min_subtotal_cents = 5000;
        assert_eq!(
            c.discount_for(Uuid::new_v4(), 4999, Utc::now()),
            Err(CouponError::MinSubtotalNotMet {
                required: 5000,
                actual: 4999
            })
        );
        assert_eq!(c.discount_for(Uuid::new_v4(), 5000, Utc::now()).unwrap(), 500);
    }

    #[test]
    fn test_inactive_coupon() {
        let mut c = coupon(CouponKind::Percent, 10);
        c.is_active = false;
        assert_eq!(
            c.discount_for(Uuid::new_v4(), 10000, Utc::now()),
            Err(CouponError::Inactive)
        );
    }
}
