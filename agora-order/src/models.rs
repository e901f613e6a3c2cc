use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the lifecycle. Transitions are enforced by
/// [`crate::lifecycle`]; no code writes a status without going through it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "PAID" => Some(OrderStatus::Paid),
            "PROCESSING" => Some(OrderStatus::Processing),
            "SHIPPED" => Some(OrderStatus::Shipped),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Shipping address snapshot taken at checkout. Profile edits after the fact
/// never change where a placed order ships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// One store's slice of a checkout. A cart spanning N stores produces N of
/// these, all sharing a checkout_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub checkout_id: Uuid,
    pub buyer_id: Uuid,
    pub store_id: Uuid,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Invariant check: item totals sum to the subtotal and the total is
    /// subtotal + shipping − discount, floored at zero.
    pub fn totals_consistent(&self) -> bool {
        let item_sum: i64 = self.items.iter().map(|item| item.total_cents).sum();
        item_sum == self.subtotal_cents
            && self.total_cents
                == (self.subtotal_cents + self.shipping_cents - self.discount_cents).max(0)
    }
}

/// An order line. Title, image and unit price are snapshots taken at
/// creation so later product edits don't alter historic orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub total_cents: i64,
    pub commission_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Draft of one store's order, assembled in memory before the checkout
/// transaction persists all drafts of the checkout as a unit.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub store_id: Uuid,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub items: Vec<OrderItemDraft>,
}

#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub total_cents: i64,
    pub commission_rate: f64,
    pub commission_cents: i64,
}

/// Everything the order writer persists atomically for one checkout.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub checkout_id: Uuid,
    pub buyer_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub orders: Vec<OrderDraft>,
}

impl CheckoutDraft {
    pub fn grand_total_cents(&self) -> i64 {
        self.orders.iter().map(|order| order.total_cents).sum()
    }
}
