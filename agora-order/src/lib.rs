pub mod finance;
pub mod lifecycle;
pub mod models;

pub use finance::{CommissionPolicy, CommissionRecord, SettlementSummary};
pub use lifecycle::{Actor, LifecycleError};
pub use models::{CheckoutDraft, Order, OrderDraft, OrderItem, OrderItemDraft, OrderStatus, ShippingAddress};
