use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct CheckoutCompletedEvent {
    pub checkout_id: Uuid,
    pub buyer_id: Uuid,
    pub order_ids: Vec<Uuid>,
    pub store_count: usize,
    pub grand_total_cents: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderPaidEvent {
    pub order_id: Uuid,
    pub checkout_id: Uuid,
    pub buyer_id: Uuid,
    pub store_id: Uuid,
    pub total_cents: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderStatusChangedEvent {
    pub order_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub actor: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SettlementEvent {
    pub order_id: Uuid,
    pub store_id: Uuid,
    pub gross_cents: i64,
    pub commission_cents: i64,
    pub net_cents: i64,
    pub event_type: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SellerApprovedEvent {
    pub request_id: Uuid,
    pub profile_id: Uuid,
    pub decided_by: String,
    pub timestamp: i64,
}
