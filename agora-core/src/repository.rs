use crate::BoxError;
use agora_catalog::coupon::Coupon;
use agora_catalog::product::Product;
use agora_catalog::store::Store;
use agora_catalog::verification::{Decision, VerificationRequest, VerificationStatus};
use agora_order::models::{CheckoutDraft, Order, OrderStatus};
use agora_shared::models::profile::{Profile, Role};
use async_trait::async_trait;
use uuid::Uuid;

/// Fields a seller may change on a product. `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &Product) -> Result<(), BoxError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, BoxError>;

    async fn list_products(
        &self,
        store_id: Option<Uuid>,
        only_active: bool,
    ) -> Result<Vec<Product>, BoxError>;

    async fn update_product(&self, id: Uuid, patch: &ProductPatch) -> Result<(), BoxError>;

    /// Soft delete: the row stays (historic order items reference it) but
    /// the product stops being orderable or listed.
    async fn deactivate_product(&self, id: Uuid) -> Result<(), BoxError>;
}

/// Repository trait for store data access
#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn get_store(&self, id: Uuid) -> Result<Option<Store>, BoxError>;

    async fn get_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>, BoxError>;

    async fn create_store(&self, store: &Store) -> Result<(), BoxError>;
}

/// Repository trait for coupon lookup
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, BoxError>;
}

/// Why the checkout transaction could not commit.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutWriteError {
    /// The conditional stock decrement matched no row: someone else took
    /// the stock between validation and write, or the product vanished.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    StockConflict {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Checkout storage failed: {0}")]
    Backend(#[source] BoxError),
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist every order of a checkout, their items, their commission
    /// records, and the matching stock decrements in ONE transaction.
    /// Any stock conflict or insert failure aborts the whole checkout.
    async fn create_checkout(&self, draft: &CheckoutDraft) -> Result<Vec<Order>, CheckoutWriteError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, BoxError>;

    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, BoxError>;

    async fn list_orders_for_checkout(&self, checkout_id: Uuid) -> Result<Vec<Order>, BoxError>;

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), BoxError>;

    /// Append an audit row for an order mutation.
    async fn add_order_change(
        &self,
        order_id: Uuid,
        change_type: &str,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
        actor: &str,
        note: Option<&str>,
    ) -> Result<(), BoxError>;
}

/// Repository trait for profiles and the seller verification queue.
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn create_profile(
        &self,
        email: &str,
        display_name: &str,
        role: Role,
    ) -> Result<Profile, BoxError>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, BoxError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, BoxError>;

    /// Submit a new request, or resubmit the caller's rejected one.
    async fn submit_request(
        &self,
        profile_id: Uuid,
        store_name: &str,
        message: Option<&str>,
    ) -> Result<VerificationRequest, BoxError>;

    async fn get_request(&self, id: Uuid) -> Result<Option<VerificationRequest>, BoxError>;

    async fn list_requests(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<VerificationRequest>, BoxError>;

    /// The single decision function both the JSON and the magic-link entry
    /// points call: validates the state machine, then updates the request
    /// and the applicant's profile/store flags in one transaction.
    async fn decide_request(
        &self,
        request_id: Uuid,
        decision: Decision,
        reason: Option<&str>,
        decided_by: &str,
    ) -> Result<VerificationRequest, BoxError>;
}
