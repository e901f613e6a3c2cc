use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthClaims;
use crate::state::AppState;
use agora_order::lifecycle::{authorize_transition, Actor};
use agora_order::models::{Order, OrderStatus, ShippingAddress};
use agora_shared::models::events::{OrderStatusChangedEvent, SettlementEvent};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub total_cents: i64,
    pub commission_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub checkout_id: Uuid,
    pub store_id: Uuid,
    pub status: String,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItemResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            checkout_id: order.checkout_id,
            store_id: order.store_id,
            status: order.status.as_str().to_owned(),
            subtotal_cents: order.subtotal_cents,
            shipping_cents: order.shipping_cents,
            discount_cents: order.discount_cents,
            total_cents: order.total_cents,
            currency: order.currency,
            coupon_code: order.coupon_code,
            shipping_address: order.shipping_address,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    title: item.title,
                    image_url: item.image_url,
                    unit_price_cents: item.unit_price_cents,
                    quantity: item.quantity,
                    total_cents: item.total_cents,
                    commission_cents: item.commission_cents,
                })
                .collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/status", post(update_status))
        .route("/v1/orders/{id}/cancel", post(cancel_order))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/orders
/// List the caller's orders.
async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let buyer_id = claims.profile_id()?;
    let orders = state.orders.list_orders_for_buyer(buyer_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /v1/orders/{id}
/// Retrieve order details. Visible to the buyer, the selling store's owner,
/// and admins.
async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    let profile_id = claims.profile_id()?;
    let is_buyer = order.buyer_id == profile_id;
    let is_admin = claims.role == "ADMIN";
    let is_store_owner = match state.stores.get_store_by_owner(profile_id).await? {
        Some(store) => store.id == order.store_id,
        None => false,
    };

    if !(is_buyer || is_admin || is_store_owner) {
        return Err(AppError::AuthorizationError(
            "Not allowed to view this order".to_string(),
        ));
    }

    Ok(Json(OrderResponse::from(order)))
}

/// POST /v1/orders/{id}/status
/// Seller/admin transition. The target status goes through the transition
/// table and the actor's permissions before anything is written.
async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let target = OrderStatus::parse(&req.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown status: {}", req.status)))?;

    let mut order = state
        .orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    let actor = match claims.role.as_str() {
        "ADMIN" => Actor::Admin,
        "SELLER" => {
            let owns = match state.stores.get_store_by_owner(claims.profile_id()?).await? {
                Some(store) => store.id == order.store_id,
                None => false,
            };
            if !owns {
                return Err(AppError::AuthorizationError(
                    "Order belongs to a different store".to_string(),
                ));
            }
            Actor::Seller
        }
        _ => {
            return Err(AppError::AuthorizationError(
                "Only sellers and admins may set order status".to_string(),
            ))
        }
    };

    let previous = order.status;
    authorize_transition(actor, previous, target)?;
    state.orders.update_order_status(order_id, target).await?;

    let _ = state
        .orders
        .add_order_change(
            order_id,
            "STATUS_CHANGED",
            Some(serde_json::json!({ "status": previous.as_str() })),
            Some(serde_json::json!({ "status": target.as_str() })),
            &claims.role,
            None,
        )
        .await;

    let _ = state
        .telemetry
        .log_status_changed(OrderStatusChangedEvent {
            order_id,
            old_status: previous.as_str().to_owned(),
            new_status: target.as_str().to_owned(),
            actor: claims.role.clone(),
            timestamp: chrono::Utc::now().timestamp(),
        })
        .await;

    order.status = target;
    Ok(Json(OrderResponse::from(order)))
}

/// POST /v1/orders/{id}/cancel
/// Buyer cancel. Only their own order, only while it is still pending.
async fn cancel_order(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let mut order = state
        .orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    if order.buyer_id != claims.profile_id()? {
        return Err(AppError::AuthorizationError(
            "Not allowed to cancel this order".to_string(),
        ));
    }

    let previous = order.status;
    authorize_transition(Actor::Buyer, previous, OrderStatus::Cancelled)?;
    state
        .orders
        .update_order_status(order_id, OrderStatus::Cancelled)
        .await?;

    let _ = state
        .orders
        .add_order_change(
            order_id,
            "CANCELLED",
            Some(serde_json::json!({ "status": previous.as_str() })),
            Some(serde_json::json!({ "status": OrderStatus::Cancelled.as_str() })),
            "BUYER",
            Some("Order cancelled via API"),
        )
        .await;

    let _ = state
        .telemetry
        .log_settlement(SettlementEvent {
            order_id,
            store_id: order.store_id,
            gross_cents: 0,
            commission_cents: 0,
            net_cents: 0,
            event_type: "CANCELLATION".to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        })
        .await;

    order.status = OrderStatus::Cancelled;
    Ok(Json(OrderResponse::from(order)))
}
