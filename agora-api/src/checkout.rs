use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthClaims;
use crate::orders::OrderResponse;
use crate::state::AppState;
use agora_checkout::{CartLine, CheckoutRequest};
use agora_order::models::ShippingAddress;
use agora_shared::models::events::CheckoutCompletedEvent;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub items: Vec<CartLineBody>,
    pub shipping_address: ShippingAddressBody,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartLineBody {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct ShippingAddressBody {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub order_id: Uuid,
    pub preference_id: String,
    pub redirect_url: String,
    pub sandbox_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_id: Uuid,
    pub orders: Vec<OrderResponse>,
    pub payments: Vec<PaymentResponse>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/checkout", post(create_checkout))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/checkout
/// The fan-out operation: one order per store in the cart, written
/// atomically, each with a payment redirect from the gateway.
async fn create_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let buyer_id = claims.profile_id()?;

    let request = CheckoutRequest {
        buyer_id,
        lines: body
            .items
            .iter()
            .map(|line| CartLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect(),
        shipping_address: ShippingAddress {
            name: body.shipping_address.name,
            line1: body.shipping_address.line1,
            line2: body.shipping_address.line2,
            city: body.shipping_address.city,
            postal_code: body.shipping_address.postal_code,
            country: body.shipping_address.country,
        },
        coupon_code: body.coupon_code,
    };

    let outcome = state.checkout.checkout(request).await?;

    let _ = state
        .telemetry
        .log_checkout_completed(CheckoutCompletedEvent {
            checkout_id: outcome.checkout_id,
            buyer_id,
            order_ids: outcome.orders.iter().map(|order| order.id).collect(),
            store_count: outcome.orders.len(),
            grand_total_cents: outcome.orders.iter().map(|order| order.total_cents).sum(),
            timestamp: chrono::Utc::now().timestamp(),
        })
        .await;

    Ok(Json(CheckoutResponse {
        checkout_id: outcome.checkout_id,
        orders: outcome.orders.into_iter().map(OrderResponse::from).collect(),
        payments: outcome
            .payments
            .into_iter()
            .map(|preference| PaymentResponse {
                order_id: preference.order_id,
                preference_id: preference.id,
                redirect_url: preference.redirect_url,
                sandbox_url: preference.sandbox_url,
            })
            .collect(),
    }))
}
