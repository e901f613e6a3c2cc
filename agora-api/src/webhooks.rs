use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use agora_core::notify::Notification;
use agora_order::finance;
use agora_order::lifecycle::{authorize_transition, Actor};
use agora_order::models::{Order, OrderStatus};
use agora_shared::models::events::{OrderPaidEvent, SettlementEvent};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    pub checkout_id: Uuid,
    pub status: String,
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub processed: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payment", post(payment_webhook))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/webhooks/payment
/// Gateway callback for a checkout. On approval every still-pending order of
/// the checkout is marked paid (through the lifecycle guard), settlement
/// telemetry is published, and buyer and sellers are notified once each.
async fn payment_webhook(
    State(state): State<AppState>,
    Json(hook): Json<PaymentWebhook>,
) -> Result<Json<WebhookResponse>, AppError> {
    if hook.status != "APPROVED" {
        tracing::info!(
            checkout_id = %hook.checkout_id,
            status = %hook.status,
            "Ignoring non-approved payment callback"
        );
        return Ok(Json(WebhookResponse { processed: 0 }));
    }

    let orders = state.orders.list_orders_for_checkout(hook.checkout_id).await?;
    if orders.is_empty() {
        return Err(AppError::NotFoundError(format!(
            "No orders for checkout {}",
            hook.checkout_id
        )));
    }

    let mut paid: Vec<Order> = Vec::new();
    for order in orders {
        if order.status != OrderStatus::Pending {
            // Replayed callback or an already-cancelled order; skip quietly.
            continue;
        }
        authorize_transition(Actor::System, order.status, OrderStatus::Paid)?;
        state
            .orders
            .update_order_status(order.id, OrderStatus::Paid)
            .await?;

        let _ = state
            .orders
            .add_order_change(
                order.id,
                "PAYMENT_RECEIVED",
                Some(serde_json::json!({ "status": OrderStatus::Pending.as_str() })),
                Some(serde_json::json!({ "status": OrderStatus::Paid.as_str() })),
                "SYSTEM",
                hook.reference.as_deref(),
            )
            .await;

        let _ = state
            .telemetry
            .log_order_paid(OrderPaidEvent {
                order_id: order.id,
                checkout_id: order.checkout_id,
                buyer_id: order.buyer_id,
                store_id: order.store_id,
                total_cents: order.total_cents,
                timestamp: chrono::Utc::now().timestamp(),
            })
            .await;

        let summary = finance::settle(&order);
        let _ = state
            .telemetry
            .log_settlement(SettlementEvent {
                order_id: order.id,
                store_id: order.store_id,
                gross_cents: summary.gross_cents,
                commission_cents: summary.commission_cents,
                net_cents: summary.net_cents,
                event_type: "PAYMENT".to_string(),
                timestamp: chrono::Utc::now().timestamp(),
            })
            .await;

        paid.push(order);
    }

    if !paid.is_empty() {
        notify_parties(&state, &paid).await;
    }

    Ok(Json(WebhookResponse { processed: paid.len() }))
}

/// One notification to the buyer for the whole checkout, one per affected
/// seller. Failures are logged; the callback has already been honored.
async fn notify_parties(state: &AppState, paid: &[Order]) {
    let buyer_id = paid[0].buyer_id;
    let grand_total: i64 = paid.iter().map(|order| order.total_cents).sum();

    match state.sellers.get_profile(buyer_id).await {
        Ok(Some(buyer)) => {
            let notification = Notification {
                to: buyer.email,
                subject: "Payment confirmed".to_string(),
                body: format!(
                    "Your payment of {} cents across {} order(s) is confirmed.",
                    grand_total,
                    paid.len()
                ),
            };
            if let Err(e) = state.notifier.dispatch(&notification).await {
                tracing::warn!(buyer_id = %buyer_id, "Buyer notification failed: {}", e);
            }
        }
        Ok(None) => tracing::warn!(buyer_id = %buyer_id, "Buyer profile missing"),
        Err(e) => tracing::warn!(buyer_id = %buyer_id, "Buyer lookup failed: {}", e),
    }

    let store_ids: HashSet<Uuid> = paid.iter().map(|order| order.store_id).collect();
    for store_id in store_ids {
        let seller_email = match state.stores.get_store(store_id).await {
            Ok(Some(store)) => match state.sellers.get_profile(store.owner_id).await {
                Ok(Some(owner)) => Some(owner.email),
                _ => None,
            },
            _ => None,
        };

        let Some(email) = seller_email else {
            tracing::warn!(store_id = %store_id, "Seller lookup failed; skipping notification");
            continue;
        };

        let store_orders: Vec<&Order> = paid.iter().filter(|o| o.store_id == store_id).collect();
        let notification = Notification {
            to: email,
            subject: "New paid order".to_string(),
            body: format!(
                "You have {} new paid order(s) awaiting fulfillment.",
                store_orders.len()
            ),
        };
        if let Err(e) = state.notifier.dispatch(&notification).await {
            tracing::warn!(store_id = %store_id, "Seller notification failed: {}", e);
        }
    }
}
