use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthClaims;
use crate::state::AppState;
use agora_catalog::verification::{Decision, VerificationRequest};
use agora_core::notify::Notification;
use agora_shared::models::events::SellerApprovedEvent;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub store_name: String,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub store_name: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub decided_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<VerificationRequest> for VerificationResponse {
    fn from(request: VerificationRequest) -> Self {
        Self {
            id: request.id,
            profile_id: request.profile_id,
            store_name: request.store_name,
            status: request.status.as_str().to_owned(),
            rejection_reason: request.rejection_reason,
            submitted_at: request.submitted_at,
            decided_at: request.decided_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/sellers/apply", post(apply))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/sellers/apply
/// Submit a verification request, or resubmit a rejected one.
async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<VerificationResponse>, AppError> {
    if req.store_name.trim().is_empty() {
        return Err(AppError::ValidationError("Store name is required".to_string()));
    }

    let request = state
        .sellers
        .submit_request(claims.profile_id()?, req.store_name.trim(), req.message.as_deref())
        .await?;

    Ok(Json(VerificationResponse::from(request)))
}

// ============================================================================
// Shared decision path
// ============================================================================

/// The one decision function. Both entry points (the admin JSON endpoint and
/// the magic-link flow) end up here, so the business rules cannot diverge:
/// the repository applies the state machine and the two-table update in a
/// single transaction, then telemetry and the applicant notification follow.
pub(crate) async fn apply_decision(
    state: &AppState,
    request_id: Uuid,
    decision: Decision,
    reason: Option<&str>,
    decided_by: &str,
) -> Result<VerificationRequest, AppError> {
    let request = state
        .sellers
        .decide_request(request_id, decision, reason, decided_by)
        .await?;

    if decision == Decision::Approve {
        let _ = state
            .telemetry
            .log_seller_approved(SellerApprovedEvent {
                request_id: request.id,
                profile_id: request.profile_id,
                decided_by: decided_by.to_string(),
                timestamp: chrono::Utc::now().timestamp(),
            })
            .await;
    }

    if let Ok(Some(profile)) = state.sellers.get_profile(request.profile_id).await {
        let (subject, body) = match decision {
            Decision::Approve => (
                "Your store is approved".to_string(),
                format!(
                    "Congratulations! {} is now a verified store on Agora.",
                    request.store_name
                ),
            ),
            Decision::Reject => (
                "Your seller application was not approved".to_string(),
                format!(
                    "Reason: {}",
                    request.rejection_reason.as_deref().unwrap_or("not specified")
                ),
            ),
        };
        if let Err(e) = state
            .notifier
            .dispatch(&Notification {
                to: profile.email,
                subject,
                body,
            })
            .await
        {
            tracing::warn!(request_id = %request.id, "Applicant notification failed: {}", e);
        }
    }

    Ok(request)
}
