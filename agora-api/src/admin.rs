use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthClaims;
use crate::sellers::{apply_decision, VerificationResponse};
use crate::state::AppState;
use crate::verify::VerifyLinkClaims;
use agora_catalog::verification::{Decision, VerificationStatus};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListVerificationsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approve: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyLinkResponse {
    pub token: String,
    pub approve_url: String,
    pub reject_url: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/users", get(list_users))
        .route("/v1/admin/verifications", get(list_verifications))
        .route("/v1/admin/verifications/{id}/decision", post(decide_verification))
        .route("/v1/admin/verifications/{id}/link", get(verification_link))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/admin/users
async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = state.sellers.list_profiles().await?;
    Ok(Json(
        profiles
            .into_iter()
            .map(|profile| ProfileResponse {
                id: profile.id,
                email: profile.email,
                display_name: profile.display_name,
                role: profile.role.as_str().to_owned(),
                is_verified: profile.is_verified,
                created_at: profile.created_at,
            })
            .collect(),
    ))
}

/// GET /v1/admin/verifications?status=PENDING
async fn list_verifications(
    State(state): State<AppState>,
    Query(query): Query<ListVerificationsQuery>,
) -> Result<Json<Vec<VerificationResponse>>, AppError> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            VerificationStatus::parse(s)
                .ok_or_else(|| AppError::ValidationError(format!("Unknown status: {}", s)))?,
        ),
        None => None,
    };

    let requests = state.sellers.list_requests(status).await?;
    Ok(Json(requests.into_iter().map(VerificationResponse::from).collect()))
}

/// POST /v1/admin/verifications/{id}/decision
/// JSON entry point into the shared decision path.
async fn decide_verification(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<VerificationResponse>, AppError> {
    let decision = if req.approve {
        Decision::Approve
    } else {
        Decision::Reject
    };

    let request = apply_decision(
        &state,
        request_id,
        decision,
        req.reason.as_deref(),
        &claims.sub,
    )
    .await?;

    Ok(Json(VerificationResponse::from(request)))
}

/// GET /v1/admin/verifications/{id}/link
/// Mint the short-lived signed link that the review email embeds. Clicking
/// the link approves; posting the form on it rejects with a reason.
async fn verification_link(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<VerifyLinkResponse>, AppError> {
    // The request must exist before a link is handed out.
    state
        .sellers
        .get_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Request not found: {}", request_id)))?;

    let expires_at = Utc::now() + Duration::seconds(state.rules.verification_link_ttl_seconds as i64);
    let link_claims = VerifyLinkClaims {
        sub: request_id.to_string(),
        purpose: "verification".to_string(),
        issued_by: claims.sub.clone(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &link_claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(VerifyLinkResponse {
        approve_url: format!("/v1/verify/{}", token),
        reject_url: format!("/v1/verify/{}", token),
        token,
        expires_at,
    }))
}
