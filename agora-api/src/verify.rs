use axum::{
    extract::{Path, State},
    routing::get,
    Form, Json, Router,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::sellers::{apply_decision, VerificationResponse};
use crate::state::AppState;
use agora_catalog::verification::Decision;

/// Claims embedded in a verification magic link. Distinct from session
/// tokens via `purpose` so a leaked link can't be replayed as a login.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyLinkClaims {
    /// Verification request id.
    pub sub: String,
    pub purpose: String,
    /// Admin profile id the link was minted for.
    pub issued_by: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
pub struct RejectForm {
    pub reason: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/verify/{token}", get(approve_via_link).post(reject_via_link))
}

fn decode_link(state: &AppState, token: &str) -> Result<(Uuid, String), AppError> {
    let token_data = decode::<VerifyLinkClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthenticationError("Invalid or expired link".to_string()))?;

    if token_data.claims.purpose != "verification" {
        return Err(AppError::AuthenticationError("Invalid link".to_string()));
    }

    let request_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::AuthenticationError("Invalid link".to_string()))?;
    Ok((request_id, token_data.claims.issued_by))
}

/// GET /v1/verify/{token}
/// Link-click approval entry point into the shared decision path.
async fn approve_via_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<VerificationResponse>, AppError> {
    let (request_id, issued_by) = decode_link(&state, &token)?;
    let decided_by = format!("LINK:{}", issued_by);

    let request = apply_decision(&state, request_id, Decision::Approve, None, &decided_by).await?;
    Ok(Json(VerificationResponse::from(request)))
}

/// POST /v1/verify/{token}
/// Form-based rejection with a reason, same decision path.
async fn reject_via_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<RejectForm>,
) -> Result<Json<VerificationResponse>, AppError> {
    let (request_id, issued_by) = decode_link(&state, &token)?;
    if form.reason.trim().is_empty() {
        return Err(AppError::ValidationError(
            "A rejection reason is required".to_string(),
        ));
    }
    let decided_by = format!("LINK:{}", issued_by);

    let request = apply_decision(
        &state,
        request_id,
        Decision::Reject,
        Some(form.reason.trim()),
        &decided_by,
    )
    .await?;
    Ok(Json(VerificationResponse::from(request)))
}
