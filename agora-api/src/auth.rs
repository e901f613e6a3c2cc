use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::AuthClaims, state::AppState};
use agora_shared::models::profile::Role;

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    profile_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

/// Issue a guest buyer identity. Real sign-in lives with the external
/// identity provider, which mints tokens against the same secret.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let guest_tag = Uuid::new_v4().simple().to_string();
    let profile = state
        .sellers
        .create_profile(
            &format!("guest-{}@guest.agora.local", guest_tag),
            &format!("Guest {}", &guest_tag[..8]),
            Role::Buyer,
        )
        .await?;

    let claims = AuthClaims {
        sub: profile.id.to_string(),
        email: Some(profile.email.clone()),
        role: profile.role.as_str().to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        profile_id: profile.id,
    }))
}
