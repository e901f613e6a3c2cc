use agora_catalog::product::ProductError;
use agora_catalog::verification::VerificationError;
use agora_checkout::CheckoutError;
use agora_core::BoxError;
use agora_order::lifecycle::LifecycleError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::EmptyCart
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::CouponNotFound(_)
            | CheckoutError::Coupon(_) => AppError::ValidationError(err.to_string()),
            CheckoutError::ProductNotFound(_) => AppError::NotFoundError(err.to_string()),
            CheckoutError::OutOfStock { .. } => AppError::ConflictError(err.to_string()),
            CheckoutError::StoreNotFound(_) | CheckoutError::Storage(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match &err {
            LifecycleError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
            LifecycleError::NotPermitted { .. } => AppError::AuthorizationError(err.to_string()),
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match &err {
            VerificationError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            VerificationError::AlreadyDecided { .. } | VerificationError::NotRejected { .. } => {
                AppError::ConflictError(err.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Repository seams return boxed errors; recover the domain errors we know
/// how to map before falling back to a 500.
impl From<BoxError> for AppError {
    fn from(err: BoxError) -> Self {
        if let Some(verification) = err.downcast_ref::<VerificationError>() {
            return match verification {
                VerificationError::NotFound(_) => AppError::NotFoundError(err.to_string()),
                _ => AppError::ConflictError(err.to_string()),
            };
        }
        if let Some(product) = err.downcast_ref::<ProductError>() {
            return match product {
                ProductError::NotFound(_) => AppError::NotFoundError(err.to_string()),
                _ => AppError::ValidationError(err.to_string()),
            };
        }
        AppError::InternalServerError(err.to_string())
    }
}
