use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthClaims;
use crate::state::AppState;
use agora_catalog::product::Product;
use agora_core::repository::ProductPatch;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub store_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub is_active: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            store_id: product.store_id,
            title: product.title,
            description: product.description,
            image_url: product.image_url,
            price_cents: product.price_cents,
            stock: product.stock,
            is_active: product.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub store_id: Option<Uuid>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/{id}", get(get_product))
}

pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", post(create_product))
        .route("/v1/products/{id}", put(update_product).delete(delete_product))
}

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /v1/products
/// Public catalog listing; inactive products never appear.
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.products.list_products(query.store_id, true).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .products
        .get_product(product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Product not found: {}", product_id)))?;
    Ok(Json(ProductResponse::from(product)))
}

// ============================================================================
// Seller Handlers
// ============================================================================

/// The caller's store, or 403 if they don't have one yet.
async fn owned_store(
    state: &AppState,
    claims: &AuthClaims,
) -> Result<agora_catalog::store::Store, AppError> {
    state
        .stores
        .get_store_by_owner(claims.profile_id()?)
        .await?
        .ok_or_else(|| AppError::AuthorizationError("No store for this seller".to_string()))
}

/// POST /v1/products
async fn create_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let store = owned_store(&state, &claims).await?;

    let mut product = Product::new(store.id, req.title, req.price_cents, req.stock)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    product.description = req.description;
    product.image_url = req.image_url;

    state.products.create_product(&product).await?;
    Ok(Json(ProductResponse::from(product)))
}

/// PUT /v1/products/{id}
async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let existing = state
        .products
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Product not found: {}", product_id)))?;

    if claims.role != "ADMIN" {
        let store = owned_store(&state, &claims).await?;
        if existing.store_id != store.id {
            return Err(AppError::AuthorizationError(
                "Product belongs to a different store".to_string(),
            ));
        }
    }

    let patch = ProductPatch {
        title: req.title,
        description: req.description.map(Some),
        image_url: req.image_url.map(Some),
        price_cents: req.price_cents,
        stock: req.stock,
        is_active: req.is_active,
    };
    state.products.update_product(product_id, &patch).await?;

    let updated = state
        .products
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Product not found: {}", product_id)))?;
    Ok(Json(ProductResponse::from(updated)))
}

/// DELETE /v1/products/{id}
/// Soft delete: historic order items keep referencing the row.
async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(product_id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    let existing = state
        .products
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Product not found: {}", product_id)))?;

    if claims.role != "ADMIN" {
        let store = owned_store(&state, &claims).await?;
        if existing.store_id != store.id {
            return Err(AppError::AuthorizationError(
                "Product belongs to a different store".to_string(),
            ));
        }
    }

    state.products.deactivate_product(product_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
