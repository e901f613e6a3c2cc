use agora_catalog::coupon::{Coupon, CouponKind};
use agora_catalog::product::{Product, ProductError};
use agora_catalog::store::{Store, SubscriptionTier};
use agora_core::repository::{CouponRepository, ProductPatch, ProductRepository, StoreRepository};
use agora_core::BoxError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    store_id: Uuid,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    price_cents: i64,
    stock: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: self.id,
            store_id: self.store_id,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            price_cents: self.price_cents,
            stock: self.stock,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    slug: String,
    tier: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoreRow {
    fn into_store(self) -> Result<Store, BoxError> {
        let tier = SubscriptionTier::parse(&self.tier)
            .ok_or_else(|| format!("Unknown subscription tier in database: {}", self.tier))?;
        Ok(Store {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            slug: self.slug,
            tier,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    store_id: Option<Uuid>,
    kind: String,
    value: i64,
    min_subtotal_cents: i64,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
}

const PRODUCT_COLUMNS: &str =
    "id, store_id, title, description, image_url, price_cents, stock, is_active, created_at, updated_at";

#[async_trait]
impl ProductRepository for PgCatalogRepository {
    async fn create_product(&self, product: &Product) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, store_id, title, description, image_url,
                                  price_cents, stock, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id)
        .bind(product.store_id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, BoxError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ProductRow::into_product))
    }

    async fn list_products(
        &self,
        store_id: Option<Uuid>,
        only_active: bool,
    ) -> Result<Vec<Product>, BoxError> {
        let rows = match store_id {
            Some(store_id) => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {} FROM products WHERE store_id = $1 AND (NOT $2 OR is_active) ORDER BY created_at DESC",
                    PRODUCT_COLUMNS
                ))
                .bind(store_id)
                .bind(only_active)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {} FROM products WHERE (NOT $1 OR is_active) ORDER BY created_at DESC",
                    PRODUCT_COLUMNS
                ))
                .bind(only_active)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    async fn update_product(&self, id: Uuid, patch: &ProductPatch) -> Result<(), BoxError> {
        let Some(mut product) = self.get_product(id).await? else {
            return Err(Box::new(ProductError::NotFound(id.to_string())));
        };

        if let Some(title) = &patch.title {
            product.title = title.clone();
        }
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(image_url) = &patch.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(price_cents) = patch.price_cents {
            if price_cents < 0 {
                return Err(Box::new(ProductError::InvalidPrice(price_cents)));
            }
            product.price_cents = price_cents;
        }
        if let Some(stock) = patch.stock {
            if stock < 0 {
                return Err(Box::new(ProductError::InvalidStock(stock)));
            }
            product.stock = stock;
        }
        if let Some(is_active) = patch.is_active {
            product.is_active = is_active;
        }

        sqlx::query(
            r#"
            UPDATE products
            SET title = $1, description = $2, image_url = $3,
                price_cents = $4, stock = $5, is_active = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn deactivate_product(&self, id: Uuid) -> Result<(), BoxError> {
        sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StoreRepository for PgCatalogRepository {
    async fn get_store(&self, id: Uuid) -> Result<Option<Store>, BoxError> {
        let row = sqlx::query_as::<_, StoreRow>(
            "SELECT id, owner_id, name, slug, tier, is_verified, created_at, updated_at FROM stores WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(StoreRow::into_store).transpose()
    }

    async fn get_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>, BoxError> {
        let row = sqlx::query_as::<_, StoreRow>(
            "SELECT id, owner_id, name, slug, tier, is_verified, created_at, updated_at FROM stores WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(StoreRow::into_store).transpose()
    }

    async fn create_store(&self, store: &Store) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO stores (id, owner_id, name, slug, tier, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(store.id)
        .bind(store.owner_id)
        .bind(&store.name)
        .bind(&store.slug)
        .bind(store.tier.as_str())
        .bind(store.is_verified)
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CouponRepository for PgCatalogRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, BoxError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, code, store_id, kind, value, min_subtotal_cents, starts_at, expires_at, is_active
            FROM coupons WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind = CouponKind::parse(&row.kind)
            .ok_or_else(|| format!("Unknown coupon kind in database: {}", row.kind))?;

        Ok(Some(Coupon {
            id: row.id,
            code: row.code,
            store_id: row.store_id,
            kind,
            value: row.value,
            min_subtotal_cents: row.min_subtotal_cents,
            starts_at: row.starts_at,
            expires_at: row.expires_at,
            is_active: row.is_active,
        }))
    }
}
