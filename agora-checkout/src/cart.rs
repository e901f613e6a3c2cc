use agora_catalog::coupon::CouponError;
use agora_core::repository::ProductRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client-submitted cart line. Quantity is the only field the client
/// controls; price and store come from the live catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart line validated against the catalog, carrying the authoritative
/// unit price and the snapshot source fields.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub available_stock: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i32 },

    #[error("Product not found or inactive: {0}")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Store not found: {0}")]
    StoreNotFound(Uuid),

    #[error("Unknown coupon code: {0}")]
    CouponNotFound(String),

    #[error("Coupon rejected: {0}")]
    Coupon(#[from] CouponError),

    #[error("Checkout storage failed: {0}")]
    Storage(String),
}

/// Collapse duplicate product lines by summing quantities, preserving
/// first-seen order. A split line must not pass a stock check its merged
/// total would fail.
pub fn merge_lines(lines: &[CartLine]) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(line.clone()),
        }
    }
    merged
}

/// Validate cart lines against the live catalog. Read-only: the
/// authoritative guard is the conditional decrement inside the checkout
/// transaction; this pass exists to reject bad carts with a precise error
/// before any write begins.
pub async fn resolve_lines(
    products: &dyn ProductRepository,
    lines: &[CartLine],
) -> Result<Vec<ResolvedLine>, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let merged = merge_lines(lines);
    let mut resolved = Vec::with_capacity(merged.len());

    for line in &merged {
        if line.quantity <= 0 {
            return Err(CheckoutError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }

        let product = products
            .get_product(line.product_id)
            .await
            .map_err(|e| CheckoutError::Storage(e.to_string()))?
            .filter(|p| p.is_active)
            .ok_or(CheckoutError::ProductNotFound(line.product_id))?;

        if product.stock < line.quantity {
            return Err(CheckoutError::OutOfStock {
                product_id: product.id,
                requested: line.quantity,
                available: product.stock,
            });
        }

        resolved.push(ResolvedLine {
            product_id: product.id,
            store_id: product.store_id,
            title: product.title,
            image_url: product.image_url,
            unit_price_cents: product.price_cents,
            quantity: line.quantity,
            available_stock: product.stock,
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_catalog::product::Product;
    use agora_core::repository::ProductPatch;
    use agora_core::BoxError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryCatalog {
        products: Mutex<HashMap<Uuid, Product>>,
    }

    impl MemoryCatalog {
        fn with(products: Vec<Product>) -> Self {
            Self {
                products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
            }
        }
    }

    #[async_trait]
    impl ProductRepository for MemoryCatalog {
        async fn create_product(&self, product: &Product) -> Result<(), BoxError> {
            self.products.lock().unwrap().insert(product.id, product.clone());
            Ok(())
        }

        async fn get_product(&self, id: Uuid) -> Result<Option<Product>, BoxError> {
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        async fn list_products(
            &self,
            store_id: Option<Uuid>,
            only_active: bool,
        ) -> Result<Vec<Product>, BoxError> {
            Ok(self
                .products
                .lock()
                .unwrap()
                .values()
                .filter(|p| store_id.map_or(true, |s| p.store_id == s))
                .filter(|p| !only_active || p.is_active)
                .cloned()
                .collect())
        }

        async fn update_product(&self, _id: Uuid, _patch: &ProductPatch) -> Result<(), BoxError> {
            Ok(())
        }

        async fn deactivate_product(&self, id: Uuid) -> Result<(), BoxError> {
            if let Some(p) = self.products.lock().unwrap().get_mut(&id) {
                p.is_active = false;
            }
            Ok(())
        }
    }

    fn product(store_id: Uuid, price: i64, stock: i32) -> Product {
        Product::new(store_id, "Widget".into(), price, stock).unwrap()
    }

    #[tokio::test]
    async fn test_resolver_uses_catalog_price() {
        let store_id = Uuid::new_v4();
        let p = product(store_id, 10000, 5);
        let id = p.id;
        let catalog = MemoryCatalog::with(vec![p]);

        let resolved = resolve_lines(&catalog, &[CartLine { product_id: id, quantity: 2 }])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].unit_price_cents, 10000);
        assert_eq!(resolved[0].store_id, store_id);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let catalog = MemoryCatalog::with(vec![]);
        assert!(matches!(
            resolve_lines(&catalog, &[]).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products_rejected() {
        let mut inactive = product(Uuid::new_v4(), 1000, 5);
        inactive.is_active = false;
        let inactive_id = inactive.id;
        let catalog = MemoryCatalog::with(vec![inactive]);

        let missing = Uuid::new_v4();
        assert!(matches!(
            resolve_lines(&catalog, &[CartLine { product_id: missing, quantity: 1 }]).await,
            Err(CheckoutError::ProductNotFound(id)) if id == missing
        ));
        assert!(matches!(
            resolve_lines(&catalog, &[CartLine { product_id: inactive_id, quantity: 1 }]).await,
            Err(CheckoutError::ProductNotFound(id)) if id == inactive_id
        ));
    }

    #[tokio::test]
    async fn test_over_quantity_rejected() {
        let p = product(Uuid::new_v4(), 1000, 3);
        let id = p.id;
        let catalog = MemoryCatalog::with(vec![p]);

        let err = resolve_lines(&catalog, &[CartLine { product_id: id, quantity: 4 }])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::OutOfStock { requested: 4, available: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_lines_merge_before_stock_check() {
        let p = product(Uuid::new_v4(), 1000, 3);
        let id = p.id;
        let catalog = MemoryCatalog::with(vec![p]);

        // 2 + 2 = 4 > 3: must fail even though each line alone would pass.
        let err = resolve_lines(
            &catalog,
            &[
                CartLine { product_id: id, quantity: 2 },
                CartLine { product_id: id, quantity: 2 },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CheckoutError::OutOfStock { requested: 4, .. }));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let p = product(Uuid::new_v4(), 1000, 3);
        let id = p.id;
        let catalog = MemoryCatalog::with(vec![p]);

        assert!(matches!(
            resolve_lines(&catalog, &[CartLine { product_id: id, quantity: 0 }]).await,
            Err(CheckoutError::InvalidQuantity { quantity: 0, .. })
        ));
    }
}
