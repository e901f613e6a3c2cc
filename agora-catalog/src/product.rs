use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable item. Belongs to exactly one store.
///
/// `price_cents` is the authoritative unit price; client-submitted prices are
/// never written anywhere. `stock` is only ever mutated through the
/// conditional decrement in the order writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(store_id: Uuid, title: String, price_cents: i64, stock: i32) -> Result<Self, ProductError> {
        if price_cents < 0 {
            return Err(ProductError::InvalidPrice(price_cents));
        }
        if stock < 0 {
            return Err(ProductError::InvalidStock(stock));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            store_id,
            title,
            description: None,
            image_url: None,
            price_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// A product can be ordered only while active and in stock.
    pub fn is_orderable(&self, quantity: i32) -> bool {
        self.is_active && quantity > 0 && self.stock >= quantity
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(i64),

    #[error("Invalid stock count: {0}")]
    InvalidStock(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_validates_inputs() {
        let store_id = Uuid::new_v4();
        assert!(Product::new(store_id, "Mug".into(), 1500, 10).is_ok());
        assert!(matches!(
            Product::new(store_id, "Mug".into(), -1, 10),
            Err(ProductError::InvalidPrice(-1))
        ));
        assert!(matches!(
            Product::new(store_id, "Mug".into(), 1500, -2),
            Err(ProductError::InvalidStock(-2))
        ));
    }

    #[test]
    fn test_orderability() {
        let mut product = Product::new(Uuid::new_v4(), "Mug".into(), 1500, 3).unwrap();
        assert!(product.is_orderable(3));
        assert!(!product.is_orderable(4));
        assert!(!product.is_orderable(0));

        product.is_active = false;
        assert!(!product.is_orderable(1));
    }
}
