use crate::cart::{resolve_lines, CartLine, CheckoutError};
use crate::partition::partition_by_store;
use agora_catalog::coupon::{Coupon, CouponError};
use agora_core::payment::{PaymentGateway, PaymentPreference};
use agora_core::repository::{
    CheckoutWriteError, CouponRepository, OrderRepository, ProductRepository, StoreRepository,
};
use agora_order::finance::CommissionPolicy;
use agora_order::models::{CheckoutDraft, Order, OrderDraft, OrderItemDraft, ShippingAddress};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Business rules the checkout applies to every order it assembles.
#[derive(Debug, Clone)]
pub struct CheckoutRules {
    pub currency: String,
    /// Flat shipping fee charged per store order.
    pub shipping_fee_cents: i64,
}

impl Default for CheckoutRules {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            shipping_fee_cents: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub buyer_id: Uuid,
    pub lines: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub coupon_code: Option<String>,
}

#[derive(Debug)]
pub struct CheckoutOutcome {
    pub checkout_id: Uuid,
    pub orders: Vec<Order>,
    /// One payment preference per order, in order. A gateway failure drops
    /// the entry but keeps the order (still pending, re-requestable).
    pub payments: Vec<PaymentPreference>,
}

/// Orchestrates a checkout: resolve the cart, partition by store, assemble
/// priced order drafts, persist the whole checkout in one transaction, then
/// fan out to the payment gateway for redirect URLs.
pub struct CheckoutService {
    products: Arc<dyn ProductRepository>,
    stores: Arc<dyn StoreRepository>,
    coupons: Arc<dyn CouponRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    policy: CommissionPolicy,
    rules: CheckoutRules,
}

impl CheckoutService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        stores: Arc<dyn StoreRepository>,
        coupons: Arc<dyn CouponRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        policy: CommissionPolicy,
        rules: CheckoutRules,
    ) -> Self {
        Self {
            products,
            stores,
            coupons,
            orders,
            gateway,
            policy,
            rules,
        }
    }

    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let resolved = resolve_lines(self.products.as_ref(), &request.lines).await?;
        let partitions = partition_by_store(resolved);

        let coupon = match &request.coupon_code {
            Some(code) => {
                let found = self
                    .coupons
                    .find_by_code(code)
                    .await
                    .map_err(|e| CheckoutError::Storage(e.to_string()))?;
                Some(found.ok_or_else(|| CheckoutError::CouponNotFound(code.clone()))?)
            }
            None => None,
        };

        let now = Utc::now();
        let mut order_drafts = Vec::with_capacity(partitions.len());

        for partition in partitions {
            let store = self
                .stores
                .get_store(partition.store_id)
                .await
                .map_err(|e| CheckoutError::Storage(e.to_string()))?
                .ok_or(CheckoutError::StoreNotFound(partition.store_id))?;

            let rate = self.policy.rate_for(store.tier);
            let mut items = Vec::with_capacity(partition.lines.len());
            for line in &partition.lines {
                let total_cents = line.unit_price_cents * line.quantity as i64;
                items.push(OrderItemDraft {
                    product_id: line.product_id,
                    title: line.title.clone(),
                    image_url: line.image_url.clone(),
                    unit_price_cents: line.unit_price_cents,
                    quantity: line.quantity,
                    total_cents,
                    commission_rate: rate,
                    commission_cents: self.policy.commission_for(
                        line.unit_price_cents,
                        line.quantity,
                        store.tier,
                    ),
                });
            }

            let subtotal_cents: i64 = items.iter().map(|item| item.total_cents).sum();
            let discount_cents = self.discount_for(&coupon, store.id, subtotal_cents, now)?;
            let shipping_cents = self.rules.shipping_fee_cents;
            let total_cents = (subtotal_cents + shipping_cents - discount_cents).max(0);

            order_drafts.push(OrderDraft {
                store_id: store.id,
                subtotal_cents,
                shipping_cents,
                discount_cents,
                total_cents,
                currency: self.rules.currency.clone(),
                coupon_code: (discount_cents > 0)
                    .then(|| request.coupon_code.clone())
                    .flatten(),
                items,
            });
        }

        let draft = CheckoutDraft {
            checkout_id: Uuid::new_v4(),
            buyer_id: request.buyer_id,
            shipping_address: request.shipping_address,
            orders: order_drafts,
        };

        let orders = self.orders.create_checkout(&draft).await.map_err(|e| match e {
            CheckoutWriteError::StockConflict {
                product_id,
                requested,
                available,
            } => CheckoutError::OutOfStock {
                product_id,
                requested,
                available,
            },
            CheckoutWriteError::Backend(source) => CheckoutError::Storage(source.to_string()),
        })?;

        let mut payments = Vec::with_capacity(orders.len());
        for order in &orders {
            match self
                .gateway
                .create_preference(order.id, order.total_cents, &order.currency)
                .await
            {
                Ok(preference) => payments.push(preference),
                Err(e) => {
                    tracing::warn!(order_id = %order.id, "Payment preference creation failed: {}", e);
                }
            }
        }

        Ok(CheckoutOutcome {
            checkout_id: draft.checkout_id,
            orders,
            payments,
        })
    }

    /// Store-scoped coupons silently skip other stores' partitions; every
    /// other rejection fails the checkout so the buyer learns why.
    fn discount_for(
        &self,
        coupon: &Option<Coupon>,
        store_id: Uuid,
        subtotal_cents: i64,
        now: chrono::DateTime<Utc>,
    ) -> Result<i64, CheckoutError> {
        match coupon {
            None => Ok(0),
            Some(c) => match c.discount_for(store_id, subtotal_cents, now) {
                Ok(discount) => Ok(discount),
                Err(CouponError::WrongStore) => Ok(0),
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockPaymentGateway;
    use agora_catalog::coupon::CouponKind;
    use agora_catalog::product::Product;
    use agora_catalog::store::{Store, SubscriptionTier};
    use agora_core::repository::ProductPatch;
    use agora_core::BoxError;
    use agora_order::models::{OrderItem, OrderStatus};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory backend implementing all four repository seams, with the
    /// same all-or-nothing stock semantics as the Postgres writer.
    struct MemoryBackend {
        products: Mutex<HashMap<Uuid, Product>>,
        stores: Mutex<HashMap<Uuid, Store>>,
        coupons: Mutex<HashMap<String, Coupon>>,
        orders: Mutex<HashMap<Uuid, Order>>,
    }

    impl MemoryBackend {
        fn new() -> Self {
            Self {
                products: Mutex::new(HashMap::new()),
                stores: Mutex::new(HashMap::new()),
                coupons: Mutex::new(HashMap::new()),
                orders: Mutex::new(HashMap::new()),
            }
        }

        fn add_store(&self, tier: SubscriptionTier) -> Uuid {
            let now = Utc::now();
            let store = Store {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                name: "Shop".into(),
                slug: format!("shop-{}", Uuid::new_v4().simple()),
                tier,
                is_verified: true,
                created_at: now,
                updated_at: now,
            };
            let id = store.id;
            self.stores.lock().unwrap().insert(id, store);
            id
        }

        fn add_product(&self, store_id: Uuid, price_cents: i64, stock: i32) -> Uuid {
            let product = Product::new(store_id, "Widget".into(), price_cents, stock).unwrap();
            let id = product.id;
            self.products.lock().unwrap().insert(id, product);
            id
        }

        fn add_coupon(&self, coupon: Coupon) {
            self.coupons.lock().unwrap().insert(coupon.code.clone(), coupon);
        }

        fn stock_of(&self, product_id: Uuid) -> i32 {
            self.products.lock().unwrap()[&product_id].stock
        }
    }

    #[async_trait]
    impl ProductRepository for MemoryBackend {
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

    #[async_trait]
    impl StoreRepository for MemoryBackend {
        async fn get_store(&self, id: Uuid) -> Result<Option<Store>, BoxError> {
            Ok(self.stores.lock().unwrap().get(&id).cloned())
        }

        async fn get_store_by_owner(&self, owner_id: Uuid) -> Result<Option<Store>, BoxError> {
            Ok(self
                .stores
                .lock()
                .unwrap()
                .values()
                .find(|s| s.owner_id == owner_id)
                .cloned())
        }

        async fn create_store(&self, store: &Store) -> Result<(), BoxError> {
            self.stores.lock().unwrap().insert(store.id, store.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl CouponRepository for MemoryBackend {
        async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, BoxError> {
            Ok(self.coupons.lock().unwrap().get(code).cloned())
        }
    }

    #[async_trait]
    impl OrderRepository for MemoryBackend {
        async fn create_checkout(
            &self,
            draft: &CheckoutDraft,
        ) -> Result<Vec<Order>, CheckoutWriteError> {
            let mut products = self.products.lock().unwrap();

            // First pass: every decrement must be possible, or nothing happens.
            for order in &draft.orders {
                for item in &order.items {
                    let product = products.get(&item.product_id).ok_or_else(|| {
                        CheckoutWriteError::StockConflict {
                            product_id: item.product_id,
                            requested: item.quantity,
                            available: 0,
                        }
                    })?;
                    if product.stock < item.quantity {
                        return Err(CheckoutWriteError::StockConflict {
                            product_id: item.product_id,
                            requested: item.quantity,
                            available: product.stock,
                        });
                    }
                }
            }

            let now = Utc::now();
            let mut created = Vec::new();
            for order_draft in &draft.orders {
                let order_id = Uuid::new_v4();
                let mut items = Vec::new();
                for item in &order_draft.items {
                    products.get_mut(&item.product_id).unwrap().stock -= item.quantity;
                    items.push(OrderItem {
                        id: Uuid::new_v4(),
                        order_id,
                        product_id: item.product_id,
                        title: item.title.clone(),
                        image_url: item.image_url.clone(),
                        unit_price_cents: item.unit_price_cents,
                        quantity: item.quantity,
                        total_cents: item.total_cents,
                        commission_cents: item.commission_cents,
                        created_at: now,
                    });
                }
                let order = Order {
                    id: order_id,
                    checkout_id: draft.checkout_id,
                    buyer_id: draft.buyer_id,
                    store_id: order_draft.store_id,
                    status: OrderStatus::Pending,
                    subtotal_cents: order_draft.subtotal_cents,
                    shipping_cents: order_draft.shipping_cents,
                    discount_cents: order_draft.discount_cents,
                    total_cents: order_draft.total_cents,
                    currency: order_draft.currency.clone(),
                    coupon_code: order_draft.coupon_code.clone(),
                    shipping_address: draft.shipping_address.clone(),
                    items,
                    created_at: now,
                    updated_at: now,
                };
                created.push(order.clone());
                self.orders.lock().unwrap().insert(order_id, order);
            }
            Ok(created)
        }

        async fn get_order(&self, id: Uuid) -> Result<Option<Order>, BoxError> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, BoxError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .values()
                .filter(|o| o.buyer_id == buyer_id)
                .cloned()
                .collect())
        }

        async fn list_orders_for_checkout(&self, checkout_id: Uuid) -> Result<Vec<Order>, BoxError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .values()
                .filter(|o| o.checkout_id == checkout_id)
                .cloned()
                .collect())
        }

        async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), BoxError> {
            if let Some(order) = self.orders.lock().unwrap().get_mut(&id) {
                order.status = status;
            }
            Ok(())
        }

        async fn add_order_change(
            &self,
            _order_id: Uuid,
            _change_type: &str,
            _old_value: Option<serde_json::Value>,
            _new_value: Option<serde_json::Value>,
            _actor: &str,
            _note: Option<&str>,
        ) -> Result<(), BoxError> {
            Ok(())
        }
    }

    fn service(backend: Arc<MemoryBackend>, rules: CheckoutRules) -> CheckoutService {
        CheckoutService::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
            Arc::new(MockPaymentGateway),
            CommissionPolicy::default(),
            rules,
        )
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "A Buyer".into(),
            line1: "1 Main St".into(),
            line2: None,
            city: "Springfield".into(),
            postal_code: "00001".into(),
            country: "US".into(),
        }
    }

    #[tokio::test]
    async fn test_two_store_cart_fans_out_to_two_orders() {
        let backend = Arc::new(MemoryBackend::new());
        let store1 = backend.add_store(SubscriptionTier::Basic);
        let store2 = backend.add_store(SubscriptionTier::Growth);
        let product_a = backend.add_product(store1, 10000, 5);
        let product_b = backend.add_product(store2, 5000, 1);

        let service = service(backend.clone(), CheckoutRules::default());
        let outcome = service
            .checkout(CheckoutRequest {
                buyer_id: Uuid::new_v4(),
                lines: vec![
                    CartLine { product_id: product_a, quantity: 2 },
                    CartLine { product_id: product_b, quantity: 1 },
                ],
                shipping_address: address(),
                coupon_code: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome.orders.len(), 2);
        let order1 = outcome.orders.iter().find(|o| o.store_id == store1).unwrap();
        let order2 = outcome.orders.iter().find(|o| o.store_id == store2).unwrap();

        assert_eq!(order1.subtotal_cents, 20000);
        assert_eq!(order2.subtotal_cents, 5000);
        assert!(order1.totals_consistent());
        assert!(order2.totals_consistent());
        assert!(order1.items.iter().all(|i| i.product_id == product_a));
        assert!(order2.items.iter().all(|i| i.product_id == product_b));

        // 15% of 20000 and 10% of 5000.
        assert_eq!(order1.items[0].commission_cents, 3000);
        assert_eq!(order2.items[0].commission_cents, 500);

        assert_eq!(backend.stock_of(product_a), 3);
        assert_eq!(backend.stock_of(product_b), 0);

        // One redirect per order, passed through from the gateway.
        assert_eq!(outcome.payments.len(), 2);
        assert!(outcome.payments.iter().all(|p| p.redirect_url.starts_with("https://")));
    }

    #[tokio::test]
    async fn test_out_of_stock_fails_whole_checkout_without_mutation() {
        let backend = Arc::new(MemoryBackend::new());
        let store1 = backend.add_store(SubscriptionTier::Basic);
        let store2 = backend.add_store(SubscriptionTier::Basic);
        let product_a = backend.add_product(store1, 10000, 5);
        let product_b = backend.add_product(store2, 5000, 1);

        let service = service(backend.clone(), CheckoutRules::default());
        let err = service
            .checkout(CheckoutRequest {
                buyer_id: Uuid::new_v4(),
                lines: vec![
                    CartLine { product_id: product_a, quantity: 2 },
                    CartLine { product_id: product_b, quantity: 3 },
                ],
                shipping_address: address(),
                coupon_code: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::OutOfStock { requested: 3, available: 1, .. }
        ));
        assert_eq!(backend.stock_of(product_a), 5);
        assert_eq!(backend.stock_of(product_b), 1);
        assert!(backend.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_time_stock_conflict_aborts_every_partition() {
        let backend = Arc::new(MemoryBackend::new());
        let store1 = backend.add_store(SubscriptionTier::Basic);
        let store2 = backend.add_store(SubscriptionTier::Basic);
        let product_a = backend.add_product(store1, 10000, 5);
        let product_b = backend.add_product(store2, 5000, 1);

        // Drafts straight to the writer, overselling product B: nothing may
        // be written for either store.
        let draft = CheckoutDraft {
            checkout_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            shipping_address: address(),
            orders: vec![
                OrderDraft {
                    store_id: store1,
                    subtotal_cents: 20000,
                    shipping_cents: 0,
                    discount_cents: 0,
                    total_cents: 20000,
                    currency: "USD".into(),
                    coupon_code: None,
                    items: vec![OrderItemDraft {
                        product_id: product_a,
                        title: "Widget".into(),
                        image_url: None,
                        unit_price_cents: 10000,
                        quantity: 2,
                        total_cents: 20000,
                        commission_rate: 0.15,
                        commission_cents: 3000,
                    }],
                },
                OrderDraft {
                    store_id: store2,
                    subtotal_cents: 10000,
                    shipping_cents: 0,
                    discount_cents: 0,
                    total_cents: 10000,
                    currency: "USD".into(),
                    coupon_code: None,
                    items: vec![OrderItemDraft {
                        product_id: product_b,
                        title: "Widget".into(),
                        image_url: None,
                        unit_price_cents: 5000,
                        quantity: 2,
                        total_cents: 10000,
                        commission_rate: 0.15,
                        commission_cents: 1500,
                    }],
                },
            ],
        };

        let err = backend.create_checkout(&draft).await.unwrap_err();
        assert!(matches!(err, CheckoutWriteError::StockConflict { .. }));
        assert_eq!(backend.stock_of(product_a), 5);
        assert_eq!(backend.stock_of(product_b), 1);
    }

    #[tokio::test]
    async fn test_repeat_checkout_is_not_idempotent() {
        let backend = Arc::new(MemoryBackend::new());
        let store = backend.add_store(SubscriptionTier::Pro);
        let product = backend.add_product(store, 2500, 5);
        let buyer_id = Uuid::new_v4();

        let service = service(backend.clone(), CheckoutRules::default());
        let request = CheckoutRequest {
            buyer_id,
            lines: vec![CartLine { product_id: product, quantity: 1 }],
            shipping_address: address(),
            coupon_code: None,
        };

        let first = service.checkout(request.clone()).await.unwrap();
        let second = service.checkout(request).await.unwrap();

        // No idempotency key: same submission twice means two checkouts.
        assert_ne!(first.checkout_id, second.checkout_id);
        assert_eq!(backend.orders.lock().unwrap().len(), 2);
        assert_eq!(backend.stock_of(product), 3);
    }

    #[tokio::test]
    async fn test_shipping_fee_and_global_coupon_apply_per_order() {
        let backend = Arc::new(MemoryBackend::new());
        let store1 = backend.add_store(SubscriptionTier::Basic);
        let store2 = backend.add_store(SubscriptionTier::Basic);
        let product_a = backend.add_product(store1, 10000, 5);
        let product_b = backend.add_product(store2, 4000, 5);
        backend.add_coupon(Coupon {
            id: Uuid::new_v4(),
            code: "TEN".into(),
            store_id: None,
            kind: CouponKind::Percent,
            value: 10,
            min_subtotal_cents: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
        });

        let rules = CheckoutRules {
            currency: "USD".into(),
            shipping_fee_cents: 500,
        };
        let service = service(backend.clone(), rules);
        let outcome = service
            .checkout(CheckoutRequest {
                buyer_id: Uuid::new_v4(),
                lines: vec![
                    CartLine { product_id: product_a, quantity: 1 },
                    CartLine { product_id: product_b, quantity: 1 },
                ],
                shipping_address: address(),
                coupon_code: Some("TEN".into()),
            })
            .await
            .unwrap();

        let order1 = outcome.orders.iter().find(|o| o.store_id == store1).unwrap();
        let order2 = outcome.orders.iter().find(|o| o.store_id == store2).unwrap();

        // total = subtotal + shipping − discount, per order.
        assert_eq!(order1.discount_cents, 1000);
        assert_eq!(order1.total_cents, 10000 + 500 - 1000);
        assert_eq!(order2.discount_cents, 400);
        assert_eq!(order2.total_cents, 4000 + 500 - 400);
        assert_eq!(order1.coupon_code.as_deref(), Some("TEN"));
    }

    #[tokio::test]
    async fn test_store_scoped_coupon_skips_other_stores() {
        let backend = Arc::new(MemoryBackend::new());
        let store1 = backend.add_store(SubscriptionTier::Basic);
        let store2 = backend.add_store(SubscriptionTier::Basic);
        let product_a = backend.add_product(store1, 10000, 5);
        let product_b = backend.add_product(store2, 4000, 5);
        backend.add_coupon(Coupon {
            id: Uuid::new_v4(),
            code: "SHOP1".into(),
            store_id: Some(store1),
            kind: CouponKind::Fixed,
            value: 2000,
            min_subtotal_cents: 0,
            starts_at: None,
            expires_at: None,
            is_active: true,
        });

        let service = service(backend.clone(), CheckoutRules::default());
        let outcome = service
            .checkout(CheckoutRequest {
                buyer_id: Uuid::new_v4(),
                lines: vec![
                    CartLine { product_id: product_a, quantity: 1 },
                    CartLine { product_id: product_b, quantity: 1 },
                ],
                shipping_address: address(),
                coupon_code: Some("SHOP1".into()),
            })
            .await
            .unwrap();

        let order1 = outcome.orders.iter().find(|o| o.store_id == store1).unwrap();
        let order2 = outcome.orders.iter().find(|o| o.store_id == store2).unwrap();
        assert_eq!(order1.discount_cents, 2000);
        assert_eq!(order2.discount_cents, 0);
        assert!(order2.coupon_code.is_none());
    }

    #[tokio::test]
    async fn test_expired_coupon_fails_checkout() {
        let backend = Arc::new(MemoryBackend::new());
        let store = backend.add_store(SubscriptionTier::Basic);
        let product = backend.add_product(store, 10000, 5);
        backend.add_coupon(Coupon {
            id: Uuid::new_v4(),
            code: "OLD".into(),
            store_id: None,
            kind: CouponKind::Percent,
            value: 10,
            min_subtotal_cents: 0,
            starts_at: None,
            expires_at: Some(Utc::now() - chrono::Duration::days(1)),
            is_active: true,
        });

        let service = service(backend.clone(), CheckoutRules::default());
        let err = service
            .checkout(CheckoutRequest {
                buyer_id: Uuid::new_v4(),
                lines: vec![CartLine { product_id: product, quantity: 1 }],
                shipping_address: address(),
                coupon_code: Some("OLD".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Coupon(CouponError::Expired)));
        assert_eq!(backend.stock_of(product), 5);
    }

    #[tokio::test]
    async fn test_unknown_coupon_code_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let store = backend.add_store(SubscriptionTier::Basic);
        let product = backend.add_product(store, 10000, 5);

        let service = service(backend.clone(), CheckoutRules::default());
        let err = service
            .checkout(CheckoutRequest {
                buyer_id: Uuid::new_v4(),
                lines: vec![CartLine { product_id: product, quantity: 1 }],
                shipping_address: address(),
                coupon_code: Some("NOPE".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::CouponNotFound(code) if code == "NOPE"));
    }
}
