use agora_core::repository::{CheckoutWriteError, OrderRepository};
use agora_core::BoxError;
use agora_order::models::{CheckoutDraft, Order, OrderItem, OrderStatus, ShippingAddress};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    checkout_id: Uuid,
    buyer_id: Uuid,
    store_id: Uuid,
    status: String,
    subtotal_cents: i64,
    shipping_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    currency: String,
    coupon_code: Option<String>,
    ship_name: String,
    ship_line1: String,
    ship_line2: Option<String>,
    ship_city: String,
    ship_postal_code: String,
    ship_country: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    title: String,
    image_url: Option<String>,
    unit_price_cents: i64,
    quantity: i32,
    total_cents: i64,
    commission_cents: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct IdRow {
    id: Uuid,
}

fn backend(e: sqlx::Error) -> CheckoutWriteError {
    CheckoutWriteError::Backend(Box::new(e))
}

fn order_from_rows(row: OrderRow, item_rows: Vec<OrderItemRow>) -> Result<Order, BoxError> {
    let status = OrderStatus::parse(&row.status)
        .ok_or_else(|| format!("Unknown order status in database: {}", row.status))?;

    let items = item_rows
        .into_iter()
        .map(|item| OrderItem {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            title: item.title,
            image_url: item.image_url,
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            total_cents: item.total_cents,
            commission_cents: item.commission_cents,
            created_at: item.created_at,
        })
        .collect();

    Ok(Order {
        id: row.id,
        checkout_id: row.checkout_id,
        buyer_id: row.buyer_id,
        store_id: row.store_id,
        status,
        subtotal_cents: row.subtotal_cents,
        shipping_cents: row.shipping_cents,
        discount_cents: row.discount_cents,
        total_cents: row.total_cents,
        currency: row.currency,
        coupon_code: row.coupon_code,
        shipping_address: ShippingAddress {
            name: row.ship_name,
            line1: row.ship_line1,
            line2: row.ship_line2,
            city: row.ship_city,
            postal_code: row.ship_postal_code,
            country: row.ship_country,
        },
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    /// One transaction for the whole checkout: every order, its items, its
    /// commission rows and the stock decrements commit together or not at
    /// all. The decrement is conditional (`stock >= qty`) and the affected
    /// row count is checked, which closes the read-then-write oversell
    /// window: a racing checkout serializes on the row update and the loser
    /// sees a stock conflict.
    async fn create_checkout(&self, draft: &CheckoutDraft) -> Result<Vec<Order>, CheckoutWriteError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(draft.orders.len());

        for order_draft in &draft.orders {
            let order_id = Uuid::new_v4();

            sqlx::query(
                r#"
                INSERT INTO orders (id, checkout_id, buyer_id, store_id, status,
                                    subtotal_cents, shipping_cents, discount_cents, total_cents,
                                    currency, coupon_code,
                                    ship_name, ship_line1, ship_line2, ship_city, ship_postal_code, ship_country,
                                    created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)
                "#,
            )
            .bind(order_id)
            .bind(draft.checkout_id)
            .bind(draft.buyer_id)
            .bind(order_draft.store_id)
            .bind(OrderStatus::Pending.as_str())
            .bind(order_draft.subtotal_cents)
            .bind(order_draft.shipping_cents)
            .bind(order_draft.discount_cents)
            .bind(order_draft.total_cents)
            .bind(&order_draft.currency)
            .bind(&order_draft.coupon_code)
            .bind(&draft.shipping_address.name)
            .bind(&draft.shipping_address.line1)
            .bind(&draft.shipping_address.line2)
            .bind(&draft.shipping_address.city)
            .bind(&draft.shipping_address.postal_code)
            .bind(&draft.shipping_address.country)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

            let mut items = Vec::with_capacity(order_draft.items.len());
            for item in &order_draft.items {
                let updated = sqlx::query(
                    "UPDATE products SET stock = stock - $1, updated_at = $2 WHERE id = $3 AND stock >= $1",
                )
                .bind(item.quantity)
                .bind(now)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;

                if updated.rows_affected() == 0 {
                    let available: Option<i32> =
                        sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                            .bind(item.product_id)
                            .fetch_optional(&mut *tx)
                            .await
                            .map_err(backend)?;
                    tx.rollback().await.ok();
                    return Err(CheckoutWriteError::StockConflict {
                        product_id: item.product_id,
                        requested: item.quantity,
                        available: available.unwrap_or(0),
                    });
                }

                let item_id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO order_items (id, order_id, product_id, title, image_url,
                                             unit_price_cents, quantity, total_cents, commission_cents, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                )
                .bind(item_id)
                .bind(order_id)
                .bind(item.product_id)
                .bind(&item.title)
                .bind(&item.image_url)
                .bind(item.unit_price_cents)
                .bind(item.quantity)
                .bind(item.total_cents)
                .bind(item.commission_cents)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;

                sqlx::query(
                    r#"
                    INSERT INTO commissions (id, order_id, order_item_id, store_id, rate, amount_cents, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(order_id)
                .bind(item_id)
                .bind(order_draft.store_id)
                .bind(item.commission_rate)
                .bind(item.commission_cents)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;

                items.push(OrderItem {
                    id: item_id,
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

            sqlx::query(
                r#"
                INSERT INTO order_changes (id, order_id, change_type, old_value, new_value, actor, note, created_at)
                VALUES ($1, $2, 'CREATED', NULL, $3, 'BUYER', $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(serde_json::json!({ "status": OrderStatus::Pending.as_str() }))
            .bind(Some("Order created at checkout"))
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

            created.push(Order {
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
            });
        }

        tx.commit().await.map_err(backend)?;

        Ok(created)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, BoxError> {
        let order_row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, checkout_id, buyer_id, store_id, status,
                   subtotal_cents, shipping_cents, discount_cents, total_cents,
                   currency, coupon_code,
                   ship_name, ship_line1, ship_line2, ship_city, ship_postal_code, ship_country,
                   created_at, updated_at
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = order_row else {
            return Ok(None);
        };

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, title, image_url,
                   unit_price_cents, quantity, total_cents, commission_cents, created_at
            FROM order_items WHERE order_id = $1 ORDER BY created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(order_from_rows(row, item_rows)?))
    }

    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, BoxError> {
        let rows = sqlx::query_as::<_, IdRow>(
            "SELECT id FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC",
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::new();
        for row in rows {
            if let Some(order) = self.get_order(row.id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn list_orders_for_checkout(&self, checkout_id: Uuid) -> Result<Vec<Order>, BoxError> {
        let rows = sqlx::query_as::<_, IdRow>(
            "SELECT id FROM orders WHERE checkout_id = $1 ORDER BY created_at",
        )
        .bind(checkout_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::new();
        for row in rows {
            if let Some(order) = self.get_order(row.id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), BoxError> {
        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_order_change(
        &self,
        order_id: Uuid,
        change_type: &str,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
        actor: &str,
        note: Option<&str>,
    ) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO order_changes (id, order_id, change_type, old_value, new_value, actor, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(change_type)
        .bind(old_value)
        .bind(new_value)
        .bind(actor)
        .bind(note)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
