use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agora_api::{app, state::{AppState, AuthConfig}};
use agora_checkout::{CheckoutRules, CheckoutService, MockPaymentGateway};
use agora_core::repository::{
    CouponRepository, OrderRepository, ProductRepository, StoreRepository, VerificationRepository,
};
use agora_order::finance::CommissionPolicy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = agora_db::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Agora API on port {}", config.server.port);

    // Postgres
    let db = agora_db::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let business_rules = db
        .fetch_business_rules(config.business_rules.clone())
        .await
        .expect("Failed to load business rules");
    let db = Arc::new(db);

    // Redis
    let redis = agora_db::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis = Arc::new(redis);

    // Kafka
    let producer = agora_db::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");
    let telemetry = Arc::new(agora_db::Telemetry::new(
        Arc::new(producer),
        &config.kafka.telemetry_topic,
    ));

    // Repositories
    let catalog = Arc::new(agora_db::PgCatalogRepository::new(db.pool.clone()));
    let products: Arc<dyn ProductRepository> = catalog.clone();
    let stores: Arc<dyn StoreRepository> = catalog.clone();
    let coupons: Arc<dyn CouponRepository> = catalog;
    let orders: Arc<dyn OrderRepository> =
        Arc::new(agora_db::PgOrderRepository::new(db.pool.clone()));
    let sellers: Arc<dyn VerificationRepository> =
        Arc::new(agora_db::PgSellerRepository::new(db.pool.clone()));

    // Checkout pipeline
    let policy = CommissionPolicy::new(business_rules.commission_rates())
        .expect("Commission rates out of range");
    let checkout = Arc::new(CheckoutService::new(
        products.clone(),
        stores.clone(),
        coupons,
        orders.clone(),
        Arc::new(MockPaymentGateway),
        policy,
        CheckoutRules {
            currency: business_rules.currency.clone(),
            shipping_fee_cents: business_rules.shipping_fee_cents,
        },
    ));

    // Notifications: log-backed dispatcher wrapped in bounded linear retry.
    let notifier = Arc::new(agora_db::RetryingDispatcher::new(
        Arc::new(agora_db::LogDispatcher),
        business_rules.notify_max_attempts,
        Duration::from_millis(business_rules.notify_backoff_ms),
    ));

    let app_state = AppState {
        db,
        redis,
        products,
        stores,
        orders,
        sellers,
        checkout,
        telemetry,
        notifier,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        rules: business_rules,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
