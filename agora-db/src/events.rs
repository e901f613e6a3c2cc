use agora_shared::models::events::{
    CheckoutCompletedEvent, OrderPaidEvent, OrderStatusChangedEvent, SellerApprovedEvent,
    SettlementEvent,
};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                let partition = delivery.partition;
                let offset = delivery.offset;
                info!(
                    "Sent message to {}/{}: partition {} offset {}",
                    topic, key, partition, offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send message to {}: {}", topic, e);
                Err(e)
            }
        }
    }
}

/// Kafka-backed telemetry for the order/commission flow. Each `log_*`
/// method serializes one domain event keyed by its type.
pub struct Telemetry {
    producer: Arc<EventProducer>,
    topic: String,
}

impl Telemetry {
    pub fn new(producer: Arc<EventProducer>, topic: &str) -> Self {
        Self {
            producer,
            topic: topic.to_string(),
        }
    }

    pub async fn log_checkout_completed(&self, event: CheckoutCompletedEvent) -> Result<(), String> {
        self.emit("checkout_completed", &event).await
    }

    pub async fn log_order_paid(&self, event: OrderPaidEvent) -> Result<(), String> {
        self.emit("order_paid", &event).await
    }

    pub async fn log_status_changed(&self, event: OrderStatusChangedEvent) -> Result<(), String> {
        self.emit("order_status_changed", &event).await
    }

    pub async fn log_settlement(&self, event: SettlementEvent) -> Result<(), String> {
        self.emit("settlement", &event).await
    }

    pub async fn log_seller_approved(&self, event: SellerApprovedEvent) -> Result<(), String> {
        self.emit("seller_approved", &event).await
    }

    async fn emit<T: serde::Serialize>(&self, event_type: &str, payload: &T) -> Result<(), String> {
        let json = serde_json::to_string(payload).map_err(|e| e.to_string())?;
        self.producer
            .publish(&self.topic, event_type, &json)
            .await
            .map_err(|e| e.to_string())
    }
}
