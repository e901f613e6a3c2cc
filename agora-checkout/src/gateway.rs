use agora_core::payment::{PaymentGateway, PaymentPreference};
use agora_core::BoxError;
use async_trait::async_trait;
use uuid::Uuid;

/// Stand-in gateway for development and tests. Real deployments plug in a
/// provider adapter behind the same trait.
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_preference(
        &self,
        order_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentPreference, BoxError> {
        let id = format!("mock_pref_{}", order_id.simple());
        Ok(PaymentPreference {
            redirect_url: format!("https://pay.example.com/checkout/{}", id),
            sandbox_url: Some(format!("https://sandbox.pay.example.com/checkout/{}", id)),
            id,
            order_id,
            amount_cents,
            currency: currency.to_string(),
            created_at: chrono::Utc::now(),
        })
    }
}
