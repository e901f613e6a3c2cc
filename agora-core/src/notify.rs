use crate::BoxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A transactional message for a buyer or seller. Delivery (email, etc.)
/// belongs to an external collaborator behind [`NotificationDispatcher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> Result<(), BoxError>;
}
