use agora_core::notify::{Notification, NotificationDispatcher};
use agora_core::BoxError;
use agora_shared::pii::Masked;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Dispatcher that only records the send. Stands in for the external email
/// collaborator in development; the address is masked in the log line.
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), BoxError> {
        info!(
            to = %Masked(notification.to.clone()),
            subject = %notification.subject,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Bounded retry with linear backoff around any dispatcher: attempt n waits
/// n × backoff before retrying. Gives up after `max_attempts`.
pub struct RetryingDispatcher {
    inner: Arc<dyn NotificationDispatcher>,
    max_attempts: u32,
    backoff: Duration,
}

impl RetryingDispatcher {
    pub fn new(inner: Arc<dyn NotificationDispatcher>, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RetryingDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), BoxError> {
        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self.inner.dispatch(notification).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        "Notification dispatch failed: {}",
                        e
                    );
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| "dispatch failed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` attempts, then succeeds.
    struct FlakyDispatcher {
        failures: u32,
        attempts: AtomicU32,
    }

    #[async_trait]
    impl NotificationDispatcher for FlakyDispatcher {
        async fn dispatch(&self, _notification: &Notification) -> Result<(), BoxError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.failures {
                Err(format!("transient failure {}", attempt).into())
            } else {
                Ok(())
            }
        }
    }

    fn notification() -> Notification {
        Notification {
            to: "buyer@example.com".into(),
            subject: "Order confirmed".into(),
            body: "Thanks for your order.".into(),
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let flaky = Arc::new(FlakyDispatcher {
            failures: 2,
            attempts: AtomicU32::new(0),
        });
        let dispatcher =
            RetryingDispatcher::new(flaky.clone(), 3, Duration::from_millis(1));

        dispatcher.dispatch(&notification()).await.unwrap();
        assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let flaky = Arc::new(FlakyDispatcher {
            failures: 10,
            attempts: AtomicU32::new(0),
        });
        let dispatcher =
            RetryingDispatcher::new(flaky.clone(), 3, Duration::from_millis(1));

        let err = dispatcher.dispatch(&notification()).await.unwrap_err();
        assert!(err.to_string().contains("transient failure"));
        assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_floor() {
        let flaky = Arc::new(FlakyDispatcher {
            failures: 0,
            attempts: AtomicU32::new(0),
        });
        let dispatcher = RetryingDispatcher::new(flaky.clone(), 0, Duration::from_millis(1));

        dispatcher.dispatch(&notification()).await.unwrap();
        assert_eq!(flaky.attempts.load(Ordering::SeqCst), 1);
    }
}
