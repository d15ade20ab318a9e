mod envelope;
mod rabbitmq;

pub use envelope::{resolve_correlation_id, PublishEnvelope};
pub use rabbitmq::RabbitMqPublisher;

use async_trait::async_trait;

// ============================================================================
// Message Bus Contract
// ============================================================================
//
// The pipeline depends only on this trait; one concrete adapter exists per
// broker technology. Tests substitute an in-memory bus, so the pipeline can
// be exercised without a running broker.
// ============================================================================

/// Delivery to a named queue with an explicit failure taxonomy.
///
/// At-least-once, no internal retry: each call either returns after the
/// broker acknowledged receipt, or surfaces a classified failure.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Why a publish did not complete.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Connection could not be established or was lost mid-publish.
    /// Transient infrastructure fault; maps to a gateway-class response.
    #[error("Broker unreachable: {0}")]
    BrokerUnreachable(String),

    /// Any other failure: routing rejection, missing confirm, protocol error.
    #[error("Publish failed: {0}")]
    Fault(String),
}

// ============================================================================
// Test doubles
// ============================================================================

#[cfg(test)]
pub(crate) mod testkit {
    use super::*;
    use std::sync::Mutex;

    /// Acknowledges every publish and records it for assertions.
    #[derive(Default)]
    pub struct RecordingBus {
        pub published: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn take(&self) -> Vec<(String, Vec<u8>)> {
            std::mem::take(&mut *self.published.lock().unwrap())
        }
    }

    #[async_trait]
    impl MessageBus for RecordingBus {
        async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError> {
            self.published
                .lock()
                .unwrap()
                .push((queue.to_string(), payload.to_vec()));
            Ok(())
        }
    }

    /// Fails every publish with the configured error class.
    pub struct FailingBus {
        pub unreachable: bool,
    }

    #[async_trait]
    impl MessageBus for FailingBus {
        async fn publish(&self, _queue: &str, _payload: &[u8]) -> Result<(), PublishError> {
            if self.unreachable {
                Err(PublishError::BrokerUnreachable(
                    "connection refused".to_string(),
                ))
            } else {
                Err(PublishError::Fault("channel closed by broker".to_string()))
            }
        }
    }
}
