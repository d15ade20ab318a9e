use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions},
    publisher_confirm::Confirmation,
    types::FieldTable,
    BasicProperties, Connection, ConnectionProperties,
};

use super::{MessageBus, PublishError};
use crate::config::RabbitMqConfig;

// ============================================================================
// RabbitMQ Publisher
// ============================================================================
//
// One connection and channel per publish call, opened and closed around
// exactly one delivery. The queue is declared on every call (idempotent
// declare-if-absent), publisher confirms are requested, and the publish is
// mandatory so an unroutable message comes back as a failure instead of
// being dropped.
// ============================================================================

pub struct RabbitMqPublisher {
    config: RabbitMqConfig,
}

impl RabbitMqPublisher {
    pub fn new(config: RabbitMqConfig) -> Self {
        Self { config }
    }

    /// Connection-phase faults are transient by nature.
    fn classify(error: lapin::Error) -> PublishError {
        match error {
            lapin::Error::IOError(e) => PublishError::BrokerUnreachable(e.to_string()),
            lapin::Error::InvalidConnectionState(state) => {
                PublishError::BrokerUnreachable(format!("connection in state {state:?}"))
            }
            other => PublishError::Fault(other.to_string()),
        }
    }
}

#[async_trait]
impl MessageBus for RabbitMqPublisher {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), PublishError> {
        let connection = Connection::connect(&self.config.amqp_uri(), ConnectionProperties::default())
            .await
            .map_err(|e| PublishError::BrokerUnreachable(e.to_string()))?;

        // Early returns below drop the connection, which tears it down; the
        // explicit close on the success path flushes outstanding frames.
        let channel = connection.create_channel().await.map_err(Self::classify)?;

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: self.config.durable,
                    exclusive: self.config.exclusive,
                    auto_delete: self.config.auto_delete,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(Self::classify)?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(Self::classify)?;

        let confirmation = channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions {
                    mandatory: true,
                    ..BasicPublishOptions::default()
                },
                payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await
            .map_err(Self::classify)?
            .await
            .map_err(Self::classify)?;

        let outcome = match confirmation {
            Confirmation::Ack(None) => Ok(()),
            Confirmation::Ack(Some(_)) | Confirmation::Nack(Some(_)) => Err(PublishError::Fault(
                "message could not be routed to any queue".to_string(),
            )),
            Confirmation::Nack(None) => Err(PublishError::Fault(
                "broker negatively acknowledged the publish".to_string(),
            )),
            Confirmation::NotRequested => Err(PublishError::Fault(
                "broker did not confirm the publish".to_string(),
            )),
        };

        if outcome.is_ok() {
            tracing::debug!(queue = %queue, bytes = payload.len(), "Publish confirmed by broker");
            // 200 = AMQP reply-success.
            let _ = connection.close(200, "").await;
        }

        outcome
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
