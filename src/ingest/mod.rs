use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::domain::{validate, Violation};
use crate::messaging::{resolve_correlation_id, MessageBus, PublishEnvelope, PublishError};
use crate::metrics::Metrics;

// ============================================================================
// Ingest Pipeline
// ============================================================================
//
// Received -> Validating -> Publishing -> Completed, with terminal branches
// Validating -> Rejected and Publishing -> Failed. Each request is handled
// independently; the only shared state is the read-only bus handle, queue
// name and metrics registry.
//
// The correlation id is resolved once at entry and threaded explicitly
// through logging and the envelope, never via ambient state.
// ============================================================================

/// Terminal state of one ingest request.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Publish acknowledged by the broker.
    Accepted { correlation_id: String },
    /// Validation violations; the publisher was never reached.
    Rejected(Vec<Violation>),
    /// Publish attempted and failed.
    Failed {
        correlation_id: String,
        error: PublishError,
    },
}

pub struct IngestPipeline {
    bus: Arc<dyn MessageBus>,
    queue: String,
    metrics: Arc<Metrics>,
}

impl IngestPipeline {
    pub fn new(bus: Arc<dyn MessageBus>, queue: String, metrics: Arc<Metrics>) -> Self {
        Self { bus, queue, metrics }
    }

    pub async fn handle(
        &self,
        document: Value,
        inbound_correlation: Option<String>,
    ) -> IngestOutcome {
        let correlation_id = resolve_correlation_id(inbound_correlation);
        self.metrics.record_received();
        tracing::info!(correlation_id = %correlation_id, "Received new order");

        let order = match validate(&document) {
            Ok(order) => order,
            Err(violations) => {
                self.metrics.record_rejected();
                tracing::warn!(
                    correlation_id = %correlation_id,
                    violations = violations.len(),
                    "Order rejected by validation"
                );
                return IngestOutcome::Rejected(violations);
            }
        };

        let envelope = PublishEnvelope::new(order, Some(correlation_id.clone()));
        let body = match serde_json::to_vec(&envelope) {
            Ok(body) => body,
            Err(e) => {
                let error = PublishError::Fault(format!("envelope serialization: {e}"));
                tracing::error!(correlation_id = %correlation_id, error = %error, "Failed to publish order");
                return IngestOutcome::Failed {
                    correlation_id,
                    error,
                };
            }
        };

        let bus = Arc::clone(&self.bus);
        let queue = self.queue.clone();
        let started = Instant::now();
        // Spawned so an aborted HTTP request does not cancel an in-flight
        // publish: durability wins over cancellation responsiveness.
        let result = tokio::spawn(async move { bus.publish(&queue, &body).await }).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(Ok(())) => {
                self.metrics.record_published(elapsed);
                tracing::info!(
                    correlation_id = %correlation_id,
                    queue = %self.queue,
                    "Order published successfully"
                );
                IngestOutcome::Accepted { correlation_id }
            }
            Ok(Err(error)) => {
                let reason = match &error {
                    PublishError::BrokerUnreachable(_) => "broker_unreachable",
                    PublishError::Fault(_) => "fault",
                };
                self.metrics.record_publish_failure(reason, elapsed);
                tracing::error!(
                    correlation_id = %correlation_id,
                    error = %error,
                    "Failed to publish order"
                );
                IngestOutcome::Failed {
                    correlation_id,
                    error,
                }
            }
            Err(join_error) => {
                self.metrics.record_publish_failure("fault", elapsed);
                tracing::error!(
                    correlation_id = %correlation_id,
                    error = %join_error,
                    "Publish task aborted"
                );
                IngestOutcome::Failed {
                    correlation_id,
                    error: PublishError::Fault(format!("publish task aborted: {join_error}")),
                }
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
