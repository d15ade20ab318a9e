use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Order;

// ============================================================================
// Publish Envelope
// ============================================================================

/// Wire wrapper around a validated order: `{ correlationId, payload }`.
///
/// Created once per accepted request, handed to the bus, discarded after the
/// publish call returns or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEnvelope {
    pub correlation_id: String,
    pub payload: Order,
}

impl PublishEnvelope {
    /// Pure apart from the randomness source behind a generated id.
    pub fn new(payload: Order, correlation_id: Option<String>) -> Self {
        Self {
            correlation_id: resolve_correlation_id(correlation_id),
            payload,
        }
    }
}

/// Keep the inbound correlation id when one was supplied; otherwise mint a
/// fresh v4 UUID. Blank headers count as absent.
pub fn resolve_correlation_id(inbound: Option<String>) -> String {
    inbound
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures;
    use std::collections::HashSet;

    #[test]
    fn test_inbound_correlation_id_is_preserved() {
        let envelope = PublishEnvelope::new(fixtures::order(), Some("trace-1".to_string()));
        assert_eq!(envelope.correlation_id, "trace-1");
    }

    #[test]
    fn test_blank_correlation_id_is_replaced() {
        for inbound in [None, Some(String::new()), Some("   ".to_string())] {
            let envelope = PublishEnvelope::new(fixtures::order(), inbound);
            assert!(!envelope.correlation_id.trim().is_empty());
            assert!(Uuid::parse_str(&envelope.correlation_id).is_ok());
        }
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<String> = (0..100).map(|_| resolve_correlation_id(None)).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = PublishEnvelope::new(fixtures::order(), Some("trace-7".to_string()));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["correlationId"], "trace-7");
        assert_eq!(json["payload"]["orderId"], "123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_payload_round_trips_through_envelope() {
        let order = fixtures::order();
        let envelope = PublishEnvelope::new(order.clone(), None);
        let bytes = serde_json::to_vec(&envelope).unwrap();
        let back: PublishEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.payload, order);
    }
}
