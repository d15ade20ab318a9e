use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Serialize;
use serde_json::Value;

use crate::domain::Violation;
use crate::ingest::{IngestOutcome, IngestPipeline};
use crate::messaging::PublishError;

pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

/// RFC 7807-style body for publish failures: title + underlying message,
/// never a stack trace.
#[derive(Debug, Serialize)]
struct ProblemDetails {
    title: String,
    detail: String,
    status: u16,
}

/// 400 body listing every violated field, grouped by wire path.
#[derive(Debug, Serialize)]
struct ValidationProblem {
    title: String,
    status: u16,
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationProblem {
    fn from_violations(violations: Vec<Violation>) -> Self {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for violation in violations {
            errors.entry(violation.path).or_default().push(violation.message);
        }
        Self {
            title: "One or more validation errors occurred.".to_string(),
            status: 400,
            errors,
        }
    }
}

pub async fn submit_order(
    req: HttpRequest,
    document: web::Json<Value>,
    pipeline: web::Data<IngestPipeline>,
) -> HttpResponse {
    let correlation = req
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match pipeline.handle(document.into_inner(), correlation).await {
        IngestOutcome::Accepted { .. } => HttpResponse::Accepted().finish(),
        IngestOutcome::Rejected(violations) => {
            HttpResponse::BadRequest().json(ValidationProblem::from_violations(violations))
        }
        IngestOutcome::Failed {
            error: error @ PublishError::BrokerUnreachable(_),
            ..
        } => HttpResponse::BadGateway().json(ProblemDetails {
            title: "Error publishing message".to_string(),
            detail: error.to_string(),
            status: 502,
        }),
        IngestOutcome::Failed { error, .. } => {
            HttpResponse::InternalServerError().json(ProblemDetails {
                title: "Unexpected error publishing message".to_string(),
                detail: error.to_string(),
                status: 500,
            })
        }
    }
}

pub async fn metrics_handler(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "order-orchestrator"
    }))
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures;
    use crate::messaging::testkit::{FailingBus, RecordingBus};
    use crate::messaging::{MessageBus, PublishEnvelope};
    use crate::metrics::Metrics;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    async fn call(bus: Arc<dyn MessageBus>, req: test::TestRequest) -> ServiceResponse {
        let metrics = Arc::new(Metrics::new().unwrap());
        let registry = Arc::new(metrics.registry().clone());
        let pipeline = IngestPipeline::new(bus, "order_queue".to_string(), metrics);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pipeline))
                .app_data(web::Data::new(registry))
                .route("/orders", web::post().to(submit_order))
                .route("/metrics", web::get().to(metrics_handler))
                .route("/health", web::get().to(health_handler)),
        )
        .await;

        test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn test_valid_submission_returns_202_with_empty_body() {
        let bus = Arc::new(RecordingBus::new());
        let resp = call(
            bus.clone(),
            test::TestRequest::post()
                .uri("/orders")
                .set_json(fixtures::document()),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert!(test::read_body(resp).await.is_empty());
        assert_eq!(bus.take().len(), 1);
    }

    #[actix_web::test]
    async fn test_inbound_correlation_header_reaches_the_broker() {
        let bus = Arc::new(RecordingBus::new());
        let resp = call(
            bus.clone(),
            test::TestRequest::post()
                .uri("/orders")
                .insert_header((CORRELATION_HEADER, "abc-123"))
                .set_json(fixtures::document()),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let envelope: PublishEnvelope = serde_json::from_slice(&bus.take()[0].1).unwrap();
        assert_eq!(envelope.correlation_id, "abc-123");
    }

    #[actix_web::test]
    async fn test_schema_violations_return_400_problem() {
        let bus = Arc::new(RecordingBus::new());
        let mut document = fixtures::document();
        document["payment"]["method"] = json!("InvalidMethod");
        document["shippingAddress"]["zipCode"] = json!("12345");

        let resp = call(
            bus.clone(),
            test::TestRequest::post().uri("/orders").set_json(document),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 400);
        assert!(body["errors"].get("payment.method").is_some());
        assert_eq!(
            body["errors"]["shippingAddress.zipCode"][0],
            "Invalid ZipCode format."
        );
        assert!(bus.take().is_empty());
    }

    #[actix_web::test]
    async fn test_unreachable_broker_returns_502_problem() {
        let resp = call(
            Arc::new(FailingBus { unreachable: true }),
            test::TestRequest::post()
                .uri("/orders")
                .set_json(fixtures::document()),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], "Error publishing message");
        assert_eq!(body["status"], 502);
    }

    #[actix_web::test]
    async fn test_other_publish_faults_return_500_problem() {
        let resp = call(
            Arc::new(FailingBus { unreachable: false }),
            test::TestRequest::post()
                .uri("/orders")
                .set_json(fixtures::document()),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], "Unexpected error publishing message");
        assert_eq!(body["status"], 500);
    }

    #[actix_web::test]
    async fn test_metrics_endpoint_exposes_pipeline_counters() {
        let resp = call(
            Arc::new(RecordingBus::new()),
            test::TestRequest::get().uri("/metrics"),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("orders_received_total"));
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let resp = call(
            Arc::new(RecordingBus::new()),
            test::TestRequest::get().uri("/health"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
