use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use prometheus::Registry;

use super::routes::{health_handler, metrics_handler, submit_order};
use crate::config::AppConfig;
use crate::ingest::IngestPipeline;

/// Run the HTTP front door until shutdown.
///
/// One worker-agnostic app serving the ingest endpoint plus the
/// observability surface; requests share nothing but the read-only
/// pipeline handle.
pub async fn run(
    config: &AppConfig,
    pipeline: IngestPipeline,
    registry: Arc<Registry>,
) -> std::io::Result<()> {
    let pipeline = web::Data::new(pipeline);

    tracing::info!(
        "🚀 Order ingest API listening on http://{}:{}",
        config.http_host,
        config.http_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(pipeline.clone())
            .app_data(web::Data::new(registry.clone()))
            .route("/orders", web::post().to(submit_order))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind((config.http_host.clone(), config.http_port))?
    .run()
    .await
}
