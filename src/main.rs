use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod ingest;
mod messaging;
mod metrics;

use config::AppConfig;
use ingest::IngestPipeline;
use messaging::{MessageBus, RabbitMqPublisher};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_orchestrator=debug")),
        )
        .init();

    tracing::info!("🚀 Starting Order Orchestrator ingest API");

    let config = AppConfig::from_env()?;
    tracing::info!(
        queue = %config.queue_name,
        broker = %config.rabbitmq.amqp_uri(),
        durable = config.rabbitmq.durable,
        "Configuration loaded"
    );

    tracing::info!("📊 Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);
    let registry = Arc::new(metrics.registry().clone());

    // Broker configuration is process-wide and read-only; every publish owns
    // its own connection and channel.
    let bus: Arc<dyn MessageBus> = Arc::new(RabbitMqPublisher::new(config.rabbitmq.clone()));
    let pipeline = IngestPipeline::new(bus, config.queue_name.clone(), metrics);

    api::run(&config, pipeline, registry).await?;

    Ok(())
}
