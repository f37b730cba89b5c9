//! Identity gateway binary.
//!
//! Configuration comes from the JSON file named by `GATEWAY_CONFIG_PATH`
//! (optional) and `GATEWAY_*` environment overrides.

use anyhow::{Context, Result};
use identity_gateway::domain::config::{LoggingConfig, CONFIG_PATH_ENV};
use identity_gateway::{GatewayConfig, IdentityGatewayService};
use shared_bus::MessagePublisher;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    installed.context("failed to install tracing subscriber")
}

fn load_config() -> Result<GatewayConfig> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => GatewayConfig::from_file(&path)
            .with_context(|| format!("loading {CONFIG_PATH_ENV}={path}"))?,
        Err(_) => GatewayConfig::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

#[cfg(feature = "kafka")]
fn publisher(config: &GatewayConfig) -> Result<Arc<dyn MessagePublisher>> {
    use shared_bus::{KafkaPublisher, KafkaSettings};

    let settings = KafkaSettings {
        brokers: config.kafka.brokers.clone(),
        client_id: config.kafka.client_id.clone(),
        publish_timeout: config.kafka.publish_timeout,
    };
    let producer = KafkaPublisher::new(&settings).context("failed to create Kafka producer")?;
    Ok(Arc::new(producer))
}

#[cfg(not(feature = "kafka"))]
fn publisher(_config: &GatewayConfig) -> Result<Arc<dyn MessagePublisher>> {
    warn!("Built without the `kafka` feature; commands go to an in-memory bus and are dropped");
    Ok(Arc::new(shared_bus::InMemoryMessageBus::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging)?;

    let publisher = publisher(&config)?;
    let service = IdentityGatewayService::connect(config, publisher)
        .context("failed to build identity gateway")?;

    info!(
        version = identity_gateway::VERSION,
        "Identity gateway is running. Press Ctrl+C to stop."
    );
    service
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await?;

    Ok(())
}
