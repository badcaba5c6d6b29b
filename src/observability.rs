//! Observability: logging and metrics.

use crate::config::ObservabilityConfig;
use crate::error::{MedallionError, Result};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| MedallionError::Internal(format!("Failed to init logging: {e}")))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| MedallionError::Internal(format!("Failed to init logging: {e}")))?;
    }

    Ok(())
}

/// Install the Prometheus recorder and return the render handle served at
/// `/metrics`.
pub fn install_metrics_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MedallionError::Internal(format!("Failed to install metrics recorder: {e}")))
}

/// Record a completed ingestion.
pub fn record_ingest(zone: &str, bytes: u64) {
    counter!("medallion_ingests_total", "zone" => zone.to_string()).increment(1);
    counter!("medallion_bytes_written_total").increment(bytes);
}

/// Record a completed transformation.
pub fn record_transform(label: &str) {
    counter!("medallion_transforms_total", "transformation" => label.to_string()).increment(1);
}

/// Record a catalog search.
pub fn record_search() {
    counter!("medallion_searches_total").increment(1);
}
