//! Tracing subscriber and Prometheus exporter setup.

use std::net::{Ipv4Addr, SocketAddr};

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};
use crate::error::ServiceError;

/// Installs the global tracing subscriber.
///
/// An invalid filter directive falls back to `info`.
pub fn init_tracing(config: &Config) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    Ok(())
}

/// Installs the Prometheus recorder with its scrape listener, unless the
/// configured port is `0`.
///
/// Must be called from within a Tokio runtime.
pub fn install_metrics(config: &Config) -> Result<Option<SocketAddr>, ServiceError> {
    if !config.metrics_enabled() {
        tracing::info!("metrics exporter disabled");
        return Ok(None);
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.metrics_port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(%addr, "metrics exporter listening");

    Ok(Some(addr))
}
