//! Service error types.

use consumer::BrokerError;
use domain::DomainError;
use thiserror::Error;

/// Errors that stop the service or an input line.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The Prometheus exporter could not be installed.
    #[error("Metrics exporter error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// The tracing subscriber could not be installed.
    #[error("Tracing setup error: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),

    /// Reading input or the seed file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The seed file is not a JSON array of loans.
    #[error("Invalid seed file: {0}")]
    Seed(#[from] loan_store::StoreError),

    /// The consumer task did not finish cleanly.
    #[error("Consumer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The queue refused a message.
    #[error("Queue error: {0}")]
    Broker(#[from] BrokerError),

    /// A direct command failed on infrastructure.
    #[error("Command error: {0}")]
    Domain(#[from] DomainError),
}
