//! Peminjaman consumer service.
//!
//! Loads [`Config`] from the environment, sets up tracing and the Prometheus
//! exporter, and runs an [`App`] that feeds newline-delimited input into the
//! event consumer.

pub mod app;
pub mod config;
pub mod error;
pub mod telemetry;

pub use app::{App, InputLine, load_repository};
pub use config::{Config, LogFormat};
pub use error::ServiceError;
