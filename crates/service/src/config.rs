//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use consumer::{AckPolicy, ConsumerConfig, DEFAULT_QUEUE, DEFAULT_WORKERS};

/// Default Prometheus exporter port.
pub const DEFAULT_METRICS_PORT: u16 = 9000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name. Anything but `json` selects [`LogFormat::Pretty`].
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `QUEUE_NAME` — queue to consume (default: `"peminjaman.queue"`)
/// - `CONSUMER_WORKERS` — concurrent workers, at least 1 (default: `4`)
/// - `ACK_POLICY` — `always` or `on_success` (default: `always`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `pretty` or `json` (default: `pretty`)
/// - `METRICS_PORT` — Prometheus exporter port, `0` disables it (default: `9000`)
/// - `SEED_FILE` — JSON array of loans to preload (default: none)
#[derive(Debug, Clone)]
pub struct Config {
    pub consumer: ConsumerConfig,
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_port: u16,
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through the given variable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let ack_policy = lookup("ACK_POLICY")
            .and_then(|s| s.parse::<AckPolicy>().ok())
            .unwrap_or(defaults.consumer.ack_policy);

        let consumer = ConsumerConfig::default()
            .with_queue(lookup("QUEUE_NAME").unwrap_or_else(|| DEFAULT_QUEUE.to_string()))
            .with_workers(
                lookup("CONSUMER_WORKERS")
                    .and_then(|w| w.trim().parse::<usize>().ok())
                    .unwrap_or(DEFAULT_WORKERS)
                    .max(1),
            )
            .with_ack_policy(ack_policy);

        Self {
            consumer,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            metrics_port: lookup("METRICS_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_METRICS_PORT),
            seed_file: lookup("SEED_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Returns true if the Prometheus exporter should be installed.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port != 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer: ConsumerConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: DEFAULT_METRICS_PORT,
            seed_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.consumer.queue, "peminjaman.queue");
        assert_eq!(config.consumer.workers, 4);
        assert_eq!(config.consumer.ack_policy, AckPolicy::Always);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.metrics_port, 9000);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_empty_environment_yields_defaults() {
        let config = from_vars(&[]);
        assert_eq!(config.consumer, ConsumerConfig::default());
        assert_eq!(config.metrics_port, DEFAULT_METRICS_PORT);
        assert!(config.metrics_enabled());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = from_vars(&[
            ("QUEUE_NAME", "loans.events"),
            ("CONSUMER_WORKERS", "8"),
            ("ACK_POLICY", "on_success"),
            ("RUST_LOG", "consumer=debug"),
            ("LOG_FORMAT", "JSON"),
            ("METRICS_PORT", "0"),
            ("SEED_FILE", "/tmp/loans.json"),
        ]);

        assert_eq!(config.consumer.queue, "loans.events");
        assert_eq!(config.consumer.workers, 8);
        assert_eq!(config.consumer.ack_policy, AckPolicy::OnSuccess);
        assert_eq!(config.log_level, "consumer=debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.metrics_enabled());
        assert_eq!(config.seed_file, Some(PathBuf::from("/tmp/loans.json")));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_vars(&[
            ("CONSUMER_WORKERS", "many"),
            ("ACK_POLICY", "sometimes"),
            ("METRICS_PORT", "99999"),
            ("LOG_FORMAT", "xml"),
            ("SEED_FILE", " "),
        ]);

        assert_eq!(config.consumer.workers, DEFAULT_WORKERS);
        assert_eq!(config.consumer.ack_policy, AckPolicy::Always);
        assert_eq!(config.metrics_port, DEFAULT_METRICS_PORT);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        let config = from_vars(&[("CONSUMER_WORKERS", "0")]);
        assert_eq!(config.consumer.workers, 1);
    }
}
