//! Consumer configuration.

use thiserror::Error;

use crate::outcome::ProcessingStatus;

/// Queue consumed when none is configured.
pub const DEFAULT_QUEUE: &str = "peminjaman.queue";

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 4;

/// When a delivery is positively acknowledged.
///
/// `Always` keeps the stream live: every envelope is attempted once and
/// acknowledged even if handling failed, so a failed event is not retried.
/// `OnSuccess` rejects failed envelopes so the broker can redeliver or
/// dead-letter them, at the risk of a poisoned message being redelivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AckPolicy {
    #[default]
    Always,
    OnSuccess,
}

impl AckPolicy {
    /// Returns true if a delivery with the given status should be acked.
    pub fn should_ack(&self, status: ProcessingStatus) -> bool {
        match self {
            AckPolicy::Always => true,
            AckPolicy::OnSuccess => status != ProcessingStatus::Failed,
        }
    }

    /// Returns the configuration name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            AckPolicy::Always => "always",
            AckPolicy::OnSuccess => "on_success",
        }
    }
}

impl std::fmt::Display for AckPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an ack policy name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown ack policy: {0} (expected `always` or `on_success`)")]
pub struct UnknownAckPolicy(pub String);

impl std::str::FromStr for AckPolicy {
    type Err = UnknownAckPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(AckPolicy::Always),
            "on_success" | "on-success" => Ok(AckPolicy::OnSuccess),
            _ => Err(UnknownAckPolicy(s.to_string())),
        }
    }
}

/// Consumer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Name of the queue to consume.
    pub queue: String,
    /// Number of concurrent workers (at least one is always started).
    pub workers: usize,
    /// Acknowledgement policy.
    pub ack_policy: AckPolicy,
}

impl ConsumerConfig {
    /// Sets the queue name.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the ack policy.
    pub fn with_ack_policy(mut self, ack_policy: AckPolicy) -> Self {
        self.ack_policy = ack_policy;
        self
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            queue: DEFAULT_QUEUE.to_string(),
            workers: DEFAULT_WORKERS,
            ack_policy: AckPolicy::Always,
        }
    }
}
