//! Consumer error types.

use thiserror::Error;

use crate::broker::BrokerError;

/// Errors that can occur while consuming an event.
///
/// None of these cross the consumer boundary: the worker converts every one
/// of them into a `FAILED` outcome.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// An error occurred in the loan store.
    #[error("Loan store error: {0}")]
    Store(#[from] loan_store::StoreError),

    /// The message body is not valid JSON.
    #[error("Envelope decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The message body is JSON but not an event envelope.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// The broker rejected an acknowledgement or publish.
    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    /// A handler panicked.
    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Result type for consumer operations.
pub type Result<T> = std::result::Result<T, ConsumerError>;
