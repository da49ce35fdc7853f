use thiserror::Error;

/// Errors that can occur when interacting with the loan store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for loan store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
