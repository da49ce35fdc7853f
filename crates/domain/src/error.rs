//! Domain error types.

use loan_store::StoreError;
use thiserror::Error;

/// Infrastructure failures raised while executing a command.
///
/// Business-rule rejections are never errors; see
/// [`CommandResult::Failure`](crate::CommandResult::Failure).
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the loan store.
    #[error("Loan store error: {0}")]
    Store(#[from] StoreError),
}
