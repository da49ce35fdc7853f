//! Command handling infrastructure.

use async_trait::async_trait;
use common::LoanId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Terminal outcome of a command.
///
/// Produced once per command and never mutated afterwards. Business-rule
/// rejections are reported as [`CommandResult::Failure`]; infrastructure
/// faults are not results at all but `Err(DomainError)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CommandResult {
    /// The command was applied to the loan with the given ID.
    Success { id: LoanId, message: String },

    /// The command was rejected.
    Failure { message: String },
}

impl CommandResult {
    /// Creates a successful result.
    pub fn success(id: LoanId, message: impl Into<String>) -> Self {
        CommandResult::Success {
            id,
            message: message.into(),
        }
    }

    /// Creates a failed result.
    pub fn failure(message: impl Into<String>) -> Self {
        CommandResult::Failure {
            message: message.into(),
        }
    }

    /// Returns true if the command succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success { .. })
    }

    /// Returns the affected loan ID. Failures never carry one.
    pub fn id(&self) -> Option<LoanId> {
        match self {
            CommandResult::Success { id, .. } => Some(*id),
            CommandResult::Failure { .. } => None,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            CommandResult::Success { message, .. } | CommandResult::Failure { message } => message,
        }
    }

    /// Returns `"success"` or `"failure"`, used as a metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            CommandResult::Success { .. } => "success",
            CommandResult::Failure { .. } => "failure",
        }
    }
}

/// An immutable request carrying exactly the input its handler needs.
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Returns the command name used in logs and metrics.
    fn name(&self) -> &'static str;
}

/// Executes one command type.
///
/// Handlers take `&self` and hold no mutable state, so a single instance can
/// be shared by concurrent callers.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    /// Handles the command.
    ///
    /// Returns `Ok(CommandResult::Failure)` for business-rule rejections and
    /// `Err` only when the underlying infrastructure fails.
    async fn handle(&self, command: C) -> Result<CommandResult, DomainError>;
}
