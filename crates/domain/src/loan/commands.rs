//! Loan commands.

use async_trait::async_trait;
use common::LoanId;
use loan_store::LoanRepository;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;

use super::ENTITY_NAME;

/// Command to delete a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteLoan {
    /// The loan to delete.
    pub id: LoanId,
}

impl DeleteLoan {
    /// Creates a new DeleteLoan command.
    pub fn new(id: impl Into<LoanId>) -> Self {
        Self { id: id.into() }
    }
}

impl Command for DeleteLoan {
    fn name(&self) -> &'static str {
        "DeleteLoan"
    }
}

/// Handler for [`DeleteLoan`].
///
/// Checks existence first and deletes at most once. Deleting the same ID
/// twice yields `Success` then `Failure`.
#[derive(Debug, Clone)]
pub struct DeleteLoanHandler<R: LoanRepository> {
    repository: R,
}

impl<R: LoanRepository> DeleteLoanHandler<R> {
    /// Creates a handler over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: LoanRepository> CommandHandler<DeleteLoan> for DeleteLoanHandler<R> {
    async fn handle(&self, command: DeleteLoan) -> Result<CommandResult, DomainError> {
        if !self.repository.exists_by_id(command.id).await? {
            tracing::debug!(loan_id = %command.id, "loan not found, nothing to delete");
            return Ok(CommandResult::failure(format!(
                "{ENTITY_NAME} not found with ID: {}",
                command.id
            )));
        }

        self.repository.delete_by_id(command.id).await?;
        Ok(CommandResult::success(
            command.id,
            format!("{ENTITY_NAME} deleted successfully"),
        ))
    }
}
