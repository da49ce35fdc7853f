//! Loan service providing a simplified API for loan commands.

use loan_store::LoanRepository;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{DeleteLoan, DeleteLoanHandler};

/// Service for direct (non-event) loan mutations.
///
/// Commands run on the caller's task. Each call returns the handler's
/// [`CommandResult`]; store failures propagate as [`DomainError`].
pub struct LoanService<R: LoanRepository> {
    delete_handler: DeleteLoanHandler<R>,
}

impl<R: LoanRepository> LoanService<R> {
    /// Creates a new loan service over the given repository.
    pub fn new(repository: R) -> Self {
        Self {
            delete_handler: DeleteLoanHandler::new(repository),
        }
    }

    /// Returns a reference to the delete handler.
    pub fn delete_handler(&self) -> &DeleteLoanHandler<R> {
        &self.delete_handler
    }

    /// Deletes a loan.
    #[tracing::instrument(skip(self))]
    pub async fn delete_loan(&self, cmd: DeleteLoan) -> Result<CommandResult, DomainError> {
        execute(&self.delete_handler, cmd).await
    }
}

async fn execute<C, H>(handler: &H, command: C) -> Result<CommandResult, DomainError>
where
    C: Command,
    H: CommandHandler<C>,
{
    let name = command.name();
    match handler.handle(command).await {
        Ok(result) => {
            metrics::counter!("loan_commands_total", "command" => name, "outcome" => result.outcome())
                .increment(1);
            tracing::info!(
                command = name,
                outcome = result.outcome(),
                message = result.message(),
                "command handled"
            );
            Ok(result)
        }
        Err(e) => {
            metrics::counter!("loan_commands_total", "command" => name, "outcome" => "error")
                .increment(1);
            tracing::error!(command = name, error = %e, "command failed");
            Err(e)
        }
    }
}
