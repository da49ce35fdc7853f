//! Loan commands and the service that executes them.

mod commands;
mod service;

pub use commands::{DeleteLoan, DeleteLoanHandler};
pub use service::LoanService;

/// Entity name used in command result messages.
pub const ENTITY_NAME: &str = "Peminjaman";
