//! Command side of the peminjaman service.
//!
//! This crate provides:
//! - [`CommandResult`], the success/failure outcome shared by every mutation
//! - [`Command`] and [`CommandHandler`] for direct, synchronous commands
//! - the loan delete command and the [`LoanService`] façade

pub mod command;
pub mod error;
pub mod loan;

pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use loan::{DeleteLoan, DeleteLoanHandler, LoanService};
