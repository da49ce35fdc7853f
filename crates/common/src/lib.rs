//! Shared types for the peminjaman service.

pub mod loan;
pub mod types;

pub use loan::{Loan, LoanStatus, UnknownStatus};
pub use types::LoanId;
