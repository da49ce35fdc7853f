pub mod error;
pub mod memory;
pub mod store;

pub use common::{Loan, LoanId, LoanStatus};
pub use error::{Result, StoreError};
pub use memory::InMemoryLoanRepository;
pub use store::LoanRepository;
