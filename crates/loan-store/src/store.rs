use async_trait::async_trait;

use crate::{Loan, LoanId, Result};

/// Key-addressable repository for loan aggregates.
///
/// The loan rows are owned by the upstream peminjaman service; this crate only
/// reads, updates and deletes them. All implementations must be thread-safe
/// (Send + Sync) since consumer workers share one repository.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Returns true if a loan with the given ID exists.
    async fn exists_by_id(&self, id: LoanId) -> Result<bool>;

    /// Retrieves a loan by ID.
    ///
    /// Returns None if no loan has that ID.
    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>>;

    /// Inserts or replaces a loan, returning the stored value.
    async fn save(&self, loan: Loan) -> Result<Loan>;

    /// Deletes a loan by ID. Deleting a missing ID is not an error.
    async fn delete_by_id(&self, id: LoanId) -> Result<()>;
}
