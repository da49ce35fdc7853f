use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Loan, LoanId, Result, StoreError, store::LoanRepository};

#[derive(Debug, Default)]
struct InMemoryState {
    loans: HashMap<LoanId, Loan>,
    saves: usize,
    deletes: usize,
    unavailable: bool,
}

impl InMemoryState {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// In-memory loan repository for testing and local runs.
///
/// Clones share the same underlying state. Saves and deletes are counted so
/// callers can assert how many mutations an operation performed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoanRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryLoanRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with loans. Seeding is not counted
    /// as a mutation.
    pub fn with_loans(loans: impl IntoIterator<Item = Loan>) -> Self {
        let state = InMemoryState {
            loans: loans.into_iter().map(|loan| (loan.id, loan)).collect(),
            ..InMemoryState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Creates a repository from a JSON array of loans, as written by
    /// [`snapshot_json`](Self::snapshot_json). Loading is not counted as a
    /// mutation.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let loans: Vec<Loan> = serde_json::from_slice(bytes)?;
        Ok(Self::with_loans(loans))
    }

    /// Serializes the stored loans as a JSON array ordered by ID.
    pub async fn snapshot_json(&self) -> Result<Vec<u8>> {
        let state = self.state.read().await;
        let mut loans: Vec<&Loan> = state.loans.values().collect();
        loans.sort_by_key(|loan| loan.id);
        Ok(serde_json::to_vec(&loans)?)
    }

    /// Returns the number of stored loans.
    pub async fn len(&self) -> usize {
        self.state.read().await.loans.len()
    }

    /// Returns true if no loans are stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.loans.is_empty()
    }

    /// Returns the number of successful `save` calls.
    pub async fn save_count(&self) -> usize {
        self.state.read().await.saves
    }

    /// Returns the number of successful `delete_by_id` calls.
    pub async fn delete_count(&self) -> usize {
        self.state.read().await.deletes
    }

    /// Returns the total number of mutations (saves and deletes).
    pub async fn mutation_count(&self) -> usize {
        let state = self.state.read().await;
        state.saves + state.deletes
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

#[async_trait]
impl LoanRepository for InMemoryLoanRepository {
    async fn exists_by_id(&self, id: LoanId) -> Result<bool> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.loans.contains_key(&id))
    }

    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.loans.get(&id).cloned())
    }

    async fn save(&self, loan: Loan) -> Result<Loan> {
        let mut state = self.state.write().await;
        state.check_available()?;
        state.loans.insert(loan.id, loan.clone());
        state.saves += 1;
        tracing::trace!(loan_id = %loan.id, status = %loan.status, "loan saved");
        Ok(loan)
    }

    async fn delete_by_id(&self, id: LoanId) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        if state.loans.remove(&id).is_some() {
            state.deletes += 1;
        }
        Ok(())
    }
}
