//! Loan aggregate as persisted by the upstream peminjaman service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::LoanId;

/// The status of a loan in its lifecycle.
///
/// Transitions driven by this service:
/// ```text
/// DIPINJAM ──► DIKEMBALIKAN ──┐
///                   ▲         │
///                   └─────────┘  (re-applied return)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoanStatus {
    /// The book is currently borrowed.
    #[default]
    #[serde(rename = "DIPINJAM")]
    Dipinjam,

    /// The book has been returned.
    #[serde(rename = "DIKEMBALIKAN")]
    Dikembalikan,
}

impl LoanStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Dipinjam => "DIPINJAM",
            LoanStatus::Dikembalikan => "DIKEMBALIKAN",
        }
    }

    /// Returns true if the loan has been returned.
    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Dikembalikan)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is not one of the known wire names.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown loan status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for LoanStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DIPINJAM" => Ok(LoanStatus::Dipinjam),
            "DIKEMBALIKAN" => Ok(LoanStatus::Dikembalikan),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A loan (peminjaman) of a single book by a library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub member_id: i64,
    pub book_id: i64,
    pub borrowed_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl Loan {
    /// Creates a loan in the borrowed state.
    pub fn borrowed(id: LoanId, member_id: i64, book_id: i64, borrowed_on: NaiveDate) -> Self {
        Self {
            id,
            member_id,
            book_id,
            borrowed_on,
            due_on: None,
            status: LoanStatus::Dipinjam,
        }
    }

    /// Sets the due date.
    pub fn with_due_on(mut self, due_on: NaiveDate) -> Self {
        self.due_on = Some(due_on);
        self
    }

    /// Marks the loan as returned. Returning an already returned loan keeps
    /// it returned.
    pub fn mark_returned(&mut self) {
        self.status = LoanStatus::Dikembalikan;
    }
}
