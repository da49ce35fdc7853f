use serde::{Deserialize, Serialize};

/// Unique identifier for a loan (peminjaman) aggregate.
///
/// Wraps the integer key assigned by the upstream service so loan IDs cannot
/// be mixed up with member or book identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(i64);

impl LoanId {
    /// Creates a loan ID from its raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for LoanId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<LoanId> for i64 {
    fn from(id: LoanId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_id_preserves_value() {
        let id = LoanId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn loan_id_displays_raw_number() {
        assert_eq!(LoanId::from(7).to_string(), "7");
    }

    #[test]
    fn loan_id_serializes_transparently() {
        let json = serde_json::to_string(&LoanId::new(15)).unwrap();
        assert_eq!(json, "15");
        let back: LoanId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LoanId::new(15));
    }
}
