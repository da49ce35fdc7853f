//! Processing outcomes and worker reports.

/// Terminal status of one envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStatus {
    /// Handled, including deliberate no-ops.
    Success,
    /// Handling raised an error or panicked.
    Failed,
    /// A side effect was skipped because the data could not be used.
    Skipped,
}

impl ProcessingStatus {
    /// Returns the status as logged (`SUCCESS`, `FAILED`, `SKIPPED`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "SUCCESS",
            ProcessingStatus::Failed => "FAILED",
            ProcessingStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    pub event_type: Option<String>,
    pub correlation_id: Option<String>,
    pub status: ProcessingStatus,
    /// Error message for failures, reason for skips.
    pub detail: Option<String>,
}

/// Counts of processed envelopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl ConsumerReport {
    /// Records one outcome.
    pub fn record(&mut self, status: ProcessingStatus) {
        self.processed += 1;
        match status {
            ProcessingStatus::Success => self.succeeded += 1,
            ProcessingStatus::Failed => self.failed += 1,
            ProcessingStatus::Skipped => self.skipped += 1,
        }
    }

    /// Adds another report's counts to this one.
    pub fn merge(&mut self, other: ConsumerReport) {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_records_and_merges() {
        let mut a = ConsumerReport::default();
        a.record(ProcessingStatus::Success);
        a.record(ProcessingStatus::Failed);

        let mut b = ConsumerReport::default();
        b.record(ProcessingStatus::Skipped);

        a.merge(b);
        assert_eq!(
            a,
            ConsumerReport {
                processed: 3,
                succeeded: 1,
                failed: 1,
                skipped: 1,
            }
        );
    }

    #[test]
    fn status_strings() {
        assert_eq!(ProcessingStatus::Failed.to_string(), "FAILED");
        assert_eq!(ProcessingStatus::Skipped.as_str(), "SKIPPED");
    }
}
