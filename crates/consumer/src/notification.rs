//! Notification collaborator for loan-created events.

use std::sync::Arc;

use async_trait::async_trait;
use common::LoanId;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;

/// What the notifier receives for a newly created loan.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanCreatedNotice {
    /// The loan ID, when the event carried one.
    pub loan_id: Option<LoanId>,
    /// The event data as published.
    pub details: Map<String, Value>,
    /// Correlation ID of the triggering event, for cross-service tracing.
    pub correlation_id: Option<String>,
}

/// Errors raised by a notifier.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification could not be delivered.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Sends loan notifications (e.g. email) to members.
#[async_trait]
pub trait LoanNotifier: Send + Sync {
    /// Notifies that a loan was created.
    async fn notify_loan_created(&self, notice: LoanCreatedNotice) -> Result<(), NotificationError>;
}

/// Notifier that only logs what would be sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl LoanNotifier for LoggingNotifier {
    async fn notify_loan_created(&self, notice: LoanCreatedNotice) -> Result<(), NotificationError> {
        let data = Value::Object(notice.details);
        tracing::info!(
            loan_id = ?notice.loan_id,
            correlation_id = ?notice.correlation_id,
            data = %data,
            "email notification would be sent here"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    notices: Vec<LoanCreatedNotice>,
    fail: bool,
}

/// In-memory notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail every delivery.
    pub async fn set_fail(&self, fail: bool) {
        self.state.write().await.fail = fail;
    }

    /// Returns the delivered notices.
    pub async fn notices(&self) -> Vec<LoanCreatedNotice> {
        self.state.read().await.notices.clone()
    }

    /// Returns the number of delivered notices.
    pub async fn notice_count(&self) -> usize {
        self.state.read().await.notices.len()
    }
}

#[async_trait]
impl LoanNotifier for InMemoryNotifier {
    async fn notify_loan_created(&self, notice: LoanCreatedNotice) -> Result<(), NotificationError> {
        let mut state = self.state.write().await;

        if state.fail {
            return Err(NotificationError::Delivery("mail server refused".to_string()));
        }

        state.notices.push(notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    fn notice(id: i64) -> LoanCreatedNotice {
        LoanCreatedNotice {
            loan_id: Some(LoanId::new(id)),
            details: Map::new(),
            correlation_id: Some(format!("corr-{id}")),
        }
    }

    #[tokio::test]
    async fn test_records_notices() {
        let notifier = InMemoryNotifier::new();
        notifier.notify_loan_created(notice(1)).await.unwrap();
        notifier.notify_loan_created(notice(2)).await.unwrap();

        let notices = notifier.notices().await;
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].correlation_id.as_deref(), Some("corr-2"));
    }

    #[tokio::test]
    async fn test_fail_records_nothing() {
        let notifier = InMemoryNotifier::new();
        notifier.set_fail(true).await;

        assert!(notifier.notify_loan_created(notice(1)).await.is_err());
        assert_eq!(notifier.notice_count().await, 0);
    }

    #[tokio::test]
    async fn test_logging_notifier_always_succeeds() {
        assert!(LoggingNotifier.notify_loan_created(notice(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_logging_notifier_logs_event_data() {
        let (logs, _guard) = capture_logs();
        let mut created = notice(7);
        created
            .details
            .insert("email".to_string(), Value::from("anggota@perpus.id"));

        LoggingNotifier.notify_loan_created(created).await.unwrap();

        let output = logs.contents();
        assert!(output.contains("email notification would be sent here"));
        assert!(output.contains("anggota@perpus.id"));
    }
}
