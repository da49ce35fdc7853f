//! Routes decoded events to their handlers.

use loan_store::LoanRepository;

use crate::envelope::LoanEvent;
use crate::error::Result;
use crate::handlers::{self, HandlerOutcome};
use crate::notification::LoanNotifier;
use crate::trace::TraceContext;

/// Owns the collaborators handlers need and routes each event by type.
///
/// Holds no per-event state, so one dispatcher is shared by all workers.
pub struct EventDispatcher<R, N> {
    repository: R,
    notifier: N,
}

impl<R: LoanRepository, N: LoanNotifier> EventDispatcher<R, N> {
    /// Creates a dispatcher.
    pub fn new(repository: R, notifier: N) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Returns the loan repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Handles one event under the given trace context.
    pub async fn dispatch(&self, event: LoanEvent, context: &TraceContext) -> Result<HandlerOutcome> {
        match event {
            LoanEvent::LoanCreated(payload) => {
                Ok(handlers::loan_created(&self.notifier, payload, context).await)
            }
            LoanEvent::ReturnCreated(payload) => {
                handlers::return_created(&self.repository, payload).await
            }
            LoanEvent::LoanUpdated => Ok(handlers::loan_updated()),
            LoanEvent::Unrecognized(event_type) => Ok(handlers::unrecognized(event_type.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{LoanCreated, PayloadError, ReturnCreated};
    use crate::error::ConsumerError;
    use crate::notification::InMemoryNotifier;
    use chrono::NaiveDate;
    use common::{Loan, LoanId, LoanStatus};
    use loan_store::InMemoryLoanRepository;
    use serde_json::json;

    fn dispatcher(ids: &[i64]) -> EventDispatcher<InMemoryLoanRepository, InMemoryNotifier> {
        let loans = ids.iter().map(|id| {
            Loan::borrowed(
                LoanId::new(*id),
                1,
                1,
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            )
        });
        EventDispatcher::new(
            InMemoryLoanRepository::with_loans(loans),
            InMemoryNotifier::new(),
        )
    }

    fn context(correlation_id: Option<&str>) -> TraceContext {
        TraceContext::new(correlation_id.map(str::to_string), None, 0)
    }

    fn returned(id: i64) -> LoanEvent {
        LoanEvent::ReturnCreated(Ok(ReturnCreated {
            loan_id: LoanId::new(id),
        }))
    }

    #[tokio::test]
    async fn test_return_marks_loan_returned_once() {
        let d = dispatcher(&[1]);

        let outcome = d.dispatch(returned(1), &context(None)).await.unwrap();

        assert_eq!(outcome, HandlerOutcome::Applied);
        let loan = d.repository().find_by_id(LoanId::new(1)).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Dikembalikan);
        assert_eq!(d.repository().save_count().await, 1);
    }

    #[tokio::test]
    async fn test_repeated_return_resaves_same_status() {
        let d = dispatcher(&[1]);

        d.dispatch(returned(1), &context(None)).await.unwrap();
        d.dispatch(returned(1), &context(None)).await.unwrap();

        let loan = d.repository().find_by_id(LoanId::new(1)).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Dikembalikan);
        assert_eq!(d.repository().save_count().await, 2);
    }

    #[tokio::test]
    async fn test_return_for_unknown_loan_is_silent() {
        let d = dispatcher(&[1]);

        let outcome = d.dispatch(returned(2), &context(None)).await.unwrap();

        assert_eq!(outcome, HandlerOutcome::Applied);
        assert_eq!(d.repository().mutation_count().await, 0);
    }

    #[tokio::test]
    async fn test_return_without_data_is_skipped() {
        let d = dispatcher(&[1]);

        let outcome = d
            .dispatch(
                LoanEvent::ReturnCreated(Err(PayloadError::MissingData)),
                &context(None),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, HandlerOutcome::Skipped(_)));
        assert_eq!(d.repository().mutation_count().await, 0);
    }

    #[tokio::test]
    async fn test_return_with_unreadable_data_is_skipped() {
        let d = dispatcher(&[1]);

        for error in [
            PayloadError::InvalidData("a string"),
            PayloadError::MissingField("peminjamanId"),
            PayloadError::InvalidField {
                field: "peminjamanId",
                expected: "a number within the loan ID range",
                found: "a string",
            },
        ] {
            let outcome = d
                .dispatch(LoanEvent::ReturnCreated(Err(error)), &context(None))
                .await
                .unwrap();
            assert!(matches!(outcome, HandlerOutcome::Skipped(_)));
        }

        assert_eq!(d.repository().mutation_count().await, 0);
    }

    #[tokio::test]
    async fn test_return_store_failure_is_an_error() {
        let d = dispatcher(&[1]);
        d.repository().set_unavailable(true).await;

        let result = d.dispatch(returned(1), &context(None)).await;

        assert!(matches!(result, Err(ConsumerError::Store(_))));
    }

    #[tokio::test]
    async fn test_created_notifies_with_correlation_id() {
        let d = dispatcher(&[]);
        let payload = LoanCreated::from_data(Some(&json!({"id": 4, "email": "m@x.id"})));

        let outcome = d
            .dispatch(LoanEvent::LoanCreated(payload), &context(Some("corr-9")))
            .await
            .unwrap();

        assert_eq!(outcome, HandlerOutcome::Applied);
        let notices = d.notifier().notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].loan_id, Some(LoanId::new(4)));
        assert_eq!(notices[0].correlation_id.as_deref(), Some("corr-9"));
    }

    #[tokio::test]
    async fn test_created_with_bad_data_skips_notification() {
        let d = dispatcher(&[]);

        let outcome = d
            .dispatch(
                LoanEvent::LoanCreated(Err(PayloadError::InvalidData("a string"))),
                &context(None),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, HandlerOutcome::Skipped(_)));
        assert_eq!(d.notifier().notice_count().await, 0);
    }

    #[tokio::test]
    async fn test_created_delivery_failure_is_not_fatal() {
        let d = dispatcher(&[]);
        d.notifier().set_fail(true).await;
        let payload = LoanCreated::from_data(Some(&json!({"id": 4})));

        let outcome = d
            .dispatch(LoanEvent::LoanCreated(payload), &context(None))
            .await
            .unwrap();

        assert!(matches!(outcome, HandlerOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn test_updated_and_unknown_have_no_side_effects() {
        let d = dispatcher(&[1]);

        let updated = d.dispatch(LoanEvent::LoanUpdated, &context(None)).await.unwrap();
        let unknown = d
            .dispatch(
                LoanEvent::Unrecognized(Some("BUKU_CREATED".to_string())),
                &context(None),
            )
            .await
            .unwrap();

        assert_eq!(updated, HandlerOutcome::Applied);
        assert_eq!(unknown, HandlerOutcome::Applied);
        assert_eq!(d.repository().mutation_count().await, 0);
        assert_eq!(d.notifier().notice_count().await, 0);
    }
}
