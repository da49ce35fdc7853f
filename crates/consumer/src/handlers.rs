//! Per-event-type handlers.

use loan_store::LoanRepository;

use crate::envelope::{LoanCreated, PayloadError, ReturnCreated};
use crate::error::Result;
use crate::notification::{LoanCreatedNotice, LoanNotifier};
use crate::trace::TraceContext;

/// Result of a handler that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The event was handled (possibly as a deliberate no-op).
    Applied,
    /// The side effect was skipped for the given reason.
    Skipped(String),
}

/// `PEMINJAMAN_CREATED`: notify the member. Never fails; unusable data or a
/// failed delivery skips the notification.
pub(crate) async fn loan_created<N: LoanNotifier>(
    notifier: &N,
    payload: std::result::Result<LoanCreated, PayloadError>,
    context: &TraceContext,
) -> HandlerOutcome {
    tracing::info!(action = "SEND_EMAIL", "handling PEMINJAMAN_CREATED event");

    let created = match payload {
        Ok(created) => created,
        Err(e) => {
            tracing::warn!(error = %e, "skipping email notification, could not read event data");
            return HandlerOutcome::Skipped(format!("notification skipped: {e}"));
        }
    };

    let loan_id = created.loan_id;
    let notice = LoanCreatedNotice {
        loan_id,
        details: created.details,
        correlation_id: context.correlation_id().map(str::to_string),
    };

    match notifier.notify_loan_created(notice).await {
        Ok(()) => {
            tracing::info!(loan_id = ?loan_id, "loan created notification sent");
            HandlerOutcome::Applied
        }
        Err(e) => {
            tracing::warn!(loan_id = ?loan_id, error = %e, "skipping email notification, delivery failed");
            HandlerOutcome::Skipped(format!("notification skipped: {e}"))
        }
    }
}

/// `PENGEMBALIAN_CREATED`: mark the loan returned.
///
/// A return for an unknown loan is ignored, and unreadable data skips the
/// update. Only store failures are errors.
pub(crate) async fn return_created<R: LoanRepository>(
    repository: &R,
    payload: std::result::Result<ReturnCreated, PayloadError>,
) -> Result<HandlerOutcome> {
    tracing::info!(action = "UPDATE_STATUS", "handling PENGEMBALIAN_CREATED event");

    let returned = match payload {
        Ok(returned) => returned,
        Err(PayloadError::MissingData) => {
            tracing::debug!("return event carries no data, nothing to update");
            return Ok(HandlerOutcome::Skipped("return event has no data".to_string()));
        }
        Err(e) => {
            tracing::warn!(error = %e, "skipping status update, could not read event data");
            return Ok(HandlerOutcome::Skipped(format!("status update skipped: {e}")));
        }
    };

    let Some(mut loan) = repository.find_by_id(returned.loan_id).await? else {
        tracing::debug!(loan_id = %returned.loan_id, "no loan for return event, ignoring");
        return Ok(HandlerOutcome::Applied);
    };

    loan.mark_returned();
    let saved = repository.save(loan).await?;
    tracing::info!(loan_id = %saved.id, status = %saved.status, "updated loan status");

    Ok(HandlerOutcome::Applied)
}

/// `PEMINJAMAN_UPDATED`: log only, reserved for future synchronization.
pub(crate) fn loan_updated() -> HandlerOutcome {
    tracing::info!("processing PEMINJAMAN_UPDATED event, no state to synchronize");
    HandlerOutcome::Applied
}

/// Fallback for unknown or missing event types.
pub(crate) fn unrecognized(event_type: Option<&str>) -> HandlerOutcome {
    tracing::warn!(event_type = ?event_type, "unknown event type received");
    HandlerOutcome::Applied
}
