//! A single consumer worker and its failure boundary.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use loan_store::LoanRepository;
use tracing::Instrument;

use crate::broker::{Delivery, MessageSource};
use crate::config::AckPolicy;
use crate::dispatcher::EventDispatcher;
use crate::envelope::{EventEnvelope, LoanEvent};
use crate::error::ConsumerError;
use crate::handlers::HandlerOutcome;
use crate::notification::LoanNotifier;
use crate::outcome::{ConsumerReport, ProcessingOutcome, ProcessingStatus};
use crate::trace::TraceSlot;

/// Handles envelopes one at a time on its own trace slot.
///
/// Every envelope produces a [`ProcessingOutcome`]; no error or panic raised
/// while handling escapes `process`.
pub struct ConsumerWorker<R, N> {
    id: usize,
    dispatcher: Arc<EventDispatcher<R, N>>,
    ack_policy: AckPolicy,
    slot: TraceSlot,
    report: ConsumerReport,
}

impl<R: LoanRepository, N: LoanNotifier> ConsumerWorker<R, N> {
    /// Creates a worker sharing the given dispatcher.
    pub fn new(id: usize, dispatcher: Arc<EventDispatcher<R, N>>, ack_policy: AckPolicy) -> Self {
        Self {
            id,
            dispatcher,
            ack_policy,
            slot: TraceSlot::new(id),
            report: ConsumerReport::default(),
        }
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the worker's trace slot.
    pub fn trace_slot(&self) -> &TraceSlot {
        &self.slot
    }

    /// Returns the counts processed so far.
    pub fn report(&self) -> ConsumerReport {
        self.report
    }

    /// Consumes the worker, returning its counts.
    pub fn into_report(self) -> ConsumerReport {
        self.report
    }

    /// Processes one delivery and settles it with the source according to
    /// the ack policy.
    pub async fn handle_delivery<Q>(&mut self, source: &Q, delivery: Delivery) -> ProcessingOutcome
    where
        Q: MessageSource + ?Sized,
    {
        let outcome = self.process(&delivery.body).await;

        let settled = if self.ack_policy.should_ack(outcome.status) {
            source.ack(delivery.tag).await
        } else {
            source.reject(delivery.tag).await
        };
        if let Err(e) = settled {
            tracing::error!(
                worker = self.id,
                tag = delivery.tag,
                error = %ConsumerError::from(e),
                "failed to settle delivery"
            );
        }

        outcome
    }

    /// Decodes and handles one message body.
    pub async fn process(&mut self, body: &[u8]) -> ProcessingOutcome {
        let started = Instant::now();

        let envelope = match EventEnvelope::from_slice(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::info!(
                    worker = self.id,
                    event_type = ?None::<&str>,
                    event_correlation_id = ?None::<&str>,
                    "received event from queue"
                );
                tracing::error!(
                    worker = self.id,
                    status = ProcessingStatus::Failed.as_str(),
                    error = %e,
                    "failed to decode event envelope"
                );
                let outcome = ProcessingOutcome {
                    event_type: None,
                    correlation_id: None,
                    status: ProcessingStatus::Failed,
                    detail: Some(e.to_string()),
                };
                self.finish("INVALID", started, &outcome);
                return outcome;
            }
        };

        let event = LoanEvent::decode(&envelope);
        let label = event.label();
        let EventEnvelope {
            event_type,
            correlation_id,
            ..
        } = envelope;

        let guard = self.slot.bind(correlation_id.clone(), event_type.as_deref());
        let span = guard.span().clone();

        span.in_scope(|| {
            tracing::info!(
                event_type = ?event_type,
                event_correlation_id = ?correlation_id,
                "received event from queue"
            );
        });

        let handled = AssertUnwindSafe(
            self.dispatcher
                .dispatch(event, &guard)
                .instrument(span.clone()),
        )
        .catch_unwind()
        .await;

        let (status, detail) = match handled {
            Ok(Ok(HandlerOutcome::Applied)) => (ProcessingStatus::Success, None),
            Ok(Ok(HandlerOutcome::Skipped(reason))) => (ProcessingStatus::Skipped, Some(reason)),
            Ok(Err(e)) => (ProcessingStatus::Failed, Some(e.to_string())),
            Err(panic) => {
                let e = ConsumerError::Panicked(panic_message(panic.as_ref()));
                (ProcessingStatus::Failed, Some(e.to_string()))
            }
        };

        span.in_scope(|| match status {
            ProcessingStatus::Failed => tracing::error!(
                event_type = ?event_type,
                status = status.as_str(),
                error = detail.as_deref().unwrap_or_default(),
                "failed to process event"
            ),
            ProcessingStatus::Skipped => tracing::info!(
                event_type = ?event_type,
                status = status.as_str(),
                reason = detail.as_deref().unwrap_or_default(),
                "event processed, side effect skipped"
            ),
            ProcessingStatus::Success => tracing::info!(
                event_type = ?event_type,
                status = status.as_str(),
                "event processed successfully"
            ),
        });

        drop(guard);

        let outcome = ProcessingOutcome {
            event_type,
            correlation_id,
            status,
            detail,
        };
        self.finish(label, started, &outcome);
        outcome
    }

    fn finish(&mut self, label: &'static str, started: Instant, outcome: &ProcessingOutcome) {
        self.report.record(outcome.status);
        metrics::counter!(
            "consumer_events_total",
            "event_type" => label,
            "status" => outcome.status.as_str()
        )
        .increment(1);
        metrics::histogram!("consumer_event_duration_seconds", "event_type" => label)
            .record(started.elapsed().as_secs_f64());
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
