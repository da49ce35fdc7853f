//! Worker pool consuming a message source.

use std::sync::Arc;

use loan_store::LoanRepository;
use tokio::task::JoinSet;

use crate::broker::MessageSource;
use crate::config::ConsumerConfig;
use crate::dispatcher::EventDispatcher;
use crate::notification::LoanNotifier;
use crate::outcome::ConsumerReport;
use crate::worker::ConsumerWorker;

/// Consumes loan events with a pool of concurrent workers.
///
/// Each delivery is handled end-to-end by exactly one worker. There is no
/// ordering between workers, and two events for the same loan may be
/// handled concurrently.
pub struct EventConsumer<R, N> {
    dispatcher: Arc<EventDispatcher<R, N>>,
    config: ConsumerConfig,
}

impl<R, N> EventConsumer<R, N>
where
    R: LoanRepository + 'static,
    N: LoanNotifier + 'static,
{
    /// Creates a consumer.
    pub fn new(repository: R, notifier: N, config: ConsumerConfig) -> Self {
        Self {
            dispatcher: Arc::new(EventDispatcher::new(repository, notifier)),
            config,
        }
    }

    /// Returns the consumer configuration.
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Returns the shared dispatcher.
    pub fn dispatcher(&self) -> &EventDispatcher<R, N> {
        &self.dispatcher
    }

    /// Creates a standalone worker sharing this consumer's dispatcher.
    pub fn worker(&self, id: usize) -> ConsumerWorker<R, N> {
        ConsumerWorker::new(id, Arc::clone(&self.dispatcher), self.config.ack_policy)
    }

    /// Runs the worker pool until the source is closed and drained.
    #[tracing::instrument(skip(self, source), fields(queue = %source.queue_name()))]
    pub async fn run<Q>(&self, source: Arc<Q>) -> ConsumerReport
    where
        Q: MessageSource + 'static,
    {
        if source.queue_name() != self.config.queue {
            tracing::warn!(
                configured = %self.config.queue,
                "consuming a queue other than the configured one"
            );
        }

        let workers = self.config.workers.max(1);
        tracing::info!(
            workers,
            ack_policy = %self.config.ack_policy,
            "starting event consumer"
        );

        let mut pool = JoinSet::new();
        for id in 0..workers {
            let mut worker = self.worker(id);
            let source = Arc::clone(&source);
            pool.spawn(async move {
                while let Some(delivery) = source.receive().await {
                    worker.handle_delivery(source.as_ref(), delivery).await;
                }
                tracing::debug!(worker = worker.id(), "queue drained, worker stopping");
                worker.into_report()
            });
        }

        let mut report = ConsumerReport::default();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(worker_report) => report.merge(worker_report),
                Err(e) => tracing::error!(error = %e, "consumer worker terminated abnormally"),
            }
        }

        tracing::info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "event consumer stopped"
        );

        report
    }
}
