//! Wiring of the loan store, the direct command path and the event consumer.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use common::LoanId;
use consumer::{ConsumerConfig, ConsumerReport, EventConsumer, InMemoryQueue, LoanNotifier};
use domain::{DeleteLoan, LoanService};
use loan_store::InMemoryLoanRepository;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::ServiceError;

/// One line of driver input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// Empty or whitespace-only.
    Blank,
    /// `delete <id>`: run the delete command directly.
    Delete(LoanId),
    /// A `delete` line without a usable ID.
    Malformed(String),
    /// Anything else, published to the queue as-is.
    Event(Vec<u8>),
}

impl InputLine {
    /// Classifies a line of input.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return InputLine::Blank;
        }

        if let Some(rest) = line.strip_prefix("delete")
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            return match rest.trim().parse::<i64>() {
                Ok(id) => InputLine::Delete(LoanId::new(id)),
                Err(_) => InputLine::Malformed(format!("invalid loan ID in `{line}`")),
            };
        }

        InputLine::Event(line.as_bytes().to_vec())
    }
}

/// Builds the repository, preloaded from the seed file when one is given.
pub async fn load_repository(seed_file: Option<&Path>) -> Result<InMemoryLoanRepository, ServiceError> {
    let Some(path) = seed_file else {
        return Ok(InMemoryLoanRepository::new());
    };

    let bytes = tokio::fs::read(path).await?;
    let repository = InMemoryLoanRepository::from_json(&bytes)?;
    tracing::info!(path = %path.display(), loans = repository.len().await, "loaded seed loans");
    Ok(repository)
}

/// The running service: one repository shared by the command path and the
/// event consumer, fed through an in-memory queue.
pub struct App<N> {
    repository: InMemoryLoanRepository,
    loans: LoanService<InMemoryLoanRepository>,
    consumer: Arc<EventConsumer<InMemoryLoanRepository, N>>,
    queue: Arc<InMemoryQueue>,
}

impl<N: LoanNotifier + 'static> App<N> {
    /// Wires the service around the given repository and notifier.
    pub fn new(config: ConsumerConfig, repository: InMemoryLoanRepository, notifier: N) -> Self {
        let queue = Arc::new(InMemoryQueue::new(config.queue.clone()));
        Self {
            loans: LoanService::new(repository.clone()),
            consumer: Arc::new(EventConsumer::new(repository.clone(), notifier, config)),
            repository,
            queue,
        }
    }

    /// Returns the shared loan repository.
    pub fn repository(&self) -> &InMemoryLoanRepository {
        &self.repository
    }

    /// Returns the command service.
    pub fn loans(&self) -> &LoanService<InMemoryLoanRepository> {
        &self.loans
    }

    /// Returns the queue the consumer reads from.
    pub fn queue(&self) -> &Arc<InMemoryQueue> {
        &self.queue
    }

    /// Handles one line of input.
    ///
    /// A rejected delete is logged, not an error. Store faults on the command
    /// path are returned.
    pub async fn handle_line(&self, line: &str) -> Result<(), ServiceError> {
        match InputLine::parse(line) {
            InputLine::Blank => {}
            InputLine::Delete(id) => {
                let result = self.loans.delete_loan(DeleteLoan::new(id)).await?;
                if !result.is_success() {
                    tracing::warn!(loan_id = %id, message = result.message(), "delete rejected");
                }
            }
            InputLine::Malformed(reason) => {
                tracing::warn!(%reason, "ignoring malformed command");
            }
            InputLine::Event(body) => {
                self.queue.publish_raw(body).await?;
            }
        }
        Ok(())
    }

    /// Runs the consumer while feeding it from `input`.
    ///
    /// Stops reading at end of input or when `shutdown` completes, then
    /// closes the queue and waits for the workers to drain it.
    pub async fn run<I, S>(&self, input: I, shutdown: S) -> Result<ConsumerReport, ServiceError>
    where
        I: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        let consumer = Arc::clone(&self.consumer);
        let queue = Arc::clone(&self.queue);
        let running = tokio::spawn(async move { consumer.run(queue).await });

        let fed = self.feed(input, shutdown).await;
        self.queue.close().await;
        let report = running.await?;

        let lines = fed?;
        tracing::debug!(lines, "input fully handled");
        Ok(report)
    }

    async fn feed<I, S>(&self, input: I, shutdown: S) -> Result<usize, ServiceError>
    where
        I: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        let mut count = 0usize;
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, closing queue");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("input closed, draining queue");
                        break;
                    };
                    count += 1;
                    if let Err(e) = self.handle_line(&line).await {
                        tracing::error!(line = count, error = %e, "failed to handle input line");
                    }
                }
            }
        }

        Ok(count)
    }
}
