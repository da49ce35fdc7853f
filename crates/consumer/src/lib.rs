//! Event-driven loan state synchronization.
//!
//! This crate is the service's entry point from the message bus:
//! - [`EventEnvelope`] and [`LoanEvent`] decode loosely-typed message bodies
//! - [`EventDispatcher`] routes each event type to its handler
//! - [`ConsumerWorker`] wraps handling in a failure boundary and a scoped
//!   [`TraceSlot`] binding of the correlation ID
//! - [`EventConsumer`] runs a pool of workers over a [`MessageSource`]

pub mod broker;
pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod notification;
pub mod outcome;
pub mod trace;
pub mod worker;

pub use broker::{BrokerError, Delivery, InMemoryQueue, MessageSource};
pub use config::{AckPolicy, ConsumerConfig, DEFAULT_QUEUE, DEFAULT_WORKERS, UnknownAckPolicy};
pub use consumer::EventConsumer;
pub use dispatcher::EventDispatcher;
pub use envelope::{
    EventEnvelope, LoanCreated, LoanEvent, PEMINJAMAN_CREATED, PEMINJAMAN_UPDATED,
    PENGEMBALIAN_CREATED, PayloadError, ReturnCreated,
};
pub use error::{ConsumerError, Result};
pub use handlers::HandlerOutcome;
pub use notification::{
    InMemoryNotifier, LoanCreatedNotice, LoanNotifier, LoggingNotifier, NotificationError,
};
pub use outcome::{ConsumerReport, ProcessingOutcome, ProcessingStatus};
pub use trace::{TraceContext, TraceGuard, TraceSlot};
pub use worker::ConsumerWorker;
