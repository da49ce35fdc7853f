//! Per-envelope trace context.
//!
//! Each worker owns one [`TraceSlot`]. Binding an envelope's correlation ID
//! yields a [`TraceGuard`], which derefs to the [`TraceContext`] handed down
//! the dispatch chain and clears the slot when dropped. The borrow on the
//! slot means a worker cannot start the next envelope while a guard is alive.

use std::ops::Deref;

use tracing::Span;

/// Trace information for one envelope, passed by reference to handlers.
#[derive(Debug, Clone)]
pub struct TraceContext {
    correlation_id: Option<String>,
    span: Span,
}

impl TraceContext {
    /// Creates a context and its `consume_event` span.
    pub fn new(correlation_id: Option<String>, event_type: Option<&str>, worker: usize) -> Self {
        let span = tracing::info_span!(
            "consume_event",
            worker,
            event_type = tracing::field::Empty,
            correlation_id = tracing::field::Empty,
        );
        if let Some(event_type) = event_type {
            span.record("event_type", event_type);
        }
        if let Some(correlation_id) = &correlation_id {
            span.record("correlation_id", correlation_id.as_str());
        }
        Self {
            correlation_id,
            span,
        }
    }

    /// Returns the bound correlation ID.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the span covering this envelope's handling.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// A worker-local slot holding at most one active trace binding.
#[derive(Debug, Default)]
pub struct TraceSlot {
    worker: usize,
    active: bool,
    correlation_id: Option<String>,
    bindings: u64,
}

impl TraceSlot {
    /// Creates an empty slot for the given worker.
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Self::default()
        }
    }

    /// Binds an envelope's correlation ID until the returned guard is dropped.
    pub fn bind(&mut self, correlation_id: Option<String>, event_type: Option<&str>) -> TraceGuard<'_> {
        let context = TraceContext::new(correlation_id.clone(), event_type, self.worker);
        self.active = true;
        self.correlation_id = correlation_id;
        self.bindings += 1;
        TraceGuard {
            slot: self,
            context,
        }
    }

    /// Returns true while a guard is alive.
    pub fn is_bound(&self) -> bool {
        self.active
    }

    /// Returns the currently bound correlation ID, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns how many envelopes have been bound to this slot.
    pub fn bindings(&self) -> u64 {
        self.bindings
    }
}

/// Scoped binding of a [`TraceContext`] to a [`TraceSlot`].
#[derive(Debug)]
pub struct TraceGuard<'a> {
    slot: &'a mut TraceSlot,
    context: TraceContext,
}

impl TraceGuard<'_> {
    /// Returns the bound context.
    pub fn context(&self) -> &TraceContext {
        &self.context
    }
}

impl Deref for TraceGuard<'_> {
    type Target = TraceContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl Drop for TraceGuard<'_> {
    fn drop(&mut self) {
        self.slot.active = false;
        self.slot.correlation_id = None;
    }
}
