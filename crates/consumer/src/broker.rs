//! Message source seam and an in-memory queue.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

/// A message handed to a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Broker-assigned tag used to settle the delivery.
    pub tag: u64,
    /// Raw message body.
    pub body: Vec<u8>,
}

/// Errors raised by a message source.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The queue no longer accepts messages.
    #[error("Queue '{0}' is closed")]
    Closed(String),

    /// The tag was never delivered or was already settled.
    #[error("Unknown delivery tag: {0}")]
    UnknownTag(u64),

    /// The message could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A named queue that workers pull deliveries from.
///
/// Implementations must allow concurrent `receive` calls from several
/// workers; each delivery goes to exactly one of them.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Returns the queue name.
    fn queue_name(&self) -> &str;

    /// Waits for the next delivery. Returns None once the queue is closed
    /// and drained.
    async fn receive(&self) -> Option<Delivery>;

    /// Positively acknowledges a delivery.
    async fn ack(&self, tag: u64) -> Result<(), BrokerError>;

    /// Negatively acknowledges a delivery; redelivery is up to the broker.
    async fn reject(&self, tag: u64) -> Result<(), BrokerError>;
}

#[derive(Debug, Default)]
struct Settlements {
    pending: HashSet<u64>,
    acked: Vec<u64>,
    rejected: Vec<u64>,
}

/// In-memory queue backed by an unbounded tokio channel.
///
/// Rejected deliveries are recorded but not redelivered.
#[derive(Debug)]
pub struct InMemoryQueue {
    name: String,
    sender: Mutex<Option<mpsc::UnboundedSender<Delivery>>>,
    receiver: Mutex<mpsc::UnboundedReceiver<Delivery>>,
    next_tag: AtomicU64,
    settlements: Mutex<Settlements>,
}

impl InMemoryQueue {
    /// Creates an open queue with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            name: name.into(),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
            next_tag: AtomicU64::new(1),
            settlements: Mutex::new(Settlements::default()),
        }
    }

    /// Publishes a JSON message, returning its delivery tag.
    pub async fn publish(&self, message: &Value) -> Result<u64, BrokerError> {
        let body = serde_json::to_vec(message)?;
        self.publish_raw(body).await
    }

    /// Publishes a raw body, returning its delivery tag.
    pub async fn publish_raw(&self, body: Vec<u8>) -> Result<u64, BrokerError> {
        let sender = self.sender.lock().await;
        let sender = sender
            .as_ref()
            .ok_or_else(|| BrokerError::Closed(self.name.clone()))?;

        let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
        sender
            .send(Delivery { tag, body })
            .map_err(|_| BrokerError::Closed(self.name.clone()))?;
        Ok(tag)
    }

    /// Stops accepting messages. Already published messages are still
    /// delivered.
    pub async fn close(&self) {
        self.sender.lock().await.take();
    }

    /// Returns true once `close` has been called.
    pub async fn is_closed(&self) -> bool {
        self.sender.lock().await.is_none()
    }

    /// Returns acknowledged tags in settlement order.
    pub async fn acked(&self) -> Vec<u64> {
        self.settlements.lock().await.acked.clone()
    }

    /// Returns rejected tags in settlement order.
    pub async fn rejected(&self) -> Vec<u64> {
        self.settlements.lock().await.rejected.clone()
    }

    /// Returns the number of delivered but unsettled messages.
    pub async fn unsettled(&self) -> usize {
        self.settlements.lock().await.pending.len()
    }
}

#[async_trait]
impl MessageSource for InMemoryQueue {
    fn queue_name(&self) -> &str {
        &self.name
    }

    async fn receive(&self) -> Option<Delivery> {
        let delivery = self.receiver.lock().await.recv().await?;
        self.settlements.lock().await.pending.insert(delivery.tag);
        Some(delivery)
    }

    async fn ack(&self, tag: u64) -> Result<(), BrokerError> {
        let mut settlements = self.settlements.lock().await;
        if !settlements.pending.remove(&tag) {
            return Err(BrokerError::UnknownTag(tag));
        }
        settlements.acked.push(tag);
        Ok(())
    }

    async fn reject(&self, tag: u64) -> Result<(), BrokerError> {
        let mut settlements = self.settlements.lock().await;
        if !settlements.pending.remove(&tag) {
            return Err(BrokerError::UnknownTag(tag));
        }
        settlements.rejected.push(tag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_and_receive_in_order() {
        let queue = InMemoryQueue::new("loans");
        let t1 = queue.publish(&json!({"n": 1})).await.unwrap();
        let t2 = queue.publish_raw(b"raw".to_vec()).await.unwrap();

        let d1 = queue.receive().await.unwrap();
        let d2 = queue.receive().await.unwrap();

        assert_eq!((d1.tag, d2.tag), (t1, t2));
        assert_eq!(d1.body, br#"{"n":1}"#.to_vec());
        assert_eq!(d2.body, b"raw".to_vec());
        assert_eq!(queue.unsettled().await, 2);
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let queue = InMemoryQueue::new("loans");
        queue.publish(&json!({})).await.unwrap();
        queue.close().await;

        assert!(queue.is_closed().await);
        assert!(matches!(
            queue.publish(&json!({})).await,
            Err(BrokerError::Closed(name)) if name == "loans"
        ));
        assert!(queue.receive().await.is_some());
        assert!(queue.receive().await.is_none());
    }

    #[tokio::test]
    async fn test_settlement_requires_pending_tag() {
        let queue = InMemoryQueue::new("loans");
        let tag = queue.publish(&json!({})).await.unwrap();

        assert!(matches!(queue.ack(tag).await, Err(BrokerError::UnknownTag(_))));

        let delivery = queue.receive().await.unwrap();
        queue.reject(delivery.tag).await.unwrap();

        assert_eq!(queue.rejected().await, vec![tag]);
        assert!(queue.acked().await.is_empty());
        assert!(queue.ack(tag).await.is_err());
        assert_eq!(queue.unsettled().await, 0);
    }
}
