//! Bounded queue with a non-blocking send side
//!
//! The sender may run in interrupt context: it never waits, and overflow
//! drops the newest value. The receiver suspends on an async wait.

use crate::buffer::{Consumer, Producer, RingBuffer};
use crate::error::PushError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Create a bounded queue holding up to `capacity` values
pub fn bounded<T: Copy + Send>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (producer, consumer) = RingBuffer::new(capacity).split();
    let notify = Arc::new(Notify::new());
    (
        Sender {
            producer,
            notify: Arc::clone(&notify),
        },
        Receiver { consumer, notify },
    )
}

/// Sending half; owned by exactly one producer
///
/// The push itself is lock-free. Waking a parked receiver goes through
/// `Notify::notify_one`, which briefly takes tokio's waiter lock; that bound
/// is accepted for the host interrupt thread.
pub struct Sender<T> {
    producer: Producer<T>,
    notify: Arc<Notify>,
}

impl<T: Copy + Send> Sender<T> {
    /// Enqueue without waiting; on overflow the value is handed back
    pub fn try_send(&mut self, value: T) -> Result<(), PushError<T>> {
        self.producer.push(value)?;
        self.notify.notify_one();
        Ok(())
    }

    /// Number of values rejected so far
    pub fn dropped(&self) -> usize {
        self.producer.buffer().dropped()
    }
}

/// Receiving half; owned by exactly one consumer
pub struct Receiver<T> {
    consumer: Consumer<T>,
    notify: Arc<Notify>,
}

impl<T: Copy + Send> Receiver<T> {
    /// Wait until a value is available
    pub async fn recv(&mut self) -> T {
        loop {
            if let Some(value) = self.consumer.pop() {
                return value;
            }
            // A send that lands between the pop and this await leaves a
            // stored permit, so the wakeup is not lost.
            self.notify.notified().await;
        }
    }

    /// Wait up to `timeout` for a value
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<T> {
        tokio::time::timeout(timeout, self.recv()).await.ok()
    }

    /// Take a value if one is queued
    pub fn try_recv(&mut self) -> Option<T> {
        self.consumer.pop()
    }

    /// Number of queued values
    pub fn len(&self) -> usize {
        self.consumer.buffer().len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.consumer.buffer().is_empty()
    }

    /// Number of values the sender had to drop
    pub fn dropped(&self) -> usize {
        self.consumer.buffer().dropped()
    }
}
