//! Lock-Free Ring Buffer Implementation

use crate::error::PushError;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Lock-free SPSC ring buffer for fixed-size values
///
/// Pushing into a full buffer rejects the new value and leaves every queued
/// entry untouched (oldest preserved). Neither side ever waits.
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Box<[UnsafeCell<MaybeUninit<T>>]>,
    /// Capacity of the buffer
    capacity: usize,
    /// Head position (write counter, only advanced by the producer)
    head: AtomicUsize,
    /// Tail position (read counter, only advanced by the consumer)
    tail: AtomicUsize,
    /// Total values accepted (for statistics)
    total_written: AtomicUsize,
    /// Total values rejected because the buffer was full
    dropped: AtomicUsize,
}

impl<T: Copy> RingBuffer<T> {
    /// Create a new ring buffer holding up to `capacity` values
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be > 0");
        let storage: Vec<UnsafeCell<MaybeUninit<T>>> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        Self {
            storage: storage.into_boxed_slice(),
            capacity,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            total_written: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Split the buffer into its single producer and single consumer
    pub fn split(self) -> (Producer<T>, Consumer<T>) {
        let buffer = Arc::new(self);
        (
            Producer {
                buffer: Arc::clone(&buffer),
            },
            Consumer { buffer },
        )
    }

    fn try_push(&self, value: T) -> Result<(), PushError<T>> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) == self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(PushError::Full(value));
        }

        // SAFETY: only the producer writes, and the slot at `head` is not
        // visible to the consumer until `head` is published below.
        unsafe {
            (*self.storage[head % self.capacity].get()).write(value);
        }

        self.head.store(head.wrapping_add(1), Ordering::Release);
        self.total_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn pop(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: the slot at `tail` was initialized by the producer before
        // it published `head`, and the producer won't reuse it until `tail`
        // moves past it.
        let value = unsafe { (*self.storage[tail % self.capacity].get()).assume_init_read() };

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }
}

impl<T> RingBuffer<T> {
    /// Get the number of values currently in the buffer
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get total values accepted (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written.load(Ordering::Relaxed)
    }

    /// Get total values rejected on overflow
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

// SAFETY: slot access is partitioned between exactly one `Producer` and one
// `Consumer` (neither is `Clone`), synchronized through the head/tail atomics.
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

/// Write half of a [`RingBuffer`]
pub struct Producer<T> {
    buffer: Arc<RingBuffer<T>>,
}

impl<T: Copy> Producer<T> {
    /// Push a value without waiting; hands it back if the buffer is full
    pub fn push(&mut self, value: T) -> Result<(), PushError<T>> {
        self.buffer.try_push(value)
    }

    /// Shared view of the underlying buffer (statistics only)
    pub fn buffer(&self) -> &RingBuffer<T> {
        &self.buffer
    }
}

/// Read half of a [`RingBuffer`]
pub struct Consumer<T> {
    buffer: Arc<RingBuffer<T>>,
}

impl<T: Copy> Consumer<T> {
    /// Pop the oldest value, if any
    pub fn pop(&mut self) -> Option<T> {
        self.buffer.pop()
    }

    /// Shared view of the underlying buffer (statistics only)
    pub fn buffer(&self) -> &RingBuffer<T> {
        &self.buffer
    }
}
