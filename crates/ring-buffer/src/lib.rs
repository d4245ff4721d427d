//! Lock-Free Ring Buffer
//!
//! Fixed-capacity channel primitives shared by the ranging pipeline:
//! - [`RingBuffer`]: SPSC ring buffer split into a [`Producer`] and a [`Consumer`]
//! - [`queue`]: bounded queue whose send side never blocks (safe from interrupt context)
//! - [`BinarySignal`]: one-shot notification holding at most one pending occurrence

mod buffer;
mod error;
pub mod queue;
mod signal;

pub use buffer::{Consumer, Producer, RingBuffer};
pub use error::PushError;
pub use signal::BinarySignal;
