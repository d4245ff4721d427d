//! Ultrasonic Echo Ranging
//!
//! The timing-critical half of the ranging pipeline:
//! - Edge capture (interrupt context) timestamps echo transitions
//! - Echo processing turns a rise/fall pair into a distance
//! - Display coordination renders one reading per ranging cycle
//!
//! Everything is wired through a [`RangingContext`] built once at startup.

pub mod capture;
pub mod config;
pub mod context;
pub mod display;
pub mod echo;
pub mod sample;

pub use capture::EdgeCapture;
pub use config::{ChannelConfig, DisplayConfig, EchoConfig, RangingConfig};
pub use context::{RangingContext, RangingParts};
pub use display::{DisplayCoordinator, Render};
pub use echo::{CycleOutcome, EchoProcessor};
pub use sample::DistanceSample;

use ring_buffer::queue;
use sensor_hal::Timestamp;
use thiserror::Error;

/// Binary signal raised once per ranging cycle
pub type CycleStartSignal = ring_buffer::BinarySignal;

/// Interrupt-side sender of echo edge timestamps
pub type TimestampSender = queue::Sender<Timestamp>;

/// Task-side receiver of echo edge timestamps
pub type TimestampReceiver = queue::Receiver<Timestamp>;

/// Ranging error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangingError {
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}
