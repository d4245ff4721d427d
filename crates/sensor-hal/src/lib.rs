//! Sensor Hardware Abstraction
//!
//! The pipeline talks to hardware only through the traits in this crate:
//! - [`MonotonicClock`] producing microsecond [`Timestamp`]s
//! - [`TriggerPin`] driving the sensor's trigger input
//! - [`EchoLine`] delivering edge interrupts from the echo output
//! - [`Display`] rendering readouts
//!
//! Host implementations are provided for running without a board:
//! [`SystemClock`], [`LogDisplay`] and the [`sim`] sensor.

pub mod clock;
pub mod display;
pub mod gpio;
pub mod sim;

pub use clock::{ManualClock, MonotonicClock, SystemClock, Timestamp};
pub use display::{Display, DrawOp, LogDisplay};
#[cfg(any(test, feature = "test-util"))]
pub use display::RecordingDisplay;
pub use gpio::{EchoLine, EdgeEvents, EdgeHandler, TriggerPin};
pub use sim::{SimulatedEchoLine, SimulatedSensor, SimulatedTrigger, SimulationConfig};

use thiserror::Error;

/// Hardware boundary error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HalError {
    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Edge interrupt already enabled")]
    InterruptAlreadyEnabled,

    #[error("Failed to start edge interrupt source: {0}")]
    InterruptSource(String),
}
