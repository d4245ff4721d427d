//! Trigger Scheduler for Periodic Ranging Cycles
//!
//! Emits a fixed-width pulse on the sensor trigger line at a fixed cadence
//! and raises the cycle-start signal after each pulse.

mod scheduler;

pub use scheduler::{TriggerConfig, TriggerPhase, TriggerScheduler, MIN_PULSE_WIDTH_US};
