//! Ranging configuration

use crate::sample::SPEED_OF_SOUND_CM_PER_US;
use crate::RangingError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Channel capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Edge timestamps buffered between the interrupt and the echo processor
    pub timestamp_capacity: usize,
    /// Distance samples buffered between the echo processor and the display
    pub distance_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            timestamp_capacity: 10,
            distance_capacity: 10,
        }
    }
}

/// Echo processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// How long to wait for the falling edge after the rising edge (ms)
    pub fall_timeout_ms: u64,
    /// Half the round trip is covered at this speed (cm/µs)
    pub speed_of_sound_cm_per_us: f32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            fall_timeout_ms: 100,
            speed_of_sound_cm_per_us: SPEED_OF_SOUND_CM_PER_US,
        }
    }
}

impl EchoConfig {
    pub fn fall_timeout(&self) -> Duration {
        Duration::from_millis(self.fall_timeout_ms)
    }
}

/// Display coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Wait for the cycle-start signal before re-polling (ms)
    pub signal_timeout_ms: u64,
    /// Wait for the cycle's distance sample (ms)
    pub sample_timeout_ms: u64,
    /// Hold after each render (ms)
    pub render_hold_ms: u64,
    /// Extra hold after every signalled cycle (ms)
    pub cycle_hold_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            signal_timeout_ms: 100,
            sample_timeout_ms: 100,
            render_hold_ms: 150,
            cycle_hold_ms: 150,
        }
    }
}

impl DisplayConfig {
    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.signal_timeout_ms)
    }

    pub fn sample_timeout(&self) -> Duration {
        Duration::from_millis(self.sample_timeout_ms)
    }

    pub fn render_hold(&self) -> Duration {
        Duration::from_millis(self.render_hold_ms)
    }

    pub fn cycle_hold(&self) -> Duration {
        Duration::from_millis(self.cycle_hold_ms)
    }
}

/// Complete ranging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RangingConfig {
    pub channels: ChannelConfig,
    pub echo: EchoConfig,
    pub display: DisplayConfig,
}

impl RangingConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), RangingError> {
        if self.channels.timestamp_capacity == 0 {
            return Err(invalid("channels.timestamp_capacity", "must be > 0"));
        }
        if self.channels.distance_capacity == 0 {
            return Err(invalid("channels.distance_capacity", "must be > 0"));
        }
        if self.echo.fall_timeout_ms == 0 {
            return Err(invalid("echo.fall_timeout_ms", "must be > 0"));
        }
        let speed = self.echo.speed_of_sound_cm_per_us;
        if speed.is_nan() || speed <= 0.0 {
            return Err(invalid("echo.speed_of_sound_cm_per_us", "must be positive"));
        }
        if self.display.signal_timeout_ms == 0 {
            return Err(invalid("display.signal_timeout_ms", "must be > 0"));
        }
        if self.display.sample_timeout_ms == 0 {
            return Err(invalid("display.sample_timeout_ms", "must be > 0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> RangingError {
    RangingError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}
