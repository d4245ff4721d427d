//! Trigger Scheduler Implementation

use ring_buffer::BinarySignal;
use sensor_hal::TriggerPin;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Minimum trigger width accepted by HC-SR04 class sensors (µs)
pub const MIN_PULSE_WIDTH_US: u64 = 10;

/// Configuration for the trigger scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Time the trigger line is held high (default: 10 µs)
    pub pulse_width_us: u64,
    /// Sleep between cycles (default: 500 ms)
    pub period_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            pulse_width_us: MIN_PULSE_WIDTH_US,
            period_ms: 500,
        }
    }
}

impl TriggerConfig {
    pub fn pulse_width(&self) -> Duration {
        Duration::from_micros(self.pulse_width_us)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Where the scheduler is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    Idle,
    PulseHigh,
    PulseLow,
    Signal,
    Sleep,
}

/// Periodic trigger pulse generator
///
/// Fire-and-forget: it never waits on the echo or on the display.
pub struct TriggerScheduler<P> {
    /// Trigger output line
    pin: P,
    /// Configuration
    config: TriggerConfig,
    /// Raised once per cycle, consumed by the display coordinator
    cycle_start: Arc<BinarySignal>,
    /// Current phase
    phase: TriggerPhase,
    /// Pulses emitted so far
    pulses: u64,
}

impl<P: TriggerPin> TriggerScheduler<P> {
    /// Create a new trigger scheduler
    pub fn new(pin: P, config: TriggerConfig, cycle_start: Arc<BinarySignal>) -> Self {
        info!(
            "Trigger scheduler created: {} µs pulse every {} ms",
            config.pulse_width_us, config.period_ms
        );
        Self {
            pin,
            config,
            cycle_start,
            phase: TriggerPhase::Idle,
            pulses: 0,
        }
    }

    /// Emit one pulse and raise the cycle-start signal
    pub fn fire(&mut self) {
        self.phase = TriggerPhase::PulseHigh;
        if let Err(e) = self.pin.set_high() {
            warn!("Failed to drive trigger high: {}", e);
        }
        // Sub-millisecond hold; a timer sleep would overshoot
        spin_sleep::sleep(self.config.pulse_width());

        self.phase = TriggerPhase::PulseLow;
        if let Err(e) = self.pin.set_low() {
            warn!("Failed to drive trigger low: {}", e);
        }

        self.phase = TriggerPhase::Signal;
        self.cycle_start.raise();

        self.pulses += 1;
        metrics::counter!("ranging_trigger_pulses_total").increment(1);
        debug!("Trigger pulse {} emitted", self.pulses);
    }

    /// Run the trigger loop forever
    pub async fn run(&mut self) {
        info!("Starting trigger scheduler");
        let period = self.config.period();

        loop {
            self.fire();

            self.phase = TriggerPhase::Sleep;
            tokio::time::sleep(period).await;
            self.phase = TriggerPhase::Idle;
        }
    }

    /// Current phase
    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    /// Number of pulses emitted
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_hal::HalError;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Level {
        High,
        Low,
    }

    #[derive(Clone, Default)]
    struct RecordingPin {
        levels: Arc<Mutex<Vec<Level>>>,
        fail_high: bool,
    }

    impl RecordingPin {
        fn levels(&self) -> Vec<Level> {
            self.levels.lock().unwrap().clone()
        }
    }

    impl TriggerPin for RecordingPin {
        fn set_high(&mut self) -> Result<(), HalError> {
            self.levels.lock().unwrap().push(Level::High);
            if self.fail_high {
                return Err(HalError::Gpio("stuck".to_string()));
            }
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), HalError> {
            self.levels.lock().unwrap().push(Level::Low);
            Ok(())
        }
    }

    #[test]
    fn test_default_config() {
        let config = TriggerConfig::default();
        assert_eq!(config.pulse_width(), Duration::from_micros(10));
        assert_eq!(config.period(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_pulses_then_signals() {
        let pin = RecordingPin::default();
        let signal = Arc::new(BinarySignal::new());
        let mut scheduler = TriggerScheduler::new(pin.clone(), TriggerConfig::default(), signal.clone());

        scheduler.fire();

        assert_eq!(pin.levels(), vec![Level::High, Level::Low]);
        assert_eq!(scheduler.phase(), TriggerPhase::Signal);
        assert_eq!(scheduler.pulse_count(), 1);
        assert!(signal.wait_timeout(Duration::from_millis(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pin_failure_is_not_fatal() {
        let pin = RecordingPin {
            fail_high: true,
            ..Default::default()
        };
        let signal = Arc::new(BinarySignal::new());
        let mut scheduler = TriggerScheduler::new(pin.clone(), TriggerConfig::default(), signal.clone());

        scheduler.fire();

        // Still drives low and still signals the cycle
        assert_eq!(pin.levels(), vec![Level::High, Level::Low]);
        assert!(signal.wait_timeout(Duration::from_millis(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_cadence() {
        let pin = RecordingPin::default();
        let signal = Arc::new(BinarySignal::new());
        let mut scheduler = TriggerScheduler::new(pin.clone(), TriggerConfig::default(), signal);

        let task = tokio::spawn(async move { scheduler.run().await });

        // Pulses at t=0, 500, 1000 ms
        tokio::time::sleep(Duration::from_millis(1200)).await;
        task.abort();

        assert_eq!(pin.levels().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconsumed_signals_coalesce() {
        let pin = RecordingPin::default();
        let signal = Arc::new(BinarySignal::new());
        let mut scheduler = TriggerScheduler::new(pin, TriggerConfig::default(), signal.clone());

        scheduler.fire();
        scheduler.fire();

        assert!(signal.wait_timeout(Duration::from_millis(1)).await);
        assert!(!signal.wait_timeout(Duration::from_millis(1)).await);
    }
}
