//! Simulated HC-SR04 sensor
//!
//! The trigger pin forwards each completed pulse to a worker thread that
//! plays the part of the echo-line interrupt: it fires a rising edge after
//! a short lead time and a falling edge once the round trip for the next
//! scripted distance has elapsed.

use crate::gpio::{EchoLine, EdgeEvents, EdgeHandler, TriggerPin};
use crate::HalError;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Simulated sensor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Target distances answered in turn (cm); negative means the reflection is lost
    pub echo_script_cm: Vec<f32>,
    /// Delay from the end of the trigger pulse to the echo rising edge (µs)
    pub echo_delay_us: u64,
    /// Speed-of-sound factor used to derive the echo width (cm/µs)
    pub speed_of_sound_cm_per_us: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            echo_script_cm: vec![12.5, 48.0, 150.0, 320.0, 520.0, -1.0],
            echo_delay_us: 450,
            speed_of_sound_cm_per_us: 0.0343,
        }
    }
}

impl SimulationConfig {
    /// Echo pulse width for a target at `distance_cm`
    pub fn echo_width(&self, distance_cm: f32) -> Duration {
        let micros = distance_cm * 2.0 / self.speed_of_sound_cm_per_us;
        Duration::from_micros(micros.max(0.0) as u64)
    }
}

/// Simulated sensor split into its two lines
pub struct SimulatedSensor {
    pub trigger: SimulatedTrigger,
    pub echo: SimulatedEchoLine,
}

impl SimulatedSensor {
    pub fn new(config: SimulationConfig) -> Self {
        info!(
            "Creating simulated sensor with {} scripted distances",
            config.echo_script_cm.len()
        );
        let (pulse_tx, pulse_rx) = mpsc::channel();
        Self {
            trigger: SimulatedTrigger {
                high: false,
                pulses: pulse_tx,
            },
            echo: SimulatedEchoLine {
                config,
                pulses: Some(pulse_rx),
                _worker: None,
            },
        }
    }
}

/// Trigger input of the simulated sensor
pub struct SimulatedTrigger {
    high: bool,
    pulses: mpsc::Sender<()>,
}

impl TriggerPin for SimulatedTrigger {
    fn set_high(&mut self) -> Result<(), HalError> {
        self.high = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), HalError> {
        if !self.high {
            return Ok(());
        }
        self.high = false;
        self.pulses
            .send(())
            .map_err(|_| HalError::Gpio("simulated echo line stopped".to_string()))
    }
}

/// Echo output of the simulated sensor
pub struct SimulatedEchoLine {
    config: SimulationConfig,
    pulses: Option<mpsc::Receiver<()>>,
    _worker: Option<JoinHandle<()>>,
}

impl EchoLine for SimulatedEchoLine {
    fn enable_interrupt(&mut self, handler: EdgeHandler) -> Result<(), HalError> {
        let pulses = self.pulses.take().ok_or(HalError::InterruptAlreadyEnabled)?;
        let config = self.config.clone();

        let worker = std::thread::Builder::new()
            .name("echo-irq".to_string())
            .spawn(move || run_echo(config, pulses, handler))
            .map_err(|e| HalError::InterruptSource(e.to_string()))?;

        self._worker = Some(worker);
        Ok(())
    }
}

fn run_echo(config: SimulationConfig, pulses: mpsc::Receiver<()>, mut handler: EdgeHandler) {
    let mut script = config.echo_script_cm.iter().copied().cycle();
    let lead = Duration::from_micros(config.echo_delay_us);

    while pulses.recv().is_ok() {
        let Some(distance_cm) = script.next() else {
            continue;
        };

        spin_sleep::sleep(lead);
        handler(EdgeEvents::RISE);

        if distance_cm < 0.0 {
            debug!("Simulated reflection lost");
            continue;
        }

        spin_sleep::sleep(config.echo_width(distance_cm));
        handler(EdgeEvents::FALL);
    }

    debug!("Simulated echo line stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn edge_recorder() -> (EdgeHandler, mpsc::Receiver<(EdgeEvents, Instant)>) {
        let (tx, rx) = mpsc::channel();
        let handler: EdgeHandler = Box::new(move |events| {
            let _ = tx.send((events, Instant::now()));
        });
        (handler, rx)
    }

    #[test]
    fn test_echo_width() {
        let config = SimulationConfig::default();
        // 50 cm out and back is ~2915 µs
        assert_eq!(config.echo_width(50.0).as_micros(), 2915);
        assert_eq!(config.echo_width(-3.0), Duration::ZERO);
    }

    #[test]
    fn test_pulse_produces_rise_then_fall() {
        let config = SimulationConfig {
            echo_script_cm: vec![50.0],
            echo_delay_us: 100,
            ..Default::default()
        };
        let SimulatedSensor {
            mut trigger,
            mut echo,
        } = SimulatedSensor::new(config);
        let (handler, events) = edge_recorder();
        echo.enable_interrupt(handler).unwrap();

        trigger.set_high().unwrap();
        trigger.set_low().unwrap();

        let timeout = Duration::from_secs(2);
        let (first, rise_at) = events.recv_timeout(timeout).unwrap();
        let (second, fall_at) = events.recv_timeout(timeout).unwrap();

        assert_eq!(first, EdgeEvents::RISE);
        assert_eq!(second, EdgeEvents::FALL);
        // 50 cm is ~2915 µs of echo
        assert!(fall_at - rise_at >= Duration::from_micros(2900));
    }

    #[test]
    fn test_lost_reflection_has_no_fall() {
        let config = SimulationConfig {
            echo_script_cm: vec![-1.0],
            echo_delay_us: 0,
            ..Default::default()
        };
        let SimulatedSensor {
            mut trigger,
            mut echo,
        } = SimulatedSensor::new(config);
        let (handler, events) = edge_recorder();
        echo.enable_interrupt(handler).unwrap();

        trigger.set_high().unwrap();
        trigger.set_low().unwrap();

        let (first, _) = events.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, EdgeEvents::RISE);
        assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_interrupt_enabled_once() {
        let SimulatedSensor { mut echo, .. } = SimulatedSensor::new(SimulationConfig::default());
        let (first, _rx1) = edge_recorder();
        let (second, _rx2) = edge_recorder();

        assert!(echo.enable_interrupt(first).is_ok());
        assert_eq!(
            echo.enable_interrupt(second),
            Err(HalError::InterruptAlreadyEnabled)
        );
    }

    #[test]
    fn test_low_without_high_is_not_a_pulse() {
        let SimulatedSensor { mut trigger, .. } = SimulatedSensor::new(SimulationConfig::default());
        // Echo line dropped: a real pulse would fail to send, a no-op low must not
        assert!(trigger.set_low().is_ok());
    }
}
