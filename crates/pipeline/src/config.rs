//! Pipeline configuration
//!
//! Defaults cover everything; an optional TOML file overrides individual keys.

use crate::PipelineError;
use config::{Config, File, FileFormat};
use echo_ranging::RangingConfig;
use sensor_hal::SimulationConfig;
use serde::{Deserialize, Serialize};
use trigger_scheduler::{TriggerConfig, MIN_PULSE_WIDTH_US};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/ranging.toml";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Display geometry for the log display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub logging: LoggingConfig,
    pub trigger: TriggerConfig,
    pub ranging: RangingConfig,
    pub screen: ScreenConfig,
    pub simulation: SimulationConfig,
}

impl PipelineConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.trigger.pulse_width_us < MIN_PULSE_WIDTH_US {
            return Err(PipelineError::InvalidConfig(format!(
                "trigger.pulse_width_us must be >= {} (got {})",
                MIN_PULSE_WIDTH_US, self.trigger.pulse_width_us
            )));
        }
        if self.trigger.period_ms == 0 {
            return Err(PipelineError::InvalidConfig(
                "trigger.period_ms must be > 0".to_string(),
            ));
        }
        let speed = self.simulation.speed_of_sound_cm_per_us;
        if speed.is_nan() || speed <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "simulation.speed_of_sound_cm_per_us must be > 0 (got {})",
                speed
            )));
        }
        self.ranging.validate()?;
        Ok(())
    }
}

/// Load configuration from `path`, falling back to defaults if it is absent
pub fn load_config(path: &str) -> Result<PipelineConfig, PipelineError> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .build()?;
    finish(settings)
}

/// Parse configuration from TOML text
pub fn parse_config(toml: &str) -> Result<PipelineConfig, PipelineError> {
    let settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;
    finish(settings)
}

fn finish(settings: Config) -> Result<PipelineConfig, PipelineError> {
    let config: PipelineConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
