//! Ultrasonic Ranging Pipeline
//!
//! Wires the trigger scheduler, edge capture, echo processor and display
//! coordinator together on the host, against the simulated sensor.

use echo_ranging::{RangingContext, RangingError, RangingParts};
use sensor_hal::{Display, EchoLine, HalError, LogDisplay, SimulatedSensor, SystemClock};
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, Level};
use trigger_scheduler::TriggerScheduler;

pub mod config;

pub use crate::config::{
    load_config, parse_config, LoggingConfig, PipelineConfig, ScreenConfig, DEFAULT_CONFIG_PATH,
};

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Ranging(#[from] RangingError),

    #[error("Hardware error: {0}")]
    Hal(#[from] HalError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), PipelineError> {
    let level = Level::from_str(&config.level)
        .map_err(|_| PipelineError::Logging(format!("unknown log level '{}'", config.level)))?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| PipelineError::Logging(e.to_string()))
}

/// Run the pipeline on the host until Ctrl-C
pub async fn run(config: PipelineConfig) -> Result<(), PipelineError> {
    let display = LogDisplay::new(config.screen.width, config.screen.height);
    run_until(config, display, tokio::signal::ctrl_c()).await
}

/// Run the pipeline until `shutdown` resolves
pub async fn run_until<D, F>(
    config: PipelineConfig,
    display: D,
    shutdown: F,
) -> Result<(), PipelineError>
where
    D: Display + 'static,
    F: Future<Output = std::io::Result<()>>,
{
    config.validate()?;

    let context = RangingContext::new(&config.ranging.channels);
    let SimulatedSensor {
        trigger,
        echo: mut echo_line,
    } = SimulatedSensor::new(config.simulation.clone());

    let mut scheduler = TriggerScheduler::new(trigger, config.trigger.clone(), context.cycle_start());
    let RangingParts {
        capture,
        mut echo,
        display: mut coordinator,
    } = context.into_parts(
        SystemClock::new(),
        display,
        config.ranging.echo.clone(),
        config.ranging.display.clone(),
    );

    echo_line.enable_interrupt(capture.into_handler())?;

    let tasks = [
        tokio::spawn(async move { echo.run().await }),
        tokio::spawn(async move { coordinator.run().await }),
        tokio::spawn(async move { scheduler.run().await }),
    ];
    info!(
        "Ranging pipeline running: period={}ms, pulse={}µs",
        config.trigger.period_ms, config.trigger.pulse_width_us
    );

    let result = shutdown.await;
    info!("Shutting down ranging pipeline");
    for task in &tasks {
        task.abort();
    }
    result?;
    Ok(())
}
