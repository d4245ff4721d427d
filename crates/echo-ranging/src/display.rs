//! Display Coordinator
//!
//! Paces rendering to the trigger cadence: one render per observed
//! cycle-start signal, showing whatever distance shows up within the sample
//! window. Signals and samples are paired by timing only.

use crate::config::DisplayConfig;
use crate::sample::DistanceSample;
use crate::CycleStartSignal;
use sensor_hal::{Display, HalError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Readout position
const TEXT_X: i32 = 0;
const TEXT_Y: i32 = 0;
const TEXT_SCALE: u8 = 1;

/// Row the distance bar is drawn on
const BAR_Y: i32 = 10;

/// Text shown when a cycle yields no usable distance
pub const FAILURE_TEXT: &str = "Failed";

/// What to draw for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Render {
    Success {
        distance: DistanceSample,
        bar_length: i32,
    },
    Failure,
}

impl Render {
    /// Classify the cycle's sample; a missing sample is a failure
    pub fn classify(sample: Option<DistanceSample>) -> Self {
        match sample {
            Some(distance) if distance.is_in_range() => Render::Success {
                distance,
                bar_length: distance.bar_length(),
            },
            _ => Render::Failure,
        }
    }

    /// Readout line for this render
    pub fn text(&self) -> String {
        match self {
            Render::Success { distance, .. } => {
                format!("Distance: {:.2} cm", distance.centimeters())
            }
            Render::Failure => FAILURE_TEXT.to_string(),
        }
    }
}

/// Renders one distance per ranging cycle
pub struct DisplayCoordinator<D> {
    /// Display collaborator
    display: D,
    /// Raised by the trigger scheduler each cycle
    cycle_start: Arc<CycleStartSignal>,
    /// Distances from the echo processor
    distances: mpsc::Receiver<DistanceSample>,
    /// Configuration
    config: DisplayConfig,
}

impl<D: Display> DisplayCoordinator<D> {
    /// Create a new display coordinator
    pub fn new(
        display: D,
        cycle_start: Arc<CycleStartSignal>,
        distances: mpsc::Receiver<DistanceSample>,
        config: DisplayConfig,
    ) -> Self {
        Self {
            display,
            cycle_start,
            distances,
            config,
        }
    }

    /// One poll: `None` if no cycle started within the signal timeout
    pub async fn poll_once(&mut self) -> Option<Render> {
        if !self.cycle_start.wait_timeout(self.config.signal_timeout()).await {
            return None;
        }

        let sample = tokio::time::timeout(self.config.sample_timeout(), self.distances.recv())
            .await
            .ok()
            .flatten();
        if sample.is_none() {
            debug!("No distance sample for this cycle");
        }

        let render = Render::classify(sample);
        match render {
            Render::Success { .. } => metrics::counter!("ranging_render_success_total").increment(1),
            Render::Failure => metrics::counter!("ranging_render_failure_total").increment(1),
        }

        self.draw(&render);
        tokio::time::sleep(self.config.render_hold()).await;

        // Deliberately slower than the trigger cadence
        tokio::time::sleep(self.config.cycle_hold()).await;

        Some(render)
    }

    /// Run the display loop forever
    pub async fn run(&mut self) {
        info!("Starting display coordinator");
        if let Err(e) = self.display.initialize() {
            warn!("Display initialization failed: {}", e);
        }

        loop {
            self.poll_once().await;
        }
    }

    /// Best effort: every step runs even if an earlier one failed
    fn draw(&mut self, render: &Render) {
        report("clear", self.display.clear_buffer());
        report(
            "text",
            self.display
                .draw_text(TEXT_X, TEXT_Y, TEXT_SCALE, &render.text()),
        );
        if let Render::Success { bar_length, .. } = render {
            report("line", self.display.draw_line(0, BAR_Y, *bar_length, BAR_Y));
        }
        report("present", self.display.present());
    }
}

fn report(step: &str, result: Result<(), HalError>) {
    if let Err(e) = result {
        warn!("Display {} failed: {}", step, e);
    }
}
