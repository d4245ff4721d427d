//! Pipeline context
//!
//! Builds the timestamp channel, the distance channel and the cycle-start
//! signal once, then hands each endpoint to the one component that owns it.

use crate::capture::EdgeCapture;
use crate::config::{ChannelConfig, DisplayConfig, EchoConfig};
use crate::display::DisplayCoordinator;
use crate::echo::EchoProcessor;
use crate::sample::DistanceSample;
use crate::{CycleStartSignal, TimestampReceiver, TimestampSender};
use ring_buffer::queue;
use sensor_hal::{Display, MonotonicClock};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Channels and signal shared by the ranging pipeline
pub struct RangingContext {
    timestamp_tx: TimestampSender,
    timestamp_rx: TimestampReceiver,
    distance_tx: mpsc::Sender<DistanceSample>,
    distance_rx: mpsc::Receiver<DistanceSample>,
    cycle_start: Arc<CycleStartSignal>,
}

/// Components wired to a [`RangingContext`]
pub struct RangingParts<C, D> {
    /// Edge interrupt handler (timestamp channel writer)
    pub capture: EdgeCapture<C>,
    /// Timestamp channel reader, distance channel writer
    pub echo: EchoProcessor,
    /// Distance channel reader, cycle-start signal consumer
    pub display: DisplayCoordinator<D>,
}

impl RangingContext {
    /// Create the channels and signal
    pub fn new(config: &ChannelConfig) -> Self {
        info!(
            "Creating ranging context: timestamp capacity={}, distance capacity={}",
            config.timestamp_capacity, config.distance_capacity
        );
        let (timestamp_tx, timestamp_rx) = queue::bounded(config.timestamp_capacity);
        let (distance_tx, distance_rx) = mpsc::channel(config.distance_capacity);
        Self {
            timestamp_tx,
            timestamp_rx,
            distance_tx,
            distance_rx,
            cycle_start: Arc::new(CycleStartSignal::new()),
        }
    }

    /// Handle on the cycle-start signal for the trigger scheduler
    pub fn cycle_start(&self) -> Arc<CycleStartSignal> {
        Arc::clone(&self.cycle_start)
    }

    /// Hand every endpoint to its component
    pub fn into_parts<C, D>(
        self,
        clock: C,
        display: D,
        echo: EchoConfig,
        display_config: DisplayConfig,
    ) -> RangingParts<C, D>
    where
        C: MonotonicClock,
        D: Display,
    {
        RangingParts {
            capture: EdgeCapture::new(clock, self.timestamp_tx),
            echo: EchoProcessor::new(self.timestamp_rx, self.distance_tx, echo),
            display: DisplayCoordinator::new(
                display,
                self.cycle_start,
                self.distance_rx,
                display_config,
            ),
        }
    }
}
