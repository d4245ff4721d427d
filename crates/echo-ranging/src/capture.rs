//! Echo edge capture (interrupt context)

use crate::TimestampSender;
use sensor_hal::{EdgeEvents, EdgeHandler, MonotonicClock};

/// Timestamps echo transitions from the edge interrupt
///
/// Runs in interrupt context: one clock read and one non-blocking push per
/// edge. No logging, no waiting, no allocation. A full timestamp channel
/// drops the new timestamp.
pub struct EdgeCapture<C> {
    clock: C,
    timestamps: TimestampSender,
}

impl<C: MonotonicClock> EdgeCapture<C> {
    pub fn new(clock: C, timestamps: TimestampSender) -> Self {
        Self { clock, timestamps }
    }

    /// Handle one interrupt; a rise latched together with a fall is queued first
    pub fn on_edge(&mut self, events: EdgeEvents) {
        if events.is_rise() {
            let _ = self.timestamps.try_send(self.clock.now());
        }
        if events.is_fall() {
            let _ = self.timestamps.try_send(self.clock.now());
        }
    }

    /// Timestamps dropped on a full channel so far
    pub fn dropped(&self) -> usize {
        self.timestamps.dropped()
    }

    /// Box into a handler for [`sensor_hal::EchoLine::enable_interrupt`]
    pub fn into_handler(mut self) -> EdgeHandler
    where
        C: 'static,
    {
        Box::new(move |events| self.on_edge(events))
    }
}
