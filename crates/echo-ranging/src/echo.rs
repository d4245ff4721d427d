//! Echo Processor

use crate::config::EchoConfig;
use crate::sample::DistanceSample;
use crate::TimestampReceiver;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};

/// Result of one ranging cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// A distance was computed and offered to the display
    Measured(DistanceSample),
    /// The falling edge never arrived
    EchoTimeout,
    /// The second timestamp was not after the first
    NonMonotonic { elapsed_us: i64 },
    /// The display side is gone
    Closed,
}

/// Turns rise/fall timestamp pairs into distance samples
///
/// Each cycle starts from scratch; a lost or malformed edge only costs the
/// current cycle.
pub struct EchoProcessor {
    /// Edge timestamps from the interrupt
    timestamps: TimestampReceiver,
    /// Distances for the display coordinator
    distances: mpsc::Sender<DistanceSample>,
    /// Configuration
    config: EchoConfig,
    /// Interrupt-side drops already reported
    drops_reported: usize,
}

impl EchoProcessor {
    /// Create a new echo processor
    pub fn new(
        timestamps: TimestampReceiver,
        distances: mpsc::Sender<DistanceSample>,
        config: EchoConfig,
    ) -> Self {
        info!(
            "Creating echo processor: fall timeout={}ms",
            config.fall_timeout_ms
        );
        Self {
            timestamps,
            distances,
            config,
            drops_reported: 0,
        }
    }

    /// Process one cycle: wait for a rise, then a bounded wait for the fall
    pub async fn process_cycle(&mut self) -> CycleOutcome {
        // Nothing else to do until an echo starts
        let rise = self.timestamps.recv().await;
        self.report_drops();

        let Some(fall) = self.timestamps.recv_timeout(self.config.fall_timeout()).await else {
            debug!("Echo timeout: no falling edge within {}ms", self.config.fall_timeout_ms);
            metrics::counter!("ranging_echo_timeouts_total").increment(1);
            return CycleOutcome::EchoTimeout;
        };

        let Some(sample) =
            DistanceSample::from_echo(rise, fall, self.config.speed_of_sound_cm_per_us)
        else {
            let elapsed_us = fall - rise;
            debug!("Discarding echo with non-positive duration {}µs", elapsed_us);
            metrics::counter!("ranging_non_monotonic_total").increment(1);
            return CycleOutcome::NonMonotonic { elapsed_us };
        };

        debug!("Distance: {:.2} cm", sample.centimeters());
        metrics::counter!("ranging_samples_total").increment(1);

        match self.distances.try_send(sample) {
            Ok(()) => CycleOutcome::Measured(sample),
            Err(TrySendError::Full(_)) => {
                debug!("Distance channel full, sample dropped");
                CycleOutcome::Measured(sample)
            }
            Err(TrySendError::Closed(_)) => CycleOutcome::Closed,
        }
    }

    /// Run the echo loop until the display side goes away
    pub async fn run(&mut self) {
        info!("Starting echo processor");

        loop {
            if self.process_cycle().await == CycleOutcome::Closed {
                break;
            }
        }

        info!("Echo processor stopped: distance channel closed");
    }

    fn report_drops(&mut self) {
        let dropped = self.timestamps.dropped();
        if dropped > self.drops_reported {
            let new_drops = dropped - self.drops_reported;
            debug!("{} edge timestamps dropped on a full channel", new_drops);
            metrics::counter!("ranging_timestamps_dropped_total").increment(new_drops as u64);
            self.drops_reported = dropped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::queue;
    use sensor_hal::Timestamp;
    use std::time::Duration;

    fn processor(
        distance_capacity: usize,
    ) -> (
        crate::TimestampSender,
        EchoProcessor,
        mpsc::Receiver<DistanceSample>,
    ) {
        let (ts_tx, ts_rx) = queue::bounded(10);
        let (dist_tx, dist_rx) = mpsc::channel(distance_capacity);
        (ts_tx, EchoProcessor::new(ts_rx, dist_tx, EchoConfig::default()), dist_rx)
    }

    fn ts(micros: u64) -> Timestamp {
        Timestamp::from_micros(micros)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pair_produces_sample() {
        let (mut edges, mut echo, mut distances) = processor(10);
        edges.try_send(ts(1000)).unwrap();
        edges.try_send(ts(1058)).unwrap();

        let outcome = echo.process_cycle().await;

        let expected = DistanceSample::from_centimeters(58.0 * 0.0343 / 2.0);
        assert_eq!(outcome, CycleOutcome::Measured(expected));
        assert_eq!(distances.try_recv().unwrap(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_fall_times_out() {
        let (mut edges, mut echo, mut distances) = processor(10);
        edges.try_send(ts(0)).unwrap();

        let start = tokio::time::Instant::now();
        let outcome = echo.process_cycle().await;

        assert_eq!(outcome, CycleOutcome::EchoTimeout);
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(distances.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reversed_pair_is_discarded() {
        let (mut edges, mut echo, mut distances) = processor(10);
        edges.try_send(ts(5000)).unwrap();
        edges.try_send(ts(4000)).unwrap();

        let outcome = echo.process_cycle().await;

        assert_eq!(outcome, CycleOutcome::NonMonotonic { elapsed_us: -1000 });
        assert!(distances.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_poison_next_cycle() {
        let (mut edges, mut echo, mut distances) = processor(10);
        edges.try_send(ts(0)).unwrap();
        assert_eq!(echo.process_cycle().await, CycleOutcome::EchoTimeout);

        edges.try_send(ts(500_000)).unwrap();
        edges.try_send(ts(502_000)).unwrap();
        assert!(matches!(echo.process_cycle().await, CycleOutcome::Measured(_)));
        assert!(distances.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fall_arriving_later_is_paired() {
        let (mut edges, mut echo, _distances) = processor(10);
        edges.try_send(ts(0)).unwrap();

        let producer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            edges.try_send(ts(30_000)).unwrap();
        });

        let outcome = echo.process_cycle().await;
        producer.await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Measured(DistanceSample::from_centimeters(30_000.0 * 0.0343 / 2.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_distance_channel_drops_sample() {
        let (mut edges, mut echo, mut distances) = processor(1);
        for pair in 0..2u64 {
            edges.try_send(ts(pair * 10_000)).unwrap();
            edges.try_send(ts(pair * 10_000 + 100)).unwrap();
            assert!(matches!(echo.process_cycle().await, CycleOutcome::Measured(_)));
        }

        assert!(distances.try_recv().is_ok());
        assert!(distances.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_display_side_closes() {
        let (mut edges, mut echo, distances) = processor(10);
        drop(distances);
        edges.try_send(ts(0)).unwrap();
        edges.try_send(ts(100)).unwrap();

        tokio::time::timeout(Duration::from_secs(1), echo.run())
            .await
            .expect("echo loop should stop once the receiver is gone");
    }
}
