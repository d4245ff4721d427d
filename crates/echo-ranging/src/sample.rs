//! Distance samples

use sensor_hal::Timestamp;
use serde::{Deserialize, Serialize};

/// Speed of sound in air (cm/µs)
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Readings at or beyond this distance are failures (cm)
pub const MAX_RANGE_CM: f32 = 400.0;

/// Longest bar the display can draw (px)
pub const MAX_BAR_LENGTH: i32 = 128;

/// Distance derived from one echo, in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DistanceSample(f32);

impl DistanceSample {
    pub const fn from_centimeters(centimeters: f32) -> Self {
        Self(centimeters)
    }

    /// Distance for an echo that rose at `rise` and fell at `fall`
    ///
    /// `None` unless `fall` is strictly later than `rise`.
    pub fn from_echo(rise: Timestamp, fall: Timestamp, speed_cm_per_us: f32) -> Option<Self> {
        let elapsed_us = fall - rise;
        if elapsed_us <= 0 {
            return None;
        }
        // Sound covers the distance twice
        Some(Self(elapsed_us as f32 * speed_cm_per_us / 2.0))
    }

    pub fn centimeters(self) -> f32 {
        self.0
    }

    /// Whether the display should treat this as a valid reading
    pub fn is_in_range(self) -> bool {
        self.0 > 0.0 && self.0 < MAX_RANGE_CM
    }

    /// Bar length for the readout: `min(128, floor(cm / 2))`
    pub fn bar_length(self) -> i32 {
        let half = (self.0 / 2.0).floor().max(0.0);
        (half as i32).min(MAX_BAR_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(micros: u64) -> Timestamp {
        Timestamp::from_micros(micros)
    }

    #[test]
    fn test_short_echo() {
        let sample = DistanceSample::from_echo(ts(1000), ts(1058), SPEED_OF_SOUND_CM_PER_US).unwrap();
        assert!((sample.centimeters() - 0.9947).abs() < 1e-4);
        assert!(sample.is_in_range());
        assert_eq!(sample.bar_length(), 0);
    }

    #[test]
    fn test_long_echo_bar_is_clamped() {
        let sample = DistanceSample::from_echo(ts(0), ts(23_300), SPEED_OF_SOUND_CM_PER_US).unwrap();
        assert!((sample.centimeters() - 399.595).abs() < 0.01);
        assert!(sample.is_in_range());
        assert_eq!(sample.bar_length(), 128);
    }

    #[test]
    fn test_non_positive_elapsed_is_rejected() {
        assert!(DistanceSample::from_echo(ts(500), ts(500), SPEED_OF_SOUND_CM_PER_US).is_none());
        assert!(DistanceSample::from_echo(ts(5000), ts(4000), SPEED_OF_SOUND_CM_PER_US).is_none());
    }

    #[test]
    fn test_range_boundaries() {
        assert!(!DistanceSample::from_centimeters(0.0).is_in_range());
        assert!(!DistanceSample::from_centimeters(-1.0).is_in_range());
        assert!(DistanceSample::from_centimeters(399.99).is_in_range());
        assert!(!DistanceSample::from_centimeters(400.0).is_in_range());
        assert!(!DistanceSample::from_centimeters(f32::NAN).is_in_range());
    }

    #[test]
    fn test_bar_length_floors() {
        assert_eq!(DistanceSample::from_centimeters(3.9).bar_length(), 1);
        assert_eq!(DistanceSample::from_centimeters(100.0).bar_length(), 50);
        assert_eq!(DistanceSample::from_centimeters(257.0).bar_length(), 128);
    }

    proptest! {
        #[test]
        fn prop_distance_formula(rise in 0u64..1_000_000, elapsed in 1u64..100_000) {
            let sample = DistanceSample::from_echo(ts(rise), ts(rise + elapsed), SPEED_OF_SOUND_CM_PER_US).unwrap();
            let expected = elapsed as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0;
            prop_assert_eq!(sample.centimeters(), expected);
        }

        #[test]
        fn prop_bar_length_monotonic(a in 0.0f32..400.0, b in 0.0f32..400.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo = DistanceSample::from_centimeters(lo).bar_length();
            let hi = DistanceSample::from_centimeters(hi).bar_length();
            prop_assert!(lo <= hi);
            prop_assert!(hi <= MAX_BAR_LENGTH);
        }

        #[test]
        fn prop_classification(v in -1000.0f32..1000.0) {
            let in_range = DistanceSample::from_centimeters(v).is_in_range();
            prop_assert_eq!(in_range, v > 0.0 && v < 400.0);
        }
    }
}
