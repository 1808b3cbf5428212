//! Per-direction parameter derivation.
//!
//! Physical parameters (distance, hit ratio, absorption) map onto a delay
//! length, a feedback gain and the two feedback filters:
//!
//! - `delay_length = clamp(round(distance_delay_factor * distance * sample_rate), 1, capacity)`
//! - `gain = hit_ratio`
//! - lowpass and allpass cutoff = `absorption * sample_rate`

use echoprobe_core::{BUTTERWORTH_Q, BiquadCoefficients};
use serde::{Deserialize, Serialize};

use crate::DIRECTIONS;
use crate::error::SegmentError;
use crate::field::Field;
use crate::probe::DirectionEstimate;

/// Q of the scattering allpass.
pub const ALLPASS_Q: f32 = 1.0;

/// Distances, hit ratios and absorptions for all four directions at once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BulkParameters {
    /// Distance per direction, in scene units.
    pub distances: [f32; DIRECTIONS],
    /// Feedback gain per direction, in `[0, 1]`.
    pub hit_ratios: [f32; DIRECTIONS],
    /// Surface absorption per direction, in `[0, 1]`.
    pub absorptions: [f32; DIRECTIONS],
}

impl BulkParameters {
    /// Same values in every direction.
    pub const fn uniform(distance: f32, hit_ratio: f32, absorption: f32) -> Self {
        Self {
            distances: [distance; DIRECTIONS],
            hit_ratios: [hit_ratio; DIRECTIONS],
            absorptions: [absorption; DIRECTIONS],
        }
    }

    /// Collects four direction estimates into one parameter block.
    pub fn from_estimates(estimates: &[DirectionEstimate; DIRECTIONS]) -> Self {
        Self {
            distances: estimates.map(|e| e.distance),
            hit_ratios: estimates.map(|e| e.hit_ratio),
            absorptions: estimates.map(|e| e.absorption),
        }
    }

    /// Checks every value; nothing is applied if any of them is out of range.
    pub fn validate(&self) -> Result<(), SegmentError> {
        let unit = |v: &f32| (0.0..=1.0).contains(v);

        if !self.distances.iter().all(|d| d.is_finite() && *d >= 0.0) {
            return Err(SegmentError::invalid_value(
                Field::BulkParameters,
                "distances must be finite and >= 0",
            ));
        }
        if !self.hit_ratios.iter().all(unit) {
            return Err(SegmentError::invalid_value(
                Field::BulkParameters,
                "hit ratios must be within [0, 1]",
            ));
        }
        if !self.absorptions.iter().all(unit) {
            return Err(SegmentError::invalid_value(
                Field::BulkParameters,
                "absorptions must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl TryFrom<&[f32]> for BulkParameters {
    type Error = SegmentError;

    /// Builds a block from the host layout: 4 distances, 4 hit ratios, 4 absorptions.
    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        if values.len() != 3 * DIRECTIONS {
            return Err(SegmentError::invalid_value(
                Field::BulkParameters,
                "expected 12 floats",
            ));
        }
        let block = |i: usize| core::array::from_fn(|d| values[i * DIRECTIONS + d]);
        Ok(Self {
            distances: block(0),
            hit_ratios: block(1),
            absorptions: block(2),
        })
    }
}

/// Everything a direction channel needs to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionParams {
    /// Active delay length in samples, `1..=capacity`.
    pub delay_length: usize,
    /// Feedback gain.
    pub gain: f32,
    /// Absorption lowpass.
    pub lowpass: BiquadCoefficients,
    /// Scattering allpass.
    pub allpass: BiquadCoefficients,
}

impl DirectionParams {
    /// Derives channel parameters from one direction's physical values.
    ///
    /// The lowpass runs at Butterworth Q (1/√2) rather than Q = 1, so the
    /// feedback path has no resonant peak at the cutoff. The allpass keeps
    /// [`ALLPASS_Q`].
    pub fn derive(
        distance: f32,
        hit_ratio: f32,
        absorption: f32,
        distance_delay_factor: f32,
        sample_rate: u32,
        capacity: usize,
    ) -> Self {
        let rate = sample_rate as f32;
        let cutoff = absorption * rate;

        Self {
            delay_length: delay_samples(distance_delay_factor, distance, sample_rate, capacity),
            gain: hit_ratio,
            lowpass: BiquadCoefficients::lowpass(cutoff, BUTTERWORTH_Q, rate),
            allpass: BiquadCoefficients::allpass(cutoff, ALLPASS_Q, rate),
        }
    }

    /// Derives all four directions from a parameter block.
    pub fn derive_all(
        bulk: &BulkParameters,
        distance_delay_factor: f32,
        sample_rate: u32,
        capacity: usize,
    ) -> [Self; DIRECTIONS] {
        core::array::from_fn(|d| {
            Self::derive(
                bulk.distances[d],
                bulk.hit_ratios[d],
                bulk.absorptions[d],
                distance_delay_factor,
                sample_rate,
                capacity,
            )
        })
    }
}

/// Rounded delay in samples, clamped to `1..=capacity`.
fn delay_samples(factor: f32, distance: f32, sample_rate: u32, capacity: usize) -> usize {
    let samples = (f64::from(factor) * f64::from(distance) * f64::from(sample_rate)).round();
    if samples.is_nan() {
        return 1;
    }
    samples.clamp(1.0, capacity.max(1) as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_rounds_to_nearest_sample() {
        assert_eq!(delay_samples(0.01, 1.0, 48000, 48000), 480);
        assert_eq!(delay_samples(0.0001, 3.3, 48000, 48000), 16);
    }

    #[test]
    fn delay_clamps_to_capacity_and_one() {
        assert_eq!(delay_samples(1.0, 5.0, 48000, 48000), 48000);
        assert_eq!(delay_samples(0.0, 5.0, 48000, 48000), 1);
        assert_eq!(delay_samples(0.01, 0.0, 48000, 48000), 1);
        assert_eq!(delay_samples(f32::MAX, f32::MAX, 48000, 48000), 48000);
    }

    #[test]
    fn derive_maps_hit_ratio_to_gain() {
        let params = DirectionParams::derive(2.0, 0.75, 0.5, 0.01, 48000, 48000);
        assert_eq!(params.delay_length, 960);
        assert_eq!(params.gain, 0.75);
        assert_eq!(
            params.lowpass,
            BiquadCoefficients::lowpass(24000.0, BUTTERWORTH_Q, 48000.0)
        );
        assert_eq!(
            params.allpass,
            BiquadCoefficients::allpass(24000.0, ALLPASS_Q, 48000.0)
        );
    }

    #[test]
    fn lowpass_has_no_resonant_peak() {
        let params = DirectionParams::derive(1.0, 1.0, 0.25, 0.01, 48000, 48000);
        assert_ne!(
            params.lowpass,
            BiquadCoefficients::lowpass(12000.0, 1.0, 48000.0)
        );
        assert_eq!(
            params.lowpass,
            BiquadCoefficients::lowpass(12000.0, BUTTERWORTH_Q, 48000.0)
        );
    }

    #[test]
    fn higher_absorption_means_brighter_feedback() {
        let dull = DirectionParams::derive(1.0, 1.0, 0.01, 0.01, 48000, 48000);
        let bright = DirectionParams::derive(1.0, 1.0, 0.3, 0.01, 48000, 48000);
        assert!(bright.lowpass.b0 > dull.lowpass.b0);
    }

    #[test]
    fn bulk_from_host_slice() {
        let raw: Vec<f32> = (0..12).map(|i| i as f32 / 12.0).collect();
        let bulk = BulkParameters::try_from(raw.as_slice()).unwrap();
        assert_eq!(bulk.distances, [0.0, 1.0 / 12.0, 2.0 / 12.0, 3.0 / 12.0]);
        assert_eq!(bulk.hit_ratios[0], 4.0 / 12.0);
        assert_eq!(bulk.absorptions[3], 11.0 / 12.0);

        assert!(BulkParameters::try_from(&raw[..11]).is_err());
    }

    #[test]
    fn bulk_validation() {
        assert!(BulkParameters::uniform(1.0, 1.0, 1.0).validate().is_ok());

        let mut bulk = BulkParameters::uniform(1.0, 0.5, 0.5);
        bulk.distances[2] = -1.0;
        assert!(bulk.validate().is_err());

        let mut bulk = BulkParameters::uniform(1.0, 0.5, 0.5);
        bulk.hit_ratios[1] = 1.01;
        assert!(bulk.validate().is_err());

        let mut bulk = BulkParameters::uniform(1.0, 0.5, 0.5);
        bulk.absorptions[0] = f32::NAN;
        assert!(bulk.validate().is_err());
    }
}
