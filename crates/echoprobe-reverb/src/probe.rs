//! Spatial probes and the ring that aggregates them.
//!
//! A probe is one ray cast from the listener: the direction it left in, how
//! far it travelled before hitting geometry, and how absorptive the surface
//! was. The most recent [`PROBE_RING_SIZE`] probes are kept; each direction's
//! estimate is a Gaussian-weighted average of the probes around its azimuth.

use echoprobe_core::{angle_difference, gaussian, wrap_angle};
use serde::{Deserialize, Serialize};

use crate::error::SegmentError;
use crate::field::Field;

/// Number of probes that contribute to the estimate.
pub const PROBE_RING_SIZE: usize = 32;

/// Standard deviation of the angular kernel, in radians.
pub const KERNEL_SIGMA: f32 = 0.2;

/// Total kernel weight below which a direction is considered unprobed.
pub const MIN_WEIGHT_SUM: f32 = 0.01;

/// One spatial measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Probe {
    /// Azimuth in radians; normalized into `[0, 2π)` on insertion.
    pub angle: f32,
    /// Distance to the hit, in scene units.
    pub distance: f32,
    /// Surface absorption in `[0, 1]`.
    pub absorption: f32,
}

impl Probe {
    /// Creates a probe without validating it.
    pub const fn new(angle: f32, distance: f32, absorption: f32) -> Self {
        Self {
            angle,
            distance,
            absorption,
        }
    }

    /// Rejects non-finite values, negative distances and absorption outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if !self.angle.is_finite() {
            return Err(SegmentError::invalid_value(Field::Probe, "angle must be finite"));
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(SegmentError::invalid_value(
                Field::Probe,
                "distance must be finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.absorption) {
            return Err(SegmentError::invalid_value(
                Field::Probe,
                "absorption must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Same probe with its angle wrapped into `[0, 2π)`.
    pub fn normalized(self) -> Self {
        Self {
            angle: wrap_angle(self.angle),
            ..self
        }
    }
}

impl TryFrom<&[f32]> for Probe {
    type Error = SegmentError;

    /// Builds a probe from the host layout `[angle, distance, absorption]`.
    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        match *values {
            [angle, distance, absorption] => Ok(Probe::new(angle, distance, absorption)),
            _ => Err(SegmentError::invalid_value(Field::Probe, "expected 3 floats")),
        }
    }
}

/// Aggregated view of the scene in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionEstimate {
    /// Weighted mean distance.
    pub distance: f32,
    /// Weighted fraction of probes that hit within the cutoff.
    pub hit_ratio: f32,
    /// Weighted mean absorption.
    pub absorption: f32,
}

impl DirectionEstimate {
    /// Estimate of a direction no probe points at.
    pub const SILENT: Self = Self {
        distance: 0.0,
        hit_ratio: 0.0,
        absorption: 0.0,
    };
}

/// Fixed ring of the most recent probes.
///
/// Slots that were never written do not take part in the estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRing {
    slots: [Option<Probe>; PROBE_RING_SIZE],
    next: usize,
}

impl Default for ProbeRing {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeRing {
    /// Creates an empty ring.
    pub const fn new() -> Self {
        Self {
            slots: [None; PROBE_RING_SIZE],
            next: 0,
        }
    }

    /// Overwrites the oldest slot with `probe`.
    pub fn push(&mut self, probe: Probe) {
        self.slots[self.next] = Some(probe);
        self.next = (self.next + 1) % PROBE_RING_SIZE;
    }

    /// Index of the slot the next probe will overwrite.
    pub fn write_index(&self) -> usize {
        self.next
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when no probe has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates over the stored probes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Probe> {
        self.slots.iter().flatten()
    }

    /// Gaussian-weighted estimate for the direction at `azimuth`.
    ///
    /// Every stored probe adds its kernel weight to the normalizer; only
    /// probes closer than `max_distance` add to the distance, hit and
    /// absorption sums. Far probes therefore pull the estimate toward zero
    /// instead of dropping out of it. Slots that were never written hold no
    /// probe and add nothing, not even to the normalizer.
    pub fn estimate(&self, azimuth: f32, max_distance: f32) -> DirectionEstimate {
        let mut weight_sum = 0.0f32;
        let mut distance_sum = 0.0f32;
        let mut hit_sum = 0.0f32;
        let mut absorption_sum = 0.0f32;

        for probe in self.iter() {
            let weight = gaussian(angle_difference(azimuth, probe.angle), KERNEL_SIGMA);
            weight_sum += weight;
            if probe.distance < max_distance {
                distance_sum += probe.distance * weight;
                hit_sum += weight;
                absorption_sum += probe.absorption * weight;
            }
        }

        if weight_sum > MIN_WEIGHT_SUM {
            DirectionEstimate {
                distance: distance_sum / weight_sum,
                hit_ratio: hit_sum / weight_sum,
                absorption: absorption_sum / weight_sum,
            }
        } else {
            DirectionEstimate::SILENT
        }
    }
}
