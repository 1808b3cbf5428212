//! Filtered feedback delay channel, one per listening direction.

use echoprobe_core::{Biquad, BiquadCoefficients, flush_denormal};

use crate::DIRECTIONS;
use crate::error::SegmentError;
use crate::params::DirectionParams;

/// Canonical azimuths of the four directions, in radians.
///
/// Directions 0 and 1 are fed by the left input, 2 and 3 by the right.
pub const AZIMUTHS: [f32; DIRECTIONS] = [
    135.0 * core::f32::consts::PI / 180.0,
    225.0 * core::f32::consts::PI / 180.0,
    315.0 * core::f32::consts::PI / 180.0,
    45.0 * core::f32::consts::PI / 180.0,
];

/// Single-tap comb filter with a lowpass + allpass in the feedback path.
///
/// Per sample, with input `x`:
///
/// ```text
/// sample  = last_output + x
/// delayed = delay[index]                      (written delay_length samples ago)
/// out     = allpass(lowpass(delayed * gain))
/// delay[index] = sample
/// index   = (index + 1) % delay_length
/// last_output = out
/// ```
///
/// The same index is used for reading and writing. The delay storage is
/// allocated once at full capacity; parameter changes only move the
/// wrap point.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionChannel {
    last_output: f32,
    delay: Box<[f32]>,
    index: usize,
    delay_length: usize,
    lowpass: Biquad,
    allpass: Biquad,
    gain: f32,
}

impl DirectionChannel {
    /// Allocates a silent channel whose delay line holds `capacity` samples.
    ///
    /// Filters start as passthrough, gain at 0 and the delay length at 1.
    pub fn try_new(capacity: usize) -> Result<Self, SegmentError> {
        let mut delay = Vec::new();
        delay
            .try_reserve_exact(capacity)
            .map_err(|_| SegmentError::OutOfMemory {
                requested: capacity,
            })?;
        delay.resize(capacity, 0.0);

        Ok(Self {
            last_output: 0.0,
            delay: delay.into_boxed_slice(),
            index: 0,
            delay_length: 1,
            lowpass: Biquad::new(),
            allpass: Biquad::new(),
            gain: 0.0,
        })
    }

    /// Processes one input sample and returns the channel output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let sample = self.last_output + input;
        let delayed = self.delay[self.index];
        let filtered = self.allpass.process(self.lowpass.process(delayed * self.gain));

        self.delay[self.index] = sample;
        self.index = (self.index + 1) % self.delay_length;
        self.last_output = flush_denormal(filtered);
        self.last_output
    }

    /// Zeroes the delay line, the feedback value and the filter histories.
    ///
    /// Delay length, gain and coefficients are kept.
    pub fn reset(&mut self) {
        self.delay.fill(0.0);
        self.index = 0;
        self.last_output = 0.0;
        self.lowpass.clear();
        self.allpass.clear();
    }

    /// Applies new parameters; the index is folded into the new length.
    pub fn configure(&mut self, params: &DirectionParams) {
        self.delay_length = params.delay_length.clamp(1, self.capacity());
        self.index %= self.delay_length;
        self.gain = params.gain;
        self.lowpass.set_coefficients(params.lowpass);
        self.allpass.set_coefficients(params.allpass);
    }

    /// Size of the delay storage in samples.
    pub fn capacity(&self) -> usize {
        self.delay.len()
    }

    /// Active delay length in samples.
    pub fn delay_length(&self) -> usize {
        self.delay_length
    }

    /// Shared read/write position, always `< delay_length`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Feedback gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Output produced by the previous sample.
    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    /// Absorption lowpass coefficients.
    pub fn lowpass_coefficients(&self) -> BiquadCoefficients {
        self.lowpass.coefficients()
    }

    /// Scattering allpass coefficients.
    pub fn allpass_coefficients(&self) -> BiquadCoefficients {
        self.allpass.coefficients()
    }
}
