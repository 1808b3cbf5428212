//! Biquad (bi-quadratic) filter structure.
//!
//! The reverb's feedback path runs every delayed sample through a lowpass
//! (surface absorption) and an allpass (scattering). Both are second-order
//! sections whose coefficients come from the RBJ Audio EQ Cookbook.

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Lowest cutoff handed to the coefficient formulas, in Hz.
///
/// A cutoff of 0 Hz puts both poles on the unit circle at z = 1.
pub const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest cutoff as a fraction of the sample rate.
///
/// At or above Nyquist the cookbook formulas fold back (at exactly the sample
/// rate the lowpass numerator collapses to zero).
pub const NYQUIST_GUARD: f32 = 0.49;

/// Clamp a cutoff frequency into the range the cookbook formulas handle.
#[inline]
pub fn clamp_cutoff(frequency: f32, sample_rate: f32) -> f32 {
    let upper = (sample_rate * NYQUIST_GUARD).max(MIN_CUTOFF_HZ);
    if frequency.is_nan() {
        return upper;
    }
    frequency.clamp(MIN_CUTOFF_HZ, upper)
}

/// Normalized biquad coefficients (`a0` already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficients
    pub b0: f32,
    /// x[n-1] weight
    pub b1: f32,
    /// x[n-2] weight
    pub b2: f32,
    /// Feedback coefficients (sign convention: subtracted)
    pub a1: f32,
    /// y[n-2] weight
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Identity response: `y[n] = x[n]`.
    pub const fn passthrough() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// Normalizes a raw `(b0, b1, b2, a0, a1, a2)` set by `a0`.
    pub fn from_raw(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// Low-pass coefficients.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Cutoff frequency in Hz (clamped via [`clamp_cutoff`])
    /// * `q` - Q factor ([`BUTTERWORTH_Q`](crate::BUTTERWORTH_Q) for a flat passband)
    /// * `sample_rate` - Sample rate in Hz
    pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);

        let b1 = 1.0 - cos_omega;
        let b0 = b1 / 2.0;
        Self::from_raw(b0, b1, b0, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
    }

    /// All-pass coefficients: unity magnitude, phase turns through -360°
    /// around `frequency`.
    ///
    /// # Arguments
    ///
    /// * `frequency` - Center frequency in Hz (clamped via [`clamp_cutoff`])
    /// * `q` - Q factor, controls how quickly the phase turns
    /// * `sample_rate` - Sample rate in Hz
    pub fn allpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);

        Self::from_raw(
            1.0 - alpha,
            -2.0 * cos_omega,
            1.0 + alpha,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::passthrough()
    }
}

fn omega_terms(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * clamp_cutoff(frequency, sample_rate) / sample_rate;
    (cosf(omega), sinf(omega) / (2.0 * q))
}

/// Second-order IIR filter with its own history.
///
/// Implements the Direct Form I structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Biquad {
    coefficients: BiquadCoefficients,

    /// Input history: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output history: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a biquad with passthrough coefficients and cleared history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a biquad with the given coefficients.
    pub fn with_coefficients(coefficients: BiquadCoefficients) -> Self {
        Self {
            coefficients,
            ..Self::default()
        }
    }

    /// Replaces the coefficients; history is kept so a parameter change does
    /// not produce a discontinuity.
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coefficients
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the history without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
