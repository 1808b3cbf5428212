//! Math helpers for angles, kernels and feedback paths.

use core::f32::consts::{PI, TAU};
use libm::{expf, sqrtf};

/// Q factor of a second-order Butterworth section (1/√2).
///
/// Unity peak gain: a lowpass with this Q never boosts, which keeps a
/// feedback loop with gain <= 1 from growing.
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Flush values in the subnormal range to zero.
///
/// Decaying feedback tails otherwise drift into denormals, which are
/// dramatically slower on most CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Normalize an angle in radians into `[0, 2π)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `2π`; that
/// case folds to 0.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Signed shortest difference `a - b` on the circle, in `[-π, π)`.
#[inline]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b + PI).rem_euclid(TAU) - PI;
    if diff >= PI { diff - TAU } else { diff }
}

/// Normal probability density with mean 0 and standard deviation `sigma`.
#[inline]
pub fn gaussian(x: f32, sigma: f32) -> f32 {
    let norm = 1.0 / (sigma * sqrtf(TAU));
    norm * expf(-(x * x) / (2.0 * sigma * sigma))
}
