//! Stereo ↔ four-direction routing and the block render loop.

use crate::DIRECTIONS;
use crate::direction::DirectionChannel;

/// Spreads one stereo frame over the four directions: `[L, L, R, R]`.
#[inline]
pub fn upmix(left: f32, right: f32) -> [f32; DIRECTIONS] {
    [left, left, right, right]
}

/// Folds the four direction outputs back to stereo.
///
/// Left is the mean of directions 0 and 1, right the mean of 2 and 3.
#[inline]
pub fn downmix(outputs: [f32; DIRECTIONS]) -> (f32, f32) {
    (
        (outputs[0] + outputs[1]) * 0.5,
        (outputs[2] + outputs[3]) * 0.5,
    )
}

/// Runs `left_in.len()` frames through the four channels.
///
/// All four slices must have the same length.
pub fn render(
    directions: &mut [DirectionChannel; DIRECTIONS],
    left_in: &[f32],
    right_in: &[f32],
    left_out: &mut [f32],
    right_out: &mut [f32],
) {
    debug_assert!(
        left_in.len() == right_in.len()
            && left_in.len() == left_out.len()
            && left_in.len() == right_out.len(),
        "render buffers must have equal length"
    );

    let frames = left_in
        .iter()
        .zip(right_in)
        .zip(left_out.iter_mut().zip(right_out.iter_mut()));

    for ((&l, &r), (out_l, out_r)) in frames {
        let feeds = upmix(l, r);
        let mut outputs = [0.0; DIRECTIONS];
        for ((channel, feed), out) in directions.iter_mut().zip(feeds).zip(&mut outputs) {
            *out = channel.process(feed);
        }
        (*out_l, *out_r) = downmix(outputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DirectionParams;
    use echoprobe_core::BiquadCoefficients;

    #[test]
    fn upmix_routes_left_then_right() {
        assert_eq!(upmix(0.25, -0.5), [0.25, 0.25, -0.5, -0.5]);
    }

    #[test]
    fn downmix_averages_pairs() {
        assert_eq!(downmix([1.0, 0.0, 0.5, 0.5]), (0.5, 0.5));
        assert_eq!(downmix([0.2, 0.4, -1.0, 0.0]), (0.3, -0.5));
    }

    #[test]
    fn render_keeps_sides_apart() {
        let mut directions: [DirectionChannel; DIRECTIONS] =
            core::array::from_fn(|_| DirectionChannel::try_new(16).unwrap());
        for channel in &mut directions {
            channel.configure(&DirectionParams {
                delay_length: 2,
                gain: 1.0,
                lowpass: BiquadCoefficients::passthrough(),
                allpass: BiquadCoefficients::passthrough(),
            });
        }

        let left_in = [1.0, 0.0, 0.0, 0.0];
        let right_in = [0.0; 4];
        let mut left_out = [0.0; 4];
        let mut right_out = [0.0; 4];
        render(&mut directions, &left_in, &right_in, &mut left_out, &mut right_out);

        assert_eq!(left_out[2], 1.0);
        assert!(right_out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn render_empty_block() {
        let mut directions: [DirectionChannel; DIRECTIONS] =
            core::array::from_fn(|_| DirectionChannel::try_new(4).unwrap());
        render(&mut directions, &[], &[], &mut [], &mut []);
        assert!(directions.iter().all(|d| d.index() == 0));
    }
}
