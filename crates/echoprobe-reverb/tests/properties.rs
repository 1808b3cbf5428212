//! Property-based tests for the reverb segment.
//!
//! Uses proptest to check the invariants that must hold for any parameter
//! set and input: delay indices stay in bounds, bypass is exact pass-through,
//! bulk updates do not accumulate, and output stays finite.

use std::sync::Arc;

use echoprobe_core::{BiquadCoefficients, RingBuffer};
use echoprobe_reverb::{
    BulkParameters, DirectionChannel, DirectionParams, Location, Probe, SpatialReverb,
};
use parking_lot::Mutex;
use proptest::prelude::*;

const SAMPLE_RATE: u32 = 2000;

fn bulk_strategy() -> impl Strategy<Value = BulkParameters> {
    (
        prop::array::uniform4(0.0f32..200.0),
        prop::array::uniform4(0.0f32..=1.0),
        prop::array::uniform4(0.0f32..=1.0),
    )
        .prop_map(|(distances, hit_ratios, absorptions)| BulkParameters {
            distances,
            hit_ratios,
            absorptions,
        })
}

fn probe_strategy() -> impl Strategy<Value = Probe> {
    (-10.0f32..10.0, 0.0f32..100.0, 0.0f32..=1.0)
        .prop_map(|(angle, distance, absorption)| Probe::new(angle, distance, absorption))
}

fn wired() -> (SpatialReverb, [Arc<Mutex<RingBuffer>>; 4]) {
    let mut reverb = SpatialReverb::new(SAMPLE_RATE).unwrap();
    let rings: [Arc<Mutex<RingBuffer>>; 4] =
        std::array::from_fn(|_| Arc::new(Mutex::new(RingBuffer::with_capacity(512))));
    reverb.connect_input(Location::Left, rings[0].clone()).unwrap();
    reverb.connect_input(Location::Right, rings[1].clone()).unwrap();
    reverb.connect_output(Location::Left, rings[2].clone()).unwrap();
    reverb.connect_output(Location::Right, rings[3].clone()).unwrap();
    (reverb, rings)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The shared read/write index never leaves `[0, delay_length)`, including
    /// right after an update shrinks the delay below the current position.
    #[test]
    fn index_stays_below_delay_length(
        lengths in prop::collection::vec(1usize..300, 1..6),
        steps in prop::collection::vec(0usize..400, 1..6),
    ) {
        let mut channel = DirectionChannel::try_new(256).unwrap();
        for (&length, &count) in lengths.iter().zip(steps.iter().cycle()) {
            channel.configure(&DirectionParams {
                delay_length: length,
                gain: 0.5,
                lowpass: BiquadCoefficients::passthrough(),
                allpass: BiquadCoefficients::passthrough(),
            });
            prop_assert!(channel.index() < channel.delay_length());
            for _ in 0..count {
                channel.process(0.25);
                prop_assert!(channel.index() < channel.delay_length());
            }
        }
    }

    /// Bypass copies every sample exactly and leaves channel state alone.
    #[test]
    fn bypass_is_exact(
        bulk in bulk_strategy(),
        left in prop::collection::vec(-1.0f32..=1.0, 1..256),
    ) {
        let (mut reverb, rings) = wired();
        reverb.set_distance_delay_factor(0.001).unwrap();
        reverb.update(&bulk).unwrap();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();

        let before = reverb.directions().clone();
        reverb.set_bypass(true);
        rings[0].lock().push_slice(&left);
        rings[1].lock().push_slice(&right);
        prop_assert_eq!(reverb.mix(), left.len());

        let mut out_l = vec![0.0; left.len()];
        let mut out_r = vec![0.0; right.len()];
        rings[2].lock().pop_into(&mut out_l);
        rings[3].lock().pop_into(&mut out_r);
        prop_assert_eq!(out_l, left);
        prop_assert_eq!(out_r, right);
        prop_assert_eq!(reverb.directions(), &before);
    }

    /// Applying the same bulk block twice yields the same channel state.
    #[test]
    fn bulk_update_is_idempotent(bulk in bulk_strategy(), factor in 0.0f32..0.05) {
        let mut reverb = SpatialReverb::new(SAMPLE_RATE).unwrap();
        reverb.set_distance_delay_factor(factor).unwrap();
        reverb.update(&bulk).unwrap();
        let once = reverb.directions().clone();
        reverb.update(&bulk).unwrap();
        prop_assert_eq!(reverb.directions(), &once);
    }

    /// Any sequence of valid probes keeps the output finite and every
    /// derived gain within `[0, 1]`.
    #[test]
    fn probe_driven_output_is_finite(
        probes in prop::collection::vec(probe_strategy(), 1..48),
        input in prop::collection::vec(-1.0f32..=1.0, 64..256),
    ) {
        let (mut reverb, rings) = wired();
        reverb.set_distance_delay_factor(0.002).unwrap();
        for probe in probes {
            reverb.feed_probe(probe).unwrap();
        }
        for direction in reverb.directions() {
            prop_assert!((0.0..=1.0 + 1e-5).contains(&direction.gain()));
            prop_assert!((1..=reverb.delay_capacity()).contains(&direction.delay_length()));
        }

        for _ in 0..4 {
            rings[0].lock().push_slice(&input);
            rings[1].lock().push_slice(&input);
            reverb.mix();
            let mut out = vec![0.0; input.len()];
            let n = rings[2].lock().pop_into(&mut out);
            prop_assert!(out[..n].iter().all(|s| s.is_finite()));
            rings[3].lock().pop_into(&mut out);
            prop_assert!(out.iter().all(|s| s.is_finite()));
        }
    }
}
