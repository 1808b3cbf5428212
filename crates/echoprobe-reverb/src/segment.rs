//! The spatial reverb segment: lifecycle, configuration and streaming.

use std::sync::Arc;

use echoprobe_core::StreamBuffer;
use parking_lot::Mutex;

use crate::DIRECTIONS;
use crate::direction::{AZIMUTHS, DirectionChannel};
use crate::error::SegmentError;
use crate::field::{Field, Location, Value};
use crate::info::{SPATIAL_REVERB_INFO, SegmentInfo};
use crate::mix;
use crate::params::{BulkParameters, DirectionParams};
use crate::probe::{Probe, ProbeRing};

/// Shared handle to a host-owned streaming buffer.
///
/// Any `Arc<Mutex<B>>` with `B: StreamBuffer + Send` coerces into this.
pub type BufferHandle = Arc<Mutex<dyn StreamBuffer + Send>>;

/// Default seconds of delay per unit of distance.
pub const DEFAULT_DISTANCE_DELAY: f32 = 0.0001;

/// Default probe distance cutoff (every finite probe counts).
pub const DEFAULT_MAX_DISTANCE: f32 = f32::MAX;

/// Which streaming path [`SpatialReverb::mix`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Full four-direction processing.
    #[default]
    Processing,
    /// Inputs are copied to outputs; channel state is left untouched.
    Bypass,
}

/// Directional, distance-aware reverb fed by spatial probes.
///
/// Consumes a stereo pair of streaming buffers and produces a stereo pair.
/// Each block, [`mix`](Self::mix) processes the largest run all four buffers
/// can provide.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use echoprobe_core::RingBuffer;
/// use echoprobe_reverb::{Location, Probe, SpatialReverb};
///
/// let mut reverb = SpatialReverb::new(48000).unwrap();
/// let left_in = Arc::new(Mutex::new(RingBuffer::with_capacity(256)));
/// let right_in = Arc::new(Mutex::new(RingBuffer::with_capacity(256)));
/// let left_out = Arc::new(Mutex::new(RingBuffer::with_capacity(256)));
/// let right_out = Arc::new(Mutex::new(RingBuffer::with_capacity(256)));
///
/// reverb.connect_input(Location::Left, left_in.clone()).unwrap();
/// reverb.connect_input(Location::Right, right_in.clone()).unwrap();
/// reverb.connect_output(Location::Left, left_out.clone()).unwrap();
/// reverb.connect_output(Location::Right, right_out.clone()).unwrap();
///
/// reverb.feed_probe(Probe::new(0.8, 12.0, 0.4)).unwrap();
/// reverb.start();
///
/// left_in.lock().push_slice(&[1.0; 64]);
/// right_in.lock().push_slice(&[0.0; 64]);
/// assert_eq!(reverb.mix(), 64);
/// assert_eq!(left_out.lock().available_read(), 64);
/// ```
pub struct SpatialReverb {
    directions: [DirectionChannel; DIRECTIONS],
    probes: ProbeRing,
    sample_rate: u32,
    delay_capacity: usize,
    distance_delay_factor: f32,
    max_distance_cutoff: f32,
    inputs: [Option<BufferHandle>; 2],
    outputs: [Option<BufferHandle>; 2],
    mode: Mode,
}

impl SpatialReverb {
    /// Creates a segment with four delay lines of one second each.
    ///
    /// Fails with `InvalidValue` for a zero sample rate and `OutOfMemory`
    /// when a delay line cannot be allocated; channels allocated before the
    /// failure are released.
    pub fn new(sample_rate: u32) -> Result<Self, SegmentError> {
        if sample_rate == 0 {
            return Err(SegmentError::invalid_value(
                Field::Buffer,
                "sample rate must be > 0",
            ));
        }
        let capacity = sample_rate as usize;

        let directions = [
            DirectionChannel::try_new(capacity)?,
            DirectionChannel::try_new(capacity)?,
            DirectionChannel::try_new(capacity)?,
            DirectionChannel::try_new(capacity)?,
        ];

        tracing::debug!(sample_rate, capacity, "spatial_reverb: created");

        Ok(Self {
            directions,
            probes: ProbeRing::new(),
            sample_rate,
            delay_capacity: capacity,
            distance_delay_factor: DEFAULT_DISTANCE_DELAY,
            max_distance_cutoff: DEFAULT_MAX_DISTANCE,
            inputs: [None, None],
            outputs: [None, None],
            mode: Mode::Processing,
        })
    }

    /// Static description of the segment and its fields.
    pub fn info() -> &'static SegmentInfo {
        &SPATIAL_REVERB_INFO
    }

    /// Resets transient channel state: delay lines, indices, feedback values
    /// and filter histories.
    ///
    /// Configuration, the probe ring and derived parameters are kept.
    pub fn start(&mut self) {
        for direction in &mut self.directions {
            direction.reset();
        }
        tracing::debug!("spatial_reverb: started");
    }

    /// Releases the delay lines.
    pub fn destroy(self) {
        tracing::debug!(sample_rate = self.sample_rate, "spatial_reverb: destroyed");
    }

    // --- streaming -------------------------------------------------------

    /// Processes one block and returns the number of frames consumed.
    ///
    /// The block length is the shortest run offered by the two inputs and
    /// the two outputs. An unbound slot counts as an empty run.
    pub fn mix(&mut self) -> usize {
        let ([Some(in_l), Some(in_r)], [Some(out_l), Some(out_r)]) =
            (&self.inputs, &self.outputs)
        else {
            return 0;
        };

        let mut in_l = in_l.lock();
        let mut in_r = in_r.lock();
        let mut out_l = out_l.lock();
        let mut out_r = out_r.lock();

        let samples = {
            let left_in = in_l.request_read(usize::MAX);
            let right_in = in_r.request_read(usize::MAX);
            let left_out = out_l.request_write(usize::MAX);
            let right_out = out_r.request_write(usize::MAX);

            let samples = left_in
                .len()
                .min(right_in.len())
                .min(left_out.len())
                .min(right_out.len());
            let (left_in, right_in) = (&left_in[..samples], &right_in[..samples]);
            let (left_out, right_out) = (&mut left_out[..samples], &mut right_out[..samples]);

            match self.mode {
                Mode::Processing => {
                    mix::render(&mut self.directions, left_in, right_in, left_out, right_out);
                }
                Mode::Bypass => {
                    left_out.copy_from_slice(left_in);
                    right_out.copy_from_slice(right_in);
                }
            }
            samples
        };

        in_l.finish_read(samples);
        in_r.finish_read(samples);
        out_l.finish_write(samples);
        out_r.finish_write(samples);
        samples
    }

    // --- buffers ---------------------------------------------------------

    /// Binds an input buffer through the generic field interface.
    pub fn set_in(
        &mut self,
        field: Field,
        location: u32,
        buffer: BufferHandle,
    ) -> Result<(), SegmentError> {
        if field != Field::Buffer {
            return Err(field.invalid());
        }
        self.connect_input(Location::try_from(location)?, buffer)
    }

    /// Binds an output buffer through the generic field interface.
    pub fn set_out(
        &mut self,
        field: Field,
        location: u32,
        buffer: BufferHandle,
    ) -> Result<(), SegmentError> {
        if field != Field::Buffer {
            return Err(field.invalid());
        }
        self.connect_output(Location::try_from(location)?, buffer)
    }

    /// Binds `buffer` as the input at `location`.
    pub fn connect_input(
        &mut self,
        location: Location,
        buffer: BufferHandle,
    ) -> Result<(), SegmentError> {
        self.ensure_unbound_elsewhere(&buffer, Some(location), None)?;
        self.inputs[location.index()] = Some(buffer);
        Ok(())
    }

    /// Binds `buffer` as the output at `location`.
    pub fn connect_output(
        &mut self,
        location: Location,
        buffer: BufferHandle,
    ) -> Result<(), SegmentError> {
        self.ensure_unbound_elsewhere(&buffer, None, Some(location))?;
        self.outputs[location.index()] = Some(buffer);
        Ok(())
    }

    /// The driver locks all four buffers at once, so one buffer may only
    /// occupy one slot.
    fn ensure_unbound_elsewhere(
        &self,
        buffer: &BufferHandle,
        input_slot: Option<Location>,
        output_slot: Option<Location>,
    ) -> Result<(), SegmentError> {
        let same = |other: &Option<BufferHandle>| {
            other.as_ref().is_some_and(|other| {
                Arc::as_ptr(other).cast::<()>() == Arc::as_ptr(buffer).cast::<()>()
            })
        };
        let clashes_in = [Location::Left, Location::Right]
            .into_iter()
            .filter(|&loc| input_slot != Some(loc))
            .any(|loc| same(&self.inputs[loc.index()]));
        let clashes_out = [Location::Left, Location::Right]
            .into_iter()
            .filter(|&loc| output_slot != Some(loc))
            .any(|loc| same(&self.outputs[loc.index()]));

        if clashes_in || clashes_out {
            tracing::warn!("spatial_reverb: buffer already bound to another slot");
            return Err(SegmentError::invalid_value(
                Field::Buffer,
                "buffer is already bound to another slot",
            ));
        }
        Ok(())
    }

    // --- generic field access ---------------------------------------------

    /// Reads a field.
    ///
    /// `BulkParameters` and `Probe` are write-only; `Buffer` is bound through
    /// [`set_in`](Self::set_in) / [`set_out`](Self::set_out).
    pub fn get(&self, field: Field) -> Result<Value, SegmentError> {
        match field {
            Field::DistanceDelay => Ok(Value::Float(self.distance_delay_factor)),
            Field::MaxDistanceCutoff => Ok(Value::Float(self.max_distance_cutoff)),
            Field::Bypass => Ok(Value::Bool(self.is_bypassed())),
            Field::Buffer | Field::BulkParameters | Field::Probe => Err(field.invalid()),
        }
    }

    /// Writes a field.
    ///
    /// Nothing is modified when the value is rejected.
    pub fn set(&mut self, field: Field, value: Value) -> Result<(), SegmentError> {
        let result = self.apply_field(field, value);
        if let Err(err) = &result {
            tracing::warn!("spatial_reverb: set {} rejected: {err}", field.name());
        }
        result
    }

    fn apply_field(&mut self, field: Field, value: Value) -> Result<(), SegmentError> {
        match (field, value) {
            (Field::DistanceDelay, value) => {
                self.set_distance_delay_factor(value.as_float(field)?)
            }
            (Field::MaxDistanceCutoff, value) => {
                self.set_max_distance_cutoff(value.as_float(field)?)
            }
            (Field::Bypass, value) => {
                self.set_bypass(value.as_bool(field)?);
                Ok(())
            }
            (Field::BulkParameters, Value::Bulk(bulk)) => self.update(&bulk),
            (Field::Probe, Value::Probe(probe)) => self.feed_probe(probe),
            (Field::BulkParameters | Field::Probe, _) => Err(SegmentError::invalid_value(
                field,
                "value does not match the field",
            )),
            (Field::Buffer, _) => Err(field.invalid()),
        }
    }

    /// Reads a field by raw host id.
    pub fn get_raw(&self, field: u32) -> Result<Value, SegmentError> {
        self.get(Field::try_from(field)?)
    }

    /// Writes a field by raw host id.
    pub fn set_raw(&mut self, field: u32, value: Value) -> Result<(), SegmentError> {
        self.set(Field::try_from(field)?, value)
    }

    // --- typed configuration ------------------------------------------------

    /// Seconds of delay per unit of distance.
    pub fn distance_delay_factor(&self) -> f32 {
        self.distance_delay_factor
    }

    /// Sets the seconds of delay per unit of distance.
    ///
    /// Takes effect on the next bulk update or probe; negative and
    /// non-finite factors are rejected.
    pub fn set_distance_delay_factor(&mut self, factor: f32) -> Result<(), SegmentError> {
        check_distance_delay_factor(factor)?;
        self.distance_delay_factor = factor;
        Ok(())
    }

    /// Distance at and beyond which probes stop counting as hits.
    pub fn max_distance_cutoff(&self) -> f32 {
        self.max_distance_cutoff
    }

    /// Sets the probe distance cutoff; takes effect on the next probe.
    pub fn set_max_distance_cutoff(&mut self, cutoff: f32) -> Result<(), SegmentError> {
        check_max_distance_cutoff(cutoff)?;
        self.max_distance_cutoff = cutoff;
        Ok(())
    }

    /// Current streaming mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True in pass-through mode.
    pub fn is_bypassed(&self) -> bool {
        self.mode == Mode::Bypass
    }

    /// Switches between processing and pass-through.
    pub fn set_bypass(&mut self, bypass: bool) {
        let mode = if bypass { Mode::Bypass } else { Mode::Processing };
        if mode != self.mode {
            tracing::debug!(?mode, "spatial_reverb: mode switch");
        }
        self.mode = mode;
    }

    /// Applies distances, hit ratios and absorptions to all four directions.
    ///
    /// The whole block is validated first; an invalid value leaves every
    /// direction unchanged.
    pub fn update(&mut self, bulk: &BulkParameters) -> Result<(), SegmentError> {
        bulk.validate()?;
        self.apply_bulk(bulk);
        Ok(())
    }

    /// Inserts a probe into the ring and re-derives all four directions.
    pub fn feed_probe(&mut self, probe: Probe) -> Result<(), SegmentError> {
        probe.validate()?;
        self.probes.push(probe.normalized());

        let estimates =
            AZIMUTHS.map(|azimuth| self.probes.estimate(azimuth, self.max_distance_cutoff));
        self.apply_bulk(&BulkParameters::from_estimates(&estimates));
        Ok(())
    }

    fn apply_bulk(&mut self, bulk: &BulkParameters) {
        let params = DirectionParams::derive_all(
            bulk,
            self.distance_delay_factor,
            self.sample_rate,
            self.delay_capacity,
        );
        for (direction, params) in self.directions.iter_mut().zip(&params) {
            direction.configure(params);
        }
        tracing::trace!(
            delay = ?params.map(|p| p.delay_length),
            gain = ?params.map(|p| p.gain),
            "spatial_reverb: parameters updated"
        );
    }

    // --- introspection ------------------------------------------------------

    /// Sample rate fixed at construction.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Delay line capacity in samples (one second).
    pub fn delay_capacity(&self) -> usize {
        self.delay_capacity
    }

    /// The four direction channels, in azimuth order.
    pub fn directions(&self) -> &[DirectionChannel; DIRECTIONS] {
        &self.directions
    }

    /// One direction channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`.
    pub fn direction(&self, index: usize) -> &DirectionChannel {
        &self.directions[index]
    }

    /// Probes currently in the ring.
    pub fn probes(&self) -> &ProbeRing {
        &self.probes
    }
}

pub(crate) fn check_distance_delay_factor(factor: f32) -> Result<(), SegmentError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(SegmentError::invalid_value(
            Field::DistanceDelay,
            "factor must be finite and >= 0",
        ));
    }
    Ok(())
}

pub(crate) fn check_max_distance_cutoff(cutoff: f32) -> Result<(), SegmentError> {
    if cutoff.is_nan() {
        return Err(SegmentError::invalid_value(
            Field::MaxDistanceCutoff,
            "cutoff must not be NaN",
        ));
    }
    Ok(())
}

impl core::fmt::Debug for SpatialReverb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialReverb")
            .field("sample_rate", &self.sample_rate)
            .field("distance_delay_factor", &self.distance_delay_factor)
            .field("max_distance_cutoff", &self.max_distance_cutoff)
            .field("mode", &self.mode)
            .field("probes", &self.probes.len())
            .field("inputs_bound", &self.inputs.iter().filter(|b| b.is_some()).count())
            .field("outputs_bound", &self.outputs.iter().filter(|b| b.is_some()).count())
            .finish_non_exhaustive()
    }
}
