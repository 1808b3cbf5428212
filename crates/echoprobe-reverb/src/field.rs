//! Field identifiers and values for the generic get/set surface.
//!
//! Hosts address the segment with numeric field ids and buffer locations.
//! [`Field`] and [`Location`] give those ids stable values and turn unknown
//! ids into [`SegmentError::InvalidField`] / [`SegmentError::InvalidLocation`].

use crate::error::SegmentError;
use crate::params::BulkParameters;
use crate::probe::Probe;

/// Configuration fields exposed by the spatial reverb.
///
/// The discriminants are part of the host contract and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Field {
    /// Streaming buffer bound to an input or output location.
    Buffer = 1,
    /// Seconds of delay per unit of probe distance.
    DistanceDelay = 2,
    /// Probes at or beyond this distance do not count as hits.
    MaxDistanceCutoff = 3,
    /// Distances, hit ratios and absorptions for all four directions.
    BulkParameters = 4,
    /// A single spatial probe.
    Probe = 5,
    /// Pass-through mode.
    Bypass = 6,
}

impl Field {
    /// Every field, in id order.
    pub const ALL: [Field; 6] = [
        Field::Buffer,
        Field::DistanceDelay,
        Field::MaxDistanceCutoff,
        Field::BulkParameters,
        Field::Probe,
        Field::Bypass,
    ];

    /// Numeric id of the field.
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Short lowercase name, used by the CLI and in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Buffer => "buffer",
            Field::DistanceDelay => "distance_delay",
            Field::MaxDistanceCutoff => "max_distance_cutoff",
            Field::BulkParameters => "bulk_parameters",
            Field::Probe => "probe",
            Field::Bypass => "bypass",
        }
    }

    pub(crate) fn invalid(self) -> SegmentError {
        SegmentError::InvalidField(self.id())
    }
}

impl TryFrom<u32> for Field {
    type Error = SegmentError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Field::ALL
            .into_iter()
            .find(|field| field.id() == id)
            .ok_or(SegmentError::InvalidField(id))
    }
}

/// Channel slot a buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Location {
    /// Left channel.
    Left = 0,
    /// Right channel.
    Right = 1,
}

impl Location {
    /// Slot index into the segment's buffer arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u32> for Location {
    type Error = SegmentError;

    fn try_from(location: u32) -> Result<Self, Self::Error> {
        match location {
            0 => Ok(Location::Left),
            1 => Ok(Location::Right),
            other => Err(SegmentError::InvalidLocation(other)),
        }
    }
}

/// A field value passed through [`SpatialReverb::get`](crate::SpatialReverb::get)
/// and [`SpatialReverb::set`](crate::SpatialReverb::set).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Scalar float field.
    Float(f32),
    /// Boolean field.
    Bool(bool),
    /// Four-direction parameter block.
    Bulk(BulkParameters),
    /// One probe.
    Probe(Probe),
}

impl Value {
    /// The float payload, or `InvalidValue` for `field`.
    pub(crate) fn as_float(self, field: Field) -> Result<f32, SegmentError> {
        match self {
            Value::Float(value) => Ok(value),
            _ => Err(SegmentError::invalid_value(field, "expected a float")),
        }
    }

    /// The bool payload, or `InvalidValue` for `field`.
    pub(crate) fn as_bool(self, field: Field) -> Result<bool, SegmentError> {
        match self {
            Value::Bool(value) => Ok(value),
            _ => Err(SegmentError::invalid_value(field, "expected a bool")),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<BulkParameters> for Value {
    fn from(value: BulkParameters) -> Self {
        Value::Bulk(value)
    }
}

impl From<Probe> for Value {
    fn from(value: Probe) -> Self {
        Value::Probe(value)
    }
}
