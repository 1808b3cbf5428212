//! Static description of the segment for host discovery.
//!
//! Hosts that build processing chains generically read [`SegmentInfo`] to
//! learn how many buffers the segment takes and which fields it exposes.

use crate::field::Field;

/// How a field may be accessed.
///
/// Bitflag type; use [`union`](Self::union) to combine.
///
/// # Example
///
/// ```rust
/// use echoprobe_reverb::FieldAccess;
///
/// let access = FieldAccess::SEGMENT.union(FieldAccess::SET);
/// assert!(access.contains(FieldAccess::SET));
/// assert!(!access.contains(FieldAccess::GET));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAccess(u8);

impl FieldAccess {
    /// No access.
    pub const NONE: Self = Self(0);
    /// Addressed per input location.
    pub const IN: Self = Self(1 << 0);
    /// Addressed per output location.
    pub const OUT: Self = Self(1 << 1);
    /// Addressed on the segment as a whole.
    pub const SEGMENT: Self = Self(1 << 2);
    /// Writable.
    pub const SET: Self = Self(1 << 3);
    /// Readable.
    pub const GET: Self = Self(1 << 4);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Five-letter rendering (`ioswr`), `-` for unset bits.
    pub fn letters(self) -> String {
        [
            (Self::IN, 'i'),
            (Self::OUT, 'o'),
            (Self::SEGMENT, 's'),
            (Self::SET, 'w'),
            (Self::GET, 'r'),
        ]
        .iter()
        .map(|&(flag, c)| if self.contains(flag) { c } else { '-' })
        .collect()
    }
}

/// Payload type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A streaming buffer handle.
    Buffer,
    /// One or more `f32` values.
    Float,
    /// A boolean flag.
    Bool,
}

impl ValueKind {
    /// Lowercase name for listings.
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Buffer => "buffer",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        }
    }
}

/// One entry of the field table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInfo {
    /// The field described.
    pub field: Field,
    /// Payload type.
    pub kind: ValueKind,
    /// Number of values of `kind` the field carries.
    pub count: usize,
    /// Permitted access.
    pub access: FieldAccess,
    /// Human-readable description.
    pub description: &'static str,
}

/// Segment metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentInfo {
    /// Registry name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// One buffer may be bound as both an input and an output.
    pub in_place: bool,
    /// Minimum number of input buffers.
    pub min_inputs: usize,
    /// Maximum number of input buffers.
    pub max_inputs: usize,
    /// Number of output buffers.
    pub outputs: usize,
    /// Every field the segment accepts.
    pub fields: &'static [FieldInfo],
}

impl SegmentInfo {
    /// Looks up the table entry for `field`.
    pub fn field(&self, field: Field) -> Option<&FieldInfo> {
        self.fields.iter().find(|info| info.field == field)
    }
}

const SCALAR: FieldAccess = FieldAccess::SEGMENT
    .union(FieldAccess::SET)
    .union(FieldAccess::GET);

const WRITE_ONLY: FieldAccess = FieldAccess::SEGMENT.union(FieldAccess::SET);

pub(crate) static SPATIAL_REVERB_INFO: SegmentInfo = SegmentInfo {
    name: "spatial_reverb",
    description: "Dynamic reverb based on spatial probing.",
    in_place: false,
    min_inputs: 2,
    max_inputs: 2,
    outputs: 2,
    fields: &[
        FieldInfo {
            field: Field::Buffer,
            kind: ValueKind::Buffer,
            count: 1,
            access: FieldAccess::IN.union(FieldAccess::OUT).union(FieldAccess::SET),
            description: "The buffer for audio data attached to the location. \
                          A buffer may be bound to one slot only.",
        },
        FieldInfo {
            field: Field::DistanceDelay,
            kind: ValueKind::Float,
            count: 1,
            access: SCALAR,
            description: "How much delay (in seconds) to use per unit of distance.",
        },
        FieldInfo {
            field: Field::MaxDistanceCutoff,
            kind: ValueKind::Float,
            count: 1,
            access: SCALAR,
            description: "Probes at or beyond this distance do not count as hits.",
        },
        FieldInfo {
            field: Field::BulkParameters,
            kind: ValueKind::Float,
            count: 12,
            access: WRITE_ONLY,
            description: "Distances, hit ratios and absorptions for the four directions.",
        },
        FieldInfo {
            field: Field::Probe,
            kind: ValueKind::Float,
            count: 3,
            access: WRITE_ONLY,
            description: "A spatial probe: angle, distance and absorption.",
        },
        FieldInfo {
            field: Field::Bypass,
            kind: ValueKind::Bool,
            count: 1,
            access: SCALAR,
            description: "Bypass the segment's processing.",
        },
    ],
};
