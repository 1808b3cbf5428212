//! Echoprobe Reverb - Directional reverb driven by spatial probes
//!
//! The scene around the listener is described either directly, with a
//! distance, hit ratio and absorption per direction, or indirectly by feeding
//! probes (rays cast into the scene). Four feedback delay channels, one per
//! quadrant, turn those values into a delay length, a feedback gain and a
//! pair of feedback filters.
//!
//! - [`SpatialReverb`] - The segment: buffer binding, field access, streaming
//! - [`DirectionChannel`] - Filtered feedback delay for one direction
//! - [`ProbeRing`] - The most recent probes and their Gaussian aggregation
//! - [`BulkParameters`] / [`DirectionParams`] - Physical and derived parameters
//! - [`SceneConfig`] - TOML scene files
//!
//! ## Signal flow
//!
//! ```text
//!   L ──┬── dir 0 (135°) ──┐
//!       └── dir 1 (225°) ──┴── mean ── L'
//!   R ──┬── dir 2 (315°) ──┐
//!       └── dir 3 ( 45°) ──┴── mean ── R'
//! ```
//!
//! ## Example
//!
//! ```rust
//! use echoprobe_reverb::{BulkParameters, SpatialReverb};
//!
//! let mut reverb = SpatialReverb::new(48000).unwrap();
//! reverb.set_distance_delay_factor(0.01).unwrap();
//! reverb.update(&BulkParameters::uniform(1.0, 0.6, 0.4)).unwrap();
//! assert_eq!(reverb.direction(0).delay_length(), 480);
//! ```

pub mod config;
pub mod direction;
pub mod error;
pub mod field;
pub mod info;
pub mod mix;
pub mod params;
pub mod probe;
pub mod segment;

/// Number of listening directions.
pub const DIRECTIONS: usize = 4;

// Re-export main types at crate root
pub use config::SceneConfig;
pub use direction::{AZIMUTHS, DirectionChannel};
pub use error::{ConfigError, SegmentError};
pub use field::{Field, Location, Value};
pub use info::{FieldAccess, FieldInfo, SegmentInfo, ValueKind};
pub use params::{ALLPASS_Q, BulkParameters, DirectionParams};
pub use probe::{DirectionEstimate, KERNEL_SIGMA, MIN_WEIGHT_SUM, PROBE_RING_SIZE, Probe, ProbeRing};
pub use segment::{BufferHandle, DEFAULT_DISTANCE_DELAY, DEFAULT_MAX_DISTANCE, Mode, SpatialReverb};
