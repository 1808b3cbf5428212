//! Error types for segment construction and configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::field::Field;

/// Errors reported by [`SpatialReverb`](crate::SpatialReverb) operations.
///
/// Every configuration error is detected before any state is touched, so a
/// failed call leaves the segment exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    /// A delay buffer could not be allocated during construction.
    #[error("out of memory allocating {requested} delay samples")]
    OutOfMemory {
        /// Number of samples that were requested.
        requested: usize,
    },

    /// The field id is unknown, or the field does not support this operation.
    #[error("invalid field {0}")]
    InvalidField(u32),

    /// The buffer location is outside {left, right}.
    #[error("invalid location {0}")]
    InvalidLocation(u32),

    /// The value is not legal for the field.
    #[error("invalid value for {field:?}: {reason}")]
    InvalidValue {
        /// Field the value was meant for.
        field: Field,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl SegmentError {
    pub(crate) fn invalid_value(field: Field, reason: &'static str) -> Self {
        SegmentError::InvalidValue { field, reason }
    }
}

/// Errors that can occur while loading or applying a scene file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The scene holds a value the segment rejects
    #[error("invalid scene: {0}")]
    Segment(#[from] SegmentError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn invalid_value_display() {
        let err = SegmentError::invalid_value(Field::DistanceDelay, "must be >= 0");
        assert_eq!(err.to_string(), "invalid value for DistanceDelay: must be >= 0");
    }

    #[test]
    fn out_of_memory_display() {
        let err = SegmentError::OutOfMemory { requested: 48000 };
        assert_eq!(err.to_string(), "out of memory allocating 48000 delay samples");
    }

    #[test]
    fn field_and_location_display() {
        assert_eq!(SegmentError::InvalidField(99).to_string(), "invalid field 99");
        assert_eq!(SegmentError::InvalidLocation(2).to_string(), "invalid location 2");
    }

    #[test]
    fn read_file_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mock");
        let err = ConfigError::read_file("/scenes/hall.toml", io);
        let msg = err.to_string();
        assert!(msg.contains("/scenes/hall.toml"), "got: {msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn segment_error_converts() {
        let err: ConfigError = SegmentError::InvalidField(7).into();
        assert!(matches!(err, ConfigError::Segment(SegmentError::InvalidField(7))));
    }
}
