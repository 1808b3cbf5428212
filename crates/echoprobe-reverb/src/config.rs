//! Scene files: a TOML snapshot of the reverb's configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, SegmentError};
use crate::params::BulkParameters;
use crate::probe::Probe;
use crate::segment::{SpatialReverb, check_distance_delay_factor, check_max_distance_cutoff};

/// Reverb configuration loaded from a scene file.
///
/// Every key is optional; absent keys leave the segment's current value in
/// place.
///
/// # TOML Format
///
/// ```toml
/// distance_delay_factor = 0.003
/// max_distance_cutoff = 40.0
/// bypass = false
///
/// [bulk]
/// distances = [4.0, 6.0, 5.0, 3.0]
/// hit_ratios = [0.8, 0.7, 0.7, 0.9]
/// absorptions = [0.3, 0.3, 0.5, 0.2]
///
/// [[probes]]
/// angle = 0.79
/// distance = 3.2
/// absorption = 0.25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Seconds of delay per unit of distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_delay_factor: Option<f32>,

    /// Probe distance cutoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance_cutoff: Option<f32>,

    /// Start in pass-through mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass: Option<bool>,

    /// Explicit per-direction parameters, applied before any probes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk: Option<BulkParameters>,

    /// Probes fed in order after the bulk block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probes: Vec<Probe>,
}

impl SceneConfig {
    /// Parse a scene from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a scene from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Checks every value the scene carries.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if let Some(factor) = self.distance_delay_factor {
            check_distance_delay_factor(factor)?;
        }
        if let Some(cutoff) = self.max_distance_cutoff {
            check_max_distance_cutoff(cutoff)?;
        }
        if let Some(bulk) = &self.bulk {
            bulk.validate()?;
        }
        self.probes.iter().try_for_each(Probe::validate)
    }

    /// Applies the scene to `reverb`.
    ///
    /// The whole scene is validated first, so a rejected scene leaves the
    /// segment untouched. Scalars are set before the bulk block so that the
    /// delay factor and cutoff are in effect when directions are derived.
    pub fn apply(&self, reverb: &mut SpatialReverb) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(factor) = self.distance_delay_factor {
            reverb.set_distance_delay_factor(factor)?;
        }
        if let Some(cutoff) = self.max_distance_cutoff {
            reverb.set_max_distance_cutoff(cutoff)?;
        }
        if let Some(bypass) = self.bypass {
            reverb.set_bypass(bypass);
        }
        if let Some(bulk) = &self.bulk {
            reverb.update(bulk)?;
        }
        for probe in &self.probes {
            reverb.feed_probe(*probe)?;
        }

        tracing::debug!(
            probes = self.probes.len(),
            bulk = self.bulk.is_some(),
            "spatial_reverb: scene applied"
        );
        Ok(())
    }
}
