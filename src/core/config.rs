//! Configuration for clustering and marker animation
//!
//! Options can be built in code, picked from a [`ClusterProfile`] preset, or
//! loaded from JSON through [`AnimatedClustersConfig::from_json_str`]. Every
//! field has a default, so partial JSON documents are accepted.

use crate::animation::easing::EasingFunction;
use crate::core::constants::{
    DEFAULT_ANIMATION_DURATION_MS, DEFAULT_CLUSTER_RADIUS, DEFAULT_EXTENT, DEFAULT_MAX_ZOOM,
    DEFAULT_MIN_POINTS, DEFAULT_MIN_ZOOM,
};
use crate::{ClusterError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options handed to the clustering engine on every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterOptions {
    /// Cluster radius in pixels, relative to `extent`
    pub radius: f64,
    /// Tile extent the radius is expressed in
    pub extent: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Minimum number of markers that form a cluster
    pub min_points: usize,
}

impl ClusterOptions {
    /// Rejects option sets no engine pass can honor
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(ClusterError::InvalidOptions(format!(
                "radius must be positive, got {}",
                self.radius
            ))
            .into());
        }
        if !(self.extent > 0.0) || !self.extent.is_finite() {
            return Err(ClusterError::InvalidOptions(format!(
                "extent must be positive, got {}",
                self.extent
            ))
            .into());
        }
        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidOptions(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            ))
            .into());
        }
        if self.min_points < 2 {
            return Err(ClusterError::InvalidOptions(format!(
                "min_points must be at least 2, got {}",
                self.min_points
            ))
            .into());
        }
        Ok(())
    }

    /// Radius in normalized world units at an integer zoom level
    pub fn world_radius(&self, zoom: u8) -> f64 {
        self.radius / (self.extent * 2_f64.powi(zoom as i32))
    }
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterProfile::default().resolve()
    }
}

/// Presets trading marker density against clutter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClusterProfile {
    /// Small radius, clusters only markers that nearly overlap
    Dense,
    Balanced,
    /// Large radius, aggressive grouping for crowded datasets
    Sparse,
    Custom(ClusterOptions),
}

impl ClusterProfile {
    pub fn resolve(&self) -> ClusterOptions {
        match self {
            Self::Dense => ClusterOptions {
                radius: 20.0,
                extent: DEFAULT_EXTENT,
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: 18,
                min_points: DEFAULT_MIN_POINTS,
            },
            Self::Balanced => ClusterOptions {
                radius: DEFAULT_CLUSTER_RADIUS,
                extent: DEFAULT_EXTENT,
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: DEFAULT_MAX_ZOOM,
                min_points: DEFAULT_MIN_POINTS,
            },
            Self::Sparse => ClusterOptions {
                radius: 80.0,
                extent: DEFAULT_EXTENT,
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: 14,
                min_points: 3,
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

impl Default for ClusterProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Defaults used by the region animator when `animate` omits them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionAnimationConfig {
    pub duration_ms: u64,
    pub easing: EasingFunction,
}

impl RegionAnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for RegionAnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            easing: EasingFunction::EaseInOut,
        }
    }
}

/// Behavior switches for the cluster reconciler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconcilerConfig {
    /// When false every pass delivers the engine output as is, without
    /// animation descriptors
    pub animate_transitions: bool,
    /// Append markers leaving a cluster to the delivered frame so they can
    /// fly out of it during the pass
    pub include_emerging: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            animate_transitions: true,
            include_emerging: true,
        }
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimatedClustersConfig {
    pub clustering: ClusterOptions,
    pub region_animation: RegionAnimationConfig,
    pub reconciler: ReconcilerConfig,
}

impl AnimatedClustersConfig {
    /// Parses a JSON document and validates the clustering options
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ClusterError::Serialization)?;
        config.clustering.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(ClusterError::Serialization)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_profile_presets() {
        let balanced = ClusterProfile::Balanced.resolve();
        let dense = ClusterProfile::Dense.resolve();
        let sparse = ClusterProfile::Sparse.resolve();

        assert_eq!(balanced, ClusterOptions::default());
        assert_eq!(balanced.radius, 40.0);
        assert!(dense.radius < balanced.radius);
        assert!(sparse.radius > balanced.radius);
        assert!(balanced.validate().is_ok());
        assert!(dense.validate().is_ok());
        assert!(sparse.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let inverted = ClusterOptions {
            min_zoom: 10,
            max_zoom: 2,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let no_radius = ClusterOptions {
            radius: 0.0,
            ..Default::default()
        };
        assert!(no_radius.validate().is_err());

        let lonely = ClusterOptions {
            min_points: 1,
            ..Default::default()
        };
        let err = lonely.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClusterError>(),
            Some(ClusterError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_world_radius_halves_per_zoom() {
        let options = ClusterOptions::default();
        let z0 = options.world_radius(0);
        let z1 = options.world_radius(1);
        assert!((z0 - 40.0 / 512.0).abs() < 1e-12);
        assert!((z0 / z1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_region_animation_defaults() {
        let config = RegionAnimationConfig::default();
        assert_eq!(config.duration(), Duration::from_millis(500));
        assert_eq!(config.easing, EasingFunction::EaseInOut);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            AnimatedClustersConfig::from_json_str(r#"{ "clustering": { "radius": 60 } }"#)
                .unwrap();
        assert_eq!(config.clustering.radius, 60.0);
        assert_eq!(config.clustering.max_zoom, 16);
        assert!(config.reconciler.animate_transitions);

        let json = config.to_json_string().unwrap();
        assert_eq!(AnimatedClustersConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_options_are_rejected() {
        let result = AnimatedClustersConfig::from_json_str(r#"{ "clustering": { "minPoints": 0 } }"#);
        assert!(result.is_err());
        assert!(AnimatedClustersConfig::from_json_str("not json").is_err());
    }
}
