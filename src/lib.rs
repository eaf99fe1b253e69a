//! # Animated Clusters
//!
//! Smooth marker clustering for map views.
//!
//! A [`ClusterEngine`] groups markers into clusters for the current view.
//! The [`ClusterReconciler`] compares each new result with the frame the
//! renderer currently shows and attaches an [`AnimationDescriptor`] to every
//! marker that joins or leaves a cluster, so it can be tweened instead of
//! popping. The [`RegionAnimator`] drives the visible region itself with
//! independent eased tweens per scalar.

pub mod animation;
pub mod clusters;
pub mod core;
pub mod data;
pub mod prelude;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{
        AnimatedClustersConfig, ClusterOptions, ClusterProfile, ReconcilerConfig,
        RegionAnimationConfig,
    },
    geo::{LatLng, LatLngBounds, PartialRegion, Point, Region, ViewportSize},
};

pub use clusters::{
    feature::{
        AnimationDescriptor, ClusterFeature, ClusterId, Feature, Frame, PointFeature, RawMarker,
    },
    reconciler::{ClusterReconciler, Membership, Transition, TransitionKind, TransitionPlan},
};

pub use animation::{
    easing::EasingFunction,
    region::{AnimateOptions, LiveRegion, RegionAnimator},
    value::{AnimatedValue, TweenState},
};

pub use spatial::clustering::RadiusClusterEngine;

pub use traits::ClusterEngine;

pub use data::geojson::{frame_to_geojson, markers_from_geojson};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Unknown cluster: {0}")]
    UnknownCluster(ClusterId),

    #[error("Invalid cluster options: {0}")]
    InvalidOptions(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Error = ClusterError;
