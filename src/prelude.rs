//! Prelude module for common animated-clusters types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use animated_clusters::prelude::*;`

pub use crate::core::{
    config::{
        AnimatedClustersConfig, ClusterOptions, ClusterProfile, ReconcilerConfig,
        RegionAnimationConfig,
    },
    geo::{LatLng, LatLngBounds, PartialRegion, Point, Region, ViewportSize},
};

pub use crate::clusters::{
    feature::{
        AnimationDescriptor, ClusterFeature, ClusterId, Feature, Frame, PointFeature, RawMarker,
    },
    reconciler::{ClusterReconciler, TransitionKind, TransitionPlan},
};

pub use crate::animation::{
    easing::{EasingFunction, Interpolatable},
    region::{AnimateOptions, LiveRegion, RegionAnimator},
    value::{AnimatedValue, TweenState},
};

pub use crate::spatial::{clustering::RadiusClusterEngine, index::SpatialIndex};

pub use crate::traits::ClusterEngine;

pub use crate::data::geojson::{frame_to_geojson, markers_from_geojson};

pub use crate::{ClusterError, Result};

pub use std::time::Duration;

pub use instant::Instant;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
