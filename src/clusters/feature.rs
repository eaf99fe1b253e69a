use crate::animation::easing::{EasingFunction, Interpolatable};
use crate::core::geo::LatLng;
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An application-supplied marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarker<P = serde_json::Value> {
    /// Stable identifier; the same logical marker keeps its id across frames
    pub id: String,
    pub coordinate: LatLng,
    pub payload: P,
}

impl<P> RawMarker<P> {
    pub fn new(id: impl Into<String>, coordinate: LatLng, payload: P) -> Self {
        Self {
            id: id.into(),
            coordinate,
            payload,
        }
    }
}

impl RawMarker<()> {
    /// Marker without payload
    pub fn bare(id: impl Into<String>, coordinate: LatLng) -> Self {
        Self::new(id, coordinate, ())
    }
}

/// Synthetic identifier of a cluster.
///
/// The generation is the engine pass that produced the cluster, so ids from
/// different passes never compare equal even when they cover the same area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId {
    pub generation: u64,
    pub index: u32,
}

impl ClusterId {
    pub fn new(generation: u64, index: u32) -> Self {
        Self { generation, index }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster_{}_{}", self.generation, self.index)
    }
}

/// Marks a point for interpolation during a single delivered frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub from: LatLng,
    pub to: LatLng,
}

impl AnimationDescriptor {
    pub fn new(from: LatLng, to: LatLng) -> Self {
        Self { from, to }
    }

    /// Linear position at `progress` in [0, 1]
    pub fn position_at(&self, progress: f64) -> LatLng {
        self.from.lerp(&self.to, progress.clamp(0.0, 1.0))
    }

    pub fn eased_position_at(&self, progress: f64, easing: EasingFunction) -> LatLng {
        self.from.lerp(&self.to, easing.apply(progress))
    }
}

/// A single marker in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature<P = serde_json::Value> {
    pub marker: RawMarker<P>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationDescriptor>,
}

impl<P> PointFeature<P> {
    pub fn new(marker: RawMarker<P>) -> Self {
        Self {
            marker,
            animation: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.marker.id
    }

    pub fn coordinate(&self) -> LatLng {
        self.marker.coordinate
    }

    pub fn with_animation(mut self, animation: AnimationDescriptor) -> Self {
        self.animation = Some(animation);
        self
    }
}

/// Two or more markers collapsed into one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterFeature {
    pub id: ClusterId,
    /// Centroid of the members
    pub coordinate: LatLng,
    pub count: usize,
}

/// One renderable unit of a clustering pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Feature<P = serde_json::Value> {
    Point(PointFeature<P>),
    Cluster(ClusterFeature),
}

impl<P> Feature<P> {
    pub fn point(marker: RawMarker<P>) -> Self {
        Feature::Point(PointFeature::new(marker))
    }

    pub fn cluster(id: ClusterId, coordinate: LatLng, count: usize) -> Self {
        Feature::Cluster(ClusterFeature {
            id,
            coordinate,
            count,
        })
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Feature::Cluster(_))
    }

    pub fn as_point(&self) -> Option<&PointFeature<P>> {
        match self {
            Feature::Point(point) => Some(point),
            Feature::Cluster(_) => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterFeature> {
        match self {
            Feature::Cluster(cluster) => Some(cluster),
            Feature::Point(_) => None,
        }
    }

    /// Steady-state position
    pub fn coordinate(&self) -> LatLng {
        match self {
            Feature::Point(point) => point.coordinate(),
            Feature::Cluster(cluster) => cluster.coordinate,
        }
    }

    pub fn animation(&self) -> Option<&AnimationDescriptor> {
        self.as_point().and_then(|point| point.animation.as_ref())
    }

    /// Number of markers the feature stands for
    pub fn marker_count(&self) -> usize {
        match self {
            Feature::Point(_) => 1,
            Feature::Cluster(cluster) => cluster.count,
        }
    }
}

/// Ordered output of one clustering pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame<P = serde_json::Value> {
    pub features: Vec<Feature<P>>,
}

impl<P> Frame<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self { features }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature<P>> {
        self.features.iter()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &ClusterFeature> {
        self.features.iter().filter_map(Feature::as_cluster)
    }

    pub fn points(&self) -> impl Iterator<Item = &PointFeature<P>> {
        self.features.iter().filter_map(Feature::as_point)
    }

    /// Position of the point feature for `marker_id`
    pub fn point_index(&self, marker_id: &str) -> Option<usize> {
        self.features.iter().position(|feature| {
            feature
                .as_point()
                .is_some_and(|point| point.id() == marker_id)
        })
    }

    pub fn find_point(&self, marker_id: &str) -> Option<&PointFeature<P>> {
        self.points().find(|point| point.id() == marker_id)
    }

    /// Map from marker id to feature index for every point feature.
    /// The first occurrence wins if an id is repeated.
    pub fn point_indices(&self) -> HashMap<&str, usize> {
        let mut indices = HashMap::default();
        for (index, feature) in self.features.iter().enumerate() {
            if let Some(point) = feature.as_point() {
                indices.entry(point.id()).or_insert(index);
            }
        }
        indices
    }

    /// Number of point features carrying an animation descriptor
    pub fn animated_count(&self) -> usize {
        self.points()
            .filter(|point| point.animation.is_some())
            .count()
    }

    /// Total markers represented, counting cluster members
    pub fn marker_count(&self) -> usize {
        self.features.iter().map(Feature::marker_count).sum()
    }

    /// True when both frames draw the same thing at rest: same feature kinds
    /// in the same order, same point ids and positions, same cluster
    /// positions and counts. Cluster ids and descriptors are ignored.
    pub fn same_layout(&self, other: &Frame<P>) -> bool {
        self.features.len() == other.features.len()
            && self
                .features
                .iter()
                .zip(&other.features)
                .all(|(a, b)| match (a, b) {
                    (Feature::Point(a), Feature::Point(b)) => {
                        a.id() == b.id() && a.coordinate() == b.coordinate()
                    }
                    (Feature::Cluster(a), Feature::Cluster(b)) => {
                        a.coordinate == b.coordinate && a.count == b.count
                    }
                    _ => false,
                })
    }
}

impl<P: Clone> Frame<P> {
    /// Copy of the frame with every descriptor removed
    pub fn without_animations(&self) -> Self {
        let mut frame = self.clone();
        frame.clear_animations();
        frame
    }
}

impl<P> Frame<P> {
    pub fn clear_animations(&mut self) {
        for feature in &mut self.features {
            if let Feature::Point(point) = feature {
                point.animation = None;
            }
        }
    }
}

impl<P> Default for Frame<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P> From<Vec<Feature<P>>> for Frame<P> {
    fn from(features: Vec<Feature<P>>) -> Self {
        Self::new(features)
    }
}

impl<'a, P> IntoIterator for &'a Frame<P> {
    type Item = &'a Feature<P>;
    type IntoIter = std::slice::Iter<'a, Feature<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame<()> {
        Frame::new(vec![
            Feature::point(RawMarker::bare("a", LatLng::new(1.0, 1.0))),
            Feature::cluster(ClusterId::new(3, 0), LatLng::new(2.0, 2.0), 4),
            Feature::point(RawMarker::bare("b", LatLng::new(5.0, 5.0))),
        ])
    }

    #[test]
    fn test_frame_queries() {
        let frame = sample_frame();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.clusters().count(), 1);
        assert_eq!(frame.points().count(), 2);
        assert_eq!(frame.point_index("b"), Some(2));
        assert_eq!(frame.point_index("missing"), None);
        assert_eq!(frame.find_point("a").map(|p| p.coordinate()), Some(LatLng::new(1.0, 1.0)));
        assert_eq!(frame.marker_count(), 6);
        assert_eq!(frame.point_indices().get("a"), Some(&0));
    }

    #[test]
    fn test_clear_animations() {
        let mut frame = sample_frame();
        if let Feature::Point(point) = &mut frame.features[0] {
            point.animation = Some(AnimationDescriptor::new(
                LatLng::new(1.0, 1.0),
                LatLng::new(2.0, 2.0),
            ));
        }
        assert_eq!(frame.animated_count(), 1);

        let cleaned = frame.without_animations();
        assert_eq!(cleaned.animated_count(), 0);
        assert_eq!(frame.animated_count(), 1);
        assert!(cleaned.same_layout(&frame));
    }

    #[test]
    fn test_same_layout_ignores_cluster_ids() {
        let frame = sample_frame();
        let mut renumbered = frame.clone();
        if let Feature::Cluster(cluster) = &mut renumbered.features[1] {
            cluster.id = ClusterId::new(4, 7);
        }
        assert!(frame.same_layout(&renumbered));

        let mut moved = frame.clone();
        if let Feature::Cluster(cluster) = &mut moved.features[1] {
            cluster.count = 5;
        }
        assert!(!frame.same_layout(&moved));
    }

    #[test]
    fn test_descriptor_positions() {
        let descriptor = AnimationDescriptor::new(LatLng::new(0.0, 0.0), LatLng::new(10.0, 20.0));
        assert_eq!(descriptor.position_at(0.0), descriptor.from);
        assert_eq!(descriptor.position_at(1.0), descriptor.to);
        assert_eq!(descriptor.position_at(0.5), LatLng::new(5.0, 10.0));
        assert_eq!(descriptor.position_at(3.0), descriptor.to);
        assert_eq!(
            descriptor.eased_position_at(0.5, EasingFunction::EaseInOut),
            LatLng::new(5.0, 10.0)
        );
    }

    #[test]
    fn test_cluster_id_display() {
        assert_eq!(ClusterId::new(2, 9).to_string(), "cluster_2_9");
        assert_ne!(ClusterId::new(1, 0), ClusterId::new(2, 0));
    }
}
