use crate::{
    clusters::feature::{ClusterId, Feature, RawMarker},
    core::{
        config::ClusterOptions,
        constants::RETAINED_GENERATIONS,
        geo::{LatLng, Point, Region, ViewportSize},
    },
    spatial::index::{IndexedPoint, SpatialIndex},
    traits::ClusterEngine,
    ClusterError, Result,
};
use std::collections::VecDeque;

/// Integer zoom a pass clusters at, in `[min_zoom, max_zoom + 1]`.
///
/// A view whose zoom cannot be derived (zero width, zero span, NaN) falls
/// back to `min_zoom`.
pub fn cluster_zoom(viewport: ViewportSize, region: &Region, options: &ClusterOptions) -> u8 {
    let upper = options.max_zoom.saturating_add(1);
    match region.zoom_level(viewport.width) {
        Some(zoom) => zoom.floor().clamp(options.min_zoom as f64, upper as f64) as u8,
        None => options.min_zoom,
    }
}

/// Cluster membership of one engine pass
#[derive(Debug)]
struct Generation {
    id: u64,
    members: Vec<Vec<String>>,
}

/// Greedy radius clustering over an R-tree.
///
/// Markers are visited in input order. Each unvisited marker gathers every
/// unvisited neighbour within the cluster radius; if the group reaches
/// `min_points` it becomes a cluster at the group's centroid, otherwise the
/// marker is emitted as a point and its neighbours stay available. Above
/// `max_zoom` every marker is a point.
#[derive(Debug)]
pub struct RadiusClusterEngine {
    generation: u64,
    retained: VecDeque<Generation>,
    retain: usize,
}

impl RadiusClusterEngine {
    pub fn new() -> Self {
        Self::with_retention(RETAINED_GENERATIONS)
    }

    /// Keeps membership for the last `retain` passes (at least two)
    pub fn with_retention(retain: usize) -> Self {
        let retain = retain.max(RETAINED_GENERATIONS);
        Self {
            generation: 0,
            retained: VecDeque::with_capacity(retain),
            retain,
        }
    }

    /// Number of passes run so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn retain_generation(&mut self, generation: Generation) {
        self.retained.push_back(generation);
        while self.retained.len() > self.retain {
            self.retained.pop_front();
        }
    }

    fn group<P: Clone>(
        &self,
        markers: &[RawMarker<P>],
        zoom: u8,
        options: &ClusterOptions,
    ) -> (Vec<Feature<P>>, Vec<Vec<String>>) {
        let positions: Vec<Point> = markers
            .iter()
            .map(|marker| marker.coordinate.sanitized().to_world())
            .collect();
        let index = SpatialIndex::bulk_load(
            positions
                .iter()
                .enumerate()
                .map(|(slot, position)| IndexedPoint::new(slot, *position))
                .collect(),
        );
        let radius = options.world_radius(zoom);

        let mut features = Vec::with_capacity(markers.len());
        let mut members = Vec::new();
        let mut visited = vec![false; markers.len()];

        for slot in 0..markers.len() {
            if visited[slot] {
                continue;
            }
            visited[slot] = true;

            let mut neighbours: Vec<usize> = index
                .query_radius(&positions[slot], radius)
                .into_iter()
                .map(|point| point.slot)
                .filter(|neighbour| !visited[*neighbour])
                .collect();

            if neighbours.len() + 1 < options.min_points {
                features.push(Feature::point(markers[slot].clone()));
                continue;
            }

            // R-tree iteration order is unspecified
            neighbours.sort_unstable();
            let mut group = Vec::with_capacity(neighbours.len() + 1);
            group.push(slot);
            for neighbour in neighbours {
                visited[neighbour] = true;
                group.push(neighbour);
            }

            let count = group.len() as f64;
            let (sum_x, sum_y) = group.iter().fold((0.0, 0.0), |(x, y), member| {
                (x + positions[*member].x, y + positions[*member].y)
            });
            let centroid = LatLng::from_world(Point::new(sum_x / count, sum_y / count));

            let id = ClusterId::new(self.generation, members.len() as u32);
            features.push(Feature::cluster(id, centroid, group.len()));
            members.push(
                group
                    .into_iter()
                    .map(|member| markers[member].id.clone())
                    .collect(),
            );
        }

        (features, members)
    }
}

impl Default for RadiusClusterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> ClusterEngine<P> for RadiusClusterEngine {
    fn cluster(
        &mut self,
        markers: &[RawMarker<P>],
        viewport: ViewportSize,
        region: &Region,
        options: &ClusterOptions,
    ) -> Result<Vec<Feature<P>>> {
        options.validate()?;
        self.generation += 1;

        let zoom = cluster_zoom(viewport, region, options);
        let (features, members) = if zoom > options.max_zoom {
            let points = markers
                .iter()
                .cloned()
                .map(Feature::point)
                .collect();
            (points, Vec::new())
        } else {
            self.group(markers, zoom, options)
        };

        log::debug!(
            "clustering pass {} at zoom {}: {} markers -> {} features ({} clusters)",
            self.generation,
            zoom,
            markers.len(),
            features.len(),
            members.len()
        );

        self.retain_generation(Generation {
            id: self.generation,
            members,
        });
        Ok(features)
    }

    fn children(&self, cluster: ClusterId) -> Result<Vec<String>> {
        self.retained
            .iter()
            .find(|generation| generation.id == cluster.generation)
            .and_then(|generation| generation.members.get(cluster.index as usize))
            .cloned()
            .ok_or_else(|| ClusterError::UnknownCluster(cluster).into())
    }
}
