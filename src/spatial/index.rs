use crate::core::geo::Point;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A marker position in normalized world space, indexed by its slot in the
/// input marker slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    pub slot: usize,
    pub position: Point,
}

impl IndexedPoint {
    pub fn new(slot: usize, position: Point) -> Self {
        Self { slot, position }
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }
}

/// R-tree over marker positions for radius queries
pub struct SpatialIndex {
    rtree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    /// Builds the tree in one pass, faster than repeated inserts
    pub fn bulk_load(points: Vec<IndexedPoint>) -> Self {
        Self {
            rtree: RTree::bulk_load(points),
        }
    }

    /// All points within `radius` of `center`, boundary included
    pub fn query_radius(&self, center: &Point, radius: f64) -> Vec<&IndexedPoint> {
        self.rtree
            .locate_within_distance([center.x, center.y], radius * radius)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_radius() {
        let index = SpatialIndex::bulk_load(vec![
            IndexedPoint::new(0, Point::new(0.0, 0.0)),
            IndexedPoint::new(1, Point::new(0.1, 0.0)),
            IndexedPoint::new(2, Point::new(0.5, 0.5)),
        ]);
        assert_eq!(index.len(), 3);

        let mut near: Vec<usize> = index
            .query_radius(&Point::new(0.0, 0.0), 0.2)
            .into_iter()
            .map(|p| p.slot)
            .collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 1]);

        assert_eq!(index.query_radius(&Point::new(0.9, 0.9), 0.1).len(), 0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        assert!(SpatialIndex::bulk_load(Vec::new()).is_empty());

        let index = SpatialIndex::bulk_load(vec![IndexedPoint::new(7, Point::new(0.3, 0.3))]);
        assert_eq!(index.query_radius(&Point::new(0.3, 0.3), 0.0)[0].slot, 7);
        assert_eq!(index.query_radius(&Point::new(0.3, 0.5), 0.2).len(), 1);
    }
}
