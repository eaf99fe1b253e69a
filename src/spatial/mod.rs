pub mod clustering;
pub mod index;

pub use clustering::{cluster_zoom, RadiusClusterEngine};
pub use index::{IndexedPoint, SpatialIndex};
