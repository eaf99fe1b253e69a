//! Crate-wide defaults for clustering and marker animation.

/// Square tile size in pixels used to derive a zoom level from a region span.
pub const TILE_SIZE: f64 = 256.0;

/// Cluster radius in pixels, measured in tile-extent units.
pub const DEFAULT_CLUSTER_RADIUS: f64 = 40.0;

/// Tile extent the cluster radius is expressed in.
pub const DEFAULT_EXTENT: f64 = 512.0;

/// Lowest zoom level at which clusters are generated.
pub const DEFAULT_MIN_ZOOM: u8 = 0;

/// Highest zoom level at which clusters are generated. Above it every
/// marker is rendered standalone.
pub const DEFAULT_MAX_ZOOM: u8 = 16;

/// Minimum number of markers needed to form a cluster.
pub const DEFAULT_MIN_POINTS: usize = 2;

/// Duration of a region animation when the caller does not pass one.
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 500;

/// Number of engine passes whose cluster membership stays queryable.
/// Two covers the frame being built and the one it is compared against.
pub const RETAINED_GENERATIONS: usize = 2;

/// Web Mercator latitude limit.
pub const MAX_LATITUDE: f64 = 85.0511287798;
