pub mod geojson;

pub use geojson::{abbreviate_count, frame_to_geojson, markers_from_geojson};
