use crate::core::constants::{MAX_LATITUDE, TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from possibly missing components; a missing
    /// component reads as 0.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Self {
        Self::new(lat.unwrap_or(0.0), lng.unwrap_or(0.0))
    }

    /// Returns the coordinate in GeoJSON `[lng, lat]` order
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Replaces non-finite components with 0
    pub fn sanitized(&self) -> Self {
        let finite_or_zero = |value: f64| if value.is_finite() { value } else { 0.0 };
        Self::new(finite_or_zero(self.lat), finite_or_zero(self.lng))
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Projects to normalized Web Mercator world space, both axes in [0, 1]
    pub fn to_world(&self) -> Point {
        let x = self.lng / 360.0 + 0.5;
        let sin = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().sin();
        let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
        Point::new(x, y.clamp(0.0, 1.0))
    }

    /// Inverse of [`LatLng::to_world`]
    pub fn from_world(point: Point) -> Self {
        let lng = (point.x - 0.5) * 360.0;
        let y2 = (180.0 - point.y * 360.0) * PI / 180.0;
        let lat = 360.0 * y2.exp().atan() / PI - 90.0;
        Self::new(lat, lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in projected or screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

/// The visible part of the map: a center plus latitude/longitude spans
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Geographic bounds covered by the region
    pub fn bounds(&self) -> LatLngBounds {
        let half_lat = self.latitude_delta / 2.0;
        let half_lng = self.longitude_delta / 2.0;
        LatLngBounds::new(
            LatLng::new(self.latitude - half_lat, self.longitude - half_lng),
            LatLng::new(self.latitude + half_lat, self.longitude + half_lng),
        )
    }

    /// Fractional zoom level at which `longitude_delta` fills `width` pixels.
    ///
    /// Returns `None` when the span or the width cannot produce a finite zoom.
    pub fn zoom_level(&self, width: f64) -> Option<f64> {
        if !(width > 0.0) || !(self.longitude_delta > 0.0) {
            return None;
        }
        let zoom = (360.0 * (width / TILE_SIZE) / self.longitude_delta).log2();
        zoom.is_finite().then_some(zoom)
    }
}

/// A region whose scalars may be unset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRegion {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub latitude_delta: Option<f64>,
    pub longitude_delta: Option<f64>,
}

impl PartialRegion {
    /// Fills unset scalars with 0
    pub fn resolve(&self) -> Region {
        Region::new(
            self.latitude.unwrap_or(0.0),
            self.longitude.unwrap_or(0.0),
            self.latitude_delta.unwrap_or(0.0),
            self.longitude_delta.unwrap_or(0.0),
        )
    }
}

impl From<Region> for PartialRegion {
    fn from(region: Region) -> Self {
        Self {
            latitude: Some(region.latitude),
            longitude: Some(region.longitude),
            latitude_delta: Some(region.latitude_delta),
            longitude_delta: Some(region.longitude_delta),
        }
    }
}

/// Pixel size of the map view
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
