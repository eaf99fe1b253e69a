//! GeoJSON input and output
//!
//! Markers are read from `Point` features of a `Feature` or
//! `FeatureCollection`. Delivered frames are written back as a
//! `FeatureCollection` in the shape map renderers expect from a
//! supercluster-style index: clusters carry `cluster`, `cluster_id` and
//! `point_count`, animated points carry an `animate` property.

use crate::clusters::feature::{AnimationDescriptor, Feature, Frame, RawMarker};
use crate::core::geo::LatLng;
use crate::{ClusterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonGeometry {
    Point {
        #[serde(default)]
        coordinates: Vec<Option<f64>>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct GeoJsonFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

impl GeoJsonFeature {
    /// `properties.id` first, then the feature's own `id`
    fn marker_id(&self) -> Option<String> {
        self.properties
            .as_ref()
            .and_then(|properties| properties.get("id"))
            .and_then(id_to_string)
            .or_else(|| self.id.as_ref().and_then(id_to_string))
    }

    fn into_marker(self, position: usize) -> Result<Option<RawMarker>> {
        let coordinates = match &self.geometry {
            Some(GeoJsonGeometry::Point { coordinates }) => coordinates,
            _ => {
                log::debug!("skipping non-point GeoJSON feature #{}", position);
                return Ok(None);
            }
        };
        let coordinate = LatLng::from_parts(
            coordinates.get(1).copied().flatten(),
            coordinates.first().copied().flatten(),
        );
        let id = self.marker_id().ok_or_else(|| {
            ClusterError::Parse(format!("GeoJSON feature #{} has no id", position))
        })?;
        if !coordinate.is_valid() {
            log::warn!("marker {} is out of range: {:?}", id, coordinate);
        }
        let payload = self.properties.map(Value::Object).unwrap_or(Value::Null);
        Ok(Some(RawMarker::new(id, coordinate, payload)))
    }
}

/// Parses the `Point` features of a GeoJSON document into markers.
///
/// Missing coordinate components read as 0. Features without a string or
/// numeric id are rejected.
pub fn markers_from_geojson(geojson: &str) -> Result<Vec<RawMarker>> {
    let data: GeoJson = serde_json::from_str(geojson)
        .map_err(|e| ClusterError::Parse(format!("Invalid GeoJSON: {}", e)))?;

    let features = match data {
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::FeatureCollection { features } => features,
    };

    let mut markers = Vec::with_capacity(features.len());
    for (position, feature) in features.into_iter().enumerate() {
        if let Some(marker) = feature.into_marker(position)? {
            markers.push(marker);
        }
    }
    Ok(markers)
}

fn lat_lng_json(coordinate: &LatLng) -> Value {
    json!({ "latitude": coordinate.lat, "longitude": coordinate.lng })
}

fn animate_json(descriptor: &AnimationDescriptor) -> Value {
    json!({ "from": lat_lng_json(&descriptor.from), "to": lat_lng_json(&descriptor.to) })
}

/// Short label for a cluster count: `999`, `1.2k`, `15k`
pub fn abbreviate_count(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", (count as f64 / 1000.0).round())
    } else if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

/// Writes a frame as a GeoJSON `FeatureCollection`
pub fn frame_to_geojson<P: Serialize>(frame: &Frame<P>) -> Result<Value> {
    let mut features = Vec::with_capacity(frame.len());
    for feature in frame {
        let value = match feature {
            Feature::Point(point) => {
                let mut properties = match serde_json::to_value(&point.marker.payload)
                    .map_err(ClusterError::Serialization)?
                {
                    Value::Object(properties) => properties,
                    Value::Null => Map::new(),
                    other => {
                        let mut properties = Map::new();
                        properties.insert("payload".to_string(), other);
                        properties
                    }
                };
                properties.insert("id".to_string(), Value::String(point.id().to_string()));
                if let Some(descriptor) = &point.animation {
                    properties.insert("animate".to_string(), animate_json(descriptor));
                }
                json!({
                    "type": "Feature",
                    "id": point.id(),
                    "geometry": { "type": "Point", "coordinates": point.coordinate().to_lng_lat() },
                    "properties": properties,
                })
            }
            Feature::Cluster(cluster) => json!({
                "type": "Feature",
                "id": cluster.id.to_string(),
                "geometry": { "type": "Point", "coordinates": cluster.coordinate.to_lng_lat() },
                "properties": {
                    "cluster": true,
                    "cluster_id": cluster.id.to_string(),
                    "point_count": cluster.count,
                    "point_count_abbreviated": abbreviate_count(cluster.count),
                },
            }),
        };
        features.push(value);
    }
    Ok(json!({ "type": "FeatureCollection", "features": features }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::feature::ClusterId;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [2.35, 48.85] },
              "properties": { "id": "paris", "name": "Paris" } },
            { "type": "Feature", "id": 7, "geometry": { "type": "Point", "coordinates": [13.4] },
              "properties": { "name": "Berlin-ish" } },
            { "type": "Feature", "id": "line",
              "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] } }
        ]
    }"#;

    #[test]
    fn test_parse_markers() {
        let markers = markers_from_geojson(SAMPLE).unwrap();
        assert_eq!(markers.len(), 2);

        assert_eq!(markers[0].id, "paris");
        assert_eq!(markers[0].coordinate, LatLng::new(48.85, 2.35));
        assert_eq!(markers[0].payload["name"], "Paris");

        assert_eq!(markers[1].id, "7");
        assert_eq!(markers[1].coordinate, LatLng::new(0.0, 13.4));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let doc = r#"{ "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 2] } }"#;
        let err = markers_from_geojson(doc).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClusterError>(),
            Some(ClusterError::Parse(_))
        ));
        assert!(markers_from_geojson("{}").is_err());
    }

    #[test]
    fn test_abbreviate_count() {
        assert_eq!(abbreviate_count(12), "12");
        assert_eq!(abbreviate_count(1234), "1.2k");
        assert_eq!(abbreviate_count(15_600), "16k");
    }

    #[test]
    fn test_frame_to_geojson() {
        let marker = RawMarker::new("a", LatLng::new(1.0, 2.0), json!({ "name": "A" }));
        let frame = Frame::new(vec![
            Feature::Point(crate::clusters::feature::PointFeature::new(marker).with_animation(
                AnimationDescriptor::new(LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)),
            )),
            Feature::cluster(ClusterId::new(1, 0), LatLng::new(5.0, 6.0), 3),
        ]);

        let value = frame_to_geojson(&frame).unwrap();
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let point = &features[0];
        assert_eq!(point["geometry"]["coordinates"], json!([2.0, 1.0]));
        assert_eq!(point["properties"]["name"], "A");
        assert_eq!(point["properties"]["animate"]["to"]["latitude"], 3.0);

        let cluster = &features[1];
        assert_eq!(cluster["properties"]["cluster"], true);
        assert_eq!(cluster["properties"]["point_count"], 3);
        assert_eq!(cluster["properties"]["cluster_id"], "cluster_1_0");
    }
}
