//! Roads API client
//!
//! Served from a different host than the rest of the Maps platform and
//! without the usual `status` envelope.

use super::{GoogleTransport, Host};
use crate::models::Coordinates;
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Roads API client
pub struct RoadsClient {
    transport: Arc<GoogleTransport>,
}

/// Snap-to-roads response
#[derive(Debug, Deserialize)]
pub struct SnapToRoadsResponse {
    #[serde(rename = "snappedPoints", default)]
    pub snapped_points: Vec<WireSnappedPoint>,
}

#[derive(Debug, Deserialize)]
pub struct WireSnappedPoint {
    pub location: WireLatLng,
    #[serde(rename = "originalIndex")]
    pub original_index: Option<usize>,
    #[serde(rename = "placeId")]
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WireLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// A GPS point snapped onto the road network
#[derive(Debug, Clone)]
pub struct SnappedPoint {
    pub coordinates: Coordinates,
    /// Index of the input point this snap corresponds to; interpolated
    /// points carry no index
    pub original_index: Option<usize>,
    pub place_id: String,
}

impl From<WireSnappedPoint> for SnappedPoint {
    fn from(point: WireSnappedPoint) -> Self {
        SnappedPoint {
            coordinates: Coordinates {
                latitude: point.location.latitude,
                longitude: point.location.longitude,
            },
            original_index: point.original_index,
            place_id: point.place_id,
        }
    }
}

/// Serialize a path for the Roads API (`lat,lng|lat,lng`)
fn format_path(path: &[Coordinates]) -> String {
    path.iter()
        .map(Coordinates::to_query_param)
        .collect::<Vec<_>>()
        .join("|")
}

impl RoadsClient {
    #[must_use]
    pub fn new(transport: Arc<GoogleTransport>) -> Self {
        Self { transport }
    }

    /// Snap GPS coordinates to the road network
    pub async fn snap_to_roads(
        &self,
        path: &[Coordinates],
        interpolate: bool,
    ) -> Result<Vec<SnappedPoint>> {
        debug!("Snapping {} points to roads", path.len());

        let response: SnapToRoadsResponse = self
            .transport
            .get_json(
                Host::Roads,
                "snapToRoads",
                &[
                    ("path", format_path(path)),
                    ("interpolate", interpolate.to_string()),
                ],
            )
            .await?;

        Ok(response
            .snapped_points
            .into_iter()
            .map(SnappedPoint::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path() {
        let path = vec![
            Coordinates {
                latitude: -35.27801,
                longitude: 149.12958,
            },
            Coordinates {
                latitude: -35.28032,
                longitude: 149.12907,
            },
        ];
        assert_eq!(
            format_path(&path),
            "-35.27801,149.12958|-35.28032,149.12907"
        );
    }

    #[test]
    fn test_parse_snap_response() {
        let raw = r#"{
            "snappedPoints": [
                {
                    "location": { "latitude": -35.278, "longitude": 149.1295 },
                    "originalIndex": 0,
                    "placeId": "ChIJr_xl0GdNFmsRsUtUbW7qABM"
                },
                {
                    "location": { "latitude": -35.2791, "longitude": 149.1293 },
                    "placeId": "ChIJOyypT2dNFmsRMBqPXgkZhhM"
                }
            ]
        }"#;
        let response: SnapToRoadsResponse = serde_json::from_str(raw).unwrap();
        let points: Vec<SnappedPoint> = response
            .snapped_points
            .into_iter()
            .map(SnappedPoint::from)
            .collect();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].original_index, Some(0));
        // Interpolated points have no original index
        assert_eq!(points[1].original_index, None);
    }

    #[test]
    fn test_parse_empty_response() {
        let response: SnapToRoadsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.snapped_points.is_empty());
    }
}
