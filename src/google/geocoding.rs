//! Geocoding API client
//!
//! Forward geocoding (address to coordinates) and reverse geocoding
//! (coordinates to address).

use super::{GoogleTransport, Host, check_envelope_status};
use crate::models::{Coordinates, Location};
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Geocoding API client
pub struct GeocodingClient {
    transport: Arc<GoogleTransport>,
}

/// Geocoding API response envelope
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// A single geocoder match
#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub place_id: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeocodeResult> for Location {
    fn from(result: GeocodeResult) -> Self {
        Location {
            coordinates: Coordinates {
                latitude: result.geometry.location.lat,
                longitude: result.geometry.location.lng,
            },
            formatted_address: result.formatted_address,
            place_id: result.place_id,
        }
    }
}

impl GeocodingClient {
    #[must_use]
    pub fn new(transport: Arc<GoogleTransport>) -> Self {
        Self { transport }
    }

    /// Get latitude and longitude for an address
    pub async fn geocode(&self, address: &str) -> Result<Vec<Location>> {
        info!("Geocoding address: '{}'", address);

        let response: GeocodeResponse = self
            .transport
            .get_json(
                Host::Maps,
                "geocode/json",
                &[("address", address.to_string())],
            )
            .await?;

        check_envelope_status(&response.status, "geocode")?;

        if response.results.is_empty() {
            warn!("No geocoding results for '{}'", address);
        } else {
            debug!(
                "Found {} geocoding results for '{}'",
                response.results.len(),
                address
            );
        }

        Ok(response.results.into_iter().map(Location::from).collect())
    }

    /// Get address from coordinates
    pub async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<Location>> {
        debug!(
            "Reverse geocoding ({:.4}, {:.4})",
            coordinates.latitude, coordinates.longitude
        );

        let response: GeocodeResponse = self
            .transport
            .get_json(
                Host::Maps,
                "geocode/json",
                &[("latlng", coordinates.to_query_param())],
            )
            .await?;

        check_envelope_status(&response.status, "reverse geocode")?;

        Ok(response.results.into_iter().map(Location::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "status": "OK",
        "results": [
            {
                "formatted_address": "Paris, France",
                "place_id": "ChIJD7fiBh9u5kcRYJSMaMOCCwQ",
                "geometry": {
                    "location": { "lat": 48.856614, "lng": 2.3522219 }
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_geocode_response() {
        let response: GeocodeResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].formatted_address, "Paris, France");
    }

    #[test]
    fn test_geocode_result_to_location() {
        let response: GeocodeResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let location: Location = response.results.into_iter().next().unwrap().into();

        assert_eq!(location.formatted_address, "Paris, France");
        assert!((location.coordinates.latitude - 48.856614).abs() < 1e-9);
        assert!((location.coordinates.longitude - 2.3522219).abs() < 1e-9);
        assert!(location.place_id.is_some());
    }

    #[test]
    fn test_parse_zero_results() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{ "status": "ZERO_RESULTS" }"#).unwrap();
        assert_eq!(response.status, "ZERO_RESULTS");
        assert!(response.results.is_empty());
    }
}
