//! Places API client
//!
//! Nearby search, text search and place details.

use super::{GoogleTransport, Host, check_envelope_status};
use crate::models::{Coordinates, PlaceSummary};
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Default radius for location-biased text searches in meters
pub const DEFAULT_TEXT_SEARCH_RADIUS_M: u32 = 50_000;

/// Places API client
pub struct PlacesClient {
    transport: Arc<GoogleTransport>,
}

/// Places search response envelope
#[derive(Debug, Deserialize)]
pub struct PlacesResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<Place>,
}

/// A place from a nearby or text search
#[derive(Debug, Deserialize)]
pub struct Place {
    pub name: String,
    /// Neighbourhood line for nearby search, full address for text search
    #[serde(alias = "formatted_address")]
    pub vicinity: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<u32>,
    pub place_id: Option<String>,
    pub geometry: Option<PlaceGeometry>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceGeometry {
    pub location: PlaceLatLng,
}

#[derive(Debug, Deserialize)]
pub struct PlaceLatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Place details response envelope
#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    pub result: Option<PlaceDetails>,
}

/// Detailed information about a single place
#[derive(Debug, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<u32>,
}

impl From<Place> for PlaceSummary {
    fn from(place: Place) -> Self {
        let coordinates = place.geometry.map(|g| Coordinates {
            latitude: g.location.lat,
            longitude: g.location.lng,
        });
        PlaceSummary {
            name: place.name,
            vicinity: place.vicinity,
            rating: place.rating,
            ratings_total: place.user_ratings_total,
            place_id: place.place_id,
            coordinates,
            distance_km: None,
        }
    }
}

impl PlacesClient {
    #[must_use]
    pub fn new(transport: Arc<GoogleTransport>) -> Self {
        Self { transport }
    }

    /// Search for nearby places of a given type
    pub async fn search_nearby(
        &self,
        center: Coordinates,
        place_type: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceSummary>> {
        info!(
            "Nearby search for '{}' within {}m of ({:.4}, {:.4})",
            place_type, radius_m, center.latitude, center.longitude
        );

        let response: PlacesResponse = self
            .transport
            .get_json(
                Host::Maps,
                "place/nearbysearch/json",
                &[
                    ("location", center.to_query_param()),
                    ("radius", radius_m.to_string()),
                    ("type", place_type.to_string()),
                ],
            )
            .await?;

        check_envelope_status(&response.status, "nearby search")?;

        debug!("Nearby search returned {} places", response.results.len());
        Ok(response.results.into_iter().map(PlaceSummary::from).collect())
    }

    /// Search for places by free-text query, optionally biased to a location
    pub async fn text_search(
        &self,
        query: &str,
        location: Option<Coordinates>,
        radius_m: Option<u32>,
    ) -> Result<Vec<PlaceSummary>> {
        info!("Text search for '{}'", query);

        let mut params = vec![("query", query.to_string())];
        if let Some(center) = location {
            params.push(("location", center.to_query_param()));
            params.push((
                "radius",
                radius_m.unwrap_or(DEFAULT_TEXT_SEARCH_RADIUS_M).to_string(),
            ));
        }

        let response: PlacesResponse = self
            .transport
            .get_json(Host::Maps, "place/textsearch/json", &params)
            .await?;

        check_envelope_status(&response.status, "text search")?;

        Ok(response.results.into_iter().map(PlaceSummary::from).collect())
    }

    /// Get detailed information about a place
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        debug!("Fetching details for place {}", place_id);

        let response: PlaceDetailsResponse = self
            .transport
            .get_json(
                Host::Maps,
                "place/details/json",
                &[("place_id", place_id.to_string())],
            )
            .await?;

        check_envelope_status(&response.status, "place details")?;

        Ok(response.result)
    }
}
