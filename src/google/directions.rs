//! Directions API client

use super::{GoogleTransport, Host, check_envelope_status};
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Supported travel modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Walking,
    Transit,
    Bicycling,
}

impl TravelMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

impl Default for TravelMode {
    fn default() -> Self {
        TravelMode::Driving
    }
}

/// Directions API client
pub struct DirectionsClient {
    transport: Arc<GoogleTransport>,
}

/// Directions API response envelope
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
pub struct Leg {
    pub distance: TextValue,
    pub duration: TextValue,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u32,
}

/// Condensed route information for prompt enrichment and display
#[derive(Debug, Clone)]
pub struct RouteSummary {
    /// Route name, usually the dominant road
    pub summary: String,
    pub distance_meters: u32,
    pub duration_seconds: u32,
    /// Human-readable totals as reported per leg, joined for multi-leg routes
    pub distance_text: String,
    pub duration_text: String,
}

impl RouteSummary {
    fn from_route(route: Route) -> Self {
        let distance_meters = route.legs.iter().map(|l| l.distance.value).sum();
        let duration_seconds = route.legs.iter().map(|l| l.duration.value).sum();
        let distance_text = route
            .legs
            .iter()
            .map(|l| l.distance.text.clone())
            .collect::<Vec<_>>()
            .join(" + ");
        let duration_text = route
            .legs
            .iter()
            .map(|l| l.duration.text.clone())
            .collect::<Vec<_>>()
            .join(" + ");

        Self {
            summary: route.summary,
            distance_meters,
            duration_seconds,
            distance_text,
            duration_text,
        }
    }
}

impl DirectionsClient {
    #[must_use]
    pub fn new(transport: Arc<GoogleTransport>) -> Self {
        Self { transport }
    }

    /// Get the best route between two locations
    ///
    /// Returns `None` when no route exists between the endpoints.
    pub async fn route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        waypoints: &[String],
    ) -> Result<Option<RouteSummary>> {
        info!(
            "Routing from '{}' to '{}' ({})",
            origin,
            destination,
            mode.as_str()
        );

        let mut params = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", mode.as_str().to_string()),
        ];
        if !waypoints.is_empty() {
            params.push(("waypoints", waypoints.join("|")));
        }

        let response: DirectionsResponse = self
            .transport
            .get_json(Host::Maps, "directions/json", &params)
            .await?;

        // NOT_FOUND from directions means an endpoint failed to geocode,
        // which callers treat like "no route", not an error
        if response.status == "NOT_FOUND" {
            debug!("Directions could not resolve one of the endpoints");
            return Ok(None);
        }
        check_envelope_status(&response.status, "directions")?;

        Ok(response.routes.into_iter().next().map(RouteSummary::from_route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TravelMode::Driving, "driving")]
    #[case(TravelMode::Walking, "walking")]
    #[case(TravelMode::Transit, "transit")]
    #[case(TravelMode::Bicycling, "bicycling")]
    fn test_travel_mode_strings(#[case] mode: TravelMode, #[case] expected: &str) {
        assert_eq!(mode.as_str(), expected);
    }

    const SAMPLE_ROUTE: &str = r#"{
        "status": "OK",
        "routes": [
            {
                "summary": "A6",
                "legs": [
                    {
                        "distance": { "text": "465 km", "value": 465000 },
                        "duration": { "text": "4 hours 20 mins", "value": 15600 }
                    },
                    {
                        "distance": { "text": "12 km", "value": 12000 },
                        "duration": { "text": "18 mins", "value": 1080 }
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_route_summary_sums_legs() {
        let response: DirectionsResponse = serde_json::from_str(SAMPLE_ROUTE).unwrap();
        let summary = RouteSummary::from_route(response.routes.into_iter().next().unwrap());

        assert_eq!(summary.summary, "A6");
        assert_eq!(summary.distance_meters, 477_000);
        assert_eq!(summary.duration_seconds, 16_680);
        assert_eq!(summary.distance_text, "465 km + 12 km");
    }

    #[test]
    fn test_parse_empty_routes() {
        let response: DirectionsResponse =
            serde_json::from_str(r#"{ "status": "ZERO_RESULTS" }"#).unwrap();
        assert!(response.routes.is_empty());
    }
}
