//! Data models shared across the API clients and the itinerary planner
//!
//! Wire-format response types live next to the client that parses them;
//! this module contains the internal representations they convert into.

use crate::GoTravelError;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, validating the ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GoTravelError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            ))
            .into());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GoTravelError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            ))
            .into());
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to another point in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let from = haversine::Location {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = haversine::Location {
            latitude: other.latitude,
            longitude: other.longitude,
        };
        haversine::distance(from, to, haversine::Units::Kilometers)
    }

    /// Wire format used by the Maps platform (`lat,lng`)
    #[must_use]
    pub fn to_query_param(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// A geocoded location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub coordinates: Coordinates,
    /// Full formatted address returned by the geocoder
    pub formatted_address: String,
    /// Place id for follow-up detail lookups
    pub place_id: Option<String>,
}

/// Budget tier selected by the traveler
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Budget,
    MidRange,
    Luxury,
}

impl FromStr for BudgetTier {
    type Err = GoTravelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "budget" => Ok(BudgetTier::Budget),
            "mid-range" | "midrange" => Ok(BudgetTier::MidRange),
            "luxury" => Ok(BudgetTier::Luxury),
            other => Err(GoTravelError::validation(format!(
                "Unknown budget tier: {other}"
            ))),
        }
    }
}

/// Travel preferences submitted for itinerary generation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TravelPlanRequest {
    /// Destination name (city, region, country)
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Trip length in days
    pub duration_days: u32,
    /// Group size
    pub people: u32,
    pub budget: Option<BudgetTier>,
    /// Traveler interests (museums, food, hiking, ...)
    #[serde(default)]
    pub interests: Vec<String>,
    pub special_requests: Option<String>,
}

impl TravelPlanRequest {
    /// Check the required fields before generation
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.destination.trim().is_empty() {
            missing.push("destination");
        }
        if self.duration_days == 0 {
            missing.push("duration");
        }
        if self.people == 0 {
            missing.push("people");
        }
        if !missing.is_empty() {
            return Err(GoTravelError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))
            .into());
        }
        if self.end_date < self.start_date {
            return Err(
                GoTravelError::validation("End date cannot be before start date").into(),
            );
        }
        Ok(())
    }

    /// Group size phrased for humans ("1 person", "4 people")
    #[must_use]
    pub fn people_text(&self) -> String {
        if self.people == 1 {
            "1 person".to_string()
        } else {
            format!("{} people", self.people)
        }
    }
}

/// A place returned by a nearby or text search
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceSummary {
    pub name: String,
    /// Short address or neighbourhood
    pub vicinity: Option<String>,
    pub rating: Option<f32>,
    pub ratings_total: Option<u32>,
    pub place_id: Option<String>,
    pub coordinates: Option<Coordinates>,
    /// Distance from the search center, filled by the aggregator
    pub distance_km: Option<f64>,
}

/// Where a weather reading came from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WeatherSource {
    /// Live OpenWeatherMap observation
    Live,
    /// Canned sample used when the API is unreachable
    Fallback,
}

/// Current weather conditions at a location
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CurrentWeather {
    pub temperature_c: f32,
    pub feels_like_c: f32,
    /// Relative humidity percentage
    pub humidity: u8,
    pub wind_speed_ms: f32,
    /// Human-readable description of conditions
    pub description: String,
    /// Reporting station or city name
    pub station: String,
    pub source: WeatherSource,
}

impl CurrentWeather {
    /// Short display line, e.g. "21°C, Clear Sky"
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}°C, {}",
            self.temperature_c.round() as i32,
            title_case(&self.description)
        )
    }
}

/// Timezone information for a coordinate pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimezoneInfo {
    pub time_zone_id: String,
    pub time_zone_name: String,
    /// Offset from UTC in seconds, excluding DST
    pub raw_offset: i32,
    /// DST offset in seconds
    pub dst_offset: i32,
}

/// Aggregated information about a destination
///
/// Every slot besides `location` is filled best-effort: a failed upstream
/// lookup leaves it empty rather than failing the aggregate.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocationInfo {
    pub location: Location,
    pub timezone: Option<TimezoneInfo>,
    pub weather: Option<CurrentWeather>,
    pub attractions: Vec<PlaceSummary>,
    pub restaurants: Vec<PlaceSummary>,
}

/// A generated, formatted itinerary
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratedItinerary {
    pub destination: String,
    pub duration_days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Formatted HTML body
    pub html: String,
    pub generated_at: DateTime<Utc>,
}

/// Capitalize each word, matching the original presentation of
/// weather descriptions ("clear sky" -> "Clear Sky")
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_request() -> TravelPlanRequest {
        TravelPlanRequest {
            destination: "Kyoto".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            duration_days: 5,
            people: 2,
            budget: Some(BudgetTier::MidRange),
            interests: vec!["temples".to_string(), "food".to_string()],
            special_requests: None,
        }
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(48.8566, 2.3522).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_coordinates_query_param() {
        let coords = Coordinates::new(35.0116, 135.7681).unwrap();
        assert_eq!(coords.to_query_param(), "35.0116,135.7681");
    }

    #[test]
    fn test_distance_paris_london() {
        let paris = Coordinates::new(48.8566, 2.3522).unwrap();
        let london = Coordinates::new(51.5074, -0.1278).unwrap();
        let distance = paris.distance_km(&london);
        // Roughly 344 km apart
        assert!((330.0..360.0).contains(&distance), "got {distance}");
    }

    #[rstest]
    #[case("budget", BudgetTier::Budget)]
    #[case("mid-range", BudgetTier::MidRange)]
    #[case("MidRange", BudgetTier::MidRange)]
    #[case("Luxury", BudgetTier::Luxury)]
    fn test_budget_tier_parsing(#[case] input: &str, #[case] expected: BudgetTier) {
        assert_eq!(input.parse::<BudgetTier>().unwrap(), expected);
    }

    #[test]
    fn test_budget_tier_unknown() {
        assert!("extravagant".parse::<BudgetTier>().is_err());
    }

    #[test]
    fn test_request_validation() {
        assert!(sample_request().validate().is_ok());

        let mut request = sample_request();
        request.destination = "  ".to_string();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("destination"));

        let mut request = sample_request();
        request.people = 0;
        assert!(request.validate().is_err());

        let mut request = sample_request();
        request.end_date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("End date"));
    }

    #[test]
    fn test_people_text() {
        let mut request = sample_request();
        request.people = 1;
        assert_eq!(request.people_text(), "1 person");
        request.people = 4;
        assert_eq!(request.people_text(), "4 people");
    }

    #[test]
    fn test_weather_summary() {
        let weather = CurrentWeather {
            temperature_c: 21.4,
            feels_like_c: 22.0,
            humidity: 55,
            wind_speed_ms: 2.0,
            description: "clear sky".to_string(),
            station: "Kyoto".to_string(),
            source: WeatherSource::Live,
        };
        assert_eq!(weather.summary(), "21°C, Clear Sky");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("scattered clouds"), "Scattered Clouds");
        assert_eq!(title_case(""), "");
    }
}
