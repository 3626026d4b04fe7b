//! Service manager composing the API clients
//!
//! `ServicesManager` owns one client per upstream API and provides the
//! aggregate lookups the planner and CLI consume. Aggregation is strictly
//! best-effort: only a failed geocode fails a lookup, every other slot is
//! logged and skipped.

use crate::cache::ResponseCache;
use crate::config::GoTravelConfig;
use crate::flights::AmadeusClient;
use crate::google::{
    DirectionsClient, GeocodingClient, GoogleTransport, PlacesClient, RoadsClient, TimeZoneClient,
};
use crate::models::{Coordinates, LocationInfo, PlaceSummary};
use crate::weather::{Forecast, WeatherClient};
use crate::{ErrorCode, GoTravelError};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A curated popular destination
#[derive(Debug, Clone, Serialize)]
pub struct Destination {
    pub name: &'static str,
    pub country: &'static str,
    pub emoji: &'static str,
    pub coordinates: Coordinates,
    pub categories: &'static [&'static str],
    pub area: &'static str,
    pub attractions: &'static str,
    pub safety_rating: &'static str,
}

/// A catalog destination enriched with live data
#[derive(Debug, Clone, Serialize)]
pub struct DestinationSummary {
    #[serde(flatten)]
    pub destination: Destination,
    /// Display line like "21°C, Clear Sky", or a placeholder on failure
    pub weather: String,
    /// Timezone name, or "UTC" when the lookup fails
    pub timezone: String,
    pub description: String,
}

/// Manager for all upstream API clients
pub struct ServicesManager {
    pub geocoding: GeocodingClient,
    pub places: PlacesClient,
    pub directions: DirectionsClient,
    pub timezone: TimeZoneClient,
    pub roads: RoadsClient,
    pub weather: WeatherClient,
    flights: Option<AmadeusClient>,
    cache: Option<ResponseCache>,
    cache_ttl: Duration,
    nearby_radius_m: u32,
    forecast_days: u32,
    max_places: usize,
}

impl ServicesManager {
    /// Build all clients from configuration
    pub fn from_config(config: &GoTravelConfig) -> Result<Self> {
        let transport = GoogleTransport::new(&config.google)?;

        let weather = WeatherClient::new(
            &config.weather,
            config.google.timeout_seconds,
            config.google.max_retries,
        )?;

        let flights = if config.flights.api_key.is_some() && config.flights.api_secret.is_some() {
            Some(AmadeusClient::new(
                &config.flights,
                config.google.timeout_seconds,
                config.google.max_retries,
            )?)
        } else {
            info!("Amadeus credentials not configured, flight search disabled");
            None
        };

        let cache = match ResponseCache::open(expand_home(&config.cache.location)) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Failed to open response cache, continuing without: {}", e);
                None
            }
        };

        Ok(Self {
            geocoding: GeocodingClient::new(transport.clone()),
            places: PlacesClient::new(transport.clone()),
            directions: DirectionsClient::new(transport.clone()),
            timezone: TimeZoneClient::new(transport.clone()),
            roads: RoadsClient::new(transport),
            weather,
            flights,
            cache,
            cache_ttl: Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600),
            nearby_radius_m: config.defaults.nearby_radius_m,
            forecast_days: config.defaults.forecast_days,
            max_places: config.defaults.max_places as usize,
        })
    }

    /// The flights client, when credentials were configured
    pub fn flights(&mut self) -> Option<&mut AmadeusClient> {
        self.flights.as_mut()
    }

    /// Get comprehensive information about a location
    ///
    /// Geocoding failures are fatal; timezone, weather and nearby places are
    /// each best-effort.
    pub async fn location_info(&self, query: &str) -> Result<LocationInfo> {
        let key = location_cache_key(query);

        if let Some(cache) = &self.cache {
            match cache.get::<LocationInfo>(&key).await {
                Ok(Some(cached)) => {
                    debug!("Location info for '{}' served from cache", query);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed for '{}': {}", query, e),
            }
        }

        let locations = self.geocoding.geocode(query).await?;
        let location = locations.into_iter().next().ok_or_else(|| {
            GoTravelError::api_with_context(
                "Location not found",
                ErrorCode::ApiLocationNotFound,
                HashMap::from([("query".to_string(), query.to_string())]),
            )
        })?;
        let center = location.coordinates;

        let timezone = match self.timezone.timezone(center, None).await {
            Ok(timezone) => timezone,
            Err(e) => {
                warn!("Timezone lookup failed for '{}': {}", query, e);
                None
            }
        };

        let weather = Some(self.weather.current_weather(center).await);

        let attractions = self
            .nearby_best_effort(center, "tourist_attraction", query)
            .await;
        let restaurants = self.nearby_best_effort(center, "restaurant", query).await;

        let info = LocationInfo {
            location,
            timezone,
            weather,
            attractions,
            restaurants,
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, info.clone(), self.cache_ttl).await {
                warn!("Failed to cache location info for '{}': {}", query, e);
            }
        }

        Ok(info)
    }

    /// Nearby search that degrades to an empty list on failure
    async fn nearby_best_effort(
        &self,
        center: Coordinates,
        place_type: &str,
        query: &str,
    ) -> Vec<PlaceSummary> {
        match self
            .places
            .search_nearby(center, place_type, self.nearby_radius_m)
            .await
        {
            Ok(mut places) => {
                places.truncate(self.max_places);
                annotate_distances(&mut places, center);
                places
            }
            Err(e) => {
                warn!("Nearby {} search failed for '{}': {}", place_type, query, e);
                Vec::new()
            }
        }
    }

    /// Multi-day weather forecast for a destination
    ///
    /// Geocodes the query first; the day count defaults to the configured
    /// forecast length.
    pub async fn weather_forecast(&self, query: &str, days: Option<u32>) -> Result<Forecast> {
        let locations = self.geocoding.geocode(query).await?;
        let location = locations.into_iter().next().ok_or_else(|| {
            GoTravelError::api_with_context(
                "Location not found",
                ErrorCode::ApiLocationNotFound,
                HashMap::from([("query".to_string(), query.to_string())]),
            )
        })?;

        self.weather
            .forecast(location.coordinates, days.unwrap_or(self.forecast_days))
            .await
    }

    /// Popular destinations enriched with live weather and timezone
    ///
    /// Every enrichment is best-effort; a destination is always returned,
    /// worst case with placeholder values.
    pub async fn destinations(&self) -> Vec<DestinationSummary> {
        let mut summaries = Vec::with_capacity(CATALOG.len());

        for destination in CATALOG {
            let weather = self.weather.current_weather(destination.coordinates).await;

            let timezone = match self.timezone.timezone(destination.coordinates, None).await {
                Ok(Some(info)) => info.time_zone_name,
                Ok(None) => "UTC".to_string(),
                Err(e) => {
                    warn!("Timezone lookup failed for {}: {}", destination.name, e);
                    "UTC".to_string()
                }
            };

            summaries.push(DestinationSummary {
                destination: destination.clone(),
                weather: weather.summary(),
                timezone,
                description: format!(
                    "Explore the amazing {} with its unique culture, attractions, and experiences.",
                    destination.name
                ),
            });
        }

        summaries
    }
}

/// Fill in the distance from the search center for each place
fn annotate_distances(places: &mut [PlaceSummary], center: Coordinates) {
    for place in places {
        place.distance_km = place
            .coordinates
            .map(|coordinates| center.distance_km(&coordinates));
    }
}

fn location_cache_key(query: &str) -> String {
    format!("location_info:{}", query.trim().to_lowercase())
}

fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    std::path::PathBuf::from(path)
}

/// Curated popular destinations with static stats
pub const CATALOG: &[Destination] = &[
    Destination {
        name: "Paris",
        country: "France",
        emoji: "🗼",
        coordinates: Coordinates { latitude: 48.8566, longitude: 2.3522 },
        categories: &["city", "popular", "cultural"],
        area: "105 km²",
        attractions: "130+ museums",
        safety_rating: "4.1/5",
    },
    Destination {
        name: "Tokyo",
        country: "Japan",
        emoji: "🏯",
        coordinates: Coordinates { latitude: 35.6762, longitude: 139.6503 },
        categories: &["city", "popular", "cultural"],
        area: "2,194 km²",
        attractions: "100+ temples",
        safety_rating: "4.8/5",
    },
    Destination {
        name: "New York",
        country: "USA",
        emoji: "🗽",
        coordinates: Coordinates { latitude: 40.7128, longitude: -74.0060 },
        categories: &["city", "popular"],
        area: "1,214 km²",
        attractions: "50+ neighborhoods",
        safety_rating: "3.8/5",
    },
    Destination {
        name: "London",
        country: "UK",
        emoji: "🇬🇧",
        coordinates: Coordinates { latitude: 51.5074, longitude: -0.1278 },
        categories: &["city", "popular", "cultural"],
        area: "1,572 km²",
        attractions: "240+ museums",
        safety_rating: "4.2/5",
    },
    Destination {
        name: "Dubai",
        country: "UAE",
        emoji: "🏙️",
        coordinates: Coordinates { latitude: 25.2048, longitude: 55.2708 },
        categories: &["city", "popular"],
        area: "4,114 km²",
        attractions: "200+ malls",
        safety_rating: "4.6/5",
    },
    Destination {
        name: "Reykjavik",
        country: "Iceland",
        emoji: "🌋",
        coordinates: Coordinates { latitude: 64.1466, longitude: -21.9426 },
        categories: &["nature", "adventure"],
        area: "274 km²",
        attractions: "50+ hot springs",
        safety_rating: "4.9/5",
    },
    Destination {
        name: "Cape Town",
        country: "South Africa",
        emoji: "🦁",
        coordinates: Coordinates { latitude: -33.9249, longitude: 18.4241 },
        categories: &["nature", "adventure", "cultural"],
        area: "2,461 km²",
        attractions: "300+ wine estates",
        safety_rating: "3.5/5",
    },
    Destination {
        name: "Maldives",
        country: "Maldives",
        emoji: "🏖️",
        coordinates: Coordinates { latitude: 3.2028, longitude: 73.2207 },
        categories: &["beach", "popular"],
        area: "298 km²",
        attractions: "1,200+ islands",
        safety_rating: "4.7/5",
    },
    Destination {
        name: "Bali",
        country: "Indonesia",
        emoji: "🌺",
        coordinates: Coordinates { latitude: -8.3405, longitude: 115.0920 },
        categories: &["beach", "cultural", "nature"],
        area: "5,780 km²",
        attractions: "2,000+ temples",
        safety_rating: "4.3/5",
    },
    Destination {
        name: "Kyoto",
        country: "Japan",
        emoji: "🎌",
        coordinates: Coordinates { latitude: 35.0116, longitude: 135.7681 },
        categories: &["cultural", "nature"],
        area: "827 km²",
        attractions: "1,600+ temples",
        safety_rating: "4.8/5",
    },
    Destination {
        name: "Petra",
        country: "Jordan",
        emoji: "🏜️",
        coordinates: Coordinates { latitude: 30.3285, longitude: 35.4444 },
        categories: &["cultural", "adventure"],
        area: "264 km²",
        attractions: "800+ monuments",
        safety_rating: "4.1/5",
    },
    Destination {
        name: "Barcelona",
        country: "Spain",
        emoji: "🏖️",
        coordinates: Coordinates { latitude: 41.3851, longitude: 2.1734 },
        categories: &["city", "beach", "cultural"],
        area: "101 km²",
        attractions: "60+ beaches",
        safety_rating: "4.0/5",
    },
];
