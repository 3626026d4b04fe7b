//! Weather client for the OpenWeatherMap API
//!
//! Current conditions degrade to a canned sample when the API is missing or
//! unreachable, so destination enrichment never fails on weather alone.

use crate::config::WeatherConfig;
use crate::models::{Coordinates, CurrentWeather, WeatherSource};
use crate::{ErrorCode, GoTravelError};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// OpenWeatherMap serves 3-hour forecast slots, 8 per day
const FORECAST_SLOTS_PER_DAY: u32 = 8;
/// Free tier caps the forecast at 40 slots (5 days)
const MAX_FORECAST_SLOTS: u32 = 40;

/// Weather API client for OpenWeatherMap
pub struct WeatherClient {
    http: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
    units: String,
}

/// A single forecast slot
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f32,
    pub description: String,
    pub precipitation_probability: f32,
}

/// Multi-day forecast in 3-hour slots
#[derive(Debug, Clone)]
pub struct Forecast {
    pub city: String,
    pub entries: Vec<ForecastEntry>,
}

/// OpenWeatherMap API response structures
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub main: MainData,
        pub wind: Option<WindData>,
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub main: String,
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f32,
        pub feels_like: Option<f32>,
        pub humidity: Option<u8>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindData {
        pub speed: f32,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastSlot>,
        pub city: Option<City>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastSlot {
        /// Unix timestamp of the slot
        pub dt: i64,
        pub main: MainData,
        #[serde(default)]
        pub weather: Vec<Condition>,
        /// Probability of precipitation, 0.0 to 1.0
        pub pop: Option<f32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct City {
        pub name: String,
    }
}

impl WeatherClient {
    /// Create a new weather client
    pub fn new(config: &WeatherConfig, timeout_seconds: u32, max_retries: u32) -> Result<Self> {
        let http = crate::http::build_client(timeout_seconds, max_retries)?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            units: config.units.clone(),
        })
    }

    /// Get current weather for coordinates
    ///
    /// Never fails: when the API key is missing or the request errors, the
    /// canned sample is returned and marked `WeatherSource::Fallback`.
    pub async fn current_weather(&self, coordinates: Coordinates) -> CurrentWeather {
        match self.fetch_current(coordinates).await {
            Ok(weather) => weather,
            Err(e) => {
                warn!("Weather API error, using fallback sample: {}", e);
                fallback_weather()
            }
        }
    }

    async fn fetch_current(&self, coordinates: Coordinates) -> Result<CurrentWeather> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GoTravelError::config("OpenWeatherMap API key is not configured"))?;

        info!(
            "Getting current weather for ({:.4}, {:.4})",
            coordinates.latitude, coordinates.longitude
        );

        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units={}",
            self.base_url, coordinates.latitude, coordinates.longitude, api_key, self.units
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| "Weather request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(GoTravelError::api_with_context(
                format!("OpenWeatherMap returned status {status}"),
                match status.as_u16() {
                    401 => ErrorCode::ApiUnauthorized,
                    404 => ErrorCode::ApiLocationNotFound,
                    429 => ErrorCode::ApiRateLimit,
                    _ => ErrorCode::ApiNetworkError,
                },
                HashMap::from([(
                    "coordinates".to_string(),
                    coordinates.to_query_param(),
                )]),
            )
            .into());
        }

        let parsed: wire::CurrentResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse OpenWeatherMap weather response")?;

        Ok(current_from_wire(parsed))
    }

    /// Get a multi-day forecast in 3-hour slots
    pub async fn forecast(&self, coordinates: Coordinates, days: u32) -> Result<Forecast> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GoTravelError::config("OpenWeatherMap API key is not configured"))?;

        let slots = forecast_slot_count(days);
        info!(
            "Getting {}-day forecast ({} slots) for ({:.4}, {:.4})",
            days, slots, coordinates.latitude, coordinates.longitude
        );

        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units={}&cnt={}",
            self.base_url, coordinates.latitude, coordinates.longitude, api_key, self.units, slots
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| "Forecast request failed")?;

        if !response.status().is_success() {
            return Err(GoTravelError::api_with_context(
                "Forecast data unavailable",
                ErrorCode::ApiNetworkError,
                HashMap::from([(
                    "status_code".to_string(),
                    response.status().as_u16().to_string(),
                )]),
            )
            .into());
        }

        let parsed: wire::ForecastResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse OpenWeatherMap forecast response")?;

        let entries = parsed
            .list
            .into_iter()
            .map(|slot| ForecastEntry {
                timestamp: DateTime::from_timestamp(slot.dt, 0).unwrap_or_else(Utc::now),
                temperature_c: slot.main.temp,
                description: slot
                    .weather
                    .first()
                    .map(|c| c.description.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                precipitation_probability: slot.pop.unwrap_or(0.0),
            })
            .collect::<Vec<_>>();

        debug!("Forecast contains {} slots", entries.len());

        Ok(Forecast {
            city: parsed.city.map(|c| c.name).unwrap_or_default(),
            entries,
        })
    }
}

fn current_from_wire(response: wire::CurrentResponse) -> CurrentWeather {
    let condition = response.weather.first();
    CurrentWeather {
        temperature_c: response.main.temp,
        feels_like_c: response.main.feels_like.unwrap_or(response.main.temp),
        humidity: response.main.humidity.unwrap_or(0),
        wind_speed_ms: response.wind.map_or(0.0, |w| w.speed),
        description: condition
            .map(|c| c.description.clone())
            .unwrap_or_else(|| "Clear".to_string()),
        station: response.name,
        source: WeatherSource::Live,
    }
}

/// Sample conditions served when OpenWeatherMap is unavailable
fn fallback_weather() -> CurrentWeather {
    CurrentWeather {
        temperature_c: 22.0,
        feels_like_c: 25.0,
        humidity: 60,
        wind_speed_ms: 3.5,
        description: "clear sky".to_string(),
        station: "Location".to_string(),
        source: WeatherSource::Fallback,
    }
}

fn forecast_slot_count(days: u32) -> u32 {
    (days * FORECAST_SLOTS_PER_DAY).min(MAX_FORECAST_SLOTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE_CURRENT: &str = r#"{
        "weather": [{ "main": "Clouds", "description": "scattered clouds" }],
        "main": { "temp": 18.3, "feels_like": 17.9, "humidity": 72 },
        "wind": { "speed": 4.1 },
        "name": "Kyoto"
    }"#;

    #[test]
    fn test_parse_current_weather() {
        let parsed: wire::CurrentResponse = serde_json::from_str(SAMPLE_CURRENT).unwrap();
        let weather = current_from_wire(parsed);

        assert_eq!(weather.temperature_c, 18.3);
        assert_eq!(weather.humidity, 72);
        assert_eq!(weather.description, "scattered clouds");
        assert_eq!(weather.station, "Kyoto");
        assert_eq!(weather.source, WeatherSource::Live);
    }

    #[test]
    fn test_current_weather_missing_optionals() {
        let raw = r#"{ "main": { "temp": 10.0 } }"#;
        let parsed: wire::CurrentResponse = serde_json::from_str(raw).unwrap();
        let weather = current_from_wire(parsed);

        assert_eq!(weather.temperature_c, 10.0);
        assert_eq!(weather.feels_like_c, 10.0);
        assert_eq!(weather.wind_speed_ms, 0.0);
        assert_eq!(weather.description, "Clear");
    }

    #[test]
    fn test_fallback_sample() {
        let weather = fallback_weather();
        assert_eq!(weather.source, WeatherSource::Fallback);
        assert_eq!(weather.temperature_c, 22.0);
        assert_eq!(weather.humidity, 60);
        assert_eq!(weather.summary(), "22°C, Clear Sky");
    }

    #[rstest]
    #[case(1, 8)]
    #[case(5, 40)]
    #[case(7, 40)]
    fn test_forecast_slot_count(#[case] days: u32, #[case] expected: u32) {
        assert_eq!(forecast_slot_count(days), expected);
    }

    #[test]
    fn test_parse_forecast() {
        let raw = r#"{
            "list": [
                {
                    "dt": 1735732800,
                    "main": { "temp": 5.2, "humidity": 81 },
                    "weather": [{ "main": "Rain", "description": "light rain" }],
                    "pop": 0.4
                }
            ],
            "city": { "name": "Reykjavik" }
        }"#;
        let parsed: wire::ForecastResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.list.len(), 1);
        assert_eq!(parsed.city.unwrap().name, "Reykjavik");
        assert_eq!(parsed.list[0].pop, Some(0.4));
    }
}
