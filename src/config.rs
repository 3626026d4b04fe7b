//! Configuration management for the `GoTravel` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::GoTravelError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `GoTravel` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTravelConfig {
    /// Gemini generative model configuration
    pub gemini: GeminiConfig,
    /// Google Maps platform configuration
    pub google: GoogleConfig,
    /// OpenWeatherMap configuration
    pub weather: WeatherConfig,
    /// Amadeus flight API configuration
    pub flights: FlightsConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default application settings
    pub defaults: DefaultsConfig,
}

/// Gemini configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key; itinerary generation is disabled without it
    pub api_key: Option<String>,
    /// Models to try in order of preference
    #[serde(default = "default_gemini_models")]
    pub models: Vec<String>,
    /// Base URL for the generative language API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

/// Google Maps platform configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Google API key shared by geocoding, places, directions and timezone
    pub api_key: Option<String>,
    /// Base URL for Maps platform APIs
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    /// Base URL for the Roads API (served from a different host)
    #[serde(default = "default_roads_base_url")]
    pub roads_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// OpenWeatherMap configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key; current weather degrades to sample data without it
    pub api_key: Option<String>,
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Measurement units requested from the API
    #[serde(default = "default_weather_units")]
    pub units: String,
}

/// Amadeus flight API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightsConfig {
    /// Amadeus API key (client id)
    pub api_key: Option<String>,
    /// Amadeus API secret (client secret)
    pub api_secret: Option<String>,
    /// Base URL for the Amadeus API
    #[serde(default = "default_flights_base_url")]
    pub base_url: String,
    /// OAuth2 token endpoint
    #[serde(default = "default_flights_token_url")]
    pub token_url: String,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Nearby place search radius in meters
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_m: u32,
    /// Forecast length in days
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Maximum places returned per category
    #[serde(default = "default_max_places")]
    pub max_places: u32,
}

// Default value functions
fn default_gemini_models() -> Vec<String> {
    vec![
        "gemini-1.5-pro".to_string(),
        "gemini-1.5-flash".to_string(),
        "gemini-pro".to_string(),
    ]
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_google_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_roads_base_url() -> String {
    "https://roads.googleapis.com/v1".to_string()
}

fn default_http_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_units() -> String {
    "metric".to_string()
}

fn default_flights_base_url() -> String {
    "https://api.amadeus.com/v1".to_string()
}

fn default_flights_token_url() -> String {
    "https://api.amadeus.com/v1/security/oauth2/token".to_string()
}

fn default_cache_ttl() -> u32 {
    6
}

fn default_cache_location() -> String {
    "~/.cache/gotravel".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_nearby_radius() -> u32 {
    5000
}

fn default_forecast_days() -> u32 {
    5
}

fn default_max_places() -> u32 {
    5
}

impl Default for GoTravelConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig {
                api_key: None,
                models: default_gemini_models(),
                base_url: default_gemini_base_url(),
            },
            google: GoogleConfig {
                api_key: None,
                base_url: default_google_base_url(),
                roads_base_url: default_roads_base_url(),
                timeout_seconds: default_http_timeout(),
                max_retries: default_max_retries(),
            },
            weather: WeatherConfig {
                api_key: None,
                base_url: default_weather_base_url(),
                units: default_weather_units(),
            },
            flights: FlightsConfig {
                api_key: None,
                api_secret: None,
                base_url: default_flights_base_url(),
                token_url: default_flights_token_url(),
            },
            cache: CacheConfig {
                ttl_hours: default_cache_ttl(),
                location: default_cache_location(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            defaults: DefaultsConfig {
                nearby_radius_m: default_nearby_radius(),
                forecast_days: default_forecast_days(),
                max_places: default_max_places(),
            },
        }
    }
}

/// Availability summary of the configured backends
#[derive(Debug, Clone, Serialize)]
pub struct ApiStatus {
    pub gemini_available: bool,
    pub google_api_available: bool,
    pub weather_api_available: bool,
    pub flights_available: bool,
    pub supported_apis: Vec<&'static str>,
}

impl GoTravelConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with GOTRAVEL_ prefix,
        // e.g. GOTRAVEL_GEMINI__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("GOTRAVEL")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GoTravelConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gotravel").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.gemini.models.is_empty() {
            self.gemini.models = default_gemini_models();
        }
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = default_gemini_base_url();
        }
        if self.google.base_url.is_empty() {
            self.google.base_url = default_google_base_url();
        }
        if self.google.roads_base_url.is_empty() {
            self.google.roads_base_url = default_roads_base_url();
        }
        if self.google.timeout_seconds == 0 {
            self.google.timeout_seconds = default_http_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.units.is_empty() {
            self.weather.units = default_weather_units();
        }
        if self.flights.base_url.is_empty() {
            self.flights.base_url = default_flights_base_url();
        }
        if self.flights.token_url.is_empty() {
            self.flights.token_url = default_flights_token_url();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.nearby_radius_m == 0 {
            self.defaults.nearby_radius_m = default_nearby_radius();
        }
        if self.defaults.forecast_days == 0 {
            self.defaults.forecast_days = default_forecast_days();
        }
        if self.defaults.max_places == 0 {
            self.defaults.max_places = default_max_places();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Gemini", &self.gemini.api_key),
            ("Google", &self.google.api_key),
            ("Weather", &self.weather.api_key),
            ("Flights", &self.flights.api_key),
        ] {
            if let Some(key) = key {
                if key.is_empty() {
                    return Err(GoTravelError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if key.len() < 8 {
                    return Err(GoTravelError::config(format!(
                        "{name} API key appears to be invalid (too short). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        // Amadeus needs the key and secret together
        if self.flights.api_key.is_some() != self.flights.api_secret.is_some() {
            return Err(GoTravelError::config(
                "Flight search requires both an API key and an API secret.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.google.timeout_seconds > 300 {
            return Err(
                GoTravelError::config("HTTP timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.google.max_retries > 10 {
            return Err(GoTravelError::config("Max retries cannot exceed 10").into());
        }

        if self.cache.ttl_hours > 168 {
            return Err(
                GoTravelError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        if self.defaults.nearby_radius_m > 50_000 {
            return Err(GoTravelError::config(
                "Nearby search radius cannot exceed 50000 meters",
            )
            .into());
        }

        if self.defaults.forecast_days > 5 {
            return Err(GoTravelError::config(
                "Forecast length cannot exceed 5 days (OpenWeatherMap free tier)",
            )
            .into());
        }

        if self.defaults.max_places > 20 {
            return Err(
                GoTravelError::config("Maximum places per category cannot exceed 20").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GoTravelError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GoTravelError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_units = ["metric", "imperial", "standard"];
        if !valid_units.contains(&self.weather.units.as_str()) {
            return Err(GoTravelError::config(format!(
                "Invalid weather units '{}'. Must be one of: {}",
                self.weather.units,
                valid_units.join(", ")
            ))
            .into());
        }

        for url in [
            &self.gemini.base_url,
            &self.google.base_url,
            &self.google.roads_base_url,
            &self.weather.base_url,
            &self.flights.base_url,
            &self.flights.token_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GoTravelError::config(format!(
                    "Base URL '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Create configuration directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let gotravel_config_dir = config_dir.join("gotravel");
            std::fs::create_dir_all(&gotravel_config_dir).with_context(|| {
                format!(
                    "Failed to create config directory: {}",
                    gotravel_config_dir.display()
                )
            })?;
            Ok(gotravel_config_dir)
        } else {
            Err(GoTravelError::config("Unable to determine config directory").into())
        }
    }

    /// Summarize which backends are usable with the current credentials
    #[must_use]
    pub fn api_status(&self) -> ApiStatus {
        ApiStatus {
            gemini_available: self.gemini.api_key.is_some(),
            google_api_available: self.google.api_key.is_some(),
            weather_api_available: self.weather.api_key.is_some(),
            flights_available: self.flights.api_key.is_some() && self.flights.api_secret.is_some(),
            supported_apis: vec![
                "Weather API",
                "Time Zone API",
                "Roads API",
                "Places API",
                "Geocoding API",
                "Directions API",
                "Flight Offers API",
            ],
        }
    }
}
