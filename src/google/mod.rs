//! Google Maps platform clients
//!
//! One thin client per API (geocoding, places, directions, timezone, roads),
//! all sharing a transport that owns the HTTP client, the API key and a
//! client-side rate limiter.

use crate::config::GoogleConfig;
use crate::{ErrorCode, GoTravelError};
use anyhow::{Context, Result};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub mod directions;
pub mod geocoding;
pub mod places;
pub mod roads;
pub mod timezone;

pub use directions::{DirectionsClient, RouteSummary, TravelMode};
pub use geocoding::GeocodingClient;
pub use places::PlacesClient;
pub use roads::{RoadsClient, SnappedPoint};
pub use timezone::TimeZoneClient;

/// Rate limiter for API requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per minute
    max_requests_per_minute: u32,
    /// Request timestamps within the current minute
    request_times: Vec<Instant>,
    /// Last cleanup time
    last_cleanup: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute,
            request_times: Vec::new(),
            last_cleanup: Instant::now(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.cleanup_old_requests();

        if self.request_times.len() >= self.max_requests_per_minute as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self) -> Duration {
        self.cleanup_old_requests();

        if self.request_times.len() < self.max_requests_per_minute as usize {
            Duration::from_secs(0)
        } else if let Some(oldest) = self.request_times.first() {
            let elapsed = oldest.elapsed();
            if elapsed >= Duration::from_secs(60) {
                Duration::from_secs(0)
            } else {
                Duration::from_secs(60) - elapsed
            }
        } else {
            Duration::from_secs(0)
        }
    }

    /// Remove requests older than 1 minute
    fn cleanup_old_requests(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_cleanup) >= Duration::from_secs(10) {
            let cutoff = now - Duration::from_secs(60);
            self.request_times.retain(|&time| time > cutoff);
            self.last_cleanup = now;
        }
    }
}

/// Shared transport for all Maps platform clients
pub struct GoogleTransport {
    http: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    roads_base_url: String,
    rate_limiter: Mutex<RateLimiter>,
}

/// Which host a request goes to
#[derive(Debug, Clone, Copy)]
pub(crate) enum Host {
    /// maps.googleapis.com/maps/api
    Maps,
    /// roads.googleapis.com/v1
    Roads,
}

impl GoogleTransport {
    /// Build the transport from configuration; fails without an API key
    pub fn new(config: &GoogleConfig) -> Result<Arc<Self>> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GoTravelError::config("Google API key is not configured"))?;

        let http = crate::http::build_client(config.timeout_seconds, config.max_retries)?;

        Ok(Arc::new(Self {
            http,
            api_key,
            base_url: config.base_url.clone(),
            roads_base_url: config.roads_base_url.clone(),
            // Maps platform standard quota: 60 requests per minute
            rate_limiter: Mutex::new(RateLimiter::new(60)),
        }))
    }

    /// GET a JSON endpoint, injecting the API key query parameter
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        host: Host,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        {
            let mut limiter = self
                .rate_limiter
                .lock()
                .map_err(|_| GoTravelError::general("Rate limiter lock poisoned"))?;
            if !limiter.allow_request() {
                let wait_time = limiter.time_until_next_request();
                warn!(
                    "Rate limit exceeded, next request allowed in {:.1}s",
                    wait_time.as_secs_f64()
                );
                return Err(GoTravelError::api_with_context(
                    format!(
                        "Rate limit exceeded. Please wait {} seconds.",
                        wait_time.as_secs()
                    ),
                    ErrorCode::ApiRateLimit,
                    HashMap::from([("wait_time".to_string(), wait_time.as_secs().to_string())]),
                )
                .into());
            }
        }

        let base = match host {
            Host::Maps => &self.base_url,
            Host::Roads => &self.roads_base_url,
        };

        let mut url = format!("{base}/{endpoint}?key={}", self.api_key);
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        debug!("Maps platform request: {}", endpoint);
        let start_time = Instant::now();

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {endpoint} failed"))?;

        let status = response.status();
        let total_duration = start_time.elapsed();

        if total_duration.as_secs() > 5 {
            warn!(
                "Slow API response from {}: {:.3}s",
                endpoint,
                total_duration.as_secs_f64()
            );
        }

        if !status.is_success() {
            error!("Maps platform error {} from {}", status, endpoint);
            return match status.as_u16() {
                401 | 403 => Err(GoTravelError::api_with_context(
                    "Google API key was rejected. Please check your credentials.",
                    ErrorCode::ApiUnauthorized,
                    HashMap::new(),
                )
                .into()),
                404 => Err(GoTravelError::api_with_context(
                    "Requested resource not found.",
                    ErrorCode::ApiLocationNotFound,
                    HashMap::from([("endpoint".to_string(), endpoint.to_string())]),
                )
                .into()),
                429 => Err(GoTravelError::api_with_context(
                    "Google API rate limit exceeded.",
                    ErrorCode::ApiRateLimit,
                    HashMap::new(),
                )
                .into()),
                _ => Err(GoTravelError::api_with_context(
                    format!(
                        "API request failed with status: {} - {}",
                        status,
                        status.canonical_reason().unwrap_or("Unknown error")
                    ),
                    ErrorCode::ApiNetworkError,
                    HashMap::from([("status_code".to_string(), status.as_u16().to_string())]),
                )
                .into()),
            };
        }

        let parsed: T = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {endpoint} response"))
            .map_err(|e| {
                error!("Failed to parse {} response: {}", endpoint, e);
                GoTravelError::api_with_context(
                    format!("Invalid data received from {endpoint}"),
                    ErrorCode::ApiInvalidResponse,
                    HashMap::from([("endpoint".to_string(), endpoint.to_string())]),
                )
            })?;

        info!(
            "Maps platform request to {} completed in {:.3}s",
            endpoint,
            total_duration.as_secs_f64()
        );

        Ok(parsed)
    }
}

/// Check a Maps platform envelope status field.
///
/// `OK` and `ZERO_RESULTS` are both successful outcomes; anything else is an
/// upstream rejection worth surfacing.
pub(crate) fn check_envelope_status(status: &str, endpoint: &str) -> Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(GoTravelError::api_with_context(
            format!("{endpoint} quota exhausted"),
            ErrorCode::ApiRateLimit,
            HashMap::from([("status".to_string(), status.to_string())]),
        )
        .into()),
        "REQUEST_DENIED" => Err(GoTravelError::api_with_context(
            format!("{endpoint} request denied, check the API key and enabled services"),
            ErrorCode::ApiUnauthorized,
            HashMap::from([("status".to_string(), status.to_string())]),
        )
        .into()),
        other => Err(GoTravelError::api_with_context(
            format!("{endpoint} returned status {other}"),
            ErrorCode::ApiInvalidResponse,
            HashMap::from([("status".to_string(), other.to_string())]),
        )
        .into()),
    }
}
