//! Flight search client for the Amadeus Travel API
//!
//! Authenticates with an OAuth2 client-credentials token that is cached and
//! refreshed shortly before it expires.

use crate::config::FlightsConfig;
use crate::{ErrorCode, GoTravelError};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl};
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tokens are refreshed this long before their reported expiry
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(300);
/// Assumed token lifetime when the server does not report one
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(1800);
/// Offers returned per search
const MAX_OFFERS: usize = 5;

/// An airport matched by keyword search
#[derive(Debug, Clone, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A parsed flight offer (outbound journey, first segment)
#[derive(Debug, Clone, Serialize)]
pub struct FlightOffer {
    pub airline: String,
    pub flight_number: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: String,
    pub departure_airport: String,
    pub arrival_airport: String,
}

/// Flight search results
#[derive(Debug, Clone, Serialize)]
pub struct FlightSearch {
    pub offers: Vec<FlightOffer>,
    /// Total matching offers upstream, before truncation
    pub total_results: usize,
}

/// A fare suggestion from the inspiration endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DestinationFare {
    pub destination: String,
    pub price: String,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
}

/// Airline names for a carrier code
#[derive(Debug, Clone, Serialize)]
pub struct AirlineInfo {
    pub code: String,
    pub name: Option<String>,
    pub business_name: Option<String>,
}

/// Parameters for a flight offers search
#[derive(Debug, Clone)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
}

#[derive(Debug, Clone)]
struct CachedToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

/// Amadeus API client
pub struct AmadeusClient {
    http: ClientWithMiddleware,
    oauth: BasicClient,
    base_url: String,
    token: Option<CachedToken>,
}

/// Amadeus API response structures
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Envelope<T> {
        #[serde(default = "Vec::new")]
        pub data: Vec<T>,
    }

    #[derive(Debug, Deserialize)]
    pub struct LocationEntry {
        #[serde(rename = "subType")]
        pub sub_type: Option<String>,
        #[serde(rename = "iataCode")]
        pub iata_code: Option<String>,
        pub name: Option<String>,
        pub address: Option<LocationAddress>,
    }

    #[derive(Debug, Deserialize)]
    pub struct LocationAddress {
        #[serde(rename = "cityName")]
        pub city_name: Option<String>,
        #[serde(rename = "countryName")]
        pub country_name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Offer {
        #[serde(default)]
        pub itineraries: Vec<Itinerary>,
        pub price: Option<Price>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Itinerary {
        pub duration: Option<String>,
        #[serde(default)]
        pub segments: Vec<Segment>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Segment {
        #[serde(rename = "carrierCode")]
        pub carrier_code: Option<String>,
        pub number: Option<String>,
        pub departure: Option<Endpoint>,
        pub arrival: Option<Endpoint>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Endpoint {
        #[serde(rename = "iataCode")]
        pub iata_code: Option<String>,
        pub at: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Price {
        pub total: Option<String>,
        pub currency: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct FareEntry {
        pub destination: Option<String>,
        pub price: Option<Price>,
        #[serde(rename = "departureDate")]
        pub departure_date: Option<String>,
        #[serde(rename = "returnDate")]
        pub return_date: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirlineEntry {
        #[serde(rename = "iataCode")]
        pub iata_code: Option<String>,
        #[serde(rename = "commonName")]
        pub common_name: Option<String>,
        #[serde(rename = "businessName")]
        pub business_name: Option<String>,
    }
}

impl AmadeusClient {
    /// Create a new client; fails without both credentials
    pub fn new(config: &FlightsConfig, timeout_seconds: u32, max_retries: u32) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GoTravelError::config("Amadeus API key is not configured"))?;
        let api_secret = config
            .api_secret
            .clone()
            .ok_or_else(|| GoTravelError::config("Amadeus API secret is not configured"))?;

        let oauth = BasicClient::new(
            ClientId::new(api_key),
            Some(ClientSecret::new(api_secret)),
            AuthUrl::new(config.token_url.clone())
                .with_context(|| "Invalid Amadeus token URL")?,
            Some(
                TokenUrl::new(config.token_url.clone())
                    .with_context(|| "Invalid Amadeus token URL")?,
            ),
        );

        let http = crate::http::build_client(timeout_seconds, max_retries)?;

        Ok(Self {
            http,
            oauth,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    /// Get or refresh the access token
    async fn ensure_token(&mut self) -> Result<String> {
        if let Some(token) = &self.token {
            if Utc::now() < token.expires_at {
                return Ok(token.secret.clone());
            }
        }

        debug!("Requesting new Amadeus access token");
        let response = self
            .oauth
            .exchange_client_credentials()
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                GoTravelError::api_with_context(
                    format!("Failed to obtain Amadeus access token: {e}"),
                    ErrorCode::ApiUnauthorized,
                    HashMap::new(),
                )
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let expires_at = Utc::now()
            + chrono::Duration::from_std(lifetime.saturating_sub(TOKEN_EXPIRY_BUFFER))
                .unwrap_or_else(|_| chrono::Duration::seconds(0));

        let secret = response.access_token().secret().clone();
        self.token = Some(CachedToken {
            secret: secret.clone(),
            expires_at,
        });

        info!("Amadeus token refreshed, valid until {}", expires_at);
        Ok(secret)
    }

    /// Make an authenticated GET request
    async fn get_authed<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let token = self.ensure_token().await?;

        let mut url = format!("{}/{}", self.base_url, endpoint);
        for (i, (name, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .with_context(|| format!("Amadeus request to {endpoint} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GoTravelError::api_with_context(
                format!("Amadeus API error for {endpoint}: {status}"),
                match status.as_u16() {
                    401 | 403 => ErrorCode::ApiUnauthorized,
                    429 => ErrorCode::ApiRateLimit,
                    _ => ErrorCode::ApiNetworkError,
                },
                HashMap::from([("endpoint".to_string(), endpoint.to_string())]),
            )
            .into());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Amadeus {endpoint} response"))
            .map_err(|e| {
                GoTravelError::api_with_context(
                    e.to_string(),
                    ErrorCode::ApiInvalidResponse,
                    HashMap::from([("endpoint".to_string(), endpoint.to_string())]),
                )
                .into()
            })
    }

    /// Search for airports by city or airport name
    pub async fn search_airports(&mut self, query: &str) -> Result<Vec<Airport>> {
        info!("Searching airports for '{}'", query);

        let envelope: wire::Envelope<wire::LocationEntry> = self
            .get_authed(
                "reference-data/locations",
                &[("keyword", query.to_string()), ("max", "5".to_string())],
            )
            .await?;

        let airports = envelope
            .data
            .into_iter()
            .filter(|entry| entry.sub_type.as_deref() == Some("AIRPORT"))
            .filter_map(|entry| {
                Some(Airport {
                    code: entry.iata_code?,
                    name: entry.name?,
                    city: entry.address.as_ref().and_then(|a| a.city_name.clone()),
                    country: entry.address.as_ref().and_then(|a| a.country_name.clone()),
                })
            })
            .collect();

        Ok(airports)
    }

    /// Search for flights between origin and destination
    pub async fn search_flights(&mut self, query: &FlightQuery) -> Result<FlightSearch> {
        info!(
            "Searching flights {} -> {} on {}",
            query.origin, query.destination, query.departure_date
        );

        let mut params = vec![
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            (
                "departureDate",
                query.departure_date.format("%Y-%m-%d").to_string(),
            ),
            ("adults", query.adults.max(1).to_string()),
            ("max", "10".to_string()),
        ];
        if let Some(return_date) = query.return_date {
            params.push(("returnDate", return_date.format("%Y-%m-%d").to_string()));
        }
        if query.children > 0 {
            params.push(("children", query.children.to_string()));
        }

        let envelope: wire::Envelope<wire::Offer> =
            self.get_authed("shopping/flight-offers", &params).await?;

        let total_results = envelope.data.len();
        let offers = envelope
            .data
            .into_iter()
            .take(MAX_OFFERS)
            .filter_map(|offer| match parse_offer(offer) {
                Some(parsed) => Some(parsed),
                None => {
                    warn!("Skipping flight offer with missing fields");
                    None
                }
            })
            .collect();

        Ok(FlightSearch {
            offers,
            total_results,
        })
    }

    /// Get popular destination fares from an origin
    pub async fn flight_inspiration(
        &mut self,
        origin: &str,
        max_price: Option<u32>,
    ) -> Result<Vec<DestinationFare>> {
        let mut params = vec![("origin", origin.to_string()), ("max", "10".to_string())];
        if let Some(price) = max_price {
            params.push(("maxPrice", price.to_string()));
        }

        let envelope: wire::Envelope<wire::FareEntry> = self
            .get_authed("shopping/flight-destinations", &params)
            .await?;

        Ok(envelope
            .data
            .into_iter()
            .filter_map(|entry| {
                Some(DestinationFare {
                    destination: entry.destination?,
                    price: format_price(entry.price.as_ref())?,
                    departure_date: entry.departure_date,
                    return_date: entry.return_date,
                })
            })
            .collect())
    }

    /// Get airline information by IATA code
    pub async fn airline_info(&mut self, airline_code: &str) -> Result<Option<AirlineInfo>> {
        let envelope: wire::Envelope<wire::AirlineEntry> = self
            .get_authed(
                "reference-data/airlines",
                &[("airlineCodes", airline_code.to_string())],
            )
            .await?;

        Ok(envelope.data.into_iter().next().map(|entry| AirlineInfo {
            code: entry.iata_code.unwrap_or_else(|| airline_code.to_string()),
            name: entry.common_name,
            business_name: entry.business_name,
        }))
    }
}

/// Condense an offer to its outbound journey's first segment.
///
/// Offers missing any of the required fields yield `None` and are skipped.
fn parse_offer(offer: wire::Offer) -> Option<FlightOffer> {
    let price = format_price(offer.price.as_ref())?;
    let itinerary = offer.itineraries.into_iter().next()?;
    let duration = itinerary.duration.clone()?;
    let segment = itinerary.segments.into_iter().next()?;

    let carrier = segment.carrier_code?;
    let number = segment.number?;
    let departure = segment.departure?;
    let arrival = segment.arrival?;

    Some(FlightOffer {
        flight_number: format!("{carrier}{number}"),
        airline: carrier,
        departure_time: departure.at?,
        arrival_time: arrival.at?,
        duration,
        price,
        departure_airport: departure.iata_code?,
        arrival_airport: arrival.iata_code?,
    })
}

fn format_price(price: Option<&wire::Price>) -> Option<String> {
    let price = price?;
    Some(format!(
        "{} {}",
        price.total.as_deref()?,
        price.currency.as_deref()?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OFFER: &str = r#"{
        "itineraries": [
            {
                "duration": "PT2H15M",
                "segments": [
                    {
                        "carrierCode": "AF",
                        "number": "1234",
                        "departure": { "iataCode": "CDG", "at": "2025-06-01T08:30:00" },
                        "arrival": { "iataCode": "FCO", "at": "2025-06-01T10:45:00" }
                    }
                ]
            }
        ],
        "price": { "total": "142.50", "currency": "EUR" }
    }"#;

    #[test]
    fn test_parse_offer() {
        let offer: wire::Offer = serde_json::from_str(SAMPLE_OFFER).unwrap();
        let parsed = parse_offer(offer).unwrap();

        assert_eq!(parsed.airline, "AF");
        assert_eq!(parsed.flight_number, "AF1234");
        assert_eq!(parsed.price, "142.50 EUR");
        assert_eq!(parsed.departure_airport, "CDG");
        assert_eq!(parsed.arrival_airport, "FCO");
        assert_eq!(parsed.duration, "PT2H15M");
    }

    #[test]
    fn test_parse_offer_missing_fields_is_skipped() {
        let raw = r#"{ "itineraries": [], "price": { "total": "99.00", "currency": "USD" } }"#;
        let offer: wire::Offer = serde_json::from_str(raw).unwrap();
        assert!(parse_offer(offer).is_none());

        let raw = r#"{
            "itineraries": [{ "duration": "PT1H", "segments": [{ "carrierCode": "LH" }] }],
            "price": { "total": "99.00", "currency": "USD" }
        }"#;
        let offer: wire::Offer = serde_json::from_str(raw).unwrap();
        assert!(parse_offer(offer).is_none());
    }

    #[test]
    fn test_airport_filtering() {
        let raw = r#"{
            "data": [
                {
                    "subType": "AIRPORT",
                    "iataCode": "NRT",
                    "name": "NARITA INTL",
                    "address": { "cityName": "TOKYO", "countryName": "JAPAN" }
                },
                { "subType": "CITY", "iataCode": "TYO", "name": "TOKYO" }
            ]
        }"#;
        let envelope: wire::Envelope<wire::LocationEntry> = serde_json::from_str(raw).unwrap();
        let airports: Vec<Airport> = envelope
            .data
            .into_iter()
            .filter(|e| e.sub_type.as_deref() == Some("AIRPORT"))
            .filter_map(|e| {
                Some(Airport {
                    code: e.iata_code?,
                    name: e.name?,
                    city: e.address.as_ref().and_then(|a| a.city_name.clone()),
                    country: e.address.as_ref().and_then(|a| a.country_name.clone()),
                })
            })
            .collect();

        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].code, "NRT");
        assert_eq!(airports[0].city.as_deref(), Some("TOKYO"));
    }

    #[test]
    fn test_parse_empty_envelope() {
        let envelope: wire::Envelope<wire::Offer> = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn test_format_price_requires_both_parts() {
        let price = wire::Price {
            total: Some("10.00".to_string()),
            currency: None,
        };
        assert!(format_price(Some(&price)).is_none());
        assert!(format_price(None).is_none());
    }
}
