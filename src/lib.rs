//! `GoTravel` - AI travel itinerary generation
//!
//! This library wraps the geolocation, places, directions, timezone, weather
//! and flight APIs behind typed clients, aggregates them into destination
//! context, and drives a generative text model to produce day-by-day travel
//! itineraries.

pub mod cache;
pub mod config;
pub mod error;
pub mod flights;
pub mod format;
pub mod gemini;
pub mod google;
pub mod http;
pub mod itinerary;
pub mod models;
pub mod prompt;
pub mod services;
pub mod weather;

// Re-export core types for public API
pub use cache::ResponseCache;
pub use config::{ApiStatus, GoTravelConfig};
pub use error::{ErrorCode, GoTravelError};
pub use flights::{AmadeusClient, FlightQuery, FlightSearch};
pub use gemini::{GeminiClient, TextModel};
pub use itinerary::ItineraryPlanner;
pub use models::{
    BudgetTier, Coordinates, CurrentWeather, GeneratedItinerary, Location, LocationInfo,
    PlaceSummary, TravelPlanRequest,
};
pub use services::ServicesManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GoTravelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
