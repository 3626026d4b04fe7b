//! Integration tests driving the planner through the public API
//!
//! Network-backed clients are exercised in their own unit tests against
//! captured responses; here a stub text model stands in for Gemini so the
//! whole generate/refine flow runs offline.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use gotravel::gemini::TextModel;
use gotravel::prompt::{build_itinerary_prompt, build_refinement_prompt};
use gotravel::services::CATALOG;
use gotravel::{BudgetTier, GoTravelConfig, ItineraryPlanner, TravelPlanRequest};

/// Canned model that always answers with a fixed three-day itinerary
struct CannedModel;

const CANNED_ITINERARY: &str = "\
Day 1: Arrival and Old Town
Morning: Walking tour of the historic center
- Visit the cathedral
- Coffee at Mercado Central
Afternoon: Museum quarter
Evening: Tapas crawl

Day 2: Coast and Beaches
Morning: Train to the coast
- Beach time at Playa Norte
Restaurant: Casa Montana for lunch

Day 3: Departure
Morning: Last stroll and souvenirs

SAFETY SECTION:
- Emergency number: 112
- Watch for pickpockets near the market";

#[async_trait]
impl TextModel for CannedModel {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(CANNED_ITINERARY.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

fn valencia_request() -> TravelPlanRequest {
    TravelPlanRequest {
        destination: "Valencia".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
        duration_days: 3,
        people: 2,
        budget: Some(BudgetTier::MidRange),
        interests: vec!["food".to_string(), "beaches".to_string()],
        special_requests: None,
    }
}

#[tokio::test]
async fn test_generate_full_pipeline() {
    let planner = ItineraryPlanner::new(Box::new(CannedModel));

    let itinerary = planner.generate(&valencia_request()).await.unwrap();

    assert_eq!(itinerary.destination, "Valencia");
    assert_eq!(itinerary.duration_days, 3);

    // Day headers became h3 headings, one per day
    assert_eq!(itinerary.html.matches("<h3").count(), 3);
    // Time-of-day sections became h4 headings
    assert!(itinerary.html.contains("<h4"));
    // Bullets became em dashes
    assert!(itinerary.html.contains("\u{2014} Visit the cathedral"));
    // Category lines kept their emphasis
    assert!(itinerary.html.contains("Restaurant: Casa Montana for lunch"));
    // Everything is wrapped in the container div
    assert!(itinerary.html.starts_with("<div"));
}

#[tokio::test]
async fn test_generate_validates_before_calling_model() {
    let planner = ItineraryPlanner::new(Box::new(CannedModel));

    let mut request = valencia_request();
    request.destination = String::new();

    let err = planner.generate(&request).await.unwrap_err();
    assert!(err.to_string().contains("destination"));
}

#[tokio::test]
async fn test_refine_round_trip() {
    let planner = ItineraryPlanner::new(Box::new(CannedModel));

    let refined = planner
        .refine("Day 1: something else", "add more beach time", "Valencia")
        .await
        .unwrap();
    assert!(refined.contains("Day 2: Coast and Beaches"));
}

#[test]
fn test_prompt_round_trip_with_request_fields() {
    let request = valencia_request();
    let prompt = build_itinerary_prompt(&request);

    assert!(prompt.contains("3-day travel itinerary for Valencia"));
    assert!(prompt.contains("food, beaches"));
    assert!(prompt.contains("mid-range accommodations"));

    let refinement = build_refinement_prompt("old plan", "shorter days", "Valencia");
    assert!(refinement.contains("old plan"));
    assert!(refinement.contains("shorter days"));
}

#[test]
fn test_default_config_is_valid() {
    let config = GoTravelConfig::default();
    assert!(config.validate().is_ok());

    let status = config.api_status();
    assert!(!status.gemini_available);
    assert!(status.supported_apis.contains(&"Directions API"));
}

#[test]
fn test_catalog_is_complete() {
    assert_eq!(CATALOG.len(), 12);
    for destination in CATALOG {
        assert!(!destination.name.is_empty());
        assert!(!destination.safety_rating.is_empty());
    }
}
