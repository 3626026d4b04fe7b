//! Itinerary generation and refinement
//!
//! Drives the full flow: validate the request, build the prompt, enrich it
//! with live location context when services are available, call the text
//! model, and post-process the result.

use crate::format::format_itinerary;
use crate::gemini::TextModel;
use crate::models::{GeneratedItinerary, TravelPlanRequest};
use crate::prompt::{build_itinerary_prompt, build_refinement_prompt, location_context};
use crate::services::ServicesManager;
use crate::GoTravelError;
use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Itinerary planning service
pub struct ItineraryPlanner {
    model: Box<dyn TextModel>,
    services: Option<ServicesManager>,
}

impl ItineraryPlanner {
    /// Create a planner without live enrichment
    #[must_use]
    pub fn new(model: Box<dyn TextModel>) -> Self {
        Self {
            model,
            services: None,
        }
    }

    /// Create a planner that enriches prompts with live location data
    #[must_use]
    pub fn with_services(model: Box<dyn TextModel>, services: ServicesManager) -> Self {
        Self {
            model,
            services: Some(services),
        }
    }

    /// Generate a formatted itinerary for the given travel preferences
    pub async fn generate(&self, request: &TravelPlanRequest) -> Result<GeneratedItinerary> {
        request.validate()?;

        info!(
            "Generating itinerary for {} ({} days, {})",
            request.destination,
            request.duration_days,
            request.people_text()
        );

        let mut prompt = build_itinerary_prompt(request);

        // Location context is an enrichment, never a requirement
        if let Some(services) = &self.services {
            match services.location_info(&request.destination).await {
                Ok(info) => {
                    debug!(
                        "Appending location context ({} attractions, {} restaurants)",
                        info.attractions.len(),
                        info.restaurants.len()
                    );
                    prompt.push_str(&location_context(&info));
                }
                Err(e) => {
                    warn!("Could not get location context: {}", e);
                }
            }
        } else {
            debug!("No services configured for enhanced context");
        }

        let text = self.model.generate(&prompt).await?;
        let html = format_itinerary(&text);

        info!("Itinerary generated for {}", request.destination);

        Ok(GeneratedItinerary {
            destination: request.destination.clone(),
            duration_days: request.duration_days,
            start_date: request.start_date,
            end_date: request.end_date,
            html,
            generated_at: Utc::now(),
        })
    }

    /// Rework an existing itinerary according to user feedback
    ///
    /// Returns the model's raw text; the input itinerary is usually already
    /// formatted, so no second formatting pass is applied.
    pub async fn refine(
        &self,
        current_itinerary: &str,
        feedback: &str,
        destination: &str,
    ) -> Result<String> {
        if current_itinerary.trim().is_empty()
            || feedback.trim().is_empty()
            || destination.trim().is_empty()
        {
            return Err(
                GoTravelError::validation("Missing required data for refinement").into(),
            );
        }

        info!("Refining itinerary for {}", destination);

        let prompt = build_refinement_prompt(current_itinerary, feedback, destination);
        self.model.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    /// Test double that records prompts and returns a canned itinerary
    struct StubModel {
        prompts: Arc<Mutex<Vec<String>>>,
        response: String,
    }

    impl StubModel {
        fn new(response: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
            let prompts = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    prompts: prompts.clone(),
                    response: response.to_string(),
                },
                prompts,
            )
        }
    }

    #[async_trait]
    impl TextModel for StubModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.response.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn request() -> TravelPlanRequest {
        TravelPlanRequest {
            destination: "Lisbon".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            duration_days: 3,
            people: 2,
            budget: None,
            interests: vec![],
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn test_generate_formats_model_output() {
        let (stub, _prompts) = StubModel::new("Day 1: Alfama\n- Tram 28 ride\nMorning: pastel de nata");
        let planner = ItineraryPlanner::new(Box::new(stub));

        let itinerary = planner.generate(&request()).await.unwrap();

        assert_eq!(itinerary.destination, "Lisbon");
        assert_eq!(itinerary.duration_days, 3);
        assert!(itinerary.html.contains("<h3"));
        assert!(itinerary.html.contains("\u{2014} Tram 28 ride"));
        assert!(itinerary.html.contains("<h4"));
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_request() {
        let (stub, _prompts) = StubModel::new("anything");
        let planner = ItineraryPlanner::new(Box::new(stub));

        let mut invalid = request();
        invalid.people = 0;
        assert!(planner.generate(&invalid).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_prompt_carries_preferences() {
        let (stub, prompts) = StubModel::new("Day 1: ok");
        let planner = ItineraryPlanner::new(Box::new(stub));
        planner.generate(&request()).await.unwrap();

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("3-day travel itinerary for Lisbon"));
        assert!(prompts[0].contains("Group size: 2 people"));
        // No services attached, so no live context block
        assert!(!prompts[0].contains("Location Context:"));
    }

    #[tokio::test]
    async fn test_refine_requires_all_fields() {
        let (stub, _prompts) = StubModel::new("updated plan");
        let planner = ItineraryPlanner::new(Box::new(stub));

        let result = planner.refine("", "more food", "Lisbon").await;
        assert!(result.is_err());

        let result = planner.refine("Day 1", "", "Lisbon").await;
        assert!(result.is_err());

        let refined = planner.refine("Day 1", "more food", "Lisbon").await.unwrap();
        assert_eq!(refined, "updated plan");
    }
}
