//! Prompt construction for itinerary generation and refinement

use crate::models::{BudgetTier, LocationInfo, PlaceSummary, TravelPlanRequest};

/// Places named per category in the location context block
const CONTEXT_PLACES: usize = 5;

/// Build the itinerary generation prompt from traveler preferences
#[must_use]
pub fn build_itinerary_prompt(request: &TravelPlanRequest) -> String {
    let people_text = request.people_text();

    let interests_text = if request.interests.is_empty() {
        "general sightseeing".to_string()
    } else {
        request.interests.join(", ")
    };

    let group_context = match request.people {
        1 => "\n- Plan activities suitable for solo travelers",
        2 => "\n- Plan romantic and couple-friendly activities",
        3..=4 => "\n- Plan activities suitable for small groups and families",
        _ => "\n- Plan activities suitable for larger groups, consider group discounts and reservations",
    };

    let budget_context = match request.budget {
        Some(BudgetTier::Budget) => {
            "\n- Focus on budget-friendly options, free attractions, and affordable accommodations"
        }
        Some(BudgetTier::MidRange) => "\n- Include mid-range accommodations and dining options",
        Some(BudgetTier::Luxury) => {
            "\n- Include luxury accommodations, fine dining, and premium experiences"
        }
        None => "",
    };

    let special_context = request
        .special_requests
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("\n- Special considerations: {s}"))
        .unwrap_or_default();

    format!(
        r"As a travel planner, create a detailed {duration}-day travel itinerary for {destination} from {start_date} to {end_date} for {people_text}.

TRAVELER PREFERENCES:
- Group size: {people_text}
- Interests: {interests_text}{budget_context}{group_context}{special_context}

REQUIREMENTS:
- Provide a day-by-day breakdown (Day 1, Day 2, etc.)
- Include specific activities, attractions, and experiences with prices for {people_text}
- Suggest actual restaurant names and local cuisine with seating for {people_text}
- Include timing recommendations (morning, afternoon, evening)
- Add transportation tips between locations for {people_text}
- Consider group size when recommending accommodations and dining reservations
- Mention cultural insights and local tips
- Consider opening hours and seasonal factors
- Include approximate time needed for each activity
- Provide coordinates or addresses for major attractions when possible
- Mention any group rates or family packages available

HIDDEN GEMS & LOCAL EXPERIENCES:
- Include at least 2-3 hidden gems or lesser-known attractions per day
- Recommend local favorites that tourists typically miss
- Suggest authentic local experiences and off-the-beaten-path locations
- Include local markets, neighborhood cafes, and community events
- Mention secret viewpoints, hidden restaurants, and local hangout spots
- Balance popular attractions with unique, authentic experiences

TRAVEL TIMES & LOGISTICS:
- Include estimated travel times between each location/activity
- Specify transportation methods (walk, taxi, metro, bus) with approximate costs
- Account for realistic travel time including waiting and boarding
- Group nearby attractions to minimize travel time
- Suggest optimal routes to reduce backtracking
- Include buffer time for unexpected delays

SAFETY & SECURITY REQUIREMENTS:
- Include a dedicated SAFETY SECTION at the end with:
  * Emergency contact numbers (police, ambulance, tourist helpline)
  * Common safety concerns and how to avoid them
  * Safe areas vs areas to avoid, especially at night
  * Local scams to watch out for
  * Recommended safety apps or resources
  * Cultural customs and etiquette to avoid offending locals
  * Health and medical considerations
  * Travel insurance recommendations
- Add safety tips for each day's activities when relevant
- Mention secure transportation options
- Highlight any areas known for pickpocketing or tourist scams

FORMAT:
- Use clear headings for each day
- Organize activities by time of day
- Include practical details and insider tips
- Add a comprehensive SAFETY SECTION at the end
- Make it engaging and informative
- Include weather considerations and timezone information when available

Please create a comprehensive, well-structured itinerary that maximizes the travel experience while prioritizing traveler safety and being practical and actionable.",
        duration = request.duration_days,
        destination = request.destination,
        start_date = request.start_date,
        end_date = request.end_date,
    )
}

/// Build the live-data context block appended to the generation prompt
#[must_use]
pub fn location_context(info: &LocationInfo) -> String {
    let mut context = String::from("\n\nLocation Context:\n");
    context.push_str(&format!(
        "Address: {}\n",
        info.location.formatted_address
    ));

    if let Some(weather) = &info.weather {
        context.push_str(&format!(
            "Current Weather: {}°C, {}\n",
            weather.temperature_c, weather.description
        ));
    }

    if !info.attractions.is_empty() {
        context.push_str(&format!(
            "Nearby Attractions: {}\n",
            place_names(&info.attractions)
        ));
    }

    if !info.restaurants.is_empty() {
        context.push_str(&format!(
            "Nearby Restaurants: {}\n",
            place_names(&info.restaurants)
        ));
    }

    if let Some(timezone) = &info.timezone {
        context.push_str(&format!("Timezone: {}\n", timezone.time_zone_name));
    }

    context
}

fn place_names(places: &[PlaceSummary]) -> String {
    places
        .iter()
        .take(CONTEXT_PLACES)
        .map(|place| place.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the prompt for refining an existing itinerary from user feedback
#[must_use]
pub fn build_refinement_prompt(
    current_itinerary: &str,
    feedback: &str,
    destination: &str,
) -> String {
    format!(
        r"The user has requested changes to their travel itinerary for {destination}.

ORIGINAL ITINERARY:
{current_itinerary}

USER FEEDBACK:
{feedback}

Please update the itinerary based on the user's feedback. Keep the same format and structure, but incorporate the requested changes. Maintain the quality and detail of the original while addressing the specific feedback provided."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Coordinates, CurrentWeather, Location, TimezoneInfo, WeatherSource,
    };
    use chrono::NaiveDate;
    use rstest::rstest;

    fn request_for(people: u32, budget: Option<BudgetTier>) -> TravelPlanRequest {
        TravelPlanRequest {
            destination: "Barcelona".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            duration_days: 4,
            people,
            budget,
            interests: vec!["beaches".to_string(), "architecture".to_string()],
            special_requests: None,
        }
    }

    #[test]
    fn test_prompt_contains_sections() {
        let prompt = build_itinerary_prompt(&request_for(2, None));
        assert!(prompt.contains("TRAVELER PREFERENCES:"));
        assert!(prompt.contains("REQUIREMENTS:"));
        assert!(prompt.contains("HIDDEN GEMS & LOCAL EXPERIENCES:"));
        assert!(prompt.contains("TRAVEL TIMES & LOGISTICS:"));
        assert!(prompt.contains("SAFETY & SECURITY REQUIREMENTS:"));
        assert!(prompt.contains("FORMAT:"));
        assert!(prompt.contains("4-day travel itinerary for Barcelona"));
        assert!(prompt.contains("from 2025-09-10 to 2025-09-14"));
    }

    #[rstest]
    #[case(1, "solo travelers")]
    #[case(2, "romantic and couple-friendly")]
    #[case(4, "small groups and families")]
    #[case(7, "larger groups")]
    fn test_group_context(#[case] people: u32, #[case] expected: &str) {
        let prompt = build_itinerary_prompt(&request_for(people, None));
        assert!(prompt.contains(expected), "missing '{expected}' for {people} people");
    }

    #[rstest]
    #[case(BudgetTier::Budget, "budget-friendly options")]
    #[case(BudgetTier::MidRange, "mid-range accommodations")]
    #[case(BudgetTier::Luxury, "luxury accommodations")]
    fn test_budget_context(#[case] budget: BudgetTier, #[case] expected: &str) {
        let prompt = build_itinerary_prompt(&request_for(2, Some(budget)));
        assert!(prompt.contains(expected));
    }

    #[test]
    fn test_no_budget_context_without_tier() {
        let prompt = build_itinerary_prompt(&request_for(2, None));
        assert!(!prompt.contains("budget-friendly options"));
        assert!(!prompt.contains("luxury accommodations"));
    }

    #[test]
    fn test_people_singular_plural() {
        let prompt = build_itinerary_prompt(&request_for(1, None));
        assert!(prompt.contains("for 1 person"));

        let prompt = build_itinerary_prompt(&request_for(3, None));
        assert!(prompt.contains("for 3 people"));
    }

    #[test]
    fn test_default_interests() {
        let mut request = request_for(2, None);
        request.interests.clear();
        let prompt = build_itinerary_prompt(&request);
        assert!(prompt.contains("general sightseeing"));
    }

    #[test]
    fn test_special_requests_included() {
        let mut request = request_for(2, None);
        request.special_requests = Some("wheelchair accessible venues".to_string());
        let prompt = build_itinerary_prompt(&request);
        assert!(prompt.contains("Special considerations: wheelchair accessible venues"));
    }

    fn place(name: &str) -> PlaceSummary {
        PlaceSummary {
            name: name.to_string(),
            vicinity: None,
            rating: None,
            ratings_total: None,
            place_id: None,
            coordinates: None,
            distance_km: None,
        }
    }

    #[test]
    fn test_location_context() {
        let info = LocationInfo {
            location: Location {
                coordinates: Coordinates {
                    latitude: 41.3851,
                    longitude: 2.1734,
                },
                formatted_address: "Barcelona, Spain".to_string(),
                place_id: None,
            },
            timezone: Some(TimezoneInfo {
                time_zone_id: "Europe/Madrid".to_string(),
                time_zone_name: "Central European Summer Time".to_string(),
                raw_offset: 3600,
                dst_offset: 3600,
            }),
            weather: Some(CurrentWeather {
                temperature_c: 26.0,
                feels_like_c: 27.0,
                humidity: 60,
                wind_speed_ms: 3.0,
                description: "few clouds".to_string(),
                station: "Barcelona".to_string(),
                source: WeatherSource::Live,
            }),
            attractions: (1..=7).map(|i| place(&format!("Attraction {i}"))).collect(),
            restaurants: vec![place("El Raco")],
        };

        let context = location_context(&info);
        assert!(context.contains("Address: Barcelona, Spain"));
        assert!(context.contains("Current Weather: 26°C, few clouds"));
        assert!(context.contains("Nearby Restaurants: El Raco"));
        assert!(context.contains("Timezone: Central European Summer Time"));
        // Only the top five attractions are named
        assert!(context.contains("Attraction 5"));
        assert!(!context.contains("Attraction 6"));
    }

    #[test]
    fn test_location_context_skips_missing_slots() {
        let info = LocationInfo {
            location: Location {
                coordinates: Coordinates {
                    latitude: 0.0,
                    longitude: 0.0,
                },
                formatted_address: "Null Island".to_string(),
                place_id: None,
            },
            timezone: None,
            weather: None,
            attractions: vec![],
            restaurants: vec![],
        };

        let context = location_context(&info);
        assert!(context.contains("Address: Null Island"));
        assert!(!context.contains("Current Weather"));
        assert!(!context.contains("Nearby Attractions"));
    }

    #[test]
    fn test_refinement_prompt() {
        let prompt = build_refinement_prompt("Day 1: beach", "add more museums", "Barcelona");
        assert!(prompt.contains("ORIGINAL ITINERARY:\nDay 1: beach"));
        assert!(prompt.contains("USER FEEDBACK:\nadd more museums"));
        assert!(prompt.contains("itinerary for Barcelona"));
    }
}
