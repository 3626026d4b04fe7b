use anyhow::Result;
use chrono::{Duration, Utc};
use gotravel::config::LoggingConfig;
use gotravel::{
    GeminiClient, GoTravelConfig, ItineraryPlanner, ServicesManager, TravelPlanRequest,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GoTravelConfig::load()?;
    init_tracing(&config.logging);

    let status = config.api_status();
    println!("gotravel v{}", gotravel::VERSION);
    println!("  Gemini:   {}", if status.gemini_available { "available" } else { "not configured" });
    println!("  Google:   {}", if status.google_api_available { "available" } else { "not configured" });
    println!("  Weather:  {}", if status.weather_api_available { "available" } else { "not configured" });
    println!("  Flights:  {}", if status.flights_available { "available" } else { "not configured" });

    let destination = std::env::args().nth(1).unwrap_or_else(|| "Paris".to_string());

    let services = ServicesManager::from_config(&config)?;

    let info = services.location_info(&destination).await?;
    println!("\n{}", info.location.formatted_address);
    if let Some(weather) = &info.weather {
        println!("  Weather: {}", weather.summary());
    }
    if let Some(timezone) = &info.timezone {
        println!("  Timezone: {}", timezone.time_zone_name);
    }
    for place in &info.attractions {
        match place.distance_km {
            Some(distance) => println!("  Attraction: {} ({distance:.1} km)", place.name),
            None => println!("  Attraction: {}", place.name),
        }
    }

    if status.gemini_available {
        let model = GeminiClient::new(
            &config.gemini,
            config.google.timeout_seconds,
            config.google.max_retries,
        )?;
        let planner = ItineraryPlanner::with_services(Box::new(model), services);

        let start_date = Utc::now().date_naive() + Duration::days(30);
        let request = TravelPlanRequest {
            destination: destination.clone(),
            start_date,
            end_date: start_date + Duration::days(2),
            duration_days: 3,
            people: 2,
            budget: None,
            interests: vec![],
            special_requests: None,
        };

        let itinerary = planner.generate(&request).await?;
        println!("\n{}", itinerary.html);
    } else {
        println!("\nSet GOTRAVEL_GEMINI__API_KEY to generate an itinerary for {destination}.");
    }

    Ok(())
}
