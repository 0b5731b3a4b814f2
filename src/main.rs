use std::sync::Arc;

use anyhow::{Context, Result};
use nimbus_core::Config;
use nimbus_http::{HttpClient, HttpConfig};
use nimbus_search::{SearchController, SearchOptions, SearchOutcome, SearchState};
use nimbus_storage::Storage;
use nimbus_weather::{
    daily_aggregates, format_local_time, hourly_slice, parse_coordinates, stat_cards,
    wind_histogram, ApiSettings, Coordinate, FixedLocation, LocationProvider, NoLocation,
    WeatherClient,
};

const USAGE: &str = "usage: nimbus [CITY | LAT,LON]";

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
enum Request {
    /// No argument: resume the last location or locate
    Resume,
    Coordinates(Coordinate),
    City(String),
}

fn parse_request(query: &str) -> Request {
    let query = query.trim();
    if query.is_empty() {
        Request::Resume
    } else if let Ok(coordinate) = parse_coordinates(query) {
        Request::Coordinates(coordinate)
    } else {
        Request::City(query.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    nimbus_core::init()?;

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query == "-h" || query == "--help" {
        println!("{}", USAGE);
        return Ok(());
    }

    let (config, _) = Config::load_validated()?;
    let controller = build_controller(&config)?;

    let request = parse_request(&query);
    tracing::info!("Dispatching {:?}", request);
    let outcome = match request {
        Request::Resume => controller.on_mount().await,
        Request::Coordinates(coordinate) => {
            controller
                .search_coordinates(coordinate.lat, coordinate.lon)
                .await
        }
        Request::City(city) => controller.search_city(&city).await,
    };

    match outcome {
        SearchOutcome::Applied => print_dashboard(&controller.search_state()),
        SearchOutcome::Failed(category) => {
            tracing::warn!("Search failed: {:?}", category);
            controller.shutdown();
            eprintln!("{}", category.user_message());
            std::process::exit(1);
        }
        SearchOutcome::Ignored | SearchOutcome::Superseded => println!("{}", USAGE),
    }

    let history = controller.history();
    if !history.is_empty() {
        println!("\nRecent searches: {}", history.join(", "));
    }

    controller.shutdown();
    Ok(())
}

fn build_controller(config: &Config) -> Result<SearchController> {
    let storage = Storage::open_or_noop(config.storage.data_dir.clone());
    let http = HttpClient::new(&HttpConfig::from_config(config))
        .context("Failed to build HTTP client")?;
    let weather = WeatherClient::new(ApiSettings::from_config(&config.api), http);

    let location: Arc<dyn LocationProvider> = match &config.default_location {
        Some(default) => Arc::new(FixedLocation::new(Coordinate::new(default.lat, default.lon))),
        None => Arc::new(NoLocation),
    };

    Ok(SearchController::new(
        weather,
        storage,
        location,
        SearchOptions::from_config(&config.search),
    ))
}

fn print_dashboard(state: &SearchState) {
    let Some(snapshot) = &state.result else {
        return;
    };

    let local = format_local_time(snapshot, chrono::Utc::now());
    println!("{} ({}, {})", snapshot.name, local.date, local.time);
    if let Some(condition) = snapshot.primary_condition() {
        println!("  {:.1}° {}", snapshot.metrics.temp, condition.description);
    }
    for card in stat_cards(snapshot) {
        println!("  {:<12} {}", card.id, card.value);
    }

    let forecast = state.forecast.as_deref().unwrap_or_default();

    let hourly = hourly_slice(forecast);
    if !hourly.is_empty() {
        println!("\nNext hours:");
        for point in &hourly {
            println!(
                "  {:>5}  {:>5.1}°  {:>3}%  {:>4.1} m/s  {}",
                point.time, point.temp, point.humidity, point.wind_speed, point.condition
            );
        }
    }

    let days = daily_aggregates(forecast);
    if !days.is_empty() {
        println!("\nDaily:");
        for day in &days {
            println!(
                "  {}  {:>5.1}° .. {:>5.1}°  avg {:>5.1}°  [{}]",
                day.date, day.min_temp, day.max_temp, day.avg_temp, day.icon_code
            );
        }
    }

    if let Some(histogram) = wind_histogram(forecast) {
        println!("\nWind (avg {:.1} m/s):", histogram.average_speed);
        for bucket in &histogram.buckets {
            println!(
                "  {:<2} {:>4.1} m/s ({} samples)",
                bucket.octant.label(),
                bucket.mean_speed,
                bucket.samples
            );
        }
    }
}
