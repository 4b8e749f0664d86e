// Meeting Finder - prints upcoming and nearby meetings
// Main entry point for the command-line front end

use chrono::Utc;
use log::{error, info};
use meeting_finder::feed::{FeedItem, LocationStatus};
use meeting_finder::utils::logging;
use meeting_finder::{AppConfig, AppState};
use std::process::ExitCode;

fn print_section(heading: &str, items: &[FeedItem]) {
    println!("\n{} ({})", heading, items.len());
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        let when = item.starts_at.as_deref().unwrap_or("no scheduled time");
        match item.distance_miles {
            Some(miles) => println!("  [{}] {} | {} | {:.1} mi", item.id, item.title, when, miles),
            None => println!("  [{}] {} | {}", item.id, item.title, when),
        }
        if !item.summary.is_empty() {
            println!("      {}", item.summary);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting Meeting Finder");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            logging::log_error_with_context(&e, "Startup");
            eprintln!("{}", e.to_safe_string());
            return ExitCode::FAILURE;
        }
    };

    let mut feed = match state.feed() {
        Ok(feed) => feed,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let now = Utc::now();
    feed.refresh(now).await;

    if let Some(message) = feed.error() {
        println!("Could not load meetings: {}", message);
    }

    let upcoming = feed.upcoming(now);
    print_section(
        &format!("Starting in the next {} hours", feed.settings().upcoming_window.num_hours()),
        &feed.items(&upcoming),
    );

    match feed.location() {
        LocationStatus::Resolved(origin) => {
            let nearby = feed.nearby().unwrap_or_default();
            print_section(
                &format!("Within {} miles of {}", feed.settings().radius_miles, origin),
                &feed.items(&nearby),
            );
        }
        LocationStatus::Unavailable(message) => println!("\n{}", message),
        LocationStatus::Pending => println!("\nWaiting for your location..."),
    }

    if feed.error().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
