// Meeting Finder Library
// Meeting feed, upcoming/nearby selection and the meetings API client

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod feed;
pub mod filters;
pub mod http_config;
pub mod location;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use api::{FixtureSource, MeetingApiClient, MeetingSource};
pub use config::{validate_config, AppConfig};
pub use error::{AppError, AppResult};
pub use feed::{FeedSettings, LocationStatus, MeetingFeed};
pub use filters::{haversine_miles, select_nearby, select_upcoming};
pub use location::{FixedLocation, LocationProvider};
pub use models::*;

use std::sync::Arc;

/// Collaborators shared by every screen.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub source: Arc<dyn MeetingSource>,
    pub locator: Arc<dyn LocationProvider>,
}

impl AppState {
    /// Uses the fixture file when one is configured, the remote API otherwise.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let source: Arc<dyn MeetingSource> = match &config.fixture_path {
            Some(path) => Arc::new(FixtureSource::from_file(path).await?),
            None => Arc::new(MeetingApiClient::from_config(&config)?),
        };
        let locator = Arc::new(FixedLocation::from_option(config.default_origin));

        Ok(Self {
            config,
            source,
            locator,
        })
    }

    pub fn feed(&self) -> AppResult<MeetingFeed> {
        Ok(MeetingFeed::new(
            self.source.clone(),
            self.locator.clone(),
            FeedSettings::from_config(&self.config)?,
        ))
    }
}
