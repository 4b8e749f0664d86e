//! Configuration loading and validation
//!
//! Settings come from built-in defaults, then an optional JSON file, then
//! `MEETING_FINDER_*` environment variables.

use crate::error::{AppError, AppResult};
use crate::filters::{default_upcoming_window, DEFAULT_RADIUS_MILES, DEFAULT_UPCOMING_WINDOW_HOURS, MAX_UPCOMING_WINDOW_HOURS};
use crate::models::UserCoordinate;
use anyhow::Context;
use chrono_tz::Tz;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_CONFIG_PATH: &str = "MEETING_FINDER_CONFIG";
pub const ENV_API_URL: &str = "MEETING_FINDER_API_URL";
pub const ENV_RADIUS_MILES: &str = "MEETING_FINDER_RADIUS_MILES";
pub const ENV_WINDOW_HOURS: &str = "MEETING_FINDER_WINDOW_HOURS";
pub const ENV_TIMEZONE: &str = "MEETING_FINDER_TIMEZONE";
pub const ENV_ORIGIN: &str = "MEETING_FINDER_ORIGIN";
pub const ENV_FIXTURE: &str = "MEETING_FINDER_FIXTURE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the meetings API, e.g. `https://api.example.org`
    pub api_base_url: String,
    pub radius_miles: f64,
    pub upcoming_window_hours: i64,
    /// IANA timezone used to display start times
    pub display_timezone: String,
    /// Position to use when no location service is available
    pub default_origin: Option<UserCoordinate>,
    /// JSON feed to read instead of calling the API
    pub fixture_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            radius_miles: DEFAULT_RADIUS_MILES,
            upcoming_window_hours: DEFAULT_UPCOMING_WINDOW_HOURS,
            display_timezone: "UTC".to_string(),
            default_origin: None,
            fixture_path: None,
        }
    }
}

impl AppConfig {
    /// Loads defaults, the config file (if any) and environment overrides, then validates.
    pub fn load() -> AppResult<Self> {
        let path = env_var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!("No configuration file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    pub fn apply_env_overrides(&mut self) -> AppResult<()> {
        if let Some(url) = env_var(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(radius) = env_var(ENV_RADIUS_MILES) {
            self.radius_miles = radius
                .parse()
                .map_err(|_| AppError::config(format!("{} must be a number, got '{}'", ENV_RADIUS_MILES, radius)))?;
        }
        if let Some(hours) = env_var(ENV_WINDOW_HOURS) {
            self.upcoming_window_hours = hours
                .parse()
                .map_err(|_| AppError::config(format!("{} must be an integer, got '{}'", ENV_WINDOW_HOURS, hours)))?;
        }
        if let Some(tz) = env_var(ENV_TIMEZONE) {
            self.display_timezone = tz;
        }
        if let Some(origin) = env_var(ENV_ORIGIN) {
            let origin = origin
                .parse::<UserCoordinate>()
                .map_err(|e| AppError::config(format!("{}: {}", ENV_ORIGIN, e)))?;
            self.default_origin = Some(origin);
        }
        if let Some(path) = env_var(ENV_FIXTURE) {
            self.fixture_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// The configured window, clamped to `1..=MAX_UPCOMING_WINDOW_HOURS` hours.
    pub fn upcoming_window(&self) -> chrono::Duration {
        let hours = self.upcoming_window_hours.clamp(1, MAX_UPCOMING_WINDOW_HOURS);
        chrono::TimeDelta::try_hours(hours).unwrap_or_else(default_upcoming_window)
    }

    pub fn timezone(&self) -> AppResult<Tz> {
        self.display_timezone
            .parse::<Tz>()
            .map_err(|_| AppError::config(format!("Unknown timezone '{}'", self.display_timezone)))
    }

    pub fn base_url(&self) -> AppResult<Url> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| AppError::config(format!("Invalid API base URL '{}': {}", self.api_base_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::config(format!(
                "API base URL must use http or https, got '{}://'",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(AppError::config(format!(
                "API base URL '{}' has no host",
                self.api_base_url
            )));
        }
        Ok(url)
    }
}

/// `<config dir>/meeting-finder/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("meeting-finder").join("config.json"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Validates application configuration
pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    config.base_url()?;

    if !config.radius_miles.is_finite() || config.radius_miles <= 0.0 {
        return Err(AppError::config(format!(
            "Search radius must be a positive number of miles, got {}",
            config.radius_miles
        )));
    }
    if config.upcoming_window_hours <= 0 || config.upcoming_window_hours > MAX_UPCOMING_WINDOW_HOURS {
        return Err(AppError::config(format!(
            "Upcoming window must be between 1 and {} hours, got {}",
            MAX_UPCOMING_WINDOW_HOURS, config.upcoming_window_hours
        )));
    }
    config.timezone()?;

    info!(
        "Configuration OK: api={} radius={}mi window={}h tz={}",
        config.api_base_url, config.radius_miles, config.upcoming_window_hours, config.display_timezone
    );
    Ok(())
}
