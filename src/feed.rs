//! Meeting feed view-model
//!
//! Holds one snapshot of the meetings list plus the user's position and
//! derives everything a screen renders from it: the upcoming list, the
//! nearby list, map markers, the selected meeting and the add-meeting form.

use crate::api::MeetingSource;
use crate::calendar;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::filters::{self, default_upcoming_window, DEFAULT_RADIUS_MILES};
use crate::location::LocationProvider;
use crate::models::{MeetingId, MeetingRecord, NewMeeting, UserCoordinate};
use crate::utils::{self, logging};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const SUMMARY_MAX_CHARS: usize = 120;

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub radius_miles: f64,
    pub upcoming_window: Duration,
    pub timezone: Tz,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            radius_miles: DEFAULT_RADIUS_MILES,
            upcoming_window: default_upcoming_window(),
            timezone: chrono_tz::UTC,
        }
    }
}

impl FeedSettings {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            radius_miles: config.radius_miles,
            upcoming_window: config.upcoming_window(),
            timezone: config.timezone()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationStatus {
    /// Not requested yet
    Pending,
    Resolved(UserCoordinate),
    /// Permission denied or no fix; holds the message to show
    Unavailable(String),
}

impl LocationStatus {
    pub fn position(&self) -> Option<UserCoordinate> {
        match self {
            LocationStatus::Resolved(position) => Some(*position),
            _ => None,
        }
    }
}

/// One row of a meetings list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: MeetingId,
    pub title: String,
    pub summary: String,
    pub starts_at: Option<String>,
    pub distance_miles: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: MeetingId,
    pub title: String,
    pub description: String,
    pub position: UserCoordinate,
}

pub struct MeetingFeed {
    source: Arc<dyn MeetingSource>,
    locator: Arc<dyn LocationProvider>,
    settings: FeedSettings,
    meetings: Vec<MeetingRecord>,
    location: LocationStatus,
    error: Option<String>,
    selected: Option<MeetingId>,
    form: NewMeeting,
    last_refreshed: Option<DateTime<Utc>>,
}

impl MeetingFeed {
    pub fn new(
        source: Arc<dyn MeetingSource>,
        locator: Arc<dyn LocationProvider>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            source,
            locator,
            settings,
            meetings: Vec::new(),
            location: LocationStatus::Pending,
            error: None,
            selected: None,
            form: NewMeeting::default(),
            last_refreshed: None,
        }
    }

    /// Fetches meetings and the user's position.
    ///
    /// A failed fetch leaves the feed empty with a visible error; a failed
    /// location lookup only disables the nearby list.
    pub async fn refresh(&mut self, now: DateTime<Utc>) {
        let started = Instant::now();
        let (meetings, position) = tokio::join!(
            self.source.fetch_meetings(),
            self.locator.current_position()
        );

        match meetings {
            Ok(meetings) => {
                self.meetings = meetings;
                self.error = None;
            }
            Err(e) => {
                logging::log_error_with_context(&e, "Loading meetings");
                self.meetings.clear();
                self.error = Some(user_friendly_error(&e));
            }
        }

        self.location = match position {
            Ok(position) => LocationStatus::Resolved(position),
            Err(e) => {
                log::warn!("Location unavailable: {}", e);
                LocationStatus::Unavailable(user_friendly_error(&e))
            }
        };

        if let Some(id) = &self.selected {
            if !self.meetings.iter().any(|m| &m.id == id) {
                self.selected = None;
            }
        }

        self.last_refreshed = Some(now);
        logging::log_feed_refresh(
            self.meetings.len(),
            self.upcoming(now).len(),
            self.nearby().map(|nearby| nearby.len()),
            started.elapsed().as_millis() as u64,
        );
    }

    pub fn meetings(&self) -> &[MeetingRecord] {
        &self.meetings
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn location(&self) -> &LocationStatus {
        &self.location
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<MeetingRecord> {
        filters::select_upcoming(&self.meetings, now, self.settings.upcoming_window)
    }

    /// `None` until the user's position is known.
    pub fn nearby(&self) -> Option<Vec<MeetingRecord>> {
        let origin = self.location.position()?;
        Some(filters::select_nearby(&self.meetings, origin, self.settings.radius_miles))
    }

    pub fn markers(&self) -> Vec<MapMarker> {
        self.meetings
            .iter()
            .filter_map(|meeting| {
                meeting.coordinate().map(|position| MapMarker {
                    id: meeting.id.clone(),
                    title: meeting.title.clone(),
                    description: meeting.description.clone(),
                    position,
                })
            })
            .collect()
    }

    pub fn items(&self, meetings: &[MeetingRecord]) -> Vec<FeedItem> {
        let origin = self.location.position();
        meetings
            .iter()
            .map(|meeting| FeedItem {
                id: meeting.id.clone(),
                title: utils::normalize_title(&meeting.title),
                summary: utils::truncate_for_display(&meeting.description, SUMMARY_MAX_CHARS),
                starts_at: calendar::format_start_time(meeting, self.settings.timezone),
                distance_miles: origin.and_then(|origin| filters::distance_to(meeting, origin)),
            })
            .collect()
    }

    pub fn select(&mut self, id: &MeetingId) -> AppResult<&MeetingRecord> {
        let meeting = self
            .meetings
            .iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| AppError::not_found(format!("Meeting {}", id)))?;
        self.selected = Some(id.clone());
        Ok(meeting)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&MeetingRecord> {
        let id = self.selected.as_ref()?;
        self.meetings.iter().find(|m| &m.id == id)
    }

    pub fn form(&self) -> &NewMeeting {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut NewMeeting {
        &mut self.form
    }

    /// Validates the form, creates the meeting and appends it to the list.
    /// The form is cleared only on success.
    pub async fn submit_new_meeting(&mut self) -> AppResult<MeetingRecord> {
        let request = self.form.validate()?;
        let meeting = self.source.create_meeting(request).await?;

        self.meetings.push(meeting.clone());
        self.form.clear();
        Ok(meeting)
    }

    /// Uploads the selfie at `path` as a check-in.
    pub async fn check_in(&self, path: &Path) -> AppResult<()> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AppError::invalid_input(format!("'{}' is not a file", path.display())))?
            .to_string();
        let image = tokio::fs::read(path).await?;

        self.source.upload_selfie(file_name, image).await
    }

    /// iCalendar document for the given meetings.
    pub fn export_calendar(&self, meetings: &[MeetingRecord]) -> String {
        calendar::export_meetings(meetings)
    }
}

/// Message suitable for showing on screen.
pub fn user_friendly_error(error: &AppError) -> String {
    match error {
        AppError::Network(e) if e.is_timeout() => {
            "Request timed out. Please try again in a moment.".to_string()
        }
        AppError::Network(_) => {
            "Network error. Please check your internet connection and try again.".to_string()
        }
        AppError::CircuitOpen(_) => {
            "The meetings service is having trouble. Please try again shortly.".to_string()
        }
        AppError::Api { status, .. } if *status >= 500 => {
            "The meetings service is having trouble. Please try again shortly.".to_string()
        }
        AppError::Api { message, .. } => message.clone(),
        AppError::Json(_) => "The server sent data we could not read.".to_string(),
        AppError::Location(_) => {
            "Your location is unavailable, so nearby meetings cannot be shown.".to_string()
        }
        AppError::InvalidInput(message) => message.clone(),
        other => other.to_safe_string(),
    }
}
