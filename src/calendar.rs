//! Calendar integration
//!
//! Renders meetings as iCalendar events so they can be added to the
//! device calendar, and formats start times for display.

use crate::models::MeetingRecord;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event, EventLike};

pub const CALENDAR_NAME: &str = "Meeting Finder";

/// Meetings without an end time are assumed to last this long.
pub fn default_meeting_length() -> Duration {
    Duration::hours(1)
}

/// Builds an event for a meeting, or `None` when it has no usable start time.
pub fn meeting_to_event(meeting: &MeetingRecord) -> Option<Event> {
    let start = meeting.start()?;
    let end = meeting
        .end()
        .filter(|end| *end > start)
        .unwrap_or_else(|| start + default_meeting_length());

    let mut event = Event::new();
    event
        .uid(&format!("meeting-{}@meeting-finder", meeting.id))
        .summary(&meeting.title)
        .starts(start)
        .ends(end);

    if !meeting.description.trim().is_empty() {
        event.description(&meeting.description);
    }
    if let Some(location) = meeting.coordinate() {
        event.location(&location.to_string());
        event.add_property("GEO", &format!("{};{}", location.latitude(), location.longitude()));
    }

    Some(event.done())
}

/// Renders every schedulable meeting into one calendar document.
pub fn export_meetings(meetings: &[MeetingRecord]) -> String {
    let mut calendar = Calendar::new();
    calendar.name(CALENDAR_NAME);

    let mut exported = 0;
    for event in meetings.iter().filter_map(meeting_to_event) {
        calendar.push(event);
        exported += 1;
    }

    if exported < meetings.len() {
        log::debug!(
            "Exported {} of {} meetings; the rest have no start time",
            exported,
            meetings.len()
        );
    }

    calendar.done().to_string()
}

pub fn format_in_timezone(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%a %b %-d, %-I:%M %p %Z").to_string()
}

pub fn format_start_time(meeting: &MeetingRecord, tz: Tz) -> Option<String> {
    meeting.start().map(|start| format_in_timezone(start, tz))
}
