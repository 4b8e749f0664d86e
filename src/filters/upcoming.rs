use crate::models::MeetingRecord;
use chrono::{DateTime, Duration, Utc};

/// Forward window used by the meeting list: two days.
pub const DEFAULT_UPCOMING_WINDOW_HOURS: i64 = 48;

/// Largest window the config accepts: one hundred years.
pub const MAX_UPCOMING_WINDOW_HOURS: i64 = 24 * 365 * 100;

pub fn default_upcoming_window() -> Duration {
    Duration::hours(DEFAULT_UPCOMING_WINDOW_HOURS)
}

/// Meetings starting in `(now, now + window]`, in input order.
///
/// Records without a parseable `start_time` are dropped. A horizon past the
/// last representable instant leaves the window open-ended.
pub fn select_upcoming(
    meetings: &[MeetingRecord],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<MeetingRecord> {
    let horizon = now.checked_add_signed(window);

    meetings
        .iter()
        .filter(|meeting| match meeting.start() {
            Some(start) => start > now && horizon.map_or(true, |horizon| start <= horizon),
            None => {
                log::trace!("Meeting {} has no usable start_time", meeting.id);
                false
            }
        })
        .cloned()
        .collect()
}

/// Stable chronological sort; records without a start time go last.
pub fn sort_by_start_time(meetings: &mut [MeetingRecord]) {
    meetings.sort_by_key(|meeting| {
        let start = meeting.start();
        (start.is_none(), start)
    });
}
