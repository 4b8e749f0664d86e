// Pure selection logic over a snapshot of the meetings feed.

pub mod proximity;
pub mod upcoming;

pub use proximity::{distance_to, haversine_miles, select_nearby, DEFAULT_RADIUS_MILES, EARTH_RADIUS_MILES};
pub use upcoming::{
    default_upcoming_window, select_upcoming, sort_by_start_time, DEFAULT_UPCOMING_WINDOW_HOURS,
    MAX_UPCOMING_WINDOW_HOURS,
};
