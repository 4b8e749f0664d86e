use crate::models::{MeetingRecord, UserCoordinate};

/// Mean Earth radius in statute miles (for the Haversine formula)
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Radius used by the nearby list.
pub const DEFAULT_RADIUS_MILES: f64 = 5.0;

/// Great-circle distance between two points in statute miles.
pub fn haversine_miles(from: UserCoordinate, to: UserCoordinate) -> f64 {
    let lat1_rad = from.latitude().to_radians();
    let lat2_rad = to.latitude().to_radians();
    let delta_lat = (to.latitude() - from.latitude()).to_radians();
    let delta_lon = (to.longitude() - from.longitude()).to_radians();

    // Rounding can push `a` just past 1 for antipodal points.
    let a = ((delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Distance from `origin` to the meeting, or `None` when the record has no
/// usable location.
pub fn distance_to(meeting: &MeetingRecord, origin: UserCoordinate) -> Option<f64> {
    meeting
        .coordinate()
        .map(|location| haversine_miles(origin, location))
}

/// Meetings within `radius_miles` of `origin`, in input order.
///
/// Records with missing or malformed coordinates are skipped. A coordinate
/// outside -90..90 / -180..180 counts as malformed, as does a zero component.
pub fn select_nearby(
    meetings: &[MeetingRecord],
    origin: UserCoordinate,
    radius_miles: f64,
) -> Vec<MeetingRecord> {
    meetings
        .iter()
        .filter(|meeting| match distance_to(meeting, origin) {
            Some(distance) => distance <= radius_miles,
            None => {
                log::trace!("Meeting {} has no usable location", meeting.id);
                false
            }
        })
        .cloned()
        .collect()
}
