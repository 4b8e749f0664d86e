pub mod coordinate;
pub mod meeting;
pub mod new_meeting;
pub mod upload;

// Flatten so callers can write `use crate::models::MeetingRecord`.
pub use coordinate::UserCoordinate;
pub use meeting::{parse_feed, parse_timestamp, LooseNumber, MeetingId, MeetingRecord, RawTimestamp};
pub use new_meeting::{CreateMeetingRequest, NewMeeting};
pub use upload::UploadResponse;
