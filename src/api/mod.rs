// Meetings API access: the remote HTTP service and local fixtures.

use crate::error::AppResult;
use crate::models::{CreateMeetingRequest, MeetingRecord};
use async_trait::async_trait;

pub mod client;
pub mod fixture;

pub use client::MeetingApiClient;
pub use fixture::FixtureSource;

/// Where the feed gets its meetings from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingSource: Send + Sync {
    /// `GET /meetings`
    async fn fetch_meetings(&self) -> AppResult<Vec<MeetingRecord>>;

    /// `POST /meetings`
    async fn create_meeting(&self, request: CreateMeetingRequest) -> AppResult<MeetingRecord>;

    /// `POST /upload_selfie`
    async fn upload_selfie(&self, file_name: String, image: Vec<u8>) -> AppResult<()>;
}
