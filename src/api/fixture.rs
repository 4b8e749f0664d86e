use super::MeetingSource;
use crate::error::{AppError, AppResult};
use crate::models::{parse_feed, CreateMeetingRequest, MeetingId, MeetingRecord};
use crate::utils;
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use tokio::sync::RwLock;

/// In-memory meeting source, seeded from a JSON file or explicit records.
///
/// Created meetings are appended with a millisecond-timestamp id; uploaded
/// selfies are counted and discarded.
#[derive(Debug, Default)]
pub struct FixtureSource {
    meetings: RwLock<Vec<MeetingRecord>>,
    uploads: RwLock<Vec<String>>,
}

impl FixtureSource {
    pub fn new(meetings: Vec<MeetingRecord>) -> Self {
        Self {
            meetings: RwLock::new(meetings),
            uploads: RwLock::new(Vec::new()),
        }
    }

    /// A single placeholder meeting in downtown San Francisco.
    pub fn default_seed() -> Vec<MeetingRecord> {
        vec![MeetingRecord::new(1, "Default Meeting", "This is a default meeting for testing.")
            .with_location(37.7749, -122.4194)]
    }

    pub fn with_default_seed() -> Self {
        Self::new(Self::default_seed())
    }

    pub async fn from_file(path: &Path) -> AppResult<Self> {
        let body = tokio::fs::read_to_string(path).await?;
        let meetings = parse_feed(&body)
            .map_err(|e| AppError::invalid_input(format!("Fixture {} is not a meetings array: {}", path.display(), e)))?;
        log::info!("Loaded {} meetings from fixture {}", meetings.len(), path.display());
        Ok(Self::new(meetings))
    }

    pub async fn uploaded_files(&self) -> Vec<String> {
        self.uploads.read().await.clone()
    }
}

#[async_trait]
impl MeetingSource for FixtureSource {
    async fn fetch_meetings(&self) -> AppResult<Vec<MeetingRecord>> {
        Ok(self.meetings.read().await.clone())
    }

    async fn create_meeting(&self, request: CreateMeetingRequest) -> AppResult<MeetingRecord> {
        let mut meetings = self.meetings.write().await;

        let mut id = utils::millis_id(Utc::now());
        while meetings.iter().any(|m| m.id == MeetingId::Int(id)) {
            id += 1;
        }

        let meeting = MeetingRecord::new(id, &request.title, &request.description)
            .with_location(request.latitude, request.longitude);
        meetings.push(meeting.clone());
        Ok(meeting)
    }

    async fn upload_selfie(&self, file_name: String, image: Vec<u8>) -> AppResult<()> {
        if image.is_empty() {
            return Err(AppError::invalid_input("Selfie image is empty"));
        }
        self.uploads.write().await.push(file_name);
        Ok(())
    }
}
