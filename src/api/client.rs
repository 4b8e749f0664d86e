use super::MeetingSource;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::http_config::HttpConfig;
use crate::models::{parse_feed, CreateMeetingRequest, MeetingRecord, UploadResponse};
use crate::utils::circuit_breaker::{CircuitBreakerRegistry, CircuitBreakerStats, MEETING_API, SELFIE_UPLOAD};
use crate::utils::logging;
use crate::utils::retry::retry_with_exponential_backoff;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Client for the meetings REST API.
#[derive(Debug, Clone)]
pub struct MeetingApiClient {
    base_url: Url,
    http: Client,
    upload_http: Client,
    api_config: HttpConfig,
    upload_config: HttpConfig,
    breakers: Arc<CircuitBreakerRegistry>,
}

impl MeetingApiClient {
    pub fn new(base_url: &str) -> AppResult<Self> {
        Self::with_http_config(base_url, HttpConfig::meeting_api(), HttpConfig::upload())
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let base_url = config.base_url()?;
        Self::with_http_config(base_url.as_str(), HttpConfig::meeting_api(), HttpConfig::upload())
    }

    pub fn with_http_config(base_url: &str, api_config: HttpConfig, upload_config: HttpConfig) -> AppResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http: api_config.build_client()?,
            upload_http: upload_config.build_client()?,
            api_config,
            upload_config,
            breakers: Arc::new(CircuitBreakerRegistry::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    pub async fn circuit_stats(&self) -> HashMap<String, CircuitBreakerStats> {
        self.breakers.get_all_stats().await
    }

    async fn get_meetings_once(&self, url: &Url) -> AppResult<Vec<MeetingRecord>> {
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body = error_for_status(response).await?.text().await?;
        Ok(parse_feed(&body)?)
    }

    async fn create_meeting_once(&self, url: &Url, request: &CreateMeetingRequest) -> AppResult<MeetingRecord> {
        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;
        Ok(error_for_status(response).await?.json::<MeetingRecord>().await?)
    }

    async fn upload_selfie_once(&self, url: &Url, file_name: &str, image: &[u8]) -> AppResult<()> {
        let part = Part::bytes(image.to_vec())
            .file_name(file_name.to_string())
            .mime_str(image_mime_type(file_name))?;
        let form = Form::new().part("selfie", part);

        let response = self.upload_http.post(url.clone()).multipart(form).send().await?;
        let status = response.status().as_u16();
        let response = error_for_status(response).await?;
        let body = response.text().await?;

        if body.trim().is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(UploadResponse { error: Some(message) }) => Err(AppError::api(status, message)),
            Ok(_) => Ok(()),
            Err(e) => {
                log::warn!("Upload succeeded with unexpected response body: {}", e);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MeetingSource for MeetingApiClient {
    async fn fetch_meetings(&self) -> AppResult<Vec<MeetingRecord>> {
        let url = self.endpoint("meetings")?;
        let started = Instant::now();
        log::info!("Fetching meetings from {}", url);

        let breaker = self.breakers.get_breaker(MEETING_API).await;
        let retry = self.api_config.to_retry_config();
        let result = breaker
            .execute(|| retry_with_exponential_backoff(&retry, || self.get_meetings_once(&url)))
            .await;

        match &result {
            Ok(meetings) => log::info!(
                "Fetched {} meetings in {}ms",
                meetings.len(),
                started.elapsed().as_millis()
            ),
            Err(e) => logging::log_network_error("GET /meetings", e),
        }
        result
    }

    async fn create_meeting(&self, request: CreateMeetingRequest) -> AppResult<MeetingRecord> {
        let url = self.endpoint("meetings")?;
        log::info!("Creating meeting '{}'", request.title);

        // POST /meetings is not idempotent, so it gets a single attempt.
        let breaker = self.breakers.get_breaker(MEETING_API).await;
        let result = breaker.execute(|| self.create_meeting_once(&url, &request)).await;

        match &result {
            Ok(meeting) => log::info!("Created meeting {}", meeting.id),
            Err(e) => logging::log_network_error("POST /meetings", e),
        }
        result
    }

    async fn upload_selfie(&self, file_name: String, image: Vec<u8>) -> AppResult<()> {
        if image.is_empty() {
            return Err(AppError::invalid_input("Selfie image is empty"));
        }

        let url = self.endpoint("upload_selfie")?;
        log::info!("Uploading selfie '{}' ({} bytes)", file_name, image.len());

        let breaker = self.breakers.get_breaker(SELFIE_UPLOAD).await;
        let retry = self.upload_config.to_retry_config();
        let result = breaker
            .execute(|| {
                retry_with_exponential_backoff(&retry, || self.upload_selfie_once(&url, &file_name, &image))
            })
            .await;

        if let Err(e) = &result {
            logging::log_network_error("POST /upload_selfie", e);
        }
        result
    }
}

/// Turns a non-2xx response into `AppError::Api`, preferring the server's
/// `{"error": ...}` message over the raw body.
async fn error_for_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    let message = serde_json::from_str::<UploadResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });

    Err(AppError::api(status.as_u16(), message))
}

pub fn image_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "heic" => "image/heic",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
