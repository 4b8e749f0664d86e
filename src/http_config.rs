//! HTTP client configuration module
//!
//! Timeouts and retry policy for the meetings API client.

use crate::error::AppResult;
use crate::utils::retry::RetryConfig;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const USER_AGENT: &str = concat!("MeetingFinder/", env!("CARGO_PKG_VERSION"));

/// Timeouts and retry policy for one kind of request.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    /// Whole request, body included
    pub timeout: Duration,
    /// Attempts per request, first try included
    pub max_retries: u32,
    pub base_retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(45),
            max_retries: 3,
            base_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl HttpConfig {
    /// Profile for `GET`/`POST /meetings`: small JSON payloads, fail fast.
    pub fn meeting_api() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }

    /// Profile for selfie uploads: larger bodies over mobile links.
    pub fn upload() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            base_retry_delay: Duration::from_millis(2000),
            max_retry_delay: Duration::from_secs(30),
            backoff_multiplier: 1.5,
        }
    }

    pub fn build_client(&self) -> AppResult<Client> {
        Ok(ClientBuilder::new()
            .user_agent(USER_AGENT)
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .pool_max_idle_per_host(2)
            .build()?)
    }

    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries,
            base_delay: self.base_retry_delay,
            max_delay: self.max_retry_delay,
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_mirrors_http_config() {
        let config = HttpConfig::upload();
        let retry = config.to_retry_config();
        assert_eq!(retry.max_attempts, 2);
        assert_eq!(retry.base_delay, Duration::from_millis(2000));
        assert_eq!(retry.backoff_multiplier, 1.5);
    }

    #[test]
    fn test_build_client() {
        assert!(HttpConfig::meeting_api().build_client().is_ok());
    }
}
