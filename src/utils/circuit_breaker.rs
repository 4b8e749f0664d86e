use crate::error::{AppError, AppResult};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const MEETING_API: &str = "meeting_api";
pub const SELFIE_UPLOAD: &str = "selfie_upload";

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn for_service(service_name: &str) -> Self {
        match service_name {
            MEETING_API => Self {
                failure_threshold: 5,
                success_threshold: 2,
                timeout: Duration::from_secs(30),
            },
            SELFIE_UPLOAD => Self {
                failure_threshold: 3,
                success_threshold: 1,
                timeout: Duration::from_secs(60),
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
    /// Start of the trial call currently running in the half-open state
    probe_started: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: RwLock<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            inner: RwLock::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_time: None,
                probe_started: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn execute<F, T, Fut>(&self, operation: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = AppResult<T>>,
    {
        {
            let mut inner = self.inner.write().await;
            match inner.state {
                CircuitState::Closed => {}
                CircuitState::Open => {
                    let timed_out = inner
                        .last_failure_time
                        .map(|failure_time| failure_time.elapsed() > self.config.timeout)
                        .unwrap_or(false);

                    if !timed_out {
                        return Err(AppError::CircuitOpen(self.name.clone()));
                    }

                    inner.state = CircuitState::HalfOpen;
                    inner.success_count = 0;
                    inner.probe_started = Some(Instant::now());
                    info!("Circuit breaker '{}' transitioning to half-open after timeout", self.name);
                }
                CircuitState::HalfOpen => {
                    // One trial call at a time; a stuck one is abandoned after the timeout.
                    let probe_running = inner
                        .probe_started
                        .map(|started| started.elapsed() <= self.config.timeout)
                        .unwrap_or(false);

                    if probe_running {
                        return Err(AppError::CircuitOpen(self.name.clone()));
                    }
                    inner.probe_started = Some(Instant::now());
                }
            }
        }

        let result = operation().await;

        match &result {
            Ok(_) => self.on_success().await,
            // Client-side mistakes say nothing about the health of the service.
            Err(e) if e.is_transient() => self.on_failure().await,
            Err(_) => self.inner.write().await.probe_started = None,
        }

        result
    }

    async fn on_success(&self) {
        let mut inner = self.inner.write().await;
        inner.probe_started = None;

        match inner.state {
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    info!(
                        "Circuit breaker '{}' closing after {} successful calls",
                        self.name, inner.success_count
                    );
                }
            }
            CircuitState::Closed | CircuitState::Open => {
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
            }
        }
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.write().await;
        inner.probe_started = None;

        inner.failure_count += 1;
        inner.last_failure_time = Some(Instant::now());

        let trips = match inner.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => inner.failure_count >= self.config.failure_threshold,
            CircuitState::Open => false,
        };

        if trips {
            inner.state = CircuitState::Open;
            warn!("Circuit breaker '{}' opening after {} failures", self.name, inner.failure_count);
        }
    }

    pub async fn get_state(&self) -> CircuitState {
        self.inner.read().await.state
    }

    pub async fn get_stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.read().await;
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            last_failure_time: inner.last_failure_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_time: Option<Instant>,
}

/// Per-client set of breakers, one per remote service.
#[derive(Debug, Default)]
pub struct CircuitBreakerRegistry {
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_breaker(&self, service_name: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.read().await.get(service_name) {
            return breaker.clone();
        }

        let mut breakers = self.breakers.write().await;
        breakers
            .entry(service_name.to_string())
            .or_insert_with(|| {
                info!("Created circuit breaker for service: {}", service_name);
                Arc::new(CircuitBreaker::new(
                    service_name,
                    CircuitBreakerConfig::for_service(service_name),
                ))
            })
            .clone()
    }

    pub async fn get_all_stats(&self) -> HashMap<String, CircuitBreakerStats> {
        let breakers = self.breakers.read().await;
        let mut stats = HashMap::new();

        for (service_name, breaker) in breakers.iter() {
            stats.insert(service_name.clone(), breaker.get_stats().await);
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn test_breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 2,
                success_threshold: 1,
                timeout: Duration::from_millis(50),
            },
        )
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_on_failures() {
        let breaker = test_breaker();

        let result: AppResult<&str> = breaker.execute(|| async { Err(AppError::api(503, "down")) }).await;
        assert!(result.is_err());
        assert_eq!(breaker.get_state().await, CircuitState::Closed);

        let result: AppResult<&str> = breaker.execute(|| async { Err(AppError::api(503, "down")) }).await;
        assert!(result.is_err());
        assert_eq!(breaker.get_state().await, CircuitState::Open);

        let result = breaker.execute(|| async { Ok("success") }).await;
        assert!(matches!(result, Err(AppError::CircuitOpen(name)) if name == "test"));
    }

    #[tokio::test]
    async fn test_client_errors_do_not_trip_breaker() {
        let breaker = test_breaker();

        for _ in 0..5 {
            let _: AppResult<()> = breaker
                .execute(|| async { Err(AppError::invalid_input("bad form")) })
                .await;
        }

        assert_eq!(breaker.get_state().await, CircuitState::Closed);
        assert_eq!(breaker.get_stats().await.failure_count, 0);
    }

    #[tokio::test]
    async fn test_circuit_breaker_half_open_state() {
        let breaker = test_breaker();

        for _ in 0..2 {
            let _: AppResult<&str> = breaker.execute(|| async { Err(AppError::api(502, "bad gateway")) }).await;
        }
        assert_eq!(breaker.get_state().await, CircuitState::Open);

        sleep(Duration::from_millis(60)).await;

        let result = breaker.execute(|| async { Ok("success") }).await;
        assert!(result.is_ok());
        assert_eq!(breaker.get_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_admits_one_trial_call() {
        let breaker = CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 1,
                success_threshold: 2,
                timeout: Duration::from_millis(50),
            },
        );

        let _: AppResult<()> = breaker.execute(|| async { Err(AppError::api(503, "down")) }).await;
        assert_eq!(breaker.get_state().await, CircuitState::Open);
        sleep(Duration::from_millis(60)).await;

        let (trial, concurrent) = tokio::join!(
            breaker.execute(|| async {
                sleep(Duration::from_millis(20)).await;
                Ok("trial")
            }),
            breaker.execute(|| async { Ok("concurrent") }),
        );

        assert_eq!(trial.unwrap(), "trial");
        assert!(matches!(concurrent, Err(AppError::CircuitOpen(_))));
        assert_eq!(breaker.get_state().await, CircuitState::HalfOpen);

        // The next trial is admitted once the first has finished.
        assert!(breaker.execute(|| async { Ok("second") }).await.is_ok());
        assert_eq!(breaker.get_state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_registry_reuses_breakers() {
        let registry = CircuitBreakerRegistry::new();
        let first = registry.get_breaker(MEETING_API).await;
        let second = registry.get_breaker(MEETING_API).await;
        assert!(Arc::ptr_eq(&first, &second));

        registry.get_breaker(SELFIE_UPLOAD).await;
        let stats = registry.get_all_stats().await;
        assert_eq!(stats.len(), 2);
    }
}
