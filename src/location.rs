//! Device position lookup
//!
//! Real devices plug in a platform location service; the crate ships a
//! fixed-position provider used by the CLI and tests.

use crate::error::{AppError, AppResult};
use crate::models::UserCoordinate;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current position, resolved once per screen activation.
    async fn current_position(&self) -> AppResult<UserCoordinate>;
}

/// Always reports the same position, or "unavailable" when none is configured.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    position: Option<UserCoordinate>,
}

impl FixedLocation {
    pub fn new(position: UserCoordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn unavailable() -> Self {
        Self { position: None }
    }

    pub fn from_option(position: Option<UserCoordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> AppResult<UserCoordinate> {
        self.position
            .ok_or_else(|| AppError::location("No position configured; set MEETING_FINDER_ORIGIN"))
    }
}
