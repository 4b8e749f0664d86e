use super::coordinate::UserCoordinate;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Raw add-meeting form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
}

/// Body of `POST /meetings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewMeeting {
    pub fn new(title: &str, description: &str, latitude: &str, longitude: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self) -> AppResult<CreateMeetingRequest> {
        let title = self.title.trim();
        let description = self.description.trim();
        let latitude = self.latitude.trim();
        let longitude = self.longitude.trim();

        if title.is_empty() || description.is_empty() || latitude.is_empty() || longitude.is_empty() {
            return Err(AppError::invalid_input("Please fill out all fields"));
        }

        let latitude = latitude
            .parse::<f64>()
            .map_err(|_| AppError::invalid_input(format!("Latitude '{}' is not a number", latitude)))?;
        let longitude = longitude
            .parse::<f64>()
            .map_err(|_| AppError::invalid_input(format!("Longitude '{}' is not a number", longitude)))?;
        // Feed records use 0 to mean "no location", so the map would never show it.
        if latitude == 0.0 || longitude == 0.0 {
            return Err(AppError::invalid_input("Latitude and longitude cannot be 0"));
        }
        let location = UserCoordinate::new(latitude, longitude)?;

        Ok(CreateMeetingRequest {
            title: title.to_string(),
            description: description.to_string(),
            latitude: location.latitude(),
            longitude: location.longitude(),
        })
    }
}
