use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct UserCoordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for UserCoordinate {
    type Error = AppError;

    fn try_from(raw: RawCoordinate) -> AppResult<Self> {
        UserCoordinate::new(raw.latitude, raw.longitude)
    }
}

impl UserCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(AppError::invalid_input("Coordinates must be finite numbers"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::invalid_input(format!(
                "Latitude {} is outside -90..90",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::invalid_input(format!(
                "Longitude {} is outside -180..180",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for UserCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"`.
impl FromStr for UserCoordinate {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| AppError::invalid_input(format!("Expected 'lat,lon', got '{}'", s)))?;

        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::invalid_input(format!("Latitude '{}' is not a number", lat.trim())))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::invalid_input(format!("Longitude '{}' is not a number", lon.trim())))?;

        UserCoordinate::new(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_range() {
        assert!(UserCoordinate::new(37.7749, -122.4194).is_ok());
        assert!(UserCoordinate::new(90.0, 180.0).is_ok());
        assert!(UserCoordinate::new(90.1, 0.0).is_err());
        assert!(UserCoordinate::new(0.0, -180.5).is_err());
        assert!(UserCoordinate::new(f64::NAN, 0.0).is_err());
        assert!(UserCoordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_from_str() {
        let coord: UserCoordinate = " 37.7749 , -122.4194 ".parse().unwrap();
        assert_eq!(coord.latitude(), 37.7749);
        assert_eq!(coord.longitude(), -122.4194);

        assert!("37.7749".parse::<UserCoordinate>().is_err());
        assert!("abc,1".parse::<UserCoordinate>().is_err());
        assert!("95,1".parse::<UserCoordinate>().is_err());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let ok: UserCoordinate = serde_json::from_str(r#"{"latitude": 1.5, "longitude": 2.5}"#).unwrap();
        assert_eq!(ok.latitude(), 1.5);

        let bad = serde_json::from_str::<UserCoordinate>(r#"{"latitude": 100, "longitude": 2.5}"#);
        assert!(bad.is_err());
    }
}
