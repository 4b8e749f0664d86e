use super::coordinate::UserCoordinate;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Meeting identifier as delivered by the API: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeetingId {
    Int(i64),
    Text(String),
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingId::Int(id) => write!(f, "{}", id),
            MeetingId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for MeetingId {
    fn from(id: i64) -> Self {
        MeetingId::Int(id)
    }
}

impl From<&str> for MeetingId {
    fn from(id: &str) -> Self {
        MeetingId::Text(id.to_string())
    }
}

/// A coordinate component that may arrive as a number, a numeric string,
/// or anything else the server decided to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
    Other(Value),
}

impl LooseNumber {
    /// Finite numeric value, if there is one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok()?,
            LooseNumber::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        LooseNumber::Number(value)
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        LooseNumber::Text(value.to_string())
    }
}

/// A timestamp field that is usually an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    Other(Value),
}

impl RawTimestamp {
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Text(s) => parse_timestamp(s),
            RawTimestamp::Other(_) => None,
        }
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        RawTimestamp::Text(value.to_string())
    }
}

/// Parses an ISO-8601 timestamp. Values without an offset are read as UTC,
/// date-only values as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: MeetingId,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<RawTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<RawTimestamp>,
}

impl MeetingRecord {
    pub fn new(id: impl Into<MeetingId>, title: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            description: description.to_string(),
            latitude: None,
            longitude: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_location(mut self, latitude: impl Into<LooseNumber>, longitude: impl Into<LooseNumber>) -> Self {
        self.latitude = Some(latitude.into());
        self.longitude = Some(longitude.into());
        self
    }

    pub fn with_schedule(mut self, start_time: &str, end_time: Option<&str>) -> Self {
        self.start_time = Some(start_time.into());
        self.end_time = end_time.map(RawTimestamp::from);
        self
    }

    /// The record's location, or `None` when either component is missing,
    /// non-numeric, zero, or out of range.
    pub fn coordinate(&self) -> Option<UserCoordinate> {
        let latitude = self.latitude.as_ref()?.as_f64()?;
        let longitude = self.longitude.as_ref()?.as_f64()?;

        // The feed uses 0 as a "no location" placeholder.
        if latitude == 0.0 || longitude == 0.0 {
            return None;
        }

        UserCoordinate::new(latitude, longitude).ok()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_ref().and_then(RawTimestamp::parse)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_ref().and_then(RawTimestamp::parse)
    }
}

/// Decodes a meetings feed, skipping elements that are not meeting-shaped.
pub fn parse_feed(body: &str) -> serde_json::Result<Vec<MeetingRecord>> {
    let items: Vec<Value> = serde_json::from_str(body)?;
    Ok(records_from_values(items))
}

pub fn records_from_values(items: Vec<Value>) -> Vec<MeetingRecord> {
    let total = items.len();
    let records: Vec<MeetingRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<MeetingRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                crate::utils::logging::log_skipped_record(index, &e);
                None
            }
        })
        .collect();

    if records.len() < total {
        log::warn!("Kept {} of {} meeting records from feed", records.len(), total);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_loose_number_parsing() {
        assert_eq!(LooseNumber::Number(37.5).as_f64(), Some(37.5));
        assert_eq!(LooseNumber::from(" -122.4 ").as_f64(), Some(-122.4));
        assert_eq!(LooseNumber::from("abc").as_f64(), None);
        assert_eq!(LooseNumber::from("").as_f64(), None);
        assert_eq!(LooseNumber::from("NaN").as_f64(), None);
        assert_eq!(LooseNumber::Other(Value::Bool(true)).as_f64(), None);
    }

    #[test]
    fn test_record_deserializes_mixed_shapes() {
        let json = r#"{
            "id": "abc-1",
            "title": "Morning Serenity",
            "latitude": "37.7749",
            "longitude": -122.4194,
            "start_time": "2024-01-02T12:00:00Z"
        }"#;
        let record: MeetingRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, MeetingId::Text("abc-1".to_string()));
        assert_eq!(record.description, "");
        let coord = record.coordinate().unwrap();
        assert_eq!(coord.latitude(), 37.7749);
        assert_eq!(coord.longitude(), -122.4194);
        assert_eq!(record.start(), Some(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()));
        assert!(record.end().is_none());
    }

    #[test]
    fn test_null_and_garbage_fields_do_not_fail_decoding() {
        let json = r#"{"id": 7, "latitude": null, "longitude": {"x": 1}, "start_time": 12345}"#;
        let record: MeetingRecord = serde_json::from_str(json).unwrap();

        assert!(record.latitude.is_none());
        assert!(record.coordinate().is_none());
        assert!(record.start().is_none());
    }

    #[test]
    fn test_null_title_becomes_empty() {
        let record: MeetingRecord = serde_json::from_str(r#"{"id": 3, "title": null}"#).unwrap();
        assert_eq!(record.title, "");
    }

    #[test]
    fn test_zero_coordinate_is_treated_as_missing() {
        let record = MeetingRecord::new(1, "Zero", "").with_location(0.0, -122.0);
        assert!(record.coordinate().is_none());
    }

    #[test]
    fn test_out_of_range_coordinate_is_rejected() {
        let record = MeetingRecord::new(1, "Nowhere", "").with_location(123.0, 45.0);
        assert!(record.coordinate().is_none());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-02T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T14:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T12:00:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-02"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("next tuesday"), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn test_parse_feed_skips_malformed_elements() {
        let body = r#"[
            {"id": 1, "title": "Kept"},
            {"title": "No id"},
            "not an object",
            {"id": "two", "title": "Also kept"}
        ]"#;
        let records = parse_feed(body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Kept");
        assert_eq!(records[1].id.to_string(), "two");
    }

    #[test]
    fn test_parse_feed_rejects_non_array() {
        assert!(parse_feed(r#"{"error": "nope"}"#).is_err());
    }
}
