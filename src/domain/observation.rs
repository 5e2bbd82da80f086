// Observation domain model
use super::error::{DomainError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One reading of a topic at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub topic_id: i64,
    pub value_string: String,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, topic_id: i64, value_string: impl Into<String>) -> Self {
        Self {
            timestamp,
            topic_id,
            value_string: value_string.into(),
        }
    }

    /// The reading as a number, if it parses as one.
    pub fn value(&self) -> Option<f64> {
        self.value_string.trim().parse::<f64>().ok()
    }
}

/// Render a timestamp the way the API emits it ("2018-01-01T00:00:00.100").
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(ISO_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp into naive UTC.
///
/// Accepts RFC 3339 with an offset (converted to UTC), a naive date-time with
/// either `T` or a space separator, or a bare date (midnight).
pub fn parse_timestamp(field: &'static str, input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, ISO_FORMAT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(DomainError::invalid(
        field,
        format!("'{}' is not an ISO-8601 timestamp", input),
    ))
}
