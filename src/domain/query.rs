// Query parameter value objects
use super::error::{DomainError, Result};
use super::granularity::Granularity;
use super::sample_rate::SampleRate;
use chrono::NaiveDateTime;

/// Parameters of a ranged data query. The range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQuery {
    pub topic_ids: Vec<i64>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub sample_rate: SampleRate,
    pub granularity: Option<Granularity>,
}

impl DataQuery {
    pub fn new(
        topic_ids: Vec<i64>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        sample_rate: SampleRate,
        granularity: Option<Granularity>,
    ) -> Result<Self> {
        if start > end {
            return Err(DomainError::invalid(
                "end_date_time",
                "end of range precedes its start",
            ));
        }
        Ok(Self {
            topic_ids,
            start,
            end,
            sample_rate,
            granularity,
        })
    }
}

/// Earliest and latest stored timestamps; both absent when nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampBounds {
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::parse_timestamp;

    #[test]
    fn test_rejects_inverted_range() {
        let start = parse_timestamp("ts", "2018-01-02T00:00:00").unwrap();
        let end = parse_timestamp("ts", "2018-01-01T00:00:00").unwrap();
        let err = DataQuery::new(vec![1], start, end, SampleRate::ALL, None).unwrap_err();
        assert_eq!(err.field(), "end_date_time");
    }

    #[test]
    fn test_accepts_empty_range() {
        let at = parse_timestamp("ts", "2018-01-01T00:00:00").unwrap();
        let query = DataQuery::new(vec![1, 2], at, at, SampleRate::ALL, Some(Granularity::Hour));
        assert!(query.is_ok());
    }
}
