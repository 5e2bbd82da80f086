// Wire encoding of domain models as compact JSON arrays
use crate::domain::observation::{format_timestamp, parse_timestamp};
use crate::domain::{DomainError, Observation, Topic, TopicMetadata};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// `[topic_id, topic_name]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicWire(pub i64, pub String);

/// `[topic_id, metadata]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataWire(pub i64, pub String);

/// `[iso_timestamp, topic_id, value_string]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationWire(pub String, pub i64, pub String);

impl From<Topic> for TopicWire {
    fn from(topic: Topic) -> Self {
        TopicWire(topic.topic_id, topic.topic_name)
    }
}

impl From<TopicWire> for Topic {
    fn from(wire: TopicWire) -> Self {
        Topic::new(wire.0, wire.1)
    }
}

impl From<TopicMetadata> for MetadataWire {
    fn from(metadata: TopicMetadata) -> Self {
        MetadataWire(metadata.topic_id, metadata.metadata)
    }
}

impl From<Observation> for ObservationWire {
    fn from(o: Observation) -> Self {
        ObservationWire(format_timestamp(&o.timestamp), o.topic_id, o.value_string)
    }
}

impl TryFrom<ObservationWire> for Observation {
    type Error = DomainError;

    fn try_from(wire: ObservationWire) -> Result<Self, Self::Error> {
        let timestamp = parse_timestamp("timestamp", &wire.0)?;
        Ok(Observation::new(timestamp, wire.1, wire.2))
    }
}

pub fn timestamp_to_wire(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(|ts| format_timestamp(&ts))
}

pub fn timestamp_from_wire(ts: Option<String>) -> Result<Option<NaiveDateTime>, DomainError> {
    ts.map(|s| parse_timestamp("timestamp", &s)).transpose()
}

pub fn date_to_wire(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_encodes_as_pair() {
        let json = serde_json::to_value(TopicWire::from(Topic::new(18, "Sample Topic"))).unwrap();
        assert_eq!(json, serde_json::json!([18, "Sample Topic"]));
    }

    #[test]
    fn test_observation_encodes_as_triple() {
        let ts = parse_timestamp("ts", "2018-01-01T00:00:00.100").unwrap();
        let json = serde_json::to_value(ObservationWire::from(Observation::new(ts, 1, "5"))).unwrap();
        assert_eq!(json, serde_json::json!(["2018-01-01T00:00:00.100", 1, "5"]));
    }

    #[test]
    fn test_observation_decodes_from_triple() {
        let wire: ObservationWire =
            serde_json::from_str(r#"["2018-01-01T00:01:15", 7, "0.98"]"#).unwrap();
        let o = Observation::try_from(wire).unwrap();
        assert_eq!(o.topic_id, 7);
        assert_eq!(o.value(), Some(0.98));
        assert_eq!(format_timestamp(&o.timestamp), "2018-01-01T00:01:15");
    }

    #[test]
    fn test_observation_with_bad_timestamp_is_rejected() {
        let wire = ObservationWire("not a time".to_string(), 1, "1".to_string());
        assert!(Observation::try_from(wire).is_err());
    }

    #[test]
    fn test_missing_timestamp_round_trips_as_none() {
        assert_eq!(timestamp_to_wire(None), None);
        assert_eq!(timestamp_from_wire(None).unwrap(), None);
    }
}
