// Repository trait for telemetry data access
use crate::domain::{Observation, Topic, TopicMetadata};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List all known topics, ordered by id
    async fn list_topics(&self) -> anyhow::Result<Vec<Topic>>;

    /// List every metadata entry
    async fn list_metadata(&self) -> anyhow::Result<Vec<TopicMetadata>>;

    async fn earliest_timestamp(&self) -> anyhow::Result<Option<NaiveDateTime>>;

    async fn latest_timestamp(&self) -> anyhow::Result<Option<NaiveDateTime>>;

    /// Distinct calendar dates that have at least one observation, ascending
    async fn list_data_dates(&self) -> anyhow::Result<Vec<NaiveDate>>;

    /// Observations of `topic_ids` within `[start, end]`, ordered by timestamp
    async fn query_data(
        &self,
        topic_ids: &[i64],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<Observation>>;
}
