// Topic service - Use cases for the topic catalog and stored data range
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::{Topic, TopicMetadata};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

#[derive(Clone)]
pub struct TopicService {
    repository: Arc<dyn TelemetryRepository>,
}

impl TopicService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_topics(&self) -> anyhow::Result<Vec<Topic>> {
        self.repository.list_topics().await
    }

    pub async fn list_metadata(&self) -> anyhow::Result<Vec<TopicMetadata>> {
        self.repository.list_metadata().await
    }

    pub async fn earliest(&self) -> anyhow::Result<Option<NaiveDateTime>> {
        self.repository.earliest_timestamp().await
    }

    pub async fn latest(&self) -> anyhow::Result<Option<NaiveDateTime>> {
        self.repository.latest_timestamp().await
    }

    pub async fn list_data_dates(&self) -> anyhow::Result<Vec<NaiveDate>> {
        self.repository.list_data_dates().await
    }
}
