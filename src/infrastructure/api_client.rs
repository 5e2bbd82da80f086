// HTTP client for the telemetry API
use crate::application::chart_loader::TelemetrySource;
use crate::domain::observation::format_timestamp;
use crate::domain::{DataQuery, Observation, TimestampBounds, Topic};
use crate::infrastructure::json_codec::{timestamp_from_wire, ObservationWire, TopicWire};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/_/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .query(params)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to /_/{}", path))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("/_/{} failed with status {}: {}", path, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse /_/{} response", path))
    }

    pub async fn earliest(&self) -> Result<Option<chrono::NaiveDateTime>> {
        let ts: Option<String> = self.get_json("data/timestamp/earliest", &[]).await?;
        Ok(timestamp_from_wire(ts)?)
    }

    pub async fn latest(&self) -> Result<Option<chrono::NaiveDateTime>> {
        let ts: Option<String> = self.get_json("data/timestamp/latest", &[]).await?;
        Ok(timestamp_from_wire(ts)?)
    }
}

#[async_trait]
impl TelemetrySource for ApiClient {
    async fn topics(&self) -> Result<Vec<Topic>> {
        let topics: Vec<TopicWire> = self.get_json("topics", &[]).await?;
        Ok(topics.into_iter().map(Topic::from).collect())
    }

    async fn bounds(&self) -> Result<TimestampBounds> {
        let (earliest, latest) = futures::try_join!(self.earliest(), self.latest())?;
        Ok(TimestampBounds { earliest, latest })
    }

    async fn data(&self, query: &DataQuery) -> Result<Vec<Observation>> {
        let topic_ids = query
            .topic_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        // Granularity is applied locally, so the server returns every sampled row.
        let mut params = vec![
            ("topic_ids", topic_ids),
            ("start_date_time", format_timestamp(&query.start)),
            ("end_date_time", format_timestamp(&query.end)),
            ("sample_rate", query.sample_rate.to_string()),
        ];
        params.retain(|(_, v)| !v.is_empty());

        let rows: Vec<ObservationWire> = self.get_json("data", &params).await?;
        rows.into_iter()
            .map(|wire| Observation::try_from(wire).context("Malformed observation in response"))
            .collect()
    }
}
