// HTTP request handlers
use crate::domain::observation::parse_timestamp;
use crate::domain::{DataQuery, DomainError, Granularity, SampleRate};
use crate::infrastructure::json_codec::{
    date_to_wire, timestamp_to_wire, MetadataWire, ObservationWire, TopicWire,
};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub topic_ids: Option<String>,
    /// Single-topic form accepted by older clients.
    pub topic_id: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub sample_rate: Option<String>,
    pub granularity: Option<String>,
}

impl DataParams {
    pub fn into_query(self, default_sample_rate: SampleRate) -> Result<DataQuery, DomainError> {
        let ids = self.topic_ids.or(self.topic_id).unwrap_or_default();
        let topic_ids = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<i64>().map_err(|_| {
                    DomainError::invalid("topic_ids", format!("'{}' is not a topic id", id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let start = required(self.start_date_time, "start_date_time")?;
        let end = required(self.end_date_time, "end_date_time")?;

        let sample_rate = match self.sample_rate {
            Some(rate) => rate.parse::<SampleRate>()?,
            None => default_sample_rate,
        };
        let granularity = self
            .granularity
            .filter(|g| !g.trim().is_empty())
            .map(|g| g.parse::<Granularity>())
            .transpose()?;

        DataQuery::new(topic_ids, start, end, sample_rate, granularity)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<chrono::NaiveDateTime, DomainError> {
    match value {
        Some(v) => parse_timestamp(field, &v),
        None => Err(DomainError::invalid(field, "is required")),
    }
}

/// Health check endpoint
pub async fn ping() -> &'static str {
    "ok"
}

pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TopicWire>>, ApiError> {
    let topics = state.topic_service.list_topics().await?;
    Ok(Json(topics.into_iter().map(TopicWire::from).collect()))
}

pub async fn list_metadata(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MetadataWire>>, ApiError> {
    let metadata = state.topic_service.list_metadata().await?;
    Ok(Json(metadata.into_iter().map(MetadataWire::from).collect()))
}

/// Earliest stored timestamp, or null when there is no data
pub async fn earliest_timestamp(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<String>>, ApiError> {
    let earliest = state.topic_service.earliest().await?;
    Ok(Json(timestamp_to_wire(earliest)))
}

/// Latest stored timestamp, or null when there is no data
pub async fn latest_timestamp(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<String>>, ApiError> {
    let latest = state.topic_service.latest().await?;
    Ok(Json(timestamp_to_wire(latest)))
}

/// Dates with any data. Scans the whole table.
pub async fn list_data_dates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let dates = state.topic_service.list_data_dates().await?;
    Ok(Json(dates.into_iter().map(date_to_wire).collect()))
}

pub async fn get_data(
    Query(params): Query<DataParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ObservationWire>>, ApiError> {
    let query = params.into_query(state.default_sample_rate)?;
    let rows = state.series_service.query(&query).await?;
    Ok(Json(rows.into_iter().map(ObservationWire::from).collect()))
}
