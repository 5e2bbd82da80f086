// Series service - Use case for ranged data queries
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::{downsample_by_topic, retain_random, DataQuery, Observation};
use std::sync::Arc;

#[derive(Clone)]
pub struct SeriesService {
    repository: Arc<dyn TelemetryRepository>,
}

impl SeriesService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    /// Fetch the query's range, keep each row with probability `sample_rate`,
    /// then thin every topic to one row per bucket if a granularity was given.
    pub async fn query(&self, query: &DataQuery) -> anyhow::Result<Vec<Observation>> {
        if query.topic_ids.is_empty() || query.sample_rate.keeps_nothing() {
            return Ok(Vec::new());
        }

        let rows = self
            .repository
            .query_data(&query.topic_ids, query.start, query.end)
            .await?;
        let fetched = rows.len();

        let sampled = retain_random(rows, query.sample_rate, &mut rand::thread_rng());
        let sampled_len = sampled.len();

        let result = match query.granularity {
            Some(g) => downsample_by_topic(&sampled, g.into()),
            None => sampled,
        };

        tracing::debug!(
            "Data query for topics {:?}: fetched={}, sampled={}, returned={}",
            query.topic_ids,
            fetched,
            sampled_len,
            result.len()
        );

        Ok(result)
    }
}
