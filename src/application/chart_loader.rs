// Chart loader - Fetches series for display and drops superseded responses
use crate::domain::{downsample_by_topic, DataQuery, Observation, SeriesData, TimestampBounds, Topic};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Where chart data comes from (the HTTP API in production).
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn topics(&self) -> anyhow::Result<Vec<Topic>>;

    async fn bounds(&self) -> anyhow::Result<TimestampBounds>;

    async fn data(&self, query: &DataQuery) -> anyhow::Result<Vec<Observation>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Hands out increasing tickets; only the most recent one is current.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: AtomicU64,
}

impl FetchSequencer {
    pub fn issue(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

pub struct ChartLoader {
    source: Arc<dyn TelemetrySource>,
    sequencer: FetchSequencer,
}

impl ChartLoader {
    pub fn new(source: Arc<dyn TelemetrySource>) -> Self {
        Self {
            source,
            sequencer: FetchSequencer::default(),
        }
    }

    /// Topic catalog and stored bounds, fetched together.
    pub async fn catalog(&self) -> anyhow::Result<(Vec<Topic>, TimestampBounds)> {
        futures::try_join!(self.source.topics(), self.source.bounds())
    }

    /// Fetch and thin a query for display.
    ///
    /// Returns `Ok(None)` when another `load` was started after this one, so a
    /// slow response (or a slow failure) never replaces a newer one.
    pub async fn load(
        &self,
        query: &DataQuery,
        topics: &[Topic],
    ) -> anyhow::Result<Option<Vec<SeriesData>>> {
        let ticket = self.sequencer.issue();
        let fetched = self.source.data(query).await;

        // A superseded load yields nothing, even when its fetch failed.
        if !self.sequencer.is_current(ticket) {
            tracing::debug!("Discarding stale response for {:?}", ticket);
            return Ok(None);
        }

        let rows = fetched?;

        let rows = match query.granularity {
            Some(g) => downsample_by_topic(&rows, g.into()),
            None => rows,
        };
        Ok(Some(SeriesData::group(&rows, topics)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::parse_timestamp;
    use crate::domain::{Granularity, SampleRate};
    use chrono::NaiveDateTime;
    use tokio::sync::Notify;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp("ts", s).unwrap()
    }

    /// Serves fixed rows; queries for topic 1 block until released and
    /// queries for topic 3 fail once released.
    struct GatedSource {
        rows: Vec<Observation>,
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl TelemetrySource for GatedSource {
        async fn topics(&self) -> anyhow::Result<Vec<Topic>> {
            Ok(vec![Topic::new(1, "UW/Maple/pf"), Topic::new(2, "UW/Maple/freq")])
        }

        async fn bounds(&self) -> anyhow::Result<TimestampBounds> {
            Ok(TimestampBounds {
                earliest: self.rows.first().map(|o| o.timestamp),
                latest: self.rows.last().map(|o| o.timestamp),
            })
        }

        async fn data(&self, query: &DataQuery) -> anyhow::Result<Vec<Observation>> {
            if query.topic_ids.contains(&1) || query.topic_ids.contains(&3) {
                self.started.notify_one();
                self.release.notified().await;
            }
            if query.topic_ids.contains(&3) {
                anyhow::bail!("topic 3 is unavailable");
            }
            Ok(self
                .rows
                .iter()
                .filter(|o| query.topic_ids.contains(&o.topic_id))
                .cloned()
                .collect())
        }
    }

    fn source() -> Arc<GatedSource> {
        let rows = vec![
            Observation::new(at("2018-01-01T00:00:00"), 1, "1"),
            Observation::new(at("2018-01-01T00:00:10"), 2, "60.01"),
            Observation::new(at("2018-01-01T00:00:20"), 2, "59.99"),
            Observation::new(at("2018-01-01T00:01:00"), 2, "60.02"),
        ];
        Arc::new(GatedSource {
            rows,
            started: Notify::new(),
            release: Notify::new(),
        })
    }

    fn query(topic_ids: Vec<i64>, granularity: Option<Granularity>) -> DataQuery {
        DataQuery::new(
            topic_ids,
            at("2018-01-01T00:00:00"),
            at("2018-01-02T00:00:00"),
            SampleRate::ALL,
            granularity,
        )
        .unwrap()
    }

    #[test]
    fn test_sequencer_tracks_latest_ticket() {
        let sequencer = FetchSequencer::default();
        let first = sequencer.issue();
        assert!(sequencer.is_current(first));
        let second = sequencer.issue();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[tokio::test]
    async fn test_catalog() {
        let loader = ChartLoader::new(source());
        let (topics, bounds) = loader.catalog().await.unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(bounds.earliest, Some(at("2018-01-01T00:00:00")));
        assert_eq!(bounds.latest, Some(at("2018-01-01T00:01:00")));
    }

    #[tokio::test]
    async fn test_load_applies_granularity() {
        let source = source();
        let loader = ChartLoader::new(source.clone());
        let topics = source.topics().await.unwrap();

        let series = loader
            .load(&query(vec![2], Some(Granularity::Minute)), &topics)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "UW/Maple/freq");
        let values: Vec<f64> = series[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![60.01, 60.02]);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let source = source();
        let loader = Arc::new(ChartLoader::new(source.clone()));
        let topics = source.topics().await.unwrap();

        let slow = tokio::spawn({
            let loader = loader.clone();
            let topics = topics.clone();
            async move { loader.load(&query(vec![1], None), &topics).await }
        });
        source.started.notified().await;

        let fresh = loader.load(&query(vec![2], None), &topics).await.unwrap();
        assert!(fresh.is_some());

        source.release.notify_one();
        let stale = slow.await.unwrap().unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_when_current() {
        let source = source();
        let loader = ChartLoader::new(source.clone());
        let topics = source.topics().await.unwrap();

        source.release.notify_one();
        let result = loader.load(&query(vec![3], None), &topics).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_superseded_failure_is_discarded() {
        let source = source();
        let loader = Arc::new(ChartLoader::new(source.clone()));
        let topics = source.topics().await.unwrap();

        let failing = tokio::spawn({
            let loader = loader.clone();
            let topics = topics.clone();
            async move { loader.load(&query(vec![3], None), &topics).await }
        });
        source.started.notified().await;

        let fresh = loader.load(&query(vec![2], None), &topics).await.unwrap();
        assert!(fresh.is_some());

        source.release.notify_one();
        let stale = failing.await.unwrap().unwrap();
        assert!(stale.is_none());
    }
}
