// SQLite repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::{Observation, Topic, TopicMetadata};
use crate::infrastructure::config::DatabaseSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SqlRepository {
    pool: SqlitePool,
}

impl SqlRepository {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        // Ensure the database file's directory exists
        if let Some(path) = settings.url.strip_prefix("sqlite:") {
            let path = path.trim_start_matches("//");
            let path = path.split('?').next().unwrap_or(path);
            if !path.is_empty() && !path.contains(":memory:") {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create {}", parent.display())
                        })?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("Invalid database url {}", settings.url))?
            .create_if_missing(true);

        // Every connection to :memory: opens its own empty database.
        let pool_options = if settings.url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to open database")?;

        Ok(Self { pool })
    }

    /// Create the `topics`, `data` and `meta` tables if they are missing.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topics (
                topic_id INTEGER PRIMARY KEY,
                topic_name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Timestamps are stored as "YYYY-MM-DD HH:MM:SS[.fff]" text, which
        // sorts chronologically.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data (
                ts TEXT NOT NULL,
                topic_id INTEGER NOT NULL,
                value_string TEXT NOT NULL,
                PRIMARY KEY (ts, topic_id, value_string)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                topic_id INTEGER NOT NULL,
                metadata TEXT NOT NULL,
                PRIMARY KEY (topic_id, metadata)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_data_topic_id ON data(topic_id)")
            .execute(&self.pool)
            .await?;

        tracing::debug!("Database schema is up to date");
        Ok(())
    }

    pub async fn insert_topic(&self, topic: &Topic) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO topics (topic_id, topic_name) VALUES (?, ?)")
            .bind(topic.topic_id)
            .bind(&topic.topic_name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert topic {}", topic.topic_id))?;
        Ok(())
    }

    pub async fn insert_metadata(&self, metadata: &TopicMetadata) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO meta (topic_id, metadata) VALUES (?, ?)")
            .bind(metadata.topic_id)
            .bind(&metadata.metadata)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert metadata for topic {}", metadata.topic_id))?;
        Ok(())
    }

    pub async fn insert_observations(&self, observations: &[Observation]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for o in observations {
            sqlx::query("INSERT OR IGNORE INTO data (ts, topic_id, value_string) VALUES (?, ?, ?)")
                .bind(o.timestamp)
                .bind(o.topic_id)
                .bind(&o.value_string)
                .execute(&mut *tx)
                .await
                .context("Failed to insert observation")?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl TelemetryRepository for SqlRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>> {
        let rows = sqlx::query("SELECT topic_id, topic_name FROM topics ORDER BY topic_id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list topics")?;

        rows.iter()
            .map(|row| -> Result<Topic> {
                Ok(Topic::new(
                    row.try_get::<i64, _>("topic_id")?,
                    row.try_get::<String, _>("topic_name")?,
                ))
            })
            .collect()
    }

    async fn list_metadata(&self) -> Result<Vec<TopicMetadata>> {
        let rows = sqlx::query("SELECT topic_id, metadata FROM meta ORDER BY topic_id, metadata")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list metadata")?;

        rows.iter()
            .map(|row| -> Result<TopicMetadata> {
                Ok(TopicMetadata::new(
                    row.try_get::<i64, _>("topic_id")?,
                    row.try_get::<String, _>("metadata")?,
                ))
            })
            .collect()
    }

    async fn earliest_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        sqlx::query_scalar::<_, Option<NaiveDateTime>>("SELECT MIN(ts) FROM data")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read earliest timestamp")
    }

    async fn latest_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        sqlx::query_scalar::<_, Option<NaiveDateTime>>("SELECT MAX(ts) FROM data")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read latest timestamp")
    }

    async fn list_data_dates(&self) -> Result<Vec<NaiveDate>> {
        let days: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT date(ts) AS day FROM data ORDER BY day")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list data dates")?;

        days.iter()
            .map(|day| {
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .with_context(|| format!("Unexpected date {} in data table", day))
            })
            .collect()
    }

    async fn query_data(
        &self,
        topic_ids: &[i64],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Observation>> {
        if topic_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT ts, topic_id, value_string FROM data WHERE ts >= ");
        builder.push_bind(start);
        builder.push(" AND ts <= ");
        builder.push_bind(end);
        builder.push(" AND topic_id IN (");
        let mut ids = builder.separated(", ");
        for id in topic_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
        builder.push(" ORDER BY ts, topic_id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query data")?;

        tracing::debug!(
            "Fetched {} rows for topics {:?} between {} and {}",
            rows.len(),
            topic_ids,
            start,
            end
        );

        rows.iter()
            .map(|row| -> Result<Observation> {
                Ok(Observation::new(
                    row.try_get::<NaiveDateTime, _>("ts")?,
                    row.try_get::<i64, _>("topic_id")?,
                    row.try_get::<String, _>("value_string")?,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::parse_timestamp;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp("ts", s).unwrap()
    }

    async fn repository() -> SqlRepository {
        let settings = DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 3,
        };
        let repo = SqlRepository::connect(&settings).await.unwrap();
        repo.migrate().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_empty_store() {
        let repo = repository().await;
        assert!(repo.list_topics().await.unwrap().is_empty());
        assert!(repo.list_metadata().await.unwrap().is_empty());
        assert_eq!(repo.earliest_timestamp().await.unwrap(), None);
        assert_eq!(repo.latest_timestamp().await.unwrap(), None);
        assert!(repo.list_data_dates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_topics_and_metadata() {
        let repo = repository().await;
        repo.insert_topic(&Topic::new(18, "Sample Topic")).await.unwrap();
        repo.insert_topic(&Topic::new(3, "UW/Maple/eaton_meter/freq")).await.unwrap();
        repo.insert_metadata(&TopicMetadata::new(18, "unit=kW")).await.unwrap();

        let topics = repo.list_topics().await.unwrap();
        assert_eq!(
            topics,
            vec![Topic::new(3, "UW/Maple/eaton_meter/freq"), Topic::new(18, "Sample Topic")]
        );
        assert_eq!(
            repo.list_metadata().await.unwrap(),
            vec![TopicMetadata::new(18, "unit=kW")]
        );
    }

    #[tokio::test]
    async fn test_bounds_and_dates() {
        let repo = repository().await;
        repo.insert_observations(&[
            Observation::new(at("2018-01-02T08:00:00.250"), 18, "second"),
            Observation::new(at("2018-01-01T00:00:00"), 18, "first"),
            Observation::new(at("2018-01-01T23:59:59"), 18, "late first"),
        ])
        .await
        .unwrap();

        assert_eq!(repo.earliest_timestamp().await.unwrap(), Some(at("2018-01-01T00:00:00")));
        assert_eq!(repo.latest_timestamp().await.unwrap(), Some(at("2018-01-02T08:00:00.250")));
        assert_eq!(
            repo.list_data_dates().await.unwrap(),
            vec![
                NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2018, 1, 2).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_data_filters_range_and_topics() {
        let repo = repository().await;
        let mut rows = Vec::new();
        for hour in 0..24 {
            let ts = at("2018-01-01T00:00:00") + chrono::Duration::hours(hour);
            rows.push(Observation::new(ts, 18, format!("{}", hour)));
            rows.push(Observation::new(ts, 19, "other"));
        }
        repo.insert_observations(&rows).await.unwrap();

        let result = repo
            .query_data(&[18], at("2018-01-01T11:59:00"), at("2018-01-01T23:59:00"))
            .await
            .unwrap();
        let values: Vec<String> = result.iter().map(|o| o.value_string.clone()).collect();
        let expected: Vec<String> = (12..24).map(|h| h.to_string()).collect();
        assert_eq!(values, expected);

        let both = repo
            .query_data(&[18, 19], at("2018-01-01T00:00:00"), at("2018-01-01T00:00:00"))
            .await
            .unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].topic_id, 18);
        assert_eq!(both[1].topic_id, 19);

        assert!(repo
            .query_data(&[], at("2018-01-01T00:00:00"), at("2018-01-02T00:00:00"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_query_data_keeps_millisecond_order() {
        let repo = repository().await;
        repo.insert_observations(&[
            Observation::new(at("2018-01-01T00:00:01"), 1, "c"),
            Observation::new(at("2018-01-01T00:00:00.900"), 1, "b"),
            Observation::new(at("2018-01-01T00:00:00.100"), 1, "a"),
            Observation::new(at("2018-01-01T00:00:00"), 1, "start"),
        ])
        .await
        .unwrap();

        let result = repo
            .query_data(&[1], at("2018-01-01T00:00:00"), at("2018-01-01T00:00:01"))
            .await
            .unwrap();
        let values: Vec<&str> = result.iter().map(|o| o.value_string.as_str()).collect();
        assert_eq!(values, vec!["start", "a", "b", "c"]);
        assert_eq!(result[1].timestamp, at("2018-01-01T00:00:00.100"));
    }

    #[tokio::test]
    async fn test_loads_generated_sample_data() {
        use crate::application::sample_data::{default_topics, generate, GenerationOptions};
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let repo = repository().await;
        // Seeding twice leaves one row per topic.
        for _ in 0..2 {
            for topic in default_topics() {
                repo.insert_topic(&topic).await.unwrap();
            }
        }
        let topics = repo.list_topics().await.unwrap();
        assert_eq!(topics.len(), 84);
        assert_eq!(topics[13], Topic::new(14, "UW/Alder/eaton_meter/W"));

        let options = GenerationOptions::new(at("2017-12-30T00:00:00"), at("2017-12-31T00:00:00"), 14);
        let rows = generate(&[options], &mut StdRng::seed_from_u64(5));
        assert_eq!(rows.len(), 864);
        repo.insert_observations(&rows).await.unwrap();

        assert_eq!(repo.earliest_timestamp().await.unwrap(), Some(at("2017-12-30T00:00:00")));
        assert_eq!(repo.latest_timestamp().await.unwrap(), Some(at("2017-12-30T23:58:20")));
        assert_eq!(
            repo.list_data_dates().await.unwrap(),
            vec![NaiveDate::from_ymd_opt(2017, 12, 30).unwrap()]
        );
        let stored = repo
            .query_data(&[14], at("2017-12-30T00:00:00"), at("2017-12-31T00:00:00"))
            .await
            .unwrap();
        assert_eq!(stored, rows);
    }
}
