// Chart series domain models
use super::observation::Observation;
use super::topic::Topic;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Plottable points of one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub topic_id: i64,
    pub name: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(topic_id: i64, name: String, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            topic_id,
            name,
            points,
        }
    }

    /// Group observations into one series per topic, in first-seen order.
    /// Readings that are not numbers are left out.
    pub fn group(observations: &[Observation], topics: &[Topic]) -> Vec<SeriesData> {
        let mut series: Vec<SeriesData> = Vec::new();
        for o in observations {
            let Some(value) = o.value() else {
                tracing::debug!(
                    "Skipping non-numeric value {:?} for topic {}",
                    o.value_string,
                    o.topic_id
                );
                continue;
            };
            let point = TimeSeriesPoint::new(o.timestamp.and_utc().timestamp_millis(), value);
            match series.iter_mut().find(|s| s.topic_id == o.topic_id) {
                Some(existing) => existing.points.push(point),
                None => {
                    let name = topics
                        .iter()
                        .find(|t| t.topic_id == o.topic_id)
                        .map(|t| t.topic_name.clone())
                        .unwrap_or_else(|| format!("topic {}", o.topic_id));
                    series.push(SeriesData::new(o.topic_id, name, vec![point]));
                }
            }
        }
        series
    }
}
