// Sample data - Synthetic sinusoidal readings and the default topic catalog
use crate::domain::observation::parse_timestamp;
use crate::domain::{DomainError, Observation, Topic};
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// One sample every 100 seconds.
pub const DEFAULT_SAMPLE_RATE: f64 = 0.01;
/// One day, in seconds.
pub const DEFAULT_PERIOD: i64 = 86_400;
pub const DEFAULT_AMPLITUDE_COS: f64 = 0.0;
pub const DEFAULT_AMPLITUDE_SIN: f64 = 0.0;
pub const DEFAULT_AMPLITUDE_OFFSET: f64 = 0.0;
pub const DEFAULT_SPREAD: f64 = 0.05;

static SITES: [(&str, &str); 4] = [
    ("Alder", "eaton_meter"),
    ("Elm", "eaton_meter"),
    ("Maple", "eaton_meter"),
    ("Mercer", "nexus_meter"),
];

// Ids of the first site; each later site is shifted by the number of metrics.
static METRICS: [(&str, i64); 21] = [
    ("Angle_I_A", 8),
    ("Angle_I_B", 11),
    ("Angle_I_C", 5),
    ("Angle_V_AN", 20),
    ("Angle_V_BN", 21),
    ("Angle_V_CN", 19),
    ("Current_N", 15),
    ("freq", 17),
    ("pf", 12),
    ("pf_A", 10),
    ("pf_B", 9),
    ("pf_C", 13),
    ("VA", 1),
    ("VAR", 16),
    ("Voltage_AN", 3),
    ("Voltage_BN", 7),
    ("Voltage_CN", 4),
    ("W", 14),
    ("W_A", 2),
    ("W_B", 18),
    ("W_C", 6),
];

/// The UW solar installation's topics, ordered by id.
pub fn default_topics() -> Vec<Topic> {
    let mut topics: Vec<Topic> = SITES
        .iter()
        .enumerate()
        .flat_map(|(site_idx, (site, meter))| {
            METRICS.iter().map(move |(metric, base_id)| {
                Topic::new(
                    base_id + site_idx as i64 * METRICS.len() as i64,
                    format!("UW/{}/{}/{}", site, meter, metric),
                )
            })
        })
        .collect();
    topics.sort_by_key(|t| t.topic_id);
    topics
}

/// Command-line values that replace the corresponding field of every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub topic_id: Option<i64>,
    pub sample_rate: Option<f64>,
    pub spread: Option<f64>,
}

/// One entry of a generation file, as written by hand.
#[derive(Debug, Deserialize)]
struct GenerationEntry {
    start: Option<String>,
    end: Option<String>,
    topic_id: Option<i64>,
    sample_rate: Option<f64>,
    period: Option<i64>,
    amplitude_cos: Option<f64>,
    amplitude_sin: Option<f64>,
    amplitude_offset: Option<f64>,
    spread: Option<f64>,
}

/// Parameters of one generated range:
/// `offset + cos_amp * cos(wt) + sin_amp * sin(wt) + uniform(-spread, spread)`
/// with `w = 2 * pi / period` and `t` in seconds since `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub topic_id: i64,
    /// Samples per second.
    pub sample_rate: f64,
    /// Seconds.
    pub period: i64,
    pub amplitude_cos: f64,
    pub amplitude_sin: f64,
    pub amplitude_offset: f64,
    pub spread: f64,
}

impl GenerationOptions {
    /// Options for `[start, end)` on `topic_id` with every other field defaulted.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, topic_id: i64) -> Self {
        Self {
            start,
            end,
            topic_id,
            sample_rate: DEFAULT_SAMPLE_RATE,
            period: DEFAULT_PERIOD,
            amplitude_cos: DEFAULT_AMPLITUDE_COS,
            amplitude_sin: DEFAULT_AMPLITUDE_SIN,
            amplitude_offset: DEFAULT_AMPLITUDE_OFFSET,
            spread: DEFAULT_SPREAD,
        }
    }

    fn from_entry(entry: GenerationEntry, overrides: &Overrides) -> Result<Self, DomainError> {
        let start = entry
            .start
            .ok_or_else(|| DomainError::invalid("start", "is required"))?;
        let end = entry
            .end
            .ok_or_else(|| DomainError::invalid("end", "is required"))?;
        let topic_id = overrides
            .topic_id
            .or(entry.topic_id)
            .ok_or_else(|| DomainError::invalid("topic_id", "is required"))?;

        let options = Self {
            start: parse_timestamp("start", &start)?,
            end: parse_timestamp("end", &end)?,
            topic_id,
            sample_rate: overrides
                .sample_rate
                .or(entry.sample_rate)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            period: entry.period.unwrap_or(DEFAULT_PERIOD),
            amplitude_cos: entry.amplitude_cos.unwrap_or(DEFAULT_AMPLITUDE_COS),
            amplitude_sin: entry.amplitude_sin.unwrap_or(DEFAULT_AMPLITUDE_SIN),
            amplitude_offset: entry.amplitude_offset.unwrap_or(DEFAULT_AMPLITUDE_OFFSET),
            spread: overrides.spread.or(entry.spread).unwrap_or(DEFAULT_SPREAD),
        };
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.start > self.end {
            return Err(DomainError::invalid("end", "must not be before start"));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(DomainError::invalid(
                "sample_rate",
                format!("{} is not a positive number of samples per second", self.sample_rate),
            ));
        }
        if self.period <= 0 {
            return Err(DomainError::invalid("period", "must be a positive number of seconds"));
        }
        if !self.spread.is_finite() || self.spread < 0.0 {
            return Err(DomainError::invalid("spread", "must be zero or positive"));
        }
        Ok(())
    }

    /// Number of readings generated over `[start, end)`.
    pub fn sample_count(&self) -> usize {
        let seconds = (self.end - self.start).num_milliseconds() as f64 / 1000.0;
        (seconds * self.sample_rate).floor() as usize
    }

    fn value_at<R: Rng + ?Sized>(&self, ts: NaiveDateTime, rng: &mut R) -> f64 {
        let omega = 2.0 * PI / self.period as f64;
        let x = omega * (ts - self.start).num_milliseconds() as f64 / 1000.0;
        let fuzz = if self.spread > 0.0 {
            rng.gen_range(-self.spread..=self.spread)
        } else {
            0.0
        };
        self.amplitude_offset + self.amplitude_cos * x.cos() + self.amplitude_sin * x.sin() + fuzz
    }
}

/// Parse a JSON list of generation entries.
///
/// Every entry needs `start` and `end`, and a `topic_id` unless one is
/// overridden; the remaining fields fall back to the defaults above.
pub fn parse_options(json: &str, overrides: &Overrides) -> anyhow::Result<Vec<GenerationOptions>> {
    let entries: Vec<GenerationEntry> = serde_json::from_str(json)?;
    let options = entries
        .into_iter()
        .map(|entry| GenerationOptions::from_entry(entry, overrides))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(options)
}

/// Generate readings for every range. Ranges that overlap on the same topic
/// and timestamp add up.
pub fn generate<R: Rng + ?Sized>(options: &[GenerationOptions], rng: &mut R) -> Vec<Observation> {
    let mut values: BTreeMap<(NaiveDateTime, i64), f64> = BTreeMap::new();
    for o in options {
        let step_us = 1_000_000.0 / o.sample_rate;
        for i in 0..o.sample_count() {
            let ts = o.start + Duration::microseconds((i as f64 * step_us).round() as i64);
            *values.entry((ts, o.topic_id)).or_insert(0.0) += o.value_at(ts, rng);
        }
        tracing::debug!("Generated {} readings for topic {}", o.sample_count(), o.topic_id);
    }

    values
        .into_iter()
        .map(|((ts, topic_id), value)| Observation::new(ts, topic_id, value.to_string()))
        .collect()
}
