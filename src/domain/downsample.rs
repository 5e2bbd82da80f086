// Temporal downsampling of observation sequences
use super::granularity::Granularity;
use super::observation::Observation;
use super::sample_rate::SampleRate;
use chrono::NaiveDateTime;
use rand::Rng;
use std::collections::HashMap;

/// How to thin a series before charting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Keep at most one observation per calendar bucket.
    Granularity(Granularity),
    /// Keep an evenly spaced fraction of the observations.
    SampleRate(SampleRate),
}

impl From<Granularity> for Policy {
    fn from(g: Granularity) -> Self {
        Policy::Granularity(g)
    }
}

impl From<SampleRate> for Policy {
    fn from(r: SampleRate) -> Self {
        Policy::SampleRate(r)
    }
}

/// Reduce `observations` according to `policy`.
///
/// Input is expected to be sorted by timestamp. With a granularity, the first
/// observation is always kept and each later one is kept only if it lands in a
/// strictly later bucket than the last kept one; anything in the same or an
/// earlier bucket is dropped. With a sample rate, exactly `ceil(n * r)`
/// observations are kept, spread evenly and starting with the first.
pub fn downsample(observations: &[Observation], policy: Policy) -> Vec<Observation> {
    let mask = keep_mask(policy, observations);
    observations
        .iter()
        .zip(mask)
        .filter(|(_, keep)| *keep)
        .map(|(o, _)| o.clone())
        .collect()
}

/// Like [`downsample`], but each topic's subsequence is thinned on its own.
/// The result keeps the original interleaving of topics.
pub fn downsample_by_topic(observations: &[Observation], policy: Policy) -> Vec<Observation> {
    let mut by_topic: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, o) in observations.iter().enumerate() {
        by_topic.entry(o.topic_id).or_default().push(idx);
    }

    let mut keep = vec![false; observations.len()];
    for indices in by_topic.values() {
        let mask = keep_mask(policy, indices.iter().map(|&idx| &observations[idx]));
        for (&idx, kept) in indices.iter().zip(mask) {
            keep[idx] = kept;
        }
    }

    observations
        .iter()
        .zip(keep)
        .filter(|(_, kept)| *kept)
        .map(|(o, _)| o.clone())
        .collect()
}

/// Keep each observation independently with probability `rate`.
pub fn retain_random<R: Rng + ?Sized>(
    observations: Vec<Observation>,
    rate: SampleRate,
    rng: &mut R,
) -> Vec<Observation> {
    if rate.keeps_everything() {
        return observations;
    }
    if rate.keeps_nothing() {
        return Vec::new();
    }
    observations
        .into_iter()
        .filter(|_| rng.gen_bool(rate.value()))
        .collect()
}

fn keep_mask<'a, I>(policy: Policy, observations: I) -> Vec<bool>
where
    I: IntoIterator<Item = &'a Observation>,
{
    match policy {
        Policy::Granularity(g) => {
            let mut last: Option<NaiveDateTime> = None;
            observations
                .into_iter()
                .map(|o| match last {
                    Some(prev) if g.is_same_or_before(&o.timestamp, &prev) => false,
                    _ => {
                        last = Some(o.timestamp);
                        true
                    }
                })
                .collect()
        }
        Policy::SampleRate(r) => {
            let rate = r.value();
            // ceil((i + 1) * r) - ceil(i * r) telescopes to ceil(n * r).
            observations
                .into_iter()
                .enumerate()
                .map(|(i, _)| ((i + 1) as f64 * rate).ceil() > (i as f64 * rate).ceil())
                .collect()
        }
    }
}
