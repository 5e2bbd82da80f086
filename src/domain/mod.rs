// Domain layer - Core telemetry types and the downsampler
pub mod downsample;
pub mod error;
pub mod granularity;
pub mod observation;
pub mod query;
pub mod sample_rate;
pub mod series;
pub mod topic;

pub use downsample::{downsample, downsample_by_topic, retain_random, Policy};
pub use error::DomainError;
pub use granularity::Granularity;
pub use observation::Observation;
pub use query::{DataQuery, TimestampBounds};
pub use sample_rate::SampleRate;
pub use series::{SeriesData, TimeSeriesPoint};
pub use topic::{Topic, TopicMetadata};
