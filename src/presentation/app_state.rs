// Application state for HTTP handlers
use crate::application::series_service::SeriesService;
use crate::application::topic_service::TopicService;
use crate::domain::SampleRate;

#[derive(Clone)]
pub struct AppState {
    pub topic_service: TopicService,
    pub series_service: SeriesService,
    /// Used when a data request has no `sample_rate`.
    pub default_sample_rate: SampleRate,
}
