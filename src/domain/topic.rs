// Topic domain model

/// A named telemetry channel, e.g. "UW/Maple/eaton_meter/freq".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub topic_id: i64,
    pub topic_name: String,
}

impl Topic {
    pub fn new(topic_id: i64, topic_name: impl Into<String>) -> Self {
        Self {
            topic_id,
            topic_name: topic_name.into(),
        }
    }

    /// Meter portion of the name ("UW/Maple/eaton_meter" for ".../freq").
    pub fn meter(&self) -> &str {
        self.topic_name
            .rsplit_once('/')
            .map(|(meter, _)| meter)
            .unwrap_or(&self.topic_name)
    }

    /// Metric portion of the name ("freq" for "UW/Maple/eaton_meter/freq").
    pub fn metric(&self) -> &str {
        self.topic_name
            .rsplit_once('/')
            .map(|(_, metric)| metric)
            .unwrap_or(&self.topic_name)
    }
}

/// Free-text metadata attached to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMetadata {
    pub topic_id: i64,
    pub metadata: String,
}

impl TopicMetadata {
    pub fn new(topic_id: i64, metadata: impl Into<String>) -> Self {
        Self {
            topic_id,
            metadata: metadata.into(),
        }
    }
}
