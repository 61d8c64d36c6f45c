use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("malformed change event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("booking fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("synchronizer stopped abnormally: {0}")]
    Closed(String),
}
