use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("kafka client error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error(transparent)]
    Harness(#[from] eventpipe_batch::HarnessError),
}
