use std::sync::Arc;
use std::time::Duration;

use eventpipe_protocol::{encode_body, encode_headers, InsertPayload};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use tracing::{error, warn};

use crate::error::DeliveryError;
use crate::policy::{MessageKind, Policy};
use crate::topics::TopicConfig;

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub brokers: String,
    pub topics: TopicConfig,
    /// `eventstream.kafka-headers` — global toggle for emitting the full
    /// header set on insert (SPEC_FULL.md §6).
    pub headers_mode: bool,
    /// How long a synchronous publish waits for delivery confirmation.
    pub delivery_timeout: Duration,
}

impl ProducerConfig {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topics: TopicConfig::default(),
            headers_mode: true,
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

/// Publishes per-event messages onto the errors/transactions topics with
/// project-stable partitioning (SPEC_FULL.md §4.2). One `FutureProducer`
/// backs all topics this instance routes to — matching §5's "one
/// delivery client per topic [family]" when a deployment runs one
/// `Producer` per logical topic group.
pub struct Producer {
    client: FutureProducer,
    config: ProducerConfig,
    policy: Arc<dyn Policy>,
}

impl Producer {
    pub fn new(config: ProducerConfig, policy: Arc<dyn Policy>) -> Result<Self, rdkafka::error::KafkaError> {
        let client: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "30000")
            .create()?;
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    /// `publish(project_id, operation="insert", extra_data, is_transaction,
    /// asynchronous, headers, skip_semantic_partitioning)` restricted to
    /// the `insert` operation, which is the "primary value" per
    /// SPEC_FULL.md §3 and the only one the core publishes as ordinary
    /// event traffic.
    pub async fn publish_insert(
        &self,
        payload: InsertPayload,
        is_transaction: bool,
        asynchronous: bool,
        skip_semantic_partitioning: bool,
    ) {
        let topic = self.select_topic(payload.project_id, is_transaction);
        let skip_partitioning = skip_semantic_partitioning
            || (is_transaction
                && self
                    .policy
                    .use_random_partitioning(payload.project_id, MessageKind::Transaction));

        let key = if skip_partitioning {
            None
        } else {
            Some(payload.project_id.to_string())
        };

        let value = encode_body(&payload);
        let headers = if self.config.headers_mode {
            Some(encode_headers(&payload))
        } else {
            None
        };

        self.send(&topic, key, value, headers, asynchronous).await;
    }

    fn select_topic(&self, project_id: i64, is_transaction: bool) -> String {
        if !is_transaction {
            return self.config.topics.errors_topic.clone();
        }
        if self.policy.use_new_transactions_topic(project_id) {
            self.config.topics.transactions_new_topic.clone()
        } else {
            self.config.topics.transactions_topic.clone()
        }
    }

    async fn send(
        &self,
        topic: &str,
        key: Option<String>,
        value: Vec<u8>,
        headers: Option<eventpipe_protocol::MessageHeaders>,
        asynchronous: bool,
    ) {
        let rd_headers = headers.map(to_rdkafka_headers);

        if asynchronous {
            // Fire-and-forget: the delivery future is driven to
            // completion on its own task so `publish` returns
            // immediately; failures are logged, never propagated
            // (SPEC_FULL.md §4.2/§7 — correctness is downstream's job).
            let client = self.client.clone();
            let topic = topic.to_owned();
            tokio::spawn(async move {
                send_owned(&client, topic, key, value, rd_headers).await;
            });
        } else {
            let mut record: FutureRecord<'_, String, Vec<u8>> = FutureRecord::to(topic).payload(&value);
            if let Some(k) = &key {
                record = record.key(k);
            }
            if let Some(h) = rd_headers {
                record = record.headers(h);
            }
            match self.client.send(record, self.config.delivery_timeout).await {
                Ok(_) => {}
                Err((err, _owned_msg)) => {
                    let delivery_err = DeliveryError::Kafka(err.to_string());
                    error!(topic, error = %delivery_err, "publish delivery failed");
                }
            }
        }
    }
}

async fn send_owned(
    client: &FutureProducer,
    topic: String,
    key: Option<String>,
    value: Vec<u8>,
    headers: Option<rdkafka::message::OwnedHeaders>,
) {
    let mut record: FutureRecord<'_, String, Vec<u8>> = FutureRecord::to(&topic).payload(&value);
    if let Some(k) = &key {
        record = record.key(k);
    }
    if let Some(h) = headers {
        record = record.headers(h);
    }
    match client.send(record, Duration::from_secs(30)).await {
        Ok(_) => {}
        Err((err, _owned_msg)) => {
            warn!(topic, error = %err, "async publish delivery failed");
        }
    }
}

fn to_rdkafka_headers(headers: eventpipe_protocol::MessageHeaders) -> rdkafka::message::OwnedHeaders {
    let mut owned = rdkafka::message::OwnedHeaders::new();
    for (key, value) in headers.iter() {
        owned = owned.insert(rdkafka::message::Header {
            key,
            value: Some(value),
        });
    }
    owned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StaticPolicy;

    fn producer_with_policy(policy: StaticPolicy) -> Producer {
        let config = ProducerConfig::new("localhost:9092");
        Producer::new(config, Arc::new(policy)).expect("construct producer without connecting")
    }

    #[test]
    fn errors_always_go_to_the_errors_topic() {
        let p = producer_with_policy(StaticPolicy {
            new_transactions_topic: true,
            random_partitioning: true,
        });
        assert_eq!(p.select_topic(1, false), "events");
    }

    #[test]
    fn transactions_follow_the_new_topic_policy() {
        let stable = producer_with_policy(StaticPolicy::default());
        assert_eq!(stable.select_topic(1, true), "transactions");

        let migrated = producer_with_policy(StaticPolicy {
            new_transactions_topic: true,
            random_partitioning: false,
        });
        assert_eq!(migrated.select_topic(1, true), "transactions-new");
    }
}
