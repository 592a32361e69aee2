use clap::Parser;
use eventpipe_consumer::InitialOffsetReset;

use crate::classify::Entity;

/// `(entity, default topic)` fallback table consulted when `--topic` is
/// absent (SPEC_FULL.md §6.1).
pub const DEFAULT_TOPIC: [(Entity, &str); 3] = [
    (Entity::All, "events"),
    (Entity::Errors, "events"),
    (Entity::Transactions, "transactions"),
];

fn default_topic_for(entity: Entity) -> &'static str {
    DEFAULT_TOPIC
        .iter()
        .find(|(e, _)| *e == entity)
        .map(|(_, topic)| *topic)
        .expect("DEFAULT_TOPIC covers every Entity variant")
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OffsetReset {
    Latest,
    Earliest,
}

impl From<OffsetReset> for InitialOffsetReset {
    fn from(value: OffsetReset) -> Self {
        match value {
            OffsetReset::Latest => InitialOffsetReset::Latest,
            OffsetReset::Earliest => InitialOffsetReset::Earliest,
        }
    }
}

/// Forwarder CLI surface, exactly the flags enumerated in SPEC_FULL.md §6
/// plus the ambient `--config`/`--log-level` pair.
#[derive(Debug, Parser)]
#[command(name = "forwarder", about = "Consumes the event stream and dispatches post-process tasks")]
pub struct Args {
    /// Which classification variant this process runs as.
    #[arg(long, value_enum)]
    pub entity: Entity,

    #[arg(long)]
    pub consumer_group: String,

    /// Falls back to `entity`'s default topic when absent.
    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long)]
    pub commit_log_topic: String,

    #[arg(long)]
    pub synchronize_commit_group: String,

    #[arg(long, default_value_t = 1000)]
    pub commit_batch_size: usize,

    #[arg(long, default_value_t = 1000)]
    pub commit_batch_timeout_ms: u64,

    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    #[arg(long, value_enum, default_value = "earliest")]
    pub initial_offset_reset: OffsetReset,

    #[arg(long, default_value = "forwarder.toml")]
    pub config: String,

    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Resolves `--topic`, logging once when the entity's default is used
    /// (SPEC_FULL.md §6.1).
    pub fn resolved_topic(&self) -> String {
        match &self.topic {
            Some(topic) => topic.clone(),
            None => {
                let topic = default_topic_for(self.entity);
                tracing::info!(topic, entity = %self.entity, "using default topic for entity");
                topic.to_owned()
            }
        }
    }

    /// The all-variant precondition from SPEC_FULL.md §9/§6.1: dispatching
    /// both error and transaction events through one topic is an operator
    /// responsibility this binary cannot verify. Only warns; never blocks
    /// startup or inspects topic contents.
    pub fn check_all_variant_precondition(&self, resolved_topic: &str) {
        if self.entity != Entity::All {
            return;
        }
        let known_defaults: Vec<&str> = DEFAULT_TOPIC.iter().map(|(_, t)| *t).collect();
        if !known_defaults.contains(&resolved_topic) {
            tracing::warn!(
                topic = resolved_topic,
                "entity=all assumes errors and transactions flow through the same topic; \
                 this cannot be statically verified for a non-default topic name"
            );
        }
    }
}
