/// The three known topics a producer can route to (SPEC_FULL.md §6): the
/// stable errors topic, the stable transactions topic, and the
/// migration-destination transactions topic.
#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub errors_topic: String,
    pub transactions_topic: String,
    pub transactions_new_topic: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            errors_topic: "events".to_owned(),
            transactions_topic: "transactions".to_owned(),
            transactions_new_topic: "transactions-new".to_owned(),
        }
    }
}
