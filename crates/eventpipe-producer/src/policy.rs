/// Whether a message is an error or a transaction — the dimension the
/// random-partitioning policy is keyed on in addition to project id
/// (SPEC_FULL.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Transaction,
}

/// The two runtime policies consulted per-event (SPEC_FULL.md §6). The
/// policy service itself is external (§1); this trait is the injected
/// collaborator the producer calls through, per §9's "treat as injected
/// collaborators" instruction. `StaticPolicy` is a test/default double.
pub trait Policy: Send + Sync {
    /// `send-project-transactions-to-new-topic`.
    fn use_new_transactions_topic(&self, project_id: i64) -> bool;
    /// `send-project-events-to-random-partitions`.
    fn use_random_partitioning(&self, project_id: i64, kind: MessageKind) -> bool;
}

/// A policy that always answers the same way for every project —
/// suitable for tests and for deployments that haven't wired a real
/// policy service (both answers default to the conservative/stable
/// choice: old topic, semantic partitioning).
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPolicy {
    pub new_transactions_topic: bool,
    pub random_partitioning: bool,
}

impl Policy for StaticPolicy {
    fn use_new_transactions_topic(&self, _project_id: i64) -> bool {
        self.new_transactions_topic
    }

    fn use_random_partitioning(&self, _project_id: i64, _kind: MessageKind) -> bool {
        self.random_partitioning
    }
}
