use std::collections::{HashMap, VecDeque};

use eventpipe_batch::TopicPartition;

use crate::state::{Offsets, PartitionState};

/// Pure pause/resume bookkeeping for the synchronized consumer
/// (SPEC_FULL.md §4.3/§4.3.1), kept free of `rdkafka` so the pacing
/// invariant can be property-tested without a broker. The
/// `rdkafka`-backed half (`SynchronizedConsumer`) owns one of these and
/// turns its decisions into real `pause`/`resume` calls.
pub struct Pacer {
    offsets: HashMap<TopicPartition, Offsets>,
    state: HashMap<TopicPartition, PartitionState>,
    backlog: HashMap<TopicPartition, VecDeque<i64>>,
    backlog_capacity: usize,
}

impl Pacer {
    pub fn new(backlog_capacity: usize) -> Self {
        Self {
            offsets: HashMap::new(),
            state: HashMap::new(),
            backlog: HashMap::new(),
            backlog_capacity,
        }
    }

    /// Assignment: the partition starts PAUSED with an unknown remote
    /// offset; any commit-log records buffered for it while unassigned
    /// are drained immediately.
    pub fn assign(&mut self, partition: TopicPartition, local_offset: i64) {
        let mut offsets = Offsets {
            local: local_offset,
            remote: None,
        };
        if let Some(backlog) = self.backlog.remove(&partition) {
            if let Some(&last) = backlog.back() {
                offsets.remote = Some(last);
            }
        }
        self.offsets.insert(partition.clone(), offsets);
        self.state.insert(partition, PartitionState::Paused);
    }

    /// Revocation: state is discarded entirely (SPEC_FULL.md §4.3).
    pub fn revoke(&mut self, partition: &TopicPartition) {
        self.offsets.remove(partition);
        self.state.remove(partition);
    }

    /// A commit-log record was observed for `partition` at `commit_offset`
    /// (the offset committed by the upstream group, i.e. the first
    /// offset the data consumer is cleared to read up to). If the
    /// partition is not currently assigned, the record is retained in a
    /// bounded ring so a racing assignment can recover it.
    pub fn observe_commit(&mut self, partition: TopicPartition, commit_offset: i64) {
        match self.offsets.get_mut(&partition) {
            Some(offsets) => {
                offsets.remote = Some(offsets.remote.map_or(commit_offset, |r| r.max(commit_offset)));
            }
            None => {
                let ring = self.backlog.entry(partition).or_default();
                ring.push_back(commit_offset);
                while ring.len() > self.backlog_capacity {
                    ring.pop_front();
                }
            }
        }
    }

    /// A message was delivered and will be processed at `offset`; the
    /// local cursor advances to the next offset to fetch.
    pub fn advance_local(&mut self, partition: &TopicPartition, offset: i64) {
        if let Some(offsets) = self.offsets.get_mut(partition) {
            offsets.local = offset + 1;
        }
    }

    /// Recomputes pause/resume state for every assigned partition
    /// (SPEC_FULL.md §4.3 step 2) and returns only the partitions whose
    /// state flipped this cycle, so the caller issues the minimum
    /// number of broker calls (§4.3.1).
    pub fn reconcile(&mut self) -> Vec<(TopicPartition, PartitionState)> {
        let mut changed = Vec::new();
        for (partition, offsets) in &self.offsets {
            let current = self.state.get(partition).copied().unwrap_or(PartitionState::Paused);
            let next = if offsets.may_run() {
                PartitionState::Running
            } else {
                PartitionState::Paused
            };
            if next != current {
                changed.push((partition.clone(), next));
            }
        }
        for (partition, next) in &changed {
            self.state.insert(partition.clone(), *next);
        }
        changed
    }

    pub fn is_running(&self, partition: &TopicPartition) -> bool {
        matches!(self.state.get(partition), Some(PartitionState::Running))
    }

    pub fn running_partitions(&self) -> Vec<TopicPartition> {
        self.state
            .iter()
            .filter(|(_, s)| **s == PartitionState::Running)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(partition: i32) -> TopicPartition {
        TopicPartition::new("events", partition)
    }

    #[test]
    fn assigned_partition_starts_paused() {
        let mut pacer = Pacer::new(16);
        pacer.assign(tp(0), 0);
        assert!(!pacer.is_running(&tp(0)));
    }

    #[test]
    fn resumes_once_remote_overtakes_local() {
        let mut pacer = Pacer::new(16);
        pacer.assign(tp(0), 10);
        pacer.observe_commit(tp(0), 11);
        let changed = pacer.reconcile();
        assert_eq!(changed, vec![(tp(0), PartitionState::Running)]);
        assert!(pacer.is_running(&tp(0)));
    }

    #[test]
    fn pauses_again_once_local_catches_up() {
        let mut pacer = Pacer::new(16);
        pacer.assign(tp(0), 10);
        pacer.observe_commit(tp(0), 12);
        pacer.reconcile();
        assert!(pacer.is_running(&tp(0)));

        pacer.advance_local(&tp(0), 10);
        pacer.advance_local(&tp(0), 11);
        let changed = pacer.reconcile();
        assert_eq!(changed, vec![(tp(0), PartitionState::Paused)]);
    }

    #[test]
    fn reconcile_is_quiet_when_nothing_flipped() {
        let mut pacer = Pacer::new(16);
        pacer.assign(tp(0), 0);
        assert!(pacer.reconcile().is_empty());
    }

    #[test]
    fn backlog_for_unassigned_partition_is_replayed_on_assignment() {
        let mut pacer = Pacer::new(16);
        pacer.observe_commit(tp(1), 5);
        pacer.observe_commit(tp(1), 9);
        pacer.assign(tp(1), 3);
        let changed = pacer.reconcile();
        assert_eq!(changed, vec![(tp(1), PartitionState::Running)]);
    }

    /// P5: replaying a buffered commit-log offset must preserve the same
    /// `local < remote` semantics as the live `observe_commit` path — the
    /// commit-log offset is "the first offset upstream has not yet
    /// consumed" (commit_log.rs), so the replayed remote must be that
    /// offset itself, not `offset + 1`, or the data consumer would be
    /// cleared to fetch an event upstream never acknowledged.
    #[test]
    fn backlog_replay_does_not_overshoot_remote_offset() {
        let mut pacer = Pacer::new(16);
        pacer.observe_commit(tp(1), 9);
        pacer.assign(tp(1), 9);
        // local (9) == replayed remote (9): may_run is false, so the
        // partition must stay paused, not resume and fetch offset 9.
        let changed = pacer.reconcile();
        assert!(changed.is_empty());
        assert!(!pacer.is_running(&tp(1)));
    }

    #[test]
    fn backlog_capacity_is_bounded() {
        let mut pacer = Pacer::new(2);
        pacer.observe_commit(tp(2), 1);
        pacer.observe_commit(tp(2), 2);
        pacer.observe_commit(tp(2), 3);
        pacer.assign(tp(2), 0);
        // Oldest entry (1) was evicted; only offset 3 (the latest) survives,
        // so remote = 3.
        let changed = pacer.reconcile();
        assert_eq!(changed, vec![(tp(2), PartitionState::Running)]);
    }

    #[test]
    fn revoke_discards_all_state() {
        let mut pacer = Pacer::new(16);
        pacer.assign(tp(0), 0);
        pacer.observe_commit(tp(0), 1);
        pacer.reconcile();
        pacer.revoke(&tp(0));
        assert!(!pacer.is_running(&tp(0)));
        assert!(pacer.running_partitions().is_empty());
    }

    /// Synchronized invariant (P5): local_offset never exceeds the last
    /// observed remote_offset by more than the in-flight delivery.
    #[test]
    fn local_never_outpaces_remote() {
        let mut pacer = Pacer::new(16);
        pacer.assign(tp(0), 0);
        for remote in [2, 4, 6, 8] {
            pacer.observe_commit(tp(0), remote);
            pacer.reconcile();
            while pacer.is_running(&tp(0)) {
                let local = pacer.offsets[&tp(0)].local;
                if local >= remote {
                    break;
                }
                pacer.advance_local(&tp(0), local);
                pacer.reconcile();
            }
            assert!(pacer.offsets[&tp(0)].local <= remote);
        }
    }
}
