use std::collections::HashMap;
use std::time::{Duration, Instant};

/// `(topic, partition)` identity; the unit offsets and pause/resume are
/// tracked at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl std::fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.topic, self.partition)
    }
}

/// Bounded accumulator for the batching worker harness (SPEC_FULL.md
/// §3/§4.4). Created on the first message after a flush; closed when
/// either bound is reached or on shutdown.
pub struct Batch<T> {
    items: Vec<T>,
    highest_offset: HashMap<TopicPartition, i64>,
    opened_at: Instant,
    max_count: usize,
    max_age: Duration,
}

impl<T> Batch<T> {
    pub fn new(max_count: usize, max_age: Duration) -> Self {
        Self {
            items: Vec::new(),
            highest_offset: HashMap::new(),
            opened_at: Instant::now(),
            max_count,
            max_age,
        }
    }

    pub fn push(&mut self, partition: TopicPartition, offset: i64, item: T) {
        self.items.push(item);
        self.note_offset(partition, offset);
    }

    /// Tracks a message's offset for commit purposes without adding a
    /// work item — used when `process_message` returns `None` (SPEC_FULL.md
    /// §4.5: the message contributes no work but its offset still
    /// advances on commit).
    pub fn note_offset(&mut self, partition: TopicPartition, offset: i64) {
        self.highest_offset
            .entry(partition)
            .and_modify(|o| *o = (*o).max(offset))
            .or_insert(offset);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Size or age bound reached (SPEC_FULL.md §4.4's flush trigger).
    pub fn should_flush(&self) -> bool {
        self.items.len() >= self.max_count || self.opened_at.elapsed() >= self.max_age
    }

    /// Commit offsets are one past the highest message offset seen per
    /// partition (SPEC_FULL.md §4.4).
    pub fn commit_offsets(&self) -> HashMap<TopicPartition, i64> {
        self.highest_offset
            .iter()
            .map(|(tp, offset)| (tp.clone(), offset + 1))
            .collect()
    }

    /// Drains the batch's items for `flush_batch`, leaving the offset
    /// bookkeeping intact for `commit_offsets`.
    pub fn take_items(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_on_count_bound() {
        let mut batch: Batch<i32> = Batch::new(2, Duration::from_secs(3600));
        batch.push(TopicPartition::new("t", 0), 1, 10);
        assert!(!batch.should_flush());
        batch.push(TopicPartition::new("t", 0), 2, 11);
        assert!(batch.should_flush());
    }

    #[test]
    fn commit_offsets_are_one_past_highest_per_partition() {
        let mut batch: Batch<i32> = Batch::new(100, Duration::from_secs(3600));
        batch.push(TopicPartition::new("t", 0), 5, 1);
        batch.push(TopicPartition::new("t", 0), 9, 2);
        batch.push(TopicPartition::new("t", 1), 2, 3);

        let offsets = batch.commit_offsets();
        assert_eq!(offsets[&TopicPartition::new("t", 0)], 10);
        assert_eq!(offsets[&TopicPartition::new("t", 1)], 3);
    }
}
