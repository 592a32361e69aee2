use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached group snooze (SPEC_FULL.md §3 idempotency key
/// `snooze:<group_id>`). Either threshold being crossed counts as
/// exceeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snooze {
    pub until_count: Option<u64>,
    pub until_date: Option<DateTime<Utc>>,
}

impl Snooze {
    pub fn is_exceeded(&self, times_seen: u64, now: DateTime<Utc>) -> bool {
        let count_exceeded = self.until_count.is_some_and(|c| times_seen >= c);
        let date_exceeded = self.until_date.is_some_and(|d| now >= d);
        count_exceeded || date_exceeded
    }
}

/// Outcome of evaluating the snooze state machine for one job
/// (SPEC_FULL.md §4.7 stage 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeOutcome {
    /// Nothing changed; `has_reappeared` becomes `false`.
    NoOp,
    /// The snooze was exceeded: delete it, unresolve the group, add to
    /// inbox with UNIGNORED, record history, create an activity, emit
    /// `issue_unignored`; `has_reappeared` becomes `true`.
    Unignored,
}

/// The pure transition function behind stage 2 (SPEC_FULL.md §4.7 rule
/// 1: `is_reprocessed ∨ ¬has_reappeared → no-op, return`).
/// `has_reappeared` enters the job already seeded from
/// `!group_state.is_new` (original_source post_process.py:418), so this
/// gate is what keeps a brand-new group from being immediately
/// unsnoozed (post_process.py:514-515).
pub fn evaluate(is_reprocessed: bool, has_reappeared: bool, snooze: Option<&Snooze>, times_seen: u64, now: DateTime<Utc>) -> SnoozeOutcome {
    if is_reprocessed || !has_reappeared {
        return SnoozeOutcome::NoOp;
    }
    match snooze {
        None => SnoozeOutcome::NoOp,
        Some(s) if !s.is_exceeded(times_seen, now) => SnoozeOutcome::NoOp,
        Some(_) => SnoozeOutcome::Unignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 28, 12, 0, 0).unwrap()
    }

    /// P9: all 2^3 combinations of (has_reappeared, snooze_present,
    /// snooze_valid) given is_reprocessed = false.
    #[test]
    fn snooze_transition_table_covers_all_combinations() {
        let valid_snooze = Snooze {
            until_count: Some(100),
            until_date: None,
        };
        let exceeded_snooze = Snooze {
            until_count: Some(1),
            until_date: None,
        };

        // has_reappeared = false: always NoOp, regardless of snooze state.
        assert_eq!(evaluate(false, false, None, 5, now()), SnoozeOutcome::NoOp);
        assert_eq!(evaluate(false, false, Some(&valid_snooze), 5, now()), SnoozeOutcome::NoOp);
        assert_eq!(evaluate(false, false, Some(&exceeded_snooze), 5, now()), SnoozeOutcome::NoOp);

        // has_reappeared = true: snooze state decides.
        assert_eq!(evaluate(false, true, None, 5, now()), SnoozeOutcome::NoOp);
        assert_eq!(evaluate(false, true, Some(&valid_snooze), 5, now()), SnoozeOutcome::NoOp);
        assert_eq!(evaluate(false, true, Some(&exceeded_snooze), 5, now()), SnoozeOutcome::Unignored);
    }

    #[test]
    fn is_reprocessed_always_no_ops_even_with_an_exceeded_snooze() {
        let exceeded_snooze = Snooze {
            until_count: Some(1),
            until_date: None,
        };
        assert_eq!(evaluate(true, true, Some(&exceeded_snooze), 5, now()), SnoozeOutcome::NoOp);
    }

    #[test]
    fn new_group_never_unsnoozes_immediately() {
        // has_reappeared = false mirrors a fresh group_state.is_new = true
        // job (SPEC_FULL.md §4.7 rule 1 / original_source post_process.py:514-515).
        let exceeded_snooze = Snooze {
            until_count: Some(1),
            until_date: None,
        };
        assert_eq!(evaluate(false, false, Some(&exceeded_snooze), 5, now()), SnoozeOutcome::NoOp);
    }

    #[test]
    fn date_threshold_also_counts_as_exceeded() {
        let snooze = Snooze {
            until_count: None,
            until_date: Some(now() - chrono::Duration::hours(1)),
        };
        assert_eq!(evaluate(false, true, Some(&snooze), 0, now()), SnoozeOutcome::Unignored);
    }
}
