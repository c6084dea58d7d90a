//! RuleStat/ResultSummary bookkeeping (spec §3/§4.9).
//!
//! Grounded on the teacher's `RunMetrics`/`PassMetrics`
//! (`engine/metrics.rs`): same role (accumulate per-unit timing/outcome
//! across a run), generalized from per-pass saturation timing to the
//! per-rule-per-chunk status state machine spec §4.9 describes, with
//! worst-status-wins aggregation across chunks.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::rule::RuleId;

/// Terminal status of one rule's execution against one chunk (spec §4.9).
/// Declaration order doubles as the worst-status-wins ordering:
/// `Errored > TimedOut > Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleStatus {
    Completed,
    TimedOut,
    Errored,
}

/// Per-rule execution record (spec §3). Aggregated across chunks by
/// [`RuleStat::merge`].
#[derive(Debug, Clone)]
pub struct RuleStat {
    pub status: RuleStatus,
    pub duration: Duration,
    pub match_count: usize,
    pub error: Option<String>,
}

impl RuleStat {
    pub fn completed(duration: Duration, match_count: usize) -> Self {
        RuleStat { status: RuleStatus::Completed, duration, match_count, error: None }
    }

    pub fn timed_out(duration: Duration, match_count: usize) -> Self {
        RuleStat { status: RuleStatus::TimedOut, duration, match_count, error: None }
    }

    pub fn errored(duration: Duration, match_count: usize, cause: String) -> Self {
        RuleStat { status: RuleStatus::Errored, duration, match_count, error: Some(cause) }
    }

    /// Merge another chunk's stat for the same rule into this one (spec
    /// §4.9 step 4): worst status wins, counts and durations sum.
    pub fn merge(&mut self, other: &RuleStat) {
        if other.status > self.status {
            self.status = other.status;
            self.error = other.error.clone();
        }
        self.duration += other.duration;
        self.match_count += other.match_count;
    }
}

pub type RuleStats = BTreeMap<RuleId, RuleStat>;

/// Totals by status across every rule in a [`RuleStats`] map (spec §3/§4.9
/// step 5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultSummary {
    pub completed: usize,
    pub timed_out: usize,
    pub errored: usize,
}

impl ResultSummary {
    pub fn from_stats<'a>(stats: impl Iterator<Item = &'a RuleStat>) -> Self {
        let mut summary = ResultSummary::default();
        for stat in stats {
            match stat.status {
                RuleStatus::Completed => summary.completed += 1,
                RuleStatus::TimedOut => summary.timed_out += 1,
                RuleStatus::Errored => summary.errored += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_status_wins_on_merge() {
        let mut a = RuleStat::completed(Duration::from_millis(10), 2);
        let b = RuleStat::timed_out(Duration::from_millis(5), 1);
        a.merge(&b);
        assert_eq!(a.status, RuleStatus::TimedOut);
        assert_eq!(a.match_count, 3);
        assert_eq!(a.duration, Duration::from_millis(15));
    }

    #[test]
    fn errored_outranks_timed_out() {
        let mut a = RuleStat::timed_out(Duration::from_millis(1), 0);
        let b = RuleStat::errored(Duration::from_millis(1), 0, "boom".into());
        a.merge(&b);
        assert_eq!(a.status, RuleStatus::Errored);
        assert_eq!(a.error.as_deref(), Some("boom"));
    }

    #[test]
    fn completed_does_not_downgrade_worse_status() {
        let mut a = RuleStat::errored(Duration::from_millis(1), 0, "boom".into());
        let b = RuleStat::completed(Duration::from_millis(1), 5);
        a.merge(&b);
        assert_eq!(a.status, RuleStatus::Errored);
        assert_eq!(a.match_count, 5);
    }

    #[test]
    fn summary_counts_by_status() {
        let stats = vec![
            RuleStat::completed(Duration::ZERO, 1),
            RuleStat::timed_out(Duration::ZERO, 0),
            RuleStat::errored(Duration::ZERO, 0, "x".into()),
            RuleStat::completed(Duration::ZERO, 0),
        ];
        let summary = ResultSummary::from_stats(stats.iter());
        assert_eq!(summary, ResultSummary { completed: 2, timed_out: 1, errored: 1 });
    }
}
