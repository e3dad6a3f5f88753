//! Result aggregation
//!
//! Workers produce one [`RowOutcome`] per searched row and hand it over a
//! channel; the single consumer drains the channel into one collection plus
//! the run counters. No ordering is imposed across workers here; the final
//! ordering is the ranking step's job.

use crossbeam_channel::Receiver;
use nlbcheck_common::models::{OutputRecord, RunStatistics};

/// Everything one searched row produced: the report records (real copies or
/// the single "not found" sentinel) and whether any real copy matched.
#[derive(Debug)]
pub struct RowOutcome {
    pub records: Vec<OutputRecord>,
    /// True when at least one record is backed by a real catalogue item
    pub matched: bool,
}

/// Merged output of one pipeline run
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub records: Vec<OutputRecord>,
    pub stats: RunStatistics,
}

/// Drain worker outcomes until every sender is gone.
///
/// `searched` counts outcomes (one per row that reached the lookup step,
/// regardless of match result); `available` counts outcomes with at least
/// one real match. Both are independent of how many copies a row produced.
pub fn collect(outcomes: &Receiver<RowOutcome>) -> RunOutcome {
    let mut records = Vec::new();
    let mut stats = RunStatistics::default();

    for outcome in outcomes.iter() {
        stats.searched += 1;
        if outcome.matched {
            stats.available += 1;
        }
        records.extend(outcome.records);
    }

    RunOutcome { records, stats }
}

// ============================================================================
// Tests
// ============================================================================
