//! Row selection
//!
//! Picks the candidate rows for availability checking: the ordered
//! subsequence of the export whose shelf status is "to-read", optionally
//! thinned by a minimum-rating cutoff.

use nlbcheck_common::models::{InputRow, TO_READ_SHELF};

/// Select rows shelved as "to-read", preserving input order.
pub fn filter_rows(rows: &[InputRow]) -> Vec<InputRow> {
    rows.iter()
        .filter(|row| row.shelf == TO_READ_SHELF)
        .cloned()
        .collect()
}

/// Drop rows rated below the cutoff. A cutoff of 0.0 keeps everything.
pub fn apply_min_rating(rows: Vec<InputRow>, min_rating: f64) -> Vec<InputRow> {
    if min_rating <= 0.0 {
        return rows;
    }
    rows.into_iter()
        .filter(|row| row.rating >= min_rating)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
