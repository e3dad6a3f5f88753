//! Ranking and report writing
//!
//! The aggregated records are sorted by descending rating (stable, so
//! arrival order breaks ties deterministically for a given input ordering)
//! and written as one CSV plus a one-line plain-text summary.

use nlbcheck_common::models::{OutputRecord, RunStatistics, OUTPUT_HEADER};
use nlbcheck_common::Result;
use std::io::Write;
use std::path::Path;

/// Sort records by descending numeric rating. Stable.
pub fn rank(records: &mut [OutputRecord]) {
    records.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

/// Write the report CSV: the fixed header followed by one row per record.
pub fn write_report(path: &Path, records: &[OutputRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OUTPUT_HEADER)?;
    for record in records {
        writer.write_record(record.csv_fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Human-readable availability summary.
///
/// With zero searched rows the percentage is undefined; the line says so
/// instead of dividing by zero.
pub fn summary_line(stats: &RunStatistics) -> String {
    if stats.searched == 0 {
        return "Available books: 0/0=undefined".to_string();
    }
    let percentage = 100.0 * stats.available as f64 / stats.searched as f64;
    format!(
        "Available books: {}/{}={:.2}%",
        stats.available, stats.searched, percentage
    )
}

/// Write the summary side-file (one line).
pub fn write_summary(path: &Path, stats: &RunStatistics) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", summary_line(stats))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nlbcheck_common::models::InputRow;

    fn record(book_id: &str, rating: f64) -> OutputRecord {
        OutputRecord::not_found(&InputRow {
            book_id: book_id.to_string(),
            title: String::new(),
            author: String::new(),
            rating,
            shelf: String::new(),
            isbn: String::new(),
            isbn13: String::new(),
        })
    }

    #[test]
    fn test_rank_descending() {
        let mut records = vec![record("a", 3.1), record("b", 4.8), record("c", 0.0), record("d", 4.8)];
        rank(&mut records);

        for pair in records.windows(2) {
            assert!(pair[0].rating >= pair[1].rating);
        }
        // Stable: equal ratings keep their relative order.
        let ids: Vec<&str> = records.iter().map(|r| r.book_id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_report_header_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report(&path, &[record("a", 4.0)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "BookId,Title,Author,NlbCallNo,Rating,NlbBranch,NlbStatus,NlbDueDate,NlbShelf,ISBN,ISBN13"
        );
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_summary_line() {
        let stats = RunStatistics {
            searched: 3,
            available: 2,
        };
        assert_eq!(summary_line(&stats), "Available books: 2/3=66.67%");
    }

    #[test]
    fn test_summary_line_zero_searched() {
        let stats = RunStatistics::default();
        assert_eq!(summary_line(&stats), "Available books: 0/0=undefined");
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");
        write_summary(
            &path,
            &RunStatistics {
                searched: 4,
                available: 1,
            },
        )
        .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Available books: 1/4=25.00%\n");
    }
}
