//! Input artifact reading
//!
//! Opens one export CSV, resolves its schema from the header row and
//! materializes every data row. Rows are read once per run and never
//! mutated afterwards.

use crate::schema::InputSchema;
use nlbcheck_common::models::InputRow;
use nlbcheck_common::Result;
use std::path::Path;
use tracing::info;

/// Read every row of one export file.
///
/// A malformed row (missing field, unparsable rating) fails the whole
/// artifact with a diagnostic naming the row, rather than silently
/// defaulting values.
pub fn read_rows(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let schema = InputSchema::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1, first data record line 2.
        let line = index as u64 + 2;
        rows.push(schema.extract_row(&record, line)?);
    }

    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_input(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_rows() {
        let (_dir, path) = write_input(
            "Book Id,Title,Author,Average Rating,Exclusive Shelf,ISBN,ISBN13\n\
             1,Dune,Frank Herbert,4.27,to-read,0441172717,9780441172719\n\
             2,Emma,Jane Austen,4.04,read,,\n",
        );
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Dune");
        assert_eq!(rows[1].shelf, "read");
    }

    #[test]
    fn test_bad_rating_fails_with_row_number() {
        let (_dir, path) = write_input(
            "Book Id,Title,Author,Average Rating,Exclusive Shelf,ISBN,ISBN13\n\
             1,Dune,Frank Herbert,4.27,to-read,0441172717,9780441172719\n\
             2,Emma,Jane Austen,n/a,to-read,,\n",
        );
        let err = read_rows(&path).unwrap_err();
        assert!(err.to_string().contains("Row 3"), "got: {err}");
    }

    #[test]
    fn test_missing_column_fails() {
        let (_dir, path) = write_input("Book Id,Title,Author\n1,Dune,Frank Herbert\n");
        assert!(read_rows(&path).is_err());
    }
}
