//! Input schema resolution
//!
//! Export files drift across versions: the shelf column has appeared as
//! `Exclusive Shelf` and as `Bookshelves`, the rating column as
//! `Average Rating` and as `GoodreadsRating`. Rather than hardcoding one
//! vintage, each logical column carries an ordered alias list and the
//! schema is resolved once per file from its header row.

use csv::StringRecord;
use nlbcheck_common::models::InputRow;
use nlbcheck_common::{Error, Result};

/// Ordered header aliases per logical column, newest first
const BOOK_ID_ALIASES: &[&str] = &["Book Id"];
const TITLE_ALIASES: &[&str] = &["Title"];
const AUTHOR_ALIASES: &[&str] = &["Author"];
const RATING_ALIASES: &[&str] = &["Average Rating", "GoodreadsRating"];
const SHELF_ALIASES: &[&str] = &["Exclusive Shelf", "Bookshelves"];
const ISBN_ALIASES: &[&str] = &["ISBN"];
const ISBN13_ALIASES: &[&str] = &["ISBN13"];

/// Column indices resolved from one input file's header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSchema {
    book_id: usize,
    title: usize,
    author: usize,
    rating: usize,
    shelf: usize,
    isbn: usize,
    isbn13: usize,
}

impl InputSchema {
    /// Resolve the schema from a header row.
    ///
    /// Fails with a diagnostic naming the first missing column; a file
    /// without every required column is rejected up front rather than
    /// silently defaulting fields later.
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            book_id: find_column(headers, "Book Id", BOOK_ID_ALIASES)?,
            title: find_column(headers, "Title", TITLE_ALIASES)?,
            author: find_column(headers, "Author", AUTHOR_ALIASES)?,
            rating: find_column(headers, "Average Rating", RATING_ALIASES)?,
            shelf: find_column(headers, "Exclusive Shelf", SHELF_ALIASES)?,
            isbn: find_column(headers, "ISBN", ISBN_ALIASES)?,
            isbn13: find_column(headers, "ISBN13", ISBN13_ALIASES)?,
        })
    }

    /// Extract one `InputRow` from a data record.
    ///
    /// `line` is the 1-based record number, used in diagnostics. A field
    /// missing from the record or an unparsable rating fails the run for
    /// this artifact.
    pub fn extract_row(&self, record: &StringRecord, line: u64) -> Result<InputRow> {
        let rating_raw = self.field(record, self.rating, "rating", line)?;
        let rating: f64 = rating_raw.trim().parse().map_err(|_| {
            Error::InvalidInput(format!(
                "Row {}: rating {:?} is not a number",
                line, rating_raw
            ))
        })?;

        Ok(InputRow {
            book_id: self.field(record, self.book_id, "book id", line)?,
            title: self.field(record, self.title, "title", line)?,
            author: self.field(record, self.author, "author", line)?,
            rating,
            shelf: self.field(record, self.shelf, "shelf", line)?,
            isbn: self.field(record, self.isbn, "ISBN", line)?,
            isbn13: self.field(record, self.isbn13, "ISBN13", line)?,
        })
    }

    fn field(
        &self,
        record: &StringRecord,
        index: usize,
        name: &str,
        line: u64,
    ) -> Result<String> {
        record
            .get(index)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput(format!("Row {}: missing {} field", line, name)))
    }
}

fn find_column(headers: &StringRecord, name: &str, aliases: &[&str]) -> Result<usize> {
    for alias in aliases {
        if let Some(index) = headers.iter().position(|h| h.trim() == *alias) {
            return Ok(index);
        }
    }
    Err(Error::Schema(format!(
        "Missing required column {:?} (accepted headers: {})",
        name,
        aliases.join(", ")
    )))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_resolve_modern_headers() {
        let h = headers(&[
            "Book Id",
            "Title",
            "Author",
            "Average Rating",
            "Exclusive Shelf",
            "ISBN",
            "ISBN13",
        ]);
        let schema = InputSchema::resolve(&h).unwrap();
        let record = StringRecord::from(vec![
            "42",
            "Piranesi",
            "Susanna Clarke",
            "4.26",
            "to-read",
            "1635575633",
            "9781635575637",
        ]);
        let row = schema.extract_row(&record, 2).unwrap();
        assert_eq!(row.book_id, "42");
        assert_eq!(row.rating, 4.26);
        assert_eq!(row.shelf, "to-read");
    }

    #[test]
    fn test_resolve_legacy_headers() {
        let h = headers(&[
            "Book Id",
            "Title",
            "Author",
            "GoodreadsRating",
            "Bookshelves",
            "ISBN",
            "ISBN13",
        ]);
        assert!(InputSchema::resolve(&h).is_ok());
    }

    #[test]
    fn test_columns_resolved_by_name_not_position() {
        let h = headers(&[
            "ISBN13",
            "Exclusive Shelf",
            "Author",
            "Book Id",
            "Average Rating",
            "Title",
            "ISBN",
        ]);
        let schema = InputSchema::resolve(&h).unwrap();
        let record = StringRecord::from(vec![
            "9781635575637",
            "to-read",
            "Susanna Clarke",
            "42",
            "4.26",
            "Piranesi",
            "1635575633",
        ]);
        let row = schema.extract_row(&record, 2).unwrap();
        assert_eq!(row.book_id, "42");
        assert_eq!(row.title, "Piranesi");
        assert_eq!(row.isbn, "1635575633");
        assert_eq!(row.isbn13, "9781635575637");
    }

    #[test]
    fn test_missing_shelf_column_names_it() {
        let h = headers(&["Book Id", "Title", "Author", "Average Rating", "ISBN", "ISBN13"]);
        let err = InputSchema::resolve(&h).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Exclusive Shelf"), "got: {message}");
        assert!(message.contains("Bookshelves"), "got: {message}");
    }

    #[test]
    fn test_unparsable_rating_reports_row() {
        let h = headers(&[
            "Book Id",
            "Title",
            "Author",
            "Average Rating",
            "Exclusive Shelf",
            "ISBN",
            "ISBN13",
        ]);
        let schema = InputSchema::resolve(&h).unwrap();
        let record = StringRecord::from(vec![
            "42",
            "Piranesi",
            "Susanna Clarke",
            "great",
            "to-read",
            "",
            "",
        ]);
        let err = schema.extract_row(&record, 7).unwrap_err();
        assert!(err.to_string().contains("Row 7"), "got: {err}");
    }
}
