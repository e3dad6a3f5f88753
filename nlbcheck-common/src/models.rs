//! Data model shared by the nlbcheck tools
//!
//! One `InputRow` per book in the export, zero or more `AvailabilityItem`s
//! per catalogue lookup, and one `OutputRecord` per report line. Rows are
//! read once per run and never mutated.

use serde::{Deserialize, Serialize};

/// Shelf value that marks a book as unread in the export
pub const TO_READ_SHELF: &str = "to-read";

/// Catalogue status for a copy that is on the shelf right now.
/// Due dates are only meaningful for copies whose status is *not* this value.
pub const NOT_ON_LOAN: &str = "Not on Loan";

/// Report column names, in output order
pub const OUTPUT_HEADER: [&str; 11] = [
    "BookId",
    "Title",
    "Author",
    "NlbCallNo",
    "Rating",
    "NlbBranch",
    "NlbStatus",
    "NlbDueDate",
    "NlbShelf",
    "ISBN",
    "ISBN13",
];

/// One book entry from the source export
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// External book id from the export
    pub book_id: String,
    pub title: String,
    pub author: String,
    /// Community average rating, 0.0 to 5.0
    pub rating: f64,
    /// Shelf status field (e.g. "to-read", "read")
    pub shelf: String,
    /// Raw ISBN-10 field, possibly formatted or quoted
    pub isbn: String,
    /// Raw ISBN-13 field, possibly formatted or quoted
    pub isbn13: String,
}

/// One physical copy record returned by the catalogue for a search key
///
/// Field names follow the catalogue's `GetAvailabilityInfo` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AvailabilityItem {
    pub branch_name: String,
    pub status_desc: String,
    /// Due date string; meaningful only when the copy is on loan
    pub due_date: String,
    pub call_number: String,
    /// Shelf/location description within the branch
    pub location_desc: String,
}

/// One report line
///
/// Either one record per [`AvailabilityItem`] (book found, possibly multiple
/// copies), or exactly one sentinel record with all catalogue-derived fields
/// empty (book searched but zero matches).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub call_number: String,
    pub branch: String,
    pub status: String,
    pub due_date: String,
    pub shelf_location: String,
    pub isbn: String,
    pub isbn13: String,
}

impl OutputRecord {
    /// Build a report line for one physical copy.
    ///
    /// The due date is carried over only when the copy's status is not the
    /// literal [`NOT_ON_LOAN`] value; catalogue responses keep a stale due
    /// date on returned copies.
    pub fn from_item(row: &InputRow, item: &AvailabilityItem) -> Self {
        let due_date = if item.status_desc == NOT_ON_LOAN {
            String::new()
        } else {
            item.due_date.clone()
        };
        Self {
            book_id: row.book_id.clone(),
            title: row.title.clone(),
            author: row.author.clone(),
            rating: row.rating,
            call_number: item.call_number.clone(),
            branch: item.branch_name.clone(),
            status: item.status_desc.clone(),
            due_date,
            shelf_location: item.location_desc.clone(),
            isbn: row.isbn.clone(),
            isbn13: row.isbn13.clone(),
        }
    }

    /// Build the "searched but not found" sentinel line for a row
    pub fn not_found(row: &InputRow) -> Self {
        Self {
            book_id: row.book_id.clone(),
            title: row.title.clone(),
            author: row.author.clone(),
            rating: row.rating,
            call_number: String::new(),
            branch: String::new(),
            status: String::new(),
            due_date: String::new(),
            shelf_location: String::new(),
            isbn: row.isbn.clone(),
            isbn13: row.isbn13.clone(),
        }
    }

    /// Render the record as CSV fields, in [`OUTPUT_HEADER`] order
    pub fn csv_fields(&self) -> [String; 11] {
        [
            self.book_id.clone(),
            self.title.clone(),
            self.author.clone(),
            self.call_number.clone(),
            format!("{:.2}", self.rating),
            self.branch.clone(),
            self.status.clone(),
            self.due_date.clone(),
            self.shelf_location.clone(),
            self.isbn.clone(),
            self.isbn13.clone(),
        ]
    }
}

/// Per-run lookup statistics; derived, not persisted beyond the report run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Books that reached the lookup step (non-empty search key)
    pub searched: u64,
    /// Books with at least one real copy record
    pub available: u64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> InputRow {
        InputRow {
            book_id: "123".to_string(),
            title: "How China Escaped the Poverty Trap".to_string(),
            author: "Yuen Yuen Ang".to_string(),
            rating: 4.07,
            shelf: TO_READ_SHELF.to_string(),
            isbn: "1501700200".to_string(),
            isbn13: "9781501700200".to_string(),
        }
    }

    #[test]
    fn test_due_date_kept_when_on_loan() {
        let item = AvailabilityItem {
            branch_name: "Bishan Public Library".to_string(),
            status_desc: "On Loan".to_string(),
            due_date: "2026-09-01".to_string(),
            call_number: "338.95 ANG".to_string(),
            location_desc: "Adult Lending".to_string(),
        };
        let record = OutputRecord::from_item(&row(), &item);
        assert_eq!(record.due_date, "2026-09-01");
        assert_eq!(record.branch, "Bishan Public Library");
    }

    #[test]
    fn test_due_date_cleared_when_not_on_loan() {
        let item = AvailabilityItem {
            status_desc: NOT_ON_LOAN.to_string(),
            due_date: "2026-01-15".to_string(),
            ..AvailabilityItem::default()
        };
        let record = OutputRecord::from_item(&row(), &item);
        assert_eq!(record.due_date, "");
    }

    #[test]
    fn test_not_found_sentinel_has_empty_catalogue_fields() {
        let record = OutputRecord::not_found(&row());
        assert_eq!(record.book_id, "123");
        assert_eq!(record.rating, 4.07);
        assert_eq!(record.branch, "");
        assert_eq!(record.status, "");
        assert_eq!(record.due_date, "");
        assert_eq!(record.call_number, "");
        assert_eq!(record.shelf_location, "");
    }

    #[test]
    fn test_csv_fields_match_header_order() {
        let record = OutputRecord::not_found(&row());
        let fields = record.csv_fields();
        assert_eq!(fields.len(), OUTPUT_HEADER.len());
        assert_eq!(fields[0], "123");
        assert_eq!(fields[4], "4.07");
        assert_eq!(fields[9], "1501700200");
        assert_eq!(fields[10], "9781501700200");
    }

    #[test]
    fn test_availability_item_deserializes_catalogue_fields() {
        let json = r#"{
            "BranchName": "Jurong Regional Library",
            "StatusDesc": "Not on Loan",
            "DueDate": "",
            "CallNumber": "English ANG",
            "LocationDesc": "Adult Lending"
        }"#;
        let item: AvailabilityItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.branch_name, "Jurong Regional Library");
        assert_eq!(item.status_desc, NOT_ON_LOAN);
        assert_eq!(item.location_desc, "Adult Lending");
    }
}
