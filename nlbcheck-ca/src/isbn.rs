//! Search key normalization
//!
//! Export files carry ISBNs in many dressings: hyphenated, wrapped in
//! `="..."` to defeat spreadsheet auto-formatting, or with a letter check
//! digit. The catalogue wants a bare identifier, so everything that is not
//! an ASCII letter or digit is stripped. Letters are kept because ISBN-10
//! check digits can be `X`.

use nlbcheck_common::models::InputRow;

/// Derive the catalogue search key for a row.
///
/// ISBN-10 is preferred; ISBN-13 is the fallback. Returns `None` when
/// neither field yields a non-empty sanitized value, in which case the row
/// is excluded from lookup and from the run statistics.
pub fn normalized_key(row: &InputRow) -> Option<String> {
    let primary = sanitize(&row.isbn);
    if !primary.is_empty() {
        return Some(primary);
    }
    let fallback = sanitize(&row.isbn13);
    if !fallback.is_empty() {
        return Some(fallback);
    }
    None
}

fn sanitize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

// ============================================================================
// Tests
// ============================================================================
