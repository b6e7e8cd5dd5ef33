//! Column lookup and cell coercion for loosely-shaped ledger rows.
//!
//! Exported spreadsheets rarely agree on header spelling: `총 매출` vs
//! `총매출`, trailing spaces, a BOM on the first column. Lookups therefore
//! compare labels with all whitespace removed and match by substring.
//! Coercions never fail; a malformed cell becomes 0, `""`, or `None`.

use crate::model::{RawCell, RawRecord};

/// Strategy for finding a logical field in a raw row.
pub trait FieldLookup {
    /// Return the cell for the first keyword that matches a column, or `None`.
    fn lookup<'r>(&self, record: &'r RawRecord, keywords: &[String]) -> Option<&'r RawCell>;
}

/// Whitespace-insensitive substring match over column labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringLookup;

impl FieldLookup for SubstringLookup {
    fn lookup<'r>(&self, record: &'r RawRecord, keywords: &[String]) -> Option<&'r RawCell> {
        resolve(record, keywords)
    }
}

/// Remove every whitespace character, including a byte-order mark.
pub fn strip_whitespace(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{feff}')
        .collect()
}

/// Keywords are tried in order; within a keyword, columns are tried in
/// record order. The first label containing the keyword wins.
pub fn resolve<'r, K: AsRef<str>>(record: &'r RawRecord, keywords: &[K]) -> Option<&'r RawCell> {
    let labels: Vec<String> = record.labels().map(strip_whitespace).collect();
    for kw in keywords {
        let kw = strip_whitespace(kw.as_ref());
        if let Some(pos) = labels.iter().position(|l| l.contains(&kw)) {
            return record.iter().nth(pos).map(|(_, cell)| cell);
        }
    }
    None
}

/// Whether any column label contains `marker`, whitespace removed on both sides.
pub fn has_column(record: &RawRecord, marker: &str) -> bool {
    let marker = strip_whitespace(marker);
    record.labels().any(|l| strip_whitespace(l).contains(&marker))
}

/// Coerce a cell to a finite number.
///
/// Text keeps only ASCII digits, `-` and `.` before parsing, so `"1,234원"`
/// reads as 1234 and `"(500)"` as 500.
pub fn to_number(cell: Option<&RawCell>) -> f64 {
    match cell {
        None | Some(RawCell::Empty) => 0.0,
        Some(RawCell::Number(n)) => {
            if n.is_finite() {
                *n
            } else {
                0.0
            }
        }
        Some(RawCell::Text(s)) => parse_stripped(s),
    }
}

fn parse_stripped(s: &str) -> f64 {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    if kept.is_empty() || kept == "-" || kept == "." {
        return 0.0;
    }
    match kept.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Normalize an identifier cell. Spreadsheet exports often wrap ids as
/// `="00123"` to keep leading zeros; `=` and `"` are dropped. Placeholders
/// (`-`, blank) mean no identifier.
pub fn clean_identifier(cell: Option<&RawCell>) -> Option<String> {
    let cell = cell?;
    if cell.is_falsy() {
        return None;
    }
    let cleaned: String = cell
        .to_text()
        .chars()
        .filter(|c| *c != '=' && *c != '"')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Trimmed string form of a cell; absent or falsy cells give `""`.
pub fn cell_text(cell: Option<&RawCell>) -> String {
    match cell {
        Some(c) if !c.is_falsy() => c.to_text().trim().to_string(),
        _ => String::new(),
    }
}
