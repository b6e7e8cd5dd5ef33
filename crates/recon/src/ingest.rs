//! Text → `RawRecord` adapters for exported ledgers. No filesystem access:
//! callers read the file and pass its contents.

use serde_json::Value;

use crate::error::ReconError;
use crate::model::{RawCell, RawRecord};

/// Parse CSV with a header row into raw records.
///
/// Rows whose cells are all empty are dropped. Short rows are padded with
/// empty cells; cells beyond the header are ignored.
pub fn parse_csv(source: &str, text: &str) -> Result<Vec<RawRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(source, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| parse_error(source, e))?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut record = RawRecord::new();
        for (i, label) in headers.iter().enumerate() {
            let cell = match row.get(i) {
                Some(value) if !value.is_empty() => RawCell::Text(value.to_string()),
                _ => RawCell::Empty,
            };
            record.insert(label.clone(), cell);
        }
        records.push(record);
    }

    log::debug!(
        "{source}: {} columns, {} rows; first row {:?}",
        headers.len(),
        records.len(),
        records.first(),
    );
    Ok(records)
}

/// Parse a JSON array of objects into raw records, keeping key order.
pub fn parse_json(source: &str, text: &str) -> Result<Vec<RawRecord>, ReconError> {
    let value: Value = serde_json::from_str(text).map_err(|e| parse_error(source, e))?;

    let Value::Array(items) = value else {
        return Err(ReconError::Parse {
            source: source.into(),
            message: "expected a JSON array of row objects".into(),
        });
    };

    let mut records: Vec<RawRecord> = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(ReconError::Parse {
                source: source.into(),
                message: format!("row {idx} is not a JSON object"),
            });
        };
        records.push(fields.into_iter().map(|(k, v)| (k, json_cell(v))).collect());
    }

    log::debug!("{source}: {} rows; first row {:?}", records.len(), records.first());
    Ok(records)
}

fn json_cell(value: Value) -> RawCell {
    match value {
        Value::Null => RawCell::Empty,
        Value::String(s) if s.is_empty() => RawCell::Empty,
        Value::String(s) => RawCell::Text(s),
        Value::Number(n) => n.as_f64().map(RawCell::Number).unwrap_or(RawCell::Empty),
        other => RawCell::Text(other.to_string()),
    }
}

fn parse_error(source: &str, err: impl std::fmt::Display) -> ReconError {
    ReconError::Parse {
        source: source.into(),
        message: err.to_string(),
    }
}
