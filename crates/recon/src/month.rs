use std::sync::OnceLock;

use regex::Regex;

use crate::error::ReconError;
use crate::model::{CollectionEntry, MonthCount};

fn year_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("year-month pattern compiles"))
}

/// `YYYY-MM` prefix of a date string, if it has one.
pub fn year_month(date: &str) -> Option<&str> {
    let end = date.char_indices().nth(7).map(|(i, _)| i).unwrap_or(date.len());
    let prefix = &date[..end];
    year_month_re().is_match(prefix).then_some(prefix)
}

/// Count payment months in first-seen order.
pub fn month_counts(entries: &[CollectionEntry]) -> Vec<MonthCount> {
    let mut counts: Vec<MonthCount> = Vec::new();
    for month in entries.iter().filter_map(|e| year_month(&e.payment_date)) {
        match counts.iter_mut().find(|c| c.month == month) {
            Some(c) => c.rows += 1,
            None => counts.push(MonthCount {
                month: month.to_string(),
                rows: 1,
            }),
        }
    }
    counts
}

/// The busiest payment month. Ties go to the month seen first.
pub fn select_target_month(
    entries: &[CollectionEntry],
) -> Result<(String, Vec<MonthCount>), ReconError> {
    let counts = month_counts(entries);

    let mut best: Option<&MonthCount> = None;
    for c in &counts {
        if best.map_or(true, |b| c.rows > b.rows) {
            best = Some(c);
        }
    }

    let target = best.map(|b| b.month.clone()).ok_or(ReconError::NoTargetMonth)?;
    log::info!("target month {target} ({} months seen)", counts.len());
    Ok((target, counts))
}
