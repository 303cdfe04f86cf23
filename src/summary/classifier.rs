use std::cmp::Ordering;

use anyhow::Result;
use futures::{pin_mut, Stream, TryStreamExt};

use crate::models::SummaryEntry;

/// Drain the summary stream in order and keep the restricted entries,
/// sorted by dependency name.
pub async fn collect_restricted<S>(entries: S) -> Result<Vec<SummaryEntry>>
where
    S: Stream<Item = Result<SummaryEntry>>,
{
    pin_mut!(entries);
    let mut restricted = Vec::new();
    while let Some(entry) = entries.try_next().await? {
        if entry.is_restricted() {
            restricted.push(entry);
        }
    }
    sort_by_dependency(&mut restricted);
    Ok(restricted)
}

fn sort_by_dependency(entries: &mut [SummaryEntry]) {
    entries.sort_by(|a, b| locale_cmp(&a.dependency, &b.dependency));
}

/// ASCII in root collation order: whitespace, punctuation, symbols, digits,
/// then letters (case folded).
const ROOT_ORDER: &str = "\t\n\u{b}\u{c}\r _-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$0123456789abcdefghijklmnopqrstuvwxyz";

/// Primary weight of one character. Characters outside the table sort after
/// it, by their lowercase form.
fn primary_weight(c: char) -> (usize, char) {
    let folded = c.to_lowercase().next().unwrap_or(c);
    match ROOT_ORDER.find(folded) {
        Some(pos) if folded.is_ascii() => (pos, '\0'),
        _ => (ROOT_ORDER.len(), folded),
    }
}

/// Locale-style ordering for coordinates: punctuation before digits before
/// letters, case-insensitive first; among names differing only in case,
/// lowercase sorts first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        .then_with(|| a.cmp(b).reverse())
}
