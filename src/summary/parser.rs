use std::path::Path;

use anyhow::{Context, Result};
use futures::stream::{self, Stream};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::models::SummaryEntry;

/// Field separator used by the summary report. There is no quoting or
/// escaping: a field that itself contains `", "` shifts every later field.
pub const SEPARATOR: &str = ", ";

/// Split one report line into `dependency, license, status, source`.
///
/// Missing trailing fields become `None`; fields past the fourth are ignored.
pub fn parse_line(line: &str) -> SummaryEntry {
    let mut fields = line.trim_end_matches('\r').split(SEPARATOR);
    let mut next = || fields.next().map(str::to_string);

    SummaryEntry {
        dependency: next().unwrap_or_default(),
        license: next(),
        status: next(),
        source: next(),
    }
}

type ReportLines = Lines<BufReader<File>>;

/// Open a summary report as a lazy, single-pass stream of entries in file order.
///
/// Lines are read one at a time as the stream is polled. Blank lines are skipped.
pub async fn read_summary(path: &Path) -> Result<impl Stream<Item = Result<SummaryEntry>>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open summary {}", path.display()))?;
    let lines = BufReader::new(file).lines();
    Ok(stream::try_unfold(lines, next_entry))
}

async fn next_entry(mut lines: ReportLines) -> Result<Option<(SummaryEntry, ReportLines)>> {
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read summary line")?
    {
        if line.trim().is_empty() {
            continue;
        }
        return Ok(Some((parse_line(&line), lines)));
    }
    Ok(None)
}
