use anyhow::Result;
use serde::Serialize;

use crate::models::{StaleEntry, SummaryEntry, Verdict};

#[derive(Debug, Serialize)]
pub struct GateReport<'a> {
    pub verdict: Verdict,
    pub baseline_found: bool,
    pub restricted: &'a [SummaryEntry],
    pub unhandled: &'a [SummaryEntry],
    pub unmatched: &'a [StaleEntry],
}

pub fn render(report: &GateReport<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
