use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Value;

use crate::models::{StaleEntry, SummaryEntry};

/// Colored diagnostics: cyan info on stdout, yellow warnings and red errors on stderr.
///
/// Whether color is emitted at all is decided globally through
/// `colored::control`.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", msg.as_ref().cyan());
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        eprintln!("{}", msg.as_ref().yellow());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!("{}", msg.as_ref().red());
    }

    /// Print findings that are restricted and not accepted by any baseline.
    pub fn unhandled(&self, header: &str, entries: &[SummaryEntry]) {
        self.error(header);
        for entry in entries {
            eprintln!("{}", unhandled_line(entry).red());
        }
    }

    /// Warn about baseline keys that matched nothing in this scan.
    pub fn stale(&self, entries: &[StaleEntry]) {
        if entries.is_empty() {
            return;
        }
        self.warn("Some entries in the baseline did not match any restricted dependency:");
        for entry in entries {
            let annotation = stale_annotation(entry);
            if annotation.is_empty() {
                eprintln!(" - {}", entry.dependency.magenta());
            } else {
                eprintln!(" - {}: {}", entry.dependency.magenta(), annotation.yellow());
            }
        }
    }
}

/// Heading printed above the unhandled findings of a failed run.
pub fn failure_header(baseline_found: bool, baseline: &Path) -> String {
    if baseline_found {
        "Found unhandled restricted dependencies, please review them or add them to the baseline:"
            .to_string()
    } else {
        format!(
            "Found unhandled restricted dependencies and no baseline at {}:",
            baseline.display()
        )
    }
}

/// `X {dependency}, {license}`
pub fn unhandled_line(entry: &SummaryEntry) -> String {
    format!("X {}, {}", entry.dependency, entry.license_display())
}

/// Stored annotation for a stale key; empty for `null`, `false`, `0` and `""`.
fn stale_annotation(entry: &StaleEntry) -> String {
    match &entry.annotation {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Table of every restricted finding and whether the baseline accepts it.
pub fn render_restricted_table(restricted: &[SummaryEntry], unhandled: &[SummaryEntry]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Dependency").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Baseline").add_attribute(Attribute::Bold),
        ]);

    for entry in restricted {
        let (label, color) = if unhandled.contains(entry) {
            ("✗ missing", Color::Red)
        } else {
            ("✓ accepted", Color::Green)
        };

        table.add_row(vec![
            Cell::new(&entry.dependency),
            Cell::new(entry.license_display()),
            Cell::new(entry.source.as_deref().unwrap_or("-")),
            Cell::new(label)
                .fg(color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}
