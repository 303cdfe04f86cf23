use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::process::Command;

use crate::cli::ReportFormat;
use crate::config::Settings;
use crate::process::{run, RunStatus};
use crate::report::terminal::Reporter;

/// Move a previous run's summary aside to `<summary>.old`, replacing any older backup.
pub async fn backup_summary(summary: &Path, backup: &Path) -> Result<bool> {
    if !summary.exists() {
        return Ok(false);
    }
    tokio::fs::rename(summary, backup).await.with_context(|| {
        format!(
            "Failed to back up {} to {}",
            summary.display(),
            backup.display()
        )
    })?;
    Ok(true)
}

/// `java -jar <tool> <lockfile> -batch <n> -timeout <secs> -summary <summary>`
pub fn scanner_args(settings: &Settings) -> Vec<OsString> {
    vec![
        "-jar".into(),
        settings.tool_path.clone().into(),
        settings.lockfile.clone().into(),
        "-batch".into(),
        settings.batch.to_string().into(),
        "-timeout".into(),
        settings.timeout.to_string().into(),
        "-summary".into(),
        settings.summary.clone().into(),
    ]
}

/// Where the scanner's own output is echoed with `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoTarget {
    Stdout,
    Stderr,
}

/// Stdout belongs to the JSON document in JSON mode, so echoes go to stderr there.
pub fn echo_target(settings: &Settings) -> Option<EchoTarget> {
    match (settings.verbose, settings.report) {
        (false, _) => None,
        (true, ReportFormat::Json) => Some(EchoTarget::Stderr),
        (true, ReportFormat::Terminal) => Some(EchoTarget::Stdout),
    }
}

/// Run the scanner against the lockfile.
///
/// A failing scanner is only a warning: it often still writes a usable
/// partial summary, so the caller goes on to parse whatever exists.
pub async fn run_scanner(settings: &Settings, reporter: &Reporter) -> Result<RunStatus> {
    let backup = settings.summary_backup();
    if backup_summary(&settings.summary, &backup).await? {
        reporter.info(format!("Backed up previous summary to {}", backup.display()));
    }

    reporter.info(format!(
        "Running {} on {} ...",
        settings.tool_path.display(),
        settings.lockfile.display()
    ));

    let pb = if !settings.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
        pb.set_message("scanning licenses");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let out = run(Command::new(&settings.java).args(scanner_args(settings))).await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !out.stdout.trim().is_empty() {
        match echo_target(settings) {
            Some(EchoTarget::Stdout) => println!("{}", out.stdout.trim_end()),
            Some(EchoTarget::Stderr) => eprintln!("{}", out.stdout.trim_end()),
            None => {}
        }
    }

    if !out.status.success() {
        reporter.warn(format!("The license scanner did not complete cleanly ({})", out.status));
        let detail = out.stderr.trim();
        if !detail.is_empty() {
            reporter.warn(detail);
        }
        reporter.warn("Continuing with whatever summary it produced.");
    }

    Ok(out.status)
}
