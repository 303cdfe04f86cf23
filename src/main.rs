//! `license-gate` — run the Dash license tool on a lockfile and gate CI on a baseline.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and resolve [`config::Settings`].
//! 2. Fetch the scanner jar if it is missing ([`fetcher`]).
//! 3. Back up the previous summary and run the scanner ([`scanner`]).
//! 4. Stream the summary report and keep restricted entries ([`summary`]).
//! 5. Reconcile them with the accepted baseline ([`baseline`]).
//! 6. Report ([`report`]) and exit `0` (pass) or `1` (unhandled restricted
//!    dependencies, or any fatal error).

mod baseline;
mod cli;
mod config;
mod fetcher;
mod models;
mod process;
mod report;
mod scanner;
mod summary;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;

use baseline::{gate, load_baseline, rebuild, write_baseline, Evaluation};
use cli::{Cli, ReportFormat};
use config::{load_config, Settings};
use models::{SummaryEntry, Verdict};
use report::terminal::{failure_header, render_restricted_table, Reporter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let no_color_env = std::env::var("NO_COLOR").ok();

    let code = match run(&cli, no_color_env.as_deref()).await {
        Ok(verdict) => verdict.exit_code(),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            1
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli, no_color_env: Option<&str>) -> Result<Verdict> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    let settings = Settings::resolve(config, cli, no_color_env);

    if settings.no_color {
        colored::control::set_override(false);
    }

    // stdout is reserved for the document in JSON mode
    let json = settings.report == ReportFormat::Json;
    let reporter = Reporter::new(settings.quiet || json);

    if settings.skip_scan {
        reporter.info(format!("Reusing existing summary {}", settings.summary.display()));
    } else {
        fetcher::ensure_tool(&settings, &reporter).await?;
        scanner::run_scanner(&settings, &reporter).await?;
    }

    if !settings.summary.exists() {
        bail!(
            "No summary report at {}; the scanner produced no output",
            settings.summary.display()
        );
    }

    let entries = summary::parser::read_summary(&settings.summary).await?;
    let restricted = summary::classifier::collect_restricted(entries).await?;

    if settings.write_baseline {
        return update_baseline(&settings, &reporter, &restricted);
    }

    let evaluation = gate(&restricted, &settings.baseline)?;

    if json {
        report::json::render(&report::json::GateReport {
            verdict: evaluation.verdict,
            baseline_found: evaluation.baseline_found,
            restricted: &restricted,
            unhandled: &evaluation.reconciliation.unhandled,
            unmatched: &evaluation.reconciliation.unmatched,
        })?;
    } else {
        print_evaluation(&settings, &reporter, &restricted, &evaluation);
    }

    Ok(evaluation.verdict)
}

fn print_evaluation(
    settings: &Settings,
    reporter: &Reporter,
    restricted: &[SummaryEntry],
    evaluation: &Evaluation,
) {
    if restricted.is_empty() {
        reporter.info("No restricted dependencies found.");
        return;
    }

    reporter.info(format!("Found {} restricted dependencies.", restricted.len()));

    if settings.verbose {
        render_restricted_table(restricted, &evaluation.reconciliation.unhandled);
    }

    reporter.stale(&evaluation.reconciliation.unmatched);

    match evaluation.verdict {
        Verdict::Pass => {
            reporter.info("All restricted dependencies are accepted by the baseline.");
        }
        Verdict::Fail => {
            reporter.unhandled(
                &failure_header(evaluation.baseline_found, &settings.baseline),
                &evaluation.reconciliation.unhandled,
            );
        }
    }
}

/// `--write-baseline`: accept exactly the current restricted set.
fn update_baseline(
    settings: &Settings,
    reporter: &Reporter,
    restricted: &[SummaryEntry],
) -> Result<Verdict> {
    let previous = load_baseline(&settings.baseline)?;
    let rebuilt = rebuild(restricted, previous.as_ref());
    write_baseline(&settings.baseline, &rebuilt)?;

    reporter.info(format!(
        "Wrote {} accepted dependencies to {}",
        rebuilt.len(),
        settings.baseline.display()
    ));

    Ok(Verdict::Pass)
}
