use clap::Parser;
use std::process::ExitCode;

use crate::cli::{exit_codes, Cli};
use crate::icon::batch::{self, BatchOptions, BatchReport, Cancellation};
use crate::icon::render::TrimOutcome;

mod cli;
mod error;
mod icon;
mod logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("Failed to initialize logging: {}", err);
            return ExitCode::from(exit_codes::CONFIG_ERROR);
        }
    };

    tracing::info!(
        "{} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let plans = match cli.plans() {
        Ok(v) => v,
        Err(err) => {
            tracing::error!("Invalid export configuration: {}", err);
            return ExitCode::from(exit_codes::CONFIG_ERROR);
        }
    };

    let cancellation = Cancellation::new();
    tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, letting running jobs finish...");
                cancellation.cancel();
            }
        }
    });

    let options = BatchOptions::new(cli.max_parallel(), cancellation);
    tracing::debug!("Running up to {} jobs at once", options.max_parallel);

    let mut report = BatchReport::default();
    for plan in plans {
        tracing::info!(
            "Exporting target {} ({} icons) to {}",
            plan.name,
            plan.jobs.len(),
            plan.output_dir.display()
        );
        report.extend(batch::export(plan.jobs, &plan.output_dir, &options).await);
    }

    ExitCode::from(summarize(&report))
}

/// Logs the outcome of all batches, lists failures on stderr and returns the
/// process exit code.
fn summarize(report: &BatchReport) -> u8 {
    let exported = report.exported().count();
    let untrimmed = report
        .exported()
        .filter(|(_, outcome)| outcome.trim == TrimOutcome::Skipped)
        .count();

    if report.is_success() {
        tracing::info!(
            "Exported {} icons, {} without border trim",
            exported,
            untrimmed
        );
        return exit_codes::SUCCESS;
    }

    let failures = report.failures().collect::<Vec<_>>();
    eprintln!(
        "{} of {} icons failed:",
        failures.len(),
        report.jobs.len()
    );
    for (job, err) in failures {
        eprintln!("  {}: {}", job, err);
    }

    exit_codes::JOBS_FAILED
}
