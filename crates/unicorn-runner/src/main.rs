//! `unicorn-run`: evaluate every pattern as of one date and publish the
//! day's leaderboard.

use std::process::ExitCode;

use clap::Parser;
use unicorn_core::errors::UnicornErrorCode;
use unicorn_core::traits::CancellationToken;
use unicorn_runner::{RunArgs, RuntimeOptions, UnicornRuntime};

fn main() -> ExitCode {
    let args = RunArgs::parse();

    unicorn_core::tracing::init_tracing();

    let run_date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let runtime = match UnicornRuntime::new(RuntimeOptions {
        project_root: args.project_root.clone(),
        cli: args.cli_overrides(),
    }) {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "runtime initialization failed");
            eprintln!("{}", e.coded_string());
            return ExitCode::FAILURE;
        }
    };

    match runtime.run(run_date, &CancellationToken::new()) {
        Ok(summary) => {
            print!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.coded_string());
            ExitCode::FAILURE
        }
    }
}
