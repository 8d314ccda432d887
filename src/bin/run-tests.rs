//! Discovers `*_test` programs in a directory and runs them as a suite.

use std::{env, path::PathBuf, process::ExitCode};

use gitsteps::bootstrap::{self, LogMode};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    bootstrap::init_logging(LogMode::from_args(args.iter().map(String::as_str)));

    let dir = args
        .iter()
        .find(|arg| !LogMode::is_token(arg))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let tests = match bootstrap::discover(&dir) {
        Ok(tests) => tests,
        Err(err) => {
            log::error!("could not discover tests in {}: {err}", dir.display());
            return ExitCode::from(1);
        }
    };

    log::info!("Running unit tests in {}...", dir.display());
    if bootstrap::run_suite(&tests) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
