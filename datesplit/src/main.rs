//! datesplit CLI - expand date columns of a CSV file
//!
//! ```bash
//! datesplit ../../../../Desktop/311files/sample311.csv   # writes ./processed.csv
//! DATESPLIT_VERBOSE=1 datesplit data.csv                 # with progress on stderr
//! ```

use clap::Parser;
use datesplit::logs::{log_info, LOGGER};
use datesplit::{run_with_config, Config, PipelineError, PipelineResult, RunSummary, OUTPUT_FILE};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const USAGE: [&str; 2] = [
    "Please provide a working path to your CSV file as the first and only argument",
    "Example: \"../../../../Desktop/311files/sample311.csv\"",
];

/// Expand date columns of a CSV file into year, month, day and time of day
#[derive(Parser, Debug)]
#[command(name = "datesplit", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// CSV file to expand
    #[arg(allow_hyphen_values = true)]
    input: PathBuf,
}

/// Where a fatal error is reported.
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Stdout(String),
    Stderr(String),
}

fn main() {
    let Some(cli) = parse_args(std::env::args_os()) else {
        for line in USAGE {
            println!("{}", line);
        }
        return;
    };

    match execute(&cli) {
        Ok(summary) => {
            if let Ok(json) = serde_json::to_string_pretty(&summary) {
                log_info(format!("✨ Done!\n{}", json));
            }
        }
        Err(e) => {
            match report(&e) {
                Report::Stdout(msg) => println!("{}", msg),
                Report::Stderr(msg) => eprintln!("{}", msg),
            }
            std::process::exit(1);
        }
    }
}

/// The parsed command line, or `None` unless exactly one argument follows
/// the program name.
fn parse_args<I, T>(args: I) -> Option<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).ok()
}

fn execute(cli: &Cli) -> PipelineResult<RunSummary> {
    let config = Config::from_env()?;
    LOGGER.set_enabled(config.verbose);
    run_with_config(&cli.input, Path::new(OUTPUT_FILE), &config)
}

fn report(err: &PipelineError) -> Report {
    match err {
        PipelineError::InvalidPath { .. } => Report::Stdout(err.to_string()),
        other => Report::Stderr(format!("❌ Error: {}", other)),
    }
}
