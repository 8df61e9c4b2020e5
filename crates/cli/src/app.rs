// crates/cli/src/app.rs
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use wildcount_engine::entry::StdinHandle;
use wildcount_engine::{Engine, RunResult};

use crate::args::Args;
use crate::config::{self, Config};
use crate::error::{AppError, Result};
use crate::presentation;

/// Exit status when some inputs failed but the rest were printed.
pub const PARTIAL_FAILURE: u8 = 1;
/// Exit status when nothing useful could be produced.
pub const FATAL_FAILURE: u8 = 2;

/// Counts everything `args` names and prints the report.
///
/// Item failures are written to stderr after the report and turn the exit
/// status into [`PARTIAL_FAILURE`].
///
/// # Errors
///
/// Fails when the engine cannot be started or the report cannot be written.
pub fn run(args: &Args) -> Result<ExitCode> {
    let config = Config::from(args);
    let engine = Engine::new(config)?;
    let result = engine.run(&args.arguments, StdinHandle::process())?;

    write_report(args, &result)?;

    for error in &result.errors {
        eprintln!("{error}");
    }
    if result.is_partial() {
        Ok(ExitCode::from(PARTIAL_FAILURE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn write_report(args: &Args, result: &RunResult) -> Result<()> {
    let sizes = config::size_format(args);
    match &args.dest {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::Output {
                path: path.clone(),
                source,
            })?;
            let mut out = BufWriter::new(file);
            presentation::print_results(&mut out, &result.results, args.format, sizes)?;
            out.flush()?;
        }
        None => {
            let mut out = io::stdout().lock();
            presentation::print_results(&mut out, &result.results, args.format, sizes)?;
        }
    }
    Ok(())
}
