// crates/cli/src/main.rs
use std::process::ExitCode;

use clap::Parser;
use wildcount_cli::app::{self, FATAL_FAILURE};
use wildcount_cli::args::Args;
use wildcount_cli::logging;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match app::run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Application Error: {e}");
            ExitCode::from(FATAL_FAILURE)
        }
    }
}
