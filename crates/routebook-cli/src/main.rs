mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use routebook_core::LibraryConfig;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = LibraryConfig::from_env().with_library_path(cli.library);
    logging::init_logging(&config.log_filter);
    let operation = cli.command.operation();
    match commands::run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_error(operation, &err);
            ExitCode::FAILURE
        }
    }
}
