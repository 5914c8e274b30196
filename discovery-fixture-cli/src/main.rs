//! Main entry point for the dfix CLI.
//!
//! Runs the embedded discovery store fixture by hand:
//! - `serve`: Start the fixture and keep it up until stdin closes
//! - `probe`: Print free ephemeral ports
//! - `config`: Print the effective fixture configuration

mod cli;
mod commands;
mod error;
mod utils;

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use error::CliError;
use utils::GlobalOptions;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(CliError::from(e).exit_code());
        }
    };

    discovery_fixture::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        cli::Command::Serve(cmd) => cmd.execute(&global),
        cli::Command::Probe(cmd) => cmd.execute(&global),
        cli::Command::Config(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
