//! Command to print the effective fixture configuration.

use crate::error::CliError;
use crate::utils::{load_configuration, parse_format, render, FixtureArgs, GlobalOptions};
use clap::Args;
use discovery_fixture::config::OutputFormat;

/// Print the configuration `serve` would use, after environment and flag
/// overrides.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Output format (text, json, yaml)
    #[arg(long, default_value = "yaml", value_parser = parse_format)]
    pub format: OutputFormat,
}

impl ConfigCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(&self.fixture)?;
        print!("{}", render(&config, self.format)?);
        Ok(())
    }
}
