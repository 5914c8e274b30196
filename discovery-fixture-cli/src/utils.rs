//! Utility functions shared by CLI commands.

use crate::error::CliError;
use discovery_fixture::config::{FixtureConfigBuilder, OutputFormat, PortStrategy};
use discovery_fixture::FixtureConfig;
use serde::Serialize;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Logging is configured from these in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Fixture settings that can be given on the command line.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FixtureArgs {
    /// Cluster name given to the server
    #[arg(long, value_name = "NAME", env = "DISCOVERY_FIXTURE_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// Comma-separated seed hosts
    #[arg(long, value_name = "HOSTS", value_delimiter = ',')]
    pub seeds: Option<Vec<String>>,

    /// How ports are obtained
    #[arg(long, value_name = "STRATEGY", value_parser = parse_port_strategy)]
    pub port_strategy: Option<PortStrategy>,

    /// Directory to create the data directory under
    #[arg(long, value_name = "PATH", env = "DISCOVERY_FIXTURE_TEMP_ROOT")]
    pub temp_root: Option<PathBuf>,
}

fn parse_port_strategy(s: &str) -> Result<PortStrategy, String> {
    PortStrategy::parse(s)
}

/// Parse an output format name.
pub fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "yaml" => Ok(OutputFormat::Yaml),
        _ => Err(format!("invalid format: {s} (expected text, json or yaml)")),
    }
}

/// Load configuration from the environment with command-line overrides.
///
/// Precedence: command-line flags, then `DISCOVERY_FIXTURE_*` variables, then
/// built-in defaults.
pub fn load_configuration(args: &FixtureArgs) -> Result<FixtureConfig, CliError> {
    let mut builder = FixtureConfigBuilder::new();
    if let Some(name) = &args.cluster_name {
        builder = builder.cluster_name(name.clone());
    }
    if let Some(seeds) = &args.seeds {
        builder = builder.seeds(seeds.iter().map(|s| s.trim().to_string()));
    }
    if let Some(strategy) = args.port_strategy {
        builder = builder.port_strategy(strategy);
    }
    if let Some(root) = &args.temp_root {
        builder = builder.temp_root(root.clone());
    }
    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// Render a value in the requested format.
///
/// `text` renders the YAML form, which already reads as `key: value` lines.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml | OutputFormat::Text => Ok(serde_yaml::to_string(value)?),
    }
}
