//! CLI structure and command definitions.

use crate::commands::{ConfigCommand, ProbeCommand, ServeCommand};
use clap::{Parser, Subcommand};

/// Run the embedded discovery store fixture outside a test suite.
#[derive(Parser)]
#[command(name = "dfix")]
#[command(version, about = "Run the embedded discovery store fixture", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Start the fixture and keep it running until stdin closes
    Serve(ServeCommand),

    /// Print free ephemeral ports
    Probe(ProbeCommand),

    /// Print the effective fixture configuration
    Config(ConfigCommand),
}
