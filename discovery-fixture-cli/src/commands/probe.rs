//! Command to print free ephemeral ports.

use crate::error::CliError;
use crate::utils::{parse_format, render, GlobalOptions};
use clap::Args;
use discovery_fixture::config::OutputFormat;
use discovery_fixture::port::find_unused_ports;

/// Print mutually distinct ports that are free right now.
#[derive(Args)]
pub struct ProbeCommand {
    /// Number of ports to probe
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub count: u16,

    /// Output format (text, json, yaml)
    #[arg(long, default_value = "text", value_parser = parse_format)]
    pub format: OutputFormat,
}

impl ProbeCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let ports = find_unused_ports(usize::from(self.count))?;

        match self.format {
            OutputFormat::Text => {
                for port in ports {
                    println!("{port}");
                }
            }
            format => print!("{}", render(&ports, format)?),
        }
        Ok(())
    }
}
