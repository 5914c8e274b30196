//! Command to run the fixture in the foreground.

use crate::error::CliError;
use crate::utils::{load_configuration, parse_format, render, FixtureArgs, GlobalOptions};
use clap::Args;
use discovery_fixture::config::OutputFormat;
use discovery_fixture::{FixtureController, FixtureState, LoopbackFactory};
use serde::Serialize;
use std::io::{self, BufRead, Write};

/// Start the fixture, print where it listens, and stop it when stdin closes
/// or a line reading `stop` arrives.
#[derive(Args)]
pub struct ServeCommand {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Output format (text, json, yaml)
    #[arg(long, default_value = "text", value_parser = parse_format)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ServeReport {
    cluster_name: String,
    rpc_port: u16,
    storage_port: u16,
    data_dir: String,
    started_at: String,
}

impl ServeCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(&self.fixture)?;
        let cluster_name = config.cluster_name.clone();
        let fixture = FixtureController::new(LoopbackFactory, config);
        fixture.start()?;

        let FixtureState::Running {
            rpc_port,
            storage_port,
            data_dir,
            started_at,
        } = fixture.state()
        else {
            return Err(CliError::Library(discovery_fixture::Error::NotStarted));
        };

        let report = ServeReport {
            cluster_name,
            rpc_port: rpc_port.value(),
            storage_port: storage_port.value(),
            data_dir: data_dir.display().to_string(),
            started_at: started_at.to_rfc3339(),
        };
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", render(&report, self.format)?)?;
        stdout.flush()?;
        drop(stdout);

        if !global.quiet {
            eprintln!("Serving; close stdin or type 'stop' to shut down");
        }
        for line in io::stdin().lock().lines() {
            if line?.trim() == "stop" {
                break;
            }
        }

        fixture.stop()?;
        Ok(())
    }
}
