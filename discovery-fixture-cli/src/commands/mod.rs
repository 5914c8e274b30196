//! CLI command implementations.
//!
//! - `serve`: Start the fixture and keep it up until stdin closes
//! - `probe`: Print free ephemeral ports
//! - `config`: Print the effective fixture configuration

pub mod config;
pub mod probe;
pub mod serve;

pub use config::ConfigCommand;
pub use probe::ProbeCommand;
pub use serve::ServeCommand;
