//! Configuration schema types.
//!
//! [`FixtureConfig`] describes how a fixture should bring up its server;
//! [`ServerConfig`] is the concrete value handed to the server once ports and
//! the data directory are known.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::node::{DEFAULT_ENVIRONMENT, DEFAULT_POOL};

/// Cluster name used when none is configured.
pub const DEFAULT_CLUSTER_NAME: &str = "discovery";

/// Seed host used when none is configured.
pub const DEFAULT_SEED: &str = "localhost";

/// How the fixture obtains ports for the embedded server.
///
/// # Examples
///
/// ```
/// use discovery_fixture::config::PortStrategy;
///
/// assert_eq!(PortStrategy::default(), PortStrategy::BindDirect);
/// assert_eq!(PortStrategy::Probe.to_string(), "probe");
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PortStrategy {
    /// Probe two free ports up front and hand them to the server.
    ///
    /// Racy: another process may take a probed port before the server binds it.
    Probe,
    /// Pass port 0 and let the server report what it actually bound.
    #[default]
    BindDirect,
}

impl PortStrategy {
    /// Parses a strategy name (`probe` or `bind-direct`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error string if the name is not recognized.
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "probe" => Ok(Self::Probe),
            "bind-direct" | "bind_direct" => Ok(Self::BindDirect),
            _ => Err(format!("invalid port strategy: {s}")),
        }
    }
}

impl std::fmt::Display for PortStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Probe => write!(f, "probe"),
            Self::BindDirect => write!(f, "bind-direct"),
        }
    }
}

/// Settings a fixture uses to bring up its embedded server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureConfig {
    /// Cluster name given to the server.
    pub cluster_name: String,

    /// Seed hosts given to the server.
    pub seeds: Vec<String>,

    /// How ports are obtained.
    pub port_strategy: PortStrategy,

    /// Node environment.
    pub environment: String,

    /// Node pool.
    pub pool: String,

    /// Directory to create the temporary data directory under.
    ///
    /// Defaults to the system temp directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_root: Option<PathBuf>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            seeds: vec![DEFAULT_SEED.to_string()],
            port_strategy: PortStrategy::default(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            pool: DEFAULT_POOL.to_string(),
            temp_root: None,
        }
    }
}

/// Concrete configuration handed to an embedded server.
///
/// A port of `0` asks the server to bind an ephemeral port and report it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Seed hosts.
    pub seeds: Vec<String>,
    /// Inter-node storage port.
    pub storage_port: u16,
    /// Client RPC port.
    pub rpc_port: u16,
    /// Cluster name.
    pub cluster_name: String,
    /// Working directory for data files.
    pub directory: PathBuf,
}

/// Output format for printed fixture information.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable `key: value` lines.
    #[default]
    Text,
    /// JSON output format.
    Json,
    /// YAML output format.
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}
