//! Environment variable handling for configuration overrides.
//!
//! This module applies `DISCOVERY_FIXTURE_*` environment variables on top of a
//! [`FixtureConfig`].

use std::env;
use std::path::PathBuf;

use crate::config::schema::{FixtureConfig, PortStrategy};
use crate::error::{Error, Result};

/// Overrides the cluster name.
pub const ENV_CLUSTER_NAME: &str = "DISCOVERY_FIXTURE_CLUSTER_NAME";
/// Overrides the seed list (comma-separated).
pub const ENV_SEEDS: &str = "DISCOVERY_FIXTURE_SEEDS";
/// Overrides the port strategy (`probe` or `bind-direct`).
pub const ENV_PORT_STRATEGY: &str = "DISCOVERY_FIXTURE_PORT_STRATEGY";
/// Overrides the node environment.
pub const ENV_ENVIRONMENT: &str = "DISCOVERY_FIXTURE_ENVIRONMENT";
/// Overrides the node pool.
pub const ENV_POOL: &str = "DISCOVERY_FIXTURE_POOL";
/// Overrides the directory temp data directories are created under.
pub const ENV_TEMP_ROOT: &str = "DISCOVERY_FIXTURE_TEMP_ROOT";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use discovery_fixture::config::{EnvironmentConfig, FixtureConfig};
///
/// let mut config = FixtureConfig::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// Unset variables leave the corresponding field untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an unparseable value.
    pub fn apply_overrides(config: &mut FixtureConfig) -> Result<()> {
        if let Ok(name) = env::var(ENV_CLUSTER_NAME) {
            config.cluster_name = name;
        }

        if let Ok(seeds) = env::var(ENV_SEEDS) {
            config.seeds = Self::parse_seeds(&seeds)?;
        }

        if let Ok(strategy) = env::var(ENV_PORT_STRATEGY) {
            config.port_strategy =
                PortStrategy::parse(&strategy).map_err(|message| Error::Validation {
                    field: ENV_PORT_STRATEGY.into(),
                    message,
                })?;
        }

        if let Ok(environment) = env::var(ENV_ENVIRONMENT) {
            config.environment = environment;
        }

        if let Ok(pool) = env::var(ENV_POOL) {
            config.pool = pool;
        }

        if let Ok(root) = env::var(ENV_TEMP_ROOT) {
            if root.trim().is_empty() {
                return Err(Error::Validation {
                    field: ENV_TEMP_ROOT.into(),
                    message: "Must not be empty".into(),
                });
            }
            config.temp_root = Some(PathBuf::from(root));
        }

        Ok(())
    }

    /// Parse a comma-separated seed list, trimming whitespace around entries.
    fn parse_seeds(s: &str) -> Result<Vec<String>> {
        let seeds: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|seed| !seed.is_empty())
            .map(String::from)
            .collect();

        if seeds.is_empty() {
            return Err(Error::Validation {
                field: ENV_SEEDS.into(),
                message: format!("No seed hosts in '{s}'"),
            });
        }
        Ok(seeds)
    }
}
