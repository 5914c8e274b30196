//! Builder for fixture configuration.

use std::path::PathBuf;

use crate::config::environment::EnvironmentConfig;
use crate::config::schema::{FixtureConfig, PortStrategy};
use crate::config::validator::ConfigValidator;
use crate::error::Result;

/// Builds a validated [`FixtureConfig`].
///
/// Precedence, highest first: explicit builder setters, environment
/// variables, then the base configuration (defaults unless replaced with
/// [`FixtureConfigBuilder::with_config`]).
///
/// # Examples
///
/// ```
/// use discovery_fixture::config::{FixtureConfigBuilder, PortStrategy};
///
/// let config = FixtureConfigBuilder::new()
///     .skip_env()
///     .cluster_name("alt")
///     .port_strategy(PortStrategy::Probe)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.cluster_name, "alt");
/// assert_eq!(config.seeds, vec!["localhost".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct FixtureConfigBuilder {
    base: FixtureConfig,
    skip_env: bool,
    cluster_name: Option<String>,
    seeds: Option<Vec<String>>,
    port_strategy: Option<PortStrategy>,
    environment: Option<String>,
    pool: Option<String>,
    temp_root: Option<PathBuf>,
}

impl FixtureConfigBuilder {
    /// Creates a builder starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base configuration.
    #[must_use]
    pub fn with_config(mut self, config: FixtureConfig) -> Self {
        self.base = config;
        self
    }

    /// Ignores `DISCOVERY_FIXTURE_*` environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Sets the cluster name.
    #[must_use]
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Sets the seed hosts.
    #[must_use]
    pub fn seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seeds = Some(seeds.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the port strategy.
    #[must_use]
    pub fn port_strategy(mut self, strategy: PortStrategy) -> Self {
        self.port_strategy = Some(strategy);
        self
    }

    /// Sets the node environment.
    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the node pool.
    #[must_use]
    pub fn pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    /// Sets the directory temp data directories are created under.
    #[must_use]
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Merges all sources and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is malformed or the merged
    /// configuration fails validation.
    pub fn build(self) -> Result<FixtureConfig> {
        let mut config = self.base;

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        if let Some(name) = self.cluster_name {
            config.cluster_name = name;
        }
        if let Some(seeds) = self.seeds {
            config.seeds = seeds;
        }
        if let Some(strategy) = self.port_strategy {
            config.port_strategy = strategy;
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(pool) = self.pool {
            config.pool = pool;
        }
        if let Some(root) = self.temp_root {
            config.temp_root = Some(root);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

impl FixtureConfig {
    /// Defaults with `DISCOVERY_FIXTURE_*` overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds an invalid value.
    pub fn from_env() -> Result<Self> {
        FixtureConfigBuilder::new().build()
    }
}
