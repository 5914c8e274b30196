//! Configuration for the discovery fixture.
//!
//! Configuration is merged from these sources, highest precedence first:
//!
//! 1. Programmatic setters on [`FixtureConfigBuilder`]
//! 2. Environment variables (`DISCOVERY_FIXTURE_*`)
//! 3. The base [`FixtureConfig`] (built-in defaults unless replaced)
//!
//! # Examples
//!
//! ```
//! use discovery_fixture::config::{FixtureConfigBuilder, PortStrategy};
//!
//! let config = FixtureConfigBuilder::new()
//!     .skip_env()
//!     .port_strategy(PortStrategy::Probe)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.cluster_name, "discovery");
//! ```

pub mod builder;
pub mod environment;
pub mod schema;
pub mod validator;

pub use builder::FixtureConfigBuilder;
pub use environment::EnvironmentConfig;
pub use schema::{FixtureConfig, OutputFormat, PortStrategy, ServerConfig};
pub use validator::ConfigValidator;
