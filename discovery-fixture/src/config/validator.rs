//! Configuration validation.

use crate::config::schema::FixtureConfig;
use crate::error::{Error, Result};
use crate::node::NodeInfo;

/// Validates a [`FixtureConfig`] before it is used to start a server.
///
/// # Examples
///
/// ```
/// use discovery_fixture::config::{ConfigValidator, FixtureConfig};
///
/// ConfigValidator::validate(&FixtureConfig::default()).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(config: &FixtureConfig) -> Result<()> {
        if config.cluster_name.trim().is_empty() {
            return Err(Error::Validation {
                field: "cluster_name".into(),
                message: "cluster_name must be non-empty".into(),
            });
        }

        if config.seeds.is_empty() {
            return Err(Error::Validation {
                field: "seeds".into(),
                message: "at least one seed host is required".into(),
            });
        }
        if let Some(blank) = config.seeds.iter().position(|s| s.trim().is_empty()) {
            return Err(Error::Validation {
                field: "seeds".into(),
                message: format!("seed #{blank} is empty"),
            });
        }

        NodeInfo::with_pool(&config.environment, &config.pool)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: Error) -> String {
        match err {
            Error::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ConfigValidator::validate(&FixtureConfig::default()).is_ok());
    }

    #[test]
    fn test_blank_cluster_name() {
        let config = FixtureConfig {
            cluster_name: "  ".into(),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(field_of(err), "cluster_name");
    }

    #[test]
    fn test_seed_rules() {
        let config = FixtureConfig {
            seeds: vec![],
            ..Default::default()
        };
        assert_eq!(field_of(ConfigValidator::validate(&config).unwrap_err()), "seeds");

        let config = FixtureConfig {
            seeds: vec!["localhost".into(), String::new()],
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(format!("{err}").contains("seed #1"));
    }

    #[test]
    fn test_node_identity_rules() {
        let config = FixtureConfig {
            environment: "Testing".into(),
            ..Default::default()
        };
        assert_eq!(
            field_of(ConfigValidator::validate(&config).unwrap_err()),
            "environment"
        );

        let config = FixtureConfig {
            pool: "-".into(),
            ..Default::default()
        };
        assert_eq!(field_of(ConfigValidator::validate(&config).unwrap_err()), "pool");
    }
}
