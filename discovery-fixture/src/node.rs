//! Node identity handed to the embedded server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "testing";

/// Pool used when none is configured.
pub const DEFAULT_POOL: &str = "general";

/// Identity of the node the embedded server runs as.
///
/// Both the environment and the pool must match `[a-z0-9][_a-z0-9]*`.
///
/// # Examples
///
/// ```
/// use discovery_fixture::NodeInfo;
///
/// let node = NodeInfo::new("testing").unwrap();
/// assert_eq!(node.environment(), "testing");
/// assert_eq!(node.pool(), "general");
///
/// assert!(NodeInfo::new("Bad Env").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    environment: String,
    pool: String,
}

impl NodeInfo {
    /// Creates a node in the default pool.
    ///
    /// # Errors
    ///
    /// Returns an error if `environment` is not a valid identifier.
    pub fn new(environment: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_pool(environment, DEFAULT_POOL)
    }

    /// Creates a node in an explicit pool.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not a valid identifier.
    pub fn with_pool(
        environment: impl Into<String>,
        pool: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let environment = environment.into();
        let pool = pool.into();
        validate_identifier("environment", &environment)?;
        validate_identifier("pool", &pool)?;
        Ok(Self { environment, pool })
    }

    /// Returns the node environment.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the node pool.
    #[must_use]
    pub fn pool(&self) -> &str {
        &self.pool
    }
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            pool: DEFAULT_POOL.to_string(),
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.environment, self.pool)
    }
}

/// Validation error for node identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn validate_identifier(field: &str, value: &str) -> Result<(), ValidationError> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first.is_ascii_digit() => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError {
            field: field.into(),
            message: format!("'{value}' must match [a-z0-9][_a-z0-9]*"),
        })
    }
}
