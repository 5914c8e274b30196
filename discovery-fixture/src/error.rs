//! Error types for the discovery fixture.
//!
//! Every failure during start, and during the server-stop step of shutdown,
//! surfaces as one of these variants. The only error the fixture ever swallows
//! is the best-effort removal of its temporary directory.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for fixture operations.
///
/// # Examples
///
/// ```
/// use discovery_fixture::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(9160)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the discovery fixture.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The temporary working directory could not be created.
    #[error("failed to create temporary directory{}: {source}", root_suffix(.root.as_ref()))]
    TempDirectory {
        /// The directory the temp dir was requested under, if any.
        root: Option<PathBuf>,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A socket could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// The address that was requested.
        address: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The embedded server failed a lifecycle transition.
    #[error("embedded server failed to {action}: {reason}")]
    Server {
        /// The transition that failed.
        action: ServerAction,
        /// Why it failed.
        reason: String,
    },

    /// A configuration document could not be read or written.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An invalid port number was provided.
    #[error("invalid port {value}: {reason}")]
    InvalidPort {
        /// The invalid port value.
        value: u16,
        /// The reason the port is invalid.
        reason: String,
    },

    /// The fixture has not completed a successful start.
    #[error("fixture has not been started")]
    NotStarted,
}

/// Lifecycle transition of an embedded server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    /// Bringing the server up.
    Start,
    /// Taking the server down.
    Stop,
}

impl fmt::Display for ServerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
        }
    }
}

fn root_suffix(root: Option<&PathBuf>) -> String {
    root.map(|r| format!(" under {}", r.display()))
        .unwrap_or_default()
}

impl From<crate::port::InvalidPortError> for Error {
    fn from(err: crate::port::InvalidPortError) -> Self {
        Self::InvalidPort {
            value: err.value,
            reason: err.reason,
        }
    }
}

impl From<crate::node::ValidationError> for Error {
    fn from(err: crate::node::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if the error is the not-started state error.
    ///
    /// # Examples
    ///
    /// ```
    /// use discovery_fixture::Error;
    ///
    /// assert!(Error::NotStarted.is_not_started());
    /// ```
    #[must_use]
    pub fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Shorthand for a failed server start.
    pub fn start_failed(reason: impl Into<String>) -> Self {
        Self::Server {
            action: ServerAction::Start,
            reason: reason.into(),
        }
    }

    /// Shorthand for a failed server stop.
    pub fn stop_failed(reason: impl Into<String>) -> Self {
        Self::Server {
            action: ServerAction::Stop,
            reason: reason.into(),
        }
    }
}
