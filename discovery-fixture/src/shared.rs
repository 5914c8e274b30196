//! A process-wide fixture for suites that share one server.
//!
//! The controller is created on first use from [`FixtureConfig::from_env`]
//! and lives until the process exits. Statics are never dropped, so suites
//! must call [`try_shutdown`] from their teardown to remove the data
//! directory.
//!
//! # Examples
//!
//! ```no_run
//! use discovery_fixture::shared;
//!
//! shared::try_initialize().unwrap();
//! let port = shared::server_info().unwrap().rpc_port();
//! println!("store listening on {port}");
//! shared::try_shutdown().unwrap();
//! ```

use std::sync::OnceLock;

use crate::config::FixtureConfig;
use crate::fixture::{FixtureController, ServerInfo};
use crate::server::LoopbackFactory;
use crate::Result;

/// The controller type behind the shared fixture.
pub type SharedFixture = FixtureController<LoopbackFactory>;

static SHARED: OnceLock<SharedFixture> = OnceLock::new();

/// Returns the process-wide controller, creating it on first use.
///
/// An invalid environment is logged and replaced by defaults.
pub fn fixture() -> &'static SharedFixture {
    SHARED.get_or_init(|| {
        let config = FixtureConfig::from_env().unwrap_or_else(|e| {
            log::warn!("ignoring invalid fixture environment: {e}");
            FixtureConfig::default()
        });
        FixtureController::new(LoopbackFactory, config)
    })
}

/// Starts the shared server if no caller has yet.
///
/// # Errors
///
/// See [`FixtureController::start`].
pub fn try_initialize() -> Result<()> {
    fixture().start()
}

/// Stops the shared server if no caller has yet.
///
/// # Errors
///
/// See [`FixtureController::stop`].
pub fn try_shutdown() -> Result<()> {
    fixture().stop()
}

/// Connection details of the shared server.
///
/// # Errors
///
/// Returns [`crate::Error::NotStarted`] until [`try_initialize`] has succeeded.
pub fn server_info() -> Result<ServerInfo> {
    fixture().server_info()
}
