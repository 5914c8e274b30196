//! The fixture controller: one-time start and one-time stop of an embedded
//! server.
//!
//! A [`FixtureController`] owns two one-way latches. The first `start()` to
//! flip the initialization latch does the real work and every other call is
//! a no-op; `stop()` behaves the same way with the shutdown latch. Neither
//! latch ever resets, so a controller runs at most one server in its lifetime.
//!
//! # Examples
//!
//! ```
//! use discovery_fixture::config::FixtureConfigBuilder;
//! use discovery_fixture::server::LoopbackFactory;
//! use discovery_fixture::FixtureController;
//!
//! let config = FixtureConfigBuilder::new().skip_env().build().unwrap();
//! let fixture = FixtureController::new(LoopbackFactory, config);
//!
//! fixture.start().unwrap();
//! let info = fixture.server_info().unwrap();
//! assert!(info.rpc_port().value() > 0);
//! fixture.stop().unwrap();
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::TempDir;

use crate::config::{FixtureConfig, PortStrategy, ServerConfig};
use crate::node::NodeInfo;
use crate::port::find_unused_ports;
use crate::server::{EmbeddedServer, ServerFactory};
use crate::{Error, Port, Result};

/// Prefix of the temporary data directory.
pub const TEMP_DIR_PREFIX: &str = "discovery-cassandra-";

/// What callers need to reach the running server.
///
/// Two values are equal exactly when their RPC ports are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ServerInfo {
    rpc_port: Port,
}

impl ServerInfo {
    /// Wraps an RPC port.
    #[must_use]
    pub const fn new(rpc_port: Port) -> Self {
        Self { rpc_port }
    }

    /// The RPC port of the embedded server.
    #[must_use]
    pub const fn rpc_port(&self) -> Port {
        self.rpc_port
    }
}

/// Snapshot of a fixture's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureState {
    /// `start()` has not been called.
    Idle,
    /// A `start()` call is in progress.
    Starting,
    /// The server is up.
    Running {
        /// RPC port the server listens on.
        rpc_port: Port,
        /// Storage port the server listens on.
        storage_port: Port,
        /// The temporary data directory.
        data_dir: PathBuf,
        /// When the server finished starting.
        started_at: DateTime<Utc>,
    },
    /// The one start attempt failed.
    Failed,
    /// `stop()` has run (or is running).
    Stopped,
}

/// Everything owned by a started fixture.
struct ServerHandle<S> {
    server: S,
    rpc_port: Port,
    storage_port: Port,
    data_dir: TempDir,
    started_at: DateTime<Utc>,
}

impl<S: EmbeddedServer> ServerHandle<S> {
    /// Stops the server, then removes the data directory on a best-effort basis.
    fn shutdown(mut self) -> Result<()> {
        self.server.stop()?;

        let path = self.data_dir.path().to_path_buf();
        match self.data_dir.close() {
            Ok(()) => log::debug!("removed data directory {}", path.display()),
            Err(e) => log::warn!("failed to remove data directory {}: {e}", path.display()),
        }
        Ok(())
    }
}

/// Starts and stops one embedded server for a test suite.
///
/// Construct one per suite (or share one through [`crate::shared`]) and call
/// [`start`](Self::start) from setup and [`stop`](Self::stop) from teardown.
/// Dropping a controller whose server is still running stops it.
pub struct FixtureController<F: ServerFactory> {
    factory: F,
    config: FixtureConfig,
    initialized: AtomicBool,
    shutdown: AtomicBool,
    failed: AtomicBool,
    handle: Mutex<Option<ServerHandle<F::Server>>>,
    info: OnceLock<ServerInfo>,
}

impl<F: ServerFactory> FixtureController<F> {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(factory: F, config: FixtureConfig) -> Self {
        Self {
            factory,
            config,
            initialized: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            handle: Mutex::new(None),
            info: OnceLock::new(),
        }
    }

    /// The configuration this controller starts its server with.
    #[must_use]
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Starts the embedded server, once.
    ///
    /// Only the first call does anything; later and concurrent calls return
    /// `Ok(())` immediately, even if the first call failed or is still running.
    ///
    /// # Errors
    ///
    /// Returns the first failure among port probing, temp directory creation,
    /// node validation, and the server's own start. Nothing is retried.
    pub fn start(&self) -> Result<()> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("fixture already initialized");
            return Ok(());
        }

        match self.launch() {
            Ok(handle) => {
                let info = ServerInfo::new(handle.rpc_port);
                log::info!(
                    "embedded server '{}' started: rpc {}, storage {}, data {}",
                    self.config.cluster_name,
                    handle.rpc_port,
                    handle.storage_port,
                    handle.data_dir.path().display()
                );
                *self.lock_handle() = Some(handle);
                // Published after the handle so stop() can rely on it.
                let _ = self.info.set(info);
                Ok(())
            }
            Err(e) => {
                self.failed.store(true, Ordering::Release);
                log::warn!("embedded server failed to start: {e}");
                Err(e)
            }
        }
    }

    /// Stops the embedded server and removes its data directory, once.
    ///
    /// Failure to remove the data directory is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStarted`] if no start has completed; the shutdown
    /// latch is left untouched in that case. Returns the server's error if it
    /// fails to stop.
    pub fn stop(&self) -> Result<()> {
        if self.shutdown.load(Ordering::Acquire) {
            return Ok(());
        }
        if self.info.get().is_none() {
            return Err(Error::NotStarted);
        }
        if self
            .shutdown
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let Some(handle) = self.lock_handle().take() else {
            return Err(Error::NotStarted);
        };
        handle.shutdown()?;
        log::info!("embedded server '{}' stopped", self.config.cluster_name);
        Ok(())
    }

    /// Returns the connection details of the started server.
    ///
    /// The value stays available after [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStarted`] before a start has completed, or after it
    /// failed.
    pub fn server_info(&self) -> Result<ServerInfo> {
        self.info.get().copied().ok_or(Error::NotStarted)
    }

    /// Returns a snapshot of the lifecycle state.
    #[must_use]
    pub fn state(&self) -> FixtureState {
        if self.shutdown.load(Ordering::Acquire) {
            return FixtureState::Stopped;
        }
        if let Some(handle) = self.lock_handle().as_ref() {
            return FixtureState::Running {
                rpc_port: handle.rpc_port,
                storage_port: handle.storage_port,
                data_dir: handle.data_dir.path().to_path_buf(),
                started_at: handle.started_at,
            };
        }
        if self.failed.load(Ordering::Acquire) {
            FixtureState::Failed
        } else if self.initialized.load(Ordering::Acquire) {
            FixtureState::Starting
        } else {
            FixtureState::Idle
        }
    }

    fn launch(&self) -> Result<ServerHandle<F::Server>> {
        let (storage_port, rpc_port) = match self.config.port_strategy {
            PortStrategy::Probe => {
                let ports = find_unused_ports(2)?;
                (ports[0].value(), ports[1].value())
            }
            PortStrategy::BindDirect => (0, 0),
        };

        let data_dir = self.create_data_dir()?;
        let server_config = ServerConfig {
            seeds: self.config.seeds.clone(),
            storage_port,
            rpc_port,
            cluster_name: self.config.cluster_name.clone(),
            directory: data_dir.path().to_path_buf(),
        };
        let node = NodeInfo::with_pool(&self.config.environment, &self.config.pool)?;

        let mut server = self.factory.create(server_config, node)?;
        server.start()?;

        let ports = resolve_port("rpc", server.rpc_port(), rpc_port).and_then(|rpc| {
            let storage = resolve_port("storage", server.storage_port(), storage_port)?;
            Ok((rpc, storage))
        });
        let (rpc_port, storage_port) = match ports {
            Ok(ports) => ports,
            Err(e) => {
                if let Err(stop_err) = server.stop() {
                    log::warn!("failed to stop server after start error: {stop_err}");
                }
                return Err(e);
            }
        };

        Ok(ServerHandle {
            server,
            rpc_port,
            storage_port,
            data_dir,
            started_at: Utc::now(),
        })
    }

    fn create_data_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_DIR_PREFIX);
        let created = match &self.config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        created.map_err(|source| Error::TempDirectory {
            root: self.config.temp_root.clone(),
            source,
        })
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<ServerHandle<F::Server>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: ServerFactory> Drop for FixtureController<F> {
    fn drop(&mut self) {
        let handle = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            self.shutdown.store(true, Ordering::Release);
            if let Err(e) = handle.shutdown() {
                log::warn!("failed to stop embedded server on drop: {e}");
            }
        }
    }
}

/// Picks the port the server reported, falling back to the configured one.
fn resolve_port(name: &str, reported: Option<Port>, configured: u16) -> Result<Port> {
    match reported {
        Some(port) => Ok(port),
        None if configured != 0 => Ok(Port::try_from(configured)?),
        None => Err(Error::start_failed(format!(
            "server did not report its {name} port"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::MockEmbeddedServer;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn port(value: u16) -> Port {
        Port::try_from(value).unwrap()
    }

    fn test_config() -> FixtureConfig {
        FixtureConfig::default()
    }

    /// Pins a closure to the factory signature so its types are inferred.
    fn factory<F>(f: F) -> F
    where
        F: Fn(ServerConfig, NodeInfo) -> Result<MockEmbeddedServer> + Send + Sync,
    {
        f
    }

    /// A mock server that starts and stops successfully exactly once.
    fn healthy_mock() -> MockEmbeddedServer {
        let mut server = MockEmbeddedServer::new();
        server.expect_start().times(1).returning(|| Ok(()));
        server.expect_stop().times(1).returning(|| Ok(()));
        server.expect_rpc_port().return_const(Some(port(9160)));
        server.expect_storage_port().return_const(Some(port(7000)));
        server
    }

    #[test]
    fn test_server_info_before_start() {
        let fixture = FixtureController::new(
            factory(|_, _| Ok(healthy_mock())),
            test_config(),
        );
        assert!(fixture.server_info().unwrap_err().is_not_started());
        assert_eq!(fixture.state(), FixtureState::Idle);
    }

    #[test]
    fn test_start_then_stop_with_mock() {
        let fixture = FixtureController::new(
            factory(|_, _| Ok(healthy_mock())),
            test_config(),
        );

        fixture.start().unwrap();
        assert_eq!(fixture.server_info().unwrap(), ServerInfo::new(port(9160)));
        let data_dir = match fixture.state() {
            FixtureState::Running {
                rpc_port,
                storage_port,
                data_dir,
                ..
            } => {
                assert_eq!(rpc_port, port(9160));
                assert_eq!(storage_port, port(7000));
                data_dir
            }
            other => panic!("expected running, got {other:?}"),
        };
        assert!(data_dir.is_dir());

        fixture.stop().unwrap();
        assert_eq!(fixture.state(), FixtureState::Stopped);
        assert!(!data_dir.exists());
    }

    #[test]
    fn test_factory_receives_configuration() {
        let config = FixtureConfig {
            cluster_name: "alt".into(),
            seeds: vec!["seed1".into(), "seed2".into()],
            port_strategy: PortStrategy::Probe,
            environment: "ci".into(),
            pool: "blue".into(),
            temp_root: None,
        };
        let seen: Arc<Mutex<Option<(ServerConfig, NodeInfo)>>> = Arc::new(Mutex::new(None));
        let seen_by_factory = Arc::clone(&seen);

        let fixture = FixtureController::new(
            factory(move |config, node| {
                *seen_by_factory.lock().unwrap() = Some((config, node));
                let mut server = MockEmbeddedServer::new();
                server.expect_start().returning(|| Ok(()));
                server.expect_stop().returning(|| Ok(()));
                server.expect_rpc_port().return_const(None);
                server.expect_storage_port().return_const(None);
                Ok(server)
            }),
            config,
        );
        fixture.start().unwrap();

        let (server_config, node) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(server_config.cluster_name, "alt");
        assert_eq!(server_config.seeds, vec!["seed1", "seed2"]);
        assert_ne!(server_config.rpc_port, 0);
        assert_ne!(server_config.storage_port, 0);
        assert_ne!(server_config.rpc_port, server_config.storage_port);
        assert!(server_config
            .directory
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(TEMP_DIR_PREFIX));
        assert_eq!(node, NodeInfo::with_pool("ci", "blue").unwrap());

        // The server reported nothing, so the probed port is used.
        assert_eq!(
            fixture.server_info().unwrap().rpc_port().value(),
            server_config.rpc_port
        );
        fixture.stop().unwrap();
    }

    #[test]
    fn test_bind_direct_passes_zero_ports() {
        let seen = Arc::new(Mutex::new(None));
        let seen_by_factory = Arc::clone(&seen);
        let fixture = FixtureController::new(
            factory(move |config, _| {
                *seen_by_factory.lock().unwrap() = Some((config.rpc_port, config.storage_port));
                Ok(healthy_mock())
            }),
            test_config(),
        );
        fixture.start().unwrap();
        assert_eq!(*seen.lock().unwrap(), Some((0, 0)));
        fixture.stop().unwrap();
    }

    #[test]
    fn test_bind_direct_without_reported_port_fails() {
        let fixture = FixtureController::new(
            factory(|_, _| {
                let mut server = MockEmbeddedServer::new();
                server.expect_start().times(1).returning(|| Ok(()));
                server.expect_stop().times(1).returning(|| Ok(()));
                server.expect_rpc_port().return_const(None);
                server.expect_storage_port().return_const(None);
                Ok(server)
            }),
            test_config(),
        );

        let err = fixture.start().unwrap_err();
        assert!(format!("{err}").contains("did not report its rpc port"));
        assert_eq!(fixture.state(), FixtureState::Failed);
    }

    #[test]
    fn test_start_failure_propagates_and_latches() {
        let creates = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&creates);
        let fixture = FixtureController::new(
            factory(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut server = MockEmbeddedServer::new();
                server
                    .expect_start()
                    .times(1)
                    .returning(|| Err(Error::start_failed("boom")));
                Ok(server)
            }),
            test_config(),
        );

        let err = fixture.start().unwrap_err();
        assert!(matches!(err, Error::Server { .. }));
        assert_eq!(fixture.state(), FixtureState::Failed);

        // The latch stays set: no second attempt.
        fixture.start().unwrap();
        assert_eq!(creates.load(Ordering::SeqCst), 1);
        assert!(fixture.server_info().unwrap_err().is_not_started());
        assert!(fixture.stop().unwrap_err().is_not_started());
    }

    #[test]
    fn test_factory_error_propagates() {
        let fixture = FixtureController::new(
            factory(|_, _| {
                Err(Error::Validation {
                    field: "directory".into(),
                    message: "unusable".into(),
                })
            }),
            test_config(),
        );
        assert!(matches!(
            fixture.start().unwrap_err(),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn test_invalid_node_identity_fails_start() {
        let config = FixtureConfig {
            environment: "Not Valid".into(),
            ..test_config()
        };
        let fixture = FixtureController::new(
            factory(|_, _| Ok(MockEmbeddedServer::new())),
            config,
        );
        let err = fixture.start().unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "environment"));
    }

    #[test]
    fn test_missing_temp_root_fails_start() {
        let root = tempfile::tempdir().unwrap();
        let config = FixtureConfig {
            temp_root: Some(root.path().join("does-not-exist")),
            ..test_config()
        };
        let fixture = FixtureController::new(
            factory(|_, _| Ok(MockEmbeddedServer::new())),
            config,
        );
        assert!(matches!(
            fixture.start().unwrap_err(),
            Error::TempDirectory { root: Some(_), .. }
        ));
    }

    #[test]
    fn test_stop_error_propagates() {
        let fixture = FixtureController::new(
            factory(|_, _| {
                let mut server = MockEmbeddedServer::new();
                server.expect_start().returning(|| Ok(()));
                server
                    .expect_stop()
                    .times(1)
                    .returning(|| Err(Error::stop_failed("stuck")));
                server.expect_rpc_port().return_const(Some(port(9160)));
                server.expect_storage_port().return_const(Some(port(7000)));
                Ok(server)
            }),
            test_config(),
        );
        fixture.start().unwrap();

        let err = fixture.stop().unwrap_err();
        assert!(format!("{err}").contains("stuck"));
        // One real teardown only, even when it failed.
        fixture.stop().unwrap();
    }

    #[test]
    fn test_drop_stops_running_server() {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&stops);
        let fixture = FixtureController::new(
            factory(move |_, _| {
                let counter = Arc::clone(&counter);
                let mut server = MockEmbeddedServer::new();
                server.expect_start().returning(|| Ok(()));
                server.expect_stop().returning(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                server.expect_rpc_port().return_const(Some(port(9160)));
                server.expect_storage_port().return_const(Some(port(7000)));
                Ok(server)
            }),
            test_config(),
        );
        fixture.start().unwrap();
        drop(fixture);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_port() {
        assert_eq!(resolve_port("rpc", Some(port(1)), 2).unwrap(), port(1));
        assert_eq!(resolve_port("rpc", None, 2).unwrap(), port(2));
        assert!(resolve_port("rpc", None, 0).is_err());
    }
}
