//! Loopback implementation of [`EmbeddedServer`].
//!
//! The server binds its RPC and storage listeners on `127.0.0.1` and serves
//! each from a dedicated accept thread. RPC connections receive a one-line
//! greeting (`<cluster_name> <environment>\n`) and are closed; storage
//! connections are accepted and closed.
//!
//! On start the data directory gets the `data`, `commitlog` and
//! `saved_caches` subdirectories plus a `server.yaml` describing the bound
//! configuration.

use std::fs;
use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;

use super::{EmbeddedServer, ServerFactory};
use crate::config::ServerConfig;
use crate::node::NodeInfo;
use crate::{Error, Port, Result};

/// Name of the configuration document written into the data directory.
pub const CONFIG_FILE_NAME: &str = "server.yaml";

const DATA_SUBDIRS: [&str; 3] = ["data", "commitlog", "saved_caches"];

/// Factory producing [`LoopbackServer`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackFactory;

impl ServerFactory for LoopbackFactory {
    type Server = LoopbackServer;

    fn create(&self, config: ServerConfig, node: NodeInfo) -> Result<LoopbackServer> {
        Ok(LoopbackServer::new(config, node))
    }
}

/// An embedded server backed by plain TCP listeners.
///
/// # Examples
///
/// ```
/// use discovery_fixture::config::ServerConfig;
/// use discovery_fixture::server::{EmbeddedServer, LoopbackServer};
/// use discovery_fixture::NodeInfo;
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = ServerConfig {
///     seeds: vec!["localhost".into()],
///     storage_port: 0,
///     rpc_port: 0,
///     cluster_name: "discovery".into(),
///     directory: dir.path().to_path_buf(),
/// };
///
/// let mut server = LoopbackServer::new(config, NodeInfo::default());
/// server.start().unwrap();
/// assert!(server.rpc_port().is_some());
/// server.stop().unwrap();
/// ```
#[derive(Debug)]
pub struct LoopbackServer {
    config: ServerConfig,
    node: NodeInfo,
    running: Option<Running>,
}

#[derive(Debug)]
struct Running {
    rpc: Acceptor,
    storage: Acceptor,
}

#[derive(Serialize)]
struct ServerDocument<'a> {
    #[serde(flatten)]
    config: &'a ServerConfig,
    node: &'a NodeInfo,
}

impl LoopbackServer {
    /// Creates a stopped server.
    #[must_use]
    pub fn new(config: ServerConfig, node: NodeInfo) -> Self {
        Self {
            config,
            node,
            running: None,
        }
    }

    /// Returns the configuration, with bound ports filled in once started.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns `true` while the accept threads are running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn prepare_directory(&self) -> Result<()> {
        for sub in DATA_SUBDIRS {
            fs::create_dir_all(self.config.directory.join(sub))?;
        }
        let document = ServerDocument {
            config: &self.config,
            node: &self.node,
        };
        let yaml = serde_yaml::to_string(&document)?;
        fs::write(self.config.directory.join(CONFIG_FILE_NAME), yaml)?;
        Ok(())
    }
}

impl EmbeddedServer for LoopbackServer {
    fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(Error::start_failed("server is already running"));
        }
        if !self.config.directory.is_dir() {
            return Err(Error::start_failed(format!(
                "data directory {} does not exist",
                self.config.directory.display()
            )));
        }

        let (rpc_listener, rpc_port) = bind_loopback(self.config.rpc_port)?;
        let (storage_listener, storage_port) = bind_loopback(self.config.storage_port)?;
        self.config.rpc_port = rpc_port.value();
        self.config.storage_port = storage_port.value();

        self.prepare_directory()?;

        let greeting: Arc<[u8]> =
            format!("{} {}\n", self.config.cluster_name, self.node.environment())
                .into_bytes()
                .into();
        let rpc = Acceptor::spawn("rpc", rpc_listener, rpc_port, Some(greeting))?;
        let storage = match Acceptor::spawn("storage", storage_listener, storage_port, None) {
            Ok(storage) => storage,
            Err(e) => {
                // The rpc thread is already up; take it down before failing.
                match rpc.wake() {
                    Ok(()) => {
                        if let Err(stop_err) = rpc.join() {
                            log::warn!("{stop_err}");
                        }
                    }
                    Err(stop_err) => log::warn!("detaching rpc acceptor: {stop_err}"),
                }
                return Err(e);
            }
        };

        log::debug!(
            "loopback server '{}' listening on rpc {rpc_port}, storage {storage_port}",
            self.config.cluster_name
        );
        self.running = Some(Running { rpc, storage });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Err(Error::stop_failed("server is not running"));
        };

        let woken = running.rpc.wake().and(running.storage.wake());
        if let Err(e) = woken {
            // Keep the acceptors so a later stop() can retry.
            self.running = Some(running);
            return Err(e);
        }
        let rpc = running.rpc.join();
        let storage = running.storage.join();
        rpc.and(storage)?;

        log::debug!("loopback server '{}' stopped", self.config.cluster_name);
        Ok(())
    }

    fn rpc_port(&self) -> Option<Port> {
        self.running.as_ref().map(|r| r.rpc.port)
    }

    fn storage_port(&self) -> Option<Port> {
        self.running.as_ref().map(|r| r.storage.port)
    }
}

impl Drop for LoopbackServer {
    fn drop(&mut self) {
        if self.running.is_some() {
            if let Err(e) = self.stop() {
                log::warn!("failed to stop loopback server on drop, detaching acceptors: {e}");
            }
        }
    }
}

fn bind_loopback(port: u16) -> Result<(TcpListener, Port)> {
    let address = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = TcpListener::bind(address).map_err(|source| Error::Bind { address, source })?;
    let bound = Port::try_from(listener.local_addr()?.port())?;
    Ok((listener, bound))
}

/// One listener plus the thread accepting on it.
#[derive(Debug)]
struct Acceptor {
    port: Port,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl Acceptor {
    fn spawn(
        name: &str,
        listener: TcpListener,
        port: Port,
        greeting: Option<Arc<[u8]>>,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name(format!("loopback-{name}-{port}"))
            .spawn(move || accept_loop(&listener, &thread_stop, greeting.as_deref()))?;

        Ok(Self { port, stop, thread })
    }

    /// Signals the accept loop and unblocks its pending `accept()`.
    ///
    /// Succeeds without connecting once the thread has exited, so a failed
    /// wake-up can be retried.
    fn wake(&self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        if self.thread.is_finished() {
            return Ok(());
        }
        TcpStream::connect((Ipv4Addr::LOCALHOST, self.port.value()))
            .map(drop)
            .map_err(|e| {
                Error::stop_failed(format!("could not wake acceptor on {}: {e}", self.port))
            })
    }

    /// Waits for a woken accept loop to exit.
    fn join(self) -> Result<()> {
        self.thread
            .join()
            .map_err(|_| Error::stop_failed(format!("acceptor on {} panicked", self.port)))
    }
}

fn accept_loop(listener: &TcpListener, stop: &AtomicBool, greeting: Option<&[u8]>) {
    for stream in listener.incoming() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        match stream {
            Ok(mut stream) => {
                if let Some(greeting) = greeting {
                    if let Err(e) = stream.write_all(greeting) {
                        log::debug!("failed to greet client: {e}");
                    }
                }
            }
            Err(e) => log::debug!("accept failed: {e}"),
        }
    }
}

/// Reads the configuration document a started server wrote into `directory`.
///
/// # Errors
///
/// Returns an error if the file is missing or is not valid YAML.
pub fn read_server_document(directory: &Path) -> Result<serde_yaml::Value> {
    let contents = fs::read_to_string(directory.join(CONFIG_FILE_NAME))?;
    Ok(serde_yaml::from_str(&contents)?)
}
