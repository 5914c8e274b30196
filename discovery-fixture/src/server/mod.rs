//! The embedded server seam.
//!
//! The fixture never talks to a concrete database server directly. It asks a
//! [`ServerFactory`] for an [`EmbeddedServer`] built from a [`ServerConfig`]
//! and a [`NodeInfo`], then drives its start/stop lifecycle.
//!
//! [`LoopbackServer`] is the in-tree implementation: it binds real TCP
//! listeners for the RPC and storage ports and lays out a data directory.

pub mod loopback;

pub use loopback::{LoopbackFactory, LoopbackServer};

use crate::config::ServerConfig;
use crate::node::NodeInfo;
use crate::{Port, Result};

/// An in-process server the fixture can start and stop.
///
/// Implementations report the ports they actually bound, which lets the
/// fixture pass port 0 and avoid the probe-then-rebind race.
#[cfg_attr(test, mockall::automock)]
pub trait EmbeddedServer: Send {
    /// Starts the server. Blocks until it is accepting connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be brought up.
    fn start(&mut self) -> Result<()>;

    /// Stops the server. Blocks until it has released its ports.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be taken down.
    fn stop(&mut self) -> Result<()>;

    /// The RPC port the server is listening on, once started.
    fn rpc_port(&self) -> Option<Port>;

    /// The storage port the server is listening on, once started.
    fn storage_port(&self) -> Option<Port>;
}

/// Creates embedded servers for a fixture.
///
/// Any `Fn(ServerConfig, NodeInfo) -> Result<S>` closure is a factory.
pub trait ServerFactory: Send + Sync {
    /// The server type produced.
    type Server: EmbeddedServer;

    /// Builds a server that has not been started yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    fn create(&self, config: ServerConfig, node: NodeInfo) -> Result<Self::Server>;
}

impl<S, F> ServerFactory for F
where
    S: EmbeddedServer,
    F: Fn(ServerConfig, NodeInfo) -> Result<S> + Send + Sync,
{
    type Server = S;

    fn create(&self, config: ServerConfig, node: NodeInfo) -> Result<S> {
        self(config, node)
    }
}
