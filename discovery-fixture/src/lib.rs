#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # discovery-fixture
//!
//! Lifecycle fixture for the embedded store used by discovery service test
//! suites.
//!
//! A [`FixtureController`] starts one embedded server on ephemeral ports in a
//! fresh temporary directory, reports its RPC port, and tears everything down
//! again. Start and stop are each performed at most once, no matter how many
//! threads call them.
//!
//! ## Core Types
//!
//! - [`FixtureController`] and [`ServerInfo`]: the lifecycle controller
//! - [`EmbeddedServer`] and [`ServerFactory`]: the server seam
//! - [`FixtureConfig`] and [`FixtureConfigBuilder`]: configuration
//! - [`Port`]: validated port numbers and probing helpers
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use discovery_fixture::{FixtureConfigBuilder, FixtureController, LoopbackFactory};
//!
//! let config = FixtureConfigBuilder::new().skip_env().build().unwrap();
//! let fixture = FixtureController::new(LoopbackFactory, config);
//!
//! fixture.start().unwrap();
//! fixture.start().unwrap(); // no-op
//! println!("rpc port: {}", fixture.server_info().unwrap().rpc_port());
//! fixture.stop().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod node;
pub mod port;
pub mod server;
pub mod shared;

// Re-export key types at crate root for convenience
pub use config::{FixtureConfig, FixtureConfigBuilder, PortStrategy, ServerConfig};
pub use error::{Error, Result, ServerAction};
pub use fixture::{FixtureController, FixtureState, ServerInfo};
pub use logging::{init_logger, LogLevel, Logger};
pub use node::NodeInfo;
pub use port::Port;
pub use server::{EmbeddedServer, LoopbackFactory, LoopbackServer, ServerFactory};
