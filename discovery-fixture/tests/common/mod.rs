//! Common test utilities for integration tests.
//!
//! This module provides a counting [`EmbeddedServer`] and helpers for
//! building fixtures around it. Not every test binary uses every helper.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use discovery_fixture::{
    EmbeddedServer, FixtureConfig, FixtureConfigBuilder, NodeInfo, Port, Result, ServerConfig,
    ServerFactory,
};

/// Shared counters observed by tests.
#[derive(Debug, Default)]
pub struct Counters {
    pub created: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub directories: Mutex<Vec<PathBuf>>,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The data directory handed to the most recently created server.
    pub fn last_directory(&self) -> Option<PathBuf> {
        self.directories.lock().unwrap().last().cloned()
    }
}

/// A server that only counts lifecycle calls.
///
/// With `remove_dir_on_stop` set, `stop()` deletes the data directory itself,
/// which makes the fixture's own cleanup fail afterwards.
pub struct CountingServer {
    counters: Arc<Counters>,
    directory: PathBuf,
    remove_dir_on_stop: bool,
}

impl EmbeddedServer for CountingServer {
    fn start(&mut self) -> Result<()> {
        self.counters.started.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which concurrent callers could interleave.
        std::thread::sleep(std::time::Duration::from_millis(5));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        if self.remove_dir_on_stop {
            std::fs::remove_dir_all(&self.directory)?;
        }
        Ok(())
    }

    fn rpc_port(&self) -> Option<Port> {
        Port::try_from(9160).ok()
    }

    fn storage_port(&self) -> Option<Port> {
        Port::try_from(7000).ok()
    }
}

/// Factory for [`CountingServer`]s sharing one set of counters.
#[derive(Clone, Default)]
pub struct CountingFactory {
    pub counters: Arc<Counters>,
    pub remove_dir_on_stop: bool,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn removing_dir_on_stop() -> Self {
        Self {
            remove_dir_on_stop: true,
            ..Self::default()
        }
    }
}

impl ServerFactory for CountingFactory {
    type Server = CountingServer;

    fn create(&self, config: ServerConfig, _node: NodeInfo) -> Result<CountingServer> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        self.counters
            .directories
            .lock()
            .unwrap()
            .push(config.directory.clone());
        Ok(CountingServer {
            counters: Arc::clone(&self.counters),
            directory: config.directory,
            remove_dir_on_stop: self.remove_dir_on_stop,
        })
    }
}

/// Default configuration that ignores the process environment.
pub fn isolated_config() -> FixtureConfig {
    FixtureConfigBuilder::new()
        .skip_env()
        .build()
        .expect("default configuration should be valid")
}
