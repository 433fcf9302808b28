// Application state module
// Immutable per-process state shared by the listener and every handler

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::routing::RouteTable;

/// Application state, resolved once before the listener starts
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    /// Live connection count, checked against `performance.max_connections`
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, routes: RouteTable) -> Self {
        Self {
            config,
            routes,
            active_connections: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Default config on an ephemeral port with the standard routes
    pub fn for_tests(files_dir: &str) -> Self {
        Self::new(Config::for_tests(0, files_dir), RouteTable::standard())
    }
}
