//! Server module
//!
//! Owns the listener lifecycle. A `Server` starts out unstarted (routes
//! registered, nothing bound); `bind` turns it into a `Listening` server,
//! which accepts connections until the process exits.

mod connection;
mod listener;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::logger;
use crate::routing::RouteTable;
use connection::accept_connection;
use listener::create_listener;

/// Routes registered, socket not bound
pub struct Server {
    state: Arc<AppState>,
}

/// Socket bound, accepting connections indefinitely
pub struct Listening {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: Config, routes: RouteTable) -> Self {
        Self {
            state: Arc::new(AppState::new(config, routes)),
        }
    }

    /// Bind the configured address. Must be called from within a Tokio runtime.
    pub fn bind(self) -> io::Result<Listening> {
        let addr = self
            .state
            .config
            .get_socket_addr()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if self.state.routes.is_empty() {
            logger::log_warning("No routes registered; every request will get 404");
        }
        let listener = create_listener(addr)?;
        Ok(Listening {
            listener,
            state: self.state,
        })
    }
}

impl Listening {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Accept loop; each connection is served on its own task.
    ///
    /// There is no stopped state: this only ends with the process.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &self.state),
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            }
        }
    }
}
