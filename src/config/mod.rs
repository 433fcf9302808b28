// Configuration module entry point
// Loads the immutable startup configuration and the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Environment prefix for nested overrides, e.g. `DEMO_ROUTER_LOGGING__LEVEL`
const ENV_PREFIX: &str = "DEMO_ROUTER";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The bare `PORT` variable overrides `server.port` when set and non-empty.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let port = std::env::var("PORT").ok().filter(|p| !p.trim().is_empty());
        Self::build(config_path, port)
    }

    fn build(config_path: &str, port: Option<String>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("http.server_name", "Rust backend")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.files_dir", ".")?
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
impl Config {
    /// Defaults only, with the given port and files directory
    pub fn for_tests(port: u16, files_dir: &str) -> Self {
        let mut cfg = Self::build("does-not-exist", None).expect("default config");
        cfg.server.port = port;
        cfg.logging.access_log = false;
        cfg.http.files_dir = files_dir.to_string();
        cfg
    }
}
