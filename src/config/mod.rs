// Configuration module entry point
// Loads the layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, DropboxConfig};

/// Environment variable holding the provider bearer credential
pub const ACCESS_TOKEN_ENV: &str = "DROPBOX_ACCESS_TOKEN";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::build(config_path, std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    /// Assemble file, `CMS_*` environment and defaults, with `access_token`
    /// taking precedence over anything the file says.
    fn build(config_path: &str, access_token: Option<String>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CMS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "dropbox-md-cms")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("dropbox.api_url", "https://api.dropboxapi.com")?
            .set_default("dropbox.content_url", "https://content.dropboxapi.com")?
            .set_override_option("dropbox.access_token", access_token)?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Refuse to run with an unauthenticated provider client
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.dropbox.access_token.trim().is_empty() {
            return Err(config::ConfigError::Message(format!(
                "{ACCESS_TOKEN_ENV} is not set; refusing to start without a provider credential"
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
impl Config {
    /// Defaults plus a fixed credential, for handler tests
    pub fn for_tests() -> Self {
        Self::build("config-does-not-exist", Some("test-token".to_string()))
            .expect("default test configuration")
    }
}
