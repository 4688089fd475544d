use crate::error::ConfigError;
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

/// Where the HTTP layer listens and what it serves outside of `/api`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// The interface to bind (e.g., "0.0.0.0").
    pub host: String,
    /// The listen port. Defaults to 3000.
    pub port: u16,
    /// Directory holding the landing page and its static assets.
    pub public_dir: PathBuf,
}

/// Connection parameters for the MySQL server hosting the `items` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// The database that provisioning creates and the application pool binds to.
    pub name: String,
    /// Ceiling on concurrent connections in the application pool.
    pub max_connections: u32,
    /// How long a request waits in the pool queue before giving up.
    pub acquire_timeout_secs: u64,
}

impl Settings {
    /// Checks the values that the loader cannot enforce through types alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.server.socket_addr()?;
        Ok(())
    }
}

impl ServerSettings {
    /// Resolves `host` (an IP address or a host name) to the address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let unresolved = || {
            ConfigError::ValidationError(format!("SERVER_HOST '{}' could not be resolved", self.host))
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| unresolved())?
            .next()
            .ok_or_else(unresolved)
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError("DB_NAME must be set.".to_string()));
        }
        // The name ends up inside a backtick-quoted identifier.
        if self.name.contains('`') || self.name.contains('\0') {
            return Err(ConfigError::ValidationError(format!(
                "DB_NAME '{}' contains characters not allowed in a database name",
                self.name
            )));
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::ValidationError("DB_USER must be set.".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
