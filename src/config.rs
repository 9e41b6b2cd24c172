//! Configuration management for the Rax auth server
//!
//! Separates startup configuration (requires restart) from runtime
//! configuration (read by each connection as it is used, behind a lock).
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. `rax-auth/config.toml` then `config.toml`, both optional
//! 3. `RAX_AUTH_*` environment variables, e.g. `RAX_AUTH_PORT=4000`

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::auth::PasswordScheme;

/// Complete server configuration with startup/runtime separation
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

/// Where the credential store keeps its slots.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost on restart; handy for demos and tests.
    Memory,
    /// One JSON file per slot under `storage_dir`.
    File,
}

/// Configuration that requires server restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    /// IP address to bind the listener
    pub bind_address: String,

    /// Port to listen on
    pub port: u16,

    pub storage_backend: StorageBackend,

    /// Directory holding slot files when `storage_backend = "file"`
    pub storage_dir: String,

    /// `plaintext` or `argon2`. Plaintext matches stores written by the
    /// browser demo; argon2 is the one to use for anything real.
    pub password_scheme: PasswordScheme,

    /// Longest accepted command line, in bytes
    pub max_command_length: usize,
}

/// Configuration that can be updated while the server is running
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Maximum concurrent clients
    /// Environment: RAX_AUTH_MAX_CLIENTS
    pub max_clients: usize,

    /// Sign-in attempts allowed per peer address within the window
    /// Environment: RAX_AUTH_MAX_SIGNIN_ATTEMPTS
    pub max_signin_attempts: usize,

    /// Environment: RAX_AUTH_SIGNIN_WINDOW_SECS
    pub signin_window_secs: u64,
}

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

impl ServerConfig {
    /// Load configuration from defaults, optional TOML files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("rax-auth/config").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RAX_AUTH").try_parsing(true));

        Self::from_builder(builder)
    }

    /// Builder preloaded with the built-in defaults
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 2323_i64)?
            .set_default("storage_backend", "file")?
            .set_default("storage_dir", "./auth_data")?
            .set_default("password_scheme", "plaintext")?
            .set_default("max_command_length", 4096_i64)?
            .set_default("max_clients", 10_i64)?
            .set_default("max_signin_attempts", 5_i64)?
            .set_default("signin_window_secs", 60_i64)
    }

    /// Build and validate from an assembled source stack
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.startup.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.startup.bind_address.trim().is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.startup.storage_backend == StorageBackend::File
            && self.startup.storage_dir.trim().is_empty()
        {
            return Err(ConfigError::Message(
                "storage_dir cannot be empty with the file backend".into(),
            ));
        }

        if self.startup.max_command_length < 64 {
            return Err(ConfigError::Message(
                "max_command_length must be at least 64".into(),
            ));
        }

        if self.runtime.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.runtime.max_signin_attempts == 0 {
            return Err(ConfigError::Message(
                "max_signin_attempts must be greater than 0".into(),
            ));
        }

        if self.runtime.signin_window_secs == 0 {
            return Err(ConfigError::Message(
                "signin_window_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir)
    }
}

impl RuntimeConfig {
    pub fn signin_window(&self) -> Duration {
        Duration::from_secs(self.signin_window_secs)
    }
}
