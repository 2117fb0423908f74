//! Server configuration module.
//!
//! This module provides configuration loading for the token gate from
//! environment variables. An optional `.env` file in the working directory
//! (or one of its parents) is read first; variables already present in the
//! process environment take precedence over the file.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: HS256 signing key (required, non-empty)
//! - `TOKEN_GATE_LISTEN_ADDRESS`: Address to bind (default: `0.0.0.0`)
//! - `TOKEN_GATE_LISTEN_PORT`: Port to listen on (default: `8080`)
//!
//! # Invariants
//!
//! - `signing_key` is never empty
//! - `listen_port` is always a valid port number

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::auth::SigningKey;

/// Name of the variable holding the signing key.
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
/// Name of the variable holding the bind address.
pub const LISTEN_ADDRESS_VAR: &str = "TOKEN_GATE_LISTEN_ADDRESS";
/// Name of the variable holding the listen port.
pub const LISTEN_PORT_VAR: &str = "TOKEN_GATE_LISTEN_PORT";

/// Server configuration.
///
/// # Post-conditions
///
/// - A `ServerConfig` always holds a usable signing key, so a missing key is
///   reported at startup rather than on the first login.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Key shared by the token issuer and verifier.
    pub signing_key: SigningKey,
    /// Address to bind.
    pub listen_address: IpAddr,
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
    /// The `.env` file exists but could not be read or parsed.
    EnvFile(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
            Self::EnvFile(message) => write!(f, "failed to load .env file: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load `.env` from the working directory or the nearest parent that has one.
///
/// Returns the path that was loaded, or `None` when there is no such file.
///
/// # Errors
///
/// Returns `ConfigError::EnvFile` if a file was found but is unreadable or
/// malformed.
pub fn load_env_file() -> Result<Option<PathBuf>, ConfigError> {
    settle_env_file(dotenvy::dotenv())
}

/// Load a specific env file. Same contract as [`load_env_file`].
///
/// # Errors
///
/// Returns `ConfigError::EnvFile` if the file is unreadable or malformed.
pub fn load_env_file_from(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
    settle_env_file(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn settle_env_file(result: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 8080;
    /// Default bind address: every interface.
    pub const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is not set or is empty
    /// - `TOKEN_GATE_LISTEN_ADDRESS` is set but not an IP address
    /// - `TOKEN_GATE_LISTEN_PORT` is set but not a valid port number
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let signing_key = Self::load_signing_key(&lookup)?;
        let listen_address = Self::load_listen_address(&lookup)?;
        let listen_port = Self::load_listen_port(&lookup)?;

        Ok(Self {
            signing_key,
            listen_address,
            listen_port,
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.listen_port)
    }

    /// Load the signing key.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or is empty.
    fn load_signing_key(lookup: &impl Fn(&str) -> Option<String>) -> Result<SigningKey, ConfigError> {
        let secret =
            lookup(JWT_SECRET_VAR).ok_or_else(|| ConfigError::MissingEnvVar(JWT_SECRET_VAR.to_string()))?;

        SigningKey::new(secret).map_err(|e| ConfigError::InvalidValue {
            name: JWT_SECRET_VAR.to_string(),
            message: e.to_string(),
        })
    }

    /// Load the bind address.
    ///
    /// Returns the default if not set.
    fn load_listen_address(lookup: &impl Fn(&str) -> Option<String>) -> Result<IpAddr, ConfigError> {
        match lookup(LISTEN_ADDRESS_VAR) {
            Some(value) => value.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                name: LISTEN_ADDRESS_VAR.to_string(),
                message: format!("'{value}' is not a valid IP address"),
            }),
            None => Ok(Self::DEFAULT_ADDRESS),
        }
    }

    /// Load the listen port.
    ///
    /// Returns the default if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is set but not a valid port number.
    fn load_listen_port(lookup: &impl Fn(&str) -> Option<String>) -> Result<u16, ConfigError> {
        match lookup(LISTEN_PORT_VAR) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: LISTEN_PORT_VAR.to_string(),
                message: format!("'{value}' is not a valid port number (must be 0-65535)"),
            }),
            None => Ok(Self::DEFAULT_PORT),
        }
    }
}
