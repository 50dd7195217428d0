//! # Remote Configuration
//!
//! TOML file, then `MR_*` environment overrides, then validation.
//!
//! ```toml
//! [network]
//! bind_address = "0.0.0.0"
//! port = 5005
//! read_timeout_ms = 500
//!
//! [security]
//! secret = "change-me"
//! digest = "md5"
//!
//! [media]
//! root = "/srv/media"
//! allow_hidden = false
//! filetypes = ["mkv", "mp4"]
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! ## Environment Variables
//!
//! - `MR_BIND_ADDRESS`, `MR_PORT`: listen address
//! - `MR_SECRET`: shared secret (required if absent from the file)
//! - `MR_DIGEST`: `md5` or `sha256`
//! - `MR_MEDIA_ROOT`: media root directory
//! - `MR_LOG_LEVEL`, `MR_JSON_LOGS`: logging

use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Authenticator, DigestAlgorithm, MediaPolicy, SharedSecret};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// No shared secret was configured.
    #[error("no shared secret configured; set security.secret or MR_SECRET")]
    MissingSecret,

    /// Port 0 is not a listen port.
    #[error("network.port must be non-zero")]
    InvalidPort,

    /// A zero read timeout would block shutdown forever.
    #[error("network.read_timeout_ms must be non-zero")]
    InvalidTimeout,

    /// A value failed to parse.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Config key or environment variable.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Listen socket.
    pub network: NetworkConfig,
    /// Shared secret and digest.
    pub security: SecurityConfig,
    /// Media path policy.
    pub media: MediaPolicy,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// IP address to bind.
    pub bind_address: String,
    /// UDP port.
    pub port: u16,
    /// Socket read timeout; bounds shutdown latency.
    pub read_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5005,
            read_timeout_ms: 500,
        }
    }
}

/// Security configuration.
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Shared secret. MUST be set.
    pub secret: Option<String>,
    /// HMAC digest.
    pub digest: DigestAlgorithm,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("digest", &self.digest)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` directive).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RemoteConfig {
    /// Load `path` (if any), apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&text)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without overrides or validation.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `MR_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `MR_*` overrides from `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("MR_BIND_ADDRESS") {
            self.network.bind_address = address;
        }
        if let Some(port) = lookup("MR_PORT") {
            self.network.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MR_PORT",
                value: port,
            })?;
        }
        if let Some(secret) = lookup("MR_SECRET") {
            self.security.secret = Some(secret);
        }
        if let Some(digest) = lookup("MR_DIGEST") {
            self.security.digest = digest.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MR_DIGEST",
                value: digest,
            })?;
        }
        if let Some(root) = lookup("MR_MEDIA_ROOT") {
            self.media.root = PathBuf::from(root);
        }
        if let Some(level) = lookup("MR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("MR_JSON_LOGS") {
            self.logging.json = json.eq_ignore_ascii_case("true") || json == "1";
        }
        Ok(())
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.secret.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingSecret);
        }
        if self.network.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.network.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.listen_addr()?;
        Ok(())
    }

    /// Socket address to bind.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr =
            self.network
                .bind_address
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "network.bind_address",
                    value: self.network.bind_address.clone(),
                })?;
        Ok(SocketAddr::new(ip, self.network.port))
    }

    /// Socket read timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.network.read_timeout_ms)
    }

    /// Build the authenticator for the configured secret and digest.
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        match self.security.secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(Authenticator::new(
                SharedSecret::from(secret),
                self.security.digest,
            )),
            _ => Err(ConfigError::MissingSecret),
        }
    }
}
