//! Server configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (`--config`, HRNET_CONFIG, or `serverconf.cfg` when present)
//! 3. Environment variables
//!
//! The result is validated before the server binds. YAML is a superset of
//! JSON, so a plain `{"port": 5500}` document is accepted as is.

use crate::server::ServerConfig;
use hrnet_protocol::{LOCAL_HOST, MAX_PAYLOAD_SIZE, PORT_RANGE};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file looked for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "serverconf.cfg";

/// Server configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port to listen on; required.
    pub port: Option<i64>,
    /// Maximum concurrently served connections.
    pub max_connections: usize,
    /// Read deadline per connection in seconds (0 = none).
    pub read_timeout_secs: u64,
    /// Write deadline per connection in seconds (0 = none).
    pub write_timeout_secs: u64,
    /// Largest accepted frame body in bytes.
    pub max_frame_bytes: usize,
    /// Time given to in-flight connections after shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: None,
            max_connections: 256,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            max_frame_bytes: MAX_PAYLOAD_SIZE,
            shutdown_grace_secs: 10,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, HRNET_CONFIG or the default file,
    /// then applies environment variable overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_port(path, None)
    }

    /// Like [`Config::load`], with a port that overrides every other source.
    pub fn load_with_port(path: Option<&Path>, port: Option<u16>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("HRNET_CONFIG").ok().map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        if let Some(port) = port {
            config.port = Some(i64::from(port));
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML (or JSON) file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Self::parse(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Parses a configuration document.
    pub fn parse(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// A configuration listening on `port` with default limits.
    pub fn with_port(port: u16) -> Self {
        Self {
            port: Some(i64::from(port)),
            ..Self::default()
        }
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `var`. A port that does not parse is
    /// an error; the other keys keep their value when unparsable.
    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = var("HRNET_PORT") {
            let n = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "HRNET_PORT value {:?} is not an integer port",
                    port
                ))
            })?;
            self.port = Some(n);
        }

        if let Some(max) = var("HRNET_MAX_CONNECTIONS") {
            if let Ok(n) = max.parse() {
                self.max_connections = n;
            }
        }

        if let Some(timeout) = var("HRNET_READ_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.read_timeout_secs = secs;
            }
        }

        if let Some(timeout) = var("HRNET_WRITE_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.write_timeout_secs = secs;
            }
        }
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let port = match self.port {
            None => {
                return Err(ConfigError::ValidationError(
                    "port entry is missing in configuration, refer documentation".to_string(),
                ))
            }
            Some(port) => port,
        };
        let in_range = u16::try_from(port).is_ok_and(|p| PORT_RANGE.contains(&p));
        if !in_range {
            return Err(ConfigError::ValidationError(format!(
                "Port Value is {}, it should be within Range({},{})",
                port,
                PORT_RANGE.start(),
                PORT_RANGE.end()
            )));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_frame_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the validated port.
    pub fn port(&self) -> Result<u16, ConfigError> {
        self.validate()?;
        self.port
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| ConfigError::ValidationError("port is not set".to_string()))
    }

    /// Returns the loopback address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host: IpAddr = LOCAL_HOST
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("invalid host {}", LOCAL_HOST)))?;
        Ok(SocketAddr::new(host, self.port()?))
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        secs(self.write_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Converts this document into the runtime server configuration.
    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        Ok(ServerConfig {
            bind_addr: self.bind_addr()?,
            max_connections: self.max_connections,
            read_timeout: self.read_timeout(),
            write_timeout: self.write_timeout(),
            max_frame_bytes: self.max_frame_bytes,
            shutdown_grace: self.shutdown_grace(),
        })
    }
}

fn secs(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
