//! Server error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Server errors.
///
/// Any of these ends the exchange on the connection it occurred on; none of
/// them is ever turned into a response.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] hrnet_protocol::ProtocolError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("timed out during {0}")]
    Timeout(&'static str),

    #[error("handler failed: {0}")]
    Handler(String),
}

impl ServerError {
    /// Returns whether the byte stream itself failed.
    pub fn is_transport(&self) -> bool {
        match self {
            ServerError::Io(_) | ServerError::Timeout(_) => true,
            ServerError::Protocol(e) => e.is_transport(),
            _ => false,
        }
    }

    /// Returns whether the bytes arrived but did not decode.
    pub fn is_decode(&self) -> bool {
        matches!(self, ServerError::Protocol(e) if e.is_decode())
    }
}
