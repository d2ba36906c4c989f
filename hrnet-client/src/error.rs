//! Client error types.

use hrnet_protocol::{ErrorInfo, ProtocolError};
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0} timeout")]
    Timeout(&'static str),

    /// The server answered with `success=false`.
    #[error("request rejected: {0}")]
    Rejected(ErrorInfo),

    #[error("unexpected record in response: {0}")]
    UnexpectedRecord(String),
}

impl ClientError {
    /// Returns whether the exchange itself failed, as opposed to the server
    /// rejecting the request.
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Io(_) | ClientError::Timeout(_) => true,
            ClientError::Protocol(e) => e.is_transport(),
            _ => false,
        }
    }

    /// Returns the server's error document when the request was rejected.
    pub fn rejection(&self) -> Option<&ErrorInfo> {
        match self {
            ClientError::Rejected(info) => Some(info),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_access() {
        let err = ClientError::Rejected(ErrorInfo::message("Clerk already exists"));
        assert!(!err.is_transport());
        assert_eq!(err.rejection().unwrap().message, "Clerk already exists");
        assert_eq!(err.to_string(), "request rejected: Clerk already exists");
    }

    #[test]
    fn test_transport_classification() {
        assert!(ClientError::Timeout("connect").is_transport());
        let closed = ProtocolError::ConnectionClosed {
            expected: 10,
            received: 3,
        };
        assert!(ClientError::from(closed).is_transport());
        assert!(!ClientError::from(ProtocolError::InvalidUtf8).is_transport());
    }
}
