//! Protocol error types.

use thiserror::Error;

/// Protocol-level errors that can occur during framing or envelope coding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid frame header: {0:?} is not a decimal length")]
    InvalidHeader(String),

    #[error("frame length {0} does not fit in the header field")]
    HeaderOverflow(usize),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("connection closed mid-frame: expected {expected} bytes, received {received}")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid UTF-8 in payload")]
    InvalidUtf8,

    #[error("unknown type tag: {0}")]
    UnknownTypeTag(String),

    #[error("type tag mismatch: expected {expected}, found {found}")]
    TypeTagMismatch { expected: String, found: String },

    #[error("value {value} cannot be read as {tag}")]
    InvalidPrimitive { tag: String, value: String },
}

/// Which side of the error taxonomy a [`ProtocolError`] falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The byte stream itself failed: socket errors, bad headers, early EOF.
    Transport,
    /// The bytes arrived but do not form the expected document.
    Decode,
}

impl ProtocolError {
    /// Classifies this error as a transport or decode failure.
    pub fn class(&self) -> ErrorClass {
        match self {
            ProtocolError::InvalidHeader(_)
            | ProtocolError::HeaderOverflow(_)
            | ProtocolError::FrameTooLarge { .. }
            | ProtocolError::ConnectionClosed { .. }
            | ProtocolError::Io(_) => ErrorClass::Transport,
            ProtocolError::Json(_)
            | ProtocolError::InvalidUtf8
            | ProtocolError::UnknownTypeTag(_)
            | ProtocolError::TypeTagMismatch { .. }
            | ProtocolError::InvalidPrimitive { .. } => ErrorClass::Decode,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.class() == ErrorClass::Transport
    }

    pub fn is_decode(&self) -> bool {
        self.class() == ErrorClass::Decode
    }
}
