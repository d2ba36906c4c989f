//! Core error types.

use hrnet_protocol::{ErrorInfo, FieldErrors, ProtocolError};
use thiserror::Error;

/// Errors from record validation and the directory.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("designation lookup failed: {0}")]
    Lookup(String),

    #[error("malformed record document: {0}")]
    Protocol(#[from] ProtocolError),
}

impl CoreError {
    /// Returns an error code suitable for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::InvalidArgument(_) => "BAD_REQUEST",
            CoreError::Lookup(_) => "LOOKUP_FAILED",
            CoreError::Protocol(_) => "BAD_REQUEST",
        }
    }

    /// Converts this error into the details carried by a failed response.
    ///
    /// Validation failures keep their per-field map; every other error
    /// becomes a plain message.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            CoreError::Validation(fields) => ErrorInfo::fields(fields.clone()),
            other => ErrorInfo::message(other.to_string()),
        }
    }
}

impl From<CoreError> for ErrorInfo {
    fn from(err: CoreError) -> Self {
        err.to_error_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrnet_protocol::FieldError;

    #[test]
    fn test_validation_keeps_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("code".into(), FieldError::type_mismatch("code is of type str"));
        let info = CoreError::Validation(fields).to_error_info();

        assert!(info.is_validation());
        assert!(info.message.is_empty());
    }

    #[test]
    fn test_application_error_is_message() {
        let info = CoreError::NotFound("Code : 9 does not exists".into()).to_error_info();
        assert_eq!(info.message, "Code : 9 does not exists");
        assert!(info.exceptions.is_none());

        let info = ErrorInfo::from(CoreError::Lookup("directory unavailable".into()));
        assert_eq!(info.message, "designation lookup failed: directory unavailable");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CoreError::Conflict("x".into()).error_code(), "CONFLICT");
        assert_eq!(
            CoreError::Validation(FieldErrors::new()).error_code(),
            "VALIDATION"
        );
    }
}
