//! Request and response envelopes.
//!
//! Envelopes are encoded in two levels. The outer envelope carries routing
//! metadata (`manager`, `action`, `success`) next to string fields that hold
//! an *already encoded* inner document. The dispatcher can therefore route a
//! request without knowing anything about the payload schema; the inner
//! document is decoded later by whoever asked for it.

use crate::codec::{from_document, to_document};
use crate::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The canonical empty document, used when an envelope field carries nothing.
pub const EMPTY_DOCUMENT: &str = "{}";

/// Returns whether `document` is the empty-document sentinel.
pub fn is_empty_document(document: &str) -> bool {
    document.trim() == EMPTY_DOCUMENT
}

/// Request message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    manager: String,
    action: String,
    #[serde(rename = "json_string")]
    payload: String,
}

impl Request {
    /// Creates a request with the empty-document payload.
    pub fn new(manager: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            manager: manager.into(),
            action: action.into(),
            payload: EMPTY_DOCUMENT.to_string(),
        }
    }

    /// Creates a request whose payload is the encoding of `payload`.
    pub fn with_payload<T: Serialize>(
        manager: impl Into<String>,
        action: impl Into<String>,
        payload: &T,
    ) -> Result<Self, ProtocolError> {
        Ok(Self::with_document(manager, action, to_document(payload)?))
    }

    /// Creates a request from an already encoded payload document.
    pub fn with_document(
        manager: impl Into<String>,
        action: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            manager: manager.into(),
            action: action.into(),
            payload: document.into(),
        }
    }

    pub fn manager(&self) -> &str {
        &self.manager
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the encoded payload document.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns whether the payload is the empty-document sentinel.
    pub fn has_empty_payload(&self) -> bool {
        is_empty_document(&self.payload)
    }

    /// Decodes the payload document as `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        from_document(&self.payload)
    }
}

/// Kind of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldErrorKind {
    /// The field holds a value of the wrong type.
    #[serde(rename = "T")]
    Type,
    /// The field has the right type but an unacceptable value.
    #[serde(rename = "V")]
    Value,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorKind::Type => write!(f, "T"),
            FieldErrorKind::Value => write!(f, "V"),
        }
    }
}

/// One field-level validation failure, serialized as `["V", "message"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError(pub FieldErrorKind, pub String);

impl FieldError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self(FieldErrorKind::Type, message.into())
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self(FieldErrorKind::Value, message.into())
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.0
    }

    pub fn message(&self) -> &str {
        &self.1
    }
}

/// Field name to failure, ordered by field name.
pub type FieldErrors = BTreeMap<String, FieldError>;

/// Error details carried inside a failed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable message; empty for pure validation failures.
    #[serde(default)]
    pub message: String,

    /// Per-field failures, absent for application errors.
    #[serde(default)]
    pub exceptions: Option<FieldErrors>,
}

impl ErrorInfo {
    /// An application error with no field attribution.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exceptions: None,
        }
    }

    /// A validation error carrying per-field failures.
    pub fn fields(exceptions: FieldErrors) -> Self {
        Self {
            message: String::new(),
            exceptions: Some(exceptions),
        }
    }

    /// Returns whether this error carries field-level failures.
    pub fn is_validation(&self) -> bool {
        self.exceptions.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Iterates over field failures, if any.
    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.exceptions
            .iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        }
        for (i, (field, error)) in self.field_errors().enumerate() {
            if i > 0 || !self.message.is_empty() {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, error.message())?;
        }
        Ok(())
    }
}

/// Response message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    success: bool,
    #[serde(rename = "error_json")]
    error: String,
    #[serde(rename = "result_json")]
    result: String,
}

impl Response {
    /// A successful response with no result document.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: EMPTY_DOCUMENT.to_string(),
            result: EMPTY_DOCUMENT.to_string(),
        }
    }

    /// A successful response whose result is the encoding of `result`.
    pub fn ok_with<T: Serialize>(result: &T) -> Result<Self, ProtocolError> {
        Ok(Self::ok_with_document(to_document(result)?))
    }

    /// A successful response from an already encoded result document.
    pub fn ok_with_document(document: impl Into<String>) -> Self {
        Self {
            success: true,
            error: EMPTY_DOCUMENT.to_string(),
            result: document.into(),
        }
    }

    /// A failed response carrying `error`.
    pub fn failure(error: &ErrorInfo) -> Self {
        // ErrorInfo holds only strings and maps of strings.
        let error = serde_json::to_string(error).unwrap_or_else(|_| EMPTY_DOCUMENT.to_string());
        Self {
            success: false,
            error,
            result: EMPTY_DOCUMENT.to_string(),
        }
    }

    /// A failed response with only a message.
    pub fn error_message(message: impl Into<String>) -> Self {
        Self::failure(&ErrorInfo::message(message))
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the encoded error document.
    pub fn error_document(&self) -> &str {
        &self.error
    }

    /// Returns the encoded result document.
    pub fn result_document(&self) -> &str {
        &self.result
    }

    /// Decodes the error document, or `None` when it is the sentinel.
    pub fn error_info(&self) -> Result<Option<ErrorInfo>, ProtocolError> {
        if is_empty_document(&self.error) {
            return Ok(None);
        }
        from_document(&self.error).map(Some)
    }

    /// Decodes the result document as `T`.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        from_document(&self.result)
    }
}
