//! Designation records.

use crate::error::CoreError;
use crate::validation::{check_length, check_non_negative, FieldReader};
use hrnet_protocol::{from_document, Tagged};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length of a designation title, in characters.
pub const MAX_TITLE_LEN: usize = 35;

/// A job title with its numeric code.
///
/// Code `0` means "not yet assigned"; the directory allocates codes on add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designation {
    pub code: i64,
    pub title: String,
}

impl Tagged for Designation {
    const TYPE_TAG: &'static str = "Designation";
}

impl Designation {
    /// A designation that has not been assigned a code yet.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            code: 0,
            title: title.into(),
        }
    }

    pub fn with_code(code: i64, title: impl Into<String>) -> Self {
        Self {
            code,
            title: title.into(),
        }
    }

    /// Reads and validates a designation from a JSON object.
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let mut reader = FieldReader::new(value)?;

        let code = reader.int("code", "code");
        let title = reader.string("title", "title");

        let code = reader.check("code", code, |c| check_non_negative("code", *c));
        let title = reader.check("title", title, |t| check_length("title", t, MAX_TITLE_LEN));

        match (code, title) {
            (Some(code), Some(title)) if reader.is_clean() => Ok(Self { code, title }),
            _ => Err(reader.into_error()),
        }
    }

    /// Reads and validates a designation from a JSON document.
    pub fn from_document(document: &str) -> Result<Self, CoreError> {
        let value: Value = from_document(document)?;
        Self::from_value(&value)
    }

    /// Runs the same checks as [`Designation::from_value`] on a typed value.
    pub fn validate(&self) -> Result<(), CoreError> {
        let value = serde_json::to_value(self).map_err(hrnet_protocol::ProtocolError::from)?;
        Self::from_value(&value).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrnet_protocol::FieldErrorKind;
    use serde_json::json;

    fn field_errors(err: CoreError) -> hrnet_protocol::FieldErrors {
        match err {
            CoreError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_designation() {
        let d = Designation::from_document(r#"{"code": 0, "title": "Carpenter"}"#).unwrap();
        assert_eq!(d, Designation::new("Carpenter"));
    }

    #[test]
    fn test_empty_title() {
        let err = Designation::from_value(&json!({"code": 0, "title": ""})).unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["title"].kind(), FieldErrorKind::Value);
        assert_eq!(
            errors["title"].message(),
            "Value of title is , it should be greater than zero and less than 35"
        );
    }

    #[test]
    fn test_long_title() {
        let title = "x".repeat(36);
        let err = Designation::from_value(&json!({"code": 0, "title": title})).unwrap_err();
        assert!(field_errors(err).contains_key("title"));

        let title = "x".repeat(35);
        assert!(Designation::from_value(&json!({"code": 0, "title": title})).is_ok());
    }

    #[test]
    fn test_type_and_value_errors_together() {
        let err = Designation::from_value(&json!({"code": "A", "title": ""})).unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors["code"].kind(), FieldErrorKind::Type);
        assert_eq!(errors["title"].kind(), FieldErrorKind::Value);
    }

    #[test]
    fn test_negative_code() {
        let err = Designation::from_value(&json!({"code": -1, "title": "Clerk"})).unwrap_err();
        assert_eq!(field_errors(err)["code"].kind(), FieldErrorKind::Value);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            Designation::from_document("{\"code\": 0,"),
            Err(CoreError::Protocol(_))
        ));
    }

    #[test]
    fn test_validate_typed() {
        assert!(Designation::new("Clerk").validate().is_ok());
        assert!(Designation::new("").validate().is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Designation::with_code(4, "Clerk")).unwrap();
        assert_eq!(json, json!({"code": 4, "title": "Clerk"}));
    }
}
