//! Field-by-field record reading.
//!
//! Records are read out of a raw JSON object one field at a time instead of
//! through `Deserialize`, so a field holding the wrong JSON type becomes a
//! `T` field error next to any `V` errors on the other fields, rather than
//! aborting the whole decode.

use crate::error::CoreError;
use hrnet_protocol::{FieldError, FieldErrors};
use serde_json::{Map, Value};

/// Returns a short name for the JSON type of `value`.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Reads typed fields from a JSON object, accumulating field errors.
#[derive(Debug)]
pub struct FieldReader<'a> {
    doc: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    /// Starts reading `value`, which must be a JSON object.
    pub fn new(value: &'a Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(doc) => Ok(Self {
                doc,
                errors: FieldErrors::new(),
            }),
            other => Err(CoreError::InvalidArgument(format!(
                "record must be a JSON object, found {}",
                json_type(other)
            ))),
        }
    }

    fn field(&self, name: &str) -> &'a Value {
        static MISSING: Value = Value::Null;
        self.doc.get(name).unwrap_or(&MISSING)
    }

    fn type_error(&mut self, key: &str, label: &str, found: &Value, expected: &str) {
        self.errors.insert(
            key.to_string(),
            FieldError::type_mismatch(format!(
                "{} is of type {}, it should be of type {}",
                label,
                json_type(found),
                expected
            )),
        );
    }

    /// Reads an integer field, reporting a type error under `key`.
    pub fn int_as(&mut self, name: &str, key: &str, label: &str) -> Option<i64> {
        let value = self.field(name);
        match value.as_i64() {
            Some(n) => Some(n),
            None => {
                self.type_error(key, label, value, "int");
                None
            }
        }
    }

    /// Reads an integer field.
    pub fn int(&mut self, name: &str, label: &str) -> Option<i64> {
        self.int_as(name, name, label)
    }

    /// Reads a number field; integers are accepted.
    pub fn number(&mut self, name: &str, label: &str) -> Option<f64> {
        let value = self.field(name);
        match value.as_f64() {
            Some(x) => Some(x),
            None => {
                self.type_error(name, label, value, "float");
                None
            }
        }
    }

    /// Reads a string field.
    pub fn string(&mut self, name: &str, label: &str) -> Option<String> {
        let value = self.field(name);
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.type_error(name, label, value, "str");
                None
            }
        }
    }

    /// Runs a value check on a successfully typed field.
    ///
    /// A failed check records a `V` error under `key` and yields `None`.
    pub fn check<T>(
        &mut self,
        key: &str,
        value: Option<T>,
        check: impl FnOnce(&T) -> Result<(), String>,
    ) -> Option<T> {
        let value = value?;
        match check(&value) {
            Ok(()) => Some(value),
            Err(message) => {
                self.reject(key, message);
                None
            }
        }
    }

    /// Records a `V` error under `key`, replacing any earlier one.
    pub fn reject(&mut self, key: &str, message: impl Into<String>) {
        self.errors
            .insert(key.to_string(), FieldError::invalid_value(message));
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the reader into a validation error.
    pub fn into_error(self) -> CoreError {
        CoreError::Validation(self.errors)
    }
}

/// Checks that a string has between 1 and `max` characters.
pub fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(format!(
            "Value of {} is {}, it should be greater than zero and less than {}",
            field, value, max
        ));
    }
    Ok(())
}

/// Checks that an identifier is not negative.
pub fn check_non_negative(field: &str, value: i64) -> Result<(), String> {
    if value < 0 {
        return Err(format!(
            "Value of {} is {}, it should be greater than or equal to zero",
            field, value
        ));
    }
    Ok(())
}
