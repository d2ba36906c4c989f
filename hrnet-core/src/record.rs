//! Closed set of record types that may appear in list envelopes.

use crate::designation::Designation;
use crate::employee::Employee;
use hrnet_protocol::{DecoderRegistry, ProtocolError, Tagged};
use serde_json::Value;
use std::sync::OnceLock;

/// A decoded list item.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Designation(Designation),
    Employee(Employee),
}

impl Record {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Record::Designation(_) => Designation::TYPE_TAG,
            Record::Employee(_) => Employee::TYPE_TAG,
        }
    }

    pub fn into_designation(self) -> Option<Designation> {
        match self {
            Record::Designation(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_employee(self) -> Option<Employee> {
        match self {
            Record::Employee(e) => Some(e),
            _ => None,
        }
    }
}

fn decode_designation(item: Value) -> Result<Record, ProtocolError> {
    Ok(Record::Designation(serde_json::from_value(item)?))
}

fn decode_employee(item: Value) -> Result<Record, ProtocolError> {
    Ok(Record::Employee(serde_json::from_value(item)?))
}

/// Returns the registry of record decoders, built on first use.
pub fn registry() -> &'static DecoderRegistry<Record> {
    static REGISTRY: OnceLock<DecoderRegistry<Record>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        DecoderRegistry::builder()
            .register(Designation::TYPE_TAG, decode_designation)
            .register(Employee::TYPE_TAG, decode_employee)
            .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrnet_protocol::ListEnvelope;

    #[test]
    fn test_registry_tags() {
        assert_eq!(registry().tags(), vec!["Designation", "Employee"]);
    }

    #[test]
    fn test_decode_designation_list() {
        let items = vec![
            Designation::with_code(1, "Carpenter"),
            Designation::with_code(2, "Clerk"),
        ];
        let list = ListEnvelope::from_items(&items).unwrap();
        let records = registry().decode_list(&list).unwrap();

        let decoded: Vec<_> = records
            .into_iter()
            .filter_map(Record::into_designation)
            .collect();
        assert_eq!(decoded, items);
    }

    #[test]
    fn test_record_tag() {
        let record = Record::Designation(Designation::new("Clerk"));
        assert_eq!(record.type_tag(), "Designation");
        assert!(record.into_employee().is_none());
    }

    #[test]
    fn test_unregistered_tag() {
        let list = ListEnvelope::decode(r#"{"name": "Payslip", "lst": []}"#).unwrap();
        assert!(matches!(
            registry().decode_list(&list),
            Err(ProtocolError::UnknownTypeTag(_))
        ));
    }
}
