//! Generic wrappers that let lists and scalars travel as documents.
//!
//! A [`ListEnvelope`] names the type of its items with a tag; decoding picks
//! the item decoder from a closed [`DecoderRegistry`] built at startup. A
//! [`Primitive`] lets a bare int, float, bool or string ride in the same
//! envelope fields as structured records.

use crate::codec::{from_document, to_document};
use crate::error::ProtocolError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// A record type that can be carried inside a [`ListEnvelope`].
pub trait Tagged {
    /// Tag written into list envelopes holding this type.
    const TYPE_TAG: &'static str;
}

/// Decoder function stored in a [`DecoderRegistry`].
pub type DecodeFn<T> = fn(Value) -> Result<T, ProtocolError>;

/// Closed mapping from type tag to decoder.
///
/// A registry is assembled once through [`RegistryBuilder`] and cannot be
/// extended afterwards; tags read off the wire only ever select among the
/// decoders registered at build time.
pub struct DecoderRegistry<T> {
    decoders: HashMap<&'static str, DecodeFn<T>>,
}

impl<T> DecoderRegistry<T> {
    pub fn builder() -> RegistryBuilder<T> {
        RegistryBuilder {
            decoders: HashMap::new(),
        }
    }

    /// Returns whether `tag` has a registered decoder.
    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Returns the registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.decoders.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Decodes a single item with the decoder registered for `tag`.
    pub fn decode(&self, tag: &str, item: Value) -> Result<T, ProtocolError> {
        let decoder = self
            .decoders
            .get(tag)
            .ok_or_else(|| ProtocolError::UnknownTypeTag(tag.to_string()))?;
        decoder(item)
    }

    /// Decodes every item of `list`, preserving order.
    pub fn decode_list(&self, list: &ListEnvelope) -> Result<Vec<T>, ProtocolError> {
        let decoder = self
            .decoders
            .get(list.type_tag())
            .ok_or_else(|| ProtocolError::UnknownTypeTag(list.type_tag().to_string()))?;
        list.items().iter().cloned().map(decoder).collect()
    }
}

impl<T> fmt::Debug for DecoderRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

/// Builder for a [`DecoderRegistry`].
pub struct RegistryBuilder<T> {
    decoders: HashMap<&'static str, DecodeFn<T>>,
}

impl<T> RegistryBuilder<T> {
    /// Registers `decoder` under `tag`, replacing any earlier entry.
    pub fn register(mut self, tag: &'static str, decoder: DecodeFn<T>) -> Self {
        self.decoders.insert(tag, decoder);
        self
    }

    pub fn build(self) -> DecoderRegistry<T> {
        DecoderRegistry {
            decoders: self.decoders,
        }
    }
}

/// An ordered, tagged sequence of item documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope {
    #[serde(rename = "name")]
    type_tag: String,
    #[serde(rename = "lst")]
    items: Vec<Value>,
}

impl ListEnvelope {
    /// Builds a list of `T` items; the tag comes from `T` even when empty.
    pub fn from_items<T: Tagged + Serialize>(items: &[T]) -> Result<Self, ProtocolError> {
        let items = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            type_tag: T::TYPE_TAG.to_string(),
            items,
        })
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Decodes every item as `T`, after checking the tag matches.
    pub fn decode_as<T: Tagged + DeserializeOwned>(&self) -> Result<Vec<T>, ProtocolError> {
        if self.type_tag != T::TYPE_TAG {
            return Err(ProtocolError::TypeTagMismatch {
                expected: T::TYPE_TAG.to_string(),
                found: self.type_tag.clone(),
            });
        }
        self.items
            .iter()
            .cloned()
            .map(|item| serde_json::from_value(item).map_err(ProtocolError::from))
            .collect()
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        to_document(self)
    }

    pub fn decode(document: &str) -> Result<Self, ProtocolError> {
        from_document(document)
    }
}

/// A scalar value travelling as a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

const VALUE_KEY: &str = "value";
const TAG_KEY: &str = "class_name";

type PrimitiveDecodeFn = fn(&Value) -> Option<Primitive>;

/// Closed table of primitive tags and how to read their value.
const PRIMITIVE_DECODERS: &[(&str, PrimitiveDecodeFn)] = &[
    ("int", |v| v.as_i64().map(Primitive::Int)),
    ("float", |v| v.as_f64().map(Primitive::Float)),
    ("bool", |v| v.as_bool().map(Primitive::Bool)),
    ("str", |v| v.as_str().map(|s| Primitive::Str(s.to_string()))),
];

impl Primitive {
    /// Returns the type tag written on the wire.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Primitive::Int(_) => "int",
            Primitive::Float(_) => "float",
            Primitive::Bool(_) => "bool",
            Primitive::Str(_) => "str",
        }
    }

    /// Encodes the value: strings as bare JSON strings, everything else as
    /// a `{value, class_name}` document.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let value = match self {
            Primitive::Str(s) => return to_document(s),
            Primitive::Int(n) => Value::from(*n),
            // JSON has no NaN or infinity.
            Primitive::Float(x) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .ok_or_else(|| ProtocolError::InvalidPrimitive {
                    tag: "float".to_string(),
                    value: x.to_string(),
                })?,
            Primitive::Bool(b) => Value::from(*b),
        };
        let mut doc = Map::new();
        doc.insert(VALUE_KEY.to_string(), value);
        doc.insert(TAG_KEY.to_string(), Value::from(self.type_tag()));
        to_document(&doc)
    }

    /// Decodes a document produced by [`Primitive::encode`].
    pub fn decode(document: &str) -> Result<Self, ProtocolError> {
        match from_document::<Value>(document)? {
            Value::String(s) => Ok(Primitive::Str(s)),
            Value::Object(mut doc) => {
                let tag = match doc.remove(TAG_KEY) {
                    Some(Value::String(tag)) => tag,
                    _ => return Err(ProtocolError::UnknownTypeTag(String::new())),
                };
                let value = doc.remove(VALUE_KEY).unwrap_or(Value::Null);
                let (_, decode) = PRIMITIVE_DECODERS
                    .iter()
                    .find(|(name, _)| *name == tag)
                    .ok_or_else(|| ProtocolError::UnknownTypeTag(tag.clone()))?;
                decode(&value).ok_or_else(|| ProtocolError::InvalidPrimitive {
                    tag,
                    value: value.to_string(),
                })
            }
            other => Err(ProtocolError::InvalidPrimitive {
                tag: String::new(),
                value: other.to_string(),
            }),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Primitive::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Primitive {
    fn from(n: i64) -> Self {
        Primitive::Int(n)
    }
}

impl From<f64> for Primitive {
    fn from(x: f64) -> Self {
        Primitive::Float(x)
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::Str(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: i64,
        label: String,
    }

    impl Tagged for Widget {
        const TYPE_TAG: &'static str = "Widget";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        serial: String,
    }

    impl Tagged for Gadget {
        const TYPE_TAG: &'static str = "Gadget";
    }

    #[derive(Debug, PartialEq)]
    enum Item {
        Widget(Widget),
        Gadget(Gadget),
    }

    fn registry() -> DecoderRegistry<Item> {
        DecoderRegistry::builder()
            .register(Widget::TYPE_TAG, |v| {
                Ok(Item::Widget(serde_json::from_value(v)?))
            })
            .register(Gadget::TYPE_TAG, |v| {
                Ok(Item::Gadget(serde_json::from_value(v)?))
            })
            .build()
    }

    fn widgets(n: i64) -> Vec<Widget> {
        (1..=n)
            .map(|id| Widget {
                id,
                label: format!("w{}", id),
            })
            .collect()
    }

    #[test]
    fn test_list_wire_shape() {
        let list = ListEnvelope::from_items(&widgets(2)).unwrap();
        let json: Value = serde_json::from_str(&list.encode().unwrap()).unwrap();
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["lst"].as_array().unwrap().len(), 2);
        assert_eq!(json["lst"][1]["label"], "w2");
    }

    #[test]
    fn test_list_preserves_order_and_count() {
        let items = widgets(25);
        let encoded = ListEnvelope::from_items(&items).unwrap().encode().unwrap();

        let list = ListEnvelope::decode(&encoded).unwrap();
        let decoded = registry().decode_list(&list).unwrap();

        assert_eq!(decoded.len(), 25);
        for (item, expected) in decoded.iter().zip(&items) {
            assert_eq!(item, &Item::Widget(expected.clone()));
        }
    }

    #[test]
    fn test_registry_selects_decoder_by_tag() {
        let gadgets = vec![Gadget {
            serial: "G-1".into(),
        }];
        let list = ListEnvelope::from_items(&gadgets).unwrap();
        let decoded = registry().decode_list(&list).unwrap();
        assert_eq!(decoded, vec![Item::Gadget(gadgets[0].clone())]);
    }

    #[test]
    fn test_registry_unknown_tag() {
        let list = ListEnvelope::decode(r#"{"name": "os.system", "lst": [{}]}"#).unwrap();
        let result = registry().decode_list(&list);
        assert!(matches!(result, Err(ProtocolError::UnknownTypeTag(tag)) if tag == "os.system"));
    }

    #[test]
    fn test_registry_tags() {
        assert_eq!(registry().tags(), vec!["Gadget", "Widget"]);
        assert!(registry().contains("Widget"));
        assert!(!registry().contains("widget"));
    }

    #[test]
    fn test_empty_list_keeps_tag() {
        let list = ListEnvelope::from_items::<Widget>(&[]).unwrap();
        assert_eq!(list.type_tag(), "Widget");
        assert!(list.is_empty());

        let decoded: Vec<Widget> = ListEnvelope::decode(&list.encode().unwrap())
            .unwrap()
            .decode_as()
            .unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_as_checks_tag() {
        let list = ListEnvelope::from_items(&widgets(1)).unwrap();
        let result = list.decode_as::<Gadget>();
        assert!(matches!(result, Err(ProtocolError::TypeTagMismatch { .. })));
    }

    #[test]
    fn test_item_shape_mismatch_is_decode_error() {
        let list = ListEnvelope::decode(r#"{"name": "Widget", "lst": [{"id": "one"}]}"#).unwrap();
        let err = registry().decode_list(&list).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_primitive_string_is_bare() {
        let encoded = Primitive::from("Carpenter").encode().unwrap();
        assert_eq!(encoded, r#""Carpenter""#);
        assert_eq!(
            Primitive::decode(&encoded).unwrap(),
            Primitive::Str("Carpenter".into())
        );
    }

    #[test]
    fn test_primitive_int_document() {
        let encoded = Primitive::from(7).encode().unwrap();
        let json: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(json["value"], 7);
        assert_eq!(json["class_name"], "int");
        assert_eq!(Primitive::decode(&encoded).unwrap().as_int(), Some(7));
    }

    #[test]
    fn test_primitive_rehydrates_exact_type() {
        let float = Primitive::decode(r#"{"value": 2, "class_name": "float"}"#).unwrap();
        assert_eq!(float, Primitive::Float(2.0));

        let flag = Primitive::decode(r#"{"value": true, "class_name": "bool"}"#).unwrap();
        assert_eq!(flag.as_bool(), Some(true));
    }

    #[test]
    fn test_primitive_unknown_tag() {
        let result = Primitive::decode(r#"{"value": 1, "class_name": "Decimal"}"#);
        assert!(matches!(result, Err(ProtocolError::UnknownTypeTag(tag)) if tag == "Decimal"));
    }

    #[test]
    fn test_primitive_value_does_not_match_tag() {
        let result = Primitive::decode(r#"{"value": "abc", "class_name": "int"}"#);
        assert!(matches!(result, Err(ProtocolError::InvalidPrimitive { .. })));
    }

    #[test]
    fn test_primitive_non_finite_float_not_encoded() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                Primitive::Float(x).encode(),
                Err(ProtocolError::InvalidPrimitive { ref tag, .. }) if tag == "float"
            ));
        }
        let doc = Primitive::Float(2.5).encode().unwrap();
        assert_eq!(Primitive::decode(&doc).unwrap(), Primitive::Float(2.5));
    }

    #[test]
    fn test_primitive_rejects_bare_number() {
        assert!(Primitive::decode("42").is_err());
    }
}
