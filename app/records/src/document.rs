//! Flat field-value documents, encoded the way the document store's REST API
//! encodes typed values (`{"stringValue": "..."}`, `{"doubleValue": 1.5}`, ...).
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub type Document = BTreeMap<String, FieldValue>;

/// A document as read back from a collection.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

/// One typed value. Reading never fails: a value whose type is unknown or
/// whose payload does not match its type is kept as [`FieldValue::Other`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    NullValue(()),
    BooleanValue(bool),
    // integers travel as decimal strings
    IntegerValue(#[serde(serialize_with = "wire::integer")] i64),
    // non-finite doubles travel as "NaN", "Infinity", "-Infinity"
    DoubleValue(#[serde(serialize_with = "wire::double")] f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
    /// The raw encoded value, written back unchanged.
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FieldValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: Document,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value. Integers widen to doubles.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::DoubleValue(d) => Some(*d),
            FieldValue::IntegerValue(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn array(values: Vec<FieldValue>) -> Self {
        FieldValue::ArrayValue(ArrayValue { values })
    }

    pub fn map(fields: Document) -> Self {
        FieldValue::MapValue(MapValue { fields })
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::StringValue(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::StringValue(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::DoubleValue(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::IntegerValue(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::BooleanValue(value)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;

        Ok(wire::decode(&raw).unwrap_or(FieldValue::Other(raw)))
    }
}

mod wire {
    use serde::Serializer;
    use serde_json::Value;

    use super::{ArrayValue, Document, FieldValue, MapValue};

    pub fn integer<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn double<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    fn parse_integer(raw: &Value) -> Option<i64> {
        match raw {
            Value::String(text) => text.parse().ok(),
            other => other.as_i64(),
        }
    }

    fn parse_double(raw: &Value) -> Option<f64> {
        match raw {
            Value::String(text) => match text.as_str() {
                "NaN" => Some(f64::NAN),
                "Infinity" => Some(f64::INFINITY),
                "-Infinity" => Some(f64::NEG_INFINITY),
                _ => None,
            },
            other => other.as_f64(),
        }
    }

    fn text(raw: &Value) -> Option<String> {
        raw.as_str().map(str::to_string)
    }

    /// `None` when the value is not a known type with a well-formed payload.
    pub fn decode(raw: &Value) -> Option<FieldValue> {
        let object = raw.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (kind, payload) = object.iter().next()?;

        let value = match kind.as_str() {
            "nullValue" => payload.is_null().then_some(FieldValue::NullValue(()))?,
            "booleanValue" => FieldValue::BooleanValue(payload.as_bool()?),
            "integerValue" => FieldValue::IntegerValue(parse_integer(payload)?),
            "doubleValue" => FieldValue::DoubleValue(parse_double(payload)?),
            "timestampValue" => FieldValue::TimestampValue(text(payload)?),
            "stringValue" => FieldValue::StringValue(text(payload)?),
            "bytesValue" => FieldValue::BytesValue(text(payload)?),
            "referenceValue" => FieldValue::ReferenceValue(text(payload)?),
            "geoPointValue" => FieldValue::GeoPointValue(payload.clone()),
            "arrayValue" => {
                let values = match payload.get("values") {
                    Some(values) => values.as_array()?.iter().map(decode_lenient).collect(),
                    None => Vec::new(),
                };
                FieldValue::ArrayValue(ArrayValue { values })
            }
            "mapValue" => {
                let fields: Document = match payload.get("fields") {
                    Some(fields) => fields
                        .as_object()?
                        .iter()
                        .map(|(key, value)| (key.clone(), decode_lenient(value)))
                        .collect(),
                    None => Document::new(),
                };
                FieldValue::MapValue(MapValue { fields })
            }
            _ => return None,
        };

        Some(value)
    }

    fn decode_lenient(raw: &Value) -> FieldValue {
        decode(raw).unwrap_or_else(|| FieldValue::Other(raw.clone()))
    }
}
