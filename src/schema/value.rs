//! schema::value
//!
//! The dynamic value carried by entity fields.
//!
//! [`FieldValue`] is the single value algebra shared by the attribute
//! router and the wire codec: every slot, extension entry, and decoded
//! leaf is one of these. Maps preserve insertion order so payloads come
//! out in a stable key order.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::schema::enums::{EnumScalar, EnumValue};

/// Timestamp wire format (RFC3339 with an explicit zone offset,
/// second resolution).
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A dynamically typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent / cleared.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered list of values.
    List(Vec<FieldValue>),
    /// Ordered string-keyed map.
    Map(Vec<(String, FieldValue)>),
    /// Canonical enum constant.
    Enum(&'static EnumValue),
    Timestamp(DateTime<FixedOffset>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&'static EnumValue> {
        match self {
            FieldValue::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Convert a wire value verbatim, with no field-specific coercion.
    ///
    /// Used for custom/extension data, where values pass through
    /// untouched in both directions.
    pub fn from_json(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => FieldValue::Str(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => FieldValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Render as a wire value, with no field-specific coercion.
    ///
    /// Enums render as their bare underlying value, never the name;
    /// timestamps render in the fixed wire format.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            FieldValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            FieldValue::Enum(e) => match e.value() {
                EnumScalar::Int(i) => Value::from(i),
                EnumScalar::Str(s) => Value::String(s.to_string()),
            },
            FieldValue::Timestamp(t) => Value::String(t.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<&'static EnumValue> for FieldValue {
    fn from(e: &'static EnumValue) -> Self {
        FieldValue::Enum(e)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(t: DateTime<FixedOffset>) -> Self {
        FieldValue::Timestamp(t)
    }
}
