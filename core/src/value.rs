//! Runtime values produced by binding a command line against a flag tree.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::parsers::format_duration;

/// A resolved enum constant. Name and number always agree with the
/// declaring [`EnumSpec`](crate::EnumSpec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// Payload of a fully dynamic message: the `@type` URL and the remaining
/// JSON members, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyValue {
    pub type_url: String,
    pub fields: Map<String, JsonValue>,
}

/// A single bound value (leaf, list, or nested message).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    Timestamp(DateTime<Utc>),
    Duration(TimeDelta),
    Struct(Map<String, JsonValue>),
    Any(AnyValue),
    Message(MessageValue),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(x) => Some(*x as i64),
            Value::Int64(x) => Some(*x),
            Value::Uint32(x) => Some(*x as i64),
            Value::Uint64(x) => i64::try_from(*x).ok(),
            Value::Enum(e) => Some(e.number as i64),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Converts to a JSON value: bytes as base64, enums by name, timestamps
    /// as RFC 3339, durations in unit syntax, 64-bit integers as numbers.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int32(x) => JsonValue::from(*x),
            Value::Uint32(x) => JsonValue::from(*x),
            Value::Int64(x) => JsonValue::from(*x),
            Value::Uint64(x) => JsonValue::from(*x),
            Value::Float(x) => float_to_json(x.to_string().parse().unwrap_or(f64::from(*x))),
            Value::Double(x) => float_to_json(*x),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => JsonValue::String(BASE64_STANDARD.encode(b)),
            Value::Enum(e) => JsonValue::String(e.name.clone()),
            Value::Timestamp(ts) => {
                JsonValue::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Duration(d) => JsonValue::String(format_duration(*d)),
            Value::Struct(map) => JsonValue::Object(map.clone()),
            Value::Any(any) => {
                let mut map = Map::with_capacity(any.fields.len() + 1);
                map.insert("@type".to_string(), JsonValue::String(any.type_url.clone()));
                map.extend(any.fields.clone());
                JsonValue::Object(map)
            }
            Value::Message(m) => m.to_json(),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

// Non-finite floats have no JSON number form.
fn float_to_json(x: f64) -> JsonValue {
    serde_json::Number::from_f64(x)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(x.to_string()))
}

/// A bound message: fields in schema order, keyed by schema field name.
///
/// Fields without presence (an omitted optional, oneof member, nested
/// message or well-known leaf) have no entry.
///
/// # Examples
///
/// ```
/// use protoflag_core::{MessageValue, Value};
///
/// let nested = MessageValue::new().with("name", Value::String("a".into()));
/// let outer = MessageValue::new()
///     .with("id", Value::String("x".into()))
///     .with("item", Value::List(vec![Value::Message(nested)]));
///
/// assert_eq!(outer.get("id").and_then(Value::as_str), Some("x"));
/// assert_eq!(outer.get("item").and_then(Value::as_list).map(|l| l.len()), Some(1));
/// assert!(!outer.has("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageValue {
    fields: Vec<(String, Value)>,
}

impl MessageValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing an existing entry in place.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Converts to a JSON object preserving schema order.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }
}
