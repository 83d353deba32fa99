//! Value parsers: one textual token in, one typed [`Value`] out.
//!
//! Every parser has an inverse formatter so that values can be rendered back
//! into the exact token form the parser accepts. Repeated fields take one
//! CSV record per flag occurrence (see [`parse_list`]).

mod duration;

use std::num::IntErrorKind;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::tree::LeafKind;
use crate::value::{AnyValue, EnumValue, Value};
use crate::EnumSpec;

pub use duration::{format_duration, parse_duration};

/// Errors produced while converting a token into a value.
#[derive(Debug, Error)]
pub enum ValueError {
    /// Neither a declared constant name nor a declared number.
    #[error("unknown value {raw:?} for enum {enum_name}")]
    UnknownEnumValue { enum_name: String, raw: String },

    /// Well-formed number outside the kind's native range.
    #[error("value {raw:?} is out of range for {kind}")]
    NumericRange { kind: &'static str, raw: String },

    /// Malformed token for the kind.
    #[error("invalid {kind} value {raw:?}: {reason}")]
    Format {
        kind: &'static str,
        raw: String,
        reason: String,
    },

    /// Not valid standard base64.
    #[error("invalid base64: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Not an RFC 3339 timestamp.
    #[error("invalid RFC 3339 timestamp {raw:?}: {source}")]
    TimeFormat {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Not a signed magnitude-plus-unit duration.
    #[error("invalid duration {raw:?}: {reason}")]
    DurationFormat { raw: String, reason: &'static str },

    /// Malformed JSON, or JSON of the wrong shape.
    #[error("invalid JSON for {kind}: {reason}")]
    JsonDecode { kind: &'static str, reason: String },

    /// CSV reader or writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ValueError {
    fn format(kind: &'static str, raw: &str, reason: impl Into<String>) -> Self {
        ValueError::Format {
            kind,
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    fn range(kind: &'static str, raw: &str) -> Self {
        ValueError::NumericRange {
            kind,
            raw: raw.to_string(),
        }
    }
}

/// Parses a single token according to `kind`.
///
/// # Examples
///
/// ```
/// use protoflag_core::{parse_value, LeafKind, Value, ValueError};
///
/// assert_eq!(parse_value(&LeafKind::Int32, "-42").unwrap(), Value::Int32(-42));
/// assert_eq!(parse_value(&LeafKind::Uint32, "0xff").unwrap(), Value::Uint32(255));
/// assert!(matches!(
///     parse_value(&LeafKind::Int32, "2147483648"),
///     Err(ValueError::NumericRange { .. })
/// ));
/// assert!(matches!(parse_value(&LeafKind::Bool, "yes"), Err(ValueError::Format { .. })));
/// ```
pub fn parse_value(kind: &LeafKind, raw: &str) -> Result<Value, ValueError> {
    match kind {
        LeafKind::Bool => parse_bool(raw).map(Value::Bool),
        LeafKind::Int32 => {
            let v = parse_integer(kind.name(), raw)?;
            i32::try_from(v)
                .map(Value::Int32)
                .map_err(|_| ValueError::range(kind.name(), raw))
        }
        LeafKind::Uint32 => {
            let v = parse_integer(kind.name(), raw)?;
            u32::try_from(v)
                .map(Value::Uint32)
                .map_err(|_| ValueError::range(kind.name(), raw))
        }
        LeafKind::Int64 => {
            let v = parse_integer(kind.name(), raw)?;
            i64::try_from(v)
                .map(Value::Int64)
                .map_err(|_| ValueError::range(kind.name(), raw))
        }
        LeafKind::Uint64 => {
            let v = parse_integer(kind.name(), raw)?;
            u64::try_from(v)
                .map(Value::Uint64)
                .map_err(|_| ValueError::range(kind.name(), raw))
        }
        LeafKind::Float => {
            let v: f32 = raw
                .parse()
                .map_err(|e: std::num::ParseFloatError| ValueError::format("float", raw, e.to_string()))?;
            if v.is_infinite() && !is_infinity_literal(raw) {
                return Err(ValueError::range("float", raw));
            }
            Ok(Value::Float(v))
        }
        LeafKind::Double => {
            let v: f64 = raw
                .parse()
                .map_err(|e: std::num::ParseFloatError| ValueError::format("double", raw, e.to_string()))?;
            if v.is_infinite() && !is_infinity_literal(raw) {
                return Err(ValueError::range("double", raw));
            }
            Ok(Value::Double(v))
        }
        LeafKind::String => Ok(Value::String(raw.to_string())),
        LeafKind::Bytes => Ok(Value::Bytes(BASE64_STANDARD.decode(raw)?)),
        LeafKind::Enum(spec) => parse_enum(spec, raw).map(Value::Enum),
        LeafKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|source| ValueError::TimeFormat {
                raw: raw.to_string(),
                source,
            }),
        LeafKind::Duration => parse_duration(raw).map(Value::Duration),
        LeafKind::Struct => match parse_json("struct", raw)? {
            JsonValue::Object(map) => Ok(Value::Struct(map)),
            other => Err(ValueError::JsonDecode {
                kind: "struct",
                reason: format!("expected an object, found {}", json_type_name(&other)),
            }),
        },
        LeafKind::Any => parse_any(raw).map(Value::Any),
    }
}

/// Parses one flag occurrence of a repeated field: a single CSV record whose
/// fields are parsed independently with [`parse_value`].
///
/// An empty token is an empty list.
///
/// # Examples
///
/// ```
/// use protoflag_core::{parse_list, LeafKind, Value};
///
/// let items = parse_list(&LeafKind::String, r#"a,"b,c","say ""hi""""#).unwrap();
/// assert_eq!(
///     items,
///     vec![
///         Value::String("a".into()),
///         Value::String("b,c".into()),
///         Value::String(r#"say "hi""#.into()),
///     ]
/// );
/// assert!(parse_list(&LeafKind::Int64, "").unwrap().is_empty());
/// ```
pub fn parse_list(kind: &LeafKind, raw: &str) -> Result<Vec<Value>, ValueError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    check_quotes(kind.name(), raw)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let mut records = reader.records();

    let Some(record) = records.next().transpose()? else {
        return Ok(Vec::new());
    };
    if records.next().is_some() {
        return Err(ValueError::format(
            kind.name(),
            raw,
            "expected a single CSV record",
        ));
    }

    record.iter().map(|field| parse_value(kind, field)).collect()
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Strict RFC 4180 quoting. The csv reader recovers from stray quotes,
/// so they are rejected here first.
fn check_quotes(kind: &'static str, raw: &str) -> Result<(), ValueError> {
    let mut state = QuoteState::FieldStart;
    for c in raw.chars() {
        state = match (state, c) {
            (QuoteState::FieldStart, '"') => QuoteState::Quoted,
            (QuoteState::FieldStart | QuoteState::Unquoted, ',' | '\n') => QuoteState::FieldStart,
            (QuoteState::Unquoted, '"') => {
                return Err(ValueError::format(kind, raw, "bare quote in unquoted field"));
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
            (QuoteState::Quoted, '"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, '"') => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, ',' | '\n' | '\r') => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                return Err(ValueError::format(kind, raw, "text after closing quote"));
            }
        };
    }

    match state {
        QuoteState::Quoted => Err(ValueError::format(kind, raw, "unterminated quoted field")),
        _ => Ok(()),
    }
}

/// Renders a value in the token form [`parse_value`] accepts.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int32(x) => x.to_string(),
        Value::Uint32(x) => x.to_string(),
        Value::Int64(x) => x.to_string(),
        Value::Uint64(x) => x.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Double(x) => x.to_string(),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => BASE64_STANDARD.encode(b),
        Value::Enum(e) => e.name.clone(),
        Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Value::Duration(d) => format_duration(*d),
        Value::Struct(_) | Value::Any(_) | Value::Message(_) | Value::List(_) => {
            value.to_json().to_string()
        }
    }
}

/// Renders a list as the single CSV record [`parse_list`] accepts.
///
/// # Examples
///
/// ```
/// use protoflag_core::{format_list, parse_list, LeafKind, Value};
///
/// let items = vec![Value::String("plain".into()), Value::String("with,comma".into())];
/// let raw = format_list(&items).unwrap();
/// assert_eq!(raw, r#"plain,"with,comma""#);
/// assert_eq!(parse_list(&LeafKind::String, &raw).unwrap(), items);
/// ```
pub fn format_list(values: &[Value]) -> Result<String, ValueError> {
    if values.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(values.iter().map(format_value))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ValueError::Csv(e.into_error().into()))?;

    let mut raw = String::from_utf8(bytes)
        .map_err(|e| ValueError::format("list", "", e.to_string()))?;
    if raw.ends_with('\n') {
        raw.pop();
    }
    Ok(raw)
}

fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::format("bool", raw, "expected true or false")),
    }
}

/// Parses an integer with optional sign, `0x`/`0o`/`0b` prefix and `_`
/// separators between digits. A bare leading `0` before more digits means
/// octal (`010` is 8). Range checks are left to the caller.
fn parse_integer(kind: &'static str, raw: &str) -> Result<i128, ValueError> {
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, digits) = if let Some(d) = strip_radix(unsigned, 'x') {
        (16, d)
    } else if let Some(d) = strip_radix(unsigned, 'o') {
        (8, d)
    } else if let Some(d) = strip_radix(unsigned, 'b') {
        (2, d)
    } else if let Some(rest) = unsigned.strip_prefix('0').filter(|r| !r.is_empty()) {
        (8, rest.strip_prefix('_').unwrap_or(rest))
    } else {
        (10, unsigned)
    };

    if digits.is_empty()
        || digits.starts_with(&['_', '+', '-'][..])
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(ValueError::format(kind, raw, "invalid digit"));
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = match u128::from_str_radix(&cleaned, radix) {
        Ok(v) => v,
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => {
            return Err(ValueError::range(kind, raw));
        }
        Err(e) => return Err(ValueError::format(kind, raw, e.to_string())),
    };

    let magnitude = i128::try_from(magnitude).map_err(|_| ValueError::range(kind, raw))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn strip_radix(s: &str, marker: char) -> Option<&str> {
    let rest = s.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

fn is_infinity_literal(raw: &str) -> bool {
    let body = raw.trim_start_matches(&['+', '-'][..]).to_ascii_lowercase();
    body == "inf" || body == "infinity"
}

/// Name first, plain decimal number second.
fn parse_enum(spec: &EnumSpec, raw: &str) -> Result<EnumValue, ValueError> {
    let found = spec
        .by_name(raw)
        .or_else(|| raw.parse::<i32>().ok().and_then(|n| spec.by_number(n)));

    found
        .map(|v| EnumValue {
            name: v.name.clone(),
            number: v.number,
        })
        .ok_or_else(|| ValueError::UnknownEnumValue {
            enum_name: spec.name.clone(),
            raw: raw.to_string(),
        })
}

fn parse_json(kind: &'static str, raw: &str) -> Result<JsonValue, ValueError> {
    serde_json::from_str(raw).map_err(|e| ValueError::JsonDecode {
        kind,
        reason: e.to_string(),
    })
}

fn parse_any(raw: &str) -> Result<AnyValue, ValueError> {
    let JsonValue::Object(mut fields) = parse_json("any", raw)? else {
        return Err(ValueError::JsonDecode {
            kind: "any",
            reason: "expected an object".to_string(),
        });
    };

    match fields.shift_remove("@type") {
        Some(JsonValue::String(type_url)) if !type_url.is_empty() => Ok(AnyValue { type_url, fields }),
        _ => Err(ValueError::JsonDecode {
            kind: "any",
            reason: "missing string member \"@type\"".to_string(),
        }),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(kind: &LeafKind, value: Value) {
        let raw = format_value(&value);
        assert_eq!(parse_value(kind, &raw).unwrap(), value, "token {raw:?}");
    }

    #[test]
    fn test_integer_bounds_round_trip() {
        round_trip(&LeafKind::Int32, Value::Int32(i32::MIN));
        round_trip(&LeafKind::Int32, Value::Int32(i32::MAX));
        round_trip(&LeafKind::Uint32, Value::Uint32(u32::MAX));
        round_trip(&LeafKind::Int64, Value::Int64(i64::MIN));
        round_trip(&LeafKind::Int64, Value::Int64(i64::MAX));
        round_trip(&LeafKind::Uint64, Value::Uint64(0));
        round_trip(&LeafKind::Uint64, Value::Uint64(u64::MAX));
    }

    #[test]
    fn test_float_bounds_round_trip() {
        round_trip(&LeafKind::Float, Value::Float(f32::MAX));
        round_trip(&LeafKind::Float, Value::Float(f32::MIN_POSITIVE));
        round_trip(&LeafKind::Double, Value::Double(f64::MIN));
        round_trip(&LeafKind::Double, Value::Double(-0.1));
        round_trip(&LeafKind::Double, Value::Double(f64::INFINITY));
    }

    #[test]
    fn test_integer_range_and_format_errors() {
        assert!(matches!(
            parse_value(&LeafKind::Uint32, "-1"),
            Err(ValueError::NumericRange { kind: "uint32", .. })
        ));
        assert!(matches!(
            parse_value(&LeafKind::Uint64, "18446744073709551616"),
            Err(ValueError::NumericRange { .. })
        ));
        assert!(matches!(
            parse_value(&LeafKind::Int64, "999999999999999999999999999999999999999999"),
            Err(ValueError::NumericRange { .. })
        ));
        assert!(matches!(
            parse_value(&LeafKind::Int32, "12abc"),
            Err(ValueError::Format { .. })
        ));
        assert!(matches!(parse_value(&LeafKind::Int32, "--1"), Err(ValueError::Format { .. })));
        assert!(matches!(parse_value(&LeafKind::Int32, ""), Err(ValueError::Format { .. })));
    }

    #[test]
    fn test_integer_prefixes_and_separators() {
        assert_eq!(parse_value(&LeafKind::Int64, "1_000_000").unwrap(), Value::Int64(1_000_000));
        assert_eq!(parse_value(&LeafKind::Int32, "-0x10").unwrap(), Value::Int32(-16));
        assert_eq!(parse_value(&LeafKind::Uint32, "0b101").unwrap(), Value::Uint32(5));
        assert_eq!(parse_value(&LeafKind::Uint32, "0o17").unwrap(), Value::Uint32(15));
        assert_eq!(parse_value(&LeafKind::Uint32, "+7").unwrap(), Value::Uint32(7));
    }

    #[test]
    fn test_leading_zero_is_octal() {
        assert_eq!(parse_value(&LeafKind::Int32, "010").unwrap(), Value::Int32(8));
        assert_eq!(parse_value(&LeafKind::Int64, "-0_17").unwrap(), Value::Int64(-15));
        assert_eq!(parse_value(&LeafKind::Uint64, "0").unwrap(), Value::Uint64(0));
        assert!(matches!(parse_value(&LeafKind::Int32, "08"), Err(ValueError::Format { .. })));
    }

    #[test]
    fn test_float_overflow_is_range_error() {
        assert!(matches!(
            parse_value(&LeafKind::Float, "1e39"),
            Err(ValueError::NumericRange { kind: "float", .. })
        ));
        assert_eq!(
            parse_value(&LeafKind::Float, "-inf").unwrap(),
            Value::Float(f32::NEG_INFINITY)
        );
        assert!(matches!(parse_value(&LeafKind::Double, "1.2.3"), Err(ValueError::Format { .. })));
    }

    #[test]
    fn test_bool_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_value(&LeafKind::Bool, raw).unwrap(), Value::Bool(true));
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_value(&LeafKind::Bool, raw).unwrap(), Value::Bool(false));
        }
        assert!(parse_value(&LeafKind::Bool, "tRuE").is_err());
    }

    #[test]
    fn test_bytes_base64() {
        assert_eq!(
            parse_value(&LeafKind::Bytes, "aGVsbG8=").unwrap(),
            Value::Bytes(b"hello".to_vec())
        );
        assert!(matches!(
            parse_value(&LeafKind::Bytes, "aGVsbG8"),
            Err(ValueError::Base64Decode(_))
        ));
        assert!(matches!(
            parse_value(&LeafKind::Bytes, "a$=="),
            Err(ValueError::Base64Decode(_))
        ));
        round_trip(&LeafKind::Bytes, Value::Bytes(vec![0, 255, 128, 7]));
    }

    fn state_enum() -> LeafKind {
        LeafKind::Enum(
            EnumSpec::new("demo.State")
                .with_value("STATE_UNSPECIFIED", 0)
                .with_value("STATE_ACTIVE", 1)
                .with_value("STATE_DONE", 5),
        )
    }

    #[test]
    fn test_enum_name_and_number_resolve_to_same_value() {
        let kind = state_enum();
        let by_name = parse_value(&kind, "STATE_DONE").unwrap();
        let by_number = parse_value(&kind, "5").unwrap();
        assert_eq!(by_name, by_number);
        assert_eq!(
            by_name,
            Value::Enum(EnumValue {
                name: "STATE_DONE".into(),
                number: 5
            })
        );
    }

    #[test]
    fn test_enum_unknown_name_and_number_fail() {
        let kind = state_enum();
        assert!(matches!(
            parse_value(&kind, "state_done"),
            Err(ValueError::UnknownEnumValue { .. })
        ));
        assert!(matches!(
            parse_value(&kind, "3"),
            Err(ValueError::UnknownEnumValue { enum_name, raw }) if enum_name == "demo.State" && raw == "3"
        ));
    }

    #[test]
    fn test_enum_number_is_plain_decimal() {
        let kind = state_enum();
        assert!(matches!(parse_value(&kind, "0x1"), Err(ValueError::UnknownEnumValue { .. })));
        assert!(matches!(parse_value(&kind, "1_0"), Err(ValueError::UnknownEnumValue { .. })));
    }

    #[test]
    fn test_timestamp_normalizes_to_utc() {
        let value = parse_value(&LeafKind::Timestamp, "2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(format_value(&value), "2024-03-01T10:00:00Z");
        round_trip(
            &LeafKind::Timestamp,
            parse_value(&LeafKind::Timestamp, "2024-03-01T10:00:00.123456789Z").unwrap(),
        );
        assert!(matches!(
            parse_value(&LeafKind::Timestamp, "2024-03-01"),
            Err(ValueError::TimeFormat { .. })
        ));
    }

    #[test]
    fn test_struct_requires_object_and_keeps_unknown_members() {
        let value = parse_value(&LeafKind::Struct, r#"{"a": 1, "nested": {"b": [true]}}"#).unwrap();
        let Value::Struct(map) = value else {
            panic!("expected struct");
        };
        assert_eq!(map["nested"]["b"][0], true);

        assert!(matches!(
            parse_value(&LeafKind::Struct, "[1, 2]"),
            Err(ValueError::JsonDecode { kind: "struct", .. })
        ));
        assert!(matches!(
            parse_value(&LeafKind::Struct, "{not json"),
            Err(ValueError::JsonDecode { .. })
        ));
    }

    #[test]
    fn test_any_requires_type_member() {
        let value = parse_value(
            &LeafKind::Any,
            r#"{"@type": "type.googleapis.com/demo.Item", "name": "x", "extra": 1}"#,
        )
        .unwrap();
        let Value::Any(any) = value else {
            panic!("expected any");
        };
        assert_eq!(any.type_url, "type.googleapis.com/demo.Item");
        assert_eq!(any.fields.len(), 2);

        assert!(matches!(
            parse_value(&LeafKind::Any, r#"{"name": "x"}"#),
            Err(ValueError::JsonDecode { kind: "any", .. })
        ));
    }

    #[test]
    fn test_list_round_trip_with_quotes() {
        let items = vec![
            Value::String("plain".into()),
            Value::String("has \"quotes\"".into()),
            Value::String("a,b".into()),
            Value::String(String::new()),
        ];
        let raw = format_list(&items).unwrap();
        assert_eq!(parse_list(&LeafKind::String, &raw).unwrap(), items);

        assert_eq!(format_list(&[]).unwrap(), "");
        assert!(parse_list(&LeafKind::String, "").unwrap().is_empty());
    }

    #[test]
    fn test_list_of_enums_and_durations() {
        let kind = state_enum();
        let values = parse_list(&kind, "STATE_ACTIVE,0").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].as_i64(), Some(0));

        let durations = parse_list(&LeafKind::Duration, "1s,1h30m").unwrap();
        assert_eq!(
            durations,
            vec![
                Value::Duration(chrono::TimeDelta::seconds(1)),
                Value::Duration(chrono::TimeDelta::minutes(90)),
            ]
        );
    }

    #[test]
    fn test_list_element_errors_surface() {
        assert!(matches!(
            parse_list(&LeafKind::Int32, "1,x,3"),
            Err(ValueError::Format { .. })
        ));
        assert!(matches!(
            parse_list(&LeafKind::String, "a\nb"),
            Err(ValueError::Format { .. })
        ));
    }

    #[test]
    fn test_list_rejects_unterminated_quote() {
        assert!(matches!(
            parse_list(&LeafKind::String, r#"a,"b"#),
            Err(ValueError::Format { reason, .. }) if reason == "unterminated quoted field"
        ));
    }

    #[test]
    fn test_list_rejects_text_after_closing_quote() {
        assert!(matches!(
            parse_list(&LeafKind::String, r#""a"b,c"#),
            Err(ValueError::Format { reason, .. }) if reason == "text after closing quote"
        ));
    }

    #[test]
    fn test_list_rejects_bare_quote() {
        assert!(matches!(
            parse_list(&LeafKind::String, r#"x"y,z"#),
            Err(ValueError::Format { reason, .. }) if reason == "bare quote in unquoted field"
        ));
    }
}
