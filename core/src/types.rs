//! Schema type definitions for message-shaped command lines.
//!
//! This module defines the materialized schema the compiler consumes. The
//! host tool (a descriptor registry, a code generator, a hand-written file)
//! builds these values once; nothing in this crate queries the host again
//! after that. The types derive [`serde`] traits so a schema can be stored as
//! JSON or YAML and loaded with [`SchemaSet::load`](crate::SchemaSet::load).

use serde::{Deserialize, Serialize};

/// Fully qualified name of the well-known timestamp message.
pub const TIMESTAMP_MESSAGE: &str = "google.protobuf.Timestamp";
/// Fully qualified name of the well-known duration message.
pub const DURATION_MESSAGE: &str = "google.protobuf.Duration";
/// Fully qualified name of the well-known open struct message.
pub const STRUCT_MESSAGE: &str = "google.protobuf.Struct";
/// Fully qualified name of the well-known fully dynamic message.
pub const ANY_MESSAGE: &str = "google.protobuf.Any";

/// Declared kind of a schema field.
///
/// Numeric wire variants of the protobuf type system collapse onto the
/// scalar kind with the same native range, so a schema exported from a
/// descriptor can use either spelling.
///
/// # Examples
///
/// ```
/// use protoflag_core::FieldKind;
///
/// let kind: FieldKind = serde_json::from_str(r#""sfixed32""#).unwrap();
/// assert_eq!(kind, FieldKind::Int32);
///
/// let nested: FieldKind = serde_json::from_str(r#"{"message": "demo.Item"}"#).unwrap();
/// assert_eq!(nested, FieldKind::Message("demo.Item".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    #[serde(alias = "sint32", alias = "sfixed32")]
    Int32,
    #[serde(alias = "fixed32")]
    Uint32,
    #[serde(alias = "sint64", alias = "sfixed64")]
    Int64,
    #[serde(alias = "fixed64")]
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    /// Reference to an [`EnumSpec`] by fully qualified name.
    Enum(String),
    /// Reference to a [`MessageSpec`] by fully qualified name.
    Message(String),
    Timestamp,
    Duration,
    #[serde(alias = "struct")]
    DynamicStruct,
    #[serde(alias = "any")]
    DynamicAny,
}

/// How many values a field holds and whether presence is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// One value; an omitted field reads as its zero value.
    #[default]
    Singular,
    /// Zero or more values, accumulated across occurrences.
    Repeated,
    /// One value with explicit presence; an omitted field is absent.
    Optional,
    /// Member of the named oneof group; at most one member may be set.
    OneofMember(String),
}

impl Cardinality {
    /// Returns `true` for [`Cardinality::Repeated`].
    pub fn is_repeated(&self) -> bool {
        matches!(self, Cardinality::Repeated)
    }

    /// Returns the oneof group name, if this is a oneof member.
    pub fn oneof(&self) -> Option<&str> {
        match self {
            Cardinality::OneofMember(group) => Some(group),
            _ => None,
        }
    }

    /// Whether an omitted field of this cardinality is absent rather than
    /// zero-valued.
    pub fn tracks_presence(&self) -> bool {
        matches!(self, Cardinality::Optional | Cardinality::OneofMember(_))
    }
}

/// Schema for a single message field.
///
/// # Examples
///
/// ```
/// use protoflag_core::{Cardinality, FieldKind, FieldSpec};
///
/// let field = FieldSpec::new("createdAt", FieldKind::Timestamp)
///     .with_description("creation time of the record");
/// assert_eq!(field.cli_name(), "created_at");
///
/// let renamed = FieldSpec::new("use_custom_name", FieldKind::String).with_cli_name("custom");
/// assert_eq!(renamed.cli_name(), "custom");
///
/// let tags = FieldSpec::new("tags", FieldKind::String).repeated();
/// assert_eq!(tags.cardinality, Cardinality::Repeated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as declared in the schema.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Cardinality (defaults to singular).
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Explicit CLI name annotation, overriding the derived name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_name: Option<String>,
    /// Whether the field must be supplied on the command line.
    #[serde(default)]
    pub required: bool,
    /// Textual default, parsed with the field's own parser at compile time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Usage text (leading comment of the field).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    /// Creates a singular, non-required field.
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            cardinality: Cardinality::Singular,
            cli_name: None,
            required: false,
            default: None,
            description: None,
        }
    }

    /// Marks the field repeated.
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Marks the field presence-tracked.
    pub fn optional(mut self) -> Self {
        self.cardinality = Cardinality::Optional;
        self
    }

    /// Places the field in a oneof group.
    pub fn in_oneof(mut self, group: &str) -> Self {
        self.cardinality = Cardinality::OneofMember(group.to_string());
        self
    }

    /// Marks the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets an explicit CLI name.
    pub fn with_cli_name(mut self, name: &str) -> Self {
        self.cli_name = Some(name.to_string());
        self
    }

    /// Sets a textual default value.
    pub fn with_default(mut self, raw: &str) -> Self {
        self.default = Some(raw.to_string());
        self
    }

    /// Adds usage text.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns the name this field is addressed by on the command line.
    ///
    /// The explicit annotation wins; otherwise the schema name is normalized
    /// with [`normalize_flag_name`].
    pub fn cli_name(&self) -> String {
        match &self.cli_name {
            Some(name) => name.trim().to_string(),
            None => normalize_flag_name(&self.name),
        }
    }
}

/// Schema for a message: an ordered list of fields.
///
/// # Examples
///
/// ```
/// use protoflag_core::{FieldKind, FieldSpec, MessageSpec};
///
/// let msg = MessageSpec::new("demo.Outer")
///     .with_field(FieldSpec::new("id", FieldKind::String))
///     .with_field(FieldSpec::new("item", FieldKind::Message("demo.Nested".into())).repeated());
///
/// assert_eq!(msg.fields.len(), 2);
/// assert!(msg.field("item").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpec {
    /// Fully qualified message name (e.g. `demo.v1.CallRequest`).
    pub name: String,
    /// Usage text for the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl MessageSpec {
    /// Creates an empty message schema.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds usage text.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Finds a field by schema name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single named constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueSpec {
    pub name: String,
    pub number: i32,
}

/// Schema for an enum: declared constants in order.
///
/// # Examples
///
/// ```
/// use protoflag_core::EnumSpec;
///
/// let state = EnumSpec::new("demo.State")
///     .with_value("STATE_UNSPECIFIED", 0)
///     .with_value("STATE_ACTIVE", 1);
///
/// assert_eq!(state.by_name("STATE_ACTIVE").map(|v| v.number), Some(1));
/// assert_eq!(state.by_number(0).map(|v| v.name.as_str()), Some("STATE_UNSPECIFIED"));
/// assert!(state.by_name("state_active").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSpec {
    /// Fully qualified enum name.
    pub name: String,
    /// Declared constants.
    #[serde(default)]
    pub values: Vec<EnumValueSpec>,
}

impl EnumSpec {
    /// Creates an enum schema without constants.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    /// Appends a constant.
    pub fn with_value(mut self, name: &str, number: i32) -> Self {
        self.values.push(EnumValueSpec {
            name: name.to_string(),
            number,
        });
        self
    }

    /// Exact, case-sensitive lookup by constant name.
    pub fn by_name(&self, name: &str) -> Option<&EnumValueSpec> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Lookup by number. Aliased numbers resolve to the first declaration.
    pub fn by_number(&self, number: i32) -> Option<&EnumValueSpec> {
        self.values.iter().find(|v| v.number == number)
    }

    /// The constant an unset field reads as: the one numbered zero, or the
    /// first declared constant when no zero exists.
    pub fn default_value(&self) -> Option<&EnumValueSpec> {
        self.by_number(0).or_else(|| self.values.first())
    }
}

/// Normalizes a schema field name into its default CLI flag name.
///
/// Camel-case boundaries become underscores, dashes and spaces become
/// underscores, and the result is lower-cased.
///
/// # Examples
///
/// ```
/// use protoflag_core::normalize_flag_name;
///
/// assert_eq!(normalize_flag_name("useFieldName"), "use_field_name");
/// assert_eq!(normalize_flag_name("UseFieldName"), "use_field_name");
/// assert_eq!(normalize_flag_name("rep_nest"), "rep_nest");
/// assert_eq!(normalize_flag_name("Created-At"), "created_at");
/// assert_eq!(normalize_flag_name("HTTPServer"), "http_server");
/// ```
pub fn normalize_flag_name(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let starts_word = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if starts_word && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}
