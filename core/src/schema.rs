//! Schema registry: the set of messages and enums a compilation resolves
//! references against.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnumSpec, MessageSpec};

/// Errors raised while loading a [`SchemaSet`] from disk or text.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two messages or two enums share a fully qualified name.
    #[error("duplicate type in schema set: {0}")]
    DuplicateType(String),
}

/// Materialized schema registry handed over by the host.
///
/// Field kinds refer to messages and enums by fully qualified name; the
/// compiler resolves those names here and nowhere else.
///
/// # Examples
///
/// ```
/// use protoflag_core::*;
///
/// let set = SchemaSet::new()
///     .with_message(
///         MessageSpec::new("demo.Outer")
///             .with_field(FieldSpec::new("state", FieldKind::Enum("demo.State".into()))),
///     )
///     .with_enum(EnumSpec::new("demo.State").with_value("STATE_UNSPECIFIED", 0));
///
/// assert!(set.message("demo.Outer").is_some());
/// assert!(set.enumeration("demo.State").is_some());
/// assert_eq!(set.message_names(), vec!["demo.Outer"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSet {
    /// Optional package the schema was exported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Message schemas.
    #[serde(default)]
    pub messages: Vec<MessageSpec>,
    /// Enum schemas.
    #[serde(default)]
    pub enums: Vec<EnumSpec>,
}

impl SchemaSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message schema.
    pub fn with_message(mut self, message: MessageSpec) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds an enum schema.
    pub fn with_enum(mut self, enumeration: EnumSpec) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Finds a message by fully qualified name.
    pub fn message(&self, name: &str) -> Option<&MessageSpec> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Finds an enum by fully qualified name.
    pub fn enumeration(&self, name: &str) -> Option<&EnumSpec> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Names of all messages, in declaration order.
    pub fn message_names(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.name.as_str()).collect()
    }

    /// Parses a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let set: Self = serde_json::from_str(raw)?;
        set.check_unique()?;
        Ok(set)
    }

    /// Parses a YAML document.
    pub fn from_yaml(raw: &str) -> Result<Self, SchemaError> {
        let set: Self = serde_yaml::from_str(raw)?;
        set.check_unique()?;
        Ok(set)
    }

    /// Loads a schema file, choosing YAML for `.yaml`/`.yml` and JSON
    /// otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&raw),
            _ => Self::from_json(&raw),
        }
    }

    fn check_unique(&self) -> Result<(), SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for name in self.messages.iter().map(|m| &m.name) {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateType(name.clone()));
            }
        }
        seen.clear();
        for name in self.enums.iter().map(|e| &e.name) {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateType(name.clone()));
            }
        }
        Ok(())
    }
}
