//! Compiled flag trees.
//!
//! A [`FlagTree`] mirrors one message schema: every field becomes either a
//! [`LeafFlag`] parsed from a single token, or a [`BranchFlag`] whose bare
//! name opens a nested argument range owned by a child tree. Trees are built
//! once by [`compile`](crate::compile) and never mutated afterwards, so one
//! tree can serve any number of invocations, on any number of threads.

use serde::Serialize;

use crate::value::{EnumValue, Value};
use crate::{Cardinality, EnumSpec};

/// Parser selector for a leaf flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Bool,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    /// Enum constants resolved from the schema set.
    Enum(EnumSpec),
    Timestamp,
    Duration,
    Struct,
    Any,
}

impl LeafKind {
    /// Short kind name used in diagnostics and help text.
    pub fn name(&self) -> &'static str {
        match self {
            LeafKind::Bool => "bool",
            LeafKind::Int32 => "int32",
            LeafKind::Uint32 => "uint32",
            LeafKind::Int64 => "int64",
            LeafKind::Uint64 => "uint64",
            LeafKind::Float => "float",
            LeafKind::Double => "double",
            LeafKind::String => "string",
            LeafKind::Bytes => "bytes",
            LeafKind::Enum(_) => "enum",
            LeafKind::Timestamp => "timestamp",
            LeafKind::Duration => "duration",
            LeafKind::Struct => "struct",
            LeafKind::Any => "any",
        }
    }

    /// Value an omitted singular field reads as. Message-like kinds have no
    /// zero value and are left absent instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoflag_core::{LeafKind, Value};
    ///
    /// assert_eq!(LeafKind::Uint64.zero_value(), Some(Value::Uint64(0)));
    /// assert_eq!(LeafKind::String.zero_value(), Some(Value::String(String::new())));
    /// assert_eq!(LeafKind::Timestamp.zero_value(), None);
    /// ```
    pub fn zero_value(&self) -> Option<Value> {
        let value = match self {
            LeafKind::Bool => Value::Bool(false),
            LeafKind::Int32 => Value::Int32(0),
            LeafKind::Uint32 => Value::Uint32(0),
            LeafKind::Int64 => Value::Int64(0),
            LeafKind::Uint64 => Value::Uint64(0),
            LeafKind::Float => Value::Float(0.0),
            LeafKind::Double => Value::Double(0.0),
            LeafKind::String => Value::String(String::new()),
            LeafKind::Bytes => Value::Bytes(Vec::new()),
            LeafKind::Enum(spec) => Value::Enum(match spec.default_value() {
                Some(v) => EnumValue {
                    name: v.name.clone(),
                    number: v.number,
                },
                None => EnumValue {
                    name: String::new(),
                    number: 0,
                },
            }),
            LeafKind::Timestamp | LeafKind::Duration | LeafKind::Struct | LeafKind::Any => {
                return None;
            }
        };
        Some(value)
    }
}

/// A flag parsed from tokens at its own level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafFlag {
    /// CLI name, matched as `--name`.
    pub name: String,
    /// Schema field name the value is stored under.
    pub field: String,
    pub kind: LeafKind,
    pub cardinality: Cardinality,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared default as written in the schema.
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_raw: Option<String>,
    /// Declared default, parsed at compile time.
    #[serde(skip)]
    pub default: Option<Value>,
}

impl LeafFlag {
    /// Whether the flag consumes a value token. Singular bool flags are
    /// switches and only take an inline `=value`.
    pub fn takes_value(&self) -> bool {
        !(self.kind == LeafKind::Bool && !self.cardinality.is_repeated())
    }
}

/// A nested message entered by its bare boundary name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchFlag {
    /// Boundary token that opens one instance of the nested message.
    pub name: String,
    /// Schema field name the value is stored under.
    pub field: String,
    /// Fully qualified name of the nested message.
    pub message: String,
    pub cardinality: Cardinality,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub child: FlagTree,
}

impl BranchFlag {
    pub fn is_repeated(&self) -> bool {
        self.cardinality.is_repeated()
    }
}

/// One compiled field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum FlagNode {
    Leaf(LeafFlag),
    Branch(BranchFlag),
}

impl FlagNode {
    /// CLI name of the node.
    pub fn name(&self) -> &str {
        match self {
            FlagNode::Leaf(leaf) => &leaf.name,
            FlagNode::Branch(branch) => &branch.name,
        }
    }

    /// Schema field name of the node.
    pub fn field(&self) -> &str {
        match self {
            FlagNode::Leaf(leaf) => &leaf.field,
            FlagNode::Branch(branch) => &branch.field,
        }
    }
}

/// Compiled mirror of a message schema, in declared field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagTree {
    /// Fully qualified name of the message this tree was compiled from.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<FlagNode>,
}

impl FlagTree {
    /// Leaf flags at this level, in declared order.
    pub fn leaves(&self) -> impl Iterator<Item = &LeafFlag> {
        self.nodes.iter().filter_map(|node| match node {
            FlagNode::Leaf(leaf) => Some(leaf),
            FlagNode::Branch(_) => None,
        })
    }

    /// Branches at this level, in declared order.
    pub fn branches(&self) -> impl Iterator<Item = &BranchFlag> {
        self.nodes.iter().filter_map(|node| match node {
            FlagNode::Branch(branch) => Some(branch),
            FlagNode::Leaf(_) => None,
        })
    }

    /// Boundary names active at this level.
    pub fn boundary_names(&self) -> Vec<&str> {
        self.branches().map(|b| b.name.as_str()).collect()
    }

    /// Finds a leaf by CLI name.
    pub fn leaf(&self, name: &str) -> Option<&LeafFlag> {
        self.leaves().find(|leaf| leaf.name == name)
    }

    /// Finds a branch by CLI name.
    pub fn branch(&self, name: &str) -> Option<&BranchFlag> {
        self.branches().find(|branch| branch.name == name)
    }

    /// Number of nesting levels, counting this one.
    pub fn depth(&self) -> usize {
        1 + self
            .branches()
            .map(|b| b.child.depth())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, kind: LeafKind, cardinality: Cardinality) -> FlagNode {
        FlagNode::Leaf(LeafFlag {
            name: name.to_string(),
            field: name.to_string(),
            kind,
            cardinality,
            required: false,
            description: None,
            default_raw: None,
            default: None,
        })
    }

    #[test]
    fn test_bool_switch_takes_no_value() {
        let FlagNode::Leaf(switch) = leaf("verbose", LeafKind::Bool, Cardinality::Singular) else {
            unreachable!()
        };
        let FlagNode::Leaf(list) = leaf("bits", LeafKind::Bool, Cardinality::Repeated) else {
            unreachable!()
        };
        assert!(!switch.takes_value());
        assert!(list.takes_value());
    }

    #[test]
    fn test_enum_zero_value_uses_declared_zero() {
        let kind = LeafKind::Enum(
            EnumSpec::new("demo.Level")
                .with_value("LEVEL_HIGH", 2)
                .with_value("LEVEL_UNSPECIFIED", 0),
        );
        assert_eq!(
            kind.zero_value(),
            Some(Value::Enum(EnumValue {
                name: "LEVEL_UNSPECIFIED".into(),
                number: 0
            }))
        );
    }

    #[test]
    fn test_depth_and_boundaries() {
        let inner = FlagTree {
            message: "demo.Inner".into(),
            description: None,
            nodes: vec![leaf("name", LeafKind::String, Cardinality::Singular)],
        };
        let tree = FlagTree {
            message: "demo.Outer".into(),
            description: None,
            nodes: vec![
                leaf("id", LeafKind::String, Cardinality::Singular),
                FlagNode::Branch(BranchFlag {
                    name: "item".into(),
                    field: "item".into(),
                    message: "demo.Inner".into(),
                    cardinality: Cardinality::Repeated,
                    required: false,
                    description: None,
                    child: inner,
                }),
            ],
        };

        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.boundary_names(), vec!["item"]);
        assert!(tree.leaf("id").is_some());
        assert!(tree.leaf("item").is_none());
        assert!(tree.branch("item").is_some_and(BranchFlag::is_repeated));
    }
}
