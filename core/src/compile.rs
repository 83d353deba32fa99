//! Schema compilation into flag trees.
//!
//! [`compile`] walks a message schema depth first and produces a
//! [`FlagTree`]. Scalars, enums and the well-known message types become
//! leaves; every other message reference becomes a branch with its own
//! child tree. The walk threads a compilation context holding the stack of
//! messages currently being expanded, so self-referential schemas are
//! reported instead of recursing forever.
//!
//! # Examples
//!
//! ```
//! use protoflag_core::*;
//!
//! let schema = SchemaSet::new()
//!     .with_message(
//!         MessageSpec::new("demo.Outer")
//!             .with_field(FieldSpec::new("id", FieldKind::String))
//!             .with_field(FieldSpec::new("item", FieldKind::Message("demo.Nested".into())).repeated()),
//!     )
//!     .with_message(MessageSpec::new("demo.Nested").with_field(FieldSpec::new("name", FieldKind::String)));
//!
//! let tree = compile(&schema, "demo.Outer").unwrap();
//! assert_eq!(tree.boundary_names(), vec!["item"]);
//! assert_eq!(tree.depth(), 2);
//!
//! // A message that contains itself cannot be expanded into flags.
//! let looped = SchemaSet::new().with_message(
//!     MessageSpec::new("demo.Node").with_field(FieldSpec::new("next", FieldKind::Message("demo.Node".into()))),
//! );
//! assert!(matches!(compile(&looped, "demo.Node"), Err(CompileError::SchemaCycle(_))));
//! ```

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::parsers::{parse_list, parse_value};
use crate::tree::{BranchFlag, FlagNode, FlagTree, LeafFlag, LeafKind};
use crate::value::Value;
use crate::{
    ANY_MESSAGE, DURATION_MESSAGE, FieldKind, FieldSpec, MessageSpec, STRUCT_MESSAGE,
    SchemaSet, TIMESTAMP_MESSAGE,
};

/// Errors that abort compilation. No partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A message is reachable from itself; the path lists the messages on
    /// the cycle, starting and ending with the repeated one.
    #[error("schema cycle: {}", .0.join(" -> "))]
    SchemaCycle(Vec<String>),

    /// Two fields of one message resolve to the same CLI name.
    #[error("duplicate flag name {name:?} in {message}")]
    DuplicateFlagName { message: String, name: String },

    /// A boundary name of one level is reused by a branch nested below it.
    #[error("boundary name {name:?} of {message} is reused inside {nested}")]
    BoundaryNameCollision {
        message: String,
        name: String,
        nested: String,
    },

    /// A message or enum reference does not resolve in the schema set.
    #[error("unknown type {name} (referenced from {origin})")]
    UnknownType { name: String, origin: String },

    /// A CLI name is empty, contains whitespace or `=`, or starts with `-`.
    #[error("invalid flag name {name:?} for {message}.{field}")]
    InvalidFlagName {
        message: String,
        field: String,
        name: String,
    },

    /// A declared default cannot be parsed, or is declared on a branch or
    /// a oneof member.
    #[error("invalid default for {message}.{field}: {reason}")]
    InvalidDefault {
        message: String,
        field: String,
        reason: String,
    },
}

/// Compiles the message `root` of `schema` into a flag tree.
pub fn compile(schema: &SchemaSet, root: &str) -> Result<FlagTree, CompileError> {
    let mut ctx = CompileContext {
        schema,
        active: Vec::new(),
    };
    let spec = schema.message(root).ok_or_else(|| CompileError::UnknownType {
        name: root.to_string(),
        origin: "root".to_string(),
    })?;
    let tree = ctx.expand(spec)?;
    debug!(root, depth = tree.depth(), nodes = tree.nodes.len(), "Compiled flag tree");
    Ok(tree)
}

struct CompileContext<'a> {
    schema: &'a SchemaSet,
    /// Messages currently being expanded, outermost first.
    active: Vec<String>,
}

impl CompileContext<'_> {
    fn expand(&mut self, spec: &MessageSpec) -> Result<FlagTree, CompileError> {
        if let Some(start) = self.active.iter().position(|m| *m == spec.name) {
            let mut cycle = self.active[start..].to_vec();
            cycle.push(spec.name.clone());
            return Err(CompileError::SchemaCycle(cycle));
        }

        debug!(type_name = %spec.name, depth = self.active.len(), "Expanding message");
        self.active.push(spec.name.clone());
        let nodes = self.compile_fields(spec);
        self.active.pop();

        let tree = FlagTree {
            message: spec.name.clone(),
            description: spec.description.clone(),
            nodes: nodes?,
        };
        check_boundaries(&tree)?;
        Ok(tree)
    }

    fn compile_fields(&mut self, spec: &MessageSpec) -> Result<Vec<FlagNode>, CompileError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut nodes = Vec::with_capacity(spec.fields.len());

        for field in &spec.fields {
            let name = field.cli_name();
            if !is_valid_flag_name(&name) {
                return Err(CompileError::InvalidFlagName {
                    message: spec.name.clone(),
                    field: field.name.clone(),
                    name,
                });
            }
            if !seen.insert(name.clone()) {
                return Err(CompileError::DuplicateFlagName {
                    message: spec.name.clone(),
                    name,
                });
            }
            nodes.push(self.compile_field(spec, field, name)?);
        }

        Ok(nodes)
    }

    fn compile_field(
        &mut self,
        parent: &MessageSpec,
        field: &FieldSpec,
        name: String,
    ) -> Result<FlagNode, CompileError> {
        let kind = match &field.kind {
            FieldKind::Bool => LeafKind::Bool,
            FieldKind::Int32 => LeafKind::Int32,
            FieldKind::Uint32 => LeafKind::Uint32,
            FieldKind::Int64 => LeafKind::Int64,
            FieldKind::Uint64 => LeafKind::Uint64,
            FieldKind::Float => LeafKind::Float,
            FieldKind::Double => LeafKind::Double,
            FieldKind::String => LeafKind::String,
            FieldKind::Bytes => LeafKind::Bytes,
            FieldKind::Timestamp => LeafKind::Timestamp,
            FieldKind::Duration => LeafKind::Duration,
            FieldKind::DynamicStruct => LeafKind::Struct,
            FieldKind::DynamicAny => LeafKind::Any,
            FieldKind::Enum(enum_name) => {
                let spec = self.schema.enumeration(enum_name).ok_or_else(|| {
                    CompileError::UnknownType {
                        name: enum_name.clone(),
                        origin: format!("{}.{}", parent.name, field.name),
                    }
                })?;
                LeafKind::Enum(spec.clone())
            }
            FieldKind::Message(message_name) => match well_known_leaf(message_name) {
                Some(kind) => {
                    debug!(field = %field.name, type_name = %message_name, "Using well-known leaf");
                    kind
                }
                None => return self.compile_branch(parent, field, name, message_name),
            },
        };

        if field.default.is_some() && field.cardinality.oneof().is_some() {
            return Err(CompileError::InvalidDefault {
                message: parent.name.clone(),
                field: field.name.clone(),
                reason: "oneof members cannot declare a default".to_string(),
            });
        }
        let default = match &field.default {
            Some(raw) => Some(parse_default(&kind, field, raw).map_err(|reason| {
                CompileError::InvalidDefault {
                    message: parent.name.clone(),
                    field: field.name.clone(),
                    reason,
                }
            })?),
            None => None,
        };

        Ok(FlagNode::Leaf(LeafFlag {
            name,
            field: field.name.clone(),
            kind,
            cardinality: field.cardinality.clone(),
            required: field.required,
            description: field.description.clone(),
            default_raw: field.default.clone(),
            default,
        }))
    }

    fn compile_branch(
        &mut self,
        parent: &MessageSpec,
        field: &FieldSpec,
        name: String,
        message_name: &str,
    ) -> Result<FlagNode, CompileError> {
        if field.default.is_some() {
            return Err(CompileError::InvalidDefault {
                message: parent.name.clone(),
                field: field.name.clone(),
                reason: "nested messages cannot declare a default".to_string(),
            });
        }
        let spec = self
            .schema
            .message(message_name)
            .ok_or_else(|| CompileError::UnknownType {
                name: message_name.to_string(),
                origin: format!("{}.{}", parent.name, field.name),
            })?;
        let child = self.expand(spec)?;

        Ok(FlagNode::Branch(BranchFlag {
            name,
            field: field.name.clone(),
            message: message_name.to_string(),
            cardinality: field.cardinality.clone(),
            required: field.required,
            description: field.description.clone(),
            child,
        }))
    }
}

fn well_known_leaf(message: &str) -> Option<LeafKind> {
    match message {
        TIMESTAMP_MESSAGE => Some(LeafKind::Timestamp),
        DURATION_MESSAGE => Some(LeafKind::Duration),
        STRUCT_MESSAGE => Some(LeafKind::Struct),
        ANY_MESSAGE => Some(LeafKind::Any),
        _ => None,
    }
}

fn parse_default(kind: &LeafKind, field: &FieldSpec, raw: &str) -> Result<Value, String> {
    let parsed = if field.cardinality.is_repeated() {
        parse_list(kind, raw).map(Value::List)
    } else {
        parse_value(kind, raw)
    };
    parsed.map_err(|e| e.to_string())
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(char::is_whitespace)
}

/// Rejects a boundary name of `tree` that reappears as a branch name
/// anywhere below it. Nested levels were already checked when they were
/// expanded.
fn check_boundaries(tree: &FlagTree) -> Result<(), CompileError> {
    let names = tree.boundary_names();
    if names.is_empty() {
        return Ok(());
    }
    for branch in tree.branches() {
        if let Some((name, nested)) = find_nested_boundary(&branch.child, &names) {
            return Err(CompileError::BoundaryNameCollision {
                message: tree.message.clone(),
                name: name.to_string(),
                nested: nested.to_string(),
            });
        }
    }
    Ok(())
}

fn find_nested_boundary<'t>(tree: &'t FlagTree, names: &[&str]) -> Option<(&'t str, &'t str)> {
    for branch in tree.branches() {
        if names.contains(&branch.name.as_str()) {
            return Some((branch.name.as_str(), tree.message.as_str()));
        }
        if let Some(hit) = find_nested_boundary(&branch.child, names) {
            return Some(hit);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cardinality, EnumSpec};

    fn msg(name: &str, fields: Vec<FieldSpec>) -> MessageSpec {
        fields
            .into_iter()
            .fold(MessageSpec::new(name), MessageSpec::with_field)
    }

    fn nested(name: &str, message: &str) -> FieldSpec {
        FieldSpec::new(name, FieldKind::Message(message.into()))
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let schema = SchemaSet::new()
            .with_message(msg("demo.A", vec![nested("b", "demo.B")]))
            .with_message(msg("demo.B", vec![nested("back", "demo.A")]));

        let err = compile(&schema, "demo.A").unwrap_err();
        assert_eq!(
            err,
            CompileError::SchemaCycle(vec!["demo.A".into(), "demo.B".into(), "demo.A".into()])
        );
        assert_eq!(err.to_string(), "schema cycle: demo.A -> demo.B -> demo.A");
    }

    #[test]
    fn test_same_type_in_sibling_branches_is_not_a_cycle() {
        let schema = SchemaSet::new()
            .with_message(msg(
                "demo.Call",
                vec![nested("src", "demo.Addr"), nested("dst", "demo.Addr")],
            ))
            .with_message(msg("demo.Addr", vec![FieldSpec::new("host", FieldKind::String)]));

        let tree = compile(&schema, "demo.Call").unwrap();
        assert_eq!(tree.boundary_names(), vec!["src", "dst"]);
    }

    #[test]
    fn test_any_is_a_terminal_leaf() {
        let schema = SchemaSet::new().with_message(msg(
            "demo.Envelope",
            vec![
                nested("payload", ANY_MESSAGE),
                FieldSpec::new("extra", FieldKind::DynamicAny).repeated(),
            ],
        ));

        let tree = compile(&schema, "demo.Envelope").unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf("payload").map(|l| &l.kind), Some(&LeafKind::Any));
        assert_eq!(tree.leaf("extra").map(|l| &l.kind), Some(&LeafKind::Any));
    }

    #[test]
    fn test_well_known_messages_become_leaves() {
        let schema = SchemaSet::new().with_message(msg(
            "demo.Job",
            vec![
                nested("startAt", TIMESTAMP_MESSAGE),
                nested("timeout", DURATION_MESSAGE),
                nested("labels", STRUCT_MESSAGE),
            ],
        ));

        let tree = compile(&schema, "demo.Job").unwrap();
        let kinds: Vec<&str> = tree.leaves().map(|l| l.kind.name()).collect();
        assert_eq!(kinds, vec!["timestamp", "duration", "struct"]);
        assert_eq!(tree.nodes[0].name(), "start_at");
        assert_eq!(tree.nodes[0].field(), "startAt");
    }

    #[test]
    fn test_duplicate_cli_names_are_rejected() {
        let schema = SchemaSet::new().with_message(msg(
            "demo.Dup",
            vec![
                FieldSpec::new("userName", FieldKind::String),
                FieldSpec::new("user_name", FieldKind::String),
            ],
        ));

        assert_eq!(
            compile(&schema, "demo.Dup").unwrap_err(),
            CompileError::DuplicateFlagName {
                message: "demo.Dup".into(),
                name: "user_name".into()
            }
        );
    }

    #[test]
    fn test_explicit_cli_name_overrides_and_is_validated() {
        let good = SchemaSet::new().with_message(msg(
            "demo.Named",
            vec![FieldSpec::new("use_custom_name", FieldKind::String).with_cli_name("custom")],
        ));
        let tree = compile(&good, "demo.Named").unwrap();
        assert!(tree.leaf("custom").is_some());

        for bad in ["", "--flag", "a b", "k=v"] {
            let schema = SchemaSet::new().with_message(msg(
                "demo.Named",
                vec![FieldSpec::new("field", FieldKind::String).with_cli_name(bad)],
            ));
            assert!(
                matches!(
                    compile(&schema, "demo.Named"),
                    Err(CompileError::InvalidFlagName { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_boundary_reused_below_is_rejected() {
        let schema = SchemaSet::new()
            .with_message(msg(
                "demo.Outer",
                vec![nested("item", "demo.Mid"), nested("tail", "demo.Leaf")],
            ))
            .with_message(msg("demo.Mid", vec![nested("deep", "demo.Deep")]))
            .with_message(msg("demo.Deep", vec![nested("tail", "demo.Leaf")]))
            .with_message(msg("demo.Leaf", vec![FieldSpec::new("x", FieldKind::Int32)]));

        assert_eq!(
            compile(&schema, "demo.Outer").unwrap_err(),
            CompileError::BoundaryNameCollision {
                message: "demo.Outer".into(),
                name: "tail".into(),
                nested: "demo.Deep".into(),
            }
        );
    }

    #[test]
    fn test_unknown_references_are_rejected() {
        let schema = SchemaSet::new().with_message(msg(
            "demo.Ref",
            vec![FieldSpec::new("state", FieldKind::Enum("demo.Missing".into()))],
        ));

        assert_eq!(
            compile(&schema, "demo.Ref").unwrap_err(),
            CompileError::UnknownType {
                name: "demo.Missing".into(),
                origin: "demo.Ref.state".into()
            }
        );
        assert!(matches!(
            compile(&schema, "demo.Nope"),
            Err(CompileError::UnknownType { origin, .. }) if origin == "root"
        ));
    }

    #[test]
    fn test_defaults_are_parsed_at_compile_time() {
        let schema = SchemaSet::new()
            .with_message(msg(
                "demo.Opts",
                vec![
                    FieldSpec::new("retries", FieldKind::Uint32).with_default("3"),
                    FieldSpec::new("ports", FieldKind::Int32).repeated().with_default("80,443"),
                    FieldSpec::new("level", FieldKind::Enum("demo.Level".into())).with_default("2"),
                ],
            ))
            .with_enum(
                EnumSpec::new("demo.Level")
                    .with_value("LEVEL_UNSPECIFIED", 0)
                    .with_value("LEVEL_HIGH", 2),
            );

        let tree = compile(&schema, "demo.Opts").unwrap();
        assert_eq!(tree.leaf("retries").and_then(|l| l.default.clone()), Some(Value::Uint32(3)));
        assert_eq!(
            tree.leaf("ports").and_then(|l| l.default.clone()),
            Some(Value::List(vec![Value::Int32(80), Value::Int32(443)]))
        );
        assert_eq!(
            tree.leaf("level")
                .and_then(|l| l.default.as_ref())
                .and_then(Value::as_i64),
            Some(2)
        );
    }

    #[test]
    fn test_bad_defaults_are_rejected() {
        let unparsable = SchemaSet::new().with_message(msg(
            "demo.Opts",
            vec![FieldSpec::new("retries", FieldKind::Uint32).with_default("-1")],
        ));
        assert!(matches!(
            compile(&unparsable, "demo.Opts"),
            Err(CompileError::InvalidDefault { field, .. }) if field == "retries"
        ));

        let on_branch = SchemaSet::new()
            .with_message(msg(
                "demo.Opts",
                vec![nested("inner", "demo.Inner").with_default("x")],
            ))
            .with_message(msg("demo.Inner", vec![]));
        assert!(matches!(
            compile(&on_branch, "demo.Opts"),
            Err(CompileError::InvalidDefault { field, .. }) if field == "inner"
        ));

        let in_oneof = SchemaSet::new().with_message(msg(
            "demo.Opts",
            vec![FieldSpec::new("text", FieldKind::String).in_oneof("payload").with_default("x")],
        ));
        assert!(matches!(
            compile(&in_oneof, "demo.Opts"),
            Err(CompileError::InvalidDefault { field, .. }) if field == "text"
        ));
    }

    #[test]
    fn test_five_levels_keep_declared_order() {
        let mut schema = SchemaSet::new();
        for level in 1..=5 {
            let mut fields = vec![
                FieldSpec::new("name", FieldKind::String),
                FieldSpec::new("count", FieldKind::Int64),
            ];
            if level < 5 {
                fields.push(nested(&format!("l{}", level + 1), &format!("demo.L{}", level + 1)).repeated());
            }
            schema = schema.with_message(msg(&format!("demo.L{level}"), fields));
        }

        let tree = compile(&schema, "demo.L1").unwrap();
        assert_eq!(tree.depth(), 5);
        let names: Vec<&str> = tree.nodes.iter().map(FlagNode::name).collect();
        assert_eq!(names, vec!["name", "count", "l2"]);
        assert_eq!(
            tree.branch("l2").map(|b| &b.cardinality),
            Some(&Cardinality::Repeated)
        );
    }
}
