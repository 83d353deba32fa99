//! Schema model, value parsers and flag-tree compiler for message-shaped
//! command lines.
//!
//! This crate turns a structured message schema into a tree of CLI flags:
//!
//! - [`SchemaSet`]: the registry of [`MessageSpec`]s and [`EnumSpec`]s a
//!   host hands over once (built in code or loaded from JSON/YAML).
//! - [`compile`]: expands a root message into a [`FlagTree`]. Scalar,
//!   enum and well-known fields become [`LeafFlag`]s; nested messages become
//!   [`BranchFlag`]s entered by a bare boundary token.
//! - [`parse_value`] / [`parse_list`]: the per-kind value parsers, with
//!   [`format_value`] / [`format_list`] as their inverses.
//! - [`Value`] / [`MessageValue`]: the structured result a binder produces,
//!   convertible to JSON.
//!
//! Binding a token list against a compiled tree lives in the
//! `protoflag-args` crate.
//!
//! # Example
//!
//! ```
//! use protoflag_core::*;
//!
//! let schema = SchemaSet::new()
//!     .with_message(
//!         MessageSpec::new("demo.Deploy")
//!             .with_field(FieldSpec::new("service", FieldKind::String).required())
//!             .with_field(FieldSpec::new("timeout", FieldKind::Duration).with_default("30s"))
//!             .with_field(FieldSpec::new("target", FieldKind::Message("demo.Target".into())).repeated()),
//!     )
//!     .with_message(
//!         MessageSpec::new("demo.Target").with_field(FieldSpec::new("region", FieldKind::String)),
//!     );
//!
//! let tree = compile(&schema, "demo.Deploy").unwrap();
//! assert_eq!(tree.leaf("timeout").map(|l| l.kind.name()), Some("duration"));
//! assert!(tree.branch("target").is_some_and(BranchFlag::is_repeated));
//!
//! let ports = parse_list(&LeafKind::Uint32, "80,443").unwrap();
//! assert_eq!(format_list(&ports).unwrap(), "80,443");
//! ```

mod compile;
mod parsers;
mod schema;
mod tree;
mod types;
mod value;

pub use compile::{CompileError, compile};
pub use parsers::{
    ValueError, format_duration, format_list, format_value, parse_duration, parse_list,
    parse_value,
};
pub use schema::{SchemaError, SchemaSet};
pub use tree::{BranchFlag, FlagNode, FlagTree, LeafFlag, LeafKind};
pub use types::*;
pub use value::{AnyValue, EnumValue, MessageValue, Value};
