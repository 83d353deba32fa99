//! Binding command-line tokens against compiled protoflag trees.
//!
//! Given a [`FlagTree`] from `protoflag-core`, this crate turns the tokens
//! after a command name into a [`MessageValue`]:
//!
//! - [`segment`]: splits a token range at the bare boundary names of one
//!   tree level into the level's own prefix and one [`ArgumentRange`] per
//!   nested-message occurrence.
//! - [`bind`]: parses each level's `--flag` tokens with the leaf value
//!   parsers and recurses into nested ranges, reporting the first failure
//!   as a [`BindError`] located by a [`FieldPath`].
//!
//! A compiled tree is immutable, so one tree can bind any number of token
//! lists, from any number of threads.
//!
//! # Example
//!
//! ```
//! use protoflag_args::parse_message;
//! use protoflag_core::*;
//!
//! let schema = SchemaSet::new()
//!     .with_message(
//!         MessageSpec::new("demo.Query")
//!             .with_field(FieldSpec::new("table", FieldKind::String).required())
//!             .with_field(FieldSpec::new("limit", FieldKind::Uint32).with_default("100")),
//!     );
//!
//! let msg = parse_message(&schema, "demo.Query", &["--table", "users"]).unwrap();
//! assert_eq!(msg.get("limit"), Some(&Value::Uint32(100)));
//!
//! let err = parse_message(&schema, "demo.Query", &["--limit", "5"]).unwrap_err();
//! assert_eq!(err.to_string(), "table: missing required field");
//! ```
//!
//! [`FlagTree`]: protoflag_core::FlagTree
//! [`MessageValue`]: protoflag_core::MessageValue

mod bind;
mod error;
mod segment;

pub use bind::bind;
pub use error::{BindError, BindErrorKind, Error, FieldPath, PathSegment, Result};
pub use segment::{ArgumentRange, Segments, segment};

use protoflag_core::{MessageValue, SchemaSet, compile};

/// Compiles `root` and binds `tokens` against it in one step.
///
/// Prefer [`compile`] once plus [`bind`] per invocation when the same
/// message is parsed repeatedly.
pub fn parse_message<S: AsRef<str>>(
    schema: &SchemaSet,
    root: &str,
    tokens: &[S],
) -> Result<MessageValue> {
    let tree = compile(schema, root)?;
    Ok(bind(&tree, tokens)?)
}
