//! Binding tokens against a compiled flag tree.
//!
//! Each level of the tree is handled the same way: the level's tokens are
//! segmented at its boundary names, the prefix is parsed as long flags into
//! one slot per leaf, and every branch recurses into the range (or ranges)
//! its boundary opened. The first error in depth-first order aborts binding.

use protoflag_core::{
    BranchFlag, FlagNode, FlagTree, LeafFlag, MessageValue, Value, parse_list, parse_value,
};
use tracing::debug;

use crate::error::{BindError, BindErrorKind, FieldPath};
use crate::segment::{ArgumentRange, segment};

/// Binds `tokens` against `tree`, producing a message in schema order.
///
/// # Examples
///
/// ```
/// use protoflag_args::bind;
/// use protoflag_core::*;
///
/// let schema = SchemaSet::new()
///     .with_message(
///         MessageSpec::new("demo.Outer")
///             .with_field(FieldSpec::new("id", FieldKind::String))
///             .with_field(FieldSpec::new("item", FieldKind::Message("demo.Nested".into())).repeated()),
///     )
///     .with_message(MessageSpec::new("demo.Nested").with_field(FieldSpec::new("name", FieldKind::String)));
/// let tree = compile(&schema, "demo.Outer").unwrap();
///
/// let msg = bind(&tree, &["--id", "x", "item", "--name", "a", "item", "--name", "b"]).unwrap();
/// assert_eq!(
///     msg.to_json(),
///     serde_json::json!({"id": "x", "item": [{"name": "a"}, {"name": "b"}]})
/// );
/// ```
pub fn bind<S: AsRef<str>>(tree: &FlagTree, tokens: &[S]) -> Result<MessageValue, BindError> {
    let binder = Binder { tokens };
    binder.bind_level(tree, ArgumentRange::new(0, tokens.len()), &FieldPath::root())
}

struct Binder<'t, S> {
    tokens: &'t [S],
}

impl<S: AsRef<str>> Binder<'_, S> {
    fn token(&self, i: usize) -> &str {
        self.tokens[i].as_ref()
    }

    fn bind_level(
        &self,
        tree: &FlagTree,
        range: ArgumentRange,
        path: &FieldPath,
    ) -> Result<MessageValue, BindError> {
        let boundaries = tree.boundary_names();
        let segments = segment(range.slice(self.tokens), &boundaries).shift(range.lo);
        debug!(
            type_name = %tree.message,
            path = %path,
            prefix = segments.prefix.len(),
            "Segmented level"
        );

        let leaves: Vec<&LeafFlag> = tree.leaves().collect();
        let slots = self.parse_prefix(&leaves, segments.prefix, path)?;

        let mut message = MessageValue::new();
        let mut set_oneofs: Vec<(&str, &str)> = Vec::new();
        let mut slots = slots.into_iter();

        for node in &tree.nodes {
            let value = match node {
                FlagNode::Leaf(leaf) => {
                    let slot = slots.next().flatten();
                    resolve_leaf(leaf, slot, path)?
                }
                FlagNode::Branch(branch) => {
                    self.bind_branch(branch, segments.all(&branch.name), path)?
                }
            };
            let Some(value) = value else { continue };

            if let Some(group) = cardinality_oneof(node) {
                if let Some((_, first)) = set_oneofs.iter().find(|(g, _)| *g == group) {
                    return Err(BindError::new(
                        path.clone(),
                        BindErrorKind::OneofConflict {
                            group: group.to_string(),
                            first: first.to_string(),
                            second: node.name().to_string(),
                        },
                    ));
                }
                set_oneofs.push((group, node.name()));
            }
            message.set(node.field(), value);
        }

        Ok(message)
    }

    /// Parses the level's own flags into one slot per leaf, in leaf order.
    /// A slot is `None` when its flag never appeared.
    fn parse_prefix(
        &self,
        leaves: &[&LeafFlag],
        prefix: ArgumentRange,
        path: &FieldPath,
    ) -> Result<Vec<Option<Value>>, BindError> {
        let mut slots: Vec<Option<Value>> = vec![None; leaves.len()];

        let mut i = prefix.lo;
        while i < prefix.hi {
            let token = self.token(i);
            i += 1;

            let Some(flag) = token.strip_prefix("--").filter(|f| !f.is_empty()) else {
                return Err(BindError::new(
                    path.clone(),
                    BindErrorKind::UnexpectedArgument(token.to_string()),
                ));
            };
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            let Some(idx) = leaves.iter().position(|leaf| leaf.name == name) else {
                return Err(BindError::new(
                    path.clone(),
                    BindErrorKind::UnknownFlag(name.to_string()),
                ));
            };
            let leaf = leaves[idx];

            let raw = match inline {
                Some(value) => value,
                None if !leaf.takes_value() => "true",
                None if i < prefix.hi => {
                    i += 1;
                    self.token(i - 1)
                }
                None => {
                    return Err(BindError::new(
                        path.clone(),
                        BindErrorKind::MissingFlagValue(name.to_string()),
                    ));
                }
            };

            let value_error = |source| {
                BindError::new(
                    path.child(&leaf.name),
                    BindErrorKind::Value {
                        flag: leaf.name.clone(),
                        source,
                    },
                )
            };
            if leaf.cardinality.is_repeated() {
                let mut items = parse_list(&leaf.kind, raw).map_err(value_error)?;
                match &mut slots[idx] {
                    Some(Value::List(existing)) => existing.append(&mut items),
                    slot => *slot = Some(Value::List(items)),
                }
            } else {
                slots[idx] = Some(parse_value(&leaf.kind, raw).map_err(value_error)?);
            }
        }

        Ok(slots)
    }

    fn bind_branch(
        &self,
        branch: &BranchFlag,
        ranges: &[ArgumentRange],
        path: &FieldPath,
    ) -> Result<Option<Value>, BindError> {
        if branch.is_repeated() {
            if ranges.is_empty() && branch.required {
                return Err(missing(path, &branch.name));
            }
            let mut items = Vec::with_capacity(ranges.len());
            for (index, range) in ranges.iter().enumerate() {
                let child_path = path.indexed(&branch.name, index);
                items.push(Value::Message(self.bind_level(&branch.child, *range, &child_path)?));
            }
            debug!(branch = %branch.name, instances = items.len(), "Bound repeated branch");
            return Ok(Some(Value::List(items)));
        }

        match ranges.last() {
            Some(range) => {
                let child_path = path.child(&branch.name);
                let message = self.bind_level(&branch.child, *range, &child_path)?;
                debug!(branch = %branch.name, occurrences = ranges.len(), "Bound branch");
                Ok(Some(Value::Message(message)))
            }
            None if branch.required => Err(missing(path, &branch.name)),
            None => Ok(None),
        }
    }
}

/// Value of a leaf after its flags were parsed: the explicit value, or the
/// default, the empty list or the zero value, in that order. `None` leaves
/// the field absent.
fn resolve_leaf(
    leaf: &LeafFlag,
    slot: Option<Value>,
    path: &FieldPath,
) -> Result<Option<Value>, BindError> {
    if slot.is_some() {
        return Ok(slot);
    }
    if leaf.required {
        return Err(missing(path, &leaf.name));
    }
    if let Some(default) = &leaf.default {
        return Ok(Some(default.clone()));
    }
    if leaf.cardinality.is_repeated() {
        return Ok(Some(Value::List(Vec::new())));
    }
    if leaf.cardinality.tracks_presence() {
        return Ok(None);
    }
    Ok(leaf.kind.zero_value())
}

fn cardinality_oneof(node: &FlagNode) -> Option<&str> {
    match node {
        FlagNode::Leaf(leaf) => leaf.cardinality.oneof(),
        FlagNode::Branch(branch) => branch.cardinality.oneof(),
    }
}

fn missing(path: &FieldPath, name: &str) -> BindError {
    BindError::new(path.child(name), BindErrorKind::MissingRequiredField)
}
