//! Binding errors and the field paths they point at.

use std::fmt;

use protoflag_core::{CompileError, ValueError};
use thiserror::Error;

/// One step of a [`FieldPath`]: a CLI name, with the instance index for
/// repeated nested messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<usize>,
}

/// Location of a field relative to the root message, rendered like
/// `item[1].name`.
///
/// # Examples
///
/// ```
/// use protoflag_args::FieldPath;
///
/// let path = FieldPath::root().indexed("item", 1).child("name");
/// assert_eq!(path.to_string(), "item[1].name");
/// assert_eq!(FieldPath::root().to_string(), "<root>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Extends the path by a singular field.
    pub fn child(&self, name: &str) -> Self {
        self.push(name, None)
    }

    /// Extends the path by one instance of a repeated field.
    pub fn indexed(&self, name: &str, index: usize) -> Self {
        self.push(name, Some(index))
    }

    fn push(&self, name: &str, index: Option<usize>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment {
            name: name.to_string(),
            index,
        });
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
            if let Some(index) = segment.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

/// What went wrong while binding.
#[derive(Debug, Error)]
pub enum BindErrorKind {
    /// A flag value failed its parser.
    #[error("invalid value for --{flag}: {source}")]
    Value {
        flag: String,
        #[source]
        source: ValueError,
    },

    #[error("missing required field")]
    MissingRequiredField,

    #[error("unknown flag --{0}")]
    UnknownFlag(String),

    /// A value-taking flag was the last token of its range.
    #[error("flag --{0} expects a value")]
    MissingFlagValue(String),

    /// A bare token that is neither a flag, a flag value nor a boundary.
    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),

    /// Two members of one oneof group were given.
    #[error("oneof {group} already set by {first}, cannot also set {second}")]
    OneofConflict {
        group: String,
        first: String,
        second: String,
    },
}

/// A binding failure, located by the path of CLI names from the root.
#[derive(Debug, Error)]
#[error("{path}: {kind}")]
pub struct BindError {
    pub path: FieldPath,
    pub kind: BindErrorKind,
}

impl BindError {
    pub fn new(path: FieldPath, kind: BindErrorKind) -> Self {
        Self { path, kind }
    }
}

/// Error of the one-shot [`parse_message`](crate::parse_message) helper.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

pub type Result<T> = std::result::Result<T, Error>;
