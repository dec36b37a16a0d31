//! Stand-off Nesting Validator
//!
//! Checks which entity types may directly contain which other types.
//! A [`NestingTable`] (usually loaded from TOML) lists the allowed child
//! types per parent type plus a `default` entry for unlisted types; a
//! [`ContainmentTree`] holds the immediate containment edges between
//! text-bound spans. [`validate`] reports every edge the table forbids.
//!
//! ```text
//! TextSpans → ContainmentTree::from_spans() → validate(tree, table) → Vec<Violation>
//! ```

pub mod table;
pub mod tree;
pub mod validate;

use std::path::PathBuf;

pub use table::{EntityType, NestingTable};
pub use tree::{ContainmentTree, Edge, TextSpan};
#[cfg(feature = "parallel")]
pub use validate::validate_parallel;
pub use validate::{validate, Violation, ViolationReason};

/// Errors raised while building nesting tables and containment trees.
///
/// Validation itself never fails; it only reports [`Violation`]s.
#[derive(Debug, thiserror::Error)]
pub enum NestingError {
    #[error("Invalid entity type name: '{0}'")]
    InvalidTypeName(String),

    #[error("Span {id} has start {start} after end {end}")]
    InvalidOffsets { id: String, start: usize, end: usize },

    #[error("Span {id} has offset {offset} beyond the addressable range")]
    OffsetOutOfRange { id: String, offset: u64 },

    #[error("Edge refers to unknown span index {0}")]
    UnknownSpan(usize),

    #[error("Span {parent} does not strictly contain span {child}")]
    NotContained { parent: String, child: String },

    #[error("Invalid nesting configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
