//! Definition-time errors raised while compiling a view

use thiserror::Error;

use crate::domain::{Cardinality, NodeType};

/// Programmer errors in a view definition
///
/// Compilation stops at the first one; no partial tree is produced.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    /// Relationship name not declared on the builder
    #[error("Unknown relationship '{name}'")]
    UnknownRelation { name: String },

    /// A DSL call that needs children got none
    #[error("'{call}' for '{name}' requires a block with at least one element")]
    MissingBlock { call: String, name: String },

    /// Cardinality passed to the call disagrees with the declaration
    #[error("Relationship '{name}' is declared as {declared} but was compiled as {requested}")]
    CardinalityMismatch {
        name: String,
        declared: Cardinality,
        requested: Cardinality,
    },

    /// A DSL call is missing an attribute it cannot do without
    #[error("'{call}' is missing required attribute '{attribute}'")]
    MissingAttribute { call: String, attribute: String },

    /// Attribute not allowed on this node type
    #[error("Attribute '{attribute}' is not allowed on {node_type} nodes")]
    InvalidAttribute { attribute: String, node_type: NodeType },

    /// Two drawers share a name
    #[error("Drawer '{0}' is registered more than once")]
    DuplicateDrawer(String),

    /// A link or option opens a drawer that was never registered
    #[error("{opener} opens unknown drawer '{drawer}'")]
    UnknownDrawer { opener: String, drawer: String },
}

pub type CompileResult<T> = Result<T, CompileError>;
