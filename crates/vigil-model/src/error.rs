//! Error types for the graph model

use crate::graph::{ComponentId, ContainerId};

/// Graph mutation and lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Container does not exist (never created or destroyed)
    #[error("unknown container: {0}")]
    UnknownContainer(ContainerId),

    /// Component slot does not exist or its definition is missing
    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),

    /// Field path does not address a value in the component
    #[error("invalid field path: '{0}'")]
    InvalidFieldPath(String),

    /// A container cannot be its own child
    #[error("container {0} cannot be linked to itself")]
    SelfLink(ContainerId),
}

/// Errors when parsing field paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Path starts with an index instead of a field name
    #[error("path must start with a field name, found index {0}")]
    LeadingIndex(usize),
}
