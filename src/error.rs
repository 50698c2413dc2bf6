//! Tree Errors
//!
//! Core operations are all-or-nothing: these errors mean an external
//! collaborator broke the data contract (backend sent bad data, or the UI
//! state desynchronized from the flat tree). The caller is expected to
//! refetch the authoritative forest and retry the gesture.

use serde::{Deserialize, Serialize};

/// Common result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Core tree errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeError {
    /// Input forest has duplicate ids or inconsistent parent links
    MalformedHierarchy(String),
    /// Flat ids that could not be attached under any resolved ancestor
    OrphanNodes(Vec<String>),
    /// Drop position does not resolve to a live parent/index
    InvalidDropTarget(String),
    /// No node with the given id exists
    NodeNotFound(String),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::MalformedHierarchy(msg) => write!(f, "Malformed hierarchy: {}", msg),
            TreeError::OrphanNodes(ids) => write!(f, "Orphan nodes: {}", ids.join(", ")),
            TreeError::InvalidDropTarget(msg) => write!(f, "Invalid drop target: {}", msg),
            TreeError::NodeNotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {}
