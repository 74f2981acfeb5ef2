//! Error types for the manipulation engine.

use thiserror::Error;

use crate::scene::NodeId;

/// Errors surfaced by engine operations.
///
/// Only genuine misuse is an error: unknown node ids and attempts to delete
/// protected nodes. Benign conditions (removing a node that is not selected,
/// undoing with an empty history, non-positive snap increments) are silent
/// no-ops, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GizmoError {
    /// The scene graph does not contain the given node.
    #[error("node {0} does not exist in the scene graph")]
    UnknownNode(NodeId),

    /// The node is not flagged as deletable.
    #[error("node {0} is not deletable")]
    NotDeletable(NodeId),
}
