use thiserror::Error;

use crate::tree::NodeId;

/// Structural edit failures.
///
/// These signal caller misuse (a stale id, a path into a branch that does not
/// exist); the tree is left unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitTreeError {
    #[error("path step {step} does not address an existing branch")]
    InvalidPath { step: usize },

    #[error("node {child:?} is not a direct child of {parent:?}")]
    UnknownChild { parent: NodeId, child: NodeId },

    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0:?} is already attached to the tree")]
    NodeAttached(NodeId),

    #[error("dockable is already placed in this tree")]
    DuplicateDockable,

    #[error("dockable is not placed in this tree")]
    UnknownDockable,

    #[error("node {0:?} is not a leaf")]
    NotALeaf(NodeId),

    #[error("node {0:?} is not a split node")]
    NotANode(NodeId),

    #[error("divider {0} is not a finite number")]
    InvalidBias(f64),
}
