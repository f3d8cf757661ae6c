#![forbid(unsafe_code)]

//! Split geometry for split stations.
//!
//! A [`SplitTree`] is a binary tree (Root → Node → Leaf) whose split nodes
//! store a divider fraction and an orientation. Pixel bounds are derived from
//! the fractional shape on every [`SplitTree::compute_bounds`] call, so
//! resizing never accumulates rounding drift.
//!
//! The tree answers drop queries ([`SplitTree::query_drop_target`],
//! [`SplitTree::query_override_zone`], [`SplitTree::divider_at`]) and supports
//! structural edits ([`SplitTree::insert_at_path`], [`SplitTree::replace`],
//! [`SplitTree::remove`], [`SplitTree::apply_drop`]). External code inspects
//! it with a [`SplitVisitor`].

pub mod error;
pub mod hit;
pub mod path;
pub mod tree;
pub mod visit;

pub use error::SplitTreeError;
pub use hit::DropTarget;
pub use path::{Orientation, PathStep, Side, SplitPath};
pub use tree::{
    DEFAULT_BORDER_SIDE_SNAP, DEFAULT_DIVIDER_SIZE, NodeId, SplitNode, SplitNodeKind, SplitTree,
};
pub use visit::SplitVisitor;
