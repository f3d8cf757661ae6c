//! Arena-backed split tree.
//!
//! Nodes live in a `BTreeMap` keyed by [`NodeId`] and refer to each other by
//! id, with explicit parent links. The shape is the only authoritative state:
//! dividers are fractions in `[0, 1]`, relative rectangles are derived from
//! them top-down, and pixel bounds are projected from the relative rectangles
//! into the last content area handed to [`SplitTree::compute_bounds`].
//!
//! Besides the attached tree under the root, the arena may hold detached
//! subtrees built with [`SplitTree::create_leaf`] / [`SplitTree::create_node`]
//! that are waiting to be spliced in with [`SplitTree::replace`].

use std::collections::BTreeMap;
use std::fmt::Debug;

use fdock_core::{Insets, Rect, RelRect};
use serde::{Deserialize, Serialize};

use crate::error::SplitTreeError;
use crate::path::{Orientation, PathStep, Side, SplitPath};
use crate::visit::SplitVisitor;

/// Default width, in pixels, of the band around a divider that hit-tests as
/// the divider.
pub const DEFAULT_DIVIDER_SIZE: i32 = 4;

/// Default distance, in pixels, from the content edge inside which an outer
/// station claims a drop over nested ones.
pub const DEFAULT_BORDER_SIDE_SNAP: i32 = 25;

/// Stable identifier for split-tree nodes.
///
/// `0` is never issued; the root is always [`NodeId::ROOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const ROOT: Self = Self(1);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitNodeKind<D> {
    /// Exactly one (optional) child; owns the outer insets.
    Root { child: Option<NodeId> },
    /// Two children split at `divider` along `orientation`.
    Node {
        orientation: Orientation,
        divider: f64,
        first: NodeId,
        second: NodeId,
    },
    /// Holds one dockable.
    Leaf { dockable: D },
}

/// A node record with its cached bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitNode<D> {
    id: NodeId,
    parent: Option<NodeId>,
    kind: SplitNodeKind<D>,
    rel: RelRect,
    bounds: Rect,
}

impl<D> SplitNode<D> {
    fn new(id: NodeId, kind: SplitNodeKind<D>) -> Self {
        Self {
            id,
            parent: None,
            kind,
            rel: RelRect::FULL,
            bounds: Rect::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub const fn kind(&self) -> &SplitNodeKind<D> {
        &self.kind
    }

    /// Fractional rectangle relative to the root content area.
    #[must_use]
    pub const fn rel_bounds(&self) -> RelRect {
        self.rel
    }

    /// Pixel rectangle from the last bounds computation.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub fn dockable(&self) -> Option<&D> {
        match &self.kind {
            SplitNodeKind::Leaf { dockable } => Some(dockable),
            _ => None,
        }
    }

    fn children(&self) -> [Option<NodeId>; 2] {
        match self.kind {
            SplitNodeKind::Root { child } => [child, None],
            SplitNodeKind::Node { first, second, .. } => [Some(first), Some(second)],
            SplitNodeKind::Leaf { .. } => [None, None],
        }
    }
}

/// Binary split tree (Root → Node → Leaf) over dockable handles `D`.
///
/// `D` identifies a dockable; each handle may appear in at most one leaf.
#[derive(Debug, Clone)]
pub struct SplitTree<D> {
    nodes: BTreeMap<NodeId, SplitNode<D>>,
    leaves: BTreeMap<D, NodeId>,
    next_id: u64,
    content: Rect,
    divider_size: i32,
    border_side_snap: i32,
}

impl<D: Clone + Ord + Debug> Default for SplitTree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Clone + Ord + Debug> SplitTree<D> {
    /// An empty tree: a root without a child.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            NodeId::ROOT,
            SplitNode::new(NodeId::ROOT, SplitNodeKind::Root { child: None }),
        );
        Self {
            nodes,
            leaves: BTreeMap::new(),
            next_id: NodeId::ROOT.0 + 1,
            content: Rect::default(),
            divider_size: DEFAULT_DIVIDER_SIZE,
            border_side_snap: DEFAULT_BORDER_SIDE_SNAP,
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The node directly under the root, if any.
    #[must_use]
    pub fn root_child(&self) -> Option<NodeId> {
        match self.nodes.get(&NodeId::ROOT).map(SplitNode::kind) {
            Some(SplitNodeKind::Root { child }) => *child,
            _ => None,
        }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SplitNode<D>> {
        self.nodes.get(&id)
    }

    /// Leaf node holding `dockable`, attached or detached.
    #[must_use]
    pub fn leaf_of(&self, dockable: &D) -> Option<NodeId> {
        self.leaves.get(dockable).copied()
    }

    /// Whether `dockable` sits in a leaf reachable from the root.
    #[must_use]
    pub fn contains(&self, dockable: &D) -> bool {
        self.leaf_of(dockable)
            .is_some_and(|leaf| self.is_attached(leaf))
    }

    /// Attached dockables in pre-order (first before second).
    #[must_use]
    pub fn dockables(&self) -> Vec<&D> {
        let mut out = Vec::new();
        if let Some(child) = self.root_child() {
            self.collect_dockables(child, &mut out);
        }
        out
    }

    /// Number of attached leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dockables().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_child().is_none()
    }

    /// Content rectangle from the last [`compute_bounds`](Self::compute_bounds).
    #[must_use]
    pub const fn content_bounds(&self) -> Rect {
        self.content
    }

    #[must_use]
    pub fn leaf_bounds(&self, dockable: &D) -> Option<Rect> {
        let leaf = self.leaf_of(dockable)?;
        self.is_attached(leaf)
            .then(|| self.nodes.get(&leaf).map(SplitNode::bounds))
            .flatten()
    }

    #[must_use]
    pub const fn divider_size(&self) -> i32 {
        self.divider_size
    }

    pub fn set_divider_size(&mut self, size: i32) {
        self.divider_size = size.max(0);
    }

    #[must_use]
    pub const fn border_side_snap(&self) -> i32 {
        self.border_side_snap
    }

    pub fn set_border_side_snap(&mut self, snap: i32) {
        self.border_side_snap = snap.max(0);
    }

    // ---------------------------------------------------------------------
    // Bounds
    // ---------------------------------------------------------------------

    /// Recompute every cached rectangle for a station of `width × height`
    /// pixels with `insets` around the content.
    pub fn compute_bounds(&mut self, width: i32, height: i32, insets: Insets) {
        self.content = Rect::from_size(width.max(0), height.max(0)).inner(insets);
        tracing::trace!(
            target: "fdock.split",
            width,
            height,
            content = ?self.content,
            "computing split bounds"
        );
        self.relayout();
    }

    fn relayout(&mut self) {
        let content = self.content;
        if let Some(root) = self.nodes.get_mut(&NodeId::ROOT) {
            root.rel = RelRect::FULL;
            root.bounds = content;
        }
        if let Some(child) = self.root_child() {
            self.layout_node(child, RelRect::FULL);
        }
    }

    fn layout_node(&mut self, id: NodeId, rel: RelRect) {
        let content = self.content;
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.rel = rel;
        node.bounds = content.project(rel);
        tracing::trace!(target: "fdock.split", node = id.0, bounds = ?node.bounds, "node bounds");

        if let SplitNodeKind::Node {
            orientation,
            divider,
            first,
            second,
        } = node.kind
        {
            let (first_rel, second_rel) = match orientation {
                Orientation::Horizontal => rel.split_horizontal(divider),
                Orientation::Vertical => rel.split_vertical(divider),
            };
            self.layout_node(first, first_rel);
            self.layout_node(second, second_rel);
        }
    }

    // ---------------------------------------------------------------------
    // Building blocks
    // ---------------------------------------------------------------------

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a detached leaf for `dockable`.
    pub fn create_leaf(&mut self, dockable: D) -> Result<NodeId, SplitTreeError> {
        if self.leaves.contains_key(&dockable) {
            return Err(SplitTreeError::DuplicateDockable);
        }
        let id = self.alloc();
        self.leaves.insert(dockable.clone(), id);
        self.nodes
            .insert(id, SplitNode::new(id, SplitNodeKind::Leaf { dockable }));
        Ok(id)
    }

    /// Create a detached split node over two detached subtrees.
    pub fn create_node(
        &mut self,
        orientation: Orientation,
        divider: f64,
        first: NodeId,
        second: NodeId,
    ) -> Result<NodeId, SplitTreeError> {
        let divider = checked_bias(divider)?;
        self.require_detached(first)?;
        self.require_detached(second)?;
        if first == second {
            return Err(SplitTreeError::NodeAttached(second));
        }

        let id = self.alloc();
        self.nodes.insert(
            id,
            SplitNode::new(
                id,
                SplitNodeKind::Node {
                    orientation,
                    divider,
                    first,
                    second,
                },
            ),
        );
        self.set_parent(first, Some(id));
        self.set_parent(second, Some(id));
        Ok(id)
    }

    /// Drop a detached subtree, releasing its dockables.
    pub fn discard(&mut self, node: NodeId) -> Result<Vec<D>, SplitTreeError> {
        self.require_detached(node)?;
        Ok(self.drop_subtree(node))
    }

    /// Replace the direct child `old` of `parent` with the detached subtree
    /// `new`. The old subtree is dropped and its dockables returned.
    pub fn replace(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<Vec<D>, SplitTreeError> {
        self.require_detached(new)?;
        let record = self
            .nodes
            .get_mut(&parent)
            .ok_or(SplitTreeError::UnknownNode(parent))?;
        match &mut record.kind {
            SplitNodeKind::Root { child } if *child == Some(old) => *child = Some(new),
            SplitNodeKind::Node { first, .. } if *first == old => *first = new,
            SplitNodeKind::Node { second, .. } if *second == old => *second = new,
            SplitNodeKind::Leaf { .. } => return Err(SplitTreeError::NotANode(parent)),
            _ => return Err(SplitTreeError::UnknownChild { parent, child: old }),
        }

        self.set_parent(new, Some(parent));
        let removed = self.drop_subtree(old);
        self.relayout();
        tracing::debug!(
            target: "fdock.split",
            parent = parent.0,
            old = old.0,
            new = new.0,
            released = removed.len(),
            "replaced subtree"
        );
        Ok(removed)
    }

    /// Make the detached subtree `new` the whole content of the tree.
    pub fn set_root_child(&mut self, new: NodeId) -> Result<Vec<D>, SplitTreeError> {
        match self.root_child() {
            Some(old) => self.replace(NodeId::ROOT, old, new),
            None => {
                self.require_detached(new)?;
                if let Some(root) = self.nodes.get_mut(&NodeId::ROOT) {
                    root.kind = SplitNodeKind::Root { child: Some(new) };
                }
                self.set_parent(new, Some(NodeId::ROOT));
                self.relayout();
                Ok(Vec::new())
            }
        }
    }

    /// Remove every node, keeping bounds and settings.
    pub fn clear(&mut self) -> Vec<D> {
        let released: Vec<D> = self.leaves.keys().cloned().collect();
        self.nodes.retain(|id, _| *id == NodeId::ROOT);
        self.leaves.clear();
        if let Some(root) = self.nodes.get_mut(&NodeId::ROOT) {
            root.kind = SplitNodeKind::Root { child: None };
        }
        released
    }

    // ---------------------------------------------------------------------
    // Structural edits
    // ---------------------------------------------------------------------

    /// Insert `dockable` at `path`, returning its new leaf.
    ///
    /// An empty tree accepts any path and gets a single leaf. Otherwise every
    /// step but the last must meet a split node of the step's orientation, and
    /// the last step wraps the subtree it arrived at into a new split with the
    /// dockable on the step's side.
    pub fn insert_at_path(
        &mut self,
        path: &SplitPath,
        dockable: D,
    ) -> Result<NodeId, SplitTreeError> {
        if self.leaves.contains_key(&dockable) {
            return Err(SplitTreeError::DuplicateDockable);
        }
        let Some(mut current) = self.root_child() else {
            let leaf = self.create_leaf(dockable)?;
            self.set_root_child(leaf)?;
            tracing::debug!(target: "fdock.split", leaf = leaf.0, "inserted first leaf");
            return Ok(leaf);
        };

        let Some((last, route)) = path.steps().split_last() else {
            return Err(SplitTreeError::InvalidPath { step: 0 });
        };
        for (index, step) in route.iter().enumerate() {
            current = match self.nodes.get(&current).map(SplitNode::kind) {
                Some(SplitNodeKind::Node {
                    orientation,
                    first,
                    second,
                    ..
                }) if *orientation == step.side.orientation() => {
                    if step.side.is_first() {
                        *first
                    } else {
                        *second
                    }
                }
                _ => return Err(SplitTreeError::InvalidPath { step: index }),
            };
        }

        let leaf = self.wrap(current, *last, dockable)?;
        tracing::debug!(
            target: "fdock.split",
            leaf = leaf.0,
            depth = path.len(),
            "inserted leaf at path"
        );
        Ok(leaf)
    }

    /// Split the attached subtree `target`, putting a new leaf for `dockable`
    /// on `step.side` with `step.size` of the extent.
    pub(crate) fn wrap(
        &mut self,
        target: NodeId,
        step: PathStep,
        dockable: D,
    ) -> Result<NodeId, SplitTreeError> {
        let parent = self
            .nodes
            .get(&target)
            .ok_or(SplitTreeError::UnknownNode(target))?
            .parent
            .ok_or(SplitTreeError::UnknownNode(target))?;
        let size = checked_bias(step.size)?;

        let leaf = self.create_leaf(dockable)?;
        let (first, second, divider) = if step.side.is_first() {
            (leaf, target, size)
        } else {
            (target, leaf, 1.0 - size)
        };

        let id = self.alloc();
        self.nodes.insert(
            id,
            SplitNode::new(
                id,
                SplitNodeKind::Node {
                    orientation: step.side.orientation(),
                    divider,
                    first,
                    second,
                },
            ),
        );
        self.relink(parent, target, id);
        self.set_parent(id, Some(parent));
        self.set_parent(first, Some(id));
        self.set_parent(second, Some(id));
        self.relayout();
        Ok(leaf)
    }

    /// Remove the leaf holding `dockable`; its parent split collapses into the
    /// surviving sibling.
    pub fn remove(&mut self, dockable: &D) -> Result<(), SplitTreeError> {
        let leaf = self
            .leaf_of(dockable)
            .ok_or(SplitTreeError::UnknownDockable)?;
        let Some(parent) = self.nodes.get(&leaf).and_then(|n| n.parent) else {
            self.drop_subtree(leaf);
            return Ok(());
        };

        match self.nodes.get(&parent).map(|n| (n.parent, n.kind.clone())) {
            Some((_, SplitNodeKind::Root { .. })) => {
                if let Some(root) = self.nodes.get_mut(&parent) {
                    root.kind = SplitNodeKind::Root { child: None };
                }
            }
            Some((
                Some(grand),
                SplitNodeKind::Node {
                    first, second, ..
                },
            )) => {
                let sibling = if first == leaf { second } else { first };
                self.relink(grand, parent, sibling);
                self.set_parent(sibling, Some(grand));
                self.nodes.remove(&parent);
            }
            Some((None, SplitNodeKind::Node { first, second, .. })) => {
                // Detached split: the sibling becomes a detached root.
                let sibling = if first == leaf { second } else { first };
                self.set_parent(sibling, None);
                self.nodes.remove(&parent);
            }
            _ => return Err(SplitTreeError::UnknownNode(parent)),
        }

        self.nodes.remove(&leaf);
        self.leaves.remove(dockable);
        self.relayout();
        tracing::debug!(target: "fdock.split", leaf = leaf.0, "removed leaf");
        Ok(())
    }

    /// Path from the root to the leaf of `dockable`.
    ///
    /// Inserting into the tree with `dockable` removed at this path restores
    /// it to the same place.
    pub fn path_of(&self, dockable: &D) -> Result<SplitPath, SplitTreeError> {
        let leaf = self
            .leaf_of(dockable)
            .filter(|leaf| self.is_attached(*leaf))
            .ok_or(SplitTreeError::UnknownDockable)?;

        let mut steps = Vec::new();
        let mut child = leaf;
        while let Some(parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(SplitNodeKind::Node {
                orientation,
                divider,
                first,
                ..
            }) = self.nodes.get(&parent).map(SplitNode::kind)
            {
                let is_first = *first == child;
                let size = if is_first { *divider } else { 1.0 - *divider };
                steps.push(PathStep::new(Side::of(*orientation, is_first), size));
            }
            child = parent;
        }
        steps.reverse();
        Ok(steps.into_iter().collect())
    }

    // ---------------------------------------------------------------------
    // Dividers
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn divider(&self, node: NodeId) -> Option<f64> {
        match self.nodes.get(&node).map(SplitNode::kind) {
            Some(SplitNodeKind::Node { divider, .. }) => Some(*divider),
            _ => None,
        }
    }

    /// Move the divider of `node`; the value is clamped into `[0, 1]`.
    pub fn set_divider(&mut self, node: NodeId, bias: f64) -> Result<(), SplitTreeError> {
        let bias = checked_bias(bias)?;
        let record = self
            .nodes
            .get_mut(&node)
            .ok_or(SplitTreeError::UnknownNode(node))?;
        let SplitNodeKind::Node { divider, .. } = &mut record.kind else {
            return Err(SplitTreeError::NotANode(node));
        };
        *divider = bias;
        self.relayout();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------

    /// Pre-order walk over the attached tree.
    pub fn visit<V: SplitVisitor<D> + ?Sized>(&self, visitor: &mut V) {
        self.visit_node(NodeId::ROOT, visitor);
    }

    fn visit_node<V: SplitVisitor<D> + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match &node.kind {
            SplitNodeKind::Root { .. } => visitor.handle_root(node),
            SplitNodeKind::Node {
                orientation,
                divider,
                ..
            } => visitor.handle_node(node, *orientation, *divider),
            SplitNodeKind::Leaf { dockable } => visitor.handle_leaf(node, dockable),
        }
        for child in node.children().into_iter().flatten() {
            self.visit_node(child, visitor);
        }
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    pub(crate) fn nodes(&self) -> &BTreeMap<NodeId, SplitNode<D>> {
        &self.nodes
    }

    fn is_attached(&self, mut id: NodeId) -> bool {
        loop {
            if id == NodeId::ROOT {
                return true;
            }
            match self.nodes.get(&id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn require_detached(&self, id: NodeId) -> Result<(), SplitTreeError> {
        let node = self.nodes.get(&id).ok_or(SplitTreeError::UnknownNode(id))?;
        if id == NodeId::ROOT || node.parent.is_some() {
            return Err(SplitTreeError::NodeAttached(id));
        }
        Ok(())
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
    }

    /// Point `parent`'s reference to `old` at `new`.
    fn relink(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let Some(record) = self.nodes.get_mut(&parent) else {
            return;
        };
        match &mut record.kind {
            SplitNodeKind::Root { child } if *child == Some(old) => *child = Some(new),
            SplitNodeKind::Node { first, .. } if *first == old => *first = new,
            SplitNodeKind::Node { second, .. } if *second == old => *second = new,
            _ => {}
        }
    }

    fn drop_subtree(&mut self, id: NodeId) -> Vec<D> {
        let mut released = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(node) = self.nodes.remove(&next) else {
                continue;
            };
            pending.extend(node.children().into_iter().flatten());
            if let SplitNodeKind::Leaf { dockable } = node.kind {
                self.leaves.remove(&dockable);
                released.push(dockable);
            }
        }
        released
    }

    fn collect_dockables<'a>(&'a self, id: NodeId, out: &mut Vec<&'a D>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let SplitNodeKind::Leaf { dockable } = &node.kind {
            out.push(dockable);
        }
        for child in node.children().into_iter().flatten() {
            self.collect_dockables(child, out);
        }
    }
}

fn checked_bias(bias: f64) -> Result<f64, SplitTreeError> {
    if !bias.is_finite() {
        return Err(SplitTreeError::InvalidBias(bias));
    }
    Ok(bias.clamp(0.0, 1.0))
}
