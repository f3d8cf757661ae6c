//! Hit testing against the last computed bounds: drop targets, override
//! zones, and divider bands.

use std::fmt::Debug;

use fdock_core::Rect;
use serde::{Deserialize, Serialize};

use crate::error::SplitTreeError;
use crate::path::{Orientation, PathStep, Side};
use crate::tree::{NodeId, SplitNodeKind, SplitTree};

/// Where a dropped dockable would land.
///
/// `target` is the leaf to split, or the root when the tree is empty (the
/// dockable then becomes the only leaf and `side` is irrelevant).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropTarget {
    pub target: NodeId,
    pub side: Side,
    pub divider: f64,
}

impl DropTarget {
    /// Orientation of the split the drop would create.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.side.orientation()
    }
}

impl<D: Clone + Ord + Debug> SplitTree<D> {
    /// Find where `incoming` would land if released at `(x, y)`.
    ///
    /// Descends through containing nodes so the deepest leaf under the point
    /// wins. The side is the leaf edge nearest to the point (ties resolve in
    /// the order left, right, top, bottom). Dropping a dockable onto its own
    /// leaf, or outside the content area, yields `None`.
    #[must_use]
    pub fn query_drop_target(&self, x: i32, y: i32, incoming: Option<&D>) -> Option<DropTarget> {
        let root = self.node(self.root())?;
        if !root.bounds().contains(x, y) {
            return None;
        }
        let Some(mut current) = self.root_child() else {
            return Some(DropTarget {
                target: self.root(),
                side: Side::Left,
                divider: 0.5,
            });
        };

        loop {
            let node = self.node(current)?;
            if !node.bounds().contains(x, y) {
                return None;
            }
            match node.kind() {
                SplitNodeKind::Node { first, second, .. } => {
                    let first_bounds = self.node(*first)?.bounds();
                    current = if first_bounds.contains(x, y) {
                        *first
                    } else {
                        *second
                    };
                }
                SplitNodeKind::Leaf { dockable } => {
                    if incoming.is_some_and(|d| d == dockable) {
                        return None;
                    }
                    let side = nearest_side(node.bounds(), x, y);
                    tracing::trace!(
                        target: "fdock.split",
                        leaf = current.get(),
                        side = side.as_str(),
                        "drop target"
                    );
                    return Some(DropTarget {
                        target: current,
                        side,
                        divider: 0.5,
                    });
                }
                SplitNodeKind::Root { .. } => return None,
            }
        }
    }

    /// Whether `(x, y)` falls in the band along the content edge where this
    /// tree claims a drop ahead of any station nested inside it.
    ///
    /// The band is [`border_side_snap`](Self::border_side_snap) pixels deep and
    /// only exists along edges of leaves that touch the content border.
    #[must_use]
    pub fn query_override_zone(&self, x: i32, y: i32) -> bool {
        let content = self.content_bounds();
        if !content.contains(x, y) {
            return false;
        }
        let Some(mut current) = self.root_child() else {
            return false;
        };
        let snap = self.border_side_snap();

        loop {
            let Some(node) = self.node(current) else {
                return false;
            };
            match node.kind() {
                SplitNodeKind::Node { first, second, .. } => {
                    current = match self.node(*first) {
                        Some(first_node) if first_node.bounds().contains(x, y) => *first,
                        _ => *second,
                    };
                }
                SplitNodeKind::Leaf { .. } => {
                    let leaf = node.bounds();
                    return (leaf.x == content.x && x - content.x < snap)
                        || (leaf.right() == content.right() && content.right() - x <= snap)
                        || (leaf.y == content.y && y - content.y < snap)
                        || (leaf.bottom() == content.bottom() && content.bottom() - y <= snap);
                }
                SplitNodeKind::Root { .. } => return false,
            }
        }
    }

    /// The split node whose divider band contains `(x, y)`, searching from
    /// the root down.
    #[must_use]
    pub fn divider_at(&self, x: i32, y: i32) -> Option<NodeId> {
        let half = (self.divider_size() / 2).max(1);
        let mut pending: Vec<NodeId> = self.root_child().into_iter().collect();
        while let Some(id) = pending.pop() {
            let node = self.node(id)?;
            let SplitNodeKind::Node {
                orientation,
                first,
                second,
                ..
            } = node.kind()
            else {
                continue;
            };
            let bounds = node.bounds();
            let line = self.node(*first)?.bounds();
            let hit = match orientation {
                Orientation::Horizontal => {
                    (line.right() - x).abs() <= half && y >= bounds.y && y < bounds.bottom()
                }
                Orientation::Vertical => {
                    (line.bottom() - y).abs() <= half && x >= bounds.x && x < bounds.right()
                }
            };
            if hit {
                return Some(id);
            }
            pending.push(*second);
            pending.push(*first);
        }
        None
    }

    /// Carry out a drop: `dockable` is moved (or inserted) next to the
    /// target leaf, which is split in two.
    pub fn apply_drop(&mut self, drop: DropTarget, dockable: D) -> Result<NodeId, SplitTreeError> {
        if drop.target == self.root() {
            if !self.is_empty() {
                return Err(SplitTreeError::NotALeaf(drop.target));
            }
            let leaf = self.create_leaf(dockable)?;
            self.set_root_child(leaf)?;
            return Ok(leaf);
        }

        match self.node(drop.target).map(|n| n.kind()) {
            Some(SplitNodeKind::Leaf { dockable: held }) if *held == dockable => {
                return Err(SplitTreeError::DuplicateDockable);
            }
            Some(SplitNodeKind::Leaf { .. }) => {}
            Some(_) => return Err(SplitTreeError::NotALeaf(drop.target)),
            None => return Err(SplitTreeError::UnknownNode(drop.target)),
        }

        if self.leaf_of(&dockable).is_some() {
            self.remove(&dockable)?;
        }
        let size = if drop.side.is_first() {
            drop.divider
        } else {
            1.0 - drop.divider
        };
        self.wrap(drop.target, PathStep::new(drop.side, size), dockable)
    }
}

fn nearest_side(bounds: Rect, x: i32, y: i32) -> Side {
    let candidates = [
        (Side::Left, x - bounds.x),
        (Side::Right, bounds.right() - x),
        (Side::Top, y - bounds.y),
        (Side::Bottom, bounds.bottom() - y),
    ];
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1 < best.1 {
            best = *candidate;
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::SplitPath;
    use fdock_core::Insets;

    fn side_by_side() -> SplitTree<char> {
        let mut tree = SplitTree::new();
        tree.insert_at_path(&SplitPath::new(), 'a').unwrap();
        tree.insert_at_path(&SplitPath::new().with_step(Side::Right, 0.5), 'b')
            .unwrap();
        tree.compute_bounds(200, 100, Insets::default());
        tree
    }

    #[test]
    fn nearest_side_prefers_left_on_ties() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert_eq!(nearest_side(bounds, 50, 50), Side::Left);
        assert_eq!(nearest_side(bounds, 95, 50), Side::Right);
        assert_eq!(nearest_side(bounds, 50, 3), Side::Top);
        assert_eq!(nearest_side(bounds, 50, 97), Side::Bottom);
    }

    #[test]
    fn dropping_onto_own_leaf_is_rejected() {
        let tree = side_by_side();
        assert!(tree.query_drop_target(20, 20, Some(&'a')).is_none());
        assert!(tree.query_drop_target(20, 20, Some(&'b')).is_some());
    }

    #[test]
    fn outside_point_has_no_target() {
        let tree = side_by_side();
        assert!(tree.query_drop_target(250, 20, None).is_none());
        assert!(tree.query_drop_target(-1, 20, None).is_none());
    }

    #[test]
    fn empty_tree_offers_root() {
        let mut tree: SplitTree<char> = SplitTree::new();
        tree.compute_bounds(50, 50, Insets::default());
        let drop = tree.query_drop_target(10, 10, Some(&'x')).unwrap();
        assert_eq!(drop.target, tree.root());
        let leaf = tree.apply_drop(drop, 'x').unwrap();
        assert_eq!(tree.root_child(), Some(leaf));
    }

    #[test]
    fn divider_band_hits_split() {
        let tree = side_by_side();
        let split = tree.root_child().unwrap();
        assert_eq!(tree.divider_at(100, 40), Some(split));
        assert_eq!(tree.divider_at(99, 40), Some(split));
        assert_eq!(tree.divider_at(60, 40), None);
    }

    #[test]
    fn override_zone_hugs_content_border() {
        let tree = side_by_side();
        assert!(tree.query_override_zone(5, 50));
        assert!(tree.query_override_zone(195, 50));
        assert!(tree.query_override_zone(100, 5));
        assert!(!tree.query_override_zone(100, 50));
        assert!(!tree.query_override_zone(300, 50));
    }

    #[test]
    fn apply_drop_moves_existing_dockable() {
        let mut tree = side_by_side();
        let drop = tree.query_drop_target(150, 95, Some(&'a')).unwrap();
        assert_eq!(drop.side, Side::Bottom);
        tree.apply_drop(drop, 'a').unwrap();
        assert_eq!(tree.dockables(), vec![&'b', &'a']);
        assert_eq!(tree.leaf_bounds(&'b'), Some(Rect::new(0, 0, 200, 50)));
        assert_eq!(tree.leaf_bounds(&'a'), Some(Rect::new(0, 50, 200, 50)));
    }
}
