//! Geometry scenarios for a split station's tree.

use fdock_core::{Insets, Rect};
use fdock_split::{Orientation, Side, SplitNodeKind, SplitPath, SplitTree, SplitTreeError};

fn a_and_b() -> SplitTree<&'static str> {
    let mut tree = SplitTree::new();
    tree.insert_at_path(&SplitPath::new(), "A").unwrap();
    tree.insert_at_path(&SplitPath::new().with_step(Side::Right, 0.5), "B")
        .unwrap();
    tree
}

#[test]
fn two_leaves_split_evenly() {
    let mut tree = a_and_b();
    tree.compute_bounds(200, 100, Insets::default());

    assert_eq!(tree.leaf_bounds(&"A"), Some(Rect::new(0, 0, 100, 100)));
    assert_eq!(tree.leaf_bounds(&"B"), Some(Rect::new(100, 0, 100, 100)));

    let drop = tree.query_drop_target(50, 50, Some(&"C")).unwrap();
    assert_eq!(Some(drop.target), tree.leaf_of(&"A"));
    assert_eq!(drop.orientation(), Orientation::Horizontal);
}

#[test]
fn deepest_leaf_wins_drop_query() {
    let mut tree = a_and_b();
    let path = SplitPath::new()
        .with_step(Side::Right, 0.5)
        .with_step(Side::Bottom, 0.5);
    tree.insert_at_path(&path, "C").unwrap();
    tree.compute_bounds(200, 100, Insets::default());

    // C occupies the lower right quarter, nested Root → Node → Node → Leaf.
    assert_eq!(tree.leaf_bounds(&"C"), Some(Rect::new(100, 50, 100, 50)));
    let drop = tree.query_drop_target(150, 75, Some(&"D")).unwrap();
    assert_eq!(Some(drop.target), tree.leaf_of(&"C"));
}

#[test]
fn resizing_recomputes_from_fractions() {
    let mut tree = a_and_b();
    let split = tree.root_child().unwrap();
    tree.set_divider(split, 1.0 / 3.0).unwrap();

    for _ in 0..10 {
        tree.compute_bounds(301, 100, Insets::default());
        tree.compute_bounds(97, 31, Insets::default());
    }
    tree.compute_bounds(300, 90, Insets::default());
    assert_eq!(tree.leaf_bounds(&"A"), Some(Rect::new(0, 0, 100, 90)));
    assert_eq!(tree.leaf_bounds(&"B"), Some(Rect::new(100, 0, 200, 90)));
}

#[test]
fn replacing_root_content_rebuilds_tree() {
    let mut tree = a_and_b();
    let x = tree.create_leaf("X").unwrap();
    let y = tree.create_leaf("Y").unwrap();
    let node = tree.create_node(Orientation::Vertical, 0.25, x, y).unwrap();

    let mut released = tree.set_root_child(node).unwrap();
    released.sort_unstable();
    assert_eq!(released, vec!["A", "B"]);
    assert_eq!(tree.dockables(), vec![&"X", &"Y"]);

    tree.compute_bounds(100, 100, Insets::default());
    assert_eq!(tree.leaf_bounds(&"X"), Some(Rect::new(0, 0, 100, 25)));
    match tree.node(tree.root_child().unwrap()).unwrap().kind() {
        SplitNodeKind::Node { orientation, .. } => {
            assert_eq!(*orientation, Orientation::Vertical);
        }
        other => panic!("expected split, got {other:?}"),
    }
}

#[test]
fn stale_path_is_reported_without_mutation() {
    let mut tree = a_and_b();
    let stale = SplitPath::new()
        .with_step(Side::Right, 0.5)
        .with_step(Side::Bottom, 0.5)
        .with_step(Side::Left, 0.5);
    assert_eq!(
        tree.insert_at_path(&stale, "C"),
        Err(SplitTreeError::InvalidPath { step: 1 })
    );
    assert_eq!(tree.dockables(), vec![&"A", &"B"]);
    assert!(tree.leaf_of(&"C").is_none());
}
