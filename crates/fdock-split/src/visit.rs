//! Pre-order traversal callbacks.

use crate::path::Orientation;
use crate::tree::SplitNode;

/// Receives one callback per attached node, parents before children and
/// first child before second.
///
/// All methods default to doing nothing so visitors only implement the kinds
/// they care about.
pub trait SplitVisitor<D> {
    fn handle_root(&mut self, _root: &SplitNode<D>) {}

    fn handle_node(&mut self, _node: &SplitNode<D>, _orientation: Orientation, _divider: f64) {}

    fn handle_leaf(&mut self, _leaf: &SplitNode<D>, _dockable: &D) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Side, SplitPath};
    use crate::tree::SplitTree;

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl SplitVisitor<char> for Trace {
        fn handle_root(&mut self, _root: &SplitNode<char>) {
            self.0.push("root".into());
        }

        fn handle_node(&mut self, _node: &SplitNode<char>, orientation: Orientation, _: f64) {
            self.0.push(orientation.as_str().into());
        }

        fn handle_leaf(&mut self, _leaf: &SplitNode<char>, dockable: &char) {
            self.0.push(dockable.to_string());
        }
    }

    #[test]
    fn visits_in_pre_order() {
        let mut tree = SplitTree::new();
        tree.insert_at_path(&SplitPath::new(), 'a').unwrap();
        tree.insert_at_path(&SplitPath::new().with_step(Side::Right, 0.5), 'b')
            .unwrap();
        tree.insert_at_path(
            &SplitPath::new()
                .with_step(Side::Left, 0.5)
                .with_step(Side::Top, 0.5),
            'c',
        )
        .unwrap();

        let mut trace = Trace::default();
        tree.visit(&mut trace);
        assert_eq!(
            trace.0,
            vec!["root", "horizontal", "vertical", "c", "a", "b"]
        );
    }
}
