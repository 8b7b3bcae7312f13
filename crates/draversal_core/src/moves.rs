//! Cyclic stepping.
//!
//! Moves cycle over every node except the root and wrap around at either
//! end. They ignore the direction stack.

use draversal_tree::{Node, NodeExt, NodePath};
use tracing::{debug, trace};

use crate::Traversal;
use crate::protocol::{following, preceding};

impl Traversal<'_> {
    fn sibling_cycle(&self, forward: bool) -> Option<NodePath> {
        let (&index, parent) = self.path.split_last()?;
        let len = self
            .get_item_by_path(parent)
            .map_or(0, |parent| parent.child_count(&self.children_field));
        if len == 0 {
            return None;
        }
        let target = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        if (forward && target < index) || (!forward && target > index) {
            debug!("Sibling move wrapped around at {:?}", self.path);
        }
        let mut path = parent.to_vec();
        path.push(target);
        Some(path)
    }

    fn tree_cycle(&self, forward: bool) -> Option<NodePath> {
        if !self.root.has_children(&self.children_field) {
            return None;
        }
        let field = self.children_field.as_str();
        let stepped = if forward {
            following(&self.root, field, &self.path)
        } else {
            preceding(&self.root, field, &self.path)
        };
        match stepped {
            Some(path) if !path.is_empty() => Some(path),
            _ if forward => {
                debug!("Move wrapped from {:?} to the first node", self.path);
                Some(vec![0])
            }
            _ => {
                debug!("Move wrapped from {:?} to the last node", self.path);
                Some(self.root.last_descendant_path(field))
            }
        }
    }

    fn cycle(&mut self, forward: bool, sibling_only: bool) -> &Node {
        let target = if sibling_only {
            self.sibling_cycle(forward)
        } else {
            self.tree_cycle(forward)
        };
        if let Some(target) = target {
            trace!("Moved {:?} -> {:?}", self.path, target);
            self.path = target;
        }
        self.current()
    }

    /// Moves to the next node, wrapping from the last node to the first
    /// child of the root.
    ///
    /// With `sibling_only` the move cycles within the current child list and
    /// does nothing at the root. A root without children stays put.
    pub fn move_to_next_item(&mut self, sibling_only: bool) -> &Node {
        self.cycle(true, sibling_only)
    }

    /// Moves to the previous node, wrapping from the first child of the root
    /// (or from the root itself) to the last node.
    pub fn move_to_prev_item(&mut self, sibling_only: bool) -> &Node {
        self.cycle(false, sibling_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn flat_tree() -> Traversal<'static> {
        Traversal::from_value(
            json!({"title": "root", "sections": [{"title": "A"}, {"title": "B"}, {"title": "C"}]}),
            "sections",
        )
        .unwrap()
    }

    #[test]
    fn test_wraparound_on_flat_tree() {
        let mut traversal = flat_tree();
        traversal.set_path_as_current(&[2]).unwrap();
        assert_eq!(traversal.move_to_next_item(false)["title"], "A");
        assert_eq!(traversal.move_to_prev_item(false)["title"], "C");
    }

    #[rstest]
    #[case::root_next(&[], true, &[0])]
    #[case::root_prev(&[], false, &[2])]
    #[case::deep_next(&[1, 1, 0], true, &[2])]
    #[case::last_wraps(&[2], true, &[0])]
    #[case::first_wraps(&[0], false, &[2])]
    #[case::into_subtree(&[2], false, &[1, 1, 0])]
    fn test_move_whole_tree(#[case] from: &[usize], #[case] forward: bool, #[case] to: &[usize]) {
        let mut traversal = demo();
        traversal.set_path_as_current(from).unwrap();
        if forward {
            traversal.move_to_next_item(false);
        } else {
            traversal.move_to_prev_item(false);
        }
        assert_eq!(traversal.path(), to);
    }

    #[rstest]
    #[case::next(&[1, 0], true, &[1, 1])]
    #[case::next_wraps(&[1, 1], true, &[1, 0])]
    #[case::prev_wraps(&[0], false, &[2])]
    #[case::root_stays(&[], true, &[])]
    fn test_move_siblings(#[case] from: &[usize], #[case] forward: bool, #[case] to: &[usize]) {
        let mut traversal = demo();
        traversal.set_path_as_current(from).unwrap();
        if forward {
            traversal.move_to_next_item(true);
        } else {
            traversal.move_to_prev_item(true);
        }
        assert_eq!(traversal.path(), to);
    }

    #[test]
    fn test_move_without_children_is_noop() {
        let mut traversal = Traversal::from_value(json!({"title": "solo"}), "sections").unwrap();
        assert_eq!(traversal.move_to_next_item(false)["title"], "solo");
        assert_eq!(traversal.move_to_prev_item(false)["title"], "solo");
        assert!(traversal.path().is_empty());
    }

    #[test]
    fn test_full_cycle_visits_every_non_root_node() {
        let mut traversal = demo();
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(traversal.move_to_next_item(false)["title"].clone());
        }
        assert_eq!(seen.first(), seen.last());
        assert_eq!(seen[0], "Child 1");
        assert_eq!(seen[5], "Child 3");
    }
}
