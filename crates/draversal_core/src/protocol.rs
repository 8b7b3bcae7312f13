//! Bounded stepping.
//!
//! Protocol stepping walks the tree in pre-order, root included, and stops at
//! either end with [`TraversalError::Stop`] instead of wrapping around. An
//! active [`inverted`](Traversal::inverted) scope swaps every forward
//! operation with its backward counterpart.

use draversal_tree::{Node, NodeExt, NodePath};
use tracing::trace;

use crate::{Traversal, TraversalError};

/// Pre-order successor of `path`, or `None` past the last node.
pub(crate) fn following(root: &Node, field: &str, path: &[usize]) -> Option<NodePath> {
    let node = root.descend(field, path)?;
    let mut next = path.to_vec();
    if node.has_children(field) {
        next.push(0);
        return Some(next);
    }
    while let Some(index) = next.pop() {
        let parent = root.descend(field, &next)?;
        if index + 1 < parent.child_count(field) {
            next.push(index + 1);
            return Some(next);
        }
    }
    None
}

/// Pre-order predecessor of `path`, or `None` at the root.
pub(crate) fn preceding(root: &Node, field: &str, path: &[usize]) -> Option<NodePath> {
    let (&index, parent) = path.split_last()?;
    if index == 0 {
        return Some(parent.to_vec());
    }
    let mut previous = parent.to_vec();
    previous.push(index - 1);
    let sibling = root.descend(field, &previous)?;
    previous.extend(sibling.last_descendant_path(field));
    Some(previous)
}

/// The next sibling of `path`, or `None` at the end of its list.
pub(crate) fn next_sibling(root: &Node, field: &str, path: &[usize]) -> Option<NodePath> {
    let (&index, parent) = path.split_last()?;
    let len = root.descend(field, parent)?.child_count(field);
    if index + 1 >= len {
        return None;
    }
    let mut sibling = parent.to_vec();
    sibling.push(index + 1);
    Some(sibling)
}

/// The previous sibling of `path`, or `None` at the start of its list.
pub(crate) fn prev_sibling(root: &Node, field: &str, path: &[usize]) -> Option<NodePath> {
    let (&index, parent) = path.split_last()?;
    let previous = index.checked_sub(1)?;
    root.descend(field, parent)?.child(field, previous)?;
    let mut sibling = parent.to_vec();
    sibling.push(previous);
    Some(sibling)
}

impl Traversal<'_> {
    fn forward_path(&self) -> Option<NodePath> {
        following(&self.root, &self.children_field, &self.path)
    }

    fn backward_path(&self) -> Option<NodePath> {
        preceding(&self.root, &self.children_field, &self.path)
    }

    fn first_child_path(&self) -> NodePath {
        let mut path = self.path.clone();
        if self.current().has_children(&self.children_field) {
            path.push(0);
        }
        path
    }

    fn last_descendant_path(&self) -> NodePath {
        let mut path = self.path.clone();
        path.extend(self.current().last_descendant_path(&self.children_field));
        path
    }

    fn step(&mut self, forward: bool, operation: &str) -> Result<&Node, TraversalError> {
        let forward = forward != self.is_inverted();
        let target = if forward {
            self.forward_path()
        } else {
            self.backward_path()
        };
        let Some(target) = target else {
            let end = if forward { "last" } else { "first" };
            return Err(TraversalError::stop(format!(
                "{operation}() at {:?} is past the {end} node",
                self.path
            )));
        };
        trace!("{}() {:?} -> {:?}", operation, self.path, target);
        self.path = target;
        Ok(self.current())
    }

    /// Steps to the next node in pre-order.
    pub fn next(&mut self) -> Result<&Node, TraversalError> {
        self.step(true, "next")
    }

    /// Steps to the previous node in pre-order.
    pub fn prev(&mut self) -> Result<&Node, TraversalError> {
        self.step(false, "prev")
    }

    /// Moves to the first child of the current node. A leaf stays put.
    pub fn first(&mut self) -> &Node {
        self.path = if self.is_inverted() {
            self.last_descendant_path()
        } else {
            self.first_child_path()
        };
        self.current()
    }

    /// Moves to the last node of the current node's subtree. A leaf stays
    /// put, so repeated calls return the same node.
    pub fn last(&mut self) -> &Node {
        self.path = if self.is_inverted() {
            self.first_child_path()
        } else {
            self.last_descendant_path()
        };
        self.current()
    }

    fn peek(&self, forward: bool, steps: usize, operation: &str) -> Result<&Node, TraversalError> {
        if steps == 0 {
            return Err(TraversalError::invalid_argument(format!(
                "{operation}() needs a positive step count"
            )));
        }
        let forward = forward != self.is_inverted();
        let mut path = self.path.clone();
        for taken in 0..steps {
            let next = if forward {
                following(&self.root, &self.children_field, &path)
            } else {
                preceding(&self.root, &self.children_field, &path)
            };
            path = next.ok_or_else(|| {
                TraversalError::stop(format!(
                    "{operation}({steps}) from {:?} runs out after {taken} step(s)",
                    self.path
                ))
            })?;
        }
        self.get_item_by_path(&path)
            .ok_or_else(|| TraversalError::stop(format!("{operation}({steps}) found no node")))
    }

    /// Returns the node `steps` positions ahead without moving the cursor.
    pub fn peek_next(&self, steps: usize) -> Result<&Node, TraversalError> {
        self.peek(true, steps, "peek_next")
    }

    /// Returns the node `steps` positions back without moving the cursor.
    pub fn peek_prev(&self, steps: usize) -> Result<&Node, TraversalError> {
        self.peek(false, steps, "peek_prev")
    }

    fn probe(&self, forward: bool, sibling_only: bool) -> Option<(&Node, NodePath)> {
        let forward = forward != self.is_inverted();
        let (root, field, path) = (&*self.root, self.children_field.as_str(), &self.path);
        let target = match (forward, sibling_only) {
            (true, false) => following(root, field, path),
            (false, false) => preceding(root, field, path),
            (true, true) => next_sibling(root, field, path),
            (false, true) => prev_sibling(root, field, path),
        }?;
        Some((self.get_item_by_path(&target)?, target))
    }

    /// The node [`next`](Traversal::next) would step to, or its next sibling
    /// with `sibling_only`.
    pub fn get_next_item_and_path(&self, sibling_only: bool) -> Option<(&Node, NodePath)> {
        self.probe(true, sibling_only)
    }

    /// The node [`prev`](Traversal::prev) would step to, or its previous
    /// sibling with `sibling_only`.
    pub fn get_previous_item_and_path(&self, sibling_only: bool) -> Option<(&Node, NodePath)> {
        self.probe(false, sibling_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn title(node: &Node) -> &str {
        node["title"].as_str().unwrap_or_default()
    }

    const PRE_ORDER: [&str; 7] = [
        "root",
        "Child 1",
        "Child 2",
        "Grandchild 1",
        "Grandchild 2",
        "Grandgrandchild",
        "Child 3",
    ];

    #[test]
    fn test_next_walks_pre_order_then_stops() {
        let mut traversal = demo();
        let mut seen = vec![title(traversal.current()).to_string()];
        while let Ok(node) = traversal.next() {
            seen.push(title(node).to_string());
        }
        assert_eq!(seen, PRE_ORDER);
        assert_eq!(traversal.path(), &[2]);

        let err = traversal.next().unwrap_err();
        assert!(err.is_stop());
        assert_eq!(traversal.path(), &[2]);
    }

    #[test]
    fn test_prev_walks_back_to_root() {
        let mut traversal = demo();
        traversal.set_path_as_current(&[2]).unwrap();
        let mut seen = vec![title(traversal.current()).to_string()];
        while let Ok(node) = traversal.prev() {
            seen.push(title(node).to_string());
        }
        let mut expected = PRE_ORDER.to_vec();
        expected.reverse();
        assert_eq!(seen, expected);
        assert!(traversal.path().is_empty());
        assert!(traversal.prev().unwrap_err().is_stop());
    }

    #[test]
    fn test_first_and_last_are_relative() {
        let mut traversal = demo();
        traversal.set_path_as_current(&[1]).unwrap();
        assert_eq!(title(traversal.first()), "Grandchild 1");
        assert_eq!(traversal.path(), &[1, 0]);

        traversal.set_path_as_current(&[1]).unwrap();
        assert_eq!(title(traversal.last()), "Grandgrandchild");
        assert_eq!(traversal.path(), &[1, 1, 0]);
    }

    #[test]
    fn test_last_is_idempotent() {
        let mut traversal = demo();
        let first = (title(traversal.last()).to_string(), traversal.path().to_vec());
        let second = (title(traversal.last()).to_string(), traversal.path().to_vec());
        assert_eq!(first, second);
        assert_eq!(first, ("Child 3".to_string(), vec![2]));
    }

    #[test]
    fn test_first_on_leaf_stays() {
        let mut traversal = demo();
        traversal.set_path_as_current(&[0]).unwrap();
        assert_eq!(title(traversal.first()), "Child 1");
        assert_eq!(traversal.path(), &[0]);
    }

    #[rstest]
    #[case::one(1, "Child 1")]
    #[case::three(3, "Grandchild 1")]
    #[case::to_end(6, "Child 3")]
    fn test_peek_next(#[case] steps: usize, #[case] expected: &str) {
        let traversal = demo();
        assert_eq!(title(traversal.peek_next(steps).unwrap()), expected);
        assert!(traversal.path().is_empty());
    }

    #[test]
    fn test_peek_errors() {
        let mut traversal = demo();
        assert!(matches!(
            traversal.peek_next(0).unwrap_err(),
            TraversalError::InvalidArgument(_)
        ));
        assert!(traversal.peek_next(7).unwrap_err().is_stop());
        assert!(traversal.peek_prev(1).unwrap_err().is_stop());

        traversal.set_path_as_current(&[1, 1, 0]).unwrap();
        assert_eq!(title(traversal.peek_prev(2).unwrap()), "Grandchild 1");
        assert_eq!(traversal.path(), &[1, 1, 0]);
    }

    #[test]
    fn test_probes() {
        let mut traversal = demo();
        traversal.set_path_as_current(&[1, 0]).unwrap();

        let (node, path) = traversal.get_next_item_and_path(false).unwrap();
        assert_eq!((title(node), path), ("Grandchild 2", vec![1, 1]));
        let (node, path) = traversal.get_previous_item_and_path(false).unwrap();
        assert_eq!((title(node), path), ("Child 2", vec![1]));

        let (node, _) = traversal.get_next_item_and_path(true).unwrap();
        assert_eq!(title(node), "Grandchild 2");
        assert!(traversal.get_previous_item_and_path(true).is_none());

        traversal.root();
        assert!(traversal.get_previous_item_and_path(false).is_none());
        assert!(traversal.get_next_item_and_path(true).is_none());
    }

    #[test]
    fn test_inverted_swaps_protocol_steps() {
        let mut traversal = demo();
        traversal.set_path_as_current(&[1]).unwrap();
        {
            let mut inverted = traversal.inverted();
            assert_eq!(title(inverted.next().unwrap()), "Child 1");
            assert_eq!(title(inverted.prev().unwrap()), "Child 2");
            assert_eq!(title(inverted.last()), "Grandchild 1");
            assert_eq!(inverted.path(), &[1, 0]);
        }
        assert_eq!(title(traversal.next().unwrap()), "Grandchild 2");
    }

    #[test]
    fn test_inverted_swaps_first_and_peek() {
        let mut traversal = demo();
        traversal.set_path_as_current(&[1]).unwrap();
        traversal.with_inverted(|inverted| {
            assert_eq!(title(inverted.peek_next(1).unwrap()), "Child 1");
            assert_eq!(title(inverted.peek_prev(1).unwrap()), "Grandchild 1");
            let (node, _) = inverted.get_next_item_and_path(true).unwrap();
            assert_eq!(title(node), "Child 1");
            assert_eq!(title(inverted.first()), "Grandgrandchild");
        });
        assert_eq!(traversal.path(), &[1, 1, 0]);
    }

    #[test]
    fn test_order_helpers() {
        let traversal = demo();
        let root = traversal.data();
        assert_eq!(following(root, "sections", &[0]), Some(vec![1]));
        assert_eq!(following(root, "sections", &[1, 1, 0]), Some(vec![2]));
        assert_eq!(following(root, "sections", &[2]), None);
        assert_eq!(preceding(root, "sections", &[2]), Some(vec![1, 1, 0]));
        assert_eq!(preceding(root, "sections", &[]), None);
        assert_eq!(next_sibling(root, "sections", &[1, 1]), None);
        assert_eq!(prev_sibling(root, "sections", &[1, 1]), Some(vec![1, 0]));
        assert_eq!(prev_sibling(root, "sections", &[1, 0]), None);
        assert_eq!(prev_sibling(root, "sections", &[5, 2]), None);
        assert_eq!(prev_sibling(root, "sections", &[0, 1]), None);
    }
}
