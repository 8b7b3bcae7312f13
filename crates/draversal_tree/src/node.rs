//! Node model.
//!
//! Nodes are plain `serde_json` objects. The children field is passed to every
//! accessor instead of being stored on the node, so the same data can be read
//! as a tree over different child fields.

use serde_json::{Map, Value};

/// A tree node: an ordered mapping from field name to value.
pub type Node = Map<String, Value>;

/// Position of a node below some root, one child index per level.
///
/// The empty path denotes the root itself.
pub type NodePath = Vec<usize>;

/// Returns true if `value` is a sequence whose every element is a node.
pub fn is_node_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_object))
}

/// Returns true if the children field is absent or holds only nodes.
pub fn children_are_nodes(node: &Node, children_field: &str) -> bool {
    node.get(children_field).is_none_or(is_node_list)
}

/// Path of the first node (in pre-order) below and including `root` whose
/// children field holds something other than a sequence of nodes.
pub fn first_malformed_children(root: &Node, children_field: &str) -> Option<NodePath> {
    let mut stack: Vec<(&Node, NodePath)> = vec![(root, Vec::new())];
    while let Some((node, path)) = stack.pop() {
        if !children_are_nodes(node, children_field) {
            return Some(path);
        }
        for (index, child) in node.children(children_field).iter().enumerate().rev() {
            if let Some(child) = child.as_object() {
                let mut child_path = path.clone();
                child_path.push(index);
                stack.push((child, child_path));
            }
        }
    }
    None
}

/// Child-list access for [`Node`] relative to a children field.
///
/// Child entries that are not objects are skipped by the node accessors
/// (`child`, `descend`) and reported by [`is_node_list`]; trees checked on
/// construction never contain them.
pub trait NodeExt {
    /// Returns the raw child list, or an empty slice when the field is absent
    /// or not a sequence.
    fn children<'a>(&'a self, field: &str) -> &'a [Value];

    /// Returns the child list for mutation, if present.
    fn children_mut(&mut self, field: &str) -> Option<&mut Vec<Value>>;

    /// Returns the child at `index`.
    fn child(&self, field: &str, index: usize) -> Option<&Node>;

    /// Returns the child at `index` for mutation.
    fn child_mut(&mut self, field: &str, index: usize) -> Option<&mut Node>;

    /// Follows `path` downward through the children field.
    fn descend(&self, field: &str, path: &[usize]) -> Option<&Node>;

    /// Follows `path` downward through the children field for mutation.
    fn descend_mut(&mut self, field: &str, path: &[usize]) -> Option<&mut Node>;

    /// Number of direct children.
    fn child_count(&self, field: &str) -> usize {
        self.children(field).len()
    }

    /// Returns true if the node has at least one child.
    fn has_children(&self, field: &str) -> bool {
        self.child_count(field) > 0
    }

    /// Path (relative to this node) of the last node in pre-order.
    ///
    /// Follows the last child at every level; a leaf yields the empty path.
    fn last_descendant_path(&self, field: &str) -> NodePath;

    /// Number of nodes below this one, at any depth.
    fn descendant_count(&self, field: &str) -> usize;

    /// Height of the subtree rooted here; 0 for a leaf.
    fn height(&self, field: &str) -> usize;

    /// A copy of this node without its children field.
    fn without_children(&self, field: &str) -> Node;
}

impl NodeExt for Node {
    fn children<'a>(&'a self, field: &str) -> &'a [Value] {
        self.get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn children_mut(&mut self, field: &str) -> Option<&mut Vec<Value>> {
        self.get_mut(field).and_then(Value::as_array_mut)
    }

    fn child(&self, field: &str, index: usize) -> Option<&Node> {
        self.children(field).get(index).and_then(Value::as_object)
    }

    fn child_mut(&mut self, field: &str, index: usize) -> Option<&mut Node> {
        self.children_mut(field)?
            .get_mut(index)
            .and_then(Value::as_object_mut)
    }

    fn descend(&self, field: &str, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.child(field, index))
    }

    fn descend_mut(&mut self, field: &str, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = node.child_mut(field, index)?;
        }
        Some(node)
    }

    fn last_descendant_path(&self, field: &str) -> NodePath {
        let mut path = Vec::new();
        let mut node = self;
        while let Some(last) = node.child_count(field).checked_sub(1) {
            match node.child(field, last) {
                Some(child) => {
                    path.push(last);
                    node = child;
                }
                None => break,
            }
        }
        path
    }

    fn descendant_count(&self, field: &str) -> usize {
        self.children(field)
            .iter()
            .filter_map(Value::as_object)
            .map(|child| 1 + child.descendant_count(field))
            .sum()
    }

    fn height(&self, field: &str) -> usize {
        self.children(field)
            .iter()
            .filter_map(Value::as_object)
            .map(|child| 1 + child.height(field))
            .max()
            .unwrap_or(0)
    }

    fn without_children(&self, field: &str) -> Node {
        self.iter()
            .filter(|(key, _)| key.as_str() != field)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
