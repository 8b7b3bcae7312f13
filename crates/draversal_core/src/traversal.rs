//! The cursor engine.
//!
//! A [`Traversal`] owns (or, inside an aliased root scope, borrows) one tree
//! and a cursor path into it. The current node is never stored; it is derived
//! from the root and the path whenever it is needed, so the two cannot drift
//! apart.
//!
//! Navigation lives in [`crate::protocol`] (bounded stepping) and
//! [`crate::moves`] (cyclic stepping), editing in [`crate::mutation`] and the
//! scoped guards in [`crate::scope`].

use std::ops::{Deref, DerefMut};

use draversal_tree::{
    Descendants, Index, Node, NodeExt, NodePath, Resolver, Selection, first_malformed_children,
};
use serde_json::Value;
use tracing::debug;

use crate::TraversalError;
use crate::scope::Direction;

/// Storage behind a traversal: an owned tree, or a subtree borrowed from an
/// enclosing traversal.
#[derive(Debug)]
pub(crate) enum NodeStore<'a> {
    Owned(Node),
    Shared(&'a mut Node),
}

impl Deref for NodeStore<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        match self {
            NodeStore::Owned(node) => node,
            NodeStore::Shared(node) => node,
        }
    }
}

impl DerefMut for NodeStore<'_> {
    fn deref_mut(&mut self) -> &mut Node {
        match self {
            NodeStore::Owned(node) => node,
            NodeStore::Shared(node) => node,
        }
    }
}

/// A stateful depth-first cursor over a tree of nodes.
///
/// The lifetime is `'static` for traversals that own their tree and names the
/// enclosing traversal's borrow for traversals created by
/// [`Traversal::new_root`] with `merge` set.
///
/// # Example
///
/// ```rust
/// use draversal_core::Traversal;
/// use serde_json::json;
///
/// let mut traversal = Traversal::from_value(
///     json!({"title": "root", "sections": [{"title": "a"}, {"title": "b"}]}),
///     "sections",
/// )
/// .unwrap();
///
/// assert_eq!(traversal.next().unwrap()["title"], "a");
/// assert_eq!(traversal.next().unwrap()["title"], "b");
/// assert!(traversal.next().unwrap_err().is_stop());
/// assert_eq!(traversal.path(), &[1]);
/// ```
#[derive(Debug)]
pub struct Traversal<'a> {
    pub(crate) root: NodeStore<'a>,
    pub(crate) children_field: String,
    pub(crate) path: NodePath,
    pub(crate) direction: Vec<Direction>,
}

impl Traversal<'static> {
    /// Creates a traversal positioned at `root`.
    ///
    /// Fails with a configuration error when `children_field` is empty or when
    /// any node holds something other than a sequence of nodes in that field.
    pub fn new(root: Node, children_field: impl Into<String>) -> Result<Self, TraversalError> {
        let children_field = children_field.into();
        if children_field.is_empty() {
            return Err(TraversalError::configuration(
                "children field name must not be empty",
            ));
        }
        if let Some(path) = first_malformed_children(&root, &children_field) {
            return Err(TraversalError::configuration(format!(
                "field '{children_field}' of node {path:?} must hold a sequence of nodes"
            )));
        }

        debug!(
            "Created traversal over {} node(s) with children field '{}'",
            1 + root.descendant_count(&children_field),
            children_field
        );
        Ok(Self::from_parts(NodeStore::Owned(root), children_field))
    }

    /// Creates a traversal from a JSON value, which must be an object.
    pub fn from_value(root: Value, children_field: impl Into<String>) -> Result<Self, TraversalError> {
        match root {
            Value::Object(node) => Self::new(node, children_field),
            other => Err(TraversalError::configuration(format!(
                "root must be an object, got {other}"
            ))),
        }
    }
}

impl<'a> Traversal<'a> {
    /// Builds a traversal without checking the tree.
    pub(crate) fn from_parts(root: NodeStore<'a>, children_field: String) -> Self {
        Self {
            root,
            children_field,
            path: Vec::new(),
            direction: vec![Direction::Forward],
        }
    }

    /// The field holding child nodes.
    pub fn children_field(&self) -> &str {
        &self.children_field
    }

    /// The whole tree, independent of the cursor.
    pub fn data(&self) -> &Node {
        &self.root
    }

    /// Consumes the traversal and returns its tree.
    ///
    /// A traversal sharing a subtree with an enclosing one returns a copy.
    pub fn into_node(self) -> Node {
        match self.root {
            NodeStore::Owned(node) => node,
            NodeStore::Shared(node) => node.clone(),
        }
    }

    /// The cursor path; empty at the root.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// The node under the cursor.
    pub fn current(&self) -> &Node {
        match self.root.descend(&self.children_field, &self.path) {
            Some(node) => node,
            None => unreachable!("cursor path {:?} does not resolve", self.path),
        }
    }

    /// Runs `f` with the node under the cursor and a resolver for this tree.
    pub(crate) fn with_current_mut<R>(&mut self, f: impl FnOnce(Resolver<'_>, &mut Node) -> R) -> R {
        let Some(current) = self.root.descend_mut(&self.children_field, &self.path) else {
            unreachable!("cursor path {:?} does not resolve", self.path)
        };
        f(Resolver::new(&self.children_field), current)
    }

    /// Moves the cursor back to the root.
    pub fn root(&mut self) -> &Node {
        self.path.clear();
        self.current()
    }

    /// Moves the cursor to `path`, given from the root.
    pub fn set_path_as_current(&mut self, path: &[usize]) -> Result<&Node, TraversalError> {
        if self.root.descend(&self.children_field, path).is_none() {
            return Err(draversal_tree::AddressError::unreachable(path).into());
        }
        self.path = path.to_vec();
        Ok(self.current())
    }

    /// Resolves `path` from the root.
    pub fn get_item_by_path(&self, path: &[usize]) -> Option<&Node> {
        self.root.descend(&self.children_field, path)
    }

    /// Reads through the resolver relative to the current node.
    pub fn get(&self, index: impl Into<Index>) -> Result<Selection<'_>, TraversalError> {
        let resolver = Resolver::new(&self.children_field);
        Ok(resolver.get(self.current(), &index.into())?)
    }

    pub fn get_parent_path(&self) -> Option<NodePath> {
        let (_, parent) = self.path.split_last()?;
        Some(parent.to_vec())
    }

    pub fn get_parent_item(&self) -> Option<&Node> {
        let (_, parent) = self.path.split_last()?;
        self.get_item_by_path(parent)
    }

    /// Returns a copy of the parent and its path; `None` at the root.
    ///
    /// Without `with_children` the copy has its children field removed.
    pub fn get_parent_item_and_path(&self, with_children: bool) -> Option<(Node, NodePath)> {
        let path = self.get_parent_path()?;
        let parent = self.get_item_by_path(&path)?;
        let parent = if with_children {
            parent.clone()
        } else {
            parent.without_children(&self.children_field)
        };
        Some((parent, path))
    }

    /// Path of the last node below the current one: its last direct child
    /// with `sibling_only`, otherwise the last node of its subtree in
    /// pre-order. A leaf yields its own path.
    pub fn get_last_path(&self, sibling_only: bool) -> NodePath {
        let current = self.current();
        let mut path = self.path.clone();
        if sibling_only {
            if let Some(last) = current.child_count(&self.children_field).checked_sub(1) {
                path.push(last);
            }
        } else {
            path.extend(current.last_descendant_path(&self.children_field));
        }
        path
    }

    pub fn get_last_item(&self, sibling_only: bool) -> &Node {
        self.get_last_item_and_path(sibling_only).0
    }

    pub fn get_last_item_and_path(&self, sibling_only: bool) -> (&Node, NodePath) {
        let path = self.get_last_path(sibling_only);
        match self.get_item_by_path(&path) {
            Some(node) => (node, path),
            None => unreachable!("last path {path:?} does not resolve"),
        }
    }

    /// Moves the cursor to [`Traversal::get_last_path`].
    pub fn set_last_item_as_current(&mut self, sibling_only: bool) -> &Node {
        self.path = self.get_last_path(sibling_only);
        self.current()
    }

    /// Copies of the current node's direct children.
    ///
    /// With `sibling_only` each copy has its children field removed.
    pub fn children(&self, sibling_only: bool) -> Vec<Node> {
        self.current()
            .children(&self.children_field)
            .iter()
            .filter_map(Value::as_object)
            .map(|child| {
                if sibling_only {
                    child.without_children(&self.children_field)
                } else {
                    child.clone()
                }
            })
            .collect()
    }

    /// Counts the nodes below the current one, or only its direct children
    /// with `sibling_only`.
    pub fn count_children(&self, sibling_only: bool) -> usize {
        let current = self.current();
        if sibling_only {
            current.child_count(&self.children_field)
        } else {
            current.descendant_count(&self.children_field)
        }
    }

    /// Height of the current node's subtree; 0 for a leaf.
    pub fn max_depth(&self) -> usize {
        self.current().height(&self.children_field)
    }

    /// Iterates the current node's descendants in pre-order with absolute
    /// paths. The cursor does not move.
    pub fn iter(&self) -> Descendants<'_> {
        Descendants::new(self.current(), &self.children_field, &self.path)
    }
}
