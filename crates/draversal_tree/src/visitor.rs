//! Pre-order traversal over node trees.
//!
//! - [`Visitor`] - read-only traversal trait with enter/exit hooks
//! - [`walk_node`] - visits a node and then its subtree
//! - [`walk_children`] - visits every child subtree of a node
//! - [`Descendants`] - an iterator over a subtree in pre-order
//!
//! # Example
//!
//! ```rust
//! use draversal_tree::Node;
//! use draversal_tree::visitor::{Visitor, VisitResult, walk_node};
//! use serde_json::json;
//! use std::ops::ControlFlow;
//!
//! struct TitleCollector<'n> {
//!     titles: Vec<&'n str>,
//! }
//!
//! impl<'n> Visitor<'n> for TitleCollector<'n> {
//!     fn enter_node(&mut self, node: &'n Node, _path: &[usize]) -> VisitResult {
//!         if let Some(title) = node.get("title").and_then(|v| v.as_str()) {
//!             self.titles.push(title);
//!         }
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let root: Node = serde_json::from_value(json!({
//!     "title": "root",
//!     "sections": [{"title": "a", "sections": [{"title": "a0"}]}, {"title": "b"}]
//! }))
//! .unwrap();
//!
//! let mut collector = TitleCollector { titles: Vec::new() };
//! let _ = walk_node(&mut collector, &root, "sections", &mut Vec::new());
//! assert_eq!(collector.titles, vec!["root", "a", "a0", "b"]);
//! ```

use std::ops::ControlFlow;

use crate::{Node, NodeExt, NodePath};

/// Result type for visitor methods to control traversal.
///
/// - `ControlFlow::Continue(())` - continue visiting
/// - `ControlFlow::Break(())` - stop traversal early
pub type VisitResult = ControlFlow<()>;

/// Visitor trait for walking a node tree without modification.
///
/// The `'n` lifetime ties visited nodes to the walked tree, so visitors may
/// keep references to the nodes they see.
pub trait Visitor<'n>: Sized {
    /// Called before a node's children are walked.
    #[inline]
    fn enter_node(&mut self, _node: &'n Node, _path: &[usize]) -> VisitResult {
        ControlFlow::Continue(())
    }

    /// Called after a node and all its children were walked.
    #[inline]
    fn exit_node(&mut self, _node: &'n Node, _path: &[usize]) -> VisitResult {
        ControlFlow::Continue(())
    }
}

/// Walks `node` and its subtree in pre-order.
///
/// `path` is the position of `node` as reported to the visitor; it is
/// extended while descending and restored before returning.
pub fn walk_node<'n, V>(
    visitor: &mut V,
    node: &'n Node,
    children_field: &str,
    path: &mut NodePath,
) -> VisitResult
where
    V: Visitor<'n>,
{
    visitor.enter_node(node, path)?;
    walk_children(visitor, node, children_field, path)?;
    visitor.exit_node(node, path)
}

/// Walks every child subtree of `node` in list order.
pub fn walk_children<'n, V>(
    visitor: &mut V,
    node: &'n Node,
    children_field: &str,
    path: &mut NodePath,
) -> VisitResult
where
    V: Visitor<'n>,
{
    for (index, child) in node.children(children_field).iter().enumerate() {
        let Some(child) = child.as_object() else {
            continue;
        };
        path.push(index);
        let result = walk_node(visitor, child, children_field, path);
        path.pop();
        result?;
    }
    ControlFlow::Continue(())
}

/// Pre-order iterator over the descendants of a node.
///
/// Yields every node below the starting node (the starting node itself is
/// excluded) together with its path, prefixed by the base path given at
/// construction.
pub struct Descendants<'n> {
    children_field: &'n str,
    stack: Vec<(&'n Node, NodePath)>,
}

impl<'n> Descendants<'n> {
    /// Creates an iterator over the subtree of `node`, which sits at `base`.
    pub fn new(node: &'n Node, children_field: &'n str, base: &[usize]) -> Self {
        let mut iter = Self {
            children_field,
            stack: Vec::new(),
        };
        iter.push_children(node, base);
        iter
    }

    fn push_children(&mut self, node: &'n Node, path: &[usize]) {
        let children = node.children(self.children_field);
        for (index, child) in children.iter().enumerate().rev() {
            if let Some(child) = child.as_object() {
                let mut child_path = path.to_vec();
                child_path.push(index);
                self.stack.push((child, child_path));
            }
        }
    }
}

impl<'n> Iterator for Descendants<'n> {
    type Item = (&'n Node, NodePath);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, path) = self.stack.pop()?;
        self.push_children(node, &path);
        Some((node, path))
    }
}
