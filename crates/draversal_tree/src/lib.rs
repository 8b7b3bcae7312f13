//! # draversal_tree
//!
//! Tree data types for draversal.
//!
//! A document tree is a nested JSON object. One field, chosen per tree (the
//! *children field*), holds the ordered child nodes; every other field is
//! caller-defined payload that this crate never interprets.
//!
//! ## Overview
//!
//! - [`Node`] and [`NodePath`] - the node model and child-index paths
//! - [`NodeExt`] - child-list access relative to a children field
//! - [`Resolver`] and [`Index`] - one dispatching resolver for reads, writes
//!   and deletes by position, range, nested path or field name
//! - [`visitor`] - pre-order walking with early termination
//!
//! ## Example
//!
//! ```rust
//! use draversal_tree::{Index, Node, NodeExt, Resolver};
//! use serde_json::json;
//!
//! let root: Node = serde_json::from_value(json!({
//!     "title": "root",
//!     "sections": [{"title": "a"}, {"title": "b"}]
//! }))
//! .unwrap();
//!
//! assert_eq!(root.child_count("sections"), 2);
//!
//! let resolver = Resolver::new("sections");
//! let selection = resolver.get(&root, &Index::Position(1)).unwrap();
//! assert_eq!(selection.one().unwrap()["title"], "b");
//! ```

mod address;
mod error;
mod node;
pub mod visitor;

pub use address::{Index, Resolver, Selection};
pub use error::AddressError;
pub use node::{Node, NodeExt, NodePath, children_are_nodes, first_malformed_children, is_node_list};

pub use visitor::{Descendants, VisitResult, Visitor};
