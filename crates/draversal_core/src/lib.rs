//! # draversal_core
//!
//! Stateful depth-first cursor traversal over document trees.
//!
//! This crate provides:
//! - The [`Traversal`] cursor with bounded (`next`/`prev`) and cyclic
//!   (`move_to_next_item`/`move_to_prev_item`) stepping
//! - Scoped direction inversion and scoped rebasing
//! - Structural edits relative to the cursor
//! - Label search, path finding and outline rendering
//! - Configuration loading and structural checks
//!
//! ## Example
//!
//! ```rust
//! use draversal_core::{Traversal, TraversalConfig};
//! use serde_json::json;
//!
//! let config = TraversalConfig::from_json(r#"{"label_field": "title"}"#).unwrap();
//! let root = json!({
//!     "title": "root",
//!     "sections": [
//!         {"title": "Child 1"},
//!         {"title": "Child 2", "sections": [{"title": "GC1"}]}
//!     ]
//! });
//! let mut traversal = config.traversal(root.as_object().unwrap().clone()).unwrap();
//!
//! let found = traversal.search(&"GC1".into(), config.label_field()).unwrap();
//! assert_eq!(found[0].1, vec![1, 0]);
//!
//! let path = found[0].1.clone();
//! traversal.set_path_as_current(&path).unwrap();
//! assert_eq!(traversal.visualize(config.label_field(), true).lines().last(), Some("    └── GC1*"));
//! ```

mod config;
mod demo;
mod error;
mod moves;
mod mutation;
mod protocol;
mod render;
mod scope;
mod search;
mod traversal;
mod validate;

pub use config::TraversalConfig;
pub use demo::{demo, demo_data};
pub use error::TraversalError;
pub use scope::{Direction, InvertedGuard, RootScope};
pub use search::SearchPattern;
pub use traversal::Traversal;
pub use validate::validate_data;

pub use draversal_query::{Query, QueryOptions};
pub use draversal_tree::{Index, Node, NodePath, Selection};
