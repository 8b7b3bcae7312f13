//! # draversal_query
//!
//! Flattened-key transform and query matcher.
//!
//! This crate provides:
//! - [`flatten`] / [`unflatten`] - convert nested objects to and from a flat
//!   mapping of path keys (`a.b.c`, `d#0.e`)
//! - [`reconstruct`] - rebuild the minimal element holding one flat key's value
//! - [`Query`] - operator, wildcard and regex matching over flattened keys
//!
//! ## Example
//!
//! ```rust
//! use draversal_query::{FlattenConfig, Query, QueryOptions, flatten};
//! use serde_json::json;
//!
//! let data = json!({"a": {"b": {"c": 1}}, "d": [{"e": 2}, {"f": 3}]});
//! let data = data.as_object().unwrap();
//!
//! let flat = flatten(data, &FlattenConfig::default());
//! assert_eq!(serde_json::Value::Object(flat), json!({"a.b.c": 1, "d#0.e": 2, "d#1.f": 3}));
//!
//! let query = Query::from_value(json!({"d#1.f$gt": 2}), QueryOptions::default()).unwrap();
//! let matched = query.execute(data).unwrap();
//! assert_eq!(serde_json::Value::Object(matched), json!({"d#1.f": 3}));
//! ```

mod error;
mod flatten;
mod operator;
mod query;

pub use error::QueryError;
pub use flatten::{FlattenConfig, Segment, flatten, reconstruct, resolve, tokenize, unflatten};
pub use operator::Operator;
pub use query::{MatchMode, Query, QueryOptions};
