//! Label search and label-chain path finding.

use std::ops::ControlFlow;

use draversal_query::Query;
use draversal_tree::visitor::{VisitResult, Visitor, walk_node};
use draversal_tree::{Node, NodeExt, NodePath};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::{Traversal, TraversalError};

/// What [`Traversal::search`] matches nodes against.
#[derive(Debug, Clone)]
pub enum SearchPattern {
    /// Case-insensitive substring of the label.
    Text(String),
    /// Unanchored regex search in the label.
    Regex(Regex),
    /// A query run against each node without its children.
    Query(Query),
}

impl SearchPattern {
    fn needs_label(&self) -> bool {
        !matches!(self, SearchPattern::Query(_))
    }
}

impl From<&str> for SearchPattern {
    fn from(text: &str) -> Self {
        SearchPattern::Text(text.to_string())
    }
}

impl From<String> for SearchPattern {
    fn from(text: String) -> Self {
        SearchPattern::Text(text)
    }
}

impl From<Regex> for SearchPattern {
    fn from(regex: Regex) -> Self {
        SearchPattern::Regex(regex)
    }
}

impl From<Query> for SearchPattern {
    fn from(query: Query) -> Self {
        SearchPattern::Query(query)
    }
}

struct Matcher<'p> {
    pattern: &'p SearchPattern,
    needle: Option<String>,
    label_field: Option<&'p str>,
    children_field: &'p str,
}

impl Matcher<'_> {
    fn label<'n>(&self, node: &'n Node) -> Option<&'n str> {
        node.get(self.label_field?).and_then(Value::as_str)
    }

    fn matches(&self, node: &Node) -> bool {
        match self.pattern {
            SearchPattern::Text(_) => match (self.label(node), &self.needle) {
                (Some(label), Some(needle)) => label.to_lowercase().contains(needle.as_str()),
                _ => false,
            },
            SearchPattern::Regex(regex) => self.label(node).is_some_and(|label| regex.is_match(label)),
            SearchPattern::Query(query) => query.is_match(&node.without_children(self.children_field)),
        }
    }
}

struct SearchVisitor<'n, 'p> {
    matcher: Matcher<'p>,
    found: Vec<(&'n Node, NodePath)>,
}

impl<'n> Visitor<'n> for SearchVisitor<'n, '_> {
    fn enter_node(&mut self, node: &'n Node, path: &[usize]) -> VisitResult {
        if self.matcher.matches(node) {
            self.found.push((node, path.to_vec()));
        }
        ControlFlow::Continue(())
    }
}

impl Traversal<'_> {
    /// Finds every node in the tree, root included, that matches `pattern`.
    ///
    /// Results come in pre-order with paths from the root. Text and regex
    /// patterns look at the string in `label_field` and need one.
    ///
    /// ```rust
    /// let traversal = draversal_core::demo();
    /// let found = traversal.search(&"grandchild".into(), Some("title")).unwrap();
    /// let paths: Vec<_> = found.into_iter().map(|(_, path)| path).collect();
    /// assert_eq!(paths, vec![vec![1, 0], vec![1, 1], vec![1, 1, 0]]);
    /// ```
    pub fn search(
        &self,
        pattern: &SearchPattern,
        label_field: Option<&str>,
    ) -> Result<Vec<(&Node, NodePath)>, TraversalError> {
        if pattern.needs_label() && label_field.is_none_or(str::is_empty) {
            return Err(TraversalError::invalid_argument(
                "text and regex search need a label field",
            ));
        }

        let needle = match pattern {
            SearchPattern::Text(text) => Some(text.to_lowercase()),
            _ => None,
        };
        let mut visitor = SearchVisitor {
            matcher: Matcher {
                pattern,
                needle,
                label_field,
                children_field: &self.children_field,
            },
            found: Vec::new(),
        };
        let _ = walk_node(&mut visitor, &self.root, &self.children_field, &mut Vec::new());

        debug!("Search matched {} node(s)", visitor.found.len());
        Ok(visitor.found)
    }

    /// Follows `labels` downward from the current node, one level per label.
    ///
    /// Every chain of direct children whose labels equal `labels` in order is
    /// returned as its last node and its path relative to the current node.
    pub fn find_paths<S: AsRef<str>>(&self, label_field: &str, labels: &[S]) -> Vec<(&Node, NodePath)> {
        if labels.is_empty() {
            return Vec::new();
        }

        let mut frontier: Vec<(&Node, NodePath)> = vec![(self.current(), Vec::new())];
        for label in labels {
            let label = label.as_ref();
            let mut next = Vec::new();
            for (node, path) in &frontier {
                for (index, child) in node.children(&self.children_field).iter().enumerate() {
                    let Some(child) = child.as_object() else {
                        continue;
                    };
                    if child.get(label_field).and_then(Value::as_str) == Some(label) {
                        let mut child_path = path.clone();
                        child_path.push(index);
                        next.push((child, child_path));
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            frontier = next;
        }
        frontier
    }
}
