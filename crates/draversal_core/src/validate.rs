//! Structural checks for trees.

use draversal_tree::{Node, NodePath, first_malformed_children};
use serde_json::Value;

use crate::TraversalError;

fn first_missing_label(root: &Node, children_field: &str, label_field: &str) -> Option<NodePath> {
    if !root.contains_key(label_field) {
        return Some(Vec::new());
    }
    draversal_tree::Descendants::new(root, children_field, &[])
        .find(|(node, _)| !node.contains_key(label_field))
        .map(|(_, path)| path)
}

/// Checks `data` before it is handed to a traversal or stored.
///
/// The root must carry `children_field`, every children field must hold a
/// sequence of nodes, and with `label_field` every node must carry that
/// field.
pub fn validate_data(
    data: &Value,
    children_field: &str,
    label_field: Option<&str>,
) -> Result<(), TraversalError> {
    let Value::Object(root) = data else {
        return Err(TraversalError::validation("root must be an object"));
    };
    if !root.contains_key(children_field) {
        return Err(TraversalError::validation(format!(
            "root is missing the children field '{children_field}'"
        )));
    }
    if let Some(path) = first_malformed_children(root, children_field) {
        return Err(TraversalError::validation(format!(
            "field '{children_field}' of node {path:?} must hold a sequence of nodes"
        )));
    }
    if let Some(label_field) = label_field
        && let Some(path) = first_missing_label(root, children_field, label_field)
    {
        return Err(TraversalError::validation(format!(
            "node {path:?} is missing the label field '{label_field}'"
        )));
    }
    Ok(())
}
