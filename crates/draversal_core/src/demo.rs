//! The reference tree used in documentation and tests.

use draversal_tree::Node;
use serde_json::Value;

use crate::Traversal;
use crate::traversal::NodeStore;

fn section(title: &str, children: Vec<Node>) -> Node {
    let mut node = Node::new();
    node.insert("title".to_string(), Value::from(title));
    if !children.is_empty() {
        node.insert(
            "sections".to_string(),
            Value::Array(children.into_iter().map(Value::Object).collect()),
        );
    }
    node
}

/// The reference tree: children in `sections`, labels in `title`.
///
/// ```text
/// root
/// ├── Child 1
/// ├── Child 2
/// │   ├── Grandchild 1
/// │   └── Grandchild 2
/// │       └── Grandgrandchild
/// └── Child 3
/// ```
pub fn demo_data() -> Node {
    section(
        "root",
        vec![
            section("Child 1", Vec::new()),
            section(
                "Child 2",
                vec![
                    section("Grandchild 1", Vec::new()),
                    section("Grandchild 2", vec![section("Grandgrandchild", Vec::new())]),
                ],
            ),
            section("Child 3", Vec::new()),
        ],
    )
}

/// A traversal over [`demo_data`], positioned at the root.
pub fn demo() -> Traversal<'static> {
    Traversal::from_parts(NodeStore::Owned(demo_data()), "sections".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_demo_shape() {
        let traversal = demo();
        assert_eq!(traversal.count_children(false), 6);
        assert_eq!(traversal.max_depth(), 3);
        assert_eq!(
            Value::Object(demo_data()),
            json!({
                "title": "root",
                "sections": [
                    {"title": "Child 1"},
                    {"title": "Child 2", "sections": [
                        {"title": "Grandchild 1"},
                        {"title": "Grandchild 2", "sections": [{"title": "Grandgrandchild"}]}
                    ]},
                    {"title": "Child 3"}
                ]
            })
        );
    }
}
