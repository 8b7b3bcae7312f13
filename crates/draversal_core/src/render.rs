//! Text outline of a tree.

use std::fmt::Write;

use draversal_tree::{Node, NodeExt};
use serde_json::Value;

use crate::Traversal;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

struct Outline<'t> {
    label_field: Option<&'t str>,
    children_field: &'t str,
    marked: Option<&'t [usize]>,
    lines: Vec<String>,
}

impl Outline<'_> {
    fn line(&mut self, node: &Node, path: &mut Vec<usize>, prefix: &str, connector: &str) {
        let mut line = format!("{prefix}{connector}");
        match self
            .label_field
            .and_then(|field| node.get(field))
            .and_then(Value::as_str)
        {
            Some(label) => line.push_str(label),
            None => {
                let _ = write!(line, "{path:?}");
            }
        }
        if self.marked == Some(path.as_slice()) {
            line.push('*');
        }
        self.lines.push(line);
    }

    fn children(&mut self, node: &Node, path: &mut Vec<usize>, prefix: &str) {
        let children = node.children(self.children_field);
        let count = children.len();
        for (index, child) in children.iter().enumerate() {
            let Some(child) = child.as_object() else {
                continue;
            };
            let last = index + 1 == count;
            path.push(index);
            self.line(child, path, prefix, if last { LAST_BRANCH } else { BRANCH });
            let nested = format!("{prefix}{}", if last { SPACE } else { PIPE });
            self.children(child, path, &nested);
            path.pop();
        }
    }
}

impl Traversal<'_> {
    /// Renders the subtree of the current node as an outline, one node per
    /// line, labelled by `label_field` or by path when the label is missing.
    ///
    /// With `from_root` the whole tree is rendered and the current node's line
    /// ends in `*`.
    pub fn visualize(&self, label_field: Option<&str>, from_root: bool) -> String {
        let (start, mut path) = if from_root {
            (&*self.root, Vec::new())
        } else {
            (self.current(), self.path.clone())
        };
        let mut outline = Outline {
            label_field,
            children_field: &self.children_field,
            marked: from_root.then_some(self.path.as_slice()),
            lines: Vec::new(),
        };
        outline.line(start, &mut path, "", "");
        outline.children(start, &mut path, "");
        outline.lines.join("\n")
    }
}
