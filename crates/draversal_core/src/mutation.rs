//! Structural edits relative to the current node.
//!
//! Every edit is checked completely before anything is written, so a failed
//! edit leaves the tree as it was.

use draversal_tree::{Index, Node};
use serde_json::Value;
use tracing::debug;

use crate::{Traversal, TraversalError};

impl Traversal<'_> {
    /// Appends `child` to the current node's child list, creating the list
    /// when absent.
    pub fn add_child(&mut self, child: Node) -> Result<(), TraversalError> {
        debug!("Appending child at {:?}", self.path);
        self.with_current_mut(|resolver, current| resolver.append(current, child))?;
        Ok(())
    }

    /// Inserts `child` before the child at `index`, which may be a position
    /// or a nested path ending in a position. The position may equal the list
    /// length.
    pub fn insert_child(&mut self, index: impl Into<Index>, child: Node) -> Result<(), TraversalError> {
        let index = index.into();
        debug!("Inserting child at {:?} below {:?}", index, self.path);
        self.with_current_mut(|resolver, current| resolver.insert(current, &index, child))?;
        Ok(())
    }

    /// Overwrites the child (or, for a field index, the attribute) at
    /// `index`, returning the previous value.
    pub fn replace_child(&mut self, index: impl Into<Index>, child: Node) -> Result<Option<Value>, TraversalError> {
        self.set(index, Value::Object(child))
    }

    /// Writes `value` at `index`, returning the previous value.
    pub fn set(&mut self, index: impl Into<Index>, value: Value) -> Result<Option<Value>, TraversalError> {
        let index = index.into();
        debug!("Replacing {:?} below {:?}", index, self.path);
        Ok(self.with_current_mut(|resolver, current| resolver.set(current, &index, value))?)
    }

    /// Removes the child, run of children or attribute at `index` and
    /// returns what was removed.
    pub fn delete_child(&mut self, index: impl Into<Index>) -> Result<Vec<Value>, TraversalError> {
        let index = index.into();
        debug!("Deleting {:?} below {:?}", index, self.path);
        Ok(self.with_current_mut(|resolver, current| resolver.delete(current, &index))?)
    }

    /// Merges `fields` into the current node's attributes.
    ///
    /// Fails without applying anything when `fields` names the children
    /// field.
    pub fn modify(&mut self, fields: Node) -> Result<(), TraversalError> {
        if fields.contains_key(&self.children_field) {
            return Err(TraversalError::invalid_argument(format!(
                "modify() cannot change the children field '{}'",
                self.children_field
            )));
        }
        debug!("Modifying {} field(s) at {:?}", fields.len(), self.path);
        self.with_current_mut(|_, current| current.extend(fields));
        Ok(())
    }

    /// Sets one attribute of the current node, returning its previous value.
    pub fn modify_field(&mut self, key: impl Into<String>, value: Value) -> Result<Option<Value>, TraversalError> {
        let key = key.into();
        if key == self.children_field {
            return Err(TraversalError::invalid_argument(format!(
                "modify_field() cannot change the children field '{key}'"
            )));
        }
        Ok(self.with_current_mut(|_, current| current.insert(key, value)))
    }
}
