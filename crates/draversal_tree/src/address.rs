//! Path addressing.
//!
//! Every read, write and delete against a node goes through one resolver that
//! dispatches on the [`Index`] kind. Child-addressing indices are first split
//! into the node owning the target child list and a slot within that node;
//! the operation then acts on the slot.
//!
//! All checks run before anything is modified, so a failing operation leaves
//! the node untouched.

use std::ops::Range;

use serde_json::Value;

use crate::{AddressError, Node, NodeExt, first_malformed_children, is_node_list};

/// A typed index into a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    /// A single position in the node's child list.
    Position(usize),
    /// A run of positions in the node's child list.
    Range(Range<usize>),
    /// A nested child path; every element but the last descends, the last
    /// addresses a position in the reached node's child list.
    Path(Vec<usize>),
    /// An attribute of the node itself, including the children field.
    Field(String),
}

impl Index {
    fn kind(&self) -> &'static str {
        match self {
            Index::Position(_) => "position",
            Index::Range(_) => "range",
            Index::Path(_) => "path",
            Index::Field(_) => "field",
        }
    }
}

impl From<usize> for Index {
    fn from(position: usize) -> Self {
        Index::Position(position)
    }
}

impl From<Range<usize>> for Index {
    fn from(range: Range<usize>) -> Self {
        Index::Range(range)
    }
}

impl From<Vec<usize>> for Index {
    fn from(path: Vec<usize>) -> Self {
        Index::Path(path)
    }
}

impl From<&[usize]> for Index {
    fn from(path: &[usize]) -> Self {
        Index::Path(path.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Index {
    fn from(path: [usize; N]) -> Self {
        Index::Path(path.to_vec())
    }
}

impl From<&str> for Index {
    fn from(field: &str) -> Self {
        Index::Field(field.to_string())
    }
}

impl From<String> for Index {
    fn from(field: String) -> Self {
        Index::Field(field)
    }
}

/// The result of a read through the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// A single child or attribute value.
    One(&'a Value),
    /// A run of child values.
    Many(&'a [Value]),
}

impl<'a> Selection<'a> {
    /// Returns the single selected value, if this is not a run.
    pub fn one(self) -> Option<&'a Value> {
        match self {
            Selection::One(value) => Some(value),
            Selection::Many(_) => None,
        }
    }

    /// Returns the selected values as a slice.
    pub fn as_slice(self) -> &'a [Value] {
        match self {
            Selection::One(value) => std::slice::from_ref(value),
            Selection::Many(values) => values,
        }
    }

    /// Returns the single selected value as a node, if it is one.
    pub fn node(self) -> Option<&'a Node> {
        self.one().and_then(Value::as_object)
    }
}

/// Path of the node an index is resolved against.
const SELF: &[usize] = &[];

/// Where an index lands once its owning node is known.
#[derive(Debug)]
enum Slot<'i> {
    Position(usize),
    Range(Range<usize>),
    Field(&'i str),
}

/// Resolves [`Index`] values against nodes for one children field.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'f> {
    children_field: &'f str,
}

impl<'f> Resolver<'f> {
    /// Creates a resolver for trees whose children live in `children_field`.
    pub const fn new(children_field: &'f str) -> Self {
        Self { children_field }
    }

    /// The children field this resolver descends through.
    pub const fn children_field(&self) -> &'f str {
        self.children_field
    }

    /// Splits an index into the path of the owning node and the slot in it.
    fn split<'i>(index: &'i Index) -> Result<(&'i [usize], Slot<'i>), AddressError> {
        match index {
            Index::Position(position) => Ok((SELF, Slot::Position(*position))),
            Index::Range(range) => Ok((SELF, Slot::Range(range.clone()))),
            Index::Path(path) => match path.split_last() {
                Some((last, parent)) => Ok((parent, Slot::Position(*last))),
                None => Err(AddressError::EmptyPath),
            },
            Index::Field(field) => Ok((SELF, Slot::Field(field.as_str()))),
        }
    }

    fn owner<'a>(&self, node: &'a Node, path: &[usize]) -> Result<&'a Node, AddressError> {
        node.descend(self.children_field, path)
            .ok_or_else(|| AddressError::unreachable(path))
    }

    fn owner_mut<'a>(&self, node: &'a mut Node, path: &[usize]) -> Result<&'a mut Node, AddressError> {
        node.descend_mut(self.children_field, path)
            .ok_or_else(|| AddressError::unreachable(path))
    }

    fn check_range(range: &Range<usize>, len: usize) -> Result<(), AddressError> {
        if range.start > range.end || range.end > len {
            return Err(AddressError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    fn check_position(index: usize, len: usize) -> Result<(), AddressError> {
        if index >= len {
            return Err(AddressError::OutOfRange { index, len });
        }
        Ok(())
    }

    /// Rejects child nodes whose own children field is malformed.
    fn check_child(&self, child: &Node) -> Result<(), AddressError> {
        match first_malformed_children(child, self.children_field) {
            Some(_) => Err(AddressError::InvalidChildren(self.children_field.to_string())),
            None => Ok(()),
        }
    }

    /// Checks a whole replacement value for the children field.
    fn check_children(&self, value: &Value) -> Result<(), AddressError> {
        let Some(children) = value.as_array().filter(|_| is_node_list(value)) else {
            return Err(AddressError::InvalidChildren(self.children_field.to_string()));
        };
        children
            .iter()
            .filter_map(Value::as_object)
            .try_for_each(|child| self.check_child(child))
    }

    /// Reads the value(s) addressed by `index`.
    pub fn get<'a>(&self, node: &'a Node, index: &Index) -> Result<Selection<'a>, AddressError> {
        let (path, slot) = Self::split(index)?;
        let owner = self.owner(node, path)?;
        let children = owner.children(self.children_field);

        match slot {
            Slot::Position(position) => children
                .get(position)
                .map(Selection::One)
                .ok_or(AddressError::OutOfRange {
                    index: position,
                    len: children.len(),
                }),
            Slot::Range(range) => {
                Self::check_range(&range, children.len())?;
                Ok(Selection::Many(&children[range]))
            }
            Slot::Field(field) => owner
                .get(field)
                .map(Selection::One)
                .ok_or_else(|| AddressError::MissingField(field.to_string())),
        }
    }

    /// Overwrites the value addressed by `index`, returning the previous one.
    ///
    /// A position or path must address an existing child and `value` must be
    /// a node. A field is created if missing; writing the children field
    /// requires a sequence of nodes.
    pub fn set(&self, node: &mut Node, index: &Index, value: Value) -> Result<Option<Value>, AddressError> {
        let (path, slot) = Self::split(index)?;
        let owner = self.owner_mut(node, path)?;

        match slot {
            Slot::Position(position) => {
                let Some(child) = value.as_object() else {
                    return Err(AddressError::InvalidChildren(self.children_field.to_string()));
                };
                self.check_child(child)?;
                let len = owner.child_count(self.children_field);
                Self::check_position(position, len)?;
                let children = owner
                    .children_mut(self.children_field)
                    .ok_or(AddressError::OutOfRange { index: position, len })?;
                Ok(Some(std::mem::replace(&mut children[position], value)))
            }
            Slot::Range(_) => Err(AddressError::unsupported("replacement", index.kind())),
            Slot::Field(field) => {
                if field == self.children_field {
                    self.check_children(&value)?;
                }
                Ok(owner.insert(field.to_string(), value))
            }
        }
    }

    /// Inserts `child` at the position addressed by `index`, shifting later
    /// siblings. The position may equal the child count (append). The child
    /// list is created when absent.
    pub fn insert(&self, node: &mut Node, index: &Index, child: Node) -> Result<(), AddressError> {
        self.check_child(&child)?;
        let (path, slot) = Self::split(index)?;
        let Slot::Position(position) = slot else {
            return Err(AddressError::unsupported("insertion", index.kind()));
        };

        let owner = self.owner_mut(node, path)?;
        let len = owner.child_count(self.children_field);
        if position > len {
            return Err(AddressError::OutOfRange { index: position, len });
        }
        self.ensure_children(owner)?
            .insert(position, Value::Object(child));
        Ok(())
    }

    /// Appends `child` to the child list of `node`, creating it when absent.
    pub fn append(&self, node: &mut Node, child: Node) -> Result<(), AddressError> {
        self.check_child(&child)?;
        self.ensure_children(node)?.push(Value::Object(child));
        Ok(())
    }

    /// Removes the value(s) addressed by `index` and returns them.
    ///
    /// Following siblings shift down. A field index removes the attribute.
    pub fn delete(&self, node: &mut Node, index: &Index) -> Result<Vec<Value>, AddressError> {
        let (path, slot) = Self::split(index)?;
        let owner = self.owner_mut(node, path)?;
        let len = owner.child_count(self.children_field);

        match slot {
            Slot::Position(position) => {
                Self::check_position(position, len)?;
                let children = owner
                    .children_mut(self.children_field)
                    .ok_or(AddressError::OutOfRange { index: position, len })?;
                Ok(vec![children.remove(position)])
            }
            Slot::Range(range) => {
                Self::check_range(&range, len)?;
                match owner.children_mut(self.children_field) {
                    Some(children) => Ok(children.drain(range).collect()),
                    None => Ok(Vec::new()),
                }
            }
            Slot::Field(field) => owner
                .shift_remove(field)
                .map(|value| vec![value])
                .ok_or_else(|| AddressError::MissingField(field.to_string())),
        }
    }

    fn ensure_children<'a>(&self, node: &'a mut Node) -> Result<&'a mut Vec<Value>, AddressError> {
        let entry = node
            .entry(self.children_field)
            .or_insert_with(|| Value::Array(Vec::new()));
        entry
            .as_array_mut()
            .ok_or_else(|| AddressError::InvalidChildren(self.children_field.to_string()))
    }
}
