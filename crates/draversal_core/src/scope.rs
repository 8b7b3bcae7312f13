//! Scoped direction inversion and scoped rebasing.
//!
//! Both scopes are guards that dereference to a [`Traversal`] and undo their
//! effect when dropped, whichever way the scope is left.

use std::ops::{Deref, DerefMut};

use draversal_tree::NodeExt;
use tracing::debug;

use crate::Traversal;
use crate::traversal::NodeStore;

/// A marker on the direction stack.
///
/// Every traversal starts with a `Forward` base marker; each inverted scope
/// pushes `Inverted` on top and pops it when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Inverted,
}

/// Guard returned by [`Traversal::inverted`].
///
/// While alive, protocol stepping runs backwards. Move stepping is not
/// affected.
#[derive(Debug)]
pub struct InvertedGuard<'g, 'a> {
    traversal: &'g mut Traversal<'a>,
    depth: usize,
}

impl<'a> Deref for InvertedGuard<'_, 'a> {
    type Target = Traversal<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.traversal
    }
}

impl DerefMut for InvertedGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.traversal
    }
}

impl Drop for InvertedGuard<'_, '_> {
    fn drop(&mut self) {
        self.traversal.direction.truncate(self.depth);
        debug!("Left inverted scope (depth {})", self.depth);
    }
}

/// Guard returned by [`Traversal::new_root`]: a traversal rooted at the node
/// that was current when the scope was entered.
#[derive(Debug)]
pub struct RootScope<'p> {
    child: Traversal<'p>,
    merged: bool,
}

impl RootScope<'_> {
    /// Returns true if the scope edits the enclosing tree in place.
    pub fn is_merged(&self) -> bool {
        self.merged
    }
}

impl<'p> Deref for RootScope<'p> {
    type Target = Traversal<'p>;

    fn deref(&self) -> &Self::Target {
        &self.child
    }
}

impl DerefMut for RootScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.child
    }
}

impl Drop for RootScope<'_> {
    fn drop(&mut self) {
        debug!(
            "Left {} root scope",
            if self.merged { "merged" } else { "copied" }
        );
    }
}

impl<'a> Traversal<'a> {
    /// The effective protocol direction.
    pub fn direction(&self) -> Direction {
        self.direction.last().copied().unwrap_or_default()
    }

    /// Returns true inside an [`inverted`](Traversal::inverted) scope.
    pub fn is_inverted(&self) -> bool {
        self.direction() == Direction::Inverted
    }

    /// Enters a scope in which protocol stepping is reversed.
    ///
    /// Scopes nest; an inner scope keeps the direction inverted. Dropping the
    /// guard restores the direction that was active before.
    ///
    /// ```rust
    /// let mut traversal = draversal_core::demo();
    /// traversal.set_path_as_current(&[1]).unwrap();
    /// {
    ///     let mut inverted = traversal.inverted();
    ///     assert_eq!(inverted.next().unwrap()["title"], "Child 1");
    /// }
    /// assert_eq!(traversal.next().unwrap()["title"], "Child 2");
    /// ```
    pub fn inverted(&mut self) -> InvertedGuard<'_, 'a> {
        let depth = self.direction.len();
        self.direction.push(Direction::Inverted);
        debug!("Entered inverted scope (depth {})", depth);
        InvertedGuard {
            traversal: self,
            depth,
        }
    }

    /// Runs `f` inside an [`inverted`](Traversal::inverted) scope.
    pub fn with_inverted<R>(&mut self, f: impl FnOnce(&mut Traversal<'a>) -> R) -> R {
        let mut guard = self.inverted();
        f(&mut guard)
    }

    /// Opens a traversal rooted at the current node.
    ///
    /// With `merge` the new traversal edits this tree in place and this
    /// traversal is borrowed until the scope ends; the cursor is unchanged
    /// afterwards. Without `merge` it works on a copy and nothing done
    /// through it reaches this tree.
    pub fn new_root(&mut self, merge: bool) -> RootScope<'_> {
        let children_field = self.children_field.clone();
        debug!(
            "Entered {} root scope at {:?}",
            if merge { "merged" } else { "copied" },
            self.path
        );

        let root = if merge {
            let Traversal { root, path, .. } = self;
            match root.descend_mut(&children_field, path) {
                Some(node) => NodeStore::Shared(node),
                None => unreachable!("cursor path {path:?} does not resolve"),
            }
        } else {
            NodeStore::Owned(self.current().clone())
        };

        RootScope {
            child: Traversal::from_parts(root, children_field),
            merged: merge,
        }
    }

    /// Runs `f` with a traversal rooted at the current node; see
    /// [`Traversal::new_root`].
    pub fn with_new_root<R>(&mut self, merge: bool, f: impl FnOnce(&mut Traversal<'_>) -> R) -> R {
        let mut scope = self.new_root(merge);
        f(&mut scope)
    }
}
