//! Many-to-many association table.

use std::collections::{BTreeMap, BTreeSet};

/// A set of `(left, right)` edges indexed from both sides.
///
/// An edge carries no attributes; linking twice is a no-op.
#[derive(Debug)]
pub(crate) struct LinkTable<L, R> {
    forward: BTreeMap<L, BTreeSet<R>>,
    reverse: BTreeMap<R, BTreeSet<L>>,
}

impl<L: Ord + Copy, R: Ord + Copy> LinkTable<L, R> {
    pub(crate) fn new() -> Self {
        Self {
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    /// Returns `true` if the edge was newly added.
    pub(crate) fn link(&mut self, left: L, right: R) -> bool {
        self.reverse.entry(right).or_default().insert(left);
        self.forward.entry(left).or_default().insert(right)
    }

    /// Returns `true` if the edge existed.
    pub(crate) fn unlink(&mut self, left: L, right: R) -> bool {
        if let Some(lefts) = self.reverse.get_mut(&right) {
            lefts.remove(&left);
            if lefts.is_empty() {
                self.reverse.remove(&right);
            }
        }
        match self.forward.get_mut(&left) {
            Some(rights) => {
                let removed = rights.remove(&right);
                if rights.is_empty() {
                    self.forward.remove(&left);
                }
                removed
            }
            None => false,
        }
    }

    pub(crate) fn rights_of(&self, left: L) -> Vec<R> {
        self.forward
            .get(&left)
            .map(|rights| rights.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn lefts_of(&self, right: R) -> Vec<L> {
        self.reverse
            .get(&right)
            .map(|lefts| lefts.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drops every edge touching `left`.
    pub(crate) fn remove_left(&mut self, left: L) {
        for right in self.rights_of(left) {
            self.unlink(left, right);
        }
    }

    /// Drops every edge touching `right`.
    pub(crate) fn remove_right(&mut self, right: R) {
        for left in self.lefts_of(right) {
            self.unlink(left, right);
        }
    }

    /// Replaces all edges of `left` with exactly `rights`.
    pub(crate) fn replace_left(&mut self, left: L, rights: impl IntoIterator<Item = R>) {
        self.remove_left(left);
        for right in rights {
            self.link(left, right);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }
}
