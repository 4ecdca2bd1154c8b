//! A tree that can be shared between threads.
//!
//! [`SyncRbtree`] guards a whole [`RbtreeGeneric`] with a single [`RwLock`]. Mutations hold the
//! write lock for their entire duration, rebalancing included. Reads hold the read lock, and a
//! traversal must hold it until it has produced its last element, so traversals go through
//! [`SyncRbtree::read`] or [`SyncRbtree::collect`].
//!
//! There is no finer-grained locking. Rotations rewrite links between nodes that can be far
//! apart, so locking individual nodes would not be sound.

use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{DuplicateKey, NotFound, Order, Rbtree, RbtreeGeneric};

const POISONED: &str = "A writer panicked while restructuring the tree";

/// An [`RbtreeGeneric`] behind a reader-writer lock.
///
/// A poisoned lock means a mutation panicked part-way through rebalancing, leaving a tree that
/// cannot be trusted. All methods panic in that case.
#[derive(Debug)]
pub struct SyncRbtree<T, C> {
    tree: RwLock<RbtreeGeneric<T, C>>,
}

impl<T: Ord> Default for SyncRbtree<T, fn(&T, &T) -> Ordering> {
    fn default() -> Self {
        Self::from(Rbtree::default())
    }
}

impl<T, C> From<RbtreeGeneric<T, C>> for SyncRbtree<T, C> {
    fn from(tree: RbtreeGeneric<T, C>) -> Self {
        Self { tree: RwLock::new(tree) }
    }
}

impl<T, C> SyncRbtree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty tree ordered by `compare`. See [`RbtreeGeneric::new`].
    #[must_use]
    pub const fn new(compare: C) -> Self {
        Self { tree: RwLock::new(RbtreeGeneric::new(compare)) }
    }

    fn write(&self) -> RwLockWriteGuard<'_, RbtreeGeneric<T, C>> {
        self.tree.write().expect(POISONED)
    }

    /// Locks the tree for reading.
    ///
    /// Writers are blocked for as long as the guard lives, so iterators borrowed from it see a
    /// consistent tree from their first element to their last.
    pub fn read(&self) -> RwLockReadGuard<'_, RbtreeGeneric<T, C>> {
        self.tree.read().expect(POISONED)
    }

    /// See [`RbtreeGeneric::insert`].
    pub fn insert(&self, item: T) -> Result<(), DuplicateKey<T>> {
        self.write().insert(item)
    }

    /// See [`RbtreeGeneric::delete`].
    pub fn delete(&self, item: &T) -> Result<T, NotFound> {
        self.write().delete(item)
    }

    /// See [`RbtreeGeneric::clear`].
    pub fn clear(&self) {
        self.write().clear();
    }

    /// See [`RbtreeGeneric::contains`].
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.read().contains(item)
    }

    /// See [`RbtreeGeneric::size`].
    #[must_use]
    pub fn size(&self) -> usize {
        self.read().size()
    }

    /// See [`RbtreeGeneric::is_empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns a copy of the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<T>
    where
        T: Clone,
    {
        self.read().first().cloned()
    }

    /// Returns a copy of the largest element.
    #[must_use]
    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.read().last().cloned()
    }

    /// Copies out a whole traversal while holding the read lock once.
    #[must_use]
    pub fn collect(&self, order: Order) -> Vec<T>
    where
        T: Clone,
    {
        self.read().traverse(order).cloned().collect()
    }

    /// Consumes the lock and returns the tree.
    pub fn into_inner(self) -> RbtreeGeneric<T, C> {
        self.tree.into_inner().expect(POISONED)
    }
}
