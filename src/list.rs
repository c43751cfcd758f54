//! Node-local sequences.
//!
//! Every node keeps two short arrays: its sorted elements and, for internal
//! nodes, one more child reference than it has elements. Both are backed by a
//! `SmallVec` so that small-degree trees keep their nodes inline, while larger
//! nodes spill onto the heap and keep that buffer across recycling through the
//! [`NodePool`](crate::NodePool).
//!
//! Removing entries always drops them. A retired node parked in the pool must
//! not keep elements or subtrees of a live tree reachable.

use smallvec::SmallVec;

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::node::Node;

/// Inline element capacity, enough for a full node of a degree-4 tree.
const INLINE_ITEMS: usize = 7;

/// Inline child capacity, one more than [`INLINE_ITEMS`].
const INLINE_CHILDREN: usize = INLINE_ITEMS + 1;

// ---------------------------------------------------------------------------
// ItemList
// ---------------------------------------------------------------------------

/// Sorted, duplicate-free run of elements stored in one node.
pub(crate) struct ItemList<T>(SmallVec<[T; INLINE_ITEMS]>);

impl<T> ItemList<T> {
	pub(crate) fn new() -> Self {
		ItemList(SmallVec::new())
	}

	/// Binary search for `key`.
	///
	/// # Returns
	///
	/// `(index, found)` where:
	/// - `found == true`: `self[index]` is equal to `key`
	/// - `found == false`: `index` is where `key` would have to be inserted
	///   to keep the run sorted
	///
	/// Equality is "neither is less than the other", so only `<` is used.
	#[inline]
	pub(crate) fn find<Q>(&self, key: &Q) -> (usize, bool)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		// First index whose element is strictly greater than the key
		let n = self.0.partition_point(|item| !(key < item.borrow()));
		if n > 0 && !(self.0[n - 1].borrow() < key) {
			return (n - 1, true);
		}
		(n, false)
	}

	/// Inserts `item` at `index`, shifting everything after it to the right.
	pub(crate) fn insert_at(&mut self, index: usize, item: T) {
		self.0.insert(index, item);
	}

	/// Removes and returns the element at `index`, shifting the tail left.
	pub(crate) fn remove_at(&mut self, index: usize) -> T {
		self.0.remove(index)
	}

	/// Swaps `item` into `index` and returns the element it replaced.
	pub(crate) fn replace(&mut self, index: usize, item: T) -> T {
		std::mem::replace(&mut self.0[index], item)
	}

	pub(crate) fn push(&mut self, item: T) {
		self.0.push(item);
	}

	pub(crate) fn pop(&mut self) -> Option<T> {
		self.0.pop()
	}

	/// Drops every element from `index` onward.
	pub(crate) fn truncate(&mut self, index: usize) {
		self.0.truncate(index);
	}

	/// Moves `source[at..]` onto the end of this list.
	pub(crate) fn take_tail(&mut self, source: &mut ItemList<T>, at: usize) {
		self.0.extend(source.0.drain(at..));
	}

	/// Moves every element of `source` onto the end of this list.
	pub(crate) fn append(&mut self, source: &mut ItemList<T>) {
		self.take_tail(source, 0);
	}

	/// Appends clones of `source`, reusing this list's buffer when it is large enough.
	pub(crate) fn extend_cloned(&mut self, source: &[T])
	where
		T: Clone,
	{
		self.0.extend(source.iter().cloned());
	}

	/// Number of elements the current buffer holds without reallocating.
	#[cfg(test)]
	pub(crate) fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

impl<T> Deref for ItemList<T> {
	type Target = [T];

	fn deref(&self) -> &[T] {
		&self.0
	}
}

impl<T: fmt::Debug> fmt::Debug for ItemList<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.0.iter()).finish()
	}
}

// ---------------------------------------------------------------------------
// ChildList
// ---------------------------------------------------------------------------

/// Child references of an internal node.
///
/// Children are never compared with each other. Their order is given by the
/// separating elements of the parent, so this list only offers positional
/// operations.
pub(crate) struct ChildList<T>(SmallVec<[Arc<Node<T>>; INLINE_CHILDREN]>);

impl<T> ChildList<T> {
	pub(crate) fn new() -> Self {
		ChildList(SmallVec::new())
	}

	pub(crate) fn insert_at(&mut self, index: usize, child: Arc<Node<T>>) {
		self.0.insert(index, child);
	}

	pub(crate) fn remove_at(&mut self, index: usize) -> Arc<Node<T>> {
		self.0.remove(index)
	}

	pub(crate) fn push(&mut self, child: Arc<Node<T>>) {
		self.0.push(child);
	}

	pub(crate) fn pop(&mut self) -> Option<Arc<Node<T>>> {
		self.0.pop()
	}

	/// Drops every child reference from `index` onward.
	pub(crate) fn truncate(&mut self, index: usize) {
		self.0.truncate(index);
	}

	/// Returns the slot holding the child at `index` so it can be swapped out.
	#[inline]
	pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Arc<Node<T>> {
		&mut self.0[index]
	}

	/// Moves `source[at..]` onto the end of this list.
	pub(crate) fn take_tail(&mut self, source: &mut ChildList<T>, at: usize) {
		self.0.extend(source.0.drain(at..));
	}

	pub(crate) fn append(&mut self, source: &mut ChildList<T>) {
		self.take_tail(source, 0);
	}

	/// Appends new references to the children of `source`.
	///
	/// Only the references are duplicated; the subtrees stay shared.
	pub(crate) fn extend_cloned(&mut self, source: &[Arc<Node<T>>]) {
		self.0.extend(source.iter().cloned());
	}

	/// Detaches every child, handing them to the caller by value.
	pub(crate) fn drain_all(&mut self) -> impl Iterator<Item = Arc<Node<T>>> + '_ {
		self.0.drain(..)
	}
}

impl<T> Deref for ChildList<T> {
	type Target = [Arc<Node<T>>];

	fn deref(&self) -> &[Arc<Node<T>>] {
		&self.0
	}
}
