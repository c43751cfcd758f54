//! Tree nodes and the recursive algorithms that run on them.
//!
//! Write paths take the writing tree's [`Generation`] explicitly and only ever
//! descend through [`Node::mutable_child`], which swaps a private copy into the
//! parent before handing out `&mut` access. Every node a write touches is
//! therefore owned by the writer, and nodes shared with other handles are
//! never changed.

use std::borrow::Borrow;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::list::{ChildList, ItemList};
use crate::pool::{Generation, Retire, NO_GENERATION};

/// A B-tree vertex.
///
/// A leaf has no children. An internal node has exactly one more child than
/// it has elements, and `items[i]` separates the subtree `children[i]` (all
/// smaller) from `children[i + 1]` (all greater).
pub(crate) struct Node<T> {
	/// Sorted elements of this node.
	pub(crate) items: ItemList<T>,
	/// Child subtrees; empty for leaves.
	pub(crate) children: ChildList<T>,
	/// Id of the generation that created this node.
	pub(crate) generation: u64,
}

/// Which element a removal targets.
pub(crate) enum Remove<'a, Q: ?Sized> {
	/// The element equal to the given key.
	Item(&'a Q),
	/// The smallest element of the subtree.
	Min,
	/// The largest element of the subtree.
	Max,
}

impl<Q: ?Sized> Clone for Remove<'_, Q> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<Q: ?Sized> Copy for Remove<'_, Q> {}

/// Traversal order for [`Node::iterate`].
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) enum Direction {
	/// Smallest to largest.
	Ascend,
	/// Largest to smallest.
	Descend,
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("items", &self.items)
			.field("children", &self.children.len())
			.field("generation", &self.generation)
			.finish()
	}
}

impl<T> Node<T> {
	/// Creates an empty, untagged node.
	pub(crate) fn new() -> Self {
		Node {
			items: ItemList::new(),
			children: ChildList::new(),
			generation: NO_GENERATION,
		}
	}

	#[inline]
	pub(crate) fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	/// Drops all contents and the ownership tag, ready for the pool.
	pub(crate) fn clear(&mut self) {
		self.items.truncate(0);
		self.children.truncate(0);
		self.generation = NO_GENERATION;
	}

	/// Finds the element equal to `key` in this subtree.
	pub(crate) fn get<Q>(&self, key: &Q) -> Option<&T>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut node = self;
		loop {
			let (i, found) = node.items.find(key);
			if found {
				return Some(&node.items[i]);
			}
			if node.is_leaf() {
				return None;
			}
			node = &node.children[i];
		}
	}

	/// Returns the smallest element of this subtree.
	pub(crate) fn min(&self) -> Option<&T> {
		let mut node = self;
		while let Some(first) = node.children.first() {
			node = first;
		}
		node.items.first()
	}

	/// Returns the largest element of this subtree.
	pub(crate) fn max(&self) -> Option<&T> {
		let mut node = self;
		while let Some(last) = node.children.last() {
			node = last;
		}
		node.items.last()
	}

	/// Walks the subtree in `dir` order, calling `visit` on every element
	/// inside the bounds.
	///
	/// - Ascending, elements `x` with `start <= x < stop` are visited. When
	///   `include_start` is false, an element equal to `start` is skipped.
	/// - Descending, elements `x` with `stop < x <= start` are visited. When
	///   `include_start` is false, an element equal to `start` is skipped.
	///
	/// `hit` records whether the start boundary has already been passed on the
	/// way to this subtree; the updated flag is returned in
	/// `ControlFlow::Continue`. `ControlFlow::Break` means the walk is over,
	/// either because `stop` was reached or because `visit` returned `false`.
	pub(crate) fn iterate<Q, F>(
		&self,
		dir: Direction,
		start: Option<&Q>,
		stop: Option<&Q>,
		include_start: bool,
		mut hit: bool,
		visit: &mut F,
	) -> ControlFlow<(), bool>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		match dir {
			Direction::Ascend => {
				let index = start.map_or(0, |s| self.items.find(s).0);
				for i in index..self.items.len() {
					if !self.is_leaf() {
						hit = self.children[i].iterate(dir, start, stop, include_start, hit, visit)?;
					}
					let item = &self.items[i];
					if !include_start && !hit && start.is_some_and(|s| !(s < item.borrow())) {
						hit = true;
						continue;
					}
					hit = true;
					if stop.is_some_and(|s| !(item.borrow() < s)) {
						return ControlFlow::Break(());
					}
					if !visit(item) {
						return ControlFlow::Break(());
					}
				}
				if let Some(last) = self.children.last() {
					hit = last.iterate(dir, start, stop, include_start, hit, visit)?;
				}
			}
			Direction::Descend => {
				// Last index to visit; `None` when nothing here is <= start
				let end = match start {
					Some(s) => match self.items.find(s) {
						(i, true) => Some(i),
						(i, false) => i.checked_sub(1),
					},
					None => self.items.len().checked_sub(1),
				};
				if let Some(end) = end {
					for i in (0..=end).rev() {
						let item = &self.items[i];
						if let Some(s) = start {
							if !(item.borrow() < s) && (!include_start || hit || s < item.borrow()) {
								continue;
							}
						}
						if !self.is_leaf() {
							self.children[i + 1].iterate(dir, start, stop, include_start, hit, visit)?;
						}
						if stop.is_some_and(|s| !(s < item.borrow())) {
							return ControlFlow::Break(());
						}
						hit = true;
						if !visit(item) {
							return ControlFlow::Break(());
						}
					}
				}
				if let Some(first) = self.children.first() {
					hit = first.iterate(dir, start, stop, include_start, hit, visit)?;
				}
			}
		}
		ControlFlow::Continue(hit)
	}

	/// Retires this subtree bottom-up through `generation`.
	///
	/// Returns `false` as soon as the pool reports it is full, since walking
	/// further could not recycle anything else. Subtrees still shared with
	/// another handle are skipped.
	pub(crate) fn reset(node: Arc<Node<T>>, generation: &Generation<T>) -> bool {
		let Ok(mut node) = Arc::try_unwrap(node) else {
			return true;
		};
		for child in node.children.drain_all() {
			if !Node::reset(child, generation) {
				return false;
			}
		}
		generation.free_node(node) != Retire::PoolFull
	}
}

impl<T: Ord + Clone> Node<T> {
	/// Returns the child at `i`, copied first if this generation does not own it.
	#[inline]
	pub(crate) fn mutable_child(&mut self, i: usize, generation: &Generation<T>) -> &mut Node<T> {
		generation.make_mut(self.children.slot_mut(i))
	}

	/// Splits this node around the element at `i`.
	///
	/// After split:
	/// - `self` keeps `items[..i]` and `children[..=i]`
	/// - the returned node holds `items[i + 1..]` and `children[i + 1..]`
	/// - the returned element is the old `items[i]`, the new separator
	pub(crate) fn split(&mut self, i: usize, generation: &Generation<T>) -> (T, Node<T>) {
		let mut next = generation.new_node();
		next.items.take_tail(&mut self.items, i + 1);
		let item = self.items.pop().expect("split position must be within node bounds");
		if !self.is_leaf() {
			next.children.take_tail(&mut self.children, i + 1);
		}
		(item, next)
	}

	/// Splits `children[i]` if it is full, promoting its median into this node.
	///
	/// Returns `true` if a split happened.
	fn maybe_split_child(&mut self, i: usize, max_items: usize, generation: &Generation<T>) -> bool {
		if self.children[i].items.len() < max_items {
			return false;
		}
		let (item, second) = self.mutable_child(i, generation).split(max_items / 2, generation);
		self.items.insert_at(i, item);
		self.children.insert_at(i + 1, Arc::new(second));
		true
	}

	/// Inserts `item` into this subtree, replacing an equal element if present.
	///
	/// Full children are split before descending into them, so the leaf that
	/// finally receives the element always has room for it. The caller must
	/// ensure that this node itself is not full.
	///
	/// # Returns
	///
	/// The replaced element, or `None` if the subtree grew by one.
	pub(crate) fn insert(
		&mut self,
		item: T,
		max_items: usize,
		generation: &Generation<T>,
	) -> Option<T> {
		let (mut i, found) = self.items.find(&item);
		if found {
			return Some(self.items.replace(i, item));
		}
		if self.is_leaf() {
			self.items.insert_at(i, item);
			return None;
		}
		if self.maybe_split_child(i, max_items, generation) {
			let in_tree = &self.items[i];
			if item < *in_tree {
				// Stay left of the promoted median
			} else if *in_tree < item {
				i += 1;
			} else {
				return Some(self.items.replace(i, item));
			}
		}
		self.mutable_child(i, generation).insert(item, max_items, generation)
	}

	/// Removes the targeted element from this subtree.
	///
	/// Before descending into a child that holds only `min_items` elements,
	/// the child is grown by stealing from a sibling or merging with one, so a
	/// removal never leaves a non-root node under-full.
	pub(crate) fn remove<Q>(
		&mut self,
		target: Remove<'_, Q>,
		min_items: usize,
		generation: &Generation<T>,
	) -> Option<T>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let (i, found) = match target {
			Remove::Max => {
				if self.is_leaf() {
					return self.items.pop();
				}
				(self.items.len(), false)
			}
			Remove::Min => {
				if self.is_leaf() {
					return (!self.items.is_empty()).then(|| self.items.remove_at(0));
				}
				(0, false)
			}
			Remove::Item(key) => {
				let (i, found) = self.items.find(key);
				if self.is_leaf() {
					return found.then(|| self.items.remove_at(i));
				}
				(i, found)
			}
		};

		if self.children[i].items.len() <= min_items {
			return self.grow_child_and_remove(i, target, min_items, generation);
		}

		let child = self.mutable_child(i, generation);
		if found {
			// The match lives here; pull its predecessor up from the rightmost
			// leaf of the left subtree to take its place
			let predecessor = child
				.remove(Remove::<Q>::Max, min_items, generation)
				.expect("child with spare elements has a maximum");
			return Some(self.items.replace(i, predecessor));
		}
		child.remove(target, min_items, generation)
	}

	/// Grows `children[i]` above `min_items` elements, then retries the removal.
	///
	/// Policy, in this order:
	/// 1. Steal from the left sibling if it has elements to spare.
	/// 2. Steal from the right sibling if it has elements to spare.
	/// 3. Merge with a sibling. The child is merged with its right neighbour,
	///    or with its left one when it is the last child.
	///
	/// ```text
	/// steal left:      [ a | P | . ]          [ a' | a | . ]
	///                   /    |                  /     |
	///            [.. a' a]  [b ..]  ==>   [.. a']  [P b ..]
	///
	/// merge:           [ P ]                  [ ]
	///                 /     \                  |
	///             [a ..]   [b ..]   ==>   [a .. P b ..]
	/// ```
	///
	/// The second pass through [`Node::remove`] always finds a child that can
	/// afford to lose an element.
	fn grow_child_and_remove<Q>(
		&mut self,
		mut i: usize,
		target: Remove<'_, Q>,
		min_items: usize,
		generation: &Generation<T>,
	) -> Option<T>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		if i > 0 && self.children[i - 1].items.len() > min_items {
			// Steal from the left sibling
			let (stolen, stolen_child) = {
				let left = self.mutable_child(i - 1, generation);
				let item = left.items.pop().expect("left sibling has elements to spare");
				(item, left.children.pop())
			};
			let separator = self.items.replace(i - 1, stolen);
			let child = self.mutable_child(i, generation);
			child.items.insert_at(0, separator);
			if let Some(grandchild) = stolen_child {
				child.children.insert_at(0, grandchild);
			}
		} else if i < self.items.len() && self.children[i + 1].items.len() > min_items {
			// Steal from the right sibling
			let (stolen, stolen_child) = {
				let right = self.mutable_child(i + 1, generation);
				let item = right.items.remove_at(0);
				let grandchild = (!right.is_leaf()).then(|| right.children.remove_at(0));
				(item, grandchild)
			};
			let separator = self.items.replace(i, stolen);
			let child = self.mutable_child(i, generation);
			child.items.push(separator);
			if let Some(grandchild) = stolen_child {
				child.children.push(grandchild);
			}
		} else {
			// Merge children[i] with children[i + 1]
			if i >= self.items.len() {
				i -= 1;
			}
			let separator = self.items.remove_at(i);
			let sibling = self.children.remove_at(i + 1);
			let child = self.mutable_child(i, generation);
			child.items.push(separator);
			match Arc::try_unwrap(sibling) {
				Ok(mut sibling) => {
					child.items.append(&mut sibling.items);
					child.children.append(&mut sibling.children);
					generation.free_node(sibling);
				}
				Err(shared) => {
					// Still visible to another handle: copy, leave it intact
					child.items.extend_cloned(&shared.items);
					child.children.extend_cloned(&shared.children);
				}
			}
			trace_log!(index = i, items = child.items.len(), "merged sibling nodes");
		}
		self.remove(target, min_items, generation)
	}
}
