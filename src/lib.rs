//! # Cowtree: An In-Memory B-Tree with Copy-on-Write Snapshots
//!
//! This crate provides an ordered set built on a classic B-tree, where every
//! node stores its elements in sorted order and internal nodes carry one more
//! child than elements. It supports logarithmic insertion, deletion and lookup,
//! min/max queries, and bounded iteration in both directions.
//!
//! On top of that, [`Tree::clone`] takes an **O(1) snapshot**: it returns a
//! second, fully independent and mutable tree that shares every node with the
//! original until one of the two writes to it.
//!
//! ## Design Overview
//!
//! ### Key Concepts
//!
//! **Degree**: A tree of degree `d` keeps between `d - 1` and `2d - 1` elements
//! in every node except the root. Full nodes are split on the way down during
//! insertion, and under-full nodes are grown (by borrowing from a sibling or
//! merging with one) on the way down during deletion. A single top-down pass
//! is therefore enough for every write.
//!
//! **Generations**: Each tree writes through a generation token, and each node
//! remembers the generation that created it. A node is changed in place only
//! if it carries the writer's generation and nobody else holds a reference to
//! it. Any other node is replaced by a private copy first. Cloning a tree hands
//! both handles fresh generations, so every node that existed before the clone
//! becomes read-only to both of them.
//!
//! **Node Pool**: Nodes that fall out of a tree (after merges, root collapses,
//! or [`Tree::clear`]) are emptied and parked in a bounded [`NodePool`], from
//! which new nodes are drawn. Pools can be shared between trees.
//!
//! ### Tree Structure
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │         Tree         │  <- degree, length, generation
//!                 └──────────┬───────────┘
//!                            │ Arc
//!                            ▼
//!                 ┌──────────────────────┐
//!                 │   [ 20  |  40 ]      │  <- internal node
//!                 └──┬───────┬────────┬──┘
//!                    │       │        │  Arc (possibly shared with clones)
//!           ┌────────┘       │        └────────┐
//!           ▼                ▼                 ▼
//!     ┌───────────┐    ┌───────────┐     ┌───────────┐
//!     │ [5 10 15] │    │ [25 30]   │     │ [45 50]   │  <- leaves
//!     └───────────┘    └───────────┘     └───────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use cowtree::Tree;
//!
//! let mut tree = Tree::new(4).unwrap();
//!
//! for v in [5, 3, 8, 1, 9, 2, 7] {
//!     tree.insert_or_replace(v);
//! }
//! assert_eq!(tree.len(), 7);
//! assert_eq!(tree.min(), Some(&1));
//!
//! // Take a snapshot, then change the original
//! let snapshot = tree.clone();
//! tree.delete(&5);
//!
//! assert!(!tree.contains(&5));
//! assert!(snapshot.contains(&5));
//!
//! // Visit 2 <= x < 8
//! let mut seen = vec![];
//! snapshot.ascend_range(&2, &8, |v| {
//!     seen.push(*v);
//!     true
//! });
//! assert_eq!(seen, vec![2, 3, 5, 7]);
//! ```
//!
//! ## Thread Safety
//!
//! A single tree handle is not meant to be written from several threads at
//! once; `&mut self` on every write enforces this. Handles produced by
//! [`Tree::clone`] are `Send + Sync` (for `T: Send + Sync`) and can be read and
//! written on different threads without further synchronization. The node pool
//! they share is protected by its own lock.

#[macro_use]
mod tracing_helpers;

#[cfg(feature = "test-utils")]
pub mod alloc;
pub mod error;
pub mod iter;
mod list;
mod node;
mod pool;
mod sync;

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

pub use error::{Error, Result};
pub use iter::Iter;
pub use pool::{NodePool, DEFAULT_POOL_CAPACITY};

use node::{Direction, Node, Remove};
use pool::Generation;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default branching factor used by [`Config::default`].
///
/// Nodes of a degree-32 tree hold up to 63 elements, which keeps trees
/// shallow while splits and merges still move only short arrays.
pub const DEFAULT_DEGREE: usize = 32;

/// Smallest accepted degree.
pub const MIN_DEGREE: usize = 2;

/// Largest accepted degree. Node capacity is `2 * degree - 1`.
pub const MAX_DEGREE: usize = usize::MAX / 2;

/// Construction parameters for a [`Tree`] with its own private pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// Branching factor. Must be at least 2 and at most `usize::MAX / 2`.
	pub degree: usize,
	/// Number of retired nodes the tree's pool keeps for reuse.
	pub pool_capacity: usize,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			degree: DEFAULT_DEGREE,
			pool_capacity: DEFAULT_POOL_CAPACITY,
		}
	}
}

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An ordered set stored in a B-tree with copy-on-write snapshots.
///
/// Elements order themselves through [`Ord`]; two elements are considered the
/// same element when neither is less than the other. Inserting an element
/// equal to one already present replaces it.
///
/// # Type Parameters
///
/// - `T`: The element type. Must implement `Ord + Clone`. Elements are cloned
///   only when a node shared with another handle has to be copied, so large
///   elements are best stored behind an `Arc`.
pub struct Tree<T> {
	/// Branching factor, between 2 and `usize::MAX / 2`.
	degree: usize,
	/// Number of elements stored.
	length: usize,
	/// Root node. `None` exactly when the tree is empty.
	root: Option<Arc<Node<T>>>,
	/// Write epoch deciding which nodes may be changed in place.
	generation: Generation<T>,
}

impl<T> Tree<T> {
	// -----------------------------------------------------------------------
	// Construction
	// -----------------------------------------------------------------------

	/// Creates an empty tree of the given degree with a private node pool of
	/// [`DEFAULT_POOL_CAPACITY`].
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidDegree`] if `degree <= 1` or
	/// `degree > usize::MAX / 2`, where `2 * degree - 1` would overflow.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::{Error, Tree};
	///
	/// let tree: Tree<u64> = Tree::new(2).unwrap();
	/// assert!(tree.is_empty());
	///
	/// assert_eq!(Tree::<u64>::new(1).err(), Some(Error::InvalidDegree(1)));
	/// ```
	pub fn new(degree: usize) -> Result<Self> {
		Self::with_pool(degree, Arc::new(NodePool::default()))
	}

	/// Creates an empty tree from a [`Config`].
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidDegree`] if `config.degree` is outside
	/// `2..=usize::MAX / 2`.
	pub fn with_config(config: Config) -> Result<Self> {
		Self::with_pool(config.degree, Arc::new(NodePool::new(config.pool_capacity)))
	}

	/// Creates an empty tree that draws nodes from, and retires nodes to,
	/// the given pool.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidDegree`] if `degree <= 1` or
	/// `degree > usize::MAX / 2`, where `2 * degree - 1` would overflow.
	pub fn with_pool(degree: usize, pool: Arc<NodePool<T>>) -> Result<Self> {
		if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
			return Err(Error::InvalidDegree(degree));
		}
		Ok(Self::from_parts(degree, pool))
	}

	fn from_parts(degree: usize, pool: Arc<NodePool<T>>) -> Self {
		Tree {
			degree,
			length: 0,
			root: None,
			generation: Generation::new(pool),
		}
	}

	// -----------------------------------------------------------------------
	// Tree Metadata
	// -----------------------------------------------------------------------

	/// Returns the branching factor this tree was built with.
	pub fn degree(&self) -> usize {
		self.degree
	}

	/// Returns the number of elements in the tree.
	pub fn len(&self) -> usize {
		self.length
	}

	/// Returns `true` if the tree holds no elements.
	pub fn is_empty(&self) -> bool {
		self.length == 0
	}

	/// Returns the number of node levels: 0 when empty, 1 for a lone leaf.
	pub fn height(&self) -> usize {
		let mut height = 0;
		let mut node = self.root.as_deref();
		while let Some(n) = node {
			height += 1;
			node = n.children.first().map(|c| &**c);
		}
		height
	}

	/// Returns the pool this tree recycles nodes through.
	pub fn pool(&self) -> &Arc<NodePool<T>> {
		self.generation.pool()
	}

	/// Maximum number of elements per node.
	#[inline]
	fn max_items(&self) -> usize {
		self.degree * 2 - 1
	}

	/// Minimum number of elements per non-root node.
	#[inline]
	fn min_items(&self) -> usize {
		self.degree - 1
	}

	// -----------------------------------------------------------------------
	// Lookups
	// -----------------------------------------------------------------------

	/// Returns the element equal to `key`, if any.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::Tree;
	///
	/// let mut tree = Tree::new(2).unwrap();
	/// tree.insert_or_replace("apple".to_string());
	///
	/// assert_eq!(tree.get("apple").map(String::as_str), Some("apple"));
	/// assert_eq!(tree.get("pear"), None);
	/// ```
	pub fn get<Q>(&self, key: &Q) -> Option<&T>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.root.as_deref()?.get(key)
	}

	/// Returns `true` if an element equal to `key` is present.
	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.get(key).is_some()
	}

	/// Returns the smallest element.
	pub fn min(&self) -> Option<&T> {
		self.root.as_deref()?.min()
	}

	/// Returns the largest element.
	pub fn max(&self) -> Option<&T> {
		self.root.as_deref()?.max()
	}

	// -----------------------------------------------------------------------
	// Iteration
	// -----------------------------------------------------------------------

	/// Returns an iterator over all elements in ascending order.
	pub fn iter(&self) -> Iter<'_, T> {
		Iter::new(self.root.as_deref(), self.length)
	}

	/// Shared driver of the `ascend*`/`descend*` family.
	fn walk<Q, F>(
		&self,
		dir: Direction,
		start: Option<&Q>,
		stop: Option<&Q>,
		include_start: bool,
		mut visit: F,
	) where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		if let Some(root) = &self.root {
			let _ = root.iterate(dir, start, stop, include_start, false, &mut visit);
		}
	}

	/// Calls `visit` on every element in ascending order until it returns
	/// `false`.
	pub fn ascend<F>(&self, visit: F)
	where
		T: Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk::<T, F>(Direction::Ascend, None, None, false, visit);
	}

	/// Calls `visit` in ascending order on every element in
	/// `[greater_or_equal, less_than)` until it returns `false`.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::Tree;
	///
	/// let mut tree = Tree::new(2).unwrap();
	/// tree.extend(0..10);
	///
	/// let mut seen = vec![];
	/// tree.ascend_range(&3, &6, |v| {
	///     seen.push(*v);
	///     true
	/// });
	/// assert_eq!(seen, vec![3, 4, 5]);
	/// ```
	pub fn ascend_range<Q, F>(&self, greater_or_equal: &Q, less_than: &Q, visit: F)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk(Direction::Ascend, Some(greater_or_equal), Some(less_than), true, visit);
	}

	/// Calls `visit` in ascending order on every element below `pivot` until
	/// it returns `false`.
	pub fn ascend_less_than<Q, F>(&self, pivot: &Q, visit: F)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk(Direction::Ascend, None, Some(pivot), false, visit);
	}

	/// Calls `visit` in ascending order on every element at or above `pivot`
	/// until it returns `false`.
	pub fn ascend_greater_or_equal<Q, F>(&self, pivot: &Q, visit: F)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk(Direction::Ascend, Some(pivot), None, true, visit);
	}

	/// Calls `visit` on every element in descending order until it returns
	/// `false`.
	pub fn descend<F>(&self, visit: F)
	where
		T: Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk::<T, F>(Direction::Descend, None, None, false, visit);
	}

	/// Calls `visit` in descending order on every element in
	/// `(greater_than, less_or_equal]` until it returns `false`.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::Tree;
	///
	/// let mut tree = Tree::new(2).unwrap();
	/// tree.extend(0..10);
	///
	/// let mut seen = vec![];
	/// tree.descend_range(&6, &3, |v| {
	///     seen.push(*v);
	///     true
	/// });
	/// assert_eq!(seen, vec![6, 5, 4]);
	/// ```
	pub fn descend_range<Q, F>(&self, less_or_equal: &Q, greater_than: &Q, visit: F)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk(Direction::Descend, Some(less_or_equal), Some(greater_than), true, visit);
	}

	/// Calls `visit` in descending order on every element at or below `pivot`
	/// until it returns `false`.
	pub fn descend_less_or_equal<Q, F>(&self, pivot: &Q, visit: F)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk(Direction::Descend, Some(pivot), None, true, visit);
	}

	/// Calls `visit` in descending order on every element above `pivot` until
	/// it returns `false`.
	pub fn descend_greater_than<Q, F>(&self, pivot: &Q, visit: F)
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
		F: FnMut(&T) -> bool,
	{
		self.walk(Direction::Descend, None, Some(pivot), false, visit);
	}

	// -----------------------------------------------------------------------
	// Clearing and Cloning
	// -----------------------------------------------------------------------

	/// Removes every element.
	///
	/// With `return_nodes_to_pool == false` the root is simply dropped, and
	/// nodes no other handle shares are freed with it. With `true`, the nodes
	/// owned by this tree are emptied and offered to the pool, stopping as
	/// soon as the pool is full; the rest are dropped.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::Tree;
	///
	/// let mut tree = Tree::new(2).unwrap();
	/// tree.extend(0..100);
	///
	/// tree.clear(true);
	/// assert!(tree.is_empty());
	/// assert!(!tree.pool().is_empty());
	/// ```
	pub fn clear(&mut self, return_nodes_to_pool: bool) {
		if let Some(root) = self.root.take() {
			if return_nodes_to_pool && !Node::reset(root, &self.generation) {
				debug_log!(
					capacity = self.generation.pool().capacity(),
					"node pool filled up while clearing tree"
				);
			}
		}
		self.length = 0;
	}

	/// Takes an O(1) snapshot of the tree.
	///
	/// Both `self` and the returned tree move to brand-new generations, so all
	/// nodes existing at this point become read-only for both. Each handle
	/// copies a node the first time it writes to it, and never sees the
	/// other's changes.
	///
	/// This takes `&mut self` because the original handle's generation has to
	/// change too.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::Tree;
	///
	/// let mut original = Tree::new(2).unwrap();
	/// original.extend(1..=100);
	///
	/// let mut copy = original.clone();
	/// copy.insert_or_replace(200);
	/// original.delete(&50);
	///
	/// assert_eq!(original.len(), 99);
	/// assert!(!original.contains(&200));
	/// assert!(copy.contains(&50));
	/// ```
	#[allow(clippy::should_implement_trait)]
	pub fn clone(&mut self) -> Self {
		let theirs = self.generation.fork();
		self.generation = self.generation.fork();
		debug_log!(
			generation = self.generation.id(),
			cloned = theirs.id(),
			len = self.length,
			"cloned tree"
		);
		Tree {
			degree: self.degree,
			length: self.length,
			root: self.root.clone(),
			generation: theirs,
		}
	}
}

impl<T: Ord + Clone> Tree<T> {
	// -----------------------------------------------------------------------
	// Insertion
	// -----------------------------------------------------------------------

	/// Adds `item` to the tree.
	///
	/// If an equal element is already present it is replaced and returned;
	/// otherwise the tree grows by one and `None` is returned.
	///
	/// # Example
	///
	/// ```
	/// use cowtree::Tree;
	///
	/// let mut tree = Tree::new(2).unwrap();
	/// assert_eq!(tree.insert_or_replace(1), None);
	/// assert_eq!(tree.insert_or_replace(1), Some(1));
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn insert_or_replace(&mut self, item: T) -> Option<T> {
		let max_items = self.max_items();
		let Some(mut root) = self.root.take() else {
			let mut node = self.generation.new_node();
			node.items.push(item);
			self.root = Some(Arc::new(node));
			self.length += 1;
			return None;
		};

		let node = self.generation.make_mut(&mut root);
		if node.items.len() >= max_items {
			// Full root: split it and grow the tree by one level
			let (median, second) = node.split(max_items / 2, &self.generation);
			let mut new_root = self.generation.new_node();
			new_root.items.push(median);
			new_root.children.push(root);
			new_root.children.push(Arc::new(second));
			root = Arc::new(new_root);
			debug_log!(len = self.length, "split root node");
		}

		let out = self.generation.make_mut(&mut root).insert(item, max_items, &self.generation);
		self.root = Some(root);
		if out.is_none() {
			self.length += 1;
		}
		out
	}

	// -----------------------------------------------------------------------
	// Deletion
	// -----------------------------------------------------------------------

	/// Removes and returns the element equal to `key`, if any.
	///
	/// Deleting an absent key leaves the tree untouched: no node is
	/// rebalanced, and no node shared with a clone is copied.
	pub fn delete<Q>(&mut self, key: &Q) -> Option<T>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		if !self.contains(key) {
			return None;
		}
		self.delete_item(Remove::Item(key))
	}

	/// Removes and returns the smallest element.
	pub fn delete_min(&mut self) -> Option<T> {
		self.delete_item(Remove::<T>::Min)
	}

	/// Removes and returns the largest element.
	pub fn delete_max(&mut self) -> Option<T> {
		self.delete_item(Remove::<T>::Max)
	}

	fn delete_item<Q>(&mut self, target: Remove<'_, Q>) -> Option<T>
	where
		T: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let min_items = self.min_items();
		let mut root = self.root.take()?;
		let out = self.generation.make_mut(&mut root).remove(target, min_items, &self.generation);

		if root.items.is_empty() {
			// Either the last element is gone, or a merge drained the root
			// into its only child, which takes over
			let only_child = self.generation.make_mut(&mut root).children.pop();
			self.generation.retire(root);
			if only_child.is_some() {
				debug_log!(len = self.length, "collapsed root node");
			}
			self.root = only_child;
		} else {
			self.root = Some(root);
		}

		if out.is_some() {
			self.length -= 1;
		}
		out
	}
}

impl<T> Default for Tree<T> {
	/// An empty tree built from [`Config::default`].
	fn default() -> Self {
		Self::from_parts(DEFAULT_DEGREE, Arc::new(NodePool::default()))
	}
}

impl<T: Ord + Clone> Extend<T> for Tree<T> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		for item in iter {
			self.insert_or_replace(item);
		}
	}
}

impl<T: Ord + Clone> FromIterator<T> for Tree<T> {
	/// Builds a tree of [`DEFAULT_DEGREE`] from the elements; later duplicates
	/// replace earlier ones.
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut tree = Tree::default();
		tree.extend(iter);
		tree
	}
}

impl<'a, T> IntoIterator for &'a Tree<T> {
	type Item = &'a T;
	type IntoIter = Iter<'a, T>;

	fn into_iter(self) -> Iter<'a, T> {
		self.iter()
	}
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

// ===========================================================================
// Test-Only Validation Module
// ===========================================================================

/// Invariant validation for testing.
#[cfg(any(test, feature = "test-utils"))]
impl<T: Ord + fmt::Debug> Tree<T> {
	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Occupancy: every node holds at most `2d - 1` elements, every
	///    non-root node at least `d - 1`, and the root at least one
	/// 2. Shape: internal nodes have exactly one more child than elements
	/// 3. Ordering: elements strictly increase within each node
	/// 4. Separation: every subtree lies strictly between its separators
	/// 5. Balance: all leaves sit at the same depth
	/// 6. Length: the element count matches the stored length
	pub fn assert_invariants(&self) {
		let Some(root) = &self.root else {
			assert_eq!(self.length, 0, "Empty tree reports length {}", self.length);
			return;
		};
		assert!(!root.items.is_empty(), "Root node is empty but still installed");

		let mut leaf_depth = None;
		let counted = self.validate_node_recursive(root, 0, None, None, &mut leaf_depth);
		assert_eq!(counted, self.length, "Counted {} elements, tree reports {}", counted, self.length);
	}

	/// Recursively validates a node and its subtree, returning its element count.
	///
	/// # Arguments
	/// * `level` - Current level (0 = root)
	/// * `lower` - Exclusive lower bound from the parent, None if leftmost
	/// * `upper` - Exclusive upper bound from the parent, None if rightmost
	/// * `leaf_depth` - Depth of the first leaf seen, shared by the whole walk
	fn validate_node_recursive(
		&self,
		node: &Node<T>,
		level: usize,
		lower: Option<&T>,
		upper: Option<&T>,
		leaf_depth: &mut Option<usize>,
	) -> usize {
		let len = node.items.len();

		// Invariant 1: Occupancy
		assert!(len <= self.max_items(), "Node at level {} holds {} > {} elements", level, len, self.max_items());
		if level > 0 {
			assert!(
				len >= self.min_items(),
				"Node at level {} holds {} < {} elements: {:?}",
				level,
				len,
				self.min_items(),
				node.items
			);
		}

		// Invariant 3: Ordering
		for i in 1..len {
			assert!(
				node.items[i - 1] < node.items[i],
				"Elements not sorted at positions {} and {}: {:?} >= {:?}",
				i - 1,
				i,
				node.items[i - 1],
				node.items[i]
			);
		}

		// Invariant 4: Separation
		if let (Some(lower), Some(first)) = (lower, node.items.first()) {
			assert!(lower < first, "Element {:?} not above separator {:?}", first, lower);
		}
		if let (Some(upper), Some(last)) = (upper, node.items.last()) {
			assert!(last < upper, "Element {:?} not below separator {:?}", last, upper);
		}

		if node.is_leaf() {
			// Invariant 5: Balance
			match *leaf_depth {
				None => *leaf_depth = Some(level),
				Some(depth) => assert_eq!(depth, level, "Leaves found at depths {} and {}", depth, level),
			}
			return len;
		}

		// Invariant 2: Shape
		assert_eq!(
			node.children.len(),
			len + 1,
			"Internal node at level {} has {} elements but {} children",
			level,
			len,
			node.children.len()
		);

		let mut count = len;
		for (i, child) in node.children.iter().enumerate() {
			let child_lower = if i == 0 { lower } else { Some(&node.items[i - 1]) };
			let child_upper = if i == len { upper } else { Some(&node.items[i]) };
			count += self.validate_node_recursive(child, level + 1, child_lower, child_upper, leaf_depth);
		}
		count
	}
}
