//! Node recycling and copy-on-write ownership.
//!
//! ## Node Pool
//!
//! A [`NodePool`] is a bounded stack of retired, emptied nodes. Handing a
//! retired node out again saves the element and child buffers it had already
//! grown. The pool is the only structure touched by several tree handles at
//! once, so a single mutex serializes `acquire` and `release`. Each call holds
//! it for O(1).
//!
//! ## Generations
//!
//! Every node is tagged with the id of the [`Generation`] that created it. A
//! tree writes through exactly one generation at a time, and may change a node
//! in place only when:
//!
//! 1. the node's tag matches the tree's generation, and
//! 2. the tree holds the only reference to it.
//!
//! Any other node is potentially visible to another tree handle. It is first
//! replaced with a shallow copy: the elements are cloned, the child references
//! are duplicated, and the subtrees below stay shared until they are written
//! to themselves.
//!
//! ```text
//!   clone()            tree A (gen 2)       tree B (gen 3)
//!                           │                    │
//!                           └───────┬────────────┘
//!                                   ▼
//!                              root (gen 1)       <- foreign to both
//!
//!   A.insert(..)       tree A (gen 2)       tree B (gen 3)
//!                           │                    │
//!                           ▼                    ▼
//!                      root' (gen 2)        root (gen 1)
//!                        │    └──────┬─────────┘  │
//!                        ▼           ▼            ▼
//!                    leaf' (gen 2)  leaf (gen 1)  leaf (gen 1)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::node::Node;
use crate::sync::Mutex;

/// Default number of retired nodes a pool keeps for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 32;

/// Tag carried by nodes sitting in a pool. No generation ever uses it.
pub(crate) const NO_GENERATION: u64 = 0;

/// Source of generation ids. Ids are never reused, so a stale tag can never
/// be mistaken for a live generation.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(NO_GENERATION + 1);

// ---------------------------------------------------------------------------
// NodePool
// ---------------------------------------------------------------------------

/// A capacity-bounded pool of retired node storage.
///
/// Pools can be shared between unrelated trees through an `Arc`, which lets
/// them recycle each other's retired nodes:
///
/// ```
/// use cowtree::{NodePool, Tree};
/// use std::sync::Arc;
///
/// let pool = Arc::new(NodePool::new(64));
/// let mut a: Tree<u32> = Tree::with_pool(4, Arc::clone(&pool)).unwrap();
/// let mut b: Tree<u32> = Tree::with_pool(4, Arc::clone(&pool)).unwrap();
///
/// a.extend(0..1000);
/// a.clear(true);
/// assert!(!pool.is_empty());
///
/// // `b` now builds its nodes from storage `a` gave back
/// b.extend(0..1000);
/// assert_eq!(b.len(), 1000);
/// ```
pub struct NodePool<T> {
	/// Maximum number of retired nodes kept.
	capacity: usize,
	/// Retired nodes, most recently released last.
	nodes: Mutex<Vec<Node<T>>>,
}

impl<T> NodePool<T> {
	/// Creates an empty pool that keeps up to `capacity` retired nodes.
	///
	/// A capacity of zero is allowed and turns recycling off: every release
	/// is refused and every acquire allocates.
	pub fn new(capacity: usize) -> Self {
		NodePool {
			capacity,
			nodes: Mutex::new(Vec::with_capacity(capacity)),
		}
	}

	/// Returns the maximum number of nodes this pool retains.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Returns the number of retired nodes currently waiting for reuse.
	pub fn len(&self) -> usize {
		self.nodes.lock().len()
	}

	/// Returns `true` if no retired node is available.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Hands out the most recently retired node, or a freshly allocated one.
	pub(crate) fn acquire(&self) -> Node<T> {
		// The guard is released at the end of this statement, so a fresh
		// allocation never happens under the lock
		let recycled = self.nodes.lock().pop();
		recycled.unwrap_or_else(Node::new)
	}

	/// Offers an emptied node back to the pool.
	///
	/// Returns `true` if the node was kept, `false` if the pool is already at
	/// capacity, in which case the node is simply dropped.
	pub(crate) fn release(&self, node: Node<T>) -> bool {
		debug_assert!(node.items.is_empty() && node.children.is_empty());
		let mut nodes = self.nodes.lock();
		if nodes.len() < self.capacity {
			nodes.push(node);
			true
		} else {
			false
		}
	}
}

impl<T> Default for NodePool<T> {
	fn default() -> Self {
		Self::new(DEFAULT_POOL_CAPACITY)
	}
}

impl<T> fmt::Debug for NodePool<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodePool")
			.field("capacity", &self.capacity)
			.field("len", &self.len())
			.finish()
	}
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Outcome of retiring a node through a [`Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retire {
	/// The node was emptied and parked in the pool.
	Stored,
	/// The node was emptied but the pool had no room, so it was dropped.
	PoolFull,
	/// The node belongs to another generation (or is still shared) and was
	/// left untouched.
	NotOwned,
}

/// A write epoch: the identity shared by every node a tree may mutate in place.
pub(crate) struct Generation<T> {
	id: u64,
	pool: Arc<NodePool<T>>,
}

impl<T> Generation<T> {
	/// Starts a new generation drawing nodes from `pool`.
	pub(crate) fn new(pool: Arc<NodePool<T>>) -> Self {
		Generation {
			id: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
			pool,
		}
	}

	/// Returns a new generation backed by the same pool.
	///
	/// Nodes tagged with `self` are foreign to the result.
	pub(crate) fn fork(&self) -> Self {
		Self::new(Arc::clone(&self.pool))
	}

	#[inline]
	pub(crate) fn id(&self) -> u64 {
		self.id
	}

	pub(crate) fn pool(&self) -> &Arc<NodePool<T>> {
		&self.pool
	}

	/// Takes an empty node from the pool and tags it with this generation.
	pub(crate) fn new_node(&self) -> Node<T> {
		let mut node = self.pool.acquire();
		node.generation = self.id;
		node
	}

	/// Returns `true` if `node` may be modified in place by this generation.
	#[inline]
	pub(crate) fn owns(&self, node: &mut Arc<Node<T>>) -> bool {
		node.generation == self.id() && Arc::get_mut(node).is_some()
	}

	/// Makes the node behind `node` safe to modify and returns it.
	///
	/// A node this generation already owns is returned as is. Anything else is
	/// replaced in `node` by a shallow copy tagged with this generation; the
	/// original is left untouched for whichever tree still refers to it.
	pub(crate) fn make_mut<'a>(&self, node: &'a mut Arc<Node<T>>) -> &'a mut Node<T>
	where
		T: Clone,
	{
		if !self.owns(node) {
			trace_log!(
				from = node.generation,
				to = self.id,
				items = node.items.len(),
				"copying shared node before write"
			);
			let mut copy = self.new_node();
			copy.items.extend_cloned(&node.items);
			copy.children.extend_cloned(&node.children);
			*node = Arc::new(copy);
		}
		Arc::get_mut(node).expect("a node owned by this generation is uniquely referenced")
	}

	/// Empties `node` and offers it to the pool if this generation owns it.
	pub(crate) fn free_node(&self, mut node: Node<T>) -> Retire {
		if node.generation != self.id {
			return Retire::NotOwned;
		}
		node.clear();
		if self.pool.release(node) {
			Retire::Stored
		} else {
			trace_log!(capacity = self.pool.capacity(), "node pool full, dropping node");
			Retire::PoolFull
		}
	}

	/// Retires a node that is no longer reachable from this generation's tree.
	///
	/// A node another handle still refers to is never recycled.
	pub(crate) fn retire(&self, node: Arc<Node<T>>) -> Retire {
		match Arc::try_unwrap(node) {
			Ok(node) => self.free_node(node),
			Err(_) => Retire::NotOwned,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn leaf(generation: &Generation<i32>, values: &[i32]) -> Arc<Node<i32>> {
		let mut node = generation.new_node();
		for v in values {
			node.items.push(*v);
		}
		Arc::new(node)
	}

	#[test]
	fn acquire_allocates_when_empty() {
		let pool: NodePool<i32> = NodePool::new(4);
		let node = pool.acquire();
		assert!(node.items.is_empty());
		assert!(node.children.is_empty());
		assert_eq!(node.generation, NO_GENERATION);
	}

	#[test]
	fn release_respects_capacity() {
		let pool: NodePool<i32> = NodePool::new(2);
		assert!(pool.release(Node::new()));
		assert!(pool.release(Node::new()));
		assert!(!pool.release(Node::new()));
		assert!(!pool.release(Node::new()));
		assert_eq!(pool.len(), 2);

		let _ = pool.acquire();
		assert_eq!(pool.len(), 1);
	}

	#[test]
	fn zero_capacity_pool_refuses_everything() {
		let pool: NodePool<i32> = NodePool::new(0);
		assert!(!pool.release(Node::new()));
		assert!(pool.is_empty());
	}

	#[test]
	fn default_pool_capacity() {
		let pool: NodePool<i32> = NodePool::default();
		assert_eq!(pool.capacity(), DEFAULT_POOL_CAPACITY);
	}

	#[test]
	fn concurrent_release_never_exceeds_capacity() {
		let pool: Arc<NodePool<i32>> = Arc::new(NodePool::new(8));
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let pool = Arc::clone(&pool);
				std::thread::spawn(move || {
					for _ in 0..100 {
						pool.release(Node::new());
						if pool.len() > 4 {
							let _ = pool.acquire();
						}
					}
				})
			})
			.collect();
		for h in handles {
			h.join().unwrap();
		}
		assert!(pool.len() <= 8);
	}

	#[test]
	fn generations_are_distinct() {
		let generation: Generation<i32> = Generation::new(Arc::new(NodePool::default()));
		let forked = generation.fork();
		assert_ne!(generation.id(), forked.id());
		assert!(Arc::ptr_eq(generation.pool(), forked.pool()));
	}

	#[test]
	fn make_mut_keeps_owned_node() {
		let generation: Generation<i32> = Generation::new(Arc::new(NodePool::default()));
		let mut node = leaf(&generation, &[1, 2, 3]);
		let before = Arc::as_ptr(&node);

		generation.make_mut(&mut node).items.push(4);
		assert_eq!(Arc::as_ptr(&node), before);
		assert_eq!(&node.items[..], &[1, 2, 3, 4]);
	}

	#[test]
	fn make_mut_copies_foreign_node() {
		let old: Generation<i32> = Generation::new(Arc::new(NodePool::default()));
		let new = old.fork();
		let original = leaf(&old, &[1, 2, 3]);
		let mut handle = Arc::clone(&original);

		new.make_mut(&mut handle).items.push(4);
		assert!(!Arc::ptr_eq(&original, &handle));
		assert_eq!(&original.items[..], &[1, 2, 3]);
		assert_eq!(&handle.items[..], &[1, 2, 3, 4]);
		assert_eq!(handle.generation, new.id());
	}

	#[test]
	fn make_mut_copies_shared_node_of_same_generation() {
		let generation: Generation<i32> = Generation::new(Arc::new(NodePool::default()));
		let original = leaf(&generation, &[1]);
		let mut handle = Arc::clone(&original);

		generation.make_mut(&mut handle).items.push(2);
		assert_eq!(&original.items[..], &[1]);
		assert_eq!(&handle.items[..], &[1, 2]);
	}

	#[test]
	fn make_mut_shares_grandchildren() {
		let old: Generation<i32> = Generation::new(Arc::new(NodePool::default()));
		let new = old.fork();

		let mut parent = old.new_node();
		parent.items.push(10);
		parent.children.push(leaf(&old, &[5]));
		parent.children.push(leaf(&old, &[15]));
		let original = Arc::new(parent);
		let mut handle = Arc::clone(&original);

		let copy = new.make_mut(&mut handle);
		assert!(Arc::ptr_eq(&copy.children[0], &original.children[0]));
		assert!(Arc::ptr_eq(&copy.children[1], &original.children[1]));
	}

	#[test]
	fn retire_outcomes() {
		let pool = Arc::new(NodePool::new(1));
		let generation: Generation<i32> = Generation::new(Arc::clone(&pool));
		let other = generation.fork();

		assert_eq!(generation.retire(leaf(&generation, &[1])), Retire::Stored);
		assert_eq!(generation.retire(leaf(&generation, &[2])), Retire::PoolFull);
		assert_eq!(generation.retire(leaf(&other, &[3])), Retire::NotOwned);

		let shared = leaf(&generation, &[4]);
		let _keep = Arc::clone(&shared);
		assert_eq!(generation.retire(shared), Retire::NotOwned);

		// Stored nodes come back emptied and untagged
		let recycled = pool.acquire();
		assert!(recycled.items.is_empty());
		assert_eq!(recycled.generation, NO_GENERATION);
	}
}
