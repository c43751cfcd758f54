//! Borrowing iterator over the elements of a [`Tree`](crate::Tree).
//!
//! The callback-driven `ascend*`/`descend*` walks on the tree stop as soon as
//! the callback asks them to. This iterator is the pull-based counterpart for
//! full ascending scans and plugs into the standard iterator adapters.
use std::iter::FusedIterator;

use crate::node::Node;

/// Position inside one node on the path from the root.
///
/// `pos` is the index of the next element of `node` to yield. For internal
/// nodes, the subtree left of that element has already been pushed.
struct Cursor<'a, T> {
	node: &'a Node<T>,
	pos: usize,
}

/// Ascending iterator over references to the elements of a tree.
///
/// Created by [`Tree::iter`](crate::Tree::iter).
pub struct Iter<'a, T> {
	/// Path from the root to the node currently being read.
	stack: Vec<Cursor<'a, T>>,
	/// Elements not yet yielded.
	remaining: usize,
}

impl<'a, T> Iter<'a, T> {
	pub(crate) fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
		let mut iter = Iter {
			stack: Vec::new(),
			remaining: len,
		};
		if let Some(root) = root {
			iter.descend_leftmost(root);
		}
		iter
	}

	/// Pushes `node` and every first child below it.
	fn descend_leftmost(&mut self, mut node: &'a Node<T>) {
		loop {
			self.stack.push(Cursor {
				node,
				pos: 0,
			});
			match node.children.first() {
				Some(first) => node = first,
				None => break,
			}
		}
	}
}

impl<'a, T> Iterator for Iter<'a, T> {
	type Item = &'a T;

	fn next(&mut self) -> Option<&'a T> {
		loop {
			let cursor = self.stack.last_mut()?;
			let node = cursor.node;
			let pos = cursor.pos;
			if pos < node.items.len() {
				cursor.pos += 1;
				if let Some(right) = node.children.get(pos + 1) {
					self.descend_leftmost(right);
				}
				self.remaining -= 1;
				return Some(&node.items[pos]);
			}
			// Node exhausted: resume in the parent
			self.stack.pop();
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
	use crate::Tree;

	#[test]
	fn empty_tree() {
		let tree: Tree<i32> = Tree::new(2).unwrap();
		assert_eq!(tree.iter().next(), None);
		assert_eq!(tree.iter().len(), 0);
	}

	#[test]
	fn yields_sorted_elements() {
		let mut tree: Tree<i32> = Tree::new(2).unwrap();
		for v in [5, 3, 8, 1, 9, 2, 7] {
			tree.insert_or_replace(v);
		}
		let collected: Vec<i32> = tree.iter().copied().collect();
		assert_eq!(collected, vec![1, 2, 3, 5, 7, 8, 9]);
	}

	#[test]
	fn exact_size_across_levels() {
		let mut tree: Tree<u32> = Tree::new(3).unwrap();
		tree.extend((0..500).rev());

		let mut iter = tree.iter();
		assert_eq!(iter.len(), 500);
		for expected in 0..500 {
			assert_eq!(iter.next(), Some(&expected));
			assert_eq!(iter.len(), (499 - expected) as usize);
		}
		assert_eq!(iter.next(), None);
		assert_eq!(iter.next(), None);
	}
}
