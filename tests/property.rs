//! # Property-Based Tests for Cowtree
//!
//! Property-based tests using proptest to systematically discover edge cases
//! through randomized inputs. These tests verify that tree invariants hold
//! across thousands of random inputs and degrees.
//!
//! ## Test Properties
//!
//! - Insert-then-get: All inserted elements must be retrievable
//! - Delete-then-get: Deleted elements must not be found
//! - Ordering: Iteration always yields strictly increasing elements
//! - Range bounds: Every directional walk matches its half-open interval
//! - Early stop: A walk visits nothing after the callback declines
//! - Snapshot isolation: Writes to one handle are invisible to its clones
//! - Oracle comparison: Behavior matches `BTreeSet`

use cowtree::Tree;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Included};

// ===========================================================================
// Strategy Helpers
// ===========================================================================

/// Degrees small enough to force frequent splits and merges.
fn degree() -> impl Strategy<Value = usize> {
	2usize..=6
}

/// Generate a vector of unique elements
fn unique_elements(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
	prop::collection::hash_set(-1000i32..1000, 0..max_len).prop_map(|s| s.into_iter().collect())
}

/// Operations that can be performed on the tree
#[derive(Debug, Clone)]
enum Op {
	Insert(i32),
	Delete(i32),
	DeleteMin,
	DeleteMax,
	Get(i32),
}

/// Generate a sequence of random operations over a narrow key space
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
	prop::collection::vec(
		prop_oneof![
			3 => (-200i32..200).prop_map(Op::Insert),
			2 => (-200i32..200).prop_map(Op::Delete),
			1 => Just(Op::DeleteMin),
			1 => Just(Op::DeleteMax),
			1 => (-200i32..200).prop_map(Op::Get),
		],
		0..max_ops,
	)
}

fn build(degree: usize, elements: &[i32]) -> Tree<i32> {
	let mut tree = Tree::new(degree).unwrap();
	tree.extend(elements.iter().copied());
	tree
}

fn ascending(tree: &Tree<i32>) -> Vec<i32> {
	let mut out = vec![];
	tree.ascend(|v| {
		out.push(*v);
		true
	});
	out
}

// ===========================================================================
// Insert and Delete Properties
// ===========================================================================

proptest! {
	/// Property: After inserting elements, each one can be found
	#[test]
	fn insert_then_get(degree in degree(), elements in prop::collection::vec(any::<i32>(), 0..500)) {
		let tree = build(degree, &elements);
		let expected: BTreeSet<i32> = elements.iter().copied().collect();

		tree.assert_invariants();
		for v in &expected {
			prop_assert_eq!(tree.get(v), Some(v), "Element {} should be present", v);
		}
		prop_assert_eq!(tree.len(), expected.len());
	}

	/// Property: After deleting an element it is gone, and the rest remain
	#[test]
	fn delete_then_get(degree in degree(), elements in unique_elements(300)) {
		let mut tree = build(degree, &elements);

		for (i, v) in elements.iter().enumerate() {
			prop_assert_eq!(tree.delete(v), Some(*v));
			prop_assert!(!tree.contains(v), "Element {} should be gone", v);
			prop_assert_eq!(tree.len(), elements.len() - i - 1);
		}
		tree.assert_invariants();
		prop_assert!(tree.is_empty());
	}

	/// Property: Deleting an absent element returns None and changes nothing
	#[test]
	fn delete_absent_returns_none(
		degree in degree(),
		existing in unique_elements(200),
		probes in unique_elements(100)
	) {
		let mut tree = build(degree, &existing);
		let before = ascending(&tree);

		for p in &probes {
			if !existing.contains(p) {
				prop_assert_eq!(tree.delete(p), None);
			}
		}
		tree.assert_invariants();
		prop_assert_eq!(ascending(&tree), before);
	}
}

// ===========================================================================
// Ordering Properties
// ===========================================================================

proptest! {
	/// Property: Ascending walks are strictly increasing, descending walks
	/// are their exact reverse
	#[test]
	fn walks_are_sorted(degree in degree(), elements in prop::collection::vec(any::<i32>(), 0..400)) {
		let tree = build(degree, &elements);

		let up = ascending(&tree);
		prop_assert!(up.windows(2).all(|w| w[0] < w[1]));

		let mut down = vec![];
		tree.descend(|v| {
			down.push(*v);
			true
		});
		down.reverse();
		prop_assert_eq!(&down, &up);

		let iterated: Vec<i32> = tree.iter().copied().collect();
		prop_assert_eq!(&iterated, &up);
	}

	/// Property: min and max agree with the extremes of iteration
	#[test]
	fn min_max_match_iteration(degree in degree(), elements in prop::collection::vec(any::<i32>(), 0..200)) {
		let tree = build(degree, &elements);
		let up = ascending(&tree);

		prop_assert_eq!(tree.min(), up.first());
		prop_assert_eq!(tree.max(), up.last());
	}
}

// ===========================================================================
// Range Properties
// ===========================================================================

proptest! {
	/// Property: Every bounded walk visits exactly its interval
	#[test]
	fn ranges_match_oracle(
		degree in degree(),
		elements in unique_elements(300),
		a in -1100i32..1100,
		b in -1100i32..1100
	) {
		let tree = build(degree, &elements);
		let oracle: BTreeSet<i32> = elements.iter().copied().collect();
		let (lo, hi) = (a.min(b), a.max(b));

		let mut seen = vec![];
		tree.ascend_range(&lo, &hi, |v| { seen.push(*v); true });
		prop_assert_eq!(seen, oracle.range(lo..hi).copied().collect::<Vec<_>>());

		let mut seen = vec![];
		tree.ascend_less_than(&a, |v| { seen.push(*v); true });
		prop_assert_eq!(seen, oracle.range(..a).copied().collect::<Vec<_>>());

		let mut seen = vec![];
		tree.ascend_greater_or_equal(&a, |v| { seen.push(*v); true });
		prop_assert_eq!(seen, oracle.range(a..).copied().collect::<Vec<_>>());

		let mut seen = vec![];
		tree.descend_range(&hi, &lo, |v| { seen.push(*v); true });
		prop_assert_eq!(
			seen,
			oracle.range((Excluded(lo), Included(hi))).rev().copied().collect::<Vec<_>>()
		);

		let mut seen = vec![];
		tree.descend_less_or_equal(&a, |v| { seen.push(*v); true });
		prop_assert_eq!(seen, oracle.range(..=a).rev().copied().collect::<Vec<_>>());

		let mut seen = vec![];
		tree.descend_greater_than(&a, |v| { seen.push(*v); true });
		prop_assert_eq!(
			seen,
			oracle.range((Excluded(a), std::ops::Bound::Unbounded)).rev().copied().collect::<Vec<_>>()
		);
	}

	/// Property: A walk stops right after the callback first returns false
	#[test]
	fn early_stop_is_immediate(
		degree in degree(),
		elements in unique_elements(300),
		limit in 1usize..50
	) {
		let tree = build(degree, &elements);
		let up = ascending(&tree);

		let mut seen = vec![];
		tree.ascend(|v| {
			seen.push(*v);
			seen.len() < limit
		});
		prop_assert_eq!(&seen[..], &up[..limit.min(up.len())]);

		let mut seen = vec![];
		tree.descend(|v| {
			seen.push(*v);
			seen.len() < limit
		});
		let down: Vec<i32> = up.iter().rev().copied().collect();
		prop_assert_eq!(&seen[..], &down[..limit.min(down.len())]);
	}
}

// ===========================================================================
// Oracle Comparison Property
// ===========================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(128))]

	/// Property: Any sequence of operations matches BTreeSet
	#[test]
	fn matches_btreeset(degree in degree(), ops in operations(400)) {
		let mut tree = Tree::new(degree).unwrap();
		let mut oracle = BTreeSet::new();

		for op in &ops {
			match *op {
				Op::Insert(v) => {
					prop_assert_eq!(tree.insert_or_replace(v).is_some(), !oracle.insert(v));
				}
				Op::Delete(v) => {
					prop_assert_eq!(tree.delete(&v), oracle.take(&v));
				}
				Op::DeleteMin => {
					prop_assert_eq!(tree.delete_min(), oracle.pop_first());
				}
				Op::DeleteMax => {
					prop_assert_eq!(tree.delete_max(), oracle.pop_last());
				}
				Op::Get(v) => {
					prop_assert_eq!(tree.get(&v), oracle.get(&v));
				}
			}
			prop_assert_eq!(tree.len(), oracle.len());
		}

		tree.assert_invariants();
		prop_assert_eq!(ascending(&tree), oracle.into_iter().collect::<Vec<_>>());
	}
}

// ===========================================================================
// Snapshot Isolation Property
// ===========================================================================

proptest! {
	#![proptest_config(ProptestConfig::with_cases(128))]

	/// Property: After a clone, each handle only ever sees its own writes
	#[test]
	fn clones_are_isolated(
		degree in degree(),
		initial in unique_elements(200),
		left_ops in operations(200),
		right_ops in operations(200)
	) {
		let mut left = build(degree, &initial);
		let mut right = left.clone();
		let mut left_oracle: BTreeSet<i32> = initial.iter().copied().collect();
		let mut right_oracle = left_oracle.clone();

		// Interleave the two handles' writes
		let longest = left_ops.len().max(right_ops.len());
		for i in 0..longest {
			for (tree, oracle, ops) in [
				(&mut left, &mut left_oracle, &left_ops),
				(&mut right, &mut right_oracle, &right_ops),
			] {
				match ops.get(i) {
					Some(Op::Insert(v)) => {
						tree.insert_or_replace(*v);
						oracle.insert(*v);
					}
					Some(Op::Delete(v)) => {
						tree.delete(v);
						oracle.remove(v);
					}
					Some(Op::DeleteMin) => {
						tree.delete_min();
						oracle.pop_first();
					}
					Some(Op::DeleteMax) => {
						tree.delete_max();
						oracle.pop_last();
					}
					Some(Op::Get(_)) | None => {}
				}
			}
		}

		left.assert_invariants();
		right.assert_invariants();
		prop_assert_eq!(ascending(&left), left_oracle.into_iter().collect::<Vec<_>>());
		prop_assert_eq!(ascending(&right), right_oracle.into_iter().collect::<Vec<_>>());
	}

	/// Property: Clearing one handle never disturbs its clone
	#[test]
	fn clear_is_isolated(degree in degree(), elements in unique_elements(300), pooled in any::<bool>()) {
		let mut tree = build(degree, &elements);
		let snapshot = tree.clone();
		let before = ascending(&snapshot);

		tree.clear(pooled);
		prop_assert!(tree.is_empty());
		snapshot.assert_invariants();
		prop_assert_eq!(ascending(&snapshot), before);
		prop_assert_eq!(snapshot.len(), elements.len());
	}
}
