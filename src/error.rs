//! # Error Types for the Copy-on-Write B-Tree
//!
//! Almost every tree operation is total: looking up, deleting or iterating
//! over elements that are not present simply yields `None` or visits nothing.
//! The only fallible step is construction, where the branching factor is
//! validated once so that every later operation can rely on it.
//!
//! ## Error Flow
//!
//! ```text
//! Tree::new(degree) ──► degree outside 2..=usize::MAX / 2 ? ──► Err(InvalidDegree)
//!                            │
//!                            ▼ (no)
//!                     Ok(Tree) ──► insert / delete / get / iterate
//!                                  (never fail, absence is `None`)
//! ```

use thiserror::Error;

/// Errors that can occur while building a tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The requested branching factor cannot form a valid B-tree.
	///
	/// A tree of degree `d` keeps between `d - 1` and `2d - 1` elements in
	/// every non-root node. With `d <= 1` a node could hold at most a single
	/// element and would never have a median to split around, so such trees
	/// are rejected up front. Degrees above `usize::MAX / 2` are rejected
	/// too, since the node capacity `2d - 1` would not fit in a `usize`.
	#[error("invalid degree {0}: a tree needs a degree between 2 and usize::MAX / 2")]
	InvalidDegree(usize),
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
