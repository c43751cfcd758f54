//! Logging macros for tree events.
//!
//! With the `tracing` feature the macros forward to the `tracing` crate,
//! otherwise they expand to nothing and their arguments are never evaluated.
//!
//! Events emitted by the crate:
//!
//! | Level | Event                           | Site                       |
//! |-------|---------------------------------|----------------------------|
//! | trace | shared node copied before write | `Generation::make_mut`     |
//! | trace | node dropped, pool at capacity  | `Generation::free_node`    |
//! | trace | sibling nodes merged            | `Node::grow_child_and_remove` |
//! | debug | root split, tree grows a level  | `Tree::insert_or_replace`  |
//! | debug | root collapsed into its child   | `Tree::delete_item`        |
//! | debug | pool filled up during `clear`   | `Tree::clear`              |
//! | debug | tree cloned into two generations| `Tree::clone`              |
//!
//! ```bash
//! cargo test --features tracing
//! ```

#![allow(unused_macros)]

/// Trace-level logging (most verbose). Compiles to no-op without `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
	($($arg:tt)*) => {
		tracing::trace!($($arg)*)
	};
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
	($($arg:tt)*) => {};
}

/// Debug-level logging. Compiles to no-op without `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
	($($arg:tt)*) => {
		tracing::debug!($($arg)*)
	};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
	($($arg:tt)*) => {};
}
