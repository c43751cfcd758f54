//! Synchronization primitives with loom support.
//!
//! Under normal compilation, re-exports from parking_lot.
//! Under `cfg(loom)`, uses loom's equivalents for deterministic testing.
//!
//! # Usage
//!
//! Instead of importing directly from `parking_lot`, import from this module:
//!
//! ```ignore
//! use crate::sync::Mutex;
//! ```
//!
//! # Loom Integration
//!
//! When compiled with `--cfg loom`, this module provides a loom-compatible
//! mutex that allows deterministic testing of the node pool by exploring
//! all possible thread interleavings.

// Allow unused items - the guard type is only named under loom cfg
#![allow(unused)]

// ===========================================================================
// Mutex
// ===========================================================================

// Note: parking_lot::Mutex and loom::sync::Mutex have different APIs.
// parking_lot uses RAII guards without Result wrapping, while loom uses
// Result-returning methods. We need a wrapper type to unify them.

#[cfg(not(loom))]
pub use parking_lot::{Mutex, MutexGuard};

#[cfg(loom)]
mod loom_mutex {
	//! Wrapper types for loom's Mutex to match parking_lot's API.

	use loom::sync::{Mutex as LoomMutex, MutexGuard as LoomMutexGuard};

	/// A wrapper around loom's Mutex that provides a parking_lot-compatible API.
	#[derive(Debug)]
	pub struct Mutex<T>(LoomMutex<T>);

	impl<T> Mutex<T> {
		/// Creates a new Mutex.
		pub fn new(value: T) -> Self {
			Mutex(LoomMutex::new(value))
		}

		/// Acquires the lock, blocking until available.
		pub fn lock(&self) -> MutexGuard<'_, T> {
			MutexGuard(self.0.lock().unwrap())
		}
	}

	/// Wrapper around loom's mutex guard.
	pub struct MutexGuard<'a, T>(LoomMutexGuard<'a, T>);

	impl<'a, T> std::ops::Deref for MutexGuard<'a, T> {
		type Target = T;
		fn deref(&self) -> &T {
			&self.0
		}
	}

	impl<'a, T> std::ops::DerefMut for MutexGuard<'a, T> {
		fn deref_mut(&mut self) -> &mut T {
			&mut self.0
		}
	}
}

#[cfg(loom)]
pub use loom_mutex::{Mutex, MutexGuard};
