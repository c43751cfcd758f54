//! Allocation accounting for leak tests.
//!
//! [`CountingAllocator`] wraps the system allocator and keeps running totals of
//! live blocks and live bytes. A test binary installs it as its global
//! allocator, takes a [`Snapshot`] before building trees, and compares against
//! a second snapshot once every handle and pool is gone.
//!
//! ```ignore
//! use cowtree::alloc::{self, CountingAllocator};
//!
//! #[global_allocator]
//! static ALLOC: CountingAllocator = CountingAllocator;
//!
//! #[test]
//! fn tree_memory_is_returned() {
//!     let before = alloc::snapshot();
//!     {
//!         let mut tree = cowtree::Tree::new(4).unwrap();
//!         tree.extend(0..10_000);
//!     }
//!     alloc::snapshot().assert_no_growth_since(&before, 0);
//! }
//! ```
//!
//! Counters are process-wide. Keep each measuring test in a binary of its own,
//! or the harness and sibling tests will show up in the totals.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};

static LIVE_BLOCKS: AtomicIsize = AtomicIsize::new(0);
static LIVE_BYTES: AtomicIsize = AtomicIsize::new(0);
static PEAK_BYTES: AtomicIsize = AtomicIsize::new(0);
static TOTAL_ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

/// System allocator that counts what is currently allocated.
pub struct CountingAllocator;

#[inline]
fn record(blocks: isize, bytes: isize) {
	LIVE_BLOCKS.fetch_add(blocks, Ordering::Relaxed);
	let live = LIVE_BYTES.fetch_add(bytes, Ordering::Relaxed) + bytes;
	if bytes > 0 {
		PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
	}
	if blocks > 0 {
		TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
	}
}

unsafe impl GlobalAlloc for CountingAllocator {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		let ptr = System.alloc(layout);
		if !ptr.is_null() {
			record(1, layout.size() as isize);
		}
		ptr
	}

	unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
		let ptr = System.alloc_zeroed(layout);
		if !ptr.is_null() {
			record(1, layout.size() as isize);
		}
		ptr
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		System.dealloc(ptr, layout);
		record(-1, -(layout.size() as isize));
	}

	unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
		let new = System.realloc(ptr, layout, new_size);
		if !new.is_null() {
			record(0, new_size as isize - layout.size() as isize);
		}
		new
	}
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
	/// Blocks allocated and not yet freed.
	pub live_blocks: isize,
	/// Bytes allocated and not yet freed.
	pub live_bytes: isize,
	/// Highest `live_bytes` seen so far.
	pub peak_bytes: isize,
	/// Allocations made since the process started.
	pub total_allocations: usize,
}

/// Reads the current counters.
pub fn snapshot() -> Snapshot {
	Snapshot {
		live_blocks: LIVE_BLOCKS.load(Ordering::SeqCst),
		live_bytes: LIVE_BYTES.load(Ordering::SeqCst),
		peak_bytes: PEAK_BYTES.load(Ordering::SeqCst),
		total_allocations: TOTAL_ALLOCATIONS.load(Ordering::SeqCst),
	}
}

impl Snapshot {
	/// Number of allocations made between `earlier` and `self`.
	pub fn allocations_since(&self, earlier: &Snapshot) -> usize {
		self.total_allocations - earlier.total_allocations
	}

	/// Panics if more than `tolerance` blocks, or any bytes beyond those
	/// blocks, are still live compared to `earlier`.
	pub fn assert_no_growth_since(&self, earlier: &Snapshot, tolerance: isize) {
		let blocks = self.live_blocks - earlier.live_blocks;
		let bytes = self.live_bytes - earlier.live_bytes;
		assert!(
			blocks <= tolerance,
			"{} blocks ({} bytes) still allocated, tolerance is {} blocks",
			blocks,
			bytes,
			tolerance
		);
		if tolerance == 0 {
			assert!(bytes <= 0, "{} bytes still allocated with no live blocks", bytes);
		}
	}
}
