//! Allocator configuration and memory statistics
//!
//! - `mimalloc` feature: mimalloc becomes the global allocator
//! - `memory_tracking` feature: a counting wrapper around the underlying
//!   allocator, for profiling. Without it the statistics are always zero.
//!
//! The counters themselves are always compiled so they stay tested under
//! default features; run `cargo test --features memory_tracking` to cover
//! the allocator wrapper.

#![cfg_attr(not(feature = "memory_tracking"), allow(dead_code))]

use std::sync::atomic::{AtomicUsize, Ordering};

/// Live and peak byte counts
struct Counters {
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl Counters {
    const fn new() -> Self {
        Counters {
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn grow(&self, bytes: usize) {
        let live = self.live.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak.fetch_max(live, Ordering::Relaxed);
    }

    fn shrink(&self, bytes: usize) {
        self.live.fetch_sub(bytes, Ordering::Relaxed);
    }

    /// A reallocation from `old` to `new` bytes
    fn resize(&self, old: usize, new: usize) {
        if new >= old {
            self.grow(new - old);
        } else {
            self.shrink(old - new);
        }
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn reset(&self) -> (usize, usize) {
        let live = self.live();
        (live, self.peak.swap(live, Ordering::SeqCst))
    }
}

static COUNTERS: Counters = Counters::new();

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};

    use super::COUNTERS;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    pub struct TrackingAllocator;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = unsafe { UNDERLYING.alloc(layout) };
            if !ptr.is_null() {
                COUNTERS.grow(layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            COUNTERS.shrink(layout.size());
            unsafe { UNDERLYING.dealloc(ptr, layout) }
        }

        unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
            let new_ptr = unsafe { UNDERLYING.realloc(ptr, layout, new_size) };
            if !new_ptr.is_null() {
                COUNTERS.resize(layout.size(), new_size);
            }
            new_ptr
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated through the global allocator
pub fn current() -> usize {
    if cfg!(feature = "memory_tracking") {
        COUNTERS.live()
    } else {
        0
    }
}

/// Highest allocation level since start or the last [`reset`]
pub fn peak() -> usize {
    if cfg!(feature = "memory_tracking") {
        COUNTERS.peak()
    } else {
        0
    }
}

/// Reset the peak to the current level; returns `(current, previous peak)`
pub fn reset() -> (usize, usize) {
    if cfg!(feature = "memory_tracking") {
        COUNTERS.reset()
    } else {
        (0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_live_and_peak() {
        let counters = Counters::new();
        counters.grow(100);
        counters.grow(50);
        counters.shrink(120);
        assert_eq!(counters.live(), 30);
        assert_eq!(counters.peak(), 150);

        counters.resize(30, 80);
        counters.resize(80, 10);
        assert_eq!(counters.live(), 10);
        assert_eq!(counters.peak(), 150);

        assert_eq!(counters.reset(), (10, 150));
        assert_eq!(counters.peak(), 10);
    }

    #[cfg(feature = "memory_tracking")]
    #[test]
    fn test_tracking_counts_allocations() {
        let buf = vec![0u8; 1 << 20];
        assert!(current() >= buf.len());
        assert!(peak() >= buf.len());
        drop(buf);
        let (_, previous_peak) = reset();
        assert!(previous_peak >= 1 << 20);
    }

    #[cfg(not(feature = "memory_tracking"))]
    #[test]
    fn test_stats_are_zero_without_tracking() {
        assert_eq!(current(), 0);
        assert_eq!(peak(), 0);
        assert_eq!(reset(), (0, 0));
    }
}
