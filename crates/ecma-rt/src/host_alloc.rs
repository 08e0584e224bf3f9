//! Allocator facade over a host-supplied allocator (§4.1, C1).
//!
//! [`HostAlloc`] is the three-call interface the spec names: `alloc`,
//! `realloc`, `free`. Like a C `malloc` family, `realloc`/`free` don't take
//! the allocation's size back from the caller — an implementation is
//! expected to recover it itself. [`SystemAlloc`], the default, does this
//! the same way most `malloc` implementations do: it stashes an 8-byte size
//! prefix immediately before the pointer it hands back.
//!
//! GC-triggering retry logic and the indirect-realloc primitive (needed
//! because a finalizer run during a retry may reallocate the very structure
//! being reallocated) live one layer up, in [`crate::heap`], since they need
//! to call back into the heap's mark-and-sweep.

#[cfg(test)]
mod host_alloc_test;

use core::alloc::Layout;
use core::ptr;

/// A host-supplied allocator. Implementations never block or abort on
/// failure; they return a null pointer and the caller surfaces an
/// `alloc-failed` error through the protected-call mechanism (§4.1).
pub trait HostAlloc {
    /// Allocate `size` bytes. Returns null on failure. `size == 0` is
    /// permitted and returns null without it being an error.
    fn alloc(&mut self, size: usize) -> *mut u8;

    /// Resize a previous allocation, possibly moving it. `ptr` must be a
    /// pointer previously returned by `alloc`/`realloc` on `self` and not yet
    /// freed. Returns null on failure, in which case the original
    /// allocation is left untouched (still valid, still needs a `free`).
    fn realloc(&mut self, ptr: *mut u8, new_size: usize) -> *mut u8;

    /// Free a previous allocation. `ptr` may be null, in which case this is
    /// a no-op.
    fn free(&mut self, ptr: *mut u8);
}

/// Size of the length prefix stashed before every allocation, in bytes.
const PREFIX: usize = core::mem::size_of::<usize>();

fn prefixed_layout(user_size: usize) -> Option<Layout> {
    let total = user_size.checked_add(PREFIX)?;
    Layout::from_size_align(total, PREFIX).ok()
}

/// Reads the stashed size and returns `(raw_block_ptr, user_size)` for a
/// pointer previously returned by [`SystemAlloc`].
///
/// # Safety
/// `user_ptr` must have been returned by a live (not yet freed)
/// `SystemAlloc::alloc`/`realloc` call.
unsafe fn recover(user_ptr: *mut u8) -> (*mut u8, usize) {
    let raw = unsafe { user_ptr.sub(PREFIX) };
    let size = unsafe { raw.cast::<usize>().read() };
    (raw, size)
}

/// Default [`HostAlloc`] wrapping the process's global allocator.
///
/// This is the allocator a host that hasn't supplied its own uses; it is
/// not itself "pluggable allocator implementations" in the sense §1 scopes
/// out (that refers to arena/pool allocators a host might plug in instead),
/// just the baseline adapter onto Rust's `GlobalAlloc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAlloc;

impl HostAlloc for SystemAlloc {
    fn alloc(&mut self, size: usize) -> *mut u8 {
        let Some(layout) = prefixed_layout(size) else {
            return ptr::null_mut();
        };
        // SAFETY: layout has non-zero size (at least PREFIX bytes).
        let raw = unsafe { alloc_crate::alloc::alloc(layout) };
        if raw.is_null() {
            return ptr::null_mut();
        }
        // SAFETY: raw is a fresh allocation of at least PREFIX + size bytes,
        // PREFIX-aligned.
        unsafe {
            raw.cast::<usize>().write(size);
            raw.add(PREFIX)
        }
    }

    fn realloc(&mut self, ptr: *mut u8, new_size: usize) -> *mut u8 {
        if ptr.is_null() {
            return self.alloc(new_size);
        }
        if new_size == 0 {
            self.free(ptr);
            return ptr::null_mut();
        }
        // SAFETY: caller contract (see `recover`).
        let (raw, old_size) = unsafe { recover(ptr) };
        let Some(old_layout) = prefixed_layout(old_size) else {
            return ptr::null_mut();
        };
        let Some(new_total) = new_size.checked_add(PREFIX) else {
            return ptr::null_mut();
        };
        // SAFETY: raw/old_layout describe the live allocation being resized.
        let new_raw = unsafe { alloc_crate::alloc::realloc(raw, old_layout, new_total) };
        if new_raw.is_null() {
            return ptr::null_mut();
        }
        // SAFETY: new_raw is at least PREFIX + new_size bytes, PREFIX-aligned.
        unsafe {
            new_raw.cast::<usize>().write(new_size);
            new_raw.add(PREFIX)
        }
    }

    fn free(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        // SAFETY: caller contract (see `recover`).
        let (raw, size) = unsafe { recover(ptr) };
        let Some(layout) = prefixed_layout(size) else {
            return;
        };
        // SAFETY: raw/layout describe the live allocation being freed.
        unsafe { alloc_crate::alloc::dealloc(raw, layout) };
    }
}

#[cfg(any(test, feature = "std"))]
use std as alloc_crate;
#[cfg(not(any(test, feature = "std")))]
use alloc as alloc_crate;
