//! Heap object header (§3, C3).
//!
//! Every heap allocation begins with an [`ObjHeader`]. Flags and refcount
//! are `Cell`s because mutation (marking, increffing) happens through
//! shared references reached from a `HeapRef` — the header never needs
//! `&mut` access since all of its fields are single-writer-at-a-time by
//! construction (refcounting is strictly sequential within one thread; GC
//! marking runs with no script execution interleaved).

#[cfg(test)]
mod header_test;

use core::cell::Cell;

use ecma_abi::{HeaderFlags, TypeTag};

use super::HeapRef;

/// Common prefix of every heap allocation.
pub struct ObjHeader {
    tag: TypeTag,
    flags: Cell<HeaderFlags>,
    refcount: Cell<u32>,
    prev: Cell<Option<HeapRef>>,
    next: Cell<Option<HeapRef>>,
}

impl ObjHeader {
    #[must_use]
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            flags: Cell::new(HeaderFlags::empty()),
            refcount: Cell::new(0),
            prev: Cell::new(None),
            next: Cell::new(None),
        }
    }

    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    #[must_use]
    pub fn flags(&self) -> HeaderFlags {
        self.flags.get()
    }

    pub fn set_flags(&self, flags: HeaderFlags) {
        self.flags.set(flags);
    }

    pub fn insert_flags(&self, flags: HeaderFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    pub fn remove_flags(&self, flags: HeaderFlags) {
        self.flags.set(self.flags.get() & !flags);
    }

    #[must_use]
    pub fn refcount(&self) -> u32 {
        self.refcount.get()
    }

    /// Saturating increment (§4.4): once at `u32::MAX` the object is only
    /// reclaimable by mark-and-sweep, never by refcounting.
    pub fn incref(&self) {
        let rc = self.refcount.get();
        if rc != u32::MAX {
            self.refcount.set(rc + 1);
        }
    }

    /// Decrement, returning `true` exactly once when the count transitions
    /// to zero (the caller should then enqueue this header on the refzero
    /// list). A saturated count never decrements and never reports zero.
    #[must_use]
    pub fn decref(&self) -> bool {
        let rc = self.refcount.get();
        if rc == u32::MAX {
            return false;
        }
        debug_assert!(rc > 0, "decref on a header with refcount already zero");
        let next = rc - 1;
        self.refcount.set(next);
        next == 0
    }

    #[must_use]
    pub fn prev(&self) -> Option<HeapRef> {
        self.prev.get()
    }

    pub fn set_prev(&self, r: Option<HeapRef>) {
        self.prev.set(r);
    }

    #[must_use]
    pub fn next(&self) -> Option<HeapRef> {
        self.next.get()
    }

    pub fn set_next(&self, r: Option<HeapRef>) {
        self.next.set(r);
    }
}
