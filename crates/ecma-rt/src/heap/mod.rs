//! The heap: allocated-object list, string interning, refcounting and
//! mark-and-sweep GC (§3, §4.2-4.5, C3-C7).
//!
//! Heap objects are heterogeneous (strings, plain objects, buffers,
//! threads, environment records, compiled-function templates, native
//! function wrappers) but share one [`header::ObjHeader`] prefix. Rather
//! than the inline-trailing-body layout the upstream C implementation uses
//! (a single allocation holding header bytes followed by payload bytes,
//! addressed via pointer arithmetic), each [`HeapCell`] is a boxed Rust enum
//! over the payload kinds: the header/refcounting/GC-linkage contract the
//! spec actually cares about is identical, and this sidesteps unsized/DST
//! trickery this workspace can't compile-check. See `DESIGN.md` for the
//! rationale.


pub mod buffer;
pub mod compiled_fn;
pub mod gc;
pub mod header;
pub mod hstring;
pub mod object;
pub mod refcount;
pub mod string_table;

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::NonNull;

use bitflags::bitflags;
use ecma_abi::TypeTag;

use crate::host_alloc::{HostAlloc, SystemAlloc};
use crate::error::RtError;
use crate::thread::Thread;

pub use buffer::HBuffer;
pub use compiled_fn::{CompiledTemplate, NativeFn, TemplateData};
pub use header::ObjHeader;
pub use hstring::HString;
pub use object::{EnvRecord, HObject};
pub use string_table::StringTable;

/// A reference to a heap-allocated cell. Equality and `Copy` are by
/// identity (pointer value), matching the spec's "interned strings compare
/// by identity" and the general heap-reference semantics throughout §3-4.
///
/// Holding a `HeapRef` does **not** by itself constitute a strong reference
/// — see [`refcount`] for the incref/decref discipline every rooted
/// location (stack slot, object property, intern table cell) must follow.
#[derive(Clone, Copy)]
pub struct HeapRef(NonNull<HeapCell>);

impl PartialEq for HeapRef {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for HeapRef {}

impl fmt::Debug for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapRef({:p})", self.0.as_ptr())
    }
}

impl HeapRef {
    fn from_box(cell: Box<HeapCell>) -> Self {
        Self(NonNull::from(Box::leak(cell)))
    }

    /// # Safety
    /// The caller must guarantee the pointee has not been freed. Since this
    /// runtime is single-threaded within one heap, any `HeapRef` obtained
    /// while still reachable from a root is safe to dereference.
    unsafe fn cell(&self) -> &HeapCell {
        unsafe { self.0.as_ref() }
    }

    #[must_use]
    pub fn header(&self) -> &ObjHeader {
        // SAFETY: see `cell`.
        unsafe { &self.cell().header }
    }

    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.header().tag()
    }

    #[must_use]
    pub fn payload(&self) -> &HeapPayload {
        // SAFETY: see `cell`.
        unsafe { &self.cell().payload }
    }

    /// Exclusive payload access.
    ///
    /// # Safety
    /// Caller must ensure no other live `&`/`&mut` borrow of this cell's
    /// payload exists. The single-threaded, non-reentrant-during-mutation
    /// discipline the spec assumes for object mutation (§3 Lifecycle) makes
    /// this safe at every call site in this crate; it is kept `unsafe`
    /// because the borrow isn't tied to a lifetime the borrow checker can
    /// see.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn payload_mut(&self) -> &mut HeapPayload {
        unsafe { &mut (*self.0.as_ptr()).payload }
    }

    /// # Safety
    /// Must only be called by the allocated-list unlink/free step (sweep or
    /// the refzero driver), exactly once, with no other reference to this
    /// cell outstanding.
    unsafe fn reclaim(self) -> Box<HeapCell> {
        unsafe { Box::from_raw(self.0.as_ptr()) }
    }
}

pub(crate) struct HeapCell {
    pub header: ObjHeader,
    pub payload: HeapPayload,
}

/// The union of every heap-allocated kind (§3: string, object and its
/// sub-variants, buffer).
pub enum HeapPayload {
    String(HString),
    Object(HObject),
    Buffer(HBuffer),
    Thread(Thread),
    Env(EnvRecord),
    CompiledFunction(CompiledTemplate),
    NativeFunction(NativeFn),
    /// Shared immutable `[constants | inner fn refs | bytecode]` blob
    /// (§4.3), independently refcounted so closures over one template share
    /// it. Allocated with [`TypeTag::FunctionData`].
    TemplateData(TemplateData),
}

bitflags! {
    /// Heap-lifetime run flags, distinct from the per-cycle [`gc::GcFlags`]
    /// (§ SUPPLEMENTED FEATURES item 1).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HeapRunFlags: u8 {
        const MARK_AND_SWEEP_RUNNING = 1 << 0;
        const REFZERO_FREE_RUNNING   = 1 << 1;
    }
}

/// Tunable heap configuration (§ AMBIENT STACK / Configuration). Defaults
/// mirror `original_source/src/duk_heap.h`.
#[derive(Clone, Copy, Debug)]
pub struct HeapOptions {
    /// Mark-phase recursion depth limit before an object is deferred to a
    /// TEMPROOT re-scan pass.
    pub mark_recursion_limit: u32,
    /// Fixed-point (`/256`) trigger multiplier applied to the live object
    /// count after a cycle.
    pub gc_trigger_mul_fp: u32,
    /// Additive term applied alongside the multiplier.
    pub gc_trigger_add: usize,
    /// Char-offset cache entries per string table.
    pub string_cache_size: usize,
    /// Strings at or below this byte length never consult the cache.
    pub string_cache_nocache_limit: usize,
}

impl Default for HeapOptions {
    fn default() -> Self {
        Self {
            mark_recursion_limit: 32,
            gc_trigger_mul_fp: 12800, // 12800/256 == 50.0
            gc_trigger_add: 1024,
            string_cache_size: 4,
            string_cache_nocache_limit: 16,
        }
    }
}

impl HeapOptions {
    #[must_use]
    pub const fn with_mark_recursion_limit(mut self, limit: u32) -> Self {
        self.mark_recursion_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_gc_trigger(mut self, mul_fp: u32, add: usize) -> Self {
        self.gc_trigger_mul_fp = mul_fp;
        self.gc_trigger_add = add;
        self
    }

    /// Computes the "ticks until next forced cycle" soft counter reset
    /// value (§4.5 trigger (b)), kept as integer fixed-point arithmetic per
    /// the supplemented-features note rather than floats.
    #[must_use]
    pub const fn trigger_counter(&self, live_count: usize) -> usize {
        live_count * self.gc_trigger_mul_fp as usize / 256 + self.gc_trigger_add
    }
}

/// The heap itself: allocated list, string table, refcounting worklist, and
/// GC state, parameterized over a host allocator.
pub struct Heap<A: HostAlloc = SystemAlloc> {
    alloc: RefCell<A>,
    options: HeapOptions,
    head: Cell<Option<HeapRef>>,
    tail: Cell<Option<HeapRef>>,
    object_count: Cell<usize>,
    string_table: RefCell<StringTable>,
    run_flags: Cell<HeapRunFlags>,
    refzero_list: RefCell<VecDeque<HeapRef>>,
    gc_ticks: Cell<usize>,
    curr_thread: Cell<Option<HeapRef>>,
    fatal_handler: Cell<crate::protect::FatalHandler>,
}

impl Heap<SystemAlloc> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(HeapOptions::default())
    }

    #[must_use]
    pub fn with_options(options: HeapOptions) -> Self {
        Self::with_allocator(SystemAlloc, options)
    }
}

impl Default for Heap<SystemAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: HostAlloc> Heap<A> {
    #[must_use]
    pub fn with_allocator(alloc: A, options: HeapOptions) -> Self {
        Self {
            alloc: RefCell::new(alloc),
            string_table: RefCell::new(StringTable::new(options.string_cache_size)),
            gc_ticks: Cell::new(options.trigger_counter(0)),
            options,
            head: Cell::new(None),
            tail: Cell::new(None),
            object_count: Cell::new(0),
            run_flags: Cell::new(HeapRunFlags::empty()),
            refzero_list: RefCell::new(VecDeque::new()),
            curr_thread: Cell::new(None),
            fatal_handler: Cell::new(crate::protect::default_fatal_handler),
        }
    }

    pub fn set_fatal_handler(&self, handler: crate::protect::FatalHandler) {
        self.fatal_handler.set(handler);
    }

    #[must_use]
    pub fn fatal_handler(&self) -> crate::protect::FatalHandler {
        self.fatal_handler.get()
    }

    #[must_use]
    pub const fn options(&self) -> &HeapOptions {
        &self.options
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.object_count.get()
    }

    #[must_use]
    pub fn string_table(&self) -> &RefCell<StringTable> {
        &self.string_table
    }

    #[must_use]
    pub fn curr_thread(&self) -> Option<HeapRef> {
        self.curr_thread.get()
    }

    pub fn set_curr_thread(&self, t: Option<HeapRef>) {
        self.curr_thread.set(t);
    }

    fn run_flags(&self) -> HeapRunFlags {
        self.run_flags.get()
    }

    /// Links a freshly boxed cell into the allocated list and returns its
    /// handle with refcount zero. Callers (the `alloc_*` constructors below)
    /// are responsible for bringing the refcount to 1.
    fn link_new(&self, cell: Box<HeapCell>) -> HeapRef {
        let r = HeapRef::from_box(cell);
        match self.tail.get() {
            Some(old_tail) => {
                old_tail.header().set_next(Some(r));
                r.header().set_prev(Some(old_tail));
            }
            None => {
                self.head.set(Some(r));
            }
        }
        self.tail.set(Some(r));
        self.object_count.set(self.object_count.get() + 1);
        self.tick_allocation();
        r
    }

    /// Unlinks a cell from the allocated list without freeing it (used by
    /// both the refzero driver and sweep).
    fn unlink(&self, r: HeapRef) {
        let prev = r.header().prev();
        let next = r.header().next();
        match prev {
            Some(p) => p.header().set_next(next),
            None => self.head.set(next),
        }
        match next {
            Some(n) => n.header().set_prev(prev),
            None => self.tail.set(prev),
        }
        self.object_count.set(self.object_count.get() - 1);
    }

    #[must_use]
    pub fn first(&self) -> Option<HeapRef> {
        self.head.get()
    }

    fn tick_allocation(&self) {
        let ticks = self.gc_ticks.get();
        self.gc_ticks.set(ticks.saturating_sub(1));
    }

    #[must_use]
    pub fn gc_due(&self) -> bool {
        self.gc_ticks.get() == 0
    }

    /// GC-integrated allocation (§4.1): on a raw allocator failure, triggers
    /// mark-and-sweep with escalating aggressiveness before reporting
    /// failure. Returns an owned buffer handle; callers needing a heap
    /// object go through `alloc_*` constructors instead, which call this.
    pub fn gc_alloc_bytes(&self, size: usize) -> Result<*mut u8, RtError>
    where
        Self: Sized,
    {
        const RETRY_FLAGS: [gc::GcFlags; 3] = [
            gc::GcFlags::empty(),
            gc::GcFlags::NO_OBJECT_COMPACTION,
            gc::GcFlags::EMERGENCY,
        ];
        {
            let mut a = self.alloc.borrow_mut();
            let p = a.alloc(size);
            if !p.is_null() {
                return Ok(p);
            }
        }
        for flags in RETRY_FLAGS {
            #[cfg(feature = "logging")]
            log::warn!("allocation of {size} bytes failed, retrying after gc (flags={flags:?})");
            gc::run_cycle(self, flags);
            let mut a = self.alloc.borrow_mut();
            let p = a.alloc(size);
            if !p.is_null() {
                return Ok(p);
            }
        }
        Err(RtError::alloc_failed())
    }

    /// Indirect realloc (§4.1): `locate` is called immediately before each
    /// attempt (including the first) to fetch the *current* location of the
    /// buffer, since a GC cycle run between attempts may itself have moved
    /// it (e.g. a finalizer resizing the same structure).
    pub fn gc_indirect_realloc(
        &self,
        new_size: usize,
        mut locate: impl FnMut() -> *mut u8,
    ) -> Result<*mut u8, RtError> {
        const RETRY_FLAGS: [gc::GcFlags; 3] = [
            gc::GcFlags::empty(),
            gc::GcFlags::NO_OBJECT_COMPACTION,
            gc::GcFlags::EMERGENCY,
        ];
        {
            let mut a = self.alloc.borrow_mut();
            let p = a.realloc(locate(), new_size);
            if !p.is_null() || new_size == 0 {
                return Ok(p);
            }
        }
        for flags in RETRY_FLAGS {
            #[cfg(feature = "logging")]
            log::warn!("realloc to {new_size} bytes failed, retrying after gc (flags={flags:?})");
            gc::run_cycle(self, flags);
            let mut a = self.alloc.borrow_mut();
            let p = a.realloc(locate(), new_size);
            if !p.is_null() || new_size == 0 {
                return Ok(p);
            }
        }
        Err(RtError::alloc_failed())
    }

    pub fn gc_free_bytes(&self, ptr: *mut u8) {
        self.alloc.borrow_mut().free(ptr);
    }

    /// Allocates a new heap cell with refcount 1. Internal constructors
    /// (`hstring::intern`, `object::HObject::new`, ...) call this rather
    /// than touching the allocated list directly.
    pub(crate) fn alloc_cell(&self, tag: TypeTag, payload: HeapPayload) -> HeapRef {
        let cell = Box::new(HeapCell {
            header: ObjHeader::new(tag),
            payload,
        });
        let r = self.link_new(cell);
        r.header().incref();
        r
    }

    /// Performs an incref-then-decref on a rooted slot being overwritten,
    /// per §4.4 ("every tagged value assignment into a rooted location...
    /// in that order to keep transient self-assignments correct").
    pub fn rebind(&self, slot_old: Option<HeapRef>, slot_new: Option<HeapRef>) {
        if let Some(n) = slot_new {
            n.header().incref();
        }
        if let Some(o) = slot_old {
            self.decref(o);
        }
    }

    /// Decref per §4.4: on transition to zero, mark FINALIZABLE if
    /// applicable and enqueue on the refzero list rather than recursing.
    pub fn decref(&self, r: HeapRef) {
        if !r.header().decref() {
            return;
        }
        self.refzero_list.borrow_mut().push_back(r);
        if !self.run_flags().contains(HeapRunFlags::REFZERO_FREE_RUNNING) {
            refcount::drain_refzero(self);
        }
    }

    pub(crate) fn set_run_flags(&self, flags: HeapRunFlags) {
        self.run_flags.set(flags);
    }

    pub(crate) fn insert_run_flags(&self, flags: HeapRunFlags) {
        self.run_flags.set(self.run_flags.get() | flags);
    }

    pub(crate) fn remove_run_flags(&self, flags: HeapRunFlags) {
        self.run_flags.set(self.run_flags.get() & !flags);
    }

    pub(crate) fn refzero_list(&self) -> &RefCell<VecDeque<HeapRef>> {
        &self.refzero_list
    }

    /// Intern protocol (§4.2): hash, probe, and either return the existing
    /// reference (increffed for the caller) or allocate a fresh
    /// [`HString`] and insert it. The returned `HeapRef` carries the one
    /// reference the table's own bookkeeping doesn't separately hold —
    /// dropping every external reference to it lets the refzero driver or
    /// sweep remove it from the table via [`StringTable::remove`].
    pub fn intern(&self, bytes: &[u8]) -> HeapRef {
        let hash = self.string_table.borrow().hash(bytes);
        if let Some(existing) = self.string_table.borrow().find(hash, bytes) {
            existing.header().incref();
            return existing;
        }
        let body = HString::new(bytes.into(), hash, self.options.string_cache_size);
        let r = self.alloc_cell(TypeTag::String, HeapPayload::String(body));
        self.string_table.borrow_mut().insert(hash, r);
        r
    }

    /// Called by the refzero driver / sweep when a string's refcount has
    /// reached zero, to drop its string-table entry before the cell itself
    /// is unlinked and freed.
    pub(crate) fn forget_string(&self, r: HeapRef) {
        let HeapPayload::String(s) = r.payload() else {
            return;
        };
        let hash = self.string_table.borrow().hash(s.as_bytes());
        self.string_table.borrow_mut().remove(hash, r);
    }

    pub(crate) fn unlink_and_reclaim(&self, r: HeapRef) {
        self.unlink(r);
        // SAFETY: caller (refzero driver or sweep) holds the only remaining
        // reference and is dropping it right now.
        let cell = unsafe { r.reclaim() };
        drop(cell);
    }

    /// Forces an immediate mark-and-sweep cycle (§6 "force garbage
    /// collection").
    pub fn force_gc(&self) {
        gc::run_cycle(self, gc::GcFlags::empty());
        self.gc_ticks
            .set(self.options.trigger_counter(self.object_count.get()));
    }
}
