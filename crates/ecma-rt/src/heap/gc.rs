//! Mark-and-sweep cycle collector (§4.5, C7): covers the reference cycles
//! plain refcounting (§4.4) can't reclaim, and backstops allocation
//! failure.

#[cfg(test)]
mod gc_test;

use alloc::vec::Vec;

use bitflags::bitflags;
use ecma_abi::{HeaderFlags, TypeTag};

use super::{Heap, HeapPayload, HeapRef, HeapRunFlags};
use crate::host_alloc::HostAlloc;

bitflags! {
    /// Per-cycle flags (distinct from [`HeapRunFlags`], which is
    /// heap-lifetime state) — supplemented feature 1.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GcFlags: u8 {
        /// Last-resort retry: skip finalizers, compaction, and string-table
        /// resize, trading correctness-of-niceties for a better shot at
        /// freeing enough memory to satisfy the allocation that triggered
        /// this cycle.
        const EMERGENCY              = 0b0001;
        const NO_FINALIZERS          = 0b0010;
        const NO_OBJECT_COMPACTION   = 0b0100;
        const NO_STRINGTABLE_RESIZE  = 0b1000;
    }
}

impl GcFlags {
    const fn effective(self) -> Self {
        if self.contains(Self::EMERGENCY) {
            Self::from_bits_truncate(
                self.bits() | Self::NO_FINALIZERS.bits() | Self::NO_OBJECT_COMPACTION.bits() | Self::NO_STRINGTABLE_RESIZE.bits(),
            )
        } else {
            self
        }
    }
}

/// Runs one mark-and-sweep cycle. Nested invocation (while already running)
/// is rejected as a no-op (§5 "nested GC is rejected").
pub fn run_cycle<A: HostAlloc>(heap: &Heap<A>, flags: GcFlags) {
    if heap.run_flags().contains(HeapRunFlags::MARK_AND_SWEEP_RUNNING) {
        return;
    }
    heap.insert_run_flags(HeapRunFlags::MARK_AND_SWEEP_RUNNING);
    let flags = flags.effective();

    #[cfg(feature = "logging")]
    log::debug!(
        "gc cycle start: {} objects, {} interned strings, flags={flags:?}",
        heap.object_count(),
        heap.string_table().borrow().len()
    );

    let all = snapshot(heap);

    for r in &all {
        r.header()
            .remove_flags(HeaderFlags::REACHABLE | HeaderFlags::TEMPROOT);
    }

    mark_roots(heap);
    rescan_temproots(heap, &all);

    if !flags.contains(GcFlags::NO_FINALIZERS) {
        scan_finalizable(&all);
    }

    sweep(heap, &all);

    heap.string_table()
        .borrow_mut()
        .set_resize_inhibited(flags.contains(GcFlags::NO_STRINGTABLE_RESIZE));

    #[cfg(feature = "logging")]
    log::debug!(
        "gc cycle end: {} objects, {} interned strings, flags={flags:?}",
        heap.object_count(),
        heap.string_table().borrow().len()
    );

    heap.remove_run_flags(HeapRunFlags::MARK_AND_SWEEP_RUNNING);
}

fn snapshot<A: HostAlloc>(heap: &Heap<A>) -> Vec<HeapRef> {
    let mut all = Vec::with_capacity(heap.object_count());
    let mut cur = heap.first();
    while let Some(r) = cur {
        all.push(r);
        cur = r.header().next();
    }
    all
}

fn mark_roots<A: HostAlloc>(heap: &Heap<A>) {
    let limit = heap.options().mark_recursion_limit;
    if let Some(t) = heap.curr_thread() {
        mark(t, 0, limit);
    }
}

/// Recursive mark with a depth limit (§4.5 phase 1): past `limit`, the
/// object is flagged TEMPROOT instead of recursed into, and completed by a
/// later re-scan pass.
fn mark(r: HeapRef, depth: u32, limit: u32) {
    if r.header().flags().contains(HeaderFlags::REACHABLE) {
        return;
    }
    r.header().insert_flags(HeaderFlags::REACHABLE);
    if depth >= limit {
        r.header().insert_flags(HeaderFlags::TEMPROOT);
        return;
    }
    mark_children(r, depth, limit);
}

fn mark_children(r: HeapRef, depth: u32, limit: u32) {
    match r.payload() {
        HeapPayload::Object(obj) => {
            for v in obj.owned_values() {
                if let Some(h) = v.as_heap() {
                    mark(h, depth + 1, limit);
                }
            }
            if let Some(proto) = obj.prototype() {
                mark(proto, depth + 1, limit);
            }
        }
        HeapPayload::CompiledFunction(c) => mark(c.data, depth + 1, limit),
        HeapPayload::TemplateData(t) => {
            for v in &t.constants {
                if let Some(h) = v.as_heap() {
                    mark(h, depth + 1, limit);
                }
            }
            for f in &t.inner_fn_refs {
                mark(*f, depth + 1, limit);
            }
        }
        HeapPayload::Env(e) => {
            mark(e.binding_object(), depth + 1, limit);
            if let Some(outer) = e.outer() {
                mark(outer, depth + 1, limit);
            }
        }
        HeapPayload::Thread(t) => {
            for v in t.owned_values() {
                if let Some(h) = v.as_heap() {
                    mark(h, depth + 1, limit);
                }
            }
        }
        HeapPayload::String(_) | HeapPayload::Buffer(_) | HeapPayload::NativeFunction(_) => {}
    }
}

fn rescan_temproots<A: HostAlloc>(heap: &Heap<A>, all: &[HeapRef]) {
    let limit = heap.options().mark_recursion_limit;
    loop {
        let mut any = false;
        for &r in all {
            if r.header().flags().contains(HeaderFlags::TEMPROOT) {
                r.header().remove_flags(HeaderFlags::TEMPROOT);
                any = true;
                mark_children(r, 0, limit);
            }
        }
        if !any {
            break;
        }
    }
}

/// Finalizer scan (§4.5 phase 2): an unreachable object bearing an
/// unfired finalizer is kept alive one more cycle (PENDING_FINALIZE) so its
/// finalizer can run with the object still intact; if it doesn't resurrect
/// itself, the *next* cycle collects it.
fn scan_finalizable(all: &[HeapRef]) {
    for &r in all {
        let f = r.header().flags();
        if !f.contains(HeaderFlags::REACHABLE)
            && f.contains(HeaderFlags::FINALIZABLE)
            && !f.contains(HeaderFlags::FINALIZED)
        {
            r.header()
                .insert_flags(HeaderFlags::REACHABLE | HeaderFlags::PENDING_FINALIZE);
        }
    }
}

fn sweep<A: HostAlloc>(heap: &Heap<A>, all: &[HeapRef]) {
    for &r in all {
        if r.header().flags().contains(HeaderFlags::REACHABLE) {
            r.header().remove_flags(HeaderFlags::REACHABLE);
        } else {
            if r.tag() == TypeTag::String {
                heap.forget_string(r);
            }
            heap.unlink_and_reclaim(r);
        }
    }
}
