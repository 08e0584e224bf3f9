//! Zero-refcount worklist processor (§4.4, C6).
//!
//! Processes [`Heap`]'s `refzero_list` iteratively rather than recursively:
//! decreffing an object's outgoing references may enqueue more zero-count
//! objects, but they're appended to the same FIFO rather than triggering a
//! nested driver call, which is what keeps this from blowing the host
//! C-stack on a long reference chain (a linked list freed tail-first, say).
//! Re-entrancy is blocked by `HeapRunFlags::REFZERO_FREE_RUNNING`, which
//! [`Heap::decref`] checks before calling [`drain_refzero`].

#[cfg(test)]
mod refcount_test;

use ecma_abi::{HeaderFlags, TypeTag};

use super::{Heap, HeapPayload, HeapRef, HeapRunFlags};
use crate::host_alloc::HostAlloc;

pub(crate) fn drain_refzero<A: HostAlloc>(heap: &Heap<A>) {
    heap.insert_run_flags(HeapRunFlags::REFZERO_FREE_RUNNING);
    #[cfg(feature = "logging")]
    let mut drained = 0usize;
    while let Some(r) = heap.refzero_list().borrow_mut().pop_front() {
        process_one(heap, r);
        #[cfg(feature = "logging")]
        {
            drained += 1;
        }
    }
    #[cfg(feature = "logging")]
    log::trace!("refzero drain: {drained} objects reclaimed");
    heap.remove_run_flags(HeapRunFlags::REFZERO_FREE_RUNNING);
}

fn process_one<A: HostAlloc>(heap: &Heap<A>, r: HeapRef) {
    let flags = r.header().flags();
    if flags.contains(HeaderFlags::FINALIZABLE) && !flags.contains(HeaderFlags::FINALIZED) {
        // Running an actual finalizer script is out of scope here (no
        // executor); mark it run so a resurrection check upstream (the
        // compiler/executor layer) can see this object already fired.
        r.header().insert_flags(HeaderFlags::FINALIZED);
    }
    decref_outgoing(heap, r);
    if r.tag() == TypeTag::String {
        heap.forget_string(r);
    }
    heap.unlink_and_reclaim(r);
}

/// Decrefs every strong reference a cell owns, per §3 invariant 2(b): "a
/// tagged value stored in another reachable object" includes references
/// held by the object being reclaimed right here.
fn decref_outgoing<A: HostAlloc>(heap: &Heap<A>, r: HeapRef) {
    match r.payload() {
        HeapPayload::Object(obj) => {
            for v in obj.owned_values() {
                if let Some(h) = v.as_heap() {
                    heap.decref(h);
                }
            }
            if let Some(proto) = obj.prototype() {
                heap.decref(proto);
            }
        }
        HeapPayload::CompiledFunction(c) => heap.decref(c.data),
        HeapPayload::TemplateData(t) => {
            for v in &t.constants {
                if let Some(h) = v.as_heap() {
                    heap.decref(h);
                }
            }
            for f in &t.inner_fn_refs {
                heap.decref(*f);
            }
        }
        HeapPayload::Env(e) => {
            heap.decref(e.binding_object());
            if let Some(outer) = e.outer() {
                heap.decref(outer);
            }
        }
        HeapPayload::Thread(t) => {
            for v in t.owned_values() {
                if let Some(h) = v.as_heap() {
                    heap.decref(h);
                }
            }
        }
        HeapPayload::String(_) | HeapPayload::Buffer(_) | HeapPayload::NativeFunction(_) => {}
    }
}
