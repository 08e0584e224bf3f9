//! Protected call / non-local exit (§4.7, C9).
//!
//! The upstream setjmp/longjmp checkpoint is re-expressed as ordinary
//! `Result` propagation: a *pad* here is just the recorded stack depths
//! taken before invoking the callback, and "longjmp" is simply returning
//! `Err` up through the call chain. What the spec actually requires is
//! preserved exactly: on a non-local exit the three stacks are truncated to
//! the pad's snapshot depths, not merely "eventually cleaned up".

#[cfg(test)]
mod protect_test;

use ecma_abi::{ExitReason, PropAttr, TypeTag};

use crate::host_alloc::HostAlloc;
use crate::error::RtError;
use crate::heap::object::{Class, HObject};
use crate::heap::{Heap, HeapPayload};
use crate::thread::Thread;
use crate::value::Value;

/// Builds a script-visible `Error` instance (class/name/message properties)
/// for a thrown [`RtError`], used by [`protected_call`] to populate the
/// thrown value the way §4.8's `to_object`/property API would (§7
/// taxonomy: "Errors are ECMAScript `Error` instances carrying a class...
/// plus a message").
pub(crate) fn error_to_value<A: HostAlloc>(heap: &Heap<A>, err: &RtError) -> Value {
    let obj = HObject::new(Class::ErrorObj, None);
    let name_key = heap.intern(b"name");
    let name_value = heap.intern(err.class().script_name().as_bytes());
    let _ = obj.define_own(name_key, Value::Heap(name_value), PropAttr::default_data());
    if let Some(message) = err.message() {
        let message_key = heap.intern(b"message");
        let message_value = heap.intern(message.as_bytes());
        let _ = obj.define_own(
            message_key,
            Value::Heap(message_value),
            PropAttr::default_data(),
        );
    }
    let r = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(obj));
    Value::Heap(r)
}

/// A recorded checkpoint: value/call/catch stack depths to restore on a
/// non-local exit.
#[derive(Clone, Copy, Debug)]
struct Pad {
    value_stack_depth: usize,
    call_stack_depth: usize,
    catch_stack_depth: usize,
}

fn snapshot(thread: &Thread) -> Pad {
    Pad {
        value_stack_depth: thread.top(),
        call_stack_depth: thread.call_depth(),
        catch_stack_depth: thread.catch_depth(),
    }
}

fn restore(thread: &mut Thread, pad: Pad) {
    thread.truncate_values(pad.value_stack_depth);
    thread.truncate_calls(pad.call_stack_depth);
    thread.truncate_catches(pad.catch_stack_depth);
}

/// Outcome of a protected call: the exit reason plus up to two associated
/// values (§4.7's reason/value1/value2/iserror table).
#[derive(Clone, Copy, Debug)]
pub struct CallOutcome {
    pub reason: ExitReason,
    pub value1: Option<Value>,
    pub value2: Option<Value>,
    pub is_error: bool,
}

impl CallOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self.reason, ExitReason::Throw)
    }
}

/// Establishes a checkpoint, invokes `body`, and on an `Err` return,
/// truncates the thread's stacks back to the checkpoint before reporting a
/// `throw` exit. This is `safe_call`'s underlying mechanism (§4.8).
pub fn protected_call<A: HostAlloc>(
    heap: &Heap<A>,
    thread: &mut Thread,
    body: impl FnOnce(&Heap<A>, &mut Thread) -> Result<Value, RtError>,
) -> CallOutcome {
    let pad = snapshot(thread);
    match body(heap, thread) {
        Ok(value) => CallOutcome {
            reason: ExitReason::Return,
            value1: Some(value),
            value2: None,
            is_error: false,
        },
        Err(err) => {
            restore(thread, pad);
            let error_value = error_to_value(heap, &err);
            thread.push(error_value);
            CallOutcome {
                reason: ExitReason::Throw,
                value1: Some(error_value),
                value2: None,
                is_error: true,
            }
        }
    }
}

/// A non-return fatal handler invoked when an error needs to propagate past
/// the outermost installed pad (a *double fault* per §4.7 — "an error
/// thrown while handling a previous throw with no pad left").
pub type FatalHandler = fn(&RtError) -> !;

/// Default fatal handler: panics. A host embedding this runtime in an
/// environment without unwinding should install its own via
/// [`Heap::set_fatal_handler`].
pub fn default_fatal_handler(err: &RtError) -> ! {
    panic!("fatal error with no protected call to catch it: {err}");
}

/// Raises `err` through the nearest protected call. Since this crate models
/// "nearest pad" as ordinary `Result` propagation, raising is just
/// returning `Err`; this helper exists for call sites (§6 "register native
/// function", built-in implementations) that don't already have a `Result`
/// to propagate and need to invoke the heap's fatal handler directly
/// because they are not wrapped in any `protected_call` (a double fault).
pub fn double_fault<A: HostAlloc>(heap: &Heap<A>, err: &RtError) -> ! {
    #[cfg(feature = "logging")]
    log::error!("double fault: {err}");
    (heap.fatal_handler())(err)
}
