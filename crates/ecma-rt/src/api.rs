//! Public host-facing stack API (§4.8, C10).
//!
//! Every operation addresses values by integer index into the active
//! thread's value stack, never by pointer, since the stack may be
//! reallocated by any push (§4.6/§9 "Interior pointers across
//! reallocation"). [`Context`] bundles a [`Heap`] with its current
//! [`Thread`] the way an embedder acquires one handle per script
//! invocation.

#[cfg(test)]
mod api_test;

use alloc::string::String;
use alloc::vec::Vec;

use ecma_abi::{ExitReason, PropAttr, TypeTag};

use crate::host_alloc::{HostAlloc, SystemAlloc};
use crate::error::RtError;
use crate::heap::compiled_fn::NativeFn;
use crate::heap::object::{Class, HObject};
use crate::heap::{Heap, HeapOptions, HeapPayload, HeapRef};
use crate::protect::{self, CallOutcome};
use crate::thread::Thread;
use crate::value::Value;

/// A bound heap + active thread, the unit a host acquires to push values
/// and invoke script (§2 "host code acquires a context").
pub struct Context<A: HostAlloc = SystemAlloc> {
    pub heap: Heap<A>,
    thread_ref: HeapRef,
}

impl Context<SystemAlloc> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(HeapOptions::default())
    }

    #[must_use]
    pub fn with_options(options: HeapOptions) -> Self {
        Self::with_allocator(SystemAlloc, options)
    }
}

impl Default for Context<SystemAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: HostAlloc> Context<A> {
    #[must_use]
    pub fn with_allocator(alloc: A, options: HeapOptions) -> Self {
        let heap = Heap::with_allocator(alloc, options);
        let thread_ref = heap.alloc_cell(TypeTag::Thread, HeapPayload::Thread(Thread::new()));
        heap.set_curr_thread(Some(thread_ref));
        Self { heap, thread_ref }
    }

    #[must_use]
    pub fn thread_ref(&self) -> HeapRef {
        self.thread_ref
    }

    fn with_thread<R>(&self, f: impl FnOnce(&mut Thread) -> R) -> R {
        // SAFETY: single-threaded cooperative model (§5) — no other borrow
        // of this thread's payload is outstanding while `f` runs, since
        // every other `Context` method also confines its borrow to one
        // `with_thread` call.
        let HeapPayload::Thread(thread) = (unsafe { self.thread_ref.payload_mut() }) else {
            unreachable!("context's thread_ref is not a Thread cell")
        };
        f(thread)
    }

    #[must_use]
    pub fn top(&self) -> usize {
        self.with_thread(Thread::top)
    }

    #[must_use]
    pub fn get(&self, idx: isize) -> Option<Value> {
        self.with_thread(|t| t.get(idx))
    }

    pub fn push_undefined(&self) {
        self.with_thread(|t| t.push(Value::Undefined));
    }

    pub fn push_null(&self) {
        self.with_thread(|t| t.push(Value::Null));
    }

    pub fn push_boolean(&self, value: bool) {
        self.with_thread(|t| t.push(Value::Boolean(value)));
    }

    pub fn push_number(&self, value: f64) {
        self.with_thread(|t| t.push(Value::Number(value)));
    }

    pub fn push_string(&self, s: &str) {
        let r = self.heap.intern(s.as_bytes());
        self.with_thread(|t| t.push(Value::Heap(r)));
    }

    pub fn push_value(&self, value: Value) {
        if let Some(h) = value.as_heap() {
            h.header().incref();
        }
        self.with_thread(|t| t.push(value));
    }

    pub fn pop(&self) -> Option<Value> {
        let v = self.with_thread(Thread::pop);
        if let Some(h) = v.and_then(|v| v.as_heap()) {
            self.heap.decref(h);
        }
        v
    }

    /// ES5.1 §9.2 `ToBoolean` (§4.8).
    #[must_use]
    pub fn to_boolean(&self, idx: isize) -> Option<bool> {
        self.get(idx).map(|v| v.to_boolean())
    }

    /// ES5.1 §9.3 `ToNumber` (§4.8). Objects would need `valueOf`/`toString`
    /// invocation through the (out-of-scope) executor to fully implement
    /// `ToPrimitive`; this covers every primitive exactly and falls back to
    /// `NaN` for objects, a documented simplification (see `DESIGN.md`).
    pub fn to_number(&self, idx: isize) -> Result<f64, RtError> {
        let value = self
            .get(idx)
            .ok_or_else(|| RtError::internal_error("stack index out of range"))?;
        Ok(match value {
            Value::Number(n) => n,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) | Value::Null => 0.0,
            Value::Undefined => f64::NAN,
            Value::Heap(h) => match h.payload() {
                HeapPayload::String(s) => parse_number(s.as_bytes()),
                _ => f64::NAN,
            },
        })
    }

    /// ES5.1 §9.8 `ToString` (§4.8), returning an interned string
    /// reference. As with `to_number`, object `toString`/`valueOf`
    /// invocation is out of scope; objects render as `"[object Object]"`.
    pub fn to_string_value(&self, idx: isize) -> Result<HeapRef, RtError> {
        let value = self
            .get(idx)
            .ok_or_else(|| RtError::internal_error("stack index out of range"))?;
        let rendered = match value {
            Value::Undefined => String::from("undefined"),
            Value::Null => String::from("null"),
            Value::Boolean(true) => String::from("true"),
            Value::Boolean(false) => String::from("false"),
            Value::Number(n) => format_number(n),
            Value::Heap(h) => match h.payload() {
                HeapPayload::String(_) => return Ok(h),
                _ => String::from("[object Object]"),
            },
        };
        Ok(self.heap.intern(rendered.as_bytes()))
    }

    /// ES5.1 §9.9 `ToObject` (§4.8): wraps a primitive in the matching
    /// wrapper class; an object coerces to itself.
    pub fn to_object(&self, idx: isize) -> Result<HeapRef, RtError> {
        let value = self
            .get(idx)
            .ok_or_else(|| RtError::internal_error("stack index out of range"))?;
        match value {
            Value::Undefined | Value::Null => {
                Err(RtError::type_error("cannot convert undefined or null to object"))
            }
            Value::Heap(h) => Ok(h),
            Value::Boolean(_) => Ok(self.wrap(Class::BooleanWrapper, value)),
            Value::Number(_) => Ok(self.wrap(Class::NumberWrapper, value)),
        }
    }

    fn wrap(&self, class: Class, primitive: Value) -> HeapRef {
        let obj = HObject::new(class, None);
        let key = self.heap.intern(b"\x00primitive");
        let _ = obj.define_own(key, primitive, PropAttr::empty());
        self.heap.alloc_cell(TypeTag::Object, HeapPayload::Object(obj))
    }

    /// Reads an object's property by key, walking the prototype chain
    /// (§4.8 `get_prop`). Both `obj_idx` and `key_idx` must resolve to
    /// values currently on the stack.
    pub fn get_prop(&self, obj_idx: isize, key_idx: isize) -> Result<Option<Value>, RtError> {
        let obj = self.heap_ref_at(obj_idx)?;
        let key = self.string_ref_at(key_idx)?;
        let HeapPayload::Object(_) = obj.payload() else {
            return Err(RtError::type_error("get_prop target is not an object"));
        };
        HObject::get(obj, key)
    }

    pub fn put_prop(&self, obj_idx: isize, key_idx: isize, value: Value) -> Result<(), RtError> {
        let obj = self.heap_ref_at(obj_idx)?;
        let key = self.string_ref_at(key_idx)?;
        let HeapPayload::Object(o) = obj.payload() else {
            return Err(RtError::type_error("put_prop target is not an object"));
        };
        let old = o.get_own(key).map(|(v, _)| v);
        if let Some(h) = value.as_heap() {
            h.header().incref();
        }
        if let Err(e) = o.define_own(key, value, PropAttr::default_data()) {
            if let Some(h) = value.as_heap() {
                self.heap.decref(h);
            }
            return Err(e);
        }
        if let Some(h) = old.and_then(|v| v.as_heap()) {
            self.heap.decref(h);
        }
        Ok(())
    }

    pub fn has_prop(&self, obj_idx: isize, key_idx: isize) -> Result<bool, RtError> {
        Ok(self.get_prop(obj_idx, key_idx)?.is_some())
    }

    pub fn del_prop(&self, obj_idx: isize, key_idx: isize) -> Result<bool, RtError> {
        let obj = self.heap_ref_at(obj_idx)?;
        let key = self.string_ref_at(key_idx)?;
        let HeapPayload::Object(o) = obj.payload() else {
            return Err(RtError::type_error("del_prop target is not an object"));
        };
        let old = o.get_own(key).map(|(v, _)| v);
        let deleted = o.delete_own(key);
        if deleted {
            if let Some(h) = old.and_then(|v| v.as_heap()) {
                self.heap.decref(h);
            }
        }
        Ok(deleted)
    }

    fn heap_ref_at(&self, idx: isize) -> Result<HeapRef, RtError> {
        self.get(idx)
            .and_then(|v| v.as_heap())
            .ok_or_else(|| RtError::type_error("expected a heap reference at this index"))
    }

    fn string_ref_at(&self, idx: isize) -> Result<HeapRef, RtError> {
        let r = self.heap_ref_at(idx)?;
        match r.payload() {
            HeapPayload::String(_) => Ok(r),
            _ => Err(RtError::type_error("expected an interned string key")),
        }
    }

    /// Registers a native function as a property of `obj_idx` (§6 "register
    /// native function in the global object or a property").
    pub fn register_native(
        &self,
        obj_idx: isize,
        name: &str,
        func: fn(&Thread) -> Result<Value, RtError>,
        nargs: i32,
    ) -> Result<(), RtError> {
        let obj = self.heap_ref_at(obj_idx)?;
        let HeapPayload::Object(o) = obj.payload() else {
            return Err(RtError::type_error("register_native target is not an object"));
        };
        let native = NativeFn::new(func, nargs);
        let native_ref = self
            .heap
            .alloc_cell(TypeTag::NativeFunction, HeapPayload::NativeFunction(native));
        let key = self.heap.intern(name.as_bytes());
        o.define_own(key, Value::Heap(native_ref), PropAttr::default_data())
    }

    /// Calls a protected call (§4.8 `safe_call`), truncating the stacks to
    /// their pre-call depths on a thrown error (§4.7).
    pub fn safe_call(
        &self,
        body: impl FnOnce(&Self) -> Result<Value, RtError>,
    ) -> CallOutcome {
        let pad = self.with_thread(|t| (t.top(), t.call_depth(), t.catch_depth()));
        match body(self) {
            Ok(value) => CallOutcome {
                reason: ExitReason::Return,
                value1: Some(value),
                value2: None,
                is_error: false,
            },
            Err(err) => {
                self.with_thread(|t| {
                    t.truncate_values(pad.0);
                    t.truncate_calls(pad.1);
                    t.truncate_catches(pad.2);
                });
                let error_value = protect::error_to_value(&self.heap, &err);
                self.with_thread(|t| t.push(error_value));
                CallOutcome {
                    reason: ExitReason::Throw,
                    value1: Some(error_value),
                    value2: None,
                    is_error: true,
                }
            }
        }
    }

    /// Forces a garbage-collection cycle (§6 "force garbage collection").
    pub fn force_gc(&self) {
        self.heap.force_gc();
    }
}

fn parse_number(bytes: &[u8]) -> f64 {
    core::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return String::from("NaN");
    }
    if n.is_infinite() {
        return String::from(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if n == 0.0 {
        return String::from("0");
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return alloc::format!("{n:.0}");
    }
    alloc::format!("{n}")
}

/// Compiled-function template construction entry point (§4.8 `compile`'s
/// host-visible shape): consumes constants/inner-fn-refs/bytecode and
/// produces a `CompiledTemplate` heap reference. The lexer/compiler that
/// would normally feed this is out of scope (§1); this exists so a host or
/// test harness that already has bytecode can install it.
pub fn install_compiled_template<A: HostAlloc>(
    heap: &Heap<A>,
    constants: Vec<Value>,
    inner_fn_refs: Vec<HeapRef>,
    bytecode: Vec<u32>,
    nregs: u32,
    nargs: u32,
) -> HeapRef {
    let data = crate::heap::compiled_fn::TemplateData::new(constants, inner_fn_refs, bytecode);
    let data_ref = heap.alloc_cell(TypeTag::FunctionData, HeapPayload::TemplateData(data));
    let template = crate::heap::compiled_fn::CompiledTemplate::new(data_ref, nregs, nargs);
    heap.alloc_cell(TypeTag::CompiledFunction, HeapPayload::CompiledFunction(template))
}
