//! Per-thread activation/value stacks (§4.6, C8).
//!
//! A thread is itself a heap object (`HeapPayload::Thread`). It owns a
//! value stack addressed by index (never by pointer, since the stack may
//! be reallocated by any push), a call stack of activation records, a
//! catch stack of try/catch/finally scopes, and an optional interrupt
//! counter.

#[cfg(test)]
mod thread_test;

use alloc::vec::Vec;
use core::cell::Cell;

use bitflags::bitflags;

use crate::heap::HeapRef;
use crate::value::Value;

bitflags! {
    /// Activation-record flags (§4.6).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ActivationFlags: u8 {
        const STRICT       = 1 << 0;
        const DIRECT_EVAL  = 1 << 1;
        const TAIL_CALL    = 1 << 2;
        const NEWENV       = 1 << 3;
    }
}

/// A single call-stack frame.
pub struct Activation {
    pub function: HeapRef,
    pub bottom: usize,
    pub pc: usize,
    pub lexical_env: Option<HeapRef>,
    pub variable_env: Option<HeapRef>,
    pub flags: ActivationFlags,
}

/// A try/catch/finally scope, parallel to the call stack it was pushed
/// under.
pub struct CatchEntry {
    pub target_pc: usize,
    pub value_stack_depth: usize,
    pub call_stack_depth: usize,
}

/// Growth/shrink policy for the value stack (§4.6 "geometric doubling...
/// hysteresis threshold prevents oscillation").
const GROWTH_FACTOR: usize = 2;
const SHRINK_HYSTERESIS_PERMILLE: usize = 250; // shrink only below 25% used

pub struct Thread {
    values: Vec<Value>,
    reserved_end: usize,
    calls: Vec<Activation>,
    catches: Vec<CatchEntry>,
    interrupt_counter: Cell<Option<u32>>,
    interrupt_reset: u32,
}

impl Thread {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            reserved_end: 0,
            calls: Vec::new(),
            catches: Vec::new(),
            interrupt_counter: Cell::new(None),
            interrupt_reset: 0,
        }
    }

    #[must_use]
    pub fn top(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.reserved_end
    }

    /// Resolves a possibly-negative index relative to `top`, or an absolute
    /// index relative to the current activation's bottom (§4.6). A negative
    /// `idx` of `-1` refers to the topmost slot.
    #[must_use]
    pub fn resolve_index(&self, idx: isize) -> Option<usize> {
        if idx < 0 {
            let top = self.top() as isize;
            let resolved = top + idx;
            (resolved >= 0).then_some(resolved as usize)
        } else {
            let bottom = self.calls.last().map_or(0, |a| a.bottom);
            Some(bottom + idx as usize)
        }
    }

    #[must_use]
    pub fn get(&self, idx: isize) -> Option<Value> {
        self.resolve_index(idx).and_then(|i| self.values.get(i).copied())
    }

    pub fn set(&mut self, idx: isize, value: Value) -> Option<()> {
        let i = self.resolve_index(idx)?;
        *self.values.get_mut(i)? = value;
        Some(())
    }

    /// Pushes a value, growing the backing storage geometrically when the
    /// reserved region is exhausted. Real growth goes through the heap's
    /// indirect-realloc path (`api::push_*`); this in-process `Vec` already
    /// amortizes the same way, so no explicit grow call is needed here.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
        if self.values.len() > self.reserved_end {
            self.reserved_end = (self.values.len() * GROWTH_FACTOR).max(self.reserved_end + 1);
        }
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// Truncates the value stack to `depth`, applying shrink hysteresis
    /// (§4.6) to the reserved region rather than shrinking on every pop.
    pub fn truncate_values(&mut self, depth: usize) {
        self.values.truncate(depth);
        let used_permille = if self.reserved_end == 0 {
            1000
        } else {
            (self.values.len() * 1000) / self.reserved_end
        };
        if used_permille < SHRINK_HYSTERESIS_PERMILLE {
            self.reserved_end = self.values.len() * GROWTH_FACTOR;
        }
    }

    pub fn push_activation(&mut self, activation: Activation) {
        self.calls.push(activation);
    }

    pub fn pop_activation(&mut self) -> Option<Activation> {
        self.calls.pop()
    }

    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    pub fn truncate_calls(&mut self, depth: usize) {
        self.calls.truncate(depth);
    }

    pub fn push_catch(&mut self, entry: CatchEntry) {
        self.catches.push(entry);
    }

    pub fn pop_catch(&mut self) -> Option<CatchEntry> {
        self.catches.pop()
    }

    #[must_use]
    pub fn catch_depth(&self) -> usize {
        self.catches.len()
    }

    pub fn truncate_catches(&mut self, depth: usize) {
        self.catches.truncate(depth);
    }

    pub fn set_interrupt_counter(&self, ticks: u32) {
        self.interrupt_counter.set(Some(ticks));
    }

    pub fn disable_interrupt(&self) {
        self.interrupt_counter.set(None);
    }

    /// Ticks the interrupt counter down by one dispatched instruction;
    /// returns `true` when it reaches zero (the caller should invoke the
    /// host hook, which may throw).
    #[must_use]
    pub fn tick_interrupt(&self) -> bool {
        match self.interrupt_counter.get() {
            Some(0) => {
                self.interrupt_counter.set(Some(self.interrupt_reset));
                true
            }
            Some(n) => {
                self.interrupt_counter.set(Some(n - 1));
                false
            }
            None => false,
        }
    }

    /// Every `Value` this thread owns a strong reference to — every value
    /// stack slot, plus each activation's function/environment references
    /// (§4.4/§4.5 roots).
    pub fn owned_values(&self) -> impl Iterator<Item = Value> + '_ {
        let from_calls = self.calls.iter().flat_map(|a| {
            [
                Some(Value::Heap(a.function)),
                a.lexical_env.map(Value::Heap),
                a.variable_env.map(Value::Heap),
            ]
            .into_iter()
            .flatten()
        });
        self.values.iter().copied().chain(from_calls)
    }
}

impl Default for Thread {
    fn default() -> Self {
        Self::new()
    }
}
