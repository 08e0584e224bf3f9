//! Compiler → runtime contract (§4.3, §6): a shared immutable data blob
//! laid out as three logical regions — constants, inner-function
//! references, and bytecode — plus the per-closure register/argument
//! counts that index into it.
//!
//! The upstream layout packs all three regions into one byte buffer with
//! two mid-pointers marking region boundaries. Here the regions are typed
//! (`Value` constants, `HeapRef` inner-function templates, `u32`
//! instructions) rather than raw bytes, since the bytecode format itself is
//! out of scope (§1: "the lexer, compiler, bytecode dispatch loop" are
//! external collaborators) — only the *shape* of the handoff is ours to
//! define.

#[cfg(test)]
mod compiled_fn_test;

use alloc::vec::Vec;

use super::HeapRef;
use crate::value::Value;

/// The shared, independently-refcounted template body (§4.3). Allocated
/// with `TypeTag::FunctionData`; multiple `CompiledTemplate` closures may
/// reference the same `TemplateData` cell.
pub struct TemplateData {
    pub constants: Vec<Value>,
    pub inner_fn_refs: Vec<HeapRef>,
    pub bytecode: Vec<u32>,
}

impl TemplateData {
    #[must_use]
    pub fn new(constants: Vec<Value>, inner_fn_refs: Vec<HeapRef>, bytecode: Vec<u32>) -> Self {
        Self {
            constants,
            inner_fn_refs,
            bytecode,
        }
    }

    /// §3 invariant 5: bytecode never indexes beyond its own data blob.
    #[must_use]
    pub fn pc_in_range(&self, pc: usize) -> bool {
        pc < self.bytecode.len()
    }
}

/// A compiled-function closure: register/argument counts plus a reference
/// to the shared `TemplateData` blob. `nargs` arguments from an incoming
/// call are copied into the first `nargs` of the `nregs` allocated
/// registers (§6 compiler contract).
pub struct CompiledTemplate {
    pub data: HeapRef,
    pub nregs: u32,
    pub nargs: u32,
}

impl CompiledTemplate {
    #[must_use]
    pub const fn new(data: HeapRef, nregs: u32, nargs: u32) -> Self {
        Self {
            data,
            nregs,
            nargs,
        }
    }
}

/// A host-supplied native function wrapper, reachable the same way a
/// compiled function is (§6 "register native function").
pub struct NativeFn {
    pub func: fn(&crate::thread::Thread) -> Result<Value, crate::error::RtError>,
    pub nargs: i32,
}

impl NativeFn {
    #[must_use]
    pub const fn new(
        func: fn(&crate::thread::Thread) -> Result<Value, crate::error::RtError>,
        nargs: i32,
    ) -> Self {
        Self { func, nargs }
    }
}
