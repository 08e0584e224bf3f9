//! Heap object type tags (§3, C3).

#[cfg(test)]
mod tag_test;

/// The type of a heap allocation, stored in its [`crate::HeaderFlags`]-carrying
/// header.
///
/// Ordering is not meaningful; the numeric values are part of the ABI
/// contract with the bytecode compiler/executor (internal property keys,
/// disassembly output, heap-dump tooling) and must not be reassigned once a
/// host depends on them.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Immutable interned byte string.
    String = 0,
    /// Plain or class-tagged object (array part + sparse part).
    Object = 1,
    /// Raw byte buffer (fixed or dynamic).
    Buffer = 2,
    /// An ECMAScript thread (coroutine): value stack + call/catch stacks.
    Thread = 3,
    /// Lexical or variable environment record.
    Env = 4,
    /// A compiled function template plus closure state.
    CompiledFunction = 5,
    /// A function backed by a host (Rust) callback.
    NativeFunction = 6,
    /// A compiled function template's shared, refcounted data blob.
    FunctionData = 7,
}

impl TypeTag {
    /// Whether objects of this tag may carry a finalizer.
    #[must_use]
    pub const fn finalizable(self) -> bool {
        matches!(self, Self::Object | Self::Buffer | Self::Thread)
    }
}
