//! Heap object header flag bits (§3, C3; §4.5, C7; §4.4, C6).

#[cfg(test)]
mod flags_test;

use bitflags::bitflags;

bitflags! {
    /// Flag bits carried in every heap object header.
    ///
    /// The low bits are GC-phase bookkeeping shared by every object; the
    /// high bits (`FEATURE_0`/`FEATURE_1`) are reserved for per-type use
    /// (e.g. a thread's "has pending interrupt" bit, an object's "is
    /// arguments object" bit) and are never interpreted by the heap itself.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HeaderFlags: u16 {
        /// Set by the mark phase on every object reachable from a root.
        /// Cleared by sweep after the object survives a cycle.
        const REACHABLE = 1 << 0;
        /// Set when recursive marking bottomed out on this object because the
        /// recursion depth limit was hit. A re-scan pass revisits every
        /// `TEMPROOT` object until none remain (§4.5 phase 1).
        const TEMPROOT = 1 << 1;
        /// The object carries a finalizer that has not yet fired.
        const FINALIZABLE = 1 << 2;
        /// The object's finalizer has already run exactly once. A second run
        /// must never happen, even if the object resurrected itself.
        const FINALIZED = 1 << 3;
        /// Set while the object sits on the sweep's finalize list, between
        /// finalizer-scan (§4.5 phase 2) and the finalizer actually firing.
        const PENDING_FINALIZE = 1 << 4;
        /// Per-type feature bit 0 (e.g. "arguments object", "strict thread").
        const FEATURE_0 = 1 << 14;
        /// Per-type feature bit 1.
        const FEATURE_1 = 1 << 15;
    }
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}
