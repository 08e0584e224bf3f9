//! Protected-call non-local exit reasons (§4.7, C9).

#[cfg(test)]
mod exit_test;

/// Why a protected call's callback stopped running normally.
///
/// This is the tag half of the `(reason, value1, value2, iserror)` tuple
/// from §4.7's table; the payload values themselves travel alongside as
/// tagged values on the owning thread, not inside this enum, so that
/// `ExitReason` stays `Copy` and FFI-stable.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The callback ran to completion; `value1` is its result.
    Normal = 0,
    /// An explicit `return`; `value1` is the returned value.
    Return = 1,
    /// An uncaught `throw`; `value1` is the thrown value (always `iserror`).
    Throw = 2,
    /// A `break` unwinding to a labeled (or innermost) loop; `value1` is the
    /// label id (0 for an unlabeled break).
    Break = 3,
    /// A `continue`; `value1` is the label id.
    Continue = 4,
    /// A generator/coroutine `yield`; `value1` is the yielded value.
    Yield = 5,
    /// A `resume` transferring control into another thread; `value1` is the
    /// value handed to the resumee, `value2` identifies the resumee thread.
    Resume = 6,
}

impl ExitReason {
    /// Whether this reason carries two payload values (`value1` and
    /// `value2`) rather than one. Only `Resume` does, per §4.7's table.
    #[must_use]
    pub const fn has_value2(self) -> bool {
        matches!(self, Self::Resume)
    }

    /// Whether unwinding to an enclosing protected call must stop unwinding
    /// *at this reason* rather than only at a matching construct
    /// (`break`/`continue` stop at a loop or labeled statement inside script
    /// execution; `Throw` is the only reason a *protected call itself* ever
    /// reports as non-success, per §4.7: "status plus the top value (the
    /// thrown error, for `throw`)").
    #[must_use]
    pub const fn is_protected_call_failure(self) -> bool {
        matches!(self, Self::Throw)
    }
}
