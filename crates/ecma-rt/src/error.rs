//! Error taxonomy (§7).
//!
//! No `thiserror`/`anyhow`: a small `Copy` enum plus a hand-written
//! `Display`, matching the teacher's own error-handling style. Script-
//! visible errors additionally carry a best-effort stack trace, captured
//! eagerly but degraded to `None` rather than propagating a *second*
//! failure if capture itself fails (§7: "An error raised while building an
//! error's stack trace is swallowed and replaced with the best-effort
//! partial message").

#[cfg(test)]
mod error_test;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use ecma_abi::ErrorClass;

/// One call-stack frame captured for a thrown error's trace, best-effort.
#[derive(Clone, Debug)]
pub struct TraceFrame {
    pub function_name: Option<String>,
    pub pc: usize,
}

/// A runtime error: an [`ErrorClass`], an optional message, and an optional
/// (possibly partial) stack trace.
#[derive(Clone, Debug)]
pub struct RtError {
    class: ErrorClass,
    message: Option<String>,
    trace: Vec<TraceFrame>,
    trace_truncated: bool,
}

impl RtError {
    #[must_use]
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: Some(message.into()),
            trace: Vec::new(),
            trace_truncated: false,
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.class
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn trace(&self) -> &[TraceFrame] {
        &self.trace
    }

    /// Marks the trace as degraded: capture failed partway and the
    /// remainder is missing, per §7's swallow-and-degrade rule.
    pub fn mark_trace_truncated(&mut self) {
        self.trace_truncated = true;
    }

    #[must_use]
    pub const fn trace_truncated(&self) -> bool {
        self.trace_truncated
    }

    pub fn push_frame(&mut self, frame: TraceFrame) {
        self.trace.push(frame);
    }

    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::TypeError, message)
    }

    #[must_use]
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::RangeError, message)
    }

    #[must_use]
    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ReferenceError, message)
    }

    #[must_use]
    pub fn uri_error(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::UriError, message)
    }

    #[must_use]
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::SyntaxError, message)
    }

    #[must_use]
    pub fn alloc_failed() -> Self {
        Self::new(ErrorClass::AllocFailed, "allocation failed")
    }

    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InternalError, message)
    }

    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, message)
    }
}

impl fmt::Display for RtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {m}", self.class.script_name()),
            None => write!(f, "{}", self.class.script_name()),
        }
    }
}
