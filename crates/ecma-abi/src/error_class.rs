//! The ECMAScript `Error` class taxonomy (§7).

#[cfg(test)]
mod error_class_test;

use core::fmt;

/// The standard ES5.1 error classes, plus the internal-only kinds the
/// runtime itself can raise. Internal kinds map to their closest standard
/// class (or plain `Error`) whenever they cross into script-visible territory
/// (§7 "Taxonomy").
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Error = 0,
    EvalError = 1,
    RangeError = 2,
    ReferenceError = 3,
    SyntaxError = 4,
    TypeError = 5,
    UriError = 6,
    /// Allocation through C1 returned null and GC could not recover.
    AllocFailed = 7,
    /// An internal invariant was violated (e.g. a double fault).
    InternalError = 8,
    /// The host asked for something this build does not implement.
    Unsupported = 9,
}

impl ErrorClass {
    /// The `.name` a script would observe on an instance of this class
    /// (`e.name` for a caught error). Internal-only kinds surface under the
    /// standard class they are closest to.
    #[must_use]
    pub const fn script_name(self) -> &'static str {
        match self {
            Self::Error | Self::InternalError | Self::Unsupported => "Error",
            Self::EvalError => "EvalError",
            Self::RangeError | Self::AllocFailed => "RangeError",
            Self::ReferenceError => "ReferenceError",
            Self::SyntaxError => "SyntaxError",
            Self::TypeError => "TypeError",
            Self::UriError => "URIError",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.script_name())
    }
}
