//! CommonJS-style module resolution (§6).
//!
//! Resolution is pure path algebra over `/`-separated ids; loading
//! (invoking `modSearch`, compiling the result, populating `exports`) is
//! left to the host, since the compiler is out of scope (§1). This module
//! owns exactly the part the spec places in the runtime core: id
//! resolution and the `modLoaded` cache that supports partial cycles.

#[cfg(test)]
mod module_test;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::RtError;
use crate::heap::HeapRef;

/// Resolves `requested` relative to `current`, per §6 step 1-2:
/// 1. A requested id starting with `.` is resolved against
///    `current + "/../" + requested`; otherwise it is used as-is.
/// 2. The combined path is split on `/`; `.` segments are dropped, `..`
///    pops the last resolved segment (an error if there is nothing to
///    pop), any other segment is appended. A segment starting with `.`
///    that isn't exactly `.` or `..` is rejected, as is an empty segment.
pub fn resolve_module_id(current: &str, requested: &str) -> Result<String, RtError> {
    // A bare "." or ".." names no concrete module of its own, only the
    // current directory; reject it rather than silently resolving to a
    // prefix of `current` (see DESIGN.md's Open Question resolution).
    if requested == "." || requested == ".." {
        return Err(RtError::type_error(
            "module id must name something below the current directory",
        ));
    }

    let input = if requested.starts_with('.') {
        alloc::format!("{current}/../{requested}")
    } else {
        requested.to_string()
    };

    let mut resolved: Vec<&str> = Vec::new();
    for segment in input.split('/') {
        if segment.is_empty() {
            return Err(RtError::type_error("module id contains an empty segment"));
        }
        if segment == "." {
            continue;
        }
        if segment == ".." {
            if resolved.pop().is_none() {
                return Err(RtError::type_error(
                    "module id attempts to resolve above the root",
                ));
            }
            continue;
        }
        if segment.starts_with('.') {
            return Err(RtError::type_error(
                "module id segment cannot start with '.' unless it is '.' or '..'",
            ));
        }
        resolved.push(segment);
    }

    if resolved.is_empty() {
        return Err(RtError::type_error("module id resolves to the empty path"));
    }

    Ok(resolved.join("/"))
}

/// The `modLoaded` cache: resolved id → exports object, plus whether that
/// module has finished loading (§6 step 3: "A hit returns the cached
/// exports even if loading is still in progress", supporting partial
/// cycles between modules that `require` each other).
#[derive(Default)]
pub struct ModuleCache {
    entries: BTreeMap<String, LoadStateRepr>,
}

struct LoadStateRepr {
    exports: HeapRef,
    loaded: bool,
}

impl ModuleCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, resolved_id: &str) -> Option<HeapRef> {
        self.entries.get(resolved_id).map(|e| e.exports)
    }

    #[must_use]
    pub fn is_loaded(&self, resolved_id: &str) -> bool {
        self.entries.get(resolved_id).is_some_and(|e| e.loaded)
    }

    /// Registers an in-progress load (called before invoking `modSearch`,
    /// so a cyclic `require` sees the partially built `exports`).
    pub fn begin_load(&mut self, resolved_id: String, exports: HeapRef) {
        self.entries.insert(resolved_id, LoadStateRepr { exports, loaded: false });
    }

    pub fn finish_load(&mut self, resolved_id: &str) {
        if let Some(entry) = self.entries.get_mut(resolved_id) {
            entry.loaded = true;
        }
    }
}

/// Builds the `(function(require,exports,module){ ... })` wrapper source
/// used to compile a `modSearch`-returned source string (§6 step 4). The
/// actual compile step is out of scope; this produces the exact wrapped
/// source text a compiler would consume, with `fileName` set to `id`
/// (left to the caller, since source-position metadata isn't a value this
/// function returns).
#[must_use]
pub fn wrap_module_source(source: &str) -> String {
    alloc::format!("(function(require,exports,module){{{source}\n}})")
}
