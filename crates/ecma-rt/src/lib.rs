//! # ecma-rt
//!
//! Embeddable managed runtime core for an ES5.1 interpreter.
//!
//! This crate provides the host-facing substrate an ES5.1 lexer/compiler
//! and bytecode executor are built on top of, but does not itself parse or
//! execute script:
//!
//! - Tagged value representation ([`value`])
//! - Heap object header, string interning, object/property store, and both
//!   garbage collectors ([`heap`])
//! - Per-thread activation/value/catch stacks ([`thread`])
//! - Protected-call non-local exit ([`protect`])
//! - The public host-facing stack API ([`api`])
//! - CommonJS-style module id resolution ([`module`])
//! - ES5.1 URI built-ins and the Annex B.2 `escape`/`unescape` pair ([`uri`])
//! - XUTF-8/CESU-8 string encoding helpers ([`unicode`])
//!
//! The lexer/compiler, bytecode executor, and the JSON/RegExp/Number
//! built-ins are out of scope; they're expected to be built as separate
//! crates against the [`api::Context`] surface this crate exposes.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` by default outside of tests. The `std` feature
//! (on by default) enables OS randomness for the string table's hash seed;
//! disable it for a bare `alloc`-only embedding, in which case the host
//! must supply its own seed via [`heap::HeapOptions`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(not(any(test, feature = "std")))]
extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate alloc;


pub mod api;
pub mod error;
pub mod heap;
pub mod host_alloc;
pub mod module;
pub mod protect;
pub mod thread;
pub mod unicode;
pub mod uri;
pub mod value;

pub use api::Context;
pub use error::RtError;
pub use heap::{Heap, HeapOptions, HeapRef};
pub use thread::Thread;
pub use value::Value;

/// Crate version for runtime queries.
///
/// Uses the git-derived version from the `ECMA_RT_VERSION` environment
/// variable when available, falling back to "unknown" otherwise.
pub const VERSION: &str = match option_env!("ECMA_RT_VERSION") {
    Some(v) => v,
    None => "unknown",
};
