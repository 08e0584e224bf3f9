//! Shared tag, flag and error-class definitions for the managed runtime.
//!
//! This crate defines the contract between the runtime core (`ecma-rt`) and
//! any out-of-crate collaborator that needs to agree on the same constants
//! without linking the whole runtime: a bytecode compiler, a bytecode
//! executor, or host-side tooling that inspects a heap dump.
//!
//! # Design principles
//!
//! - **No dependencies beyond `bitflags`**: pure data types, 100% host-testable.
//! - **Stable representation**: every enum here is `#[repr(u8)]` or `#[repr(C)]`
//!   so it can cross an FFI boundary unchanged.
//! - **No allocation**: nothing in this crate owns heap memory.
//!
//! # Modules
//!
//! - [`tag`]: heap object type tags ([`tag::TypeTag`])
//! - [`flags`]: GC and per-type header flag bits ([`flags::HeaderFlags`])
//! - [`attr`]: ES5.1 property attribute bits ([`attr::PropAttr`])
//! - [`error_class`]: the `Error` class taxonomy ([`error_class::ErrorClass`])
//! - [`exit`]: protected-call non-local exit reasons ([`exit::ExitReason`])

#![no_std]

pub mod attr;
pub mod error_class;
pub mod exit;
pub mod flags;
pub mod tag;

pub use attr::PropAttr;
pub use error_class::ErrorClass;
pub use exit::ExitReason;
pub use flags::HeaderFlags;
pub use tag::TypeTag;
