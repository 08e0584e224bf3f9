//! Shared integration-test helpers.

use ecma_rt::Context;

/// A freshly-built context with nothing pushed on its value stack.
pub fn fresh_context() -> Context {
    Context::new()
}
