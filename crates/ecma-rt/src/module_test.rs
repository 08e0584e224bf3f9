use super::{resolve_module_id, wrap_module_source, ModuleCache};
use crate::heap::object::{Class, HObject};
use crate::heap::{Heap, HeapPayload};
use ecma_abi::TypeTag;

#[test]
fn relative_require_resolves_against_parent_dir() {
    // §8 scenario 6: from "a/b", requiring "../c/./d" resolves to "c/d".
    assert_eq!(resolve_module_id("a/b", "../c/./d").unwrap(), "c/d");
}

#[test]
fn bare_id_is_used_as_is_modulo_dot_segments() {
    assert_eq!(resolve_module_id("a/b", "x/y").unwrap(), "x/y");
}

#[test]
fn dot_alone_is_rejected() {
    // §8 scenario 6: requiring "." throws.
    assert!(resolve_module_id("a/b", ".").is_err());
}

#[test]
fn leading_slash_produces_an_empty_segment_and_is_rejected() {
    // §8 scenario 6: requiring "/x" throws.
    assert!(resolve_module_id("a/b", "/x").is_err());
}

#[test]
fn popping_past_the_root_is_an_error() {
    assert!(resolve_module_id("a", "../../x").is_err());
}

#[test]
fn dot_dot_segments_pop_exactly_one_resolved_term() {
    assert_eq!(resolve_module_id("a/b/c", "../../x").unwrap(), "a/x");
}

#[test]
fn wrap_module_source_produces_the_commonjs_shim() {
    let wrapped = wrap_module_source("exports.x = 1;");
    assert!(wrapped.starts_with("(function(require,exports,module){"));
    assert!(wrapped.contains("exports.x = 1;"));
}

#[test]
fn module_cache_supports_partial_cycles() {
    let heap = Heap::new();
    let exports = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    let mut cache = ModuleCache::new();
    cache.begin_load(alloc::string::String::from("a"), exports);
    assert!(!cache.is_loaded("a"));
    assert_eq!(cache.get("a"), Some(exports));
    cache.finish_load("a");
    assert!(cache.is_loaded("a"));
}
