//! End-to-end scenarios exercising `ecma-rt` through its public surface.

mod common;

use ecma_rt::uri;
use ecma_rt::value::Value;
use ecma_rt::{heap::HeapPayload, module};

use common::fresh_context;

#[test]
fn interning_the_same_bytes_twice_yields_identical_references() {
    let ctx = fresh_context();
    let a = ctx.heap.intern(b"length");
    let b = ctx.heap.intern(b"length");
    assert_eq!(a, b);
    ctx.heap.decref(a);
    ctx.heap.decref(b);
}

#[test]
fn encode_uri_component_then_decode_round_trips_through_the_public_api() {
    let input = "a b/c";
    let encoded = uri::encode_uri_component(input);
    assert_eq!(encoded, "a%20b%2Fc");
    assert_eq!(uri::decode_uri_component(&encoded).unwrap(), input);
}

#[test]
fn decode_uri_rejects_overlong_utf8_encoding() {
    assert!(uri::decode_uri("%C0%80").is_err());
}

#[test]
fn force_gc_reclaims_an_unrooted_object_left_behind_by_a_coercion() {
    let ctx = fresh_context();
    ctx.push_number(7.0);
    let _wrapped = ctx.to_object(-1).unwrap(); // allocates a NumberWrapper, not rooted anywhere
    ctx.pop();

    assert!(ctx.heap.object_count() > 1);
    ctx.force_gc();
    assert_eq!(ctx.heap.object_count(), 1); // only the context's own thread remains
}

#[test]
fn safe_call_truncates_stacks_and_reports_a_thrown_error() {
    let ctx = fresh_context();
    ctx.push_number(1.0);
    let depth_before = ctx.top();

    let outcome = ctx.safe_call(|ctx| {
        ctx.push_number(2.0);
        ctx.push_number(3.0);
        Err(ecma_rt::RtError::type_error("deliberate failure"))
    });

    assert!(!outcome.is_success());
    assert!(outcome.is_error);
    assert_eq!(ctx.top(), depth_before + 1); // the thrown error value was pushed back
}

#[test]
fn safe_call_returns_the_body_value_on_success() {
    let ctx = fresh_context();
    let outcome = ctx.safe_call(|_ctx| Ok(Value::Number(42.0)));
    assert!(outcome.is_success());
    assert_eq!(outcome.value1, Some(Value::Number(42.0)));
}

#[test]
fn module_ids_resolve_relative_to_the_requiring_module() {
    let resolved = module::resolve_module_id("a/b", "./c").unwrap();
    assert_eq!(resolved, "a/c");
}

#[test]
fn a_bare_dot_module_id_is_rejected() {
    assert!(module::resolve_module_id("a/b", ".").is_err());
}

#[test]
fn push_string_interns_and_is_readable_back() {
    let ctx = fresh_context();
    ctx.push_string("hello");
    let r = ctx.to_string_value(-1).unwrap();
    let HeapPayload::String(s) = r.payload() else {
        panic!("expected a string payload");
    };
    assert_eq!(s.as_bytes(), b"hello");
}
