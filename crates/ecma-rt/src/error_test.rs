use ecma_abi::ErrorClass;

use super::{RtError, TraceFrame};

#[test]
fn display_includes_class_and_message() {
    let e = RtError::type_error("not a function");
    let rendered = alloc::format!("{e}");
    assert_eq!(rendered, "TypeError: not a function");
}

#[test]
fn internal_kinds_still_map_to_their_script_name() {
    let e = RtError::alloc_failed();
    assert_eq!(e.class(), ErrorClass::AllocFailed);
    assert_eq!(alloc::format!("{e}"), "RangeError: allocation failed");
}

#[test]
fn trace_starts_empty_and_accumulates_frames() {
    let mut e = RtError::internal_error("x");
    assert!(e.trace().is_empty());
    e.push_frame(TraceFrame {
        function_name: Some(alloc::string::String::from("foo")),
        pc: 3,
    });
    assert_eq!(e.trace().len(), 1);
    assert!(!e.trace_truncated());
    e.mark_trace_truncated();
    assert!(e.trace_truncated());
}
