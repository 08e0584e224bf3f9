use ecma_abi::TypeTag;

use super::Context;
use crate::error::RtError;
use crate::heap::object::Class;
use crate::heap::HeapPayload;
use crate::value::Value;

#[test]
fn intern_identity_for_equal_strings() {
    let cx = Context::new();
    cx.push_string("foo");
    cx.push_string("bar");
    let b = cx.pop().unwrap();
    let a = cx.pop().unwrap();
    cx.push_value(a);
    cx.push_value(b);
    let rejoined_key = "foobar";
    let interned_once = cx.heap.intern(rejoined_key.as_bytes());
    let interned_twice = cx.heap.intern(rejoined_key.as_bytes());
    assert_eq!(interned_once, interned_twice);
}

#[test]
fn to_number_coerces_primitives() {
    let cx = Context::new();
    cx.push_boolean(true);
    assert_eq!(cx.to_number(-1).unwrap(), 1.0);
    cx.push_null();
    assert_eq!(cx.to_number(-1).unwrap(), 0.0);
    cx.push_string("42");
    assert_eq!(cx.to_number(-1).unwrap(), 42.0);
}

#[test]
fn to_string_value_renders_numbers_and_booleans() {
    let cx = Context::new();
    cx.push_number(3.0);
    let r = cx.to_string_value(-1).unwrap();
    let HeapPayload::String(s) = r.payload() else {
        unreachable!()
    };
    assert_eq!(s.as_bytes(), b"3");
}

#[test]
fn to_object_wraps_booleans() {
    let cx = Context::new();
    cx.push_boolean(true);
    let obj = cx.to_object(-1).unwrap();
    let HeapPayload::Object(o) = obj.payload() else {
        unreachable!()
    };
    assert_eq!(o.class(), Class::BooleanWrapper);
}

#[test]
fn to_object_on_undefined_throws_type_error() {
    let cx = Context::new();
    cx.push_undefined();
    assert!(cx.to_object(-1).is_err());
}

#[test]
fn put_and_get_prop_round_trip() {
    let cx = Context::new();
    let obj_ref = cx.heap.alloc_cell(
        TypeTag::Object,
        HeapPayload::Object(crate::heap::object::HObject::new(Class::Object, None)),
    );
    cx.push_value(Value::Heap(obj_ref));
    cx.push_string("key");
    cx.put_prop(-2, -1, Value::Number(7.0)).unwrap();
    let found = cx.get_prop(-2, -1).unwrap();
    assert_eq!(found, Some(Value::Number(7.0)));
}

#[test]
fn put_prop_increfs_a_heap_value_and_decrefs_the_one_it_displaces() {
    let cx = Context::new();
    let obj_ref = cx.heap.alloc_cell(
        TypeTag::Object,
        HeapPayload::Object(crate::heap::object::HObject::new(Class::Object, None)),
    );
    let first_child = cx.heap.intern(b"first");
    let second_child = cx.heap.intern(b"second");
    cx.push_value(Value::Heap(obj_ref));
    cx.push_string("key");

    cx.put_prop(-2, -1, Value::Heap(first_child)).unwrap();
    assert_eq!(first_child.header().refcount(), 2); // this binding + the property

    cx.put_prop(-2, -1, Value::Heap(second_child)).unwrap();
    assert_eq!(second_child.header().refcount(), 2); // this binding + the property
    assert_eq!(first_child.header().refcount(), 1); // property's strong ref released

    cx.heap.decref(first_child);
    cx.heap.decref(second_child);
}

#[test]
fn del_prop_decrefs_the_removed_heap_value() {
    let cx = Context::new();
    let obj_ref = cx.heap.alloc_cell(
        TypeTag::Object,
        HeapPayload::Object(crate::heap::object::HObject::new(Class::Object, None)),
    );
    let child = cx.heap.intern(b"child");
    cx.push_value(Value::Heap(obj_ref));
    cx.push_string("key");
    cx.put_prop(-2, -1, Value::Heap(child)).unwrap();
    assert_eq!(child.header().refcount(), 2);

    assert!(cx.del_prop(-2, -1).unwrap());
    assert_eq!(child.header().refcount(), 1);

    cx.heap.decref(child);
}

#[test]
fn safe_call_reports_throw_and_truncates_stack() {
    let cx = Context::new();
    let depth = cx.top();
    let outcome = cx.safe_call(|_cx| Err(RtError::type_error("boom")));
    assert!(!outcome.is_success());
    assert_eq!(cx.top(), depth + 1);
}

#[test]
fn safe_call_reports_success() {
    let cx = Context::new();
    let outcome = cx.safe_call(|_cx| Ok(Value::Number(5.0)));
    assert!(outcome.is_success());
    assert_eq!(outcome.value1, Some(Value::Number(5.0)));
}
