use ecma_abi::{PropAttr, TypeTag};

use super::object::{Class, HObject};
use super::{Heap, HeapPayload};

#[test]
fn decref_to_zero_reclaims_the_object() {
    let heap = Heap::new();
    let obj = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    assert_eq!(heap.object_count(), 1);
    heap.decref(obj);
    assert_eq!(heap.object_count(), 0);
}

#[test]
fn decref_cascades_through_owned_children() {
    let heap = Heap::new();
    let child = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    let parent_obj = HObject::new(Class::Array, None);
    let key = heap.intern(b"0");
    // Storing into the array part is a move: the child's sole strong
    // reference (from `alloc_cell`) transfers to the parent, it isn't
    // duplicated. The array index form of `key` isn't itself retained by
    // array storage, so its reference stays with this local binding.
    parent_obj
        .define_own(key, crate::value::Value::Heap(child), PropAttr::default_data())
        .unwrap();
    heap.decref(key);
    let parent = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(parent_obj));

    assert_eq!(heap.object_count(), 3); // parent, child, interned "0"

    heap.decref(parent);

    assert_eq!(heap.object_count(), 0);
}

#[test]
fn forget_string_removes_table_entry_on_zero_refcount() {
    let heap = Heap::new();
    let s = heap.intern(b"transient");
    let hash = heap.string_table().borrow().hash(b"transient");
    assert!(heap.string_table().borrow().find(hash, b"transient").is_some());

    heap.decref(s);

    assert!(heap.string_table().borrow().find(hash, b"transient").is_none());
    assert_eq!(heap.object_count(), 0);
}

#[test]
fn long_reference_chain_collapses_without_recursing() {
    // Each object holds the next one at array index 0; dropping the head's
    // sole external reference should walk the whole chain via the refzero
    // FIFO, not the Rust call stack.
    let heap = Heap::new();
    let key = heap.intern(b"0");

    let mut tail: Option<super::HeapRef> = None;
    for _ in 0..2000 {
        let obj = HObject::new(Class::Object, None);
        if let Some(t) = tail {
            obj.define_own(key, crate::value::Value::Heap(t), PropAttr::default_data())
                .unwrap();
        }
        tail = Some(heap.alloc_cell(TypeTag::Object, HeapPayload::Object(obj)));
    }
    heap.decref(key);

    assert_eq!(heap.object_count(), 2000);
    heap.decref(tail.unwrap());
    assert_eq!(heap.object_count(), 0);
}
