use ecma_abi::{PropAttr, TypeTag};

use super::gc::{run_cycle, GcFlags};
use super::object::{Class, HObject};
use super::{Heap, HeapPayload, HeapRunFlags};
use crate::thread::Thread;
use crate::value::Value;

fn heap_with_thread() -> (Heap, super::HeapRef) {
    let heap = Heap::new();
    let thread = heap.alloc_cell(TypeTag::Thread, HeapPayload::Thread(Thread::new()));
    heap.set_curr_thread(Some(thread));
    (heap, thread)
}

#[test]
fn object_reachable_from_the_current_thread_survives() {
    let (heap, thread) = heap_with_thread();
    let obj = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    // SAFETY: sole borrow of the thread payload, no aliasing borrow live.
    let HeapPayload::Thread(t) = (unsafe { thread.payload_mut() }) else {
        unreachable!()
    };
    t.push(Value::Heap(obj));

    assert_eq!(heap.object_count(), 2);
    run_cycle(&heap, GcFlags::empty());
    assert_eq!(heap.object_count(), 2);
    assert!(!obj.header().flags().contains(ecma_abi::HeaderFlags::REACHABLE));
}

#[test]
fn unreachable_object_is_collected() {
    let (heap, _thread) = heap_with_thread();
    let _obj = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));

    assert_eq!(heap.object_count(), 2);
    run_cycle(&heap, GcFlags::empty());
    assert_eq!(heap.object_count(), 1);
}

#[test]
fn unreachable_reference_cycle_is_collected() {
    let (heap, _thread) = heap_with_thread();
    let a = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    let b = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    let key = heap.intern(b"0");
    let HeapPayload::Object(a_obj) = a.payload() else { unreachable!() };
    let HeapPayload::Object(b_obj) = b.payload() else { unreachable!() };
    a_obj.define_own(key, Value::Heap(b), PropAttr::default_data()).unwrap();
    b_obj.define_own(key, Value::Heap(a), PropAttr::default_data()).unwrap();
    heap.decref(key);

    assert_eq!(heap.object_count(), 3); // thread, a, b
    run_cycle(&heap, GcFlags::empty());
    assert_eq!(heap.object_count(), 1); // only the thread remains
}

#[test]
fn reachable_reference_cycle_survives() {
    let (heap, thread) = heap_with_thread();
    let a = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    let b = heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)));
    let key = heap.intern(b"0");
    let HeapPayload::Object(a_obj) = a.payload() else { unreachable!() };
    let HeapPayload::Object(b_obj) = b.payload() else { unreachable!() };
    a_obj.define_own(key, Value::Heap(b), PropAttr::default_data()).unwrap();
    b_obj.define_own(key, Value::Heap(a), PropAttr::default_data()).unwrap();
    heap.decref(key);
    let HeapPayload::Thread(t) = (unsafe { thread.payload_mut() }) else {
        unreachable!()
    };
    t.push(Value::Heap(a));

    assert_eq!(heap.object_count(), 3);
    run_cycle(&heap, GcFlags::empty());
    assert_eq!(heap.object_count(), 3);
}

#[test]
fn nested_gc_is_rejected_as_a_no_op() {
    let (heap, _thread) = heap_with_thread();
    heap.insert_run_flags(HeapRunFlags::MARK_AND_SWEEP_RUNNING);
    let before = heap.object_count();
    run_cycle(&heap, GcFlags::empty());
    assert_eq!(heap.object_count(), before);
    heap.remove_run_flags(HeapRunFlags::MARK_AND_SWEEP_RUNNING);
}

#[test]
fn emergency_flags_imply_no_finalizers_and_no_compaction() {
    let effective = GcFlags::EMERGENCY.effective();
    assert!(effective.contains(GcFlags::NO_FINALIZERS));
    assert!(effective.contains(GcFlags::NO_OBJECT_COMPACTION));
    assert!(effective.contains(GcFlags::NO_STRINGTABLE_RESIZE));
}
