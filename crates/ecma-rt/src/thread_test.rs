use super::{Activation, ActivationFlags, CatchEntry, Thread};
use crate::value::Value;

#[test]
fn negative_index_resolves_relative_to_top() {
    let mut t = Thread::new();
    t.push(Value::Number(1.0));
    t.push(Value::Number(2.0));
    assert_eq!(t.get(-1), Some(Value::Number(2.0)));
    assert_eq!(t.get(-2), Some(Value::Number(1.0)));
}

#[test]
fn absolute_index_is_relative_to_current_bottom() {
    let mut t = Thread::new();
    t.push(Value::Number(0.0));
    t.push(Value::Number(0.0));
    t.push_activation(Activation {
        function: dummy_ref(),
        bottom: 2,
        pc: 0,
        lexical_env: None,
        variable_env: None,
        flags: ActivationFlags::empty(),
    });
    t.push(Value::Number(42.0));
    assert_eq!(t.get(0), Some(Value::Number(42.0)));
}

#[test]
fn truncate_values_restores_exact_depth() {
    let mut t = Thread::new();
    for i in 0..5 {
        t.push(Value::Number(f64::from(i)));
    }
    t.truncate_values(2);
    assert_eq!(t.top(), 2);
}

#[test]
fn catch_stack_tracks_restore_depths() {
    let mut t = Thread::new();
    t.push(Value::Undefined);
    t.push_catch(CatchEntry {
        target_pc: 10,
        value_stack_depth: 1,
        call_stack_depth: 0,
    });
    assert_eq!(t.catch_depth(), 1);
    let entry = t.pop_catch().unwrap();
    assert_eq!(entry.target_pc, 10);
    assert_eq!(t.catch_depth(), 0);
}

#[test]
fn interrupt_counter_fires_at_zero_and_resets() {
    let t = Thread::new();
    t.set_interrupt_counter(1);
    assert!(!t.tick_interrupt()); // 1 -> 0
    assert!(t.tick_interrupt()); // 0 -> fires, resets
}

#[test]
fn disabled_interrupt_never_fires() {
    let t = Thread::new();
    t.disable_interrupt();
    assert!(!t.tick_interrupt());
}

fn dummy_ref() -> crate::heap::HeapRef {
    use crate::heap::{Heap, HeapPayload};
    use crate::heap::object::{Class, HObject};
    use ecma_abi::TypeTag;
    let heap = Heap::new();
    heap.alloc_cell(TypeTag::Object, HeapPayload::Object(HObject::new(Class::Object, None)))
}

proptest::proptest! {
    // §8 invariant: truncating back to a depth recorded earlier always
    // restores exactly that depth, whatever the intervening pushes were.
    #[test]
    fn truncate_values_restores_depth_for_arbitrary_push_sequences(
        pushed_before in 0usize..10,
        pushed_after in 0usize..10,
    ) {
        let mut t = Thread::new();
        for i in 0..pushed_before {
            t.push(Value::Number(i as f64));
        }
        let depth = t.top();
        for i in 0..pushed_after {
            t.push(Value::Number(i as f64));
        }
        t.truncate_values(depth);
        proptest::prop_assert_eq!(t.top(), depth);
    }
}
