use super::ExitReason;

#[test]
fn only_resume_carries_a_second_value() {
    assert!(ExitReason::Resume.has_value2());
    for r in [
        ExitReason::Normal,
        ExitReason::Return,
        ExitReason::Throw,
        ExitReason::Break,
        ExitReason::Continue,
        ExitReason::Yield,
    ] {
        assert!(!r.has_value2());
    }
}

#[test]
fn only_throw_fails_a_protected_call() {
    assert!(ExitReason::Throw.is_protected_call_failure());
    assert!(!ExitReason::Normal.is_protected_call_failure());
    assert!(!ExitReason::Return.is_protected_call_failure());
}
