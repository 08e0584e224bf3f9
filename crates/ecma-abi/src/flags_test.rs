use super::HeaderFlags;

#[test]
fn flags_are_independent_bits() {
    let mut f = HeaderFlags::empty();
    f.insert(HeaderFlags::REACHABLE);
    assert!(f.contains(HeaderFlags::REACHABLE));
    assert!(!f.contains(HeaderFlags::TEMPROOT));

    f.insert(HeaderFlags::FINALIZABLE);
    f.remove(HeaderFlags::REACHABLE);
    assert!(!f.contains(HeaderFlags::REACHABLE));
    assert!(f.contains(HeaderFlags::FINALIZABLE));
}

#[test]
fn default_is_empty() {
    assert_eq!(HeaderFlags::default(), HeaderFlags::empty());
}
