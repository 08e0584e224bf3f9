use alloc::vec;

use super::HBuffer;

#[test]
fn fixed_buffer_rejects_extend() {
    let mut b = HBuffer::fixed(vec![1, 2, 3]);
    assert!(b.extend_dynamic(&[4]).is_none());
    assert_eq!(b.as_bytes(), &[1, 2, 3]);
}

#[test]
fn dynamic_buffer_grows() {
    let mut b = HBuffer::dynamic(vec![1, 2]);
    assert!(b.extend_dynamic(&[3, 4]).is_some());
    assert_eq!(b.as_bytes(), &[1, 2, 3, 4]);
    assert!(b.is_dynamic());
}

#[test]
fn empty_buffer_reports_zero_length() {
    let b = HBuffer::fixed(vec![]);
    assert!(b.is_empty());
    assert_eq!(b.len(), 0);
}
