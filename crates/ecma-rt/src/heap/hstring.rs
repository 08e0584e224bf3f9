//! In-heap string bodies (§3 "String", C4).
//!
//! Immutable CESU-8 byte sequence plus a cached byte length, character
//! length, and 32-bit hash. A small per-string char-offset → byte-offset
//! cache accelerates random access into non-ASCII strings; strings at or
//! below [`HeapOptions::string_cache_nocache_limit`] bytes skip the cache
//! entirely (a linear scan over so few bytes is cheaper than a cache probe
//! — supplemented feature 3).

#[cfg(test)]
mod hstring_test;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::unicode;

/// An interned string body. Equality and the intern table's probe compare
/// `(byte_len, bytes)`; this type does not implement `PartialEq` itself
/// because identity, not structural equality, is what the runtime cares
/// about once a string is interned (§3 invariant 3).
pub struct HString {
    bytes: Box<[u8]>,
    hash: u32,
    char_len: u32,
    cache: RefCell<Vec<(u32, u32)>>,
    cache_cap: usize,
}

impl HString {
    #[must_use]
    pub fn new(bytes: Box<[u8]>, hash: u32, cache_cap: usize) -> Self {
        let char_len = unicode::char_length(&bytes);
        Self {
            bytes,
            hash,
            char_len,
            cache: RefCell::new(Vec::new()),
            cache_cap,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn char_len(&self) -> u32 {
        self.char_len
    }

    #[must_use]
    pub const fn hash(&self) -> u32 {
        self.hash
    }

    /// Locates the byte offset of character offset `char_off`, within
    /// `nocache_limit` short-circuiting the cache.
    #[must_use]
    pub fn byte_offset_of_char(&self, char_off: u32, nocache_limit: usize) -> Option<usize> {
        if char_off > self.char_len {
            return None;
        }
        if char_off == 0 {
            return Some(0);
        }
        if self.bytes.len() <= nocache_limit {
            return self.scan_forward(0, 0, char_off);
        }

        let start = self.best_cache_start(char_off);
        let offset = self.scan_forward(start.1 as usize, start.0, char_off)?;
        self.remember(char_off, offset as u32);
        Some(offset)
    }

    /// Picks the cached `(char_off, byte_off)` pair with the largest
    /// `char_off <= target`, falling back to the string start.
    fn best_cache_start(&self, target: u32) -> (u32, u32) {
        self.cache
            .borrow()
            .iter()
            .filter(|(c, _)| *c <= target)
            .copied()
            .max_by_key(|(c, _)| *c)
            .unwrap_or((0, 0))
    }

    fn scan_forward(&self, from_byte: usize, from_char: u32, target_char: u32) -> Option<usize> {
        let mut byte = from_byte;
        let mut ch = from_char;
        if ch == target_char {
            return Some(byte);
        }
        while byte < self.bytes.len() {
            byte += 1;
            while byte < self.bytes.len() && self.bytes[byte] & 0xc0 == 0x80 {
                byte += 1;
            }
            ch += 1;
            if ch == target_char {
                return Some(byte);
            }
        }
        None
    }

    fn remember(&self, char_off: u32, byte_off: u32) {
        let mut cache = self.cache.borrow_mut();
        if cache.len() >= self.cache_cap {
            cache.remove(0); // simple FIFO eviction
        }
        cache.push((char_off, byte_off));
    }
}
