//! String intern table (§4.2, C4).
//!
//! Open-addressed, hash-probed, with a deleted sentinel distinct from an
//! empty slot — deleting a cell must not "heal" the probe chains of other
//! entries that hashed past it. Load factor is kept in `[25%, 75%]`;
//! growth doubles (next prime ≥ 2×used), shrink halves when the used count
//! drops below the lower bound. Table entries don't themselves hold a
//! strong reference: interning hands the caller the one reference that
//! keeps the string alive, and [`crate::heap::refcount`]'s zero-handling
//! removes the table entry when that (and every other) reference is gone.

#[cfg(test)]
mod string_table_test;

use alloc::vec;
use alloc::vec::Vec;

use super::HeapRef;

#[derive(Clone, Copy)]
enum Slot {
    Empty,
    Deleted,
    Occupied(HeapRef),
}

pub struct StringTable {
    slots: Vec<Slot>,
    used: usize,
    deleted: usize,
    seed: u32,
    cache_size: usize,
    resize_inhibited: bool,
}

const INITIAL_CAPACITY: usize = 17; // smallest prime comfortably above 0

impl StringTable {
    #[must_use]
    pub fn new(cache_size: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; INITIAL_CAPACITY],
            used: 0,
            deleted: 0,
            seed: random_seed(),
            cache_size,
            resize_inhibited: false,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    #[must_use]
    pub const fn cache_size(&self) -> usize {
        self.cache_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.used
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn set_resize_inhibited(&mut self, inhibited: bool) {
        self.resize_inhibited = inhibited;
    }

    /// Hash of `bytes` seeded with this table's randomized seed (FNV-1a
    /// variant, matching the hash-then-probe protocol of §4.2 step 1).
    #[must_use]
    pub fn hash(&self, bytes: &[u8]) -> u32 {
        let mut h = self.seed ^ 0x811c_9dc5;
        for &b in bytes {
            h ^= u32::from(b);
            h = h.wrapping_mul(0x0100_0193);
        }
        h
    }

    fn step_from_hash(hash: u32, capacity: usize) -> usize {
        // Odd step relatively prime to a prime capacity: any nonzero step
        // works, this keeps probing deterministic and cheap.
        1 + (hash as usize % (capacity - 1))
    }

    fn matches(bytes: &[u8], candidate: HeapRef) -> bool {
        let super::HeapPayload::String(s) = candidate.payload() else {
            return false;
        };
        s.as_bytes() == bytes
    }

    /// Probes for `bytes` (already hashed by the caller via [`Self::hash`]).
    /// Returns the existing reference on a hit.
    #[must_use]
    pub fn find(&self, hash: u32, bytes: &[u8]) -> Option<HeapRef> {
        let cap = self.slots.len();
        let step = Self::step_from_hash(hash, cap);
        let mut idx = hash as usize % cap;
        for _ in 0..cap {
            match self.slots[idx] {
                Slot::Empty => return None,
                Slot::Deleted => {}
                Slot::Occupied(r) if Self::matches(bytes, r) => return Some(r),
                Slot::Occupied(_) => {}
            }
            idx = (idx + step) % cap;
        }
        None
    }

    /// Inserts a freshly allocated string reference at the first
    /// empty-or-deleted slot on its probe chain (§4.2 steps 3-4). Caller
    /// must already have confirmed no existing entry matches.
    pub fn insert(&mut self, hash: u32, r: HeapRef) {
        let cap = self.slots.len();
        let step = Self::step_from_hash(hash, cap);
        let mut idx = hash as usize % cap;
        let mut first_deleted = None;
        for _ in 0..cap {
            match self.slots[idx] {
                Slot::Empty => {
                    let target = first_deleted.unwrap_or(idx);
                    if first_deleted.is_some() {
                        self.deleted -= 1;
                    }
                    self.slots[target] = Slot::Occupied(r);
                    self.used += 1;
                    self.maybe_grow();
                    return;
                }
                Slot::Deleted if first_deleted.is_none() => first_deleted = Some(idx),
                Slot::Deleted | Slot::Occupied(_) => {}
            }
            idx = (idx + step) % cap;
        }
        unreachable!("string table probed its full capacity without finding a slot");
    }

    /// Removes the entry for `r` (by identity), replacing it with the
    /// deleted sentinel. Called when a string's refcount reaches zero.
    pub fn remove(&mut self, hash: u32, r: HeapRef) {
        let cap = self.slots.len();
        let step = Self::step_from_hash(hash, cap);
        let mut idx = hash as usize % cap;
        for _ in 0..cap {
            if let Slot::Occupied(candidate) = self.slots[idx] {
                if candidate == r {
                    self.slots[idx] = Slot::Deleted;
                    self.used -= 1;
                    self.deleted += 1;
                    self.maybe_shrink();
                    return;
                }
            }
            idx = (idx + step) % cap;
        }
    }

    fn load_factor_permille(&self) -> usize {
        (self.used * 1000) / self.slots.len()
    }

    fn maybe_grow(&mut self) {
        if self.resize_inhibited {
            return;
        }
        if self.load_factor_permille() > 750 {
            let new_cap = next_prime(self.used * 2);
            #[cfg(feature = "logging")]
            log::trace!("string table grow: {} -> {new_cap} slots, {} used", self.slots.len(), self.used);
            self.rehash(new_cap);
        }
    }

    fn maybe_shrink(&mut self) {
        if self.resize_inhibited {
            return;
        }
        if self.slots.len() > INITIAL_CAPACITY && self.load_factor_permille() < 250 {
            let new_cap = next_prime((self.used * 2).max(INITIAL_CAPACITY));
            #[cfg(feature = "logging")]
            log::trace!("string table shrink: {} -> {new_cap} slots, {} used", self.slots.len(), self.used);
            self.rehash(new_cap);
        }
    }

    /// Rehashes every occupied slot into a freshly sized table, dropping
    /// deleted sentinels (they never need to survive a rebuild).
    fn rehash(&mut self, new_cap: usize) {
        let old = core::mem::replace(&mut self.slots, vec![Slot::Empty; new_cap]);
        self.deleted = 0;
        self.used = 0;
        for slot in old {
            if let Slot::Occupied(r) = slot {
                let super::HeapPayload::String(s) = r.payload() else {
                    continue;
                };
                let h = self.hash(s.as_bytes());
                self.insert_no_grow(h, r);
            }
        }
    }

    fn insert_no_grow(&mut self, hash: u32, r: HeapRef) {
        let cap = self.slots.len();
        let step = Self::step_from_hash(hash, cap);
        let mut idx = hash as usize % cap;
        loop {
            if let Slot::Empty = self.slots[idx] {
                self.slots[idx] = Slot::Occupied(r);
                self.used += 1;
                return;
            }
            idx = (idx + step) % cap;
        }
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

fn next_prime(min: usize) -> usize {
    let mut n = min.max(3) | 1;
    while !is_prime(n) {
        n += 2;
    }
    n
}

fn random_seed() -> u32 {
    let mut buf = [0u8; 4];
    if getrandom::getrandom(&mut buf).is_err() {
        return 0x9e37_79b9;
    }
    u32::from_ne_bytes(buf)
}
