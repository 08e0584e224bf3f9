//! Raw byte buffers (§3 "Buffer"): fixed (stable pointer, size fixed at
//! allocation) or dynamic (growable, pointer may move). Used for
//! compiled-function payloads and string/JSON building.

#[cfg(test)]
mod buffer_test;

use alloc::vec::Vec;

/// A heap-resident byte buffer. `Fixed` never reallocates after creation;
/// `Dynamic` may grow via the owning heap's indirect-realloc path.
pub enum HBuffer {
    Fixed(Vec<u8>),
    Dynamic(Vec<u8>),
}

impl HBuffer {
    #[must_use]
    pub fn fixed(bytes: Vec<u8>) -> Self {
        Self::Fixed(bytes)
    }

    #[must_use]
    pub fn dynamic(bytes: Vec<u8>) -> Self {
        Self::Dynamic(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Fixed(b) | Self::Dynamic(b) => b,
        }
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends to a dynamic buffer. Returns `None` for a fixed buffer,
    /// matching "size fixed at allocation" (§3).
    pub fn extend_dynamic(&mut self, more: &[u8]) -> Option<()> {
        match self {
            Self::Dynamic(b) => {
                b.extend_from_slice(more);
                Some(())
            }
            Self::Fixed(_) => None,
        }
    }
}
