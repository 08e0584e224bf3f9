//! ES5.1 property attribute bits (§3, C5).

#[cfg(test)]
mod attr_test;

use bitflags::bitflags;

bitflags! {
    /// Per-property attribute byte stored alongside each sparse-part entry.
    ///
    /// `ACCESSOR` distinguishes a data property (value) from an accessor
    /// property (get/set pair); the remaining three bits are the standard
    /// ES5.1 `[[Writable]]`, `[[Enumerable]]`, `[[Configurable]]` triad.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PropAttr: u8 {
        /// `[[Writable]]` - data properties only.
        const WRITABLE = 1 << 0;
        /// `[[Enumerable]]`.
        const ENUMERABLE = 1 << 1;
        /// `[[Configurable]]`.
        const CONFIGURABLE = 1 << 2;
        /// The property is an accessor (get/set) rather than a data property.
        const ACCESSOR = 1 << 3;
    }
}

impl PropAttr {
    /// Attributes used for properties created by normal assignment
    /// (`obj.x = v`) or object-literal evaluation: writable, enumerable,
    /// configurable, data property.
    #[must_use]
    pub const fn default_data() -> Self {
        Self::WRITABLE
            .union(Self::ENUMERABLE)
            .union(Self::CONFIGURABLE)
    }

    /// Attributes used for built-in properties that must survive
    /// accidental overwrite in user code but are not visible to `for-in`:
    /// non-writable, non-enumerable, non-configurable.
    #[must_use]
    pub const fn frozen() -> Self {
        Self::empty()
    }

    #[must_use]
    pub const fn is_accessor(self) -> bool {
        self.contains(Self::ACCESSOR)
    }

    #[must_use]
    pub const fn is_writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    #[must_use]
    pub const fn is_enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    #[must_use]
    pub const fn is_configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }
}
