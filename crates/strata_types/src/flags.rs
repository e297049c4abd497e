//! Class metadata flags.
//!
//! `ClassFlags` are declared by each class once and copied into its registry
//! entry, so discovery and casting can branch on class properties without a
//! trait call.

use bitflags::bitflags;

bitflags! {
    /// Static properties of an element-type class.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ClassFlags: u32 {
        // === Hierarchy Flags (bits 0-7) ===

        /// Abstract class: has no instances of its own, may be subclassed.
        const ABSTRACT = 1 << 0;
        /// Instances carry parameters (length, unit, ...).
        const PARAMETRIC = 1 << 1;
        /// Registered by a plugin rather than built in.
        const USER_DEFINED = 1 << 2;

        // === Storage Flags (bits 8-15) ===

        /// Elements are stored as values, not as raw bytes.
        const HOLDS_OBJECTS = 1 << 8;

        // === Category Flags (bits 16-23) ===

        /// Boolean or numeric class.
        const NUMERIC = 1 << 16;
        /// Fixed-length text or bytes.
        const CHARACTER = 1 << 17;
        /// Points in time.
        const TEMPORAL = 1 << 18;

        // === Discovery Hints (bits 24-31) ===
        // Only honored when an instance of the class is requested.

        /// Strings and bytes of length other than 1 are split into characters.
        const SPLITS_STRINGS = 1 << 24;
        /// Tuples are elements, not sequences.
        const TUPLE_ELEMENTS = 1 << 25;
    }
}

impl ClassFlags {
    #[inline]
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    #[inline]
    pub const fn is_parametric(self) -> bool {
        self.contains(Self::PARAMETRIC)
    }

    #[inline]
    pub const fn holds_objects(self) -> bool {
        self.contains(Self::HOLDS_OBJECTS)
    }
}
