//! Discovery state flags.

use bitflags::bitflags;

bitflags! {
    /// State accumulated while walking one input.
    ///
    /// The first four bits are outcomes; the last two are input options set
    /// from the requested instance's class flags before the walk starts.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct DiscoveryFlags: u8 {
        /// Sibling shapes disagreed somewhere.
        const RAGGED = 1 << 0;
        /// A sequence was treated as a scalar at the depth limit.
        const REACHED_MAX_DIMS = 1 << 1;
        /// The ragged-input deprecation was issued for this call.
        const DEPRECATION_WARNED = 1 << 2;
        /// Promotion failed once and the descriptor fell back to `object`.
        const PROMOTION_FAILED = 1 << 3;

        /// Strings and bytes of length other than 1 are sequences of
        /// characters.
        const STRINGS_AS_SEQUENCES = 1 << 4;
        /// Tuples are elements, not sequences.
        const TUPLES_AS_ELEMENTS = 1 << 5;
    }
}

impl DiscoveryFlags {
    /// Whether the walk saw ragged input.
    ///
    /// Hitting the depth limit counts when the result has fewer dimensions
    /// than allowed: some sibling must have stopped the shape earlier.
    #[inline]
    pub fn is_ragged(self, ndim: usize, max_dims: usize) -> bool {
        self.contains(Self::RAGGED) || (self.contains(Self::REACHED_MAX_DIMS) && ndim < max_dims)
    }
}
