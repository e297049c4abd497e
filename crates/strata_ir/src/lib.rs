//! Strata IR - shared primitives for array construction.
//!
//! This crate contains the small value types every other strata crate
//! speaks in:
//! - [`Shape`] for array dimensions, bounded by [`MAX_DIMS`]
//! - [`NodePath`] for addressing a node inside a nested input
//!
//! Both are cheap to clone and hash, and stay inline for the common
//! low-rank case.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-copied types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod path;
mod shape;

pub use path::NodePath;
pub use shape::{BroadcastError, BroadcastIndexer, Shape, MAX_DIMS};
