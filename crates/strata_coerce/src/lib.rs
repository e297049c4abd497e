//! Strata Coerce - shape and element-type discovery for nested input, and
//! population of the destination buffer.
//!
//! # Pipeline
//!
//! 1. [`Coercer::discover`] walks the input once, depth first. It tracks the
//!    rectangular shape, promotes the element descriptors it meets, and
//!    records every array-like and sequence it visits in a
//!    [`CoercionCache`].
//! 2. The caller allocates a buffer for the discovered shape and descriptor
//!    (or lets [`Coercer::to_array`] do it).
//! 3. [`Coercer::populate`] replays the cache against the buffer, packing
//!    leaves through the class setters and casting array-likes.
//!
//! Ragged input either fails or degrades to an `object` array with a single
//! deprecation diagnostic, depending on the requested class and
//! [`CoercionConfig::ragged`].

mod cache;
mod coercer;
mod config;
mod discover;
mod error;
mod flags;
mod populate;
mod shape;

pub use cache::{CacheEntry, CoercionCache, Converted};
pub use coercer::{Coerced, Coercer};
pub use config::{CoercionConfig, RaggedPolicy};
pub use discover::{DTypeRequest, Discovery};
pub use error::CoerceError;
pub use flags::DiscoveryFlags;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=strata_coerce=debug` or `RUST_LOG=strata_types=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
