//! The process-wide registry.
//!
//! The registry lives between [`init`] and [`shutdown`]. Reads go through
//! [`with_registry`] and registration through [`with_registry_mut`]; callers
//! that register from several threads must order those calls themselves.

use parking_lot::RwLock;

use super::Registry;
use crate::error::RegistryError;

static GLOBAL: RwLock<Option<Registry>> = RwLock::new(None);

/// Install a fresh registry. Returns `false` if one is already installed.
pub fn init() -> bool {
    let mut global = GLOBAL.write();
    if global.is_some() {
        return false;
    }
    *global = Some(Registry::new());
    tracing::debug!("initialized global registry");
    true
}

/// Drop the registry. Returns `false` if none was installed.
pub fn shutdown() -> bool {
    let dropped = GLOBAL.write().take().is_some();
    if dropped {
        tracing::debug!("shut down global registry");
    }
    dropped
}

pub fn is_initialized() -> bool {
    GLOBAL.read().is_some()
}

pub fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> Result<R, RegistryError> {
    GLOBAL.read().as_ref().map(f).ok_or(RegistryError::Uninitialized)
}

pub fn with_registry_mut<R>(f: impl FnOnce(&mut Registry) -> R) -> Result<R, RegistryError> {
    GLOBAL.write().as_mut().map(f).ok_or(RegistryError::Uninitialized)
}
