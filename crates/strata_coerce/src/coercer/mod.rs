//! Entry point tying discovery and population to a registry.

use strata_diagnostic::Diagnostic;
use strata_types::{NdArray, Registry, Value};

use crate::discover::{self, DTypeRequest, Discovery};
use crate::{populate, CoerceError, CoercionConfig};

/// Array built by [`Coercer::to_array`], with the warnings issued on the way.
#[derive(Debug)]
pub struct Coerced {
    pub array: NdArray,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds arrays from nested input against one registry.
///
/// # Example
///
/// ```text
/// let registry = Registry::new();
/// let coercer = Coercer::new(&registry);
/// let value = Value::list([Value::Int(1), Value::Float(2.5)]);
/// let coerced = coercer.to_array(&value, DTypeRequest::None)?;
/// assert_eq!(coerced.array.descr(), &Descriptor::of(ClassId::FLOAT64));
/// ```
#[derive(Clone, Debug)]
pub struct Coercer<'r> {
    registry: &'r Registry,
    config: CoercionConfig,
}

impl<'r> Coercer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, CoercionConfig::default())
    }

    pub fn with_config(registry: &'r Registry, config: CoercionConfig) -> Self {
        Coercer { registry, config }
    }

    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    #[inline]
    pub fn config(&self) -> &CoercionConfig {
        &self.config
    }

    /// Determine the shape and descriptor of `value`.
    pub fn discover<'a>(&self, value: &'a Value, request: DTypeRequest) -> Result<Discovery<'a>, CoerceError> {
        discover::discover(self.registry, &self.config, value, request)
    }

    /// Fill `array` from a discovery of the same shape and descriptor.
    ///
    /// On error the buffer is partially written and should be discarded.
    pub fn populate(&self, array: &mut NdArray, discovery: Discovery<'_>) -> Result<(), CoerceError> {
        populate::populate(self.registry, array, discovery)
    }

    /// Discover, allocate, and populate.
    pub fn to_array(&self, value: &Value, request: DTypeRequest) -> Result<Coerced, CoerceError> {
        let mut discovery = self.discover(value, request)?;
        let diagnostics = std::mem::take(&mut discovery.diagnostics);
        let mut array = self
            .registry
            .allocate(discovery.descr, discovery.shape.clone())?;
        self.populate(&mut array, discovery)?;
        Ok(Coerced { array, diagnostics })
    }
}

#[cfg(test)]
mod tests;
