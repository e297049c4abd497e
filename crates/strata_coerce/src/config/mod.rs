//! Coercion configuration.
//!
//! Defaults match array construction without options. [`CoercionConfig::from_env`]
//! applies `STRATA_*` overrides on top of them.

use std::fmt;

use strata_diagnostic::{DiagnosticConfig, ErrorCode};
use strata_ir::MAX_DIMS;

use crate::CoerceError;

/// Environment variable overriding [`CoercionConfig::max_dims`].
pub const MAX_DIMS_VAR: &str = "STRATA_MAX_DIMS";
/// Environment variable overriding [`CoercionConfig::ragged`].
pub const RAGGED_VAR: &str = "STRATA_RAGGED";
/// Environment variable listing warning codes to suppress, comma-separated.
pub const SUPPRESS_VAR: &str = "STRATA_SUPPRESS";

/// What discovery does with ragged input when no class is requested.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum RaggedPolicy {
    /// Build an `object` array and emit one deprecation diagnostic.
    #[default]
    Deprecate,
    /// Fail with `RaggedInput`.
    Reject,
}

impl RaggedPolicy {
    /// Parse `deprecate` or `reject`, ignoring case and surrounding space.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "deprecate" => Some(RaggedPolicy::Deprecate),
            "reject" => Some(RaggedPolicy::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for RaggedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaggedPolicy::Deprecate => write!(f, "deprecate"),
            RaggedPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Configuration for one [`Coercer`](crate::Coercer).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoercionConfig {
    /// Deepest nesting treated as dimensions; deeper sequences are elements.
    pub max_dims: usize,
    pub ragged: RaggedPolicy,
    /// Limits for the diagnostics returned with each discovery.
    pub diagnostics: DiagnosticConfig,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        CoercionConfig {
            max_dims: MAX_DIMS,
            ragged: RaggedPolicy::default(),
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl CoercionConfig {
    /// Defaults with `STRATA_MAX_DIMS`, `STRATA_RAGGED` and `STRATA_SUPPRESS`
    /// applied.
    pub fn from_env() -> Self {
        Self::with_env(|name| std::env::var(name).ok())
    }

    /// Defaults with overrides read through `lookup`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn with_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = CoercionConfig::default();
        if let Some(raw) = lookup(MAX_DIMS_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(max_dims) if max_dims <= MAX_DIMS => config.max_dims = max_dims,
                _ => tracing::warn!(var = MAX_DIMS_VAR, value = %raw, "ignoring invalid override"),
            }
        }
        if let Some(raw) = lookup(RAGGED_VAR) {
            match RaggedPolicy::parse(&raw) {
                Some(policy) => config.ragged = policy,
                None => tracing::warn!(var = RAGGED_VAR, value = %raw, "ignoring invalid override"),
            }
        }
        if let Some(raw) = lookup(SUPPRESS_VAR) {
            for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
                match item.parse::<ErrorCode>() {
                    Ok(code) if code.is_warning() => config.diagnostics = config.diagnostics.suppress(code),
                    _ => tracing::warn!(var = SUPPRESS_VAR, value = %item, "ignoring code that is not a warning"),
                }
            }
        }
        config
    }

    #[must_use]
    pub fn with_max_dims(mut self, max_dims: usize) -> Self {
        self.max_dims = max_dims;
        self
    }

    #[must_use]
    pub fn with_ragged(mut self, ragged: RaggedPolicy) -> Self {
        self.ragged = ragged;
        self
    }

    pub fn validate(&self) -> Result<(), CoerceError> {
        if self.max_dims > MAX_DIMS {
            return Err(CoerceError::InvalidMaxDims(self.max_dims));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
