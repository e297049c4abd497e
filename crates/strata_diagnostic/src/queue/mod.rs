//! Diagnostic queue for collecting and deduplicating diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication by error code, so a condition that fires at many nodes
//!   of one input is reported once
//! - Suppression of selected warning codes

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before dropping further ones (0 = unlimited).
    pub error_limit: usize,
    /// Keep only the first diagnostic of each error code.
    pub deduplicate: bool,
    /// Warning codes to drop. Error codes listed here are ignored.
    pub suppressed: Vec<ErrorCode>,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
            suppressed: Vec::new(),
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
            suppressed: Vec::new(),
        }
    }

    /// Drop warnings with `code`. Errors cannot be suppressed.
    #[must_use]
    pub fn suppress(mut self, code: ErrorCode) -> Self {
        if code.is_warning() && !self.suppressed.contains(&code) {
            self.suppressed.push(code);
        }
        self
    }

    pub fn is_suppressed(&self, code: ErrorCode) -> bool {
        code.is_warning() && self.suppressed.contains(&code)
    }
}

/// Queue for collecting diagnostics in emission order.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(diagnostic);
/// // ... add more diagnostics
/// let collected = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Codes already queued (for dedup).
    seen: FxHashSet<ErrorCode>,
    /// Count of errors (not warnings).
    error_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            error_count: 0,
            config,
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if self.config.is_suppressed(diag.code) {
            return false;
        }

        let is_error = diag.is_error();
        if is_error && self.limit_reached() {
            return false;
        }

        if self.config.deduplicate && !self.seen.insert(diag.code) {
            return false;
        }

        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Whether a diagnostic with `code` has been queued since the last flush.
    pub fn has_emitted(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Return the queued diagnostics in emission order.
    ///
    /// Clears the queue and its dedup state.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        self.error_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests;
