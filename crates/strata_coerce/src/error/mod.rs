//! Coercion errors.
//!
//! Discovery and population abort on the first error. Every variant maps to
//! a stable [`ErrorCode`] and converts into a [`Diagnostic`] labeled with the
//! input node it was raised at, when there is one.

use strata_diagnostic::{Diagnostic, ErrorCode};
use strata_ir::{BroadcastError, NodePath, Shape, MAX_DIMS};
use strata_types::{CastError, RegistryError};
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CoerceError {
    #[error(
        "setting an array element with a sequence: the input is ragged at {path} \
         (the shape was detected as {shape})"
    )]
    RaggedInput { shape: Shape, path: NodePath },

    #[error("unable to represent {value} using class `{class}` at {path}: {reason}")]
    UnrepresentableValue {
        value: String,
        class: String,
        path: NodePath,
        reason: String,
    },

    #[error("class `{class}` {reason}; this is a bug in the class implementation")]
    ClassMisbehaved { class: String, reason: String },

    #[error("maximum dimension count {0} exceeds the limit of {MAX_DIMS}")]
    InvalidMaxDims(usize),

    #[error("setting an array element with a sequence at {path}")]
    SequenceAsElement { path: NodePath },

    #[error("inconsistent object during array creation at {path}: {reason}")]
    InconsistentInput { path: NodePath, reason: String },

    #[error("coercion cache #{generation} was built for {expected}, not {found}")]
    CacheMismatch {
        generation: u64,
        expected: String,
        found: String,
    },

    #[error("{error} (at {path})")]
    Cast { path: NodePath, error: CastError },

    #[error("{error} (at {path})")]
    Broadcast { path: NodePath, error: BroadcastError },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CoerceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoerceError::RaggedInput { .. } => ErrorCode::E3001,
            CoerceError::UnrepresentableValue { .. } => ErrorCode::E3002,
            CoerceError::ClassMisbehaved { .. } => ErrorCode::E3003,
            CoerceError::InvalidMaxDims(_) => ErrorCode::E3004,
            CoerceError::CacheMismatch { .. } => ErrorCode::E4001,
            CoerceError::InconsistentInput { .. } => ErrorCode::E4002,
            CoerceError::SequenceAsElement { .. } => ErrorCode::E4003,
            CoerceError::Broadcast { .. } => ErrorCode::E4004,
            CoerceError::Cast { error, .. } => error.code(),
            CoerceError::Registry(err) => err.code(),
        }
    }

    /// Input node the error was raised at.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            CoerceError::RaggedInput { path, .. }
            | CoerceError::UnrepresentableValue { path, .. }
            | CoerceError::SequenceAsElement { path }
            | CoerceError::InconsistentInput { path, .. }
            | CoerceError::Cast { path, .. }
            | CoerceError::Broadcast { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = match self {
            CoerceError::Cast { error, .. } => error.to_diagnostic(),
            _ => Diagnostic::error(self.code()).with_message(self.to_string()),
        };
        if let Some(path) = self.path() {
            diag = diag.with_label(path.clone(), self.label());
        }
        match self {
            CoerceError::RaggedInput { path, .. } => {
                if let Some(parent) = path.parent() {
                    diag = diag.with_secondary_label(parent, "in this sequence");
                }
                diag.with_note("nested sequences must have the same length at every level")
                    .with_suggestion("request the `object` class to build an array of the sub-sequences")
            }
            CoerceError::InconsistentInput { .. } => {
                diag.with_note("the input changed between discovery and population")
            }
            _ => diag,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CoerceError::RaggedInput { .. } => "shape differs from its siblings here",
            CoerceError::UnrepresentableValue { .. } => "this value does not fit the class",
            CoerceError::SequenceAsElement { .. } => "sequence found where an element was expected",
            CoerceError::InconsistentInput { .. } => "changed here",
            CoerceError::Broadcast { .. } => "array-like cannot fill this block",
            _ => "while storing this element",
        }
    }

    pub(crate) fn cast(path: &NodePath, error: CastError) -> Self {
        CoerceError::Cast {
            path: path.clone(),
            error,
        }
    }

    pub(crate) fn inconsistent(path: &NodePath, reason: impl Into<String>) -> Self {
        CoerceError::InconsistentInput {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests;
