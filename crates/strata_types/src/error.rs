//! Errors raised by the registry, the casting engine, and promotion.

use strata_diagnostic::{Diagnostic, ErrorCode};
use thiserror::Error;

use crate::cast::Casting;
use crate::{ClassId, Descriptor, ScalarType};

/// Registration and lookup failures.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("scalar type `{scalar_type}` is already mapped to class `{existing}`")]
    DuplicateScalarMapping {
        scalar_type: ScalarType,
        existing: ClassId,
    },

    #[error("invalid registration of `{class}`: {reason}")]
    InvalidRegistration { class: String, reason: String },

    #[error("a cast from `{from}` to `{to}` is already defined")]
    DuplicateCast { from: ClassId, to: ClassId },

    #[error("class `{0}` is not registered")]
    UnknownClass(ClassId),

    #[error("the global registry is not initialized")]
    Uninitialized,
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::DuplicateScalarMapping { .. } => ErrorCode::E1001,
            RegistryError::InvalidRegistration { .. } | RegistryError::Uninitialized => {
                ErrorCode::E1002
            }
            RegistryError::DuplicateCast { .. } => ErrorCode::E1003,
            RegistryError::UnknownClass(_) => ErrorCode::E1004,
        }
    }

    pub(crate) fn invalid(class: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::InvalidRegistration {
            class: class.into(),
            reason: reason.into(),
        }
    }
}

/// Cast resolution and transfer failures.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CastError {
    #[error("no cast from `{from}` to `{to}`")]
    NoCastAvailable { from: ClassId, to: ClassId },

    #[error("cannot cast `{from}` to `{to}` under `{required}` casting (the cast is `{actual}`)")]
    CastNotSafeEnough {
        from: Descriptor,
        to: Descriptor,
        required: Casting,
        actual: Casting,
    },

    #[error("cannot choose parameters of `{to}` when casting from `{from}`")]
    AmbiguousParametricCast { from: Descriptor, to: ClassId },

    #[error("{reason}")]
    InvalidValue { reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CastError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CastError::NoCastAvailable { .. } => ErrorCode::E2001,
            CastError::CastNotSafeEnough { .. } => ErrorCode::E2002,
            CastError::AmbiguousParametricCast { .. } => ErrorCode::E2003,
            CastError::InvalidValue { .. } => ErrorCode::E2004,
            CastError::Registry(err) => err.code(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            CastError::CastNotSafeEnough { .. } => {
                diag.with_suggestion("request `unsafe` casting to allow the conversion")
            }
            CastError::AmbiguousParametricCast { .. } => {
                diag.with_suggestion("request a sized instance such as `U10` instead of the class")
            }
            _ => diag,
        }
    }
}

/// Promotion failures. Discovery treats every variant as "fall back to
/// `object`".
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PromotionError {
    #[error("no common class for `{0}` and `{1}`")]
    NoCommonClass(ClassId, ClassId),

    #[error("class `{class}` cannot unify `{left}` with `{right}`")]
    NoCommonInstance {
        class: ClassId,
        left: Descriptor,
        right: Descriptor,
    },

    #[error(transparent)]
    Cast(#[from] CastError),
}

impl PromotionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PromotionError::NoCommonClass(..) | PromotionError::NoCommonInstance { .. } => {
                ErrorCode::E2005
            }
            PromotionError::Cast(err) => err.code(),
        }
    }
}
