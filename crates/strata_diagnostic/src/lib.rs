//! Diagnostic system for array-construction warnings and errors.
//!
//! Every diagnostic carries:
//! - An error code for searchability
//! - A clear message (what went wrong)
//! - A primary label pointing into the nested input (where it went wrong)
//! - Notes and suggestions (how to fix)
//!
//! Hard failures are returned as typed errors by the crates that detect
//! them and convert into [`Diagnostic`] on demand. Non-fatal conditions,
//! like the ragged-input deprecation, are collected in a
//! [`DiagnosticQueue`](queue::DiagnosticQueue) and handed back to the caller.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
