//! Error codes for all construction diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E3001`) with the first digit
//! indicating the phase that reports it.

use std::fmt;

/// Error codes for all construction diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Registry errors
/// - E2xxx: Casting and promotion errors
/// - E3xxx: Discovery errors
/// - E4xxx: Population errors
/// - W3xxx: Discovery warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    // Registry Errors (E1xxx)
    /// Scalar type already mapped to a different class
    E1001,
    /// Class or mapping registration violates a hierarchy rule
    E1002,
    /// Cast between the two classes already defined
    E1003,
    /// Class id not present in the registry
    E1004,

    // Casting Errors (E2xxx)
    /// No casting implementation for the class pair
    E2001,
    /// Resolved cast is less safe than required
    E2002,
    /// Parametric destination cannot be sized from the source
    E2003,
    /// A single element failed to convert
    E2004,
    /// Two classes have no common class
    E2005,

    // Discovery Errors (E3xxx)
    /// Ragged nested input under a fixed non-object class
    E3001,
    /// Value cannot be represented by the requested class
    E3002,
    /// Class failed to describe its own scalar type
    E3003,
    /// Requested depth exceeds the supported maximum
    E3004,

    // Population Errors (E4xxx)
    /// Buffer does not match the discovery it is populated from
    E4001,
    /// Input changed shape between discovery and population
    E4002,
    /// Sequence found where a single element was expected
    E4003,
    /// Array-like cannot be broadcast into its destination
    E4004,

    // Warnings
    /// Ragged nested input silently became an object array
    W3001,
    /// Scalar resolved through the legacy fallback
    W3002,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// Kept in sync with `as_str()`. When adding a new variant: add it to the
    /// enum, `as_str()`, and here.
    pub const ALL: &[ErrorCode] = &[
        // Registry
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        // Casting
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        // Discovery
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        // Population
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        // Warnings
        ErrorCode::W3001,
        ErrorCode::W3002,
    ];

    /// Get the code as a string (e.g., "E3001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::W3001 => "W3001",
            ErrorCode::W3002 => "W3002",
        }
    }

    /// Check if this is a registry error (E1xxx range).
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004
        )
    }

    /// Check if this is a casting or promotion error (E2xxx range).
    pub fn is_cast_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
        )
    }

    /// Check if this is a discovery error (E3xxx range).
    pub fn is_discovery_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001 | ErrorCode::E3002 | ErrorCode::E3003 | ErrorCode::E3004
        )
    }

    /// Check if this is a population error (E4xxx range).
    pub fn is_population_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003 | ErrorCode::E4004
        )
    }

    /// Check if this is a warning code (Wxxxx range).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W3001 | ErrorCode::W3002)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E3001"` or `"w3001"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
