//! Element-type class handle.
//!
//! Every class lives in the [`Registry`](crate::Registry) and is referenced
//! by its 32-bit id. Built-in classes have fixed ids so they can be named
//! without a registry at hand; plugin classes are numbered from
//! [`ClassId::FIRST_DYNAMIC`].

use std::fmt;

/// A 32-bit handle to a registered element-type class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    // === Concrete Built-in Classes (ids 0-15) ===

    pub const BOOL: Self = Self(0);
    pub const INT8: Self = Self(1);
    pub const INT16: Self = Self(2);
    pub const INT32: Self = Self(3);
    pub const INT64: Self = Self(4);
    pub const UINT8: Self = Self(5);
    pub const UINT16: Self = Self(6);
    pub const UINT32: Self = Self(7);
    pub const UINT64: Self = Self(8);
    pub const FLOAT16: Self = Self(9);
    pub const FLOAT32: Self = Self(10);
    pub const FLOAT64: Self = Self(11);
    /// Fixed-length byte strings, parameterized by length.
    pub const BYTES: Self = Self(12);
    /// Fixed-length unicode strings, parameterized by character count.
    pub const STR: Self = Self(13);
    /// Datetimes, parameterized by unit.
    pub const DATETIME: Self = Self(14);
    /// Arbitrary values stored by reference.
    pub const OBJECT: Self = Self(15);

    // === Abstract Built-in Classes (ids 32-38) ===

    /// Root of the hierarchy.
    pub const GENERIC: Self = Self(32);
    pub const NUMBER: Self = Self(33);
    pub const INTEGER: Self = Self(34);
    pub const SIGNED_INTEGER: Self = Self(35);
    pub const UNSIGNED_INTEGER: Self = Self(36);
    pub const FLOATING: Self = Self(37);
    pub const CHARACTER: Self = Self(38);

    // === Reserved Range (39-63) ===

    /// First id handed out to plugin classes.
    pub const FIRST_DYNAMIC: u32 = 64;

    /// Every built-in class, concrete first.
    pub const BUILTINS: &[ClassId] = &[
        Self::BOOL,
        Self::INT8,
        Self::INT16,
        Self::INT32,
        Self::INT64,
        Self::UINT8,
        Self::UINT16,
        Self::UINT32,
        Self::UINT64,
        Self::FLOAT16,
        Self::FLOAT32,
        Self::FLOAT64,
        Self::BYTES,
        Self::STR,
        Self::DATETIME,
        Self::OBJECT,
        Self::GENERIC,
        Self::NUMBER,
        Self::INTEGER,
        Self::SIGNED_INTEGER,
        Self::UNSIGNED_INTEGER,
        Self::FLOATING,
        Self::CHARACTER,
    ];

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a built-in class (fixed id).
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }

    /// Human-readable name of built-in classes.
    ///
    /// Returns `None` for plugin classes, whose names live in the registry.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("bool"),
            1 => Some("int8"),
            2 => Some("int16"),
            3 => Some("int32"),
            4 => Some("int64"),
            5 => Some("uint8"),
            6 => Some("uint16"),
            7 => Some("uint32"),
            8 => Some("uint64"),
            9 => Some("float16"),
            10 => Some("float32"),
            11 => Some("float64"),
            12 => Some("bytes"),
            13 => Some("str"),
            14 => Some("datetime64"),
            15 => Some("object"),
            32 => Some("generic"),
            33 => Some("number"),
            34 => Some("integer"),
            35 => Some("signedinteger"),
            36 => Some("unsignedinteger"),
            37 => Some("floating"),
            38 => Some("character"),
            _ => None,
        }
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "ClassId({name})"),
            None => write!(f, "ClassId({})", self.0),
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "class#{}", self.0),
        }
    }
}

// Compile-time size assertion: ClassId must be exactly 4 bytes
strata_ir::static_assert_size!(ClassId, 4);

#[cfg(test)]
mod tests;
