//! Element-type instances.
//!
//! A [`Descriptor`] is a fully parameterized encoding: its class, the
//! class-specific parameter (string length, datetime unit, ...), and the
//! byte order of stored elements. Descriptors are small `Copy` values and
//! compare structurally, so two descriptors built independently for the
//! same encoding are equal.

use std::fmt;

use crate::datetime::TimeUnit;
use crate::ClassId;

/// Class-specific parameter of an instance.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Param {
    /// Non-parametric classes.
    None,
    /// Fixed length: bytes for `bytes`, characters for `str`.
    Len(u32),
    /// Datetime resolution.
    Unit(TimeUnit),
    /// Opaque parameter owned by a plugin class.
    Custom(u64),
}

/// Byte order of stored elements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    #[default]
    Native,
    Swapped,
}

/// A concrete element-type instance.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descriptor {
    class: ClassId,
    param: Param,
    order: ByteOrder,
}

impl Descriptor {
    /// Native instance of a non-parametric class.
    pub const fn of(class: ClassId) -> Self {
        Descriptor {
            class,
            param: Param::None,
            order: ByteOrder::Native,
        }
    }

    pub const fn with_param(class: ClassId, param: Param) -> Self {
        Descriptor {
            class,
            param,
            order: ByteOrder::Native,
        }
    }

    /// `S<len>`: fixed-length byte string.
    pub const fn bytes(len: u32) -> Self {
        Self::with_param(ClassId::BYTES, Param::Len(len))
    }

    /// `U<len>`: fixed-length unicode string.
    pub const fn unicode(len: u32) -> Self {
        Self::with_param(ClassId::STR, Param::Len(len))
    }

    pub const fn datetime(unit: TimeUnit) -> Self {
        Self::with_param(ClassId::DATETIME, Param::Unit(unit))
    }

    #[inline]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub const fn param(&self) -> Param {
        self.param
    }

    #[inline]
    pub const fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Length parameter, if this instance has one.
    pub const fn len(&self) -> Option<usize> {
        match self.param {
            Param::Len(len) => Some(len as usize),
            _ => None,
        }
    }

    /// Datetime unit, if this instance has one.
    pub const fn unit(&self) -> Option<TimeUnit> {
        match self.param {
            Param::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_native(&self) -> bool {
        matches!(self.order, ByteOrder::Native)
    }

    /// The same encoding with native byte order.
    #[must_use]
    pub const fn native(self) -> Self {
        Descriptor {
            order: ByteOrder::Native,
            ..self
        }
    }

    /// The same encoding with non-native byte order.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Descriptor {
            order: ByteOrder::Swapped,
            ..self
        }
    }

    /// Canonical instances are native-order; non-parametric canonical
    /// instances are the class singleton.
    pub const fn is_canonical(&self) -> bool {
        self.is_native()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.class, self.param) {
            (ClassId::BYTES, Param::Len(len)) => write!(f, "S{len}")?,
            (ClassId::STR, Param::Len(len)) => write!(f, "U{len}")?,
            (ClassId::DATETIME, Param::Unit(TimeUnit::Generic)) => write!(f, "datetime64")?,
            (ClassId::DATETIME, Param::Unit(unit)) => write!(f, "datetime64[{}]", unit.suffix())?,
            (class, Param::None) => write!(f, "{class}")?,
            (class, Param::Len(len)) => write!(f, "{class}[{len}]")?,
            (class, Param::Unit(unit)) => write!(f, "{class}[{}]", unit.suffix())?,
            (class, Param::Custom(bits)) => write!(f, "{class}[{bits:#x}]")?,
        }
        if !self.is_native() {
            write!(f, " (byte-swapped)")?;
        }
        Ok(())
    }
}

strata_ir::static_assert_size!(Descriptor, 24);

#[cfg(test)]
mod tests;
