//! The element-type class hierarchy.
//!
//! A class is a family of encodings (`int64`, `str`, `datetime64`, ...).
//! Concrete classes are sealed leaves that own instances; abstract classes
//! form the extensible part of the hierarchy that plugins subclass.
//!
//! Every operation here is a hook the registry, promotion, and discovery
//! call through `Arc<dyn DTypeClass>`. The defaults give non-parametric
//! classes sensible behavior, so most classes override only a handful.

pub mod builtin;

use std::fmt;

use thiserror::Error;

use crate::cast::CastSpec;
use crate::{Cell, CellMut, ClassFlags, ClassId, Descriptor, Registry, Value};

/// Outcome of [`DTypeClass::common_class`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CommonClass {
    Resolved(ClassId),
    /// This class has no opinion; the other operand is asked next.
    NotImplemented,
}

/// Outcome of [`DTypeClass::discover_instance`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Discovered {
    Instance(Descriptor),
    NotImplemented,
}

/// Failure of a class value setter.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SetItemError {
    /// The value is not one the setter understands. Callers fall back to
    /// discovering the value's own instance and casting from it.
    #[error("value type not accepted")]
    Unsupported,
    /// The value was understood but cannot be stored.
    #[error("{0}")]
    Invalid(String),
}

/// Common class from the hierarchy alone: identical classes resolve to
/// themselves and a subclass wins over its ancestor.
pub fn hierarchy_common_class(this: ClassId, other: ClassId, registry: &Registry) -> CommonClass {
    if this == other {
        CommonClass::Resolved(this)
    } else if registry.is_subclass(other, this) {
        CommonClass::Resolved(other)
    } else {
        CommonClass::NotImplemented
    }
}

/// Behavior of an element-type class.
///
/// `this` is the id the registry assigned the class; builtins know theirs
/// statically, plugins learn it at registration.
pub trait DTypeClass: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn flags(&self) -> ClassFlags;

    /// Class both operands can be represented in.
    ///
    /// Asked in both orders by promotion; returning `NotImplemented` lets the
    /// other class decide. The default resolves identical classes and prefers
    /// a subclass over its abstract ancestor.
    fn common_class(&self, this: ClassId, other: ClassId, registry: &Registry) -> CommonClass {
        hierarchy_common_class(this, other, registry)
    }

    /// Unify two instances of this class. Non-parametric classes have one
    /// canonical instance.
    fn common_instance(&self, left: &Descriptor, right: &Descriptor) -> Option<Descriptor> {
        let _ = right;
        Some(left.native())
    }

    /// Canonical instance, `None` when the class cannot pick one.
    fn default_instance(&self, this: ClassId) -> Option<Descriptor> {
        let flags = self.flags();
        if flags.is_abstract() || flags.is_parametric() {
            None
        } else {
            Some(Descriptor::of(this))
        }
    }

    /// Instance able to hold `value`. Parametric classes size the instance
    /// from the value; non-parametric classes need not override this.
    fn discover_instance(&self, this: ClassId, value: &Value) -> Discovered {
        let _ = value;
        if self.flags().is_parametric() {
            return Discovered::NotImplemented;
        }
        match self.default_instance(this) {
            Some(descr) => Discovered::Instance(descr),
            None => Discovered::NotImplemented,
        }
    }

    /// Whether this class claims `value` as a scalar although the registry
    /// does not map the value's scalar type to it.
    fn is_known_scalar(&self, value: &Value) -> bool {
        let _ = value;
        false
    }

    /// Bytes per element of `descr`.
    fn item_size(&self, descr: &Descriptor) -> usize;

    /// Store `value` into an element slot of instance `descr`.
    fn setitem(&self, descr: &Descriptor, value: &Value, cell: CellMut<'_>) -> Result<(), SetItemError> {
        let _ = (descr, value, cell);
        Err(SetItemError::Unsupported)
    }

    /// Read an element slot of instance `descr` back as a value.
    fn getitem(&self, descr: &Descriptor, cell: Cell<'_>) -> Value {
        let _ = (descr, cell);
        Value::None
    }

    /// Casting implementation between two instances of this class.
    ///
    /// Required for parametric classes; the registry supplies a byte copy
    /// for non-parametric ones.
    fn same_class_cast(&self, this: ClassId) -> Option<CastSpec> {
        let _ = this;
        None
    }
}
