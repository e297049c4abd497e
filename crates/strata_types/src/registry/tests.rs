#![allow(clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::cast::{self, Casting, Target};
use crate::class::SetItemError;
use crate::{CellMut, UserScalar};
use pretty_assertions::assert_eq;

/// A plugin float class storing `f64` values of one user scalar type.
#[derive(Debug)]
struct Celsius;

impl DTypeClass for Celsius {
    fn name(&self) -> &str {
        "celsius"
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::USER_DEFINED | ClassFlags::NUMERIC
    }

    fn item_size(&self, _descr: &Descriptor) -> usize {
        8
    }

    fn setitem(&self, _descr: &Descriptor, value: &Value, cell: CellMut<'_>) -> Result<(), SetItemError> {
        let Value::User(scalar) = value else {
            return Err(SetItemError::Unsupported);
        };
        let raw = cell.raw().ok_or(SetItemError::Unsupported)?;
        raw.copy_from_slice(&(scalar.words[0] as f64).to_ne_bytes());
        Ok(())
    }
}

/// Parametric but without a same-class cast.
#[derive(Debug)]
struct Unsized;

impl DTypeClass for Unsized {
    fn name(&self) -> &str {
        "unsized"
    }

    fn flags(&self) -> ClassFlags {
        ClassFlags::PARAMETRIC | ClassFlags::USER_DEFINED
    }

    fn item_size(&self, _descr: &Descriptor) -> usize {
        0
    }
}

#[test]
fn test_primed_mappings() {
    let registry = Registry::new();
    assert_eq!(registry.lookup(ScalarType::INT), Lookup::Class(ClassId::INT64));
    assert_eq!(registry.lookup(ScalarType::STR), Lookup::Class(ClassId::STR));
    assert_eq!(
        registry.lookup(ScalarType::of_class(ClassId::UINT16)),
        Lookup::Class(ClassId::UINT16)
    );
    assert_eq!(registry.lookup(ScalarType::LIST), Lookup::NonScalar);
    assert_eq!(registry.lookup(ScalarType::NONE), Lookup::Unknown);
    assert_eq!(registry.lookup(ScalarType::MAP), Lookup::Unknown);
}

#[test]
fn test_hierarchy() {
    let registry = Registry::new();
    assert!(registry.is_subclass(ClassId::INT8, ClassId::NUMBER));
    assert!(registry.is_subclass(ClassId::STR, ClassId::CHARACTER));
    assert!(registry.is_subclass(ClassId::BOOL, ClassId::GENERIC));
    assert!(!registry.is_subclass(ClassId::BOOL, ClassId::NUMBER));
    assert!(!registry.is_subclass(ClassId::NUMBER, ClassId::INT8));
}

#[test]
fn test_duplicate_scalar_mapping() {
    let mut registry = Registry::new();
    let err = registry
        .register_scalar_mapping(ClassId::FLOAT32, ScalarType::FLOAT, false)
        .expect_err("float is taken");
    assert_eq!(
        err,
        RegistryError::DuplicateScalarMapping {
            scalar_type: ScalarType::FLOAT,
            existing: ClassId::FLOAT64,
        }
    );
    registry
        .register_scalar_mapping(ClassId::FLOAT64, ScalarType::FLOAT, false)
        .expect("repeating a mapping is a no-op");
}

#[test]
fn test_user_mapping_must_be_generic_family() {
    let mut registry = Registry::new();
    let id = registry
        .register_class(Arc::new(Celsius), ClassId::FLOATING)
        .expect("abstract parent");
    let err = registry
        .register_scalar_mapping(id, ScalarType::NONE, true)
        .expect_err("language type");
    assert!(matches!(err, RegistryError::InvalidRegistration { .. }));
    registry
        .register_scalar_mapping(id, ScalarType::user(0), true)
        .expect("generic family");
    assert_eq!(registry.lookup(ScalarType::user(0)), Lookup::Class(id));
    let err = registry
        .register_scalar_mapping(id, ScalarType::user(1), true)
        .expect_err("one scalar type per class");
    assert!(matches!(err, RegistryError::DuplicateScalarMapping { .. }));
}

#[test]
fn test_register_class_validation() {
    let mut registry = Registry::new();
    let err = registry
        .register_class(Arc::new(Celsius), ClassId::FLOAT64)
        .expect_err("concrete classes are sealed");
    assert!(matches!(err, RegistryError::InvalidRegistration { .. }));
    let err = registry
        .register_class(Arc::new(Celsius), ClassId::from_raw(99))
        .expect_err("unknown parent");
    assert_eq!(err, RegistryError::UnknownClass(ClassId::from_raw(99)));
    let err = registry
        .register_class(Arc::new(Unsized), ClassId::GENERIC)
        .expect_err("needs a same-class cast");
    assert!(matches!(err, RegistryError::InvalidRegistration { .. }));
}

#[test]
fn test_plugin_gets_copy_and_object_casts() {
    let mut registry = Registry::new();
    let id = registry
        .register_class(Arc::new(Celsius), ClassId::FLOATING)
        .expect("registers");
    assert!(id.raw() >= ClassId::FIRST_DYNAMIC);
    assert_eq!(registry.class_name(id), "celsius");
    assert!(registry.is_subclass(id, ClassId::NUMBER));
    let descr = Descriptor::of(id);
    let copy = cast::resolve(&registry, &descr, Target::Class(id)).expect("same-class copy");
    assert_eq!(copy.safety.level, Casting::Equivalent);
    assert!(registry.cast(id, ClassId::OBJECT).is_some());
    assert!(registry.cast(ClassId::OBJECT, id).is_some());
}

#[test]
fn test_stale_mapping_is_pruned() {
    let mut registry = Registry::new();
    let id = registry
        .register_class(Arc::new(Celsius), ClassId::FLOATING)
        .expect("registers");
    registry
        .register_scalar_mapping(id, ScalarType::user(7), true)
        .expect("maps");
    registry.unregister_class(id).expect("plugin classes can leave");
    assert!(registry.cast(id, ClassId::OBJECT).is_none());
    assert_eq!(registry.lookup(ScalarType::user(7)), Lookup::Unknown);

    let next = registry
        .register_class(Arc::new(Celsius), ClassId::FLOATING)
        .expect("registers again");
    assert_ne!(next, id, "ids are never reused");
    registry
        .register_scalar_mapping(next, ScalarType::user(7), true)
        .expect("the pruned scalar type is free");
}

#[test]
fn test_builtins_cannot_leave() {
    let mut registry = Registry::new();
    let err = registry
        .unregister_class(ClassId::INT8)
        .expect_err("built-in");
    assert!(matches!(err, RegistryError::InvalidRegistration { .. }));
}

#[test]
fn test_define_cast_rejects_duplicates() {
    let mut registry = Registry::new();
    let spec = *registry
        .cast(ClassId::INT8, ClassId::INT16)
        .expect("built-in cast");
    assert_eq!(
        registry.define_cast(spec),
        Err(RegistryError::DuplicateCast {
            from: ClassId::INT8,
            to: ClassId::INT16,
        })
    );
}

#[test]
fn test_legacy_class_for_typed_scalars() {
    let mut registry = Registry::new();
    let id = registry
        .register_class(Arc::new(Celsius), ClassId::FLOATING)
        .expect("registers");
    let typed = Value::Typed(crate::TypedScalar::new(Descriptor::of(id), &[0; 8]));
    assert_eq!(registry.lookup(typed.scalar_type()), Lookup::Unknown);
    assert_eq!(registry.legacy_class(&typed), Some(id));
    assert_eq!(registry.scalar_class(&typed), Some(id));
    let user = Value::User(UserScalar::new(ScalarType::user(3), &[1]));
    assert_eq!(registry.scalar_class(&user), None);
}

#[test]
fn test_layout_and_allocate() {
    let registry = Registry::new();
    let layout = registry.layout(&Descriptor::unicode(3)).expect("str");
    assert_eq!(layout.item_size, 12);
    assert!(!layout.holds_objects);
    let array = registry
        .allocate(Descriptor::of(ClassId::OBJECT), Shape::new(&[2]))
        .expect("object");
    assert!(array.holds_objects());
    assert_eq!(array.objects(), Some(&[Value::None, Value::None][..]));
}
