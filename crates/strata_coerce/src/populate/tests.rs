#![allow(clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::discover::{discover, DTypeRequest};
use crate::CoercionConfig;
use pretty_assertions::assert_eq;
use strata_diagnostic::ErrorCode;
use strata_types::{ClassId, Descriptor};

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|v| Value::Int(*v)))
}

fn build(registry: &Registry, value: &Value, request: DTypeRequest) -> Result<NdArray, CoerceError> {
    let config = CoercionConfig::default();
    let discovery = discover(registry, &config, value, request)?;
    let mut array = registry.allocate(discovery.descr, discovery.shape.clone())?;
    populate(registry, &mut array, discovery)?;
    Ok(array)
}

fn values(registry: &Registry, array: &NdArray) -> Vec<Value> {
    let class = registry.class(array.descr().class()).expect("registered");
    (0..array.len())
        .map(|i| class.getitem(array.descr(), array.cell(i).expect("in bounds")))
        .collect()
}

// === Filling ===

#[test]
fn test_nested_ints() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3, 4])]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.shape(), &Shape::new(&[2, 2]));
    assert_eq!(
        values(&registry, &array),
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn test_mixed_numbers_promote() {
    let registry = Registry::new();
    let value = Value::list([Value::Int(1), Value::Float(2.5)]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.descr(), &Descriptor::of(ClassId::FLOAT64));
    assert_eq!(values(&registry, &array), vec![Value::Float(1.0), Value::Float(2.5)]);
}

#[test]
fn test_strings_are_padded_into_unicode() {
    let registry = Registry::new();
    let value = Value::list([Value::str("a"), Value::str("hello")]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.descr(), &Descriptor::unicode(5));
    assert_eq!(values(&registry, &array), vec![Value::str("a"), Value::str("hello")]);
}

#[test]
fn test_text_is_parsed_into_numbers() {
    let registry = Registry::new();
    let value = Value::list([Value::str("1.5"), Value::str(" 2 ")]);
    let array = build(&registry, &value, ClassId::FLOAT64.into()).expect("populates");
    assert_eq!(values(&registry, &array), vec![Value::Float(1.5), Value::Float(2.0)]);
}

#[test]
fn test_empty_input_is_a_no_op() {
    let registry = Registry::new();
    let value = Value::list([]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.shape(), &Shape::new(&[0]));
    assert!(array.is_empty());
}

#[test]
fn test_scalar_root() {
    let registry = Registry::new();
    let array = build(&registry, &Value::Int(7), DTypeRequest::None).expect("populates");
    assert_eq!(array.ndim(), 0);
    assert_eq!(values(&registry, &array), vec![Value::Int(7)]);
}

// === Objects ===

#[test]
fn test_ragged_rows_are_stored_as_objects() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3])]);
    let array = build(&registry, &value, ClassId::OBJECT.into()).expect("populates");
    assert_eq!(array.shape(), &Shape::new(&[2]));
    assert_eq!(array.objects(), Some(&[ints(&[1, 2]), ints(&[3])][..]));
}

#[test]
fn test_object_rows_skip_cached_descendants() {
    let registry = Registry::new();
    let deep = Value::list([ints(&[1]), ints(&[2])]);
    let value = Value::list([deep.clone(), ints(&[3])]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.descr(), &Descriptor::of(ClassId::OBJECT));
    assert_eq!(array.objects(), Some(&[deep, ints(&[3])][..]));
}

#[test]
fn test_root_scalar_array_under_object_stores_its_element() {
    let registry = Registry::new();
    let scalar = NdArray::from_native(Shape::new(&[]), &[5i64]).expect("one element");
    let array = build(&registry, &Value::array(scalar), ClassId::OBJECT.into()).expect("populates");
    assert_eq!(array.shape(), &Shape::new(&[]));
    assert_eq!(array.objects(), Some(&[Value::Int(5)][..]));
}

#[test]
fn test_nested_scalar_array_under_object_is_kept_whole() {
    let registry = Registry::new();
    let scalar = Value::array(NdArray::from_native(Shape::new(&[]), &[5i64]).expect("one element"));
    let value = Value::list([scalar.clone(), Value::Int(6)]);
    let array = build(&registry, &value, ClassId::OBJECT.into()).expect("populates");
    assert_eq!(array.shape(), &Shape::new(&[2]));
    assert_eq!(array.objects(), Some(&[scalar, Value::Int(6)][..]));
}

// === Array-likes ===

#[test]
fn test_array_rows_are_cast() {
    let registry = Registry::new();
    let row = NdArray::from_native(Shape::new(&[2]), &[1i32, 2]).expect("matching length");
    let value = Value::list([
        Value::array(row),
        Value::list([Value::Float(2.5), Value::Float(3.5)]),
    ]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.descr(), &Descriptor::of(ClassId::FLOAT64));
    assert_eq!(
        values(&registry, &array),
        vec![Value::Float(1.0), Value::Float(2.0), Value::Float(2.5), Value::Float(3.5)]
    );
}

#[test]
fn test_same_instance_rows_are_copied() {
    let registry = Registry::new();
    let row = |data: &[i64]| Value::array(NdArray::from_native(Shape::new(&[2]), data).expect("matching length"));
    let value = Value::list([row(&[1, 2]), row(&[3, 4])]);
    let array = build(&registry, &value, DTypeRequest::None).expect("populates");
    assert_eq!(array.shape(), &Shape::new(&[2, 2]));
    assert_eq!(
        values(&registry, &array),
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

// === Errors ===

#[test]
fn test_mismatched_allocation_is_rejected() {
    let registry = Registry::new();
    let value = ints(&[1, 2]);
    let discovery = discover(&registry, &CoercionConfig::default(), &value, DTypeRequest::None).expect("discovers");
    let generation = discovery.cache.generation();
    let mut array = registry
        .allocate(Descriptor::of(ClassId::FLOAT64), Shape::new(&[2]))
        .expect("allocates");
    let err = populate(&registry, &mut array, discovery).expect_err("descriptor differs");
    assert!(
        matches!(err, CoerceError::CacheMismatch { generation: g, .. } if g == generation),
        "{err:?}"
    );
}

#[test]
fn test_sequence_past_the_depth_limit() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3, 4])]);
    let config = CoercionConfig::default().with_max_dims(1);
    let request = DTypeRequest::Instance(Descriptor::of(ClassId::INT64));
    let discovery = discover(&registry, &config, &value, request).expect("discovers");
    let mut array = registry
        .allocate(discovery.descr, discovery.shape.clone())
        .expect("allocates");
    let err = populate(&registry, &mut array, discovery).expect_err("lists are not integers");
    assert!(matches!(err, CoerceError::SequenceAsElement { .. }), "{err:?}");
    assert_eq!(err.path().map(ToString::to_string), Some("input[0]".to_owned()));
}

#[test]
fn test_unparsable_text_reports_its_path() {
    let registry = Registry::new();
    let value = Value::list([Value::str("1"), Value::str("x")]);
    let err = build(&registry, &value, ClassId::FLOAT64.into()).expect_err("not a number");
    assert_eq!(
        err,
        CoerceError::UnrepresentableValue {
            value: "'x'".to_owned(),
            class: "float64".to_owned(),
            path: NodePath::root().child(1),
            reason: "could not convert string to float64: 'x'".to_owned(),
        }
    );
    assert_eq!(err.code(), ErrorCode::E3002);
}

#[test]
fn test_out_of_range_integer() {
    let registry = Registry::new();
    let value = ints(&[1, 300]);
    let err = build(&registry, &value, ClassId::INT8.into()).expect_err("300 does not fit");
    assert!(matches!(err, CoerceError::UnrepresentableValue { .. }), "{err:?}");
    assert_eq!(err.code(), ErrorCode::E3002);
    assert_eq!(err.path(), Some(&NodePath::root().child(1)));
}

#[test]
fn test_floats_outside_the_integer_range() {
    let registry = Registry::new();
    for (float, class) in [
        (f64::NAN, ClassId::INT64),
        (f64::INFINITY, ClassId::INT64),
        (1e300, ClassId::INT64),
        (300.0, ClassId::INT8),
        (-1.0, ClassId::UINT8),
    ] {
        let value = Value::list([Value::Float(0.0), Value::Float(float)]);
        let err = build(&registry, &value, class.into()).expect_err("does not fit");
        assert_eq!(err.code(), ErrorCode::E3002, "{float} into {class}");
        assert_eq!(err.path(), Some(&NodePath::root().child(1)));
    }

    let value = Value::list([Value::Float(2.9), Value::Float(-3.5)]);
    let array = build(&registry, &value, ClassId::INT8.into()).expect("truncates");
    assert_eq!(values(&registry, &array), vec![Value::Int(2), Value::Int(-3)]);
}

#[test]
fn test_unknown_leaf_under_a_numeric_class() {
    let registry = Registry::new();
    let value = Value::list([Value::Int(1), Value::Map(vec![])]);
    let err = build(&registry, &value, ClassId::INT64.into()).expect_err("maps are not integers");
    assert_eq!(err.code(), ErrorCode::E3002);
    assert_eq!(err.path(), Some(&NodePath::root().child(1)));
}
