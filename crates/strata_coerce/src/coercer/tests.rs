#![allow(clippy::expect_used, reason = "Tests can panic")]

use super::*;
use crate::RaggedPolicy;
use pretty_assertions::assert_eq;
use strata_diagnostic::ErrorCode;
use strata_ir::Shape;
use strata_types::{ClassId, Descriptor};

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|v| Value::Int(*v)))
}

#[test]
fn test_to_array() {
    let registry = Registry::new();
    let coercer = Coercer::new(&registry);
    let value = Value::list([ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
    let coerced = coercer.to_array(&value, DTypeRequest::None).expect("coerces");
    assert_eq!(coerced.array.shape(), &Shape::new(&[2, 3]));
    assert_eq!(coerced.array.descr(), &Descriptor::of(ClassId::INT64));
    assert!(coerced.diagnostics.is_empty());
}

#[test]
fn test_ragged_warning_is_returned() {
    let registry = Registry::new();
    let coercer = Coercer::new(&registry);
    let value = Value::list([ints(&[1, 2]), ints(&[3])]);
    let coerced = coercer.to_array(&value, DTypeRequest::None).expect("deprecated, not rejected");
    assert_eq!(coerced.array.descr(), &Descriptor::of(ClassId::OBJECT));
    assert_eq!(coerced.diagnostics.len(), 1);
    assert_eq!(coerced.diagnostics[0].code, ErrorCode::W3001);
}

#[test]
fn test_reject_policy() {
    let registry = Registry::new();
    let config = CoercionConfig::default().with_ragged(RaggedPolicy::Reject);
    let coercer = Coercer::with_config(&registry, config);
    assert_eq!(coercer.config().ragged, RaggedPolicy::Reject);
    let value = Value::list([ints(&[1, 2]), ints(&[3])]);
    let err = coercer
        .to_array(&value, DTypeRequest::None)
        .expect_err("ragged input rejected");
    assert_eq!(err.code(), ErrorCode::E3001);
}

#[test]
fn test_discover_then_populate() {
    let registry = Registry::new();
    let coercer = Coercer::new(&registry);
    let value = Value::list([Value::Float(0.5), Value::Int(2)]);
    let discovery = coercer.discover(&value, DTypeRequest::None).expect("discovers");
    let mut array = coercer
        .registry()
        .allocate(discovery.descr, discovery.shape.clone())
        .expect("allocates");
    coercer.populate(&mut array, discovery).expect("populates");
    assert_eq!(array.descr(), &Descriptor::of(ClassId::FLOAT64));
    assert_eq!(array.len(), 2);
}

#[test]
fn test_discovery_cannot_be_replayed_into_another_array() {
    let registry = Registry::new();
    let coercer = Coercer::new(&registry);
    let value = ints(&[1, 2, 3]);
    let discovery = coercer.discover(&value, DTypeRequest::None).expect("discovers");
    let mut array = registry
        .allocate(Descriptor::of(ClassId::INT64), Shape::new(&[2]))
        .expect("allocates");
    let err = coercer.populate(&mut array, discovery).expect_err("shape differs");
    assert_eq!(err.code(), ErrorCode::E4001);
}

#[test]
fn test_global_registry() {
    strata_types::registry::global::init();
    let shape = strata_types::registry::global::with_registry(|registry| {
        let value = Value::list([Value::str("ab"), Value::str("c")]);
        Coercer::new(registry)
            .to_array(&value, DTypeRequest::None)
            .map(|coerced| (*coerced.array.descr(), coerced.array.shape().clone()))
    })
    .expect("initialized")
    .expect("coerces");
    assert_eq!(shape, (Descriptor::unicode(2), Shape::new(&[2])));
}
