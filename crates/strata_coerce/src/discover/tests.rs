#![allow(clippy::expect_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use strata_types::element::Element;
use strata_types::TypedScalar;

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|v| Value::Int(*v)))
}

fn run<'a>(registry: &Registry, value: &'a Value, request: DTypeRequest) -> Result<Discovery<'a>, CoerceError> {
    discover(registry, &CoercionConfig::default(), value, request)
}

fn found<'a>(registry: &Registry, value: &'a Value, request: DTypeRequest) -> Discovery<'a> {
    run(registry, value, request).expect("discovery succeeds")
}

// === Shapes and Promotion ===

#[test]
fn test_nested_ints() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3, 4])]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.ndim, 2);
    assert_eq!(discovery.shape, Shape::new(&[2, 2]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::INT64));
    assert_eq!(discovery.cache.len(), 3);
    assert!(discovery.diagnostics.is_empty());
    assert_eq!(discovery.flags, DiscoveryFlags::empty());
}

#[test]
fn test_int_and_float_promote() {
    let registry = Registry::new();
    let value = Value::list([Value::Int(1), Value::Float(2.5)]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.shape, Shape::new(&[2]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::FLOAT64));
}

#[test]
fn test_scalar_root() {
    let registry = Registry::new();
    let value = Value::Bool(true);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.ndim, 0);
    assert_eq!(discovery.shape, Shape::scalar());
    assert_eq!(discovery.descr, Descriptor::of(ClassId::BOOL));
    assert!(discovery.cache.is_empty());
}

#[test]
fn test_strings_size_the_instance() {
    let registry = Registry::new();
    let value = Value::list([Value::str("a"), Value::str("hello")]);
    assert_eq!(found(&registry, &value, DTypeRequest::None).descr, Descriptor::unicode(5));

    let mixed = Value::list([Value::str("ab"), Value::Int(3)]);
    assert_eq!(found(&registry, &mixed, DTypeRequest::None).descr, Descriptor::unicode(21));
}

#[test]
fn test_failed_promotion_falls_back_to_object() {
    let registry = Registry::new();
    let day = TypedScalar::from_element(Descriptor::datetime(TimeUnit::Day), &Element::Datetime(5))
        .expect("datetime scalar");
    let value = Value::list([Value::Typed(day), Value::Int(1), Value::Float(0.5)]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.descr, Descriptor::of(ClassId::OBJECT));
    assert!(discovery.flags.contains(DiscoveryFlags::PROMOTION_FAILED));
    assert!(discovery.diagnostics.is_empty());
}

#[test]
fn test_unknown_values_are_objects() {
    let registry = Registry::new();
    let value = Value::list([Value::Map(vec![]), Value::Int(1)]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.descr, Descriptor::of(ClassId::OBJECT));
    assert_eq!(discovery.shape, Shape::new(&[2]));
}

// === Empty Input ===

#[test]
fn test_empty_sequence_uses_default() {
    let registry = Registry::new();
    let value = Value::list([]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.ndim, 1);
    assert_eq!(discovery.shape, Shape::new(&[0]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::FLOAT64));

    let as_int8 = found(&registry, &value, ClassId::INT8.into());
    assert_eq!(as_int8.descr, Descriptor::of(ClassId::INT8));
    let as_str = found(&registry, &value, ClassId::STR.into());
    assert_eq!(as_str.descr, Descriptor::unicode(1));
    let as_character = found(&registry, &value, ClassId::CHARACTER.into());
    assert_eq!(as_character.descr, Descriptor::unicode(1));
}

#[test]
fn test_nested_empty_sequences() {
    let registry = Registry::new();
    let value = Value::list([Value::list([]), Value::list([])]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.shape, Shape::new(&[2, 0]));
}

// === Ragged Input ===

#[test]
fn test_ragged_without_class_warns_once() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3]), ints(&[4, 5, 6])]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.shape, Shape::new(&[3]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::OBJECT));
    assert!(discovery.flags.contains(DiscoveryFlags::RAGGED));
    assert!(discovery.flags.contains(DiscoveryFlags::DEPRECATION_WARNED));
    assert_eq!(discovery.diagnostics.len(), 1);
    assert_eq!(discovery.diagnostics[0].code, ErrorCode::W3001);
    assert_eq!(discovery.diagnostics[0].primary_path(), Some(&NodePath::root().child(1)));
}

#[test]
fn test_ragged_under_fixed_class_fails() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3])]);
    let err = run(&registry, &value, ClassId::INT64.into()).expect_err("ragged");
    assert_eq!(
        err,
        CoerceError::RaggedInput {
            shape: Shape::new(&[2]),
            path: NodePath::root().child(1),
        }
    );
}

#[test]
fn test_ragged_under_reject_policy_fails() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3])]);
    let config = CoercionConfig::default().with_ragged(RaggedPolicy::Reject);
    let err = discover(&registry, &config, &value, DTypeRequest::None).expect_err("ragged");
    assert!(matches!(err, CoerceError::RaggedInput { .. }));
}

#[test]
fn test_ragged_under_object_class_is_silent() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3])]);
    let discovery = found(&registry, &value, ClassId::OBJECT.into());
    assert_eq!(discovery.shape, Shape::new(&[2]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::OBJECT));
    assert!(discovery.diagnostics.is_empty());
}

#[test]
fn test_depth_limit_turns_sequences_into_elements() {
    let registry = Registry::new();
    let value = Value::list([ints(&[1, 2]), ints(&[3, 4])]);
    let config = CoercionConfig::default().with_max_dims(1);
    let discovery = discover(&registry, &config, &value, DTypeRequest::None).expect("not ragged");
    assert_eq!(discovery.shape, Shape::new(&[2]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::OBJECT));
    assert!(discovery.flags.contains(DiscoveryFlags::REACHED_MAX_DIMS));
    assert!(discovery.diagnostics.is_empty());
}

// === Requested Classes and Instances ===

#[test]
fn test_fixed_parametric_class_sizes_from_values() {
    let registry = Registry::new();
    let value = ints(&[1, 22]);
    assert_eq!(found(&registry, &value, ClassId::STR.into()).descr, Descriptor::unicode(21));

    let dates = Value::list([Value::str("2024-03-01"), Value::str("2024-03-01T10:30")]);
    assert_eq!(
        found(&registry, &dates, ClassId::DATETIME.into()).descr,
        Descriptor::datetime(TimeUnit::Minute)
    );
}

#[test]
fn test_fixed_abstract_class() {
    let registry = Registry::new();
    let value = Value::list([Value::Int(1), Value::Float(2.5)]);
    assert_eq!(
        found(&registry, &value, ClassId::INTEGER.into()).descr,
        Descriptor::of(ClassId::INT64)
    );
    assert_eq!(
        found(&registry, &ints(&[1]), ClassId::FLOATING.into()).descr,
        Descriptor::of(ClassId::FLOAT64)
    );
}

#[test]
fn test_requested_instance_suppresses_promotion() {
    let registry = Registry::new();
    let value = Value::list([Value::Int(1), Value::str("x")]);
    let discovery = found(&registry, &value, Descriptor::of(ClassId::FLOAT32).into());
    assert_eq!(discovery.descr, Descriptor::of(ClassId::FLOAT32));
    assert!(!discovery.flags.contains(DiscoveryFlags::PROMOTION_FAILED));
}

#[test]
fn test_unsized_instance_only_fixes_the_class() {
    let registry = Registry::new();
    let value = Value::list([Value::str("abc")]);
    let discovery = found(&registry, &value, Descriptor::unicode(0).into());
    assert_eq!(discovery.descr, Descriptor::unicode(3));
}

#[test]
fn test_fixed_class_cannot_represent_unknown_values() {
    let registry = Registry::new();
    let value = Value::list([Value::None]);
    let err = run(&registry, &value, ClassId::STR.into()).expect_err("None has no str instance");
    assert_eq!(
        err,
        CoerceError::UnrepresentableValue {
            value: "None".to_owned(),
            class: "str".to_owned(),
            path: NodePath::root().child(0),
            reason: "the class has no instance for this value".to_owned(),
        }
    );
}

#[test]
fn test_unregistered_class_request() {
    let registry = Registry::new();
    let value = ints(&[1]);
    let err = run(&registry, &value, ClassId::from_raw(200).into()).expect_err("unknown");
    assert_eq!(err, CoerceError::Registry(RegistryError::UnknownClass(ClassId::from_raw(200))));
}

#[test]
fn test_invalid_max_dims() {
    let registry = Registry::new();
    let value = ints(&[1]);
    let config = CoercionConfig::default().with_max_dims(33);
    let err = discover(&registry, &config, &value, DTypeRequest::None).expect_err("too deep");
    assert_eq!(err, CoerceError::InvalidMaxDims(33));
}

// === Array-likes ===

#[test]
fn test_array_likes_contribute_shape_and_descriptor() {
    let registry = Registry::new();
    let row = |data: &[i32]| {
        Value::array(NdArray::from_native(Shape::new(&[data.len()]), data).expect("matching length"))
    };
    let value = Value::list([row(&[1, 2]), row(&[3, 4])]);
    let discovery = found(&registry, &value, DTypeRequest::None);
    assert_eq!(discovery.shape, Shape::new(&[2, 2]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::INT32));
    assert_eq!(discovery.cache.len(), 3);
    assert!(!discovery.cache.entries()[1].converted.is_sequence());

    let ragged = Value::list([row(&[1, 2]), row(&[3])]);
    let discovery = found(&registry, &ragged, DTypeRequest::None);
    assert_eq!(discovery.shape, Shape::new(&[2]));
    assert_eq!(discovery.descr, Descriptor::of(ClassId::OBJECT));
}

#[test]
fn test_object_array_under_parametric_class_is_flattened() {
    let registry = Registry::new();
    let objects = NdArray::from_objects(
        Descriptor::of(ClassId::OBJECT),
        Shape::new(&[2]),
        vec![Value::str("ab"), Value::str("wxyz")],
    )
    .expect("matching length");
    let value = Value::array(objects);
    let discovery = found(&registry, &value, ClassId::STR.into());
    assert_eq!(discovery.shape, Shape::new(&[2]));
    assert_eq!(discovery.descr, Descriptor::unicode(4));
}

// === Discovery Hints ===

#[test]
fn test_strings_split_into_characters_when_class_asks() {
    let registry = Registry::new();
    let value = Value::list([Value::str("ab"), Value::str("cd")]);
    let config = CoercionConfig::default();
    let mut walker = Walker {
        registry: &registry,
        fixed: Some((ClassId::STR, registry.class(ClassId::STR).expect("str"))),
        requested: Some(Descriptor::unicode(1)),
        flags: DiscoveryFlags::STRINGS_AS_SEQUENCES,
        shape: ShapeTracker::new(config.max_dims),
        descr: None,
        cache: CoercionCache::new(),
        diagnostics: DiagnosticQueue::new(),
        path: NodePath::root(),
        ragged_at: None,
    };
    walker.visit(&value, 0).expect("walks");
    assert_eq!(walker.shape.max_ndim(), 2);
    assert_eq!(walker.shape.shape(2), Shape::new(&[2, 2]));
    assert_eq!(walker.cache.len(), 3);
    assert!(matches!(walker.cache.entries()[1].converted, Converted::Chars(_)));
}
