use super::*;
use pretty_assertions::assert_eq;
use strata_types::ClassId;

#[test]
fn test_codes_follow_phase_ranges() {
    let ragged = CoerceError::RaggedInput {
        shape: Shape::new(&[2]),
        path: NodePath::root().child(1),
    };
    assert!(ragged.code().is_discovery_error());
    assert!(CoerceError::InvalidMaxDims(40).code().is_discovery_error());
    assert!(CoerceError::SequenceAsElement { path: NodePath::root() }
        .code()
        .is_population_error());

    let cast = CoerceError::cast(
        &NodePath::root(),
        CastError::NoCastAvailable {
            from: ClassId::DATETIME,
            to: ClassId::FLOAT32,
        },
    );
    assert_eq!(cast.code(), ErrorCode::E2001);
}

#[test]
fn test_ragged_diagnostic_points_at_the_node() {
    let err = CoerceError::RaggedInput {
        shape: Shape::new(&[2]),
        path: NodePath::root().child(1),
    };
    assert_eq!(
        err.to_string(),
        "setting an array element with a sequence: the input is ragged at input[1] \
         (the shape was detected as (2,))"
    );
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E3001);
    assert_eq!(diag.primary_path(), Some(&NodePath::root().child(1)));
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn test_cast_diagnostic_keeps_cast_code_and_adds_label() {
    let path = NodePath::root().child(0).child(2);
    let err = CoerceError::cast(
        &path,
        CastError::InvalidValue {
            reason: "could not convert string to float64: 'x'".to_owned(),
        },
    );
    assert_eq!(
        err.to_string(),
        "could not convert string to float64: 'x' (at input[0][2])"
    );
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E2004);
    assert_eq!(diag.primary_path(), Some(&path));
}

#[test]
fn test_errors_without_a_node_have_no_label() {
    let err = CoerceError::CacheMismatch {
        generation: 3,
        expected: "float64 (2,)".to_owned(),
        found: "int8 (2,)".to_owned(),
    };
    assert_eq!(err.path(), None);
    assert!(err.to_diagnostic().labels.is_empty());
}

#[test]
fn test_unrepresentable_value_is_labeled() {
    let path = NodePath::root().child(1);
    let err = CoerceError::UnrepresentableValue {
        value: "nan".to_owned(),
        class: "int64".to_owned(),
        path: path.clone(),
        reason: "cannot convert float NaN to int64".to_owned(),
    };
    assert_eq!(
        err.to_string(),
        "unable to represent nan using class `int64` at input[1]: cannot convert float NaN to int64"
    );
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E3002);
    assert_eq!(diag.primary_path(), Some(&path));
}

#[test]
fn test_ragged_diagnostic_names_the_enclosing_sequence() {
    let err = CoerceError::RaggedInput {
        shape: Shape::new(&[1, 2]),
        path: NodePath::root().child(0).child(1),
    };
    let diag = err.to_diagnostic();
    let secondary: Vec<_> = diag.labels.iter().filter(|label| !label.is_primary).collect();
    assert_eq!(secondary.len(), 1);
    assert_eq!(secondary[0].path, NodePath::root().child(0));

    let at_root = CoerceError::RaggedInput {
        shape: Shape::new(&[2]),
        path: NodePath::root(),
    };
    assert_eq!(at_root.to_diagnostic().labels.len(), 1);
}
