use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E3001)
        .with_message("ragged input")
        .with_label(NodePath::root().child(1), "length 1, expected 2")
        .with_note("some context")
        .with_suggestion("pad the inner lists");

    assert_eq!(diag.code, ErrorCode::E3001);
    assert_eq!(diag.message, "ragged input");
    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 1);
    assert!(diag.labels[0].is_primary);
    assert_eq!(diag.notes.len(), 1);
    assert_eq!(diag.suggestions.len(), 1);
}

#[test]
fn test_primary_path_skips_secondary_labels() {
    let diag = Diagnostic::warning(ErrorCode::W3001)
        .with_secondary_label(NodePath::root().child(0), "first branch")
        .with_label(NodePath::root().child(1), "diverges here");

    assert_eq!(diag.primary_path(), Some(&NodePath::root().child(1)));
    assert!(!diag.is_error());
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("no cast from `datetime64[D]` to `float32`")
        .with_label(NodePath::root().child(2), "here")
        .with_suggestion("request an `object` result");

    let output = diag.to_string();
    assert!(output.starts_with("error [E2001]: no cast"));
    assert!(output.contains("--> input[2]: here"));
    assert!(output.contains("= help: request an `object` result"));
}

#[test]
fn test_severity_display() {
    assert_eq!(Severity::Error.to_string(), "error");
    assert_eq!(Severity::Warning.to_string(), "warning");
}
