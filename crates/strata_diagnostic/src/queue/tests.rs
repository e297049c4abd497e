use super::*;
use pretty_assertions::assert_eq;
use strata_ir::NodePath;

fn ragged_warning(index: usize) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W3001)
        .with_message("ragged nested sequences")
        .with_label(NodePath::root().child(index), "shape diverges here")
}

#[test]
fn test_deduplicates_by_code() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(ragged_warning(1)));
    assert!(!queue.add(ragged_warning(2)));
    assert!(queue.has_emitted(ErrorCode::W3001));

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].primary_path(), Some(&NodePath::root().child(1)));
}

#[test]
fn test_unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    assert!(queue.add(ragged_warning(1)));
    assert!(queue.add(ragged_warning(2)));
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_error_limit_drops_errors_but_not_warnings() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
        suppressed: Vec::new(),
    });
    assert!(queue.add(Diagnostic::error(ErrorCode::E2001).with_message("first")));
    assert!(queue.limit_reached());
    assert!(!queue.add(Diagnostic::error(ErrorCode::E2002).with_message("second")));
    assert!(queue.add(ragged_warning(0)));
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_flush_resets_dedup_state() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(ragged_warning(0)));
    let _ = queue.flush();
    assert!(queue.is_empty());
    assert!(queue.add(ragged_warning(0)));
}

#[test]
fn test_suppressed_warnings_are_dropped() {
    let config = DiagnosticConfig::default().suppress(ErrorCode::W3001);
    let mut queue = DiagnosticQueue::with_config(config);
    assert!(!queue.add(ragged_warning(0)));
    assert!(!queue.has_emitted(ErrorCode::W3001));
    assert!(queue.add(Diagnostic::warning(ErrorCode::W3002).with_message("legacy scalar")));
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_errors_cannot_be_suppressed() {
    let config = DiagnosticConfig::default().suppress(ErrorCode::E3001);
    assert!(config.suppressed.is_empty());
    let mut queue = DiagnosticQueue::with_config(config);
    assert!(queue.add(Diagnostic::error(ErrorCode::E3001).with_message("ragged")));
}
