use ember_ir::Span;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message("unknown identifier `y`")
        .with_secondary_label(Span::new(0, 3), "in this function")
        .with_label(Span::new(10, 11), "not declared")
        .with_note("declare it with `var`");

    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(10, 11)));
    assert_eq!(diag.notes, vec!["declare it with `var`".to_owned()]);
}

#[test]
fn display_shows_severity_code_and_message() {
    let diag = Diagnostic::warning(ErrorCode::E2006).with_message("unused signature");
    assert_eq!(diag.to_string(), "warning[E2006]: unused signature");
}
