use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;
use sky_ir::Location;

#[test]
fn test_buffer_sink_collects_in_order() {
    let sink = BufferSink::new();
    sink.handle(Diagnostic::note("first"));
    sink.handle(Diagnostic::error("second"));

    let messages: Vec<_> = sink.diagnostics().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["first".to_string(), "second".to_string()]);
    assert!(sink.has_errors());
}

#[test]
fn test_take_drains() {
    let sink = BufferSink::new();
    sink.handle(Diagnostic::warning("w"));
    assert_eq!(sink.take().len(), 1);
    assert!(sink.is_empty());
}

#[test]
fn test_replay_preserves_everything() {
    let batch = vec![
        Diagnostic::error("unterminated string")
            .with_code(ErrorCode::E0001)
            .at(Location::new("/repo/BUCK", 2, 5)),
        Diagnostic::error("unexpected token").with_code(ErrorCode::E1001),
    ];
    let sink = BufferSink::new();
    replay(&sink, &batch);
    assert_eq!(sink.diagnostics(), batch);
}

#[test]
fn test_display_format() {
    let diagnostic = Diagnostic::error("unexpected token `)`")
        .with_code(ErrorCode::E1001)
        .at(Location::new("/repo/pkg/BUCK", 1, 9));
    assert_eq!(
        diagnostic.to_string(),
        "/repo/pkg/BUCK:1:9: error[E1001]: unexpected token `)`"
    );
}

#[test]
fn test_null_sink_accepts_anything() {
    NullSink.handle(Diagnostic::error("ignored"));
}
