//! Diagnostic rendering.

use ember_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use ember_diagnostic::{ColorMode, Diagnostic};

/// Render diagnostics against `source` as they would appear on a terminal.
///
/// `ColorMode::Auto` renders without colors.
pub fn render_diagnostics(
    source: &str,
    path: &str,
    diagnostics: &[Diagnostic],
    mode: ColorMode,
) -> String {
    let mut emitter = TerminalEmitter::new(Vec::new(), source, path, mode, false);
    emitter.emit_all(diagnostics);
    emitter.flush();
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}
