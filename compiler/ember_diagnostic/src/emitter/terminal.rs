//! Human-readable output with source snippets and optional ANSI color.

use std::io::Write;

use super::{ColorMode, DiagnosticEmitter};
use crate::span_utils::LineIndex;
use crate::{Diagnostic, Label, Severity};

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

/// Renders diagnostics against one source file.
pub struct TerminalEmitter<'s, W: Write> {
    writer: W,
    colors: bool,
    source: &'s str,
    path: &'s str,
    lines: LineIndex,
}

impl<'s, W: Write> TerminalEmitter<'s, W> {
    pub fn new(writer: W, source: &'s str, path: &'s str, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source,
            path,
            lines: LineIndex::new(source),
        }
    }

    /// Consume the emitter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        }
    }

    fn emit_label(&mut self, label: &Label, severity: Severity, gutter: usize) {
        let start = label.span.start as usize;
        let (line, col) = self.lines.line_col(self.source, start);
        let text = self.lines.line_text(self.source, line).to_owned();

        let marker = if label.is_primary { "-->" } else { ":::" };
        let _ = writeln!(
            self.writer,
            "{:gutter$}{marker} {}:{line}:{col}",
            "", self.path
        );
        let _ = writeln!(self.writer, "{:gutter$} |", "");
        let _ = writeln!(self.writer, "{line:>gutter$} | {text}");

        let width = text.chars().count();
        let underline_len = (label.span.len() as usize)
            .min(width.saturating_sub(col - 1))
            .max(1);
        let (glyph, color) = if label.is_primary {
            ('^', Self::severity_color(severity))
        } else {
            ('-', colors::SECONDARY)
        };
        let underline = glyph.to_string().repeat(underline_len);
        let _ = write!(self.writer, "{:gutter$} | {:pad$}", "", "", pad = col - 1);
        self.paint(&underline, color);
        if !label.message.is_empty() {
            let _ = write!(self.writer, " ");
            self.paint(&label.message, color);
        }
        let _ = writeln!(self.writer);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.paint(
            &diagnostic.severity.to_string(),
            Self::severity_color(diagnostic.severity),
        );
        let code = format!("[{}]", diagnostic.code);
        self.paint(&code, colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        let gutter = diagnostic
            .labels
            .iter()
            .map(|l| self.lines.line(l.span.start as usize).to_string().len())
            .max()
            .unwrap_or(1)
            + 1;

        for label in &diagnostic.labels {
            self.emit_label(label, diagnostic.severity, gutter);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "{:gutter$} = ", "");
            self.paint("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }
        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
