//! Diagnostic emitters.
//!
//! ```text
//! error[E6001]: Too many arguments
//!   --> 3:5: Too many arguments for "add", wanted 2, got 3
//! ```
//!
//! A label without a line and column falls back to its byte range; a label
//! with neither prints only its message.

use std::io::{self, Write};

use crate::{Diagnostic, Label, Severity};

/// Sink for rendered diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        diagnostics.iter().for_each(|diag| self.emit(diag));
    }

    fn flush(&mut self);
}

/// When the terminal emitter uses ANSI escapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Only when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        matches!((self, is_tty), (ColorMode::Always, _) | (ColorMode::Auto, true))
    }
}

#[derive(Clone, Copy)]
enum Style {
    Severity(Severity),
    Bold,
}

impl Style {
    fn escape(self) -> &'static str {
        match self {
            Style::Severity(Severity::Error) => "\x1b[1;31m",
            Style::Severity(Severity::Warning) => "\x1b[1;33m",
            Style::Severity(Severity::Note) => "\x1b[1;36m",
            Style::Bold => "\x1b[1m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Writes diagnostics as text, optionally colored.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colored: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colored: mode.should_use_colors(is_tty),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn styled(&mut self, style: Style, text: &str) -> io::Result<()> {
        if self.colored {
            write!(self.writer, "{}{text}{RESET}", style.escape())
        } else {
            self.writer.write_all(text.as_bytes())
        }
    }

    fn write_label(&mut self, label: &Label) -> io::Result<()> {
        let marker = if label.is_primary { "-->" } else { "   " };
        if label.has_position() {
            writeln!(self.writer, "  {marker} {}:{}: {}", label.line, label.column, label.message)
        } else if label.span.is_dummy() {
            writeln!(self.writer, "  {marker} {}", label.message)
        } else {
            writeln!(self.writer, "  {marker} {}: {}", label.span, label.message)
        }
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        self.styled(Style::Severity(diagnostic.severity), &diagnostic.severity.to_string())?;
        self.styled(Style::Bold, &format!("[{}]", diagnostic.code))?;
        writeln!(self.writer, ": {}", diagnostic.message)?;
        for label in &diagnostic.labels {
            self.write_label(label)?;
        }
        for note in &diagnostic.notes {
            self.writer.write_all(b"  = ")?;
            self.styled(Style::Bold, "note")?;
            writeln!(self.writer, ": {note}")?;
        }
        Ok(())
    }
}

impl TerminalEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    /// Write errors are ignored; there is nowhere left to report them.
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let _ = self.write_diagnostic(diagnostic);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Render diagnostics as plain text.
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_all(diagnostics);
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}
