//! Caller-supplied diagnostic sinks
//!
//! Extraction never aborts on recoverable oddities in the source (syntax
//! errors in unrelated code, a class defined twice, a property shadowed by a
//! typed attribute). Those are reported as structured [`Diagnostic`] values
//! to whatever [`DiagnosticSink`] the caller passes in. The library installs
//! no global logger; [`TracingSink`] is the bridge for callers that want the
//! warnings in their `tracing` output.

use std::fmt;
use std::sync::Mutex;

use tracing::warn;

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The parser recovered from a syntax error in the source file
    SyntaxError,
    /// The requested class is defined more than once; the last definition wins
    DuplicateClass,
    /// A property declaration was discarded in favour of a typed attribute
    PropertyShadowed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::SyntaxError => write!(f, "syntax-error"),
            DiagnosticKind::DuplicateClass => write!(f, "duplicate-class"),
            DiagnosticKind::PropertyShadowed => write!(f, "property-shadowed"),
        }
    }
}

/// A structured warning raised while extracting one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub class_name: String,
    pub message: String,
    /// 1-based source line, when the warning points at one
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        class_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            class_name: class_name.into(),
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "[{}] {} (line {}): {}",
                self.kind, self.class_name, line, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.kind, self.class_name, self.message),
        }
    }
}

/// Receiver for structured extraction warnings
///
/// Sinks take `&self` and must be `Send + Sync` so that several classes can
/// be extracted concurrently against one sink.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Discards every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(
            kind = %diagnostic.kind,
            class = %diagnostic.class_name,
            line = diagnostic.line,
            "{}",
            diagnostic.message
        );
    }
}

/// Keeps diagnostics in memory for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics().iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::new(
            DiagnosticKind::DuplicateClass,
            "Core",
            "defined twice",
        ));
        sink.report(
            Diagnostic::new(DiagnosticKind::SyntaxError, "Core", "unexpected token").at_line(4),
        );

        let seen = sink.diagnostics();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].kind, DiagnosticKind::DuplicateClass);
        assert_eq!(seen[1].line, Some(4));
        assert_eq!(sink.count(DiagnosticKind::SyntaxError), 1);
        assert_eq!(sink.count(DiagnosticKind::PropertyShadowed), 0);
    }

    #[test]
    fn test_null_sink_discards() {
        let sink = NullSink;
        sink.report(Diagnostic::new(DiagnosticKind::SyntaxError, "A", "ignored"));
    }

    #[test]
    fn test_diagnostic_display() {
        let plain = Diagnostic::new(DiagnosticKind::PropertyShadowed, "Node", "kept `x: int`");
        assert_eq!(plain.to_string(), "[property-shadowed] Node: kept `x: int`");

        let located = plain.clone().at_line(12);
        assert!(located.to_string().contains("(line 12)"));
    }
}
