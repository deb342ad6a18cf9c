//! The evaluator-facing error model.
//!
//! [spec §4.6](../../../spec.md) enumerates the error kinds the evaluator
//! raises; [spec §7](../../../spec.md) adds the parser/importer/usage
//! kinds and the propagation policy. Every error carries a primary span,
//! optional secondary spans with labels, and a reconstructed call stack.

use crate::span::{SecondarySpan, Span};
use std::fmt;

/// One frame of a Sass call stack: a mixin or function invocation that
/// was active when the error was raised.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StackFrame {
    /// Name of the mixin or function being invoked (namespaced if the
    /// call went through a module reference).
    pub name: String,
    /// Span of the call site.
    pub span: Span,
}

/// The taxonomy of errors the compiler can raise.
///
/// Kinds map 1:1 onto spec §4.6's list, plus the three additions named
/// in §7 (`SyntaxError`, `ImportNotFound`, `Usage`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// A value was used where its type is incompatible with the operation.
    #[error("{0}")]
    TypeError(String),
    /// A unit arithmetic operation left incompatible numerator/denominator units.
    #[error("{0}")]
    IncompatibleUnits(String),
    /// An argument's value was the wrong type or out of range for its parameter.
    #[error("{0}")]
    InvalidArgument(String),
    /// A required argument was not supplied and has no default.
    #[error("missing argument {0}")]
    MissingArgument(String),
    /// The same parameter was bound both positionally and by name.
    #[error("argument {0} was passed both by position and by name")]
    DuplicateArgument(String),
    /// A variable was referenced that is not in scope.
    #[error("undefined variable {0}")]
    UndefinedVariable(String),
    /// A function was called that is not defined or imported.
    #[error("undefined function {0}")]
    UndefinedFunction(String),
    /// A mixin was included that is not defined or imported.
    #[error("undefined mixin {0}")]
    UndefinedMixin(String),
    /// `&` was used in a position the nesting algorithm cannot rewrite.
    #[error("{0}")]
    InvalidNesting(String),
    /// Selector text failed to parse.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    /// `@extend` produced unbounded selector growth.
    #[error("extend produced more than {0} selectors for one target; likely a cycle")]
    ExtendCycle(usize),
    /// `@use`/`@forward`/`@import` formed a cycle.
    #[error("import cycle detected: {0}")]
    ImportCycle(String),
    /// The importer could not resolve a requested URL.
    #[error("could not find stylesheet to import: {0}")]
    ImportNotFound(String),
    /// Division by zero outside a `calc()` context, where it would be
    /// well-defined as an infinity/NaN.
    #[error("division by zero")]
    DivisionByZero,
    /// A function body completed without hitting `@return`.
    #[error("function finished without @return")]
    MissingReturn,
    /// `@content` was used outside of a mixin body.
    #[error("@content is only allowed inside a mixin")]
    ContentOutsideMixin,
    /// `@at-root` was given an unsatisfiable or malformed query.
    #[error("{0}")]
    AtRootInvalid(String),
    /// `@error` was explicitly invoked.
    #[error("{0}")]
    UserError(String),
    /// The Sass source text itself could not be parsed (parser is an
    /// external collaborator; this variant exists so the core's error
    /// type can represent failures surfaced through it).
    #[error("syntax error: {0}")]
    SyntaxError(String),
    /// CLI/API usage error (bad flag combination, bad option value).
    #[error("usage error: {0}")]
    Usage(String),
}

/// A single compiler error or warning-turned-error, with full diagnostic
/// context for rendering a highlighted snippet plus call stack.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct SassError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// The span the error is primarily about (e.g. the `$c` reference
    /// for `UndefinedVariable`).
    pub primary_span: Span,
    /// Additional spans with labels, e.g. "argument declared here".
    pub secondary_spans: Vec<SecondarySpan>,
    /// The mixin/function call stack active when the error was raised,
    /// innermost frame first.
    pub call_stack: Vec<StackFrame>,
}

impl SassError {
    /// Build an error with no secondary spans or call stack; callers
    /// typically attach those with [`Self::with_secondary`] and
    /// [`Self::with_stack`] as the error propagates outward.
    #[must_use]
    pub fn new(kind: ErrorKind, primary_span: Span) -> Self {
        Self { kind, primary_span, secondary_spans: Vec::new(), call_stack: Vec::new() }
    }

    /// Attach a secondary span with a label.
    #[must_use]
    pub fn with_secondary(mut self, label: impl Into<String>, span: Span) -> Self {
        self.secondary_spans.push(SecondarySpan { label: label.into(), span });
        self
    }

    /// Push a call-stack frame as the error unwinds through an invocation.
    pub fn push_frame(&mut self, name: impl Into<String>, span: Span) {
        self.call_stack.push(StackFrame { name: name.into(), span });
    }

    /// Render the highlighted-span-plus-call-stack form described in
    /// spec §7 ("errors render as a highlighted span snippet plus the
    /// call stack").
    #[must_use]
    pub fn render(&self, source_line_text: Option<&str>) -> String {
        let mut out = format!("Error: {}\n  {}", self.kind, self.primary_span);
        if let Some(line) = source_line_text {
            out.push_str("\n  |\n  | ");
            out.push_str(line);
        }
        for frame in &self.call_stack {
            out.push_str(&format!("\n  in {} ({})", frame.name, frame.span));
        }
        for secondary in &self.secondary_spans {
            out.push_str(&format!("\n  {}: {}", secondary.label, secondary.span));
        }
        out
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.span)
    }
}

/// Convenience alias used throughout the compiler.
pub type SassResult<T> = Result<T, SassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_kind_and_span() {
        let err = SassError::new(ErrorKind::UndefinedVariable("$c".into()), Span::synthetic());
        let rendered = err.render(None);
        assert!(rendered.contains("undefined variable $c"));
    }

    #[test]
    fn push_frame_appends_innermost_first() {
        let mut err = SassError::new(ErrorKind::DivisionByZero, Span::synthetic());
        err.push_frame("foo", Span::synthetic());
        err.push_frame("bar", Span::synthetic());
        assert_eq!(err.call_stack.len(), 2);
        assert_eq!(err.call_stack[0].name, "foo");
    }
}
