//! Source locations and spans.
//!
//! Every node in the Sass syntax tree (§3.3 of the spec) and every
//! evaluator error (§4.6) carries one of these so that diagnostics and
//! source maps can point back at the original stylesheet text.

use std::fmt;
use std::rc::Rc;

/// A single point in a source file: 0-based line, 0-based column (both in
/// UTF-16 code units would match some tooling, but we track UTF-8 byte
/// offsets plus a decoded line/column for human-readable diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Location {
    /// Byte offset from the start of the source text.
    pub offset: usize,
    /// 0-based line number.
    pub line: u32,
    /// 0-based column number, counted in Unicode scalar values.
    pub column: u32,
}

impl Location {
    /// The start of any source file.
    pub const START: Self = Self { offset: 0, line: 0, column: 0 };
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open `[start, end)` range within one source file, identified by
/// its canonical URL (the URL the importer resolved it to; `None` for
/// synthetic spans produced by the evaluator itself, e.g. default
/// argument values with no literal source text).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Canonical URL of the source file this span was taken from.
    pub source_url: Option<Rc<str>>,
    /// Inclusive start location.
    pub start: Location,
    /// Exclusive end location.
    pub end: Location,
}

impl Span {
    /// Build a span from explicit endpoints.
    #[must_use]
    pub fn new(source_url: Option<Rc<str>>, start: Location, end: Location) -> Self {
        Self { source_url, start, end }
    }

    /// A zero-width span at the start of an unknown/synthetic source,
    /// used for values the evaluator manufactures rather than parses
    /// (e.g. the implicit `!default` fallback).
    #[must_use]
    pub fn synthetic() -> Self {
        Self { source_url: None, start: Location::START, end: Location::START }
    }

    /// Combine two spans into the smallest span that contains both,
    /// as long as they share a source. Used when an expression is built
    /// out of two sub-expressions with their own spans (e.g. `a + b`).
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if self.source_url != other.source_url {
            return self.clone();
        }
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        Self { source_url: self.source_url.clone(), start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.source_url.as_deref().unwrap_or("-");
        write!(f, "{url}:{}", self.start)
    }
}

/// A labeled span attached to an error as extra context, e.g.
/// "variable was declared here".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SecondarySpan {
    /// Human-readable label for this span (e.g. `"declaration was here"`).
    pub label: String,
    /// The span itself.
    pub span: Span,
}
