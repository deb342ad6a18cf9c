//! Interpolation: a sequence of alternating plain-text and expression
//! segments that evaluates to a string (spec §3.3, glossary "Interpolation").
//!
//! "never two adjacent plain segments" is enforced at insertion time by
//! [`InterpolationBuilder`] rather than by the [`Interpolation`] type
//! itself, the same pattern the teacher uses for its DOM arena: the
//! invariant lives in the one place that mutates the structure.

use crate::sass_ast::Expression;
use sass_common::Span;

/// One piece of an [`Interpolation`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum InterpolationSegment {
    /// A run of literal source text, copied verbatim.
    Plain(String),
    /// A `#{...}` expression segment.
    Expr(Expression),
}

/// An interpolated string: plain text and `#{}` expressions in source
/// order. Used for selector text, custom property names/values,
/// at-rule values, string literals, and quasi-interpolated
/// plain-CSS function names.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Interpolation {
    segments: Vec<InterpolationSegment>,
    /// Span covering the whole interpolation, including delimiters.
    pub span: Span,
}

impl Interpolation {
    /// The segments, in source order. Guaranteed to never contain two
    /// adjacent `Plain` segments.
    #[must_use]
    pub fn segments(&self) -> &[InterpolationSegment] {
        &self.segments
    }

    /// True if this interpolation is just one plain-text segment (the
    /// common case for unquoted literal strings with no `#{}`).
    #[must_use]
    pub fn as_plain(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [InterpolationSegment::Plain(s)] => Some(s),
            [] => Some(""),
            _ => None,
        }
    }

    /// True if this interpolation contains no expression segments at all.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, InterpolationSegment::Plain(_)))
    }
}

/// Builder that enforces the "no two adjacent plain segments" invariant:
/// pushing two plain strings in a row merges them instead of creating a
/// new segment.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct InterpolationBuilder {
    segments: Vec<InterpolationSegment>,
}

impl InterpolationBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run of plain text, merging with a trailing plain segment
    /// if one exists.
    pub fn push_plain(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        if let Some(InterpolationSegment::Plain(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(InterpolationSegment::Plain(text));
        }
        self
    }

    /// Append an expression segment.
    pub fn push_expr(&mut self, expr: Expression) -> &mut Self {
        self.segments.push(InterpolationSegment::Expr(expr));
        self
    }

    /// Finish building, attaching the given overall span.
    #[must_use]
    pub fn build(self, span: Span) -> Interpolation {
        Interpolation { segments: self.segments, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_plain_segments_merge() {
        let mut b = InterpolationBuilder::new();
        b.push_plain("foo").push_plain("bar");
        let interp = b.build(Span::synthetic());
        assert_eq!(interp.segments().len(), 1);
        assert_eq!(interp.as_plain(), Some("foobar"));
    }

    #[test]
    fn empty_plain_push_is_noop() {
        let mut b = InterpolationBuilder::new();
        b.push_plain("foo").push_plain("").push_plain("bar");
        let interp = b.build(Span::synthetic());
        assert_eq!(interp.as_plain(), Some("foobar"));
    }
}
