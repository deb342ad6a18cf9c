//! Sass strings: quoted or unquoted, tracked separately because quoting
//! affects both equality-adjacent operations (interpolation, `+`) and
//! serialization (spec §3.1, §4.1).

use std::fmt;

/// A Sass string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SassString {
    text: String,
    quoted: bool,
}

impl SassString {
    /// A quoted string, e.g. the value of `"hello"`.
    #[must_use]
    pub fn quoted(text: impl Into<String>) -> Self {
        Self { text: text.into(), quoted: true }
    }

    /// An unquoted string, e.g. the value of a bare identifier like `bold`.
    #[must_use]
    pub fn unquoted(text: impl Into<String>) -> Self {
        Self { text: text.into(), quoted: false }
    }

    /// The string's text content, without quotes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True if this string was written with quotes.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Length in Unicode code points (`string.length`, spec §4.1's string
    /// functions operate on code points, not bytes).
    #[must_use]
    pub fn code_point_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Concatenation for the `+` operator: quoted if either operand was
    /// quoted (Sass's rule for string concatenation).
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        Self { text: format!("{}{}", self.text, other.text), quoted: self.quoted || other.quoted }
    }

    /// Render this string exactly as it should appear in CSS output:
    /// quoted strings get escaped and wrapped in `"`, unquoted strings
    /// are emitted verbatim.
    #[must_use]
    pub fn to_css(&self) -> String {
        if !self.quoted {
            return self.text.clone();
        }
        let mut out = String::with_capacity(self.text.len() + 2);
        out.push('"');
        for ch in self.text.chars() {
            match ch {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\a "),
                _ => out.push(ch),
            }
        }
        out.push('"');
        out
    }
}

impl fmt::Display for SassString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_is_quoted_if_either_side_is() {
        let a = SassString::unquoted("foo");
        let b = SassString::quoted("bar");
        assert!(a.concat(&b).is_quoted());
    }

    #[test]
    fn to_css_escapes_quotes_and_backslashes() {
        let s = SassString::quoted("a\"b\\c");
        assert_eq!(s.to_css(), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn unquoted_passes_through_verbatim() {
        let s = SassString::unquoted("bold");
        assert_eq!(s.to_css(), "bold");
    }

    #[test]
    fn code_point_len_counts_unicode_scalars_not_bytes() {
        let s = SassString::quoted("caf\u{e9}");
        assert_eq!(s.code_point_len(), 4);
    }
}
