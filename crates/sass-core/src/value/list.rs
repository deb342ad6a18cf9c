//! Sass lists (spec §3.1, §4.1): an ordered sequence of values with a
//! separator and a bracketed flag, both significant to equality and
//! serialization.

use super::Value;
use strum_macros::Display;

/// The separator a list was written or produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ListSeparator {
    /// `a b c`.
    #[strum(serialize = " ")]
    Space,
    /// `a, b, c`.
    #[strum(serialize = ", ")]
    Comma,
    /// `a / b / c`, only reachable from `list.slash-separator`-produced
    /// internal lists and legacy `/`-as-separator contexts.
    #[strum(serialize = " / ")]
    Slash,
    /// A single-element list has no real separator yet; it behaves as
    /// whichever separator a later concatenation imposes.
    #[strum(serialize = " ")]
    Undecided,
}

/// A Sass list value.
#[derive(Debug, Clone, PartialEq)]
pub struct SassList {
    contents: Vec<Value>,
    separator: ListSeparator,
    brackets: bool,
}

impl SassList {
    /// Build a list from contents, separator, and bracket flag.
    #[must_use]
    pub fn new(contents: Vec<Value>, separator: ListSeparator, brackets: bool) -> Self {
        Self { contents, separator, brackets }
    }

    /// The empty, unbracketed list, `()`.
    #[must_use]
    pub fn empty() -> Self {
        Self { contents: Vec::new(), separator: ListSeparator::Undecided, brackets: false }
    }

    /// The list elements.
    #[must_use]
    pub fn contents(&self) -> &[Value] {
        &self.contents
    }

    /// The separator this list was built or declared with.
    #[must_use]
    pub fn separator(&self) -> ListSeparator {
        self.separator
    }

    /// True if this list is written with `[...]` brackets.
    #[must_use]
    pub fn has_brackets(&self) -> bool {
        self.brackets
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// True if this list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// 1-indexed Sass-style element access, supporting negative indices
    /// counting from the end (spec §4.1 list functions).
    #[must_use]
    pub fn nth(&self, index: i64) -> Option<&Value> {
        let len = self.contents.len() as i64;
        if index == 0 || len == 0 {
            return None;
        }
        let zero_based = if index > 0 { index - 1 } else { len + index };
        if zero_based < 0 || zero_based >= len {
            return None;
        }
        self.contents.get(zero_based as usize)
    }

    /// Fuzzy equality: same separator significance, same brackets, same
    /// elements in order. Single-element lists compare equal regardless
    /// of separator (Sass treats a 1-item list's separator as cosmetic).
    #[must_use]
    pub fn fuzzy_eq(&self, other: &Self) -> bool {
        if self.brackets != other.brackets || self.contents.len() != other.contents.len() {
            return false;
        }
        if self.contents.len() > 1 && self.separator != other.separator {
            return false;
        }
        self.contents.iter().zip(other.contents.iter()).all(|(a, b)| a.fuzzy_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::number::Number;

    fn num(n: f64) -> Value {
        Value::Number(Number::unitless(n))
    }

    #[test]
    fn nth_supports_negative_indices() {
        let list = SassList::new(vec![num(1.0), num(2.0), num(3.0)], ListSeparator::Comma, false);
        assert_eq!(list.nth(-1), Some(&num(3.0)));
        assert_eq!(list.nth(1), Some(&num(1.0)));
        assert_eq!(list.nth(0), None);
    }

    #[test]
    fn single_element_lists_ignore_separator_for_equality() {
        let a = SassList::new(vec![num(1.0)], ListSeparator::Comma, false);
        let b = SassList::new(vec![num(1.0)], ListSeparator::Space, false);
        assert!(a.fuzzy_eq(&b));
    }

    #[test]
    fn bracket_mismatch_breaks_equality() {
        let a = SassList::new(vec![num(1.0)], ListSeparator::Space, true);
        let b = SassList::new(vec![num(1.0)], ListSeparator::Space, false);
        assert!(!a.fuzzy_eq(&b));
    }
}
