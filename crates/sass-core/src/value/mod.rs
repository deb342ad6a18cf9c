//! The Sass value system (spec §3.1, §4.1): every expression evaluates
//! to one of these variants.

pub mod calculation;
pub mod color;
pub mod list;
pub mod map;
pub mod number;
pub mod string;

use std::fmt;
use std::rc::Rc;

pub use calculation::{CalcOperand, Calculation};
pub use color::{Channel, Color, ColorSpace};
pub use list::{ListSeparator, SassList};
pub use map::SassMap;
pub use number::{Number, UnitError};
use sass_ast::{FunctionDecl, MixinDecl};
pub use string::SassString;

use crate::env::Environment;

/// A first-class reference to a user-defined function, closing over the
/// environment it was declared in (spec §3.1 "Function reference",
/// needed so `meta.get-function`/`call` can invoke it later from a
/// different lexical scope).
#[derive(Clone)]
pub struct FunctionRef {
    /// The function's declared name, used for error messages and
    /// `meta.function-name`? (spec exposes only by indirection; kept for
    /// diagnostics).
    pub name: Rc<str>,
    /// The declaration AST node.
    pub declaration: Rc<FunctionDecl>,
    /// The environment the function closes over.
    pub closure: Rc<Environment>,
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef").field("name", &self.name).finish_non_exhaustive()
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

/// A first-class reference to a user-defined mixin, mirroring
/// [`FunctionRef`] (spec §3.1 "Mixin reference").
#[derive(Clone)]
pub struct MixinRef {
    /// The mixin's declared name.
    pub name: Rc<str>,
    /// The declaration AST node.
    pub declaration: Rc<MixinDecl>,
    /// The environment the mixin closes over.
    pub closure: Rc<Environment>,
}

impl fmt::Debug for MixinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixinRef").field("name", &self.name).finish_non_exhaustive()
    }
}

impl PartialEq for MixinRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

/// A resolved argument list value (spec §3.1 "Argument list"): the
/// result of a `...` rest parameter, which behaves as a list but also
/// remembers any keyword arguments that weren't consumed positionally
/// (`meta.keywords` reads these back out).
#[derive(Debug, Clone, PartialEq)]
pub struct ArgList {
    /// Positional arguments, as an ordinary list.
    pub positional: SassList,
    /// Keyword arguments not consumed positionally, in call order.
    pub keywords: indexmap::IndexMap<String, Value>,
}

/// Any Sass value (spec §3.1).
#[derive(Debug, Clone)]
pub enum Value {
    /// `null`.
    Null,
    /// `true`/`false`.
    Boolean(bool),
    /// A number, with units.
    Number(Number),
    /// A color in any supported space.
    Color(Color),
    /// A quoted or unquoted string.
    String(SassString),
    /// An ordered, separated, optionally-bracketed list.
    List(Box<SassList>),
    /// An insertion-ordered map.
    Map(Box<SassMap>),
    /// An unevaluated `calc()`/`min()`/`max()`/`clamp()` tree.
    Calculation(Box<Calculation>),
    /// A first-class function reference.
    Function(FunctionRef),
    /// A first-class mixin reference.
    Mixin(MixinRef),
    /// An argument list produced by a `...` rest parameter.
    ArgList(Box<ArgList>),
}

impl Value {
    /// Sass truthiness: everything except `null` and `false` is truthy
    /// (spec §4.1, §4.4 `@if`/`@while`/ternary contexts).
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Boolean(false))
    }

    /// The type name as reported by `meta.type-of` (spec §4.1).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "bool",
            Self::Number(_) => "number",
            Self::Color(_) => "color",
            Self::String(_) => "string",
            Self::List(_) | Self::ArgList(_) => "list",
            Self::Map(_) => "map",
            Self::Calculation(_) => "calculation",
            Self::Function(_) => "function",
            Self::Mixin(_) => "mixin",
        }
    }

    /// Treat any value as a single-element list (spec §4.1: "every
    /// value is also a list of one element" except maps, which act as a
    /// list of 2-element `[key, value]` lists).
    #[must_use]
    pub fn as_list_contents(&self) -> Vec<Value> {
        match self {
            Self::List(list) => list.contents().to_vec(),
            Self::ArgList(args) => args.positional.contents().to_vec(),
            Self::Map(map) => map
                .iter()
                .map(|(k, v)| Value::List(Box::new(SassList::new(vec![k.clone(), v.clone()], ListSeparator::Space, false))))
                .collect(),
            other => vec![other.clone()],
        }
    }

    /// The separator this value would report from `list.separator`: a
    /// non-list scalar (or 1-element/empty list) reports `comma` unless
    /// it came from a space-separated literal; lists report their own.
    #[must_use]
    pub fn list_separator(&self) -> ListSeparator {
        match self {
            Self::List(list) => list.separator(),
            Self::Map(map) if !map.is_empty() => ListSeparator::Comma,
            _ => ListSeparator::Undecided,
        }
    }

    /// Structural, fuzzy equality (spec §4.1's `equals` operation): the
    /// relation `==` compiles to.
    #[must_use]
    pub fn fuzzy_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.fuzzy_eq(b),
            (Self::Color(a), Self::Color(b)) => a.fuzzy_eq(b),
            (Self::String(a), Self::String(b)) => a.as_str() == b.as_str(),
            (Self::List(a), Self::List(b)) => a.fuzzy_eq(b),
            (Self::Map(a), Self::Map(b)) => a.fuzzy_eq(b),
            (Self::Calculation(a), Self::Calculation(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a == b,
            (Self::Mixin(a), Self::Mixin(b)) => a == b,
            // A bare scalar and a 1-element list of that scalar are NOT
            // equal in Sass (only list-vs-list coercion applies to
            // iteration, not to `==`), so no cross-variant fallback here
            // beyond List/Map already handled above.
            _ => false,
        }
    }

    /// Render this value the way it would appear in CSS output, for
    /// contexts that accept any value textually (declaration values,
    /// interpolation). Containers that cannot appear in plain CSS
    /// (functions, mixins, argument lists with leftover keywords) are
    /// rendered as their Sass-debug form; the evaluator rejects them
    /// before this point in contexts where that would be invalid.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Color(c) => c.to_string(),
            Self::String(s) => s.to_css(),
            Self::List(list) => {
                let sep = list.separator().to_string();
                let inner = list.contents().iter().map(Value::to_css).collect::<Vec<_>>().join(&sep);
                if list.has_brackets() {
                    format!("[{inner}]")
                } else {
                    inner
                }
            }
            Self::Map(map) => {
                let inner = map.iter().map(|(k, v)| format!("{}: {}", k.to_css(), v.to_css())).collect::<Vec<_>>().join(", ");
                format!("({inner})")
            }
            Self::Calculation(calc) => calc.to_css(),
            Self::Function(f) => format!("get-function(\"{}\")", f.name),
            Self::Mixin(m) => format!("meta.get-mixin(\"{}\")", m.name),
            Self::ArgList(args) => {
                let inner = args.positional.contents().iter().map(Value::to_css).collect::<Vec<_>>().join(", ");
                inner
            }
        }
    }

    /// `a + b` (spec §4.1): numeric addition for numbers, concatenation
    /// for strings, list/string append for everything else via the
    /// CSS-text fallback the language defines for `+` on mismatched
    /// types.
    pub fn add(&self, other: &Self) -> Result<Self, UnitError> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Ok(Self::Number(a.add(b)?)),
            (Self::String(a), _) => Ok(Self::String(a.concat(&other.coerce_to_string()))),
            (_, Self::String(b)) if !matches!(self, Self::String(_)) => Ok(Self::String(self.coerce_to_string().concat(b))),
            _ => Ok(Self::String(SassString::unquoted(format!("{}{}", self.to_css(), other.to_css())))),
        }
    }

    fn coerce_to_string(&self) -> SassString {
        match self {
            Self::String(s) => s.clone(),
            other => SassString::unquoted(other.to_css()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.fuzzy_eq(other)
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    /// Hashes by the canonical CSS-ish rendering rather than the raw
    /// float bits, so fuzzy-equal numbers (and colors expressed in
    /// different but equivalent spaces) collide into the same bucket.
    /// This trades some hash quality for consistency with
    /// [`Value::fuzzy_eq`], which `indexmap`-backed [`SassMap`] keys
    /// require.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Null => "null".hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::Number(n) => {
                let rounded = (n.value() * 1e10).round() as i64;
                rounded.hash(state);
                n.numerator_units().hash(state);
                n.denominator_units().hash(state);
            }
            Self::Color(c) => {
                let srgb = c.to_space(ColorSpace::Srgb);
                for ch in srgb.channels() {
                    ((ch.value_or_zero() * 1e6).round() as i64).hash(state);
                }
            }
            Self::String(s) => s.as_str().hash(state),
            Self::List(list) => {
                for item in list.contents() {
                    item.hash(state);
                }
            }
            Self::Map(map) => map.len().hash(state),
            Self::Calculation(c) => c.to_css().hash(state),
            Self::Function(f) => Rc::as_ptr(&f.declaration).hash(state),
            Self::Mixin(m) => Rc::as_ptr(&m.declaration).hash(state),
            Self::ArgList(a) => a.positional.contents().len().hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_false_are_falsy() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(Number::unitless(0.0)).is_truthy());
    }

    #[test]
    fn string_plus_number_concatenates_as_unquoted_text() {
        let s = Value::String(SassString::quoted("width: "));
        let n = Value::Number(Number::with_unit(10.0, "px"));
        let sum = s.add(&n).unwrap();
        match sum {
            Value::String(result) => assert_eq!(result.as_str(), "width: 10px"),
            _ => panic!("expected string"),
        }
    }

    #[test]
    fn maps_count_as_lists_of_pairs() {
        let map = SassMap::from_pairs(vec![(
            Value::String(SassString::quoted("a")),
            Value::Number(Number::unitless(1.0)),
        )]);
        let contents = Value::Map(Box::new(map)).as_list_contents();
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn type_name_matches_meta_type_of_vocabulary() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Number(Number::unitless(1.0)).type_name(), "number");
    }
}
