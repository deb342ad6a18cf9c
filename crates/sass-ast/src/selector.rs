//! The selector model (spec §3.5).
//!
//! These types are shared between the Sass AST (a style rule's selector
//! is parsed from interpolated text at evaluation time, spec §4.4's
//! nesting algorithm) and the plain-CSS tree (a style rule node owns a
//! [`SelectorList`] that the extend pass rewrites in place, spec §3.4).
//! The matching/unification/extend *algorithms* that operate on these
//! types live in `sass-core::selector`, since they need evaluator
//! context (error reporting, the extension context); this module is
//! just the data shape plus the structural queries (specificity,
//! placeholder detection) that need no such context.

use strum_macros::Display;

/// The four combinators selectors can use to relate compound selectors
/// per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, serde::Serialize, serde::Deserialize)]
pub enum Combinator {
    /// `A B` - B anywhere inside A.
    #[strum(serialize = " ")]
    Descendant,
    /// `A > B` - B a direct child of A.
    #[strum(serialize = " > ")]
    Child,
    /// `A + B` - B immediately following A.
    #[strum(serialize = " + ")]
    NextSibling,
    /// `A ~ B` - B following A among siblings.
    #[strum(serialize = " ~ ")]
    FollowingSibling,
}

/// Pseudo-class/pseudo-element argument forms. Most pseudo-classes take
/// no argument; functional ones take either a bare string (`:lang(en)`)
/// or a nested selector list (`:not(.a, .b)`, `:nth-child(2n+1 of .a)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PseudoArgument {
    /// No argument, e.g. `:hover`.
    None,
    /// A raw argument string that isn't itself selector syntax, e.g.
    /// `:lang(en)` or the `2n+1` part of `:nth-child(2n+1)`.
    Plain(String),
    /// A nested selector list, e.g. `:not(.a, .b)`, `:is(...)`,
    /// `:where(...)`, `:has(...)`, or the `of <selector>` part of
    /// `:nth-child(2n+1 of .a)` (stored alongside the `Plain` prefix in
    /// [`SimpleSelector::PseudoClass`]'s `argument` when both are present,
    /// by using `PlainAndSelector`).
    Selector(SelectorList),
    /// Combination of a raw prefix and a trailing selector list, for
    /// `:nth-child(An+B of <selector>)`.
    PlainAndSelector(String, SelectorList),
}

/// A single simple selector (spec §3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SimpleSelector {
    /// `div`, `span`, a bare type name.
    Type(String),
    /// `*`.
    Universal,
    /// `.foo`.
    Class(String),
    /// `#foo`.
    Id(String),
    /// `[attr]`, `[attr=val]`, etc. Stored as the raw bracketed text
    /// since attribute-selector matching happens outside the evaluator
    /// (plain CSS consumers match it against the DOM); the compiler only
    /// needs to preserve and compare it structurally.
    Attribute(String),
    /// `:hover`, `:nth-child(2n+1)`, `:not(.a)`, etc.
    PseudoClass {
        /// Name without the leading colon.
        name: String,
        /// Optional argument.
        argument: PseudoArgument,
    },
    /// `::before`, `::placeholder`, etc.
    PseudoElement {
        /// Name without the leading `::`.
        name: String,
        /// Optional argument (rare, e.g. `::slotted(.a)`).
        argument: PseudoArgument,
    },
    /// `%name` - never emitted unless extended (glossary "Placeholder").
    Placeholder(String),
    /// `&` - the parent-selector reference, only valid inside a style
    /// rule's own selector before nesting resolves it away.
    Parent,
}

impl SimpleSelector {
    /// True for `%foo` placeholder selectors.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// An ordered sequence of simple selectors with no combinators between
/// them, e.g. `a.b:hover` (spec §3.5, glossary "Compound selector").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct CompoundSelector {
    /// The simple selectors, in source order.
    pub simples: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Build from a list of simple selectors.
    #[must_use]
    pub fn new(simples: Vec<SimpleSelector>) -> Self {
        Self { simples }
    }

    /// True if any component is a placeholder.
    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.simples.iter().any(SimpleSelector::is_placeholder)
    }

    /// True if any component is `&`.
    #[must_use]
    pub fn has_parent_ref(&self) -> bool {
        self.simples.iter().any(|s| matches!(s, SimpleSelector::Parent))
    }

    /// The (id, class, element) specificity contribution of this compound
    /// alone, per spec §3.5.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for simple in &self.simples {
            match simple {
                SimpleSelector::Id(_) => spec.ids += 1,
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::PseudoClass { .. } => spec.classes += 1,
                SimpleSelector::Type(_) | SimpleSelector::PseudoElement { .. } => spec.elements += 1,
                SimpleSelector::Universal | SimpleSelector::Parent | SimpleSelector::Placeholder(_) => {}
            }
            if let SimpleSelector::PseudoClass { argument, .. } = simple {
                match argument {
                    PseudoArgument::Selector(list) | PseudoArgument::PlainAndSelector(_, list) => {
                        // `:is()`/`:not()`/`:has()` contribute the specificity
                        // of their most specific branch (Selectors 4 §16.1).
                        if let Some(max) = list.complexes.iter().map(ComplexSelector::specificity).max() {
                            spec.ids += max.ids;
                            spec.classes += max.classes;
                            spec.elements += max.elements;
                        }
                    }
                    PseudoArgument::None | PseudoArgument::Plain(_) => {}
                }
            }
        }
        spec
    }
}

/// The `(id, class, element)` specificity triple from spec §3.5/§8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct Specificity {
    /// Number of ID selectors.
    pub ids: u32,
    /// Number of class, attribute, and pseudo-class selectors.
    pub classes: u32,
    /// Number of type and pseudo-element selectors.
    pub elements: u32,
}

impl Specificity {
    /// Specificity as a `(u32, u32, u32)` tuple, per the §4.2 contract
    /// `specificity(selector) -> (u32,u32,u32)`.
    #[must_use]
    pub fn as_tuple(self) -> (u32, u32, u32) {
        (self.ids, self.classes, self.elements)
    }
}

/// A sequence of compound selectors joined by combinators, e.g.
/// `.a > .b .c` (spec §3.5, glossary "Complex selector").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct ComplexSelector {
    /// Alternating compound selectors and the combinator that follows
    /// each one, except the last. `components.len() == combinators.len() + 1`
    /// for any non-empty complex selector.
    pub components: Vec<CompoundSelector>,
    /// `combinators[i]` is the combinator between `components[i]` and
    /// `components[i + 1]`.
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Build a complex selector from its components and the combinators
    /// between them. Panics if the lengths are inconsistent (a
    /// programmer error in the caller, never a user-facing error).
    #[must_use]
    pub fn new(components: Vec<CompoundSelector>, combinators: Vec<Combinator>) -> Self {
        assert!(
            components.is_empty() && combinators.is_empty()
                || components.len() == combinators.len() + 1,
            "ComplexSelector components/combinators length mismatch"
        );
        Self { components, combinators }
    }

    /// A complex selector consisting of a single compound with no
    /// combinators, e.g. just `.a`.
    #[must_use]
    pub fn single(compound: CompoundSelector) -> Self {
        Self { components: vec![compound], combinators: Vec::new() }
    }

    /// Sum of the specificity of every compound in this complex selector.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let mut total = Specificity::default();
        for compound in &self.components {
            let s = compound.specificity();
            total.ids += s.ids;
            total.classes += s.classes;
            total.elements += s.elements;
        }
        total
    }

    /// True if any compound contains a placeholder.
    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.components.iter().any(CompoundSelector::has_placeholder)
    }

    /// True if any compound contains `&`.
    #[must_use]
    pub fn has_parent_ref(&self) -> bool {
        self.components.iter().any(CompoundSelector::has_parent_ref)
    }
}

/// A comma-separated list of complex selectors, e.g. `.a, .b > .c`
/// (spec §3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct SelectorList {
    /// The complex selectors, in source order. Order matters for
    /// deterministic serialization but a `SelectorList` is a set for
    /// matching purposes (duplicates may be collapsed by callers).
    pub complexes: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Build from a list of complex selectors.
    #[must_use]
    pub fn new(complexes: Vec<ComplexSelector>) -> Self {
        Self { complexes }
    }

    /// The selector list matching nothing (e.g. the result of extending
    /// to an empty set, or a parse of `""`).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if every complex selector in this list contains only
    /// placeholders with no extension target, meaning the whole rule is
    /// dropped at serialization (spec §4.2 point 5).
    #[must_use]
    pub fn is_all_placeholders(&self) -> bool {
        !self.complexes.is_empty() && self.complexes.iter().all(ComplexSelector::has_placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> SimpleSelector {
        SimpleSelector::Class(name.to_string())
    }

    #[test]
    fn specificity_counts_ids_classes_elements() {
        let compound = CompoundSelector::new(vec![
            SimpleSelector::Id("main".into()),
            class("btn"),
            SimpleSelector::Type("a".into()),
        ]);
        assert_eq!(compound.specificity().as_tuple(), (1, 1, 1));
    }

    #[test]
    fn is_placeholder_detected() {
        let compound = CompoundSelector::new(vec![SimpleSelector::Placeholder("btn".into())]);
        assert!(compound.has_placeholder());
    }

    #[test]
    fn complex_selector_sums_compound_specificity() {
        let a = CompoundSelector::new(vec![class("a")]);
        let b = CompoundSelector::new(vec![class("b"), class("c")]);
        let complex = ComplexSelector::new(vec![a, b], vec![Combinator::Descendant]);
        assert_eq!(complex.specificity().as_tuple(), (0, 3, 0));
    }

    #[test]
    fn all_placeholder_list_detected() {
        let placeholder = ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Placeholder(
            "btn".into(),
        )]));
        let list = SelectorList::new(vec![placeholder]);
        assert!(list.is_all_placeholders());
    }
}
