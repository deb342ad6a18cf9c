//! Rendering a [`SelectorList`] back to CSS text (spec §3.5, §4.5).
//!
//! Also used outside the serializer proper: `&` (spec §4.4's
//! `Expression::ParentSelector`) evaluates to the string form of the
//! selector currently in scope, produced by the same function that
//! renders the final CSS tree.

use sass_ast::{Combinator, CompoundSelector, ComplexSelector, PseudoArgument, SelectorList, SimpleSelector};

/// Render a full selector list as CSS text, e.g. `.a, .b > .c`.
///
/// Complex selectors that still contain an unmatched placeholder (spec
/// §4.2 point 5: a placeholder that nothing ever `@extend`ed) are
/// dropped rather than emitted, since `%foo` is not valid CSS syntax.
/// If every complex selector is dropped this way, the result is the
/// empty string, which callers treat as "omit this rule entirely".
#[must_use]
pub fn selector_to_css(list: &SelectorList) -> String {
    list.complexes
        .iter()
        .filter(|c| !c.has_placeholder())
        .map(complex_to_css)
        .collect::<Vec<_>>()
        .join(", ")
}

fn complex_to_css(complex: &ComplexSelector) -> String {
    let mut out = String::new();
    for (i, compound) in complex.components.iter().enumerate() {
        out.push_str(&compound_to_css(compound));
        if let Some(combinator) = complex.combinators.get(i) {
            out.push_str(&combinator_str(*combinator));
        }
    }
    out
}

fn combinator_str(combinator: Combinator) -> String {
    combinator.to_string()
}

fn compound_to_css(compound: &CompoundSelector) -> String {
    compound.simples.iter().map(simple_to_css).collect()
}

fn simple_to_css(simple: &SimpleSelector) -> String {
    match simple {
        SimpleSelector::Type(name) => name.clone(),
        SimpleSelector::Universal => "*".to_string(),
        SimpleSelector::Class(name) => format!(".{name}"),
        SimpleSelector::Id(name) => format!("#{name}"),
        SimpleSelector::Attribute(raw) => format!("[{raw}]"),
        SimpleSelector::PseudoClass { name, argument } => format!(":{name}{}", pseudo_argument_to_css(argument)),
        SimpleSelector::PseudoElement { name, argument } => format!("::{name}{}", pseudo_argument_to_css(argument)),
        SimpleSelector::Placeholder(name) => format!("%{name}"),
        SimpleSelector::Parent => "&".to_string(),
    }
}

fn pseudo_argument_to_css(argument: &PseudoArgument) -> String {
    match argument {
        PseudoArgument::None => String::new(),
        PseudoArgument::Plain(text) => format!("({text})"),
        PseudoArgument::Selector(list) => format!("({})", selector_to_css(list)),
        PseudoArgument::PlainAndSelector(prefix, list) => format!("({prefix} of {})", selector_to_css(list)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_class_and_combinator() {
        let a = ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Class("a".into())]));
        let b = ComplexSelector::new(
            vec![
                CompoundSelector::new(vec![SimpleSelector::Class("b".into())]),
                CompoundSelector::new(vec![SimpleSelector::Class("c".into())]),
            ],
            vec![Combinator::Child],
        );
        let list = SelectorList::new(vec![a, b]);
        assert_eq!(selector_to_css(&list), ".a, .b > .c");
    }

    #[test]
    fn unextended_placeholder_complex_is_omitted() {
        let placeholder = ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Placeholder("btn".into())]));
        let visible = ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Class("a".into())]));
        let list = SelectorList::new(vec![placeholder, visible]);
        assert_eq!(selector_to_css(&list), ".a");
    }

    #[test]
    fn pseudo_class_with_nested_selector_argument() {
        let inner = SelectorList::new(vec![ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Class(
            "a".into(),
        )]))]);
        let not_a = SimpleSelector::PseudoClass { name: "not".to_string(), argument: PseudoArgument::Selector(inner) };
        assert_eq!(simple_to_css(&not_a), ":not(.a)");
    }
}
