//! Selector subsumption (`is_superselector`) and unification (`unify`)
//! (spec §4.2), the two structural queries the extend engine builds on.

use sass_ast::{Combinator, CompoundSelector, ComplexSelector, SelectorList, SimpleSelector};

/// True if `a` matches a superset of what `b` matches: every element
/// `b` could match, `a` also matches. This is the relation `@extend`
/// uses to detect "this selector already covers the target, no new
/// selector is needed" and to de-duplicate the extend engine's woven
/// output.
///
/// Complex-selector superselectivity is approximated here, matching the
/// well-known algorithm's common case: `a`'s compounds must appear as an
/// order-preserving subsequence of `b`'s compounds, with each
/// corresponding pair compound-superselector, and every combinator in
/// `a` reconcilable against the combinator (or combinator-with-skipped-
/// descendants) joining the matched pair in `b`.
#[must_use]
pub fn is_superselector_list(a: &SelectorList, b: &SelectorList) -> bool {
    b.complexes.iter().all(|bc| a.complexes.iter().any(|ac| is_superselector_complex(ac, bc)))
}

/// Complex-selector version of [`is_superselector_list`].
#[must_use]
pub fn is_superselector_complex(a: &ComplexSelector, b: &ComplexSelector) -> bool {
    if a.components.is_empty() {
        return true;
    }
    if a.components.len() > b.components.len() {
        return false;
    }
    match_subsequence(&a.components, &a.combinators, &b.components, &b.combinators)
}

fn match_subsequence(
    a_components: &[CompoundSelector],
    a_combinators: &[Combinator],
    b_components: &[CompoundSelector],
    b_combinators: &[Combinator],
) -> bool {
    // Anchor the last compound of `a` to the last compound of `b`: in
    // selector matching the rightmost compound (the "subject") must
    // always correspond exactly, everything to its left may skip over
    // extra ancestors in `b` when `a`'s combinator is descendant.
    let a_last = a_components.len() - 1;
    let b_last = b_components.len() - 1;
    if !is_superselector_compound(&a_components[a_last], &b_components[b_last]) {
        return false;
    }
    let mut ai = a_last;
    let mut bi = b_last;
    while ai > 0 {
        let combinator = a_combinators[ai - 1];
        if bi == 0 {
            return false;
        }
        match combinator {
            Combinator::Descendant => {
                // Walk left through `b` until we find a compound-
                // superselector match, requiring only that intervening
                // combinators are themselves descendant-compatible.
                let mut found = false;
                let mut j = bi;
                while j > 0 {
                    j -= 1;
                    if is_superselector_compound(&a_components[ai - 1], &b_components[j]) {
                        found = true;
                        bi = j;
                        break;
                    }
                }
                if !found {
                    return false;
                }
            }
            _ => {
                if b_combinators.get(bi - 1) != Some(&combinator) {
                    return false;
                }
                if !is_superselector_compound(&a_components[ai - 1], &b_components[bi - 1]) {
                    return false;
                }
                bi -= 1;
            }
        }
        ai -= 1;
    }
    true
}

/// True if every simple selector in `a` also appears in `b` (`a`'s
/// constraints are a subset of `b`'s, so anything matching `b` also
/// matches `a`).
#[must_use]
pub fn is_superselector_compound(a: &CompoundSelector, b: &CompoundSelector) -> bool {
    a.simples.iter().all(|simple| b.simples.contains(simple))
}

/// Merge two compound selectors into one matching only elements that
/// match both, or `None` if they're structurally incompatible (two
/// distinct type selectors, e.g. `unify(div, span)`, or two distinct
/// IDs).
#[must_use]
pub fn unify_compound(a: &CompoundSelector, b: &CompoundSelector) -> Option<CompoundSelector> {
    let a_type = a.simples.iter().find_map(type_name);
    let b_type = b.simples.iter().find_map(type_name);
    if let (Some(at), Some(bt)) = (&a_type, &b_type) {
        if at != bt {
            return None;
        }
    }
    let a_id = a.simples.iter().find_map(id_name);
    let b_id = b.simples.iter().find_map(id_name);
    if let (Some(ai), Some(bi)) = (&a_id, &b_id) {
        if ai != bi {
            return None;
        }
    }

    let mut merged = Vec::new();
    if a_type.is_some() {
        merged.extend(a.simples.iter().filter(|s| matches!(s, SimpleSelector::Type(_))).cloned());
    } else if b_type.is_some() {
        merged.extend(b.simples.iter().filter(|s| matches!(s, SimpleSelector::Type(_))).cloned());
    }
    for simple in a.simples.iter().chain(b.simples.iter()) {
        if matches!(simple, SimpleSelector::Type(_)) {
            continue;
        }
        if !merged.contains(simple) {
            merged.push(simple.clone());
        }
    }
    Some(CompoundSelector::new(merged))
}

fn type_name(simple: &SimpleSelector) -> Option<&str> {
    match simple {
        SimpleSelector::Type(name) => Some(name.as_str()),
        _ => None,
    }
}

fn id_name(simple: &SimpleSelector) -> Option<&str> {
    match simple {
        SimpleSelector::Id(name) => Some(name.as_str()),
        _ => None,
    }
}

/// Unify two complex selectors by concatenating their components (used
/// when weaving an extended selector onto its context) and attempting
/// to unify the adjoining compounds if `unify_last` is set; returns
/// `None` if unification fails.
#[must_use]
pub fn concat_complex(a: &ComplexSelector, b: &ComplexSelector) -> ComplexSelector {
    let mut components = a.components.clone();
    components.extend(b.components.iter().cloned());
    let mut combinators = a.combinators.clone();
    combinators.push(Combinator::Descendant);
    combinators.extend(b.combinators.iter().copied());
    ComplexSelector::new(components, combinators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_ast::PseudoArgument;

    fn class(name: &str) -> SimpleSelector {
        SimpleSelector::Class(name.to_string())
    }

    #[test]
    fn compound_superselector_checks_subset() {
        let a = CompoundSelector::new(vec![class("a")]);
        let b = CompoundSelector::new(vec![class("a"), class("b")]);
        assert!(is_superselector_compound(&a, &b));
        assert!(!is_superselector_compound(&b, &a));
    }

    #[test]
    fn complex_superselector_allows_extra_ancestors() {
        let a = ComplexSelector::single(CompoundSelector::new(vec![class("x")]));
        let b = ComplexSelector::new(
            vec![
                CompoundSelector::new(vec![class("wrapper")]),
                CompoundSelector::new(vec![class("x")]),
            ],
            vec![Combinator::Descendant],
        );
        assert!(is_superselector_complex(&a, &b));
    }

    #[test]
    fn unify_rejects_conflicting_type_selectors() {
        let a = CompoundSelector::new(vec![SimpleSelector::Type("div".into())]);
        let b = CompoundSelector::new(vec![SimpleSelector::Type("span".into())]);
        assert!(unify_compound(&a, &b).is_none());
    }

    #[test]
    fn unify_merges_classes_and_ids() {
        let a = CompoundSelector::new(vec![class("a")]);
        let b = CompoundSelector::new(vec![class("b"), SimpleSelector::Id("x".into())]);
        let merged = unify_compound(&a, &b).unwrap();
        assert!(merged.simples.contains(&class("a")));
        assert!(merged.simples.contains(&class("b")));
        assert!(merged.simples.contains(&SimpleSelector::Id("x".into())));
    }

    #[test]
    fn unify_with_pseudo_is_unaffected() {
        let a = CompoundSelector::new(vec![SimpleSelector::PseudoClass { name: "hover".into(), argument: PseudoArgument::None }]);
        let b = CompoundSelector::new(vec![class("a")]);
        assert!(unify_compound(&a, &b).is_some());
    }
}
