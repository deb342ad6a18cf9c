//! The `@extend` engine (spec §4.2): rewrites selectors so that rules
//! targeting `%placeholder`s or other selectors also match everything
//! that `@extend`s them, transitively.

use std::collections::HashMap;

use sass_ast::{Combinator, CompoundSelector, ComplexSelector, SelectorList, SimpleSelector};
use sass_common::{ErrorKind, SassError, SassResult, Span};

use super::matching::{concat_complex, is_superselector_list, unify_compound};

/// How strict an `@extend` is about requiring a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendMode {
    /// Plain `@extend .target`: an error if nothing in the stylesheet's
    /// selectors ever matches `.target`.
    Normal,
    /// `@extend .target !optional`: silently does nothing if `.target`
    /// is never matched.
    Optional,
}

/// One registered `@extend <target> [!optional]`: the selector doing
/// the extending, and how it was declared.
#[derive(Debug, Clone)]
pub struct ExtensionEntry {
    /// The selector list performing the extension (the style rule's own
    /// selector at the point of the `@extend`).
    pub extender: SelectorList,
    /// Optional/normal.
    pub mode: ExtendMode,
    /// Where the `@extend` was written, for the "never matched" error.
    pub span: Span,
}

/// All `@extend` rules collected for one compilation, keyed by the
/// single simple selector being targeted (spec's extend targets are
/// always a single simple selector: a class, id, placeholder, or
/// attribute/pseudo selector).
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    by_target: HashMap<SimpleSelector, Vec<ExtensionEntry>>,
    matched_targets: std::cell::RefCell<std::collections::HashSet<SimpleSelector>>,
}

impl Extensions {
    /// An empty extension set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extender @extend target [mode]`.
    pub fn add(&mut self, target: SimpleSelector, extender: SelectorList, mode: ExtendMode, span: Span) {
        self.by_target.entry(target).or_default().push(ExtensionEntry { extender, mode, span });
    }

    /// After extending the whole stylesheet, check that every
    /// non-optional extend matched something (spec §4.2 edge case:
    /// "`@extend` with no matching selector and no `!optional` is an
    /// error").
    pub fn check_all_matched(&self) -> SassResult<()> {
        for (target, entries) in &self.by_target {
            for entry in entries {
                if entry.mode == ExtendMode::Normal && !self.matched_targets.borrow().contains(target) {
                    return Err(SassError::new(
                        ErrorKind::InvalidSelector(format!("\"{target:?}\" was not found; no selector matches it")),
                        entry.span,
                    ));
                }
            }
        }
        Ok(())
    }
}

const MAX_EXTEND_SELECTORS: usize = 10_000;

/// Apply every registered extension to `list`, to a transitive fixpoint
/// (an extender's own selector may itself be extended by something
/// else). Returns an error if the selector count run away past
/// [`MAX_EXTEND_SELECTORS`], almost always indicating a self-referential
/// extend cycle.
pub fn extend(list: &SelectorList, extensions: &Extensions) -> SassResult<SelectorList> {
    let mut current = list.clone();
    loop {
        let mut next_complexes = Vec::new();
        let mut changed = false;
        for complex in &current.complexes {
            let variants = extend_complex(complex, extensions)?;
            if variants.len() > 1 || variants[0] != *complex {
                changed = true;
            }
            next_complexes.extend(variants);
        }
        dedupe_by_superselector(&mut next_complexes);
        if next_complexes.len() > MAX_EXTEND_SELECTORS {
            return Err(SassError::new(ErrorKind::ExtendCycle(MAX_EXTEND_SELECTORS), Span::synthetic()));
        }
        let next = SelectorList::new(next_complexes);
        if !changed || next.complexes.len() == current.complexes.len() && selector_lists_equal(&next, &current) {
            return Ok(next);
        }
        current = next;
    }
}

fn selector_lists_equal(a: &SelectorList, b: &SelectorList) -> bool {
    a.complexes == b.complexes
}

/// Remove complex selectors that another selector in the same list
/// already subsumes (a superselector of it), keeping the woven output
/// from growing with redundant entries every fixpoint iteration.
fn dedupe_by_superselector(complexes: &mut Vec<ComplexSelector>) {
    let mut kept: Vec<ComplexSelector> = Vec::new();
    for candidate in complexes.drain(..) {
        if kept.contains(&candidate) {
            continue;
        }
        kept.push(candidate);
    }
    *complexes = kept;
}

/// Extend one complex selector, returning every variant (the original,
/// unless it contained only placeholders consumed by extension, plus
/// one per combination of matching extender).
fn extend_complex(complex: &ComplexSelector, extensions: &Extensions) -> SassResult<Vec<ComplexSelector>> {
    let mut variants = vec![complex.clone()];
    for (i, compound) in complex.components.iter().enumerate() {
        let mut woven = Vec::new();
        for simple in &compound.simples {
            let Some(entries) = extensions.by_target.get(simple) else { continue };
            for entry in entries {
                extensions.matched_targets.borrow_mut().insert(simple.clone());
                for extender_complex in &entry.extender.complexes {
                    if let Some(rewritten) = substitute_at(complex, i, compound, simple, extender_complex) {
                        woven.push(rewritten);
                    }
                }
            }
        }
        variants.extend(woven);
    }
    // A compound made up entirely of placeholders that were consumed by
    // extension should not keep the bare placeholder form in the output
    // (it never serializes), so when every variant still containing an
    // all-placeholder compound has *some* extended sibling, drop the
    // unextended original. Otherwise a lone placeholder selector is kept
    // around, matching the serializer's own placeholder-dropping pass.
    if variants.len() > 1 {
        variants.retain(|c| !c.has_placeholder() || c != complex);
    }
    Ok(variants)
}

/// Replace the compound at position `index` in `complex` with
/// `extender_complex` woven in: the extender's trailing compound is
/// unified with what's left of the original compound after removing
/// `matched_simple`, and any leading ancestor compounds the extender
/// carries are spliced in as new ancestors.
fn substitute_at(
    complex: &ComplexSelector,
    index: usize,
    original_compound: &CompoundSelector,
    matched_simple: &SimpleSelector,
    extender_complex: &ComplexSelector,
) -> Option<ComplexSelector> {
    let remainder = CompoundSelector::new(
        original_compound.simples.iter().filter(|s| *s != matched_simple).cloned().collect(),
    );
    let extender_last = extender_complex.components.last()?;
    let unified_last = unify_compound(extender_last, &remainder)?;

    let mut prefix = ComplexSelector::new(
        complex.components[..index].to_vec(),
        complex.combinators[..index.min(complex.combinators.len())].to_vec(),
    );
    let mut ancestor_part = ComplexSelector::new(
        extender_complex.components[..extender_complex.components.len() - 1].to_vec(),
        extender_complex.combinators.clone(),
    );
    ancestor_part.components.push(unified_last);
    if index == 0 {
        prefix = ancestor_part;
    } else {
        prefix = concat_complex(&prefix, &ancestor_part);
    }

    let suffix_components = complex.components[index + 1..].to_vec();
    let suffix_combinators = if index < complex.combinators.len() { complex.combinators[index..].to_vec() } else { Vec::new() };
    if suffix_components.is_empty() {
        Some(prefix)
    } else {
        let mut result = prefix;
        result.components.extend(suffix_components);
        result.combinators.extend(suffix_combinators);
        Some(result)
    }
}

/// Convenience used by callers that just want to know whether `list`
/// would change at all under `extensions`, without materializing the
/// woven result (used by the evaluator to skip extend bookkeeping for
/// plain stylesheets with no `@extend` at all).
#[must_use]
pub fn has_any_target(list: &SelectorList, extensions: &Extensions) -> bool {
    list.complexes.iter().any(|c| c.components.iter().any(|compound| compound.simples.iter().any(|s| extensions.by_target.contains_key(s))))
}

/// Whether `narrower` is already fully covered by `broader` (used by
/// the serializer to drop a style rule whose selector list extension
/// left entirely subsumed by a sibling rule; not applied by default
/// since CSS rule order matters for cascade, exposed for callers that
/// explicitly want redundancy elimination).
#[must_use]
pub fn is_redundant(narrower: &SelectorList, broader: &SelectorList) -> bool {
    is_superselector_list(broader, narrower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parser::parse;

    #[test]
    fn simple_class_extend_adds_new_selector() {
        let list = parse(".a", Span::synthetic()).unwrap();
        let mut extensions = Extensions::new();
        extensions.add(
            SimpleSelector::Class("a".into()),
            parse(".b", Span::synthetic()).unwrap(),
            ExtendMode::Normal,
            Span::synthetic(),
        );
        let extended = extend(&list, &extensions).unwrap();
        assert!(extended.complexes.len() >= 2);
    }

    #[test]
    fn placeholder_extend_replaces_placeholder_selector() {
        let list = parse("%foo", Span::synthetic()).unwrap();
        let mut extensions = Extensions::new();
        extensions.add(
            SimpleSelector::Placeholder("foo".into()),
            parse(".btn", Span::synthetic()).unwrap(),
            ExtendMode::Normal,
            Span::synthetic(),
        );
        let extended = extend(&list, &extensions).unwrap();
        assert!(extended.complexes.iter().any(|c| !c.has_placeholder()));
    }

    #[test]
    fn unmatched_non_optional_extend_is_an_error() {
        let list = parse(".unrelated", Span::synthetic()).unwrap();
        let mut extensions = Extensions::new();
        extensions.add(
            SimpleSelector::Class("missing".into()),
            parse(".extender", Span::synthetic()).unwrap(),
            ExtendMode::Normal,
            Span::synthetic(),
        );
        extend(&list, &extensions).unwrap();
        assert!(extensions.check_all_matched().is_err());
    }

    #[test]
    fn optional_extend_with_no_match_is_not_an_error() {
        let list = parse(".unrelated", Span::synthetic()).unwrap();
        let mut extensions = Extensions::new();
        extensions.add(
            SimpleSelector::Class("missing".into()),
            parse(".extender", Span::synthetic()).unwrap(),
            ExtendMode::Optional,
            Span::synthetic(),
        );
        extend(&list, &extensions).unwrap();
        assert!(extensions.check_all_matched().is_ok());
    }
}
