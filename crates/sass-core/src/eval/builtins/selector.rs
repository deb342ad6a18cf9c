//! `selector.*` built-ins (spec §4.2: exposing the selector engine to
//! user stylesheets via `selector.nest`/`is-superselector`/`unify`/
//! `extend`/`replace`/`parse`/`append`).
//!
//! A selector value here is always a comma-separated [`Value::List`] of
//! one-per-complex-selector strings. The real Sass language represents
//! each complex selector as a further space-separated list of compound
//! strings; we collapse that inner level to a single string per complex
//! selector, since nothing downstream needs to address an individual
//! compound by index. `selector.parse`/`selector.nest`/etc. below accept
//! either that list shape or a single string and always return the list
//! shape, matching the real functions' contract of "either works as
//! input, list is the canonical output".

use sass_ast::{Combinator, CompoundSelector, ComplexSelector, SelectorList, SimpleSelector};
use sass_common::{SassResult, Span};

use super::Args;
use crate::selector::{concat_complex, is_superselector_list, parse, unify_compound};
use crate::value::{ListSeparator, SassList, SassString, Value};

/// Drop a complex selector's trailing compound, for splicing two
/// complex selectors together at their last compounds (mirrors
/// `selector::extend::substitute_at`'s prefix/suffix handling).
fn drop_last(complex: &ComplexSelector) -> ComplexSelector {
    let n = complex.components.len();
    ComplexSelector::new(complex.components[..n - 1].to_vec(), complex.combinators[..n.saturating_sub(2)].to_vec())
}

/// Unify two complex selectors by unifying their trailing compounds
/// (spec §4.2: "returns a selector that matches exactly the
/// intersection"), concatenating whatever comes before with a
/// descendant combinator. Returns `None` when the trailing compounds
/// are incompatible (conflicting type or ID selectors).
fn unify_complex(a: &ComplexSelector, b: &ComplexSelector) -> Option<ComplexSelector> {
    let a_last = a.components.last()?;
    let b_last = b.components.last()?;
    let unified_last = unify_compound(a_last, b_last)?;

    let a_prefix = drop_last(a);
    let b_prefix = drop_last(b);
    let mut result = if a_prefix.components.is_empty() {
        b_prefix
    } else if b_prefix.components.is_empty() {
        a_prefix
    } else {
        concat_complex(&a_prefix, &b_prefix)
    };
    if result.components.is_empty() {
        Some(ComplexSelector::new(vec![unified_last], Vec::new()))
    } else {
        result.combinators.push(Combinator::Descendant);
        result.components.push(unified_last);
        Some(result)
    }
}

fn value_to_selector_list(value: &Value, span: &Span) -> SassResult<SelectorList> {
    let text = match value {
        Value::String(s) => s.as_str().to_string(),
        Value::List(l) => l.contents().iter().map(Value::to_css).collect::<Vec<_>>().join(", "),
        other => other.to_css(),
    };
    parse(&text, span.clone())
}

fn selector_list_to_value(list: &SelectorList) -> Value {
    let items = list
        .complexes
        .iter()
        .map(|complex| {
            let single = SelectorList::new(vec![complex.clone()]);
            Value::String(SassString::unquoted(crate::serialize::selector_to_css(&single)))
        })
        .collect();
    Value::List(Box::new(SassList::new(items, ListSeparator::Comma, false)))
}

/// A `selector.extend`/`selector.replace` target must name exactly one
/// simple selector (spec's extend targets are always a single simple
/// selector).
fn single_simple_selector(value: &Value, args: &Args, span: &Span) -> SassResult<SimpleSelector> {
    let list = value_to_selector_list(value, span)?;
    if list.complexes.len() == 1 && list.complexes[0].components.len() == 1 && list.complexes[0].components[0].simples.len() == 1 {
        return Ok(list.complexes[0].components[0].simples[0].clone());
    }
    Err(args.invalid_argument(format!("{} is not a valid extend target; expected a single simple selector", value.to_css())))
}

pub(super) fn dispatch(name: &str, args: &mut Args, span: &Span) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "parse" => {
            let v = args.required(0, "selector", name)?;
            selector_list_to_value(&value_to_selector_list(&v, span)?)
        }
        "nest" => {
            let mut iter = args.positional.iter();
            let Some(first) = iter.next() else {
                return Err(args.invalid_argument(format!("{name}() requires at least one argument")));
            };
            let mut acc = value_to_selector_list(first, span)?;
            for next in iter {
                let rhs = value_to_selector_list(next, span)?;
                let mut combined = Vec::new();
                for a in &acc.complexes {
                    for b in &rhs.complexes {
                        combined.push(concat_complex(a, b));
                    }
                }
                acc = SelectorList::new(combined);
            }
            selector_list_to_value(&acc)
        }
        "append" => {
            let mut iter = args.positional.iter();
            let Some(first) = iter.next() else {
                return Err(args.invalid_argument(format!("{name}() requires at least one argument")));
            };
            let mut acc = value_to_selector_list(first, span)?;
            for next in iter {
                let rhs = value_to_selector_list(next, span)?;
                let mut combined = Vec::new();
                for a in &acc.complexes {
                    for b in &rhs.complexes {
                        // `selector.append` glues the two compounds of
                        // the last/first component together rather than
                        // inserting a combinator between them.
                        let mut components = a.components.clone();
                        let mut combinators = a.combinators.clone();
                        if let (Some(last), Some(first_b)) = (components.last().cloned(), b.components.first().cloned()) {
                            let mut simples = last.simples;
                            simples.extend(first_b.simples);
                            *components.last_mut().unwrap() = CompoundSelector::new(simples);
                        }
                        combinators.extend(b.combinators.iter().copied());
                        components.extend(b.components.iter().skip(1).cloned());
                        combined.push(sass_ast::ComplexSelector::new(components, combinators));
                    }
                }
                acc = SelectorList::new(combined);
            }
            selector_list_to_value(&acc)
        }
        "unify" => {
            let a = value_to_selector_list(&args.required(0, "selector1", name)?, span)?;
            let b = value_to_selector_list(&args.required(1, "selector2", name)?, span)?;
            let mut combined = Vec::new();
            for ca in &a.complexes {
                for cb in &b.complexes {
                    if let Some(unified) = unify_complex(ca, cb) {
                        combined.push(unified);
                    }
                }
            }
            if combined.is_empty() {
                Value::Null
            } else {
                selector_list_to_value(&SelectorList::new(combined))
            }
        }
        "is-superselector" => {
            let sup = value_to_selector_list(&args.required(0, "super", name)?, span)?;
            let sub = value_to_selector_list(&args.required(1, "sub", name)?, span)?;
            Value::Boolean(is_superselector_list(&sup, &sub))
        }
        // `selector.replace` is meant to drop the base selector's own
        // match on `extendee` and substitute `extender` in its place;
        // we don't track enough to distinguish that from a plain
        // (optional) extend, so both widen the base selector the same
        // way here.
        "extend" | "replace" => {
            let base = value_to_selector_list(&args.required(0, "selector", name)?, span)?;
            let extendee = args.required(1, "extendee", name)?;
            let extender_value = args.required(2, "extender", name)?;
            let target = single_simple_selector(&extendee, args, span)?;
            let extender = value_to_selector_list(&extender_value, span)?;
            let mut extensions = crate::selector::Extensions::new();
            for complex in extender.complexes {
                extensions.add(target.clone(), SelectorList::new(vec![complex]), crate::selector::ExtendMode::Optional, span.clone());
            }
            let extended = crate::selector::extend(&base, &extensions)?;
            selector_list_to_value(&extended)
        }
        _ => return Ok(None),
    }))
}
