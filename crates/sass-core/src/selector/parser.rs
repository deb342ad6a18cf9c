//! Parses already-interpolated selector text into a [`SelectorList`]
//! (spec §4.2's `parse(selector_text) -> SelectorList` contract).
//!
//! This runs after `#{}` interpolation has been resolved to plain text,
//! so it only needs to understand selector grammar, not Sass
//! expression syntax.

use sass_ast::{Combinator, CompoundSelector, ComplexSelector, PseudoArgument, SelectorList, SimpleSelector};
use sass_common::{ErrorKind, SassError, SassResult, Span};

/// Parse a selector list from already-interpolated text, e.g.
/// `".a.b > .c, .d ~ .e"`.
pub fn parse(text: &str, span: Span) -> SassResult<SelectorList> {
    let mut complexes = Vec::new();
    for part in split_top_level(text, ',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        complexes.push(parse_complex(trimmed, span)?);
    }
    Ok(SelectorList::new(complexes))
}

/// Parse a single comma-free complex selector, e.g. `".a > .b .c"`.
fn parse_complex(text: &str, span: Span) -> SassResult<ComplexSelector> {
    let tokens = tokenize_complex(text);
    let mut components = Vec::new();
    let mut combinators = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            ComplexToken::Compound(s) => {
                components.push(parse_compound(s, span)?);
                i += 1;
            }
            ComplexToken::Combinator(c) => {
                combinators.push(*c);
                i += 1;
            }
        }
    }
    if components.is_empty() {
        return Err(SassError::new(ErrorKind::InvalidSelector(format!("empty selector: {text}")), span));
    }
    // Ensure alternation invariant: a leading/trailing/doubled combinator
    // means a malformed selector (e.g. "> .a" or ".a >  > .b").
    if combinators.len() != components.len() - 1 {
        return Err(SassError::new(ErrorKind::InvalidSelector(format!("malformed combinator sequence: {text}")), span));
    }
    Ok(ComplexSelector::new(components, combinators))
}

enum ComplexToken {
    Compound(String),
    Combinator(Combinator),
}

/// Split `.a > .b .c` into alternating compound-text/combinator tokens,
/// collapsing runs of whitespace around explicit combinators (`>`,
/// `+`, `~`) and treating bare whitespace between compounds as the
/// descendant combinator.
fn tokenize_complex(text: &str) -> Vec<ComplexToken> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut pending_descendant = false;

    while let Some(&c) = chars.peek() {
        match c {
            '>' | '+' | '~' => {
                if !current.trim().is_empty() {
                    tokens.push(ComplexToken::Compound(current.trim().to_string()));
                    current.clear();
                }
                pending_descendant = false;
                let combinator = match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::NextSibling,
                    _ => Combinator::FollowingSibling,
                };
                tokens.push(ComplexToken::Combinator(combinator));
                chars.next();
            }
            c if c.is_whitespace() => {
                if !current.trim().is_empty() {
                    pending_descendant = true;
                }
                chars.next();
            }
            _ => {
                if pending_descendant {
                    tokens.push(ComplexToken::Compound(current.trim().to_string()));
                    current.clear();
                    tokens.push(ComplexToken::Combinator(Combinator::Descendant));
                    pending_descendant = false;
                }
                current.push(c);
                chars.next();
            }
        }
    }
    if !current.trim().is_empty() {
        tokens.push(ComplexToken::Compound(current.trim().to_string()));
    }
    tokens
}

/// Parse one compound selector's simple-selector run, e.g. `a.b:hover`.
fn parse_compound(text: &str, span: Span) -> SassResult<CompoundSelector> {
    let mut simples = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '&' => {
                simples.push(SimpleSelector::Parent);
                i += 1;
            }
            '*' => {
                simples.push(SimpleSelector::Universal);
                i += 1;
            }
            '.' => {
                let (name, next) = read_ident(&chars, i + 1);
                simples.push(SimpleSelector::Class(name));
                i = next;
            }
            '#' => {
                let (name, next) = read_ident(&chars, i + 1);
                simples.push(SimpleSelector::Id(name));
                i = next;
            }
            '%' => {
                let (name, next) = read_ident(&chars, i + 1);
                simples.push(SimpleSelector::Placeholder(name));
                i = next;
            }
            '[' => {
                let (attr, next) = read_bracketed(&chars, i, '[', ']');
                simples.push(SimpleSelector::Attribute(attr));
                i = next;
            }
            ':' => {
                let is_element = chars.get(i + 1) == Some(&':');
                let start = if is_element { i + 2 } else { i + 1 };
                let (name, mut next) = read_ident(&chars, start);
                let argument = if chars.get(next) == Some(&'(') {
                    let (raw, after) = read_bracketed(&chars, next, '(', ')');
                    next = after;
                    parse_pseudo_argument(&raw, span)?
                } else {
                    PseudoArgument::None
                };
                if is_element {
                    simples.push(SimpleSelector::PseudoElement { name, argument });
                } else {
                    simples.push(SimpleSelector::PseudoClass { name, argument });
                }
                i = next;
            }
            c if c.is_alphanumeric() || c == '-' || c == '_' => {
                let (name, next) = read_ident(&chars, i);
                simples.push(SimpleSelector::Type(name));
                i = next;
            }
            _ => {
                return Err(SassError::new(
                    ErrorKind::InvalidSelector(format!("unexpected character '{}' in selector", chars[i])),
                    span,
                ));
            }
        }
    }
    Ok(CompoundSelector::new(simples))
}

fn parse_pseudo_argument(raw: &str, span: Span) -> SassResult<PseudoArgument> {
    let trimmed = raw.trim();
    // Selector-bearing pseudos: if it looks like selector syntax (starts
    // with a selector-leading character), try to parse as a nested
    // selector list; anything unparseable falls back to a plain string.
    if trimmed.is_empty() {
        return Ok(PseudoArgument::Plain(String::new()));
    }
    if let Some(of_pos) = trimmed.find(" of ") {
        let prefix = trimmed[..of_pos].trim().to_string();
        let selector_text = trimmed[of_pos + 4..].trim();
        if let Ok(list) = parse(selector_text, span) {
            return Ok(PseudoArgument::PlainAndSelector(prefix, list));
        }
        return Ok(PseudoArgument::Plain(trimmed.to_string()));
    }
    let looks_like_selector =
        trimmed.starts_with('.') || trimmed.starts_with('#') || trimmed.starts_with('&') || trimmed.starts_with('*') || trimmed.contains(',');
    if looks_like_selector {
        if let Ok(list) = parse(trimmed, span) {
            return Ok(PseudoArgument::Selector(list));
        }
    }
    Ok(PseudoArgument::Plain(trimmed.to_string()))
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '-' || chars[i] == '_' || !chars[i].is_ascii()) {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}

fn read_bracketed(chars: &[char], start: usize, open: char, close: char) -> (String, usize) {
    debug_assert_eq!(chars[start], open);
    let mut depth = 0;
    let mut i = start;
    let content_start = start + 1;
    loop {
        if i >= chars.len() {
            return (chars[content_start..i].iter().collect(), i);
        }
        if chars[i] == open {
            depth += 1;
        } else if chars[i] == close {
            depth -= 1;
            if depth == 0 {
                return (chars[content_start..i].iter().collect(), i + 1);
            }
        }
        i += 1;
    }
}

/// Split on a delimiter, but only at nesting depth 0 (respecting
/// `()`/`[]` so `:not(.a, .b)` isn't split as two selectors).
fn split_top_level(text: &str, delimiter: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    for c in text.chars() {
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth -= 1;
                current.push(c);
            }
            c if c == delimiter && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_compound() {
        let list = parse("a.b", Span::synthetic()).unwrap();
        assert_eq!(list.complexes.len(), 1);
        assert_eq!(list.complexes[0].components.len(), 1);
        assert_eq!(list.complexes[0].components[0].simples.len(), 2);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let list = parse(".a > .b .c", Span::synthetic()).unwrap();
        let complex = &list.complexes[0];
        assert_eq!(complex.combinators, vec![Combinator::Child, Combinator::Descendant]);
        assert_eq!(complex.components.len(), 3);
    }

    #[test]
    fn splits_comma_separated_list_respecting_parens() {
        let list = parse(".a, :not(.b, .c)", Span::synthetic()).unwrap();
        assert_eq!(list.complexes.len(), 2);
    }

    #[test]
    fn parses_placeholder_and_parent_ref() {
        let list = parse("&%foo", Span::synthetic()).unwrap();
        let compound = &list.complexes[0].components[0];
        assert!(compound.has_parent_ref());
        assert!(compound.has_placeholder());
    }

    #[test]
    fn parses_nested_not_as_selector_argument() {
        let list = parse(":not(.a)", Span::synthetic()).unwrap();
        let simple = &list.complexes[0].components[0].simples[0];
        match simple {
            SimpleSelector::PseudoClass { name, argument } => {
                assert_eq!(name, "not");
                assert!(matches!(argument, PseudoArgument::Selector(_)));
            }
            _ => panic!("expected pseudo-class"),
        }
    }
}
