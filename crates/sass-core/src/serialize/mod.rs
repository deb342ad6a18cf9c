//! Turning the plain-CSS tree into CSS text, plus an optional source
//! map (spec §4.5, §6.3).

mod selector;
mod source_map;

pub use selector::selector_to_css;
pub use source_map::SourceMap;

use sass_ast::{CssNode, CssNodeId, CssTree};

use source_map::SourceMapBuilder;

/// Output formatting mode (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Indented, one declaration per line, with a blank line after a
    /// flattened nested group (spec's `isGroupEnd` flag).
    #[default]
    Expanded,
    /// No whitespace beyond what's syntactically required.
    Compressed,
}

/// Options controlling how a [`CssTree`] is rendered to text.
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Expanded vs. compressed output.
    pub style: Style,
    /// Whether to prepend `@charset "UTF-8";`/a BOM when the output
    /// contains non-ASCII bytes.
    pub charset: bool,
    /// Whether to additionally build a [`SourceMap`].
    pub source_map: bool,
    /// The `file` field recorded in the source map, if building one.
    pub file_name: Option<String>,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self { style: Style::Expanded, charset: true, source_map: false, file_name: None }
    }
}

/// Render `tree` to CSS text, with an optional source map.
#[must_use]
pub fn serialize(tree: &CssTree, options: &SerializeOptions) -> (String, Option<SourceMap>) {
    let mut ser = Serializer {
        tree,
        style: options.style,
        writer: Writer::new(),
        map: options.source_map.then(SourceMapBuilder::new),
    };
    for &child in tree.children(tree.root()) {
        if ser.has_output(child) {
            ser.emit_node(child, 0);
        }
    }
    let mut css = ser.writer.buf;
    if options.charset && ser.writer.has_non_ascii {
        css = match options.style {
            Style::Expanded => format!("@charset \"UTF-8\";\n{css}"),
            Style::Compressed => format!("\u{feff}{css}"),
        };
    }
    let map = ser.map.map(|builder| builder.finish(options.file_name.clone()));
    (css, map)
}

/// A text buffer that tracks its own generated `(line, column)`
/// position as it's written to, for source-map bookkeeping.
struct Writer {
    buf: String,
    line: u32,
    column: u32,
    has_non_ascii: bool,
}

impl Writer {
    fn new() -> Self {
        Self { buf: String::new(), line: 0, column: 0, has_non_ascii: false }
    }

    fn push_str(&mut self, s: &str) {
        for ch in s.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
            if !ch.is_ascii() {
                self.has_non_ascii = true;
            }
        }
        self.buf.push_str(s);
    }

    fn push(&mut self, ch: char) {
        let mut tmp = [0u8; 4];
        self.push_str(ch.encode_utf8(&mut tmp));
    }
}

struct Serializer<'a> {
    tree: &'a CssTree,
    style: Style,
    writer: Writer,
    map: Option<SourceMapBuilder>,
}

impl Serializer<'_> {
    /// Whether rendering `id` (and anything nested under it) would
    /// produce any text at all. A style rule with an empty body (e.g.
    /// every declaration was dropped, or an extend left its selector
    /// all-placeholder) is omitted entirely rather than emitted empty.
    fn has_output(&self, id: CssNodeId) -> bool {
        let Some(node) = self.tree.get(id) else { return false };
        match &node.node {
            CssNode::Root => false,
            CssNode::StyleRule { selector } => {
                !selector_to_css(selector).is_empty() && self.tree.children(id).iter().any(|c| self.has_output(*c))
            }
            CssNode::Media { .. } | CssNode::Supports { .. } => self.tree.children(id).iter().any(|c| self.has_output(*c)),
            CssNode::AtRule { has_block, .. } => {
                if *has_block {
                    self.tree.children(id).iter().any(|c| self.has_output(*c))
                } else {
                    true
                }
            }
            CssNode::Declaration { .. } | CssNode::Comment { .. } | CssNode::Import(_) | CssNode::KeyframeBlock { .. } => true,
        }
    }

    fn indent(&mut self, depth: usize) {
        if self.style == Style::Expanded {
            self.writer.push_str(&"  ".repeat(depth));
        }
    }

    fn open_brace(&mut self) {
        match self.style {
            Style::Expanded => self.writer.push_str(" {\n"),
            Style::Compressed => self.writer.push('{'),
        }
    }

    fn close_brace(&mut self, depth: usize) {
        match self.style {
            Style::Expanded => {
                self.indent(depth);
                self.writer.push_str("}\n");
            }
            Style::Compressed => self.writer.push('}'),
        }
    }

    fn end_statement(&mut self) {
        match self.style {
            Style::Expanded => self.writer.push_str(";\n"),
            Style::Compressed => self.writer.push(';'),
        }
    }

    fn mark(&mut self, span: &sass_common::Span) {
        let (line, column) = (self.writer.line, self.writer.column);
        if let Some(map) = &mut self.map {
            map.record(line, column, span);
        }
    }

    fn emit_block_children(&mut self, parent: CssNodeId, depth: usize) {
        for &child in self.tree.children(parent) {
            if self.has_output(child) {
                self.emit_node(child, depth + 1);
            }
        }
    }

    fn emit_node(&mut self, id: CssNodeId, depth: usize) {
        let Some(tree_node) = self.tree.get(id) else { return };
        let span = tree_node.span.clone();
        let is_group_end = tree_node.is_group_end;
        match &tree_node.node {
            CssNode::Root => {}
            CssNode::StyleRule { selector } => {
                let text = selector_to_css(selector);
                self.mark(&span);
                self.indent(depth);
                self.writer.push_str(&text);
                self.open_brace();
                self.emit_block_children(id, depth);
                self.close_brace(depth);
            }
            CssNode::AtRule { name, value, has_block } => {
                let has_block = *has_block;
                self.mark(&span);
                self.indent(depth);
                self.writer.push('@');
                self.writer.push_str(name);
                if !value.is_empty() {
                    self.writer.push(' ');
                    self.writer.push_str(value);
                }
                if has_block {
                    self.open_brace();
                    self.emit_block_children(id, depth);
                    self.close_brace(depth);
                } else {
                    self.end_statement();
                }
            }
            CssNode::Declaration { name, value, .. } => {
                self.mark(&span);
                self.indent(depth);
                self.writer.push_str(name);
                self.writer.push(':');
                if self.style == Style::Expanded {
                    self.writer.push(' ');
                }
                self.writer.push_str(value);
                self.end_statement();
            }
            CssNode::Media { queries } => {
                let text = queries.iter().map(|q| q.text.as_str()).collect::<Vec<_>>().join(", ");
                self.mark(&span);
                self.indent(depth);
                self.writer.push_str("@media ");
                self.writer.push_str(&text);
                self.open_brace();
                self.emit_block_children(id, depth);
                self.close_brace(depth);
            }
            CssNode::Supports { condition } => {
                let condition = condition.clone();
                self.mark(&span);
                self.indent(depth);
                self.writer.push_str("@supports ");
                self.writer.push_str(&condition);
                self.open_brace();
                self.emit_block_children(id, depth);
                self.close_brace(depth);
            }
            CssNode::KeyframeBlock { selectors } => {
                let text = selectors.join(", ");
                self.mark(&span);
                self.indent(depth);
                self.writer.push_str(&text);
                self.open_brace();
                self.emit_block_children(id, depth);
                self.close_brace(depth);
            }
            CssNode::Import(import) => {
                let import = import.clone();
                self.mark(&span);
                self.indent(depth);
                self.writer.push_str("@import ");
                self.writer.push_str(&import.url);
                if let Some(media) = &import.media {
                    self.writer.push(' ');
                    self.writer.push_str(media);
                }
                if let Some(supports) = &import.supports {
                    self.writer.push(' ');
                    self.writer.push_str(supports);
                }
                self.end_statement();
            }
            CssNode::Comment { text } => {
                if self.style == Style::Expanded {
                    let text = text.clone();
                    self.indent(depth);
                    self.writer.push_str(&text);
                    self.writer.push('\n');
                }
            }
        }
        if self.style == Style::Expanded && is_group_end {
            self.writer.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_ast::{SelectorList, SimpleSelector};
    use sass_common::Span;

    fn rule_tree() -> CssTree {
        let mut tree = CssTree::new(Span::synthetic());
        let selector = SelectorList::new(vec![sass_ast::ComplexSelector::single(sass_ast::CompoundSelector::new(vec![
            SimpleSelector::Class("a".to_string()),
        ]))]);
        let rule = tree.alloc(CssNode::StyleRule { selector }, Span::synthetic());
        tree.append_child(tree.root(), rule);
        let decl = tree.alloc(
            CssNode::Declaration { name: "color".to_string(), value: "red".to_string(), is_custom_property: false },
            Span::synthetic(),
        );
        tree.append_child(rule, decl);
        tree
    }

    #[test]
    fn expanded_style_rule_renders_with_braces_and_newline() {
        let tree = rule_tree();
        let (css, map) = serialize(&tree, &SerializeOptions::default());
        assert_eq!(css, ".a {\n  color: red;\n}\n");
        assert!(map.is_none());
    }

    #[test]
    fn compressed_style_omits_all_non_essential_whitespace() {
        let tree = rule_tree();
        let options = SerializeOptions { style: Style::Compressed, ..SerializeOptions::default() };
        let (css, _) = serialize(&tree, &options);
        assert_eq!(css, ".a{color:red;}");
    }

    #[test]
    fn empty_style_rule_is_omitted_entirely() {
        let mut tree = CssTree::new(Span::synthetic());
        let selector = SelectorList::new(vec![sass_ast::ComplexSelector::single(sass_ast::CompoundSelector::new(vec![
            SimpleSelector::Class("empty".to_string()),
        ]))]);
        let rule = tree.alloc(CssNode::StyleRule { selector }, Span::synthetic());
        tree.append_child(tree.root(), rule);
        let (css, _) = serialize(&tree, &SerializeOptions::default());
        assert_eq!(css, "");
    }
}
