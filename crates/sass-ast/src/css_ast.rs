//! The plain-CSS tree (spec §3.4): a mutable, arena-indexed tree built by
//! the evaluator and consumed by the serializer and the extend pass.
//!
//! Per the redesign note in spec §9 ("Cyclic parent pointers in the CSS
//! tree -> use an arena that owns all CSS nodes with stable indices"),
//! this follows the same shape as the teacher's `koala-dom::DomTree`:
//! one `Vec<CssNode>` arena, `CssNodeId` indices standing in for both
//! parent and child references, and iterator types for traversal.

use crate::selector::SelectorList;
use sass_common::Span;

/// A type-safe index into a [`CssTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CssNodeId(pub usize);

impl CssNodeId {
    /// The stylesheet root is always allocated first.
    pub const ROOT: Self = Self(0);
}

/// A CSS media query, kept as an opaque parsed-or-raw string list: the
/// evaluator's media-merge algebra (spec §4.4) works over these without
/// this crate needing to know the grammar of media features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    /// The query text as it should be serialized, already the result of
    /// evaluating any interpolation.
    pub text: String,
}

/// An `@import` target (spec §3.4): either a resolved plain-CSS `url()`
/// import (one that the evaluator left alone because it wasn't a Sass
/// module reference) or, in the rare case a media/supports clause rides
/// along with it, those conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct CssImport {
    /// The URL or quoted string exactly as it should be serialized.
    pub url: String,
    /// Optional trailing media query list.
    pub media: Option<String>,
    /// Optional trailing `supports(...)` clause.
    pub supports: Option<String>,
}

/// One node of the plain-CSS tree (spec §3.4).
#[derive(Debug, Clone, PartialEq)]
pub enum CssNode {
    /// The tree root. Always [`CssNodeId::ROOT`]; has no selector/name of
    /// its own, only children.
    Root,
    /// A style rule: a selector list plus its declarations/nested rules.
    StyleRule { selector: SelectorList },
    /// A generic at-rule with a name and literal (already-evaluated)
    /// value/prelude, and whether it has a child block at all (an empty
    /// `Vec` in `children` is ambiguous between "no block" and "empty
    /// block", which `has_block` disambiguates for serialization).
    AtRule { name: String, value: String, has_block: bool },
    /// A property declaration.
    Declaration { name: String, value: String, is_custom_property: bool },
    /// `@media <queries> { ... }`.
    Media { queries: Vec<MediaQuery> },
    /// `@supports <condition> { ... }`.
    Supports { condition: String },
    /// One keyframe selector block (`0%`, `from`, `to`, ...) inside a
    /// `@keyframes` at-rule's children.
    KeyframeBlock { selectors: Vec<String> },
    /// `@import` of a URL the evaluator did not resolve as a Sass module.
    Import(CssImport),
    /// A preserved loud comment (`/* ... */`).
    Comment { text: String },
}

/// One arena slot: the node payload plus its tree-structural metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CssTreeNode {
    /// The node's content.
    pub node: CssNode,
    /// Parent node, `None` only for the root.
    pub parent: Option<CssNodeId>,
    /// Children, in output order.
    pub children: Vec<CssNodeId>,
    /// True if this was the last child of a flattened nested group, so
    /// the serializer can insert a blank line after it in expanded mode
    /// (spec §4.5).
    pub is_group_end: bool,
    /// The span in the original Sass source this node was produced from,
    /// used for source-map emission.
    pub span: Span,
}

/// The plain-CSS tree: an arena of [`CssTreeNode`]s addressed by
/// [`CssNodeId`], with the stylesheet root always at index 0.
#[derive(Debug, Clone)]
pub struct CssTree {
    nodes: Vec<CssTreeNode>,
}

impl CssTree {
    /// Create a new tree containing only the root node.
    #[must_use]
    pub fn new(root_span: Span) -> Self {
        Self {
            nodes: vec![CssTreeNode {
                node: CssNode::Root,
                parent: None,
                children: Vec::new(),
                is_group_end: false,
                span: root_span,
            }],
        }
    }

    /// The root node's id.
    #[must_use]
    pub fn root(&self) -> CssNodeId {
        CssNodeId::ROOT
    }

    /// Number of nodes in the arena, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no nodes beyond the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: CssNodeId) -> Option<&CssTreeNode> {
        self.nodes.get(id.0)
    }

    /// Look up a node mutably by id.
    pub fn get_mut(&mut self, id: CssNodeId) -> Option<&mut CssTreeNode> {
        self.nodes.get_mut(id.0)
    }

    /// Allocate a new, unattached node and return its id. Callers attach
    /// it with [`Self::append_child`].
    pub fn alloc(&mut self, node: CssNode, span: Span) -> CssNodeId {
        let id = CssNodeId(self.nodes.len());
        self.nodes.push(CssTreeNode {
            node,
            parent: None,
            children: Vec::new(),
            is_group_end: false,
            span,
        });
        id
    }

    /// Append `child` to `parent`'s children list and set its parent
    /// pointer, mirroring `koala_dom::DomTree::append_child`.
    pub fn append_child(&mut self, parent: CssNodeId, child: CssNodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Mark a node as the last child of a flattened nested group.
    pub fn set_group_end(&mut self, id: CssNodeId, is_group_end: bool) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            n.is_group_end = is_group_end;
        }
    }

    /// The parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: CssNodeId) -> Option<CssNodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The children of a node, empty slice for an unknown id.
    #[must_use]
    pub fn children(&self, id: CssNodeId) -> &[CssNodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Replace the selector of a `StyleRule` node in place (the one
    /// mutation the extend pass performs, spec §3.4: "the extend pass
    /// may rewrite a style rule's selector in place").
    pub fn set_selector(&mut self, id: CssNodeId, selector: SelectorList) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            if let CssNode::StyleRule { selector: slot } = &mut n.node {
                *slot = selector;
            }
        }
    }

    /// Iterate over every node in the tree in document (depth-first,
    /// pre-order) order, including the root.
    pub fn iter_all(&self) -> impl Iterator<Item = CssNodeId> + '_ {
        std::iter::once(self.root()).chain(self.descendants(self.root()))
    }

    /// Depth-first, pre-order descendants of a node, not including the
    /// node itself.
    #[must_use]
    pub fn descendants(&self, id: CssNodeId) -> DescendantIterator<'_> {
        DescendantIterator { tree: self, stack: self.children(id).iter().rev().copied().collect() }
    }

    /// Ancestors of a node, nearest first, not including the node itself.
    #[must_use]
    pub fn ancestors(&self, id: CssNodeId) -> AncestorIterator<'_> {
        AncestorIterator { tree: self, current: self.parent(id) }
    }
}

/// Depth-first, pre-order descendant iterator, mirroring
/// `koala_dom::DescendantIterator`.
pub struct DescendantIterator<'a> {
    tree: &'a CssTree,
    stack: Vec<CssNodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = CssNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Ancestor-walking iterator, mirroring `koala_dom::AncestorIterator`.
pub struct AncestorIterator<'a> {
    tree: &'a CssTree,
    current: Option<CssNodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = CssNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_child_sets_parent_pointer() {
        let mut tree = CssTree::new(Span::synthetic());
        let decl = tree.alloc(
            CssNode::Declaration { name: "color".into(), value: "red".into(), is_custom_property: false },
            Span::synthetic(),
        );
        tree.append_child(tree.root(), decl);
        assert_eq!(tree.parent(decl), Some(tree.root()));
        assert_eq!(tree.children(tree.root()), &[decl]);
    }

    #[test]
    fn descendants_visit_in_document_order() {
        let mut tree = CssTree::new(Span::synthetic());
        let rule = tree.alloc(CssNode::StyleRule { selector: SelectorList::empty() }, Span::synthetic());
        tree.append_child(tree.root(), rule);
        let a = tree.alloc(
            CssNode::Declaration { name: "a".into(), value: "1".into(), is_custom_property: false },
            Span::synthetic(),
        );
        let b = tree.alloc(
            CssNode::Declaration { name: "b".into(), value: "2".into(), is_custom_property: false },
            Span::synthetic(),
        );
        tree.append_child(rule, a);
        tree.append_child(rule, b);

        let order: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![rule, a, b]);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let mut tree = CssTree::new(Span::synthetic());
        let rule = tree.alloc(CssNode::StyleRule { selector: SelectorList::empty() }, Span::synthetic());
        tree.append_child(tree.root(), rule);
        let decl = tree.alloc(
            CssNode::Declaration { name: "a".into(), value: "1".into(), is_custom_property: false },
            Span::synthetic(),
        );
        tree.append_child(rule, decl);

        let ancestors: Vec<_> = tree.ancestors(decl).collect();
        assert_eq!(ancestors, vec![rule, tree.root()]);
    }
}
