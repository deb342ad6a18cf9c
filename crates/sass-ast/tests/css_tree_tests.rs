//! Tests for `CssTree`'s arena mutation and traversal methods, mirroring
//! the teacher's `koala-dom` DOM-mutation test suite.

use sass_ast::selector::{CompoundSelector, ComplexSelector, SelectorList, SimpleSelector};
use sass_ast::{CssNode, CssNodeId, CssTree};
use sass_common::Span;

fn style_rule(tree: &mut CssTree, name: &str) -> CssNodeId {
    let compound = CompoundSelector::new(vec![SimpleSelector::Class(name.to_string())]);
    let selector = SelectorList::new(vec![ComplexSelector::single(compound)]);
    tree.alloc(CssNode::StyleRule { selector }, Span::synthetic())
}

fn declaration(tree: &mut CssTree, name: &str, value: &str) -> CssNodeId {
    tree.alloc(
        CssNode::Declaration { name: name.to_string(), value: value.to_string(), is_custom_property: false },
        Span::synthetic(),
    )
}

#[test]
fn append_child_sets_parent_and_ordering() {
    let mut tree = CssTree::new(Span::synthetic());
    let rule = style_rule(&mut tree, "a");
    tree.append_child(tree.root(), rule);
    let decl = declaration(&mut tree, "color", "red");
    tree.append_child(rule, decl);

    assert_eq!(tree.children(tree.root()), &[rule]);
    assert_eq!(tree.children(rule), &[decl]);
    assert_eq!(tree.parent(decl), Some(rule));
    assert_eq!(tree.parent(rule), Some(tree.root()));
}

#[test]
fn iter_all_visits_every_node_depth_first() {
    let mut tree = CssTree::new(Span::synthetic());
    let a = style_rule(&mut tree, "a");
    tree.append_child(tree.root(), a);
    let a_decl = declaration(&mut tree, "color", "red");
    tree.append_child(a, a_decl);
    let b = style_rule(&mut tree, "b");
    tree.append_child(tree.root(), b);

    let visited: Vec<_> = tree.iter_all().collect();
    assert_eq!(visited, vec![tree.root(), a, a_decl, b]);
}

#[test]
fn descendants_excludes_the_node_itself() {
    let mut tree = CssTree::new(Span::synthetic());
    let a = style_rule(&mut tree, "a");
    tree.append_child(tree.root(), a);
    let a_decl = declaration(&mut tree, "color", "red");
    tree.append_child(a, a_decl);

    let descendants: Vec<_> = tree.descendants(tree.root()).collect();
    assert_eq!(descendants, vec![a, a_decl]);
    assert!(tree.descendants(a_decl).next().is_none());
}

#[test]
fn ancestors_walk_up_to_the_root_nearest_first() {
    let mut tree = CssTree::new(Span::synthetic());
    let a = style_rule(&mut tree, "a");
    tree.append_child(tree.root(), a);
    let a_decl = declaration(&mut tree, "color", "red");
    tree.append_child(a, a_decl);

    let ancestors: Vec<_> = tree.ancestors(a_decl).collect();
    assert_eq!(ancestors, vec![a, tree.root()]);
}

#[test]
fn set_selector_rewrites_a_style_rule_in_place() {
    let mut tree = CssTree::new(Span::synthetic());
    let rule = style_rule(&mut tree, "a");
    tree.append_child(tree.root(), rule);

    let widened = SelectorList::new(vec![
        ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Class("a".to_string())])),
        ComplexSelector::single(CompoundSelector::new(vec![SimpleSelector::Class("b".to_string())])),
    ]);
    tree.set_selector(rule, widened.clone());

    let CssNode::StyleRule { selector } = &tree.get(rule).unwrap().node else {
        panic!("expected a style rule");
    };
    assert_eq!(selector, &widened);
}

#[test]
fn new_tree_has_only_the_root() {
    let tree = CssTree::new(Span::synthetic());
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.children(tree.root()), &[] as &[CssNodeId]);
}
