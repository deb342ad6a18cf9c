//! End-to-end tests driving `sass_core::evaluate` against hand-built
//! ASTs, covering the scenarios spec.md §8 calls out explicitly. There
//! is no parser in this workspace (spec §1), so each test builds the
//! `Stylesheet` it compiles directly rather than from SCSS source text.

use std::rc::Rc;

use sass_ast::{ArgumentInvocation, EachBinding, Expression, Interpolation, InterpolationBuilder, Statement, Stylesheet};
use sass_common::{SilentLogger, Span};
use sass_core::{CompileOptions, Style};

fn span() -> Span {
    Span::synthetic()
}

fn plain(text: &str) -> Interpolation {
    InterpolationBuilder::new().push_plain(text).build(span())
}

fn run(statements: Vec<Statement>) -> String {
    let stylesheet = Stylesheet { statements, source_url: None };
    let options = CompileOptions { style: Style::Expanded, ..CompileOptions::default() };
    sass_core::evaluate(&stylesheet, None, Rc::new(SilentLogger), &options)
        .unwrap_or_else(|err| panic!("compilation failed: {err:?}"))
        .css
}

fn declaration(name: &str, value: Expression) -> Statement {
    Statement::Declaration { name: plain(name), value: Some(value), important: false, body: Vec::new(), span: span() }
}

fn color(text: &str) -> Expression {
    Expression::Color { text: text.to_string(), span: span() }
}

/// Scenario 1 (spec §8): `&` rewriting for a plain nested rule, `&:hover`,
/// and a nested rule whose selector appears *before* `&`.
#[test]
fn nesting_rewrites_parent_selector_in_every_position() {
    let hover_rule = Statement::StyleRule {
        selector: plain("&:hover"),
        body: vec![declaration("color", color("blue"))],
        span: span(),
    };
    let before_rule = Statement::StyleRule {
        selector: plain(".b &"),
        body: vec![declaration("color", color("green"))],
        span: span(),
    };
    let root_rule = Statement::StyleRule {
        selector: plain(".a"),
        body: vec![declaration("color", color("red")), hover_rule, before_rule],
        span: span(),
    };

    let css = run(vec![root_rule]);
    assert!(css.contains(".a {\n  color: red;\n}"), "got:\n{css}");
    assert!(css.contains(".a:hover {\n  color: blue;\n}"), "got:\n{css}");
    assert!(css.contains(".b .a {\n  color: green;\n}"), "got:\n{css}");
}

/// Scenario 2 (spec §8): two rules extending the same placeholder merge
/// into one selector list on the placeholder's own rule; each extending
/// rule keeps its own declarations under its own, un-widened selector.
#[test]
fn extend_merges_onto_the_placeholder_rule() {
    let placeholder_rule = Statement::StyleRule {
        selector: plain("%btn"),
        body: vec![declaration("padding", Expression::Number { value: 4.0, unit: Some("px".to_string()), span: span() })],
        span: span(),
    };
    let primary_rule = Statement::StyleRule {
        selector: plain(".primary"),
        body: vec![
            Statement::Extend { selector: plain("%btn"), optional: false, span: span() },
            declaration("color", color("red")),
        ],
        span: span(),
    };
    let secondary_rule = Statement::StyleRule {
        selector: plain(".secondary"),
        body: vec![Statement::Extend { selector: plain("%btn"), optional: false, span: span() }],
        span: span(),
    };

    let css = run(vec![placeholder_rule, primary_rule, secondary_rule]);
    assert!(css.contains(".primary, .secondary {\n  padding: 4px;\n}"), "got:\n{css}");
    assert!(css.contains(".primary {\n  color: red;\n}"), "got:\n{css}");
    assert!(!css.contains("%btn"), "placeholder selector must never reach output:\n{css}");
}

/// Scenario 5 (spec §8): `@each $a, $b in <map>` destructures each
/// entry into two bindings and interpolates the key into the generated
/// selector.
#[test]
fn each_destructures_map_entries() {
    let map_expr = Expression::MapExpr {
        entries: vec![
            (Expression::Str { quoted: true, contents: plain("a"), span: span() }, Expression::Number { value: 1.0, unit: None, span: span() }),
            (Expression::Str { quoted: true, contents: plain("b"), span: span() }, Expression::Number { value: 2.0, unit: None, span: span() }),
        ],
        span: span(),
    };
    let mut selector_builder = InterpolationBuilder::new();
    selector_builder.push_plain(".").push_expr(Expression::Variable { namespace: None, name: "name".to_string(), span: span() });
    let inner_rule = Statement::StyleRule {
        selector: selector_builder.build(span()),
        body: vec![declaration("x", Expression::Variable { namespace: None, name: "val".to_string(), span: span() })],
        span: span(),
    };
    let each = Statement::Each {
        bindings: EachBinding { names: vec!["name".to_string(), "val".to_string()] },
        list: map_expr,
        body: vec![inner_rule],
        span: span(),
    };

    let css = run(vec![each]);
    assert!(css.contains(".a {\n  x: 1;\n}"), "got:\n{css}");
    assert!(css.contains(".b {\n  x: 2;\n}"), "got:\n{css}");
}

/// `meta.call` (a supplemental feature beyond spec.md's core scope,
/// added per SPEC_FULL.md) invokes a user function referenced via
/// `get-function` with fresh arguments, closing over the defining
/// scope rather than the call site's.
#[test]
fn meta_call_invokes_a_function_reference() {
    let double_fn = Statement::FunctionDecl {
        name: "double".to_string(),
        parameters: sass_ast::ParameterList {
            parameters: vec![sass_ast::Parameter { name: "n".to_string(), default: None, is_rest: false }],
        },
        body: vec![Statement::Return {
            value: Expression::Binary {
                op: sass_ast::BinaryOp::Multiply,
                left: Box::new(Expression::Variable { namespace: None, name: "n".to_string(), span: span() }),
                right: Box::new(Expression::Number { value: 2.0, unit: None, span: span() }),
                span: span(),
            },
            span: span(),
        }],
        span: span(),
    };

    let get_fn_args = ArgumentInvocation {
        positional: vec![Expression::Str { quoted: true, contents: plain("double"), span: span() }],
        ..ArgumentInvocation::default()
    };
    let get_fn_call =
        Expression::FunctionCall { namespace: Some("meta".to_string()), name: plain("get-function"), args: get_fn_args, span: span() };

    let call_args = ArgumentInvocation {
        positional: vec![get_fn_call, Expression::Number { value: 21.0, unit: None, span: span() }],
        ..ArgumentInvocation::default()
    };
    let call_expr = Expression::FunctionCall { namespace: Some("meta".to_string()), name: plain("call"), args: call_args, span: span() };

    let root_rule = Statement::StyleRule { selector: plain(".a"), body: vec![declaration("width", call_expr)], span: span() };

    let css = run(vec![double_fn, root_rule]);
    assert!(css.contains("width: 42"), "got:\n{css}");
}

/// `@extend`'s target must resolve against a real selector, so an
/// `@extend` that never matches anything in the stylesheet is an error
/// (spec §4.2's "a non-optional `@extend` with no matching selector is
/// a compile error").
#[test]
fn unmatched_required_extend_is_an_error() {
    let stylesheet = Stylesheet {
        statements: vec![Statement::StyleRule {
            selector: plain(".a"),
            body: vec![Statement::Extend { selector: plain(".never-declared"), optional: false, span: span() }],
            span: span(),
        }],
        source_url: None,
    };
    let options = CompileOptions::default();
    let result = sass_core::evaluate(&stylesheet, None, Rc::new(SilentLogger), &options);
    assert!(result.is_err());
}
