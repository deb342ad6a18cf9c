//! `@use`/`@forward`/`@import` module-graph wiring, driven through a
//! tiny in-memory [`Importer`] (spec §4.3). Loaded modules are
//! JSON-serialized `Stylesheet`s, the same wire format `sass-cli` reads
//! from disk, since this workspace has no Sass-syntax parser (spec §1).

use std::collections::HashMap;
use std::rc::Rc;

use sass_ast::{ArgumentInvocation, Expression, Interpolation, InterpolationBuilder, ParameterList, Statement, Stylesheet, UseAlias};
use sass_common::{SilentLogger, Span};
use sass_core::{CompileOptions, Importer, LoadedSource, Style};

fn span() -> Span {
    Span::synthetic()
}

fn plain(text: &str) -> Interpolation {
    InterpolationBuilder::new().push_plain(text).build(span())
}

fn declaration(name: &str, value: Expression) -> Statement {
    Statement::Declaration { name: plain(name), value: Some(value), important: false, body: Vec::new(), span: span() }
}

fn color(text: &str) -> Expression {
    Expression::Color { text: text.to_string(), span: span() }
}

fn number(value: f64) -> Expression {
    Expression::Number { value, unit: None, span: span() }
}

/// Resolves URLs by exact match against a fixed table of already-JSON
/// stylesheets, standing in for a filesystem/package importer.
struct MapImporter {
    files: HashMap<String, String>,
}

impl Importer for MapImporter {
    fn canonicalize(&self, url: &str, _from: Option<&str>) -> Option<String> {
        self.files.contains_key(url).then(|| url.to_string())
    }

    fn load(&self, canonical_url: &str) -> sass_common::SassResult<LoadedSource> {
        Ok(LoadedSource { canonical_url: canonical_url.to_string(), contents: self.files[canonical_url].clone(), is_indented_syntax: false })
    }
}

fn run(statements: Vec<Statement>, importer: Option<Rc<dyn Importer>>) -> String {
    let stylesheet = Stylesheet { statements, source_url: None };
    let options = CompileOptions { style: Style::Expanded, ..CompileOptions::default() };
    sass_core::evaluate(&stylesheet, importer, Rc::new(SilentLogger), &options)
        .unwrap_or_else(|err| panic!("compilation failed: {err:?}"))
        .css
}

fn colors_module_json() -> String {
    let stylesheet = Stylesheet {
        statements: vec![
            Statement::VariableDecl { name: "primary".to_string(), value: color("blue"), is_default: false, is_global: false, span: span() },
            Statement::VariableDecl { name: "gutter".to_string(), value: number(8.0), is_default: true, is_global: false, span: span() },
            Statement::MixinDecl {
                name: "reset".to_string(),
                parameters: ParameterList::default(),
                body: vec![declaration("margin", number(0.0))],
                accepts_content: false,
                span: span(),
            },
        ],
        source_url: Some("colors".to_string()),
    };
    serde_json::to_string(&stylesheet).unwrap()
}

fn importer_with_colors_module() -> Option<Rc<dyn Importer>> {
    let mut files = HashMap::new();
    files.insert("colors".to_string(), colors_module_json());
    Some(Rc::new(MapImporter { files }))
}

#[test]
fn use_binds_namespaced_variable_and_mixin_access() {
    let statements = vec![
        Statement::Use { url: "colors".to_string(), alias: Some(UseAlias::Named("c".to_string())), configuration: Vec::new(), span: span() },
        Statement::StyleRule {
            selector: plain(".a"),
            body: vec![
                declaration("color", Expression::Variable { namespace: Some("c".to_string()), name: "primary".to_string(), span: span() }),
                Statement::Include {
                    namespace: Some("c".to_string()),
                    name: "reset".to_string(),
                    args: ArgumentInvocation::default(),
                    content_block: None,
                    span: span(),
                },
            ],
            span: span(),
        },
    ];

    let css = run(statements, importer_with_colors_module());
    assert!(css.contains("color: blue"), "{css}");
    assert!(css.contains("margin: 0"), "{css}");
}

#[test]
fn use_default_namespace_is_derived_from_the_url() {
    let statements = vec![
        Statement::Use { url: "colors".to_string(), alias: None, configuration: Vec::new(), span: span() },
        Statement::StyleRule {
            selector: plain(".a"),
            body: vec![declaration("color", Expression::Variable { namespace: Some("colors".to_string()), name: "primary".to_string(), span: span() })],
            span: span(),
        },
    ];

    let css = run(statements, importer_with_colors_module());
    assert!(css.contains("color: blue"), "{css}");
}

#[test]
fn use_with_configuration_overrides_default_variable() {
    let statements = vec![
        Statement::Use {
            url: "colors".to_string(),
            alias: Some(UseAlias::Named("c".to_string())),
            configuration: vec![("gutter".to_string(), number(16.0))],
            span: span(),
        },
        Statement::StyleRule {
            selector: plain(".a"),
            body: vec![declaration("padding", Expression::Variable { namespace: Some("c".to_string()), name: "gutter".to_string(), span: span() })],
            span: span(),
        },
    ];

    let css = run(statements, importer_with_colors_module());
    assert!(css.contains("padding: 16"), "{css}");
}

#[test]
fn use_configuring_a_non_default_variable_is_an_error() {
    let statements = vec![Statement::Use {
        url: "colors".to_string(),
        alias: None,
        configuration: vec![("primary".to_string(), color("red"))],
        span: span(),
    }];

    let stylesheet = Stylesheet { statements, source_url: None };
    let options = CompileOptions::default();
    let result = sass_core::evaluate(&stylesheet, importer_with_colors_module(), Rc::new(SilentLogger), &options);
    assert!(result.is_err());
}

#[test]
fn forward_reexports_members_with_a_prefix_into_the_forwarding_module() {
    let statements = vec![
        Statement::Forward { url: "colors".to_string(), prefix: Some("theme-".to_string()), visibility: None, configuration: Vec::new(), span: span() },
        Statement::StyleRule {
            selector: plain(".a"),
            body: vec![declaration("color", Expression::Variable { namespace: None, name: "theme-primary".to_string(), span: span() })],
            span: span(),
        },
    ];

    let css = run(statements, importer_with_colors_module());
    assert!(css.contains("color: blue"), "{css}");
}

#[test]
fn legacy_import_merges_members_unprefixed_and_unnamespaced() {
    let statements = vec![
        Statement::Import { targets: vec![plain("colors")], span: span() },
        Statement::StyleRule {
            selector: plain(".a"),
            body: vec![declaration("color", Expression::Variable { namespace: None, name: "primary".to_string(), span: span() })],
            span: span(),
        },
    ];

    let css = run(statements, importer_with_colors_module());
    assert!(css.contains("color: blue"), "{css}");
}

#[test]
fn use_without_an_importer_degrades_to_a_no_op() {
    let statements = vec![Statement::Use { url: "colors".to_string(), alias: Some(UseAlias::Named("c".to_string())), configuration: Vec::new(), span: span() }];
    let css = run(statements, None);
    assert_eq!(css, "");
}
