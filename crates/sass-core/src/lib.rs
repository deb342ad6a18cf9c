//! The Sass-to-CSS evaluation core (spec §1/§2): the value system, the
//! selector/extend engine, the lexical environment and module graph,
//! the tree-walking evaluator, and the serializer.
//!
//! # Scope
//!
//! This crate starts from an already-built [`sass_ast::Stylesheet`] —
//! parsing Sass source text is an external collaborator the spec
//! explicitly places out of scope (§1: "the core consumes an
//! already-built Sass AST"). [`evaluate`] is the library boundary
//! described in §4.4 and §6.1, minus the `compile_string`/`compile_file`
//! convenience wrappers that would need that parser to exist.

/// Lexical scoping and the `@use`/`@forward`/`@import` module graph
/// (spec §4.3).
pub mod env;
/// The tree-walking evaluator (spec §4.4).
pub mod eval;
/// The selector model's algorithms: matching, unification, `@extend`
/// (spec §4.2).
pub mod selector;
/// CSS text and source-map emission (spec §4.5, §6.3).
pub mod serialize;
/// The SassScript runtime value lattice (spec §4.1).
pub mod value;

use std::rc::Rc;

use sass_ast::Stylesheet;
use sass_common::{Logger, SassResult};

pub use env::{Environment, Importer, LoadedSource, ModuleGraph};
pub use eval::Evaluator;
pub use serialize::{SerializeOptions, SourceMap, Style};
pub use value::Value;

/// The two surface syntaxes `@use`/`@import` can load, and `css` for a
/// plain-CSS import with no Sass features (spec §6.1). Parsing itself
/// is out of scope here; this only tags which grammar an already-built
/// [`Stylesheet`] was parsed under, for diagnostics and `@import`'s
/// plain-CSS passthrough rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Brace-delimited SCSS.
    Scss,
    /// Indentation-based "indented" syntax.
    Indented,
    /// Plain CSS (no Sass features; `@import` of one is passed through
    /// as a literal CSS `@import` rather than inlined).
    Css,
}

/// Options controlling one [`evaluate`] call (spec §6.1/§6.2's
/// compilation options, minus the parser/importer/load-path concerns
/// that belong to an outer layer).
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// The entry stylesheet's surface syntax.
    pub syntax: Syntax,
    /// Expanded vs. compressed output (spec §4.5).
    pub style: Style,
    /// Whether to build a source map alongside the CSS text.
    pub source_map_enabled: bool,
    /// Whether to prepend `@charset`/a BOM for non-ASCII output.
    pub charset: bool,
    /// The source file name recorded in error spans and the source map.
    pub file_name: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { syntax: Syntax::Scss, style: Style::Expanded, source_map_enabled: false, charset: true, file_name: None }
    }
}

/// The result of one successful compilation (spec §6.1).
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// The rendered CSS text.
    pub css: String,
    /// The source map, if [`CompileOptions::source_map_enabled`] was set.
    pub source_map: Option<SourceMap>,
}

/// Evaluate an already-parsed stylesheet into CSS text (spec §4.4's
/// `evaluate(stylesheet, importer, logger, source_map_enabled) →
/// (CssStylesheet, extension_context, source_map?)`, composed with the
/// serializer so callers get rendered text in one call).
///
/// `@use`/`@forward`/legacy `@import` load through `importer`: the
/// loaded source is expected to be a JSON-serialized [`Stylesheet`]
/// (the same wire format `sass-cli` reads for its own inputs), since
/// turning Sass source text back into an AST needs a parser that is out
/// of scope per spec §1. Pass `None` when the compilation has nothing
/// to load from a module graph (those directives then evaluate as a
/// no-op) — see `DESIGN.md`.
///
/// # Errors
///
/// Returns any [`sass_common::SassError`] raised while walking the
/// stylesheet (undefined variables, type errors, a never-matched
/// `@extend`, an unresolvable `@use`/`@forward`/`@import` target, and
/// so on).
pub fn evaluate(
    stylesheet: &Stylesheet,
    importer: Option<Rc<dyn Importer>>,
    logger: Rc<dyn Logger>,
    options: &CompileOptions,
) -> SassResult<CompileResult> {
    let evaluator = Evaluator::with_importer(logger, importer);
    let tree = evaluator.compile(stylesheet)?;
    let serialize_options = SerializeOptions {
        style: options.style,
        charset: options.charset,
        source_map: options.source_map_enabled,
        file_name: options.file_name.clone(),
    };
    let (css, source_map) = serialize::serialize(&tree, &serialize_options);
    Ok(CompileResult { css, source_map })
}
