//! The tree-walking evaluator (spec §4.4): turns a Sass AST into a
//! plain-CSS tree.

mod args;
pub mod builtins;
mod color_literal;
mod expr;
mod stmt;

use std::rc::Rc;

use sass_ast::Stylesheet;
use sass_common::{ErrorKind, Logger, SassError, SassResult, Span, StackFrame};

use crate::env::{Environment, Importer, ModuleGraph};
use crate::selector::Extensions;
use sass_ast::{CssNodeId, CssTree};

/// Recursion guard for mixin/function calls and `@each`/`@for`/`@while`
/// bodies, catching runaway recursion before the process exhausts its
/// stack (spec §4.4 edge case "unbounded recursion").
const MAX_CALL_DEPTH: usize = 1000;

/// A captured `@content` block: the statements inside an `@include
/// ... { }` block, plus the environment they close over at the call
/// site (spec §4.4's `@content` semantics - content always sees the
/// scope where the `@include` was written, not the mixin's own scope).
#[derive(Clone)]
pub(crate) struct ContentBlock {
    pub body: Rc<[sass_ast::Statement]>,
    pub env: Environment,
}

/// The tree-walking evaluator. One instance evaluates one entrypoint
/// stylesheet (and, transitively, everything it `@use`s/`@forward`s/
/// `@import`s) into a single plain-CSS tree.
pub struct Evaluator {
    pub(crate) logger: Rc<dyn Logger>,
    pub(crate) tree: CssTree,
    pub(crate) extensions: Extensions,
    pub(crate) call_stack: Vec<StackFrame>,
    pub(crate) depth: usize,
    /// The selector of the innermost enclosing style rule, for `&`
    /// resolution. `None` at the stylesheet's top level.
    pub(crate) current_selector: Option<sass_ast::SelectorList>,
    /// The `@content` block available to the innermost mixin body being
    /// evaluated, if any.
    pub(crate) content_stack: Vec<Option<ContentBlock>>,
    /// Resolves `@use`/`@forward`/`@import` URLs to loaded stylesheets
    /// (spec §4.3). `None` means this compilation has nothing to load
    /// from, so those directives degrade to a no-op.
    pub(crate) importer: Option<Rc<dyn Importer>>,
    /// Cache of already-loaded modules, shared across every `@use`/
    /// `@forward`/`@import` this compilation encounters (spec §4.3:
    /// "each canonical URL is loaded and evaluated exactly once").
    pub(crate) module_graph: Rc<ModuleGraph>,
}

impl Evaluator {
    /// Build a fresh evaluator that will log `@warn`/`@debug` output
    /// through `logger`, with no importer configured (`@use`/
    /// `@forward`/`@import` are no-ops).
    #[must_use]
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self::with_importer(logger, None)
    }

    /// Build a fresh evaluator that resolves `@use`/`@forward`/`@import`
    /// through `importer` (spec §4.3/§4.4).
    #[must_use]
    pub fn with_importer(logger: Rc<dyn Logger>, importer: Option<Rc<dyn Importer>>) -> Self {
        Self {
            logger,
            tree: CssTree::new(Span::synthetic()),
            extensions: Extensions::new(),
            call_stack: Vec::new(),
            depth: 0,
            current_selector: None,
            content_stack: Vec::new(),
            importer,
            module_graph: Rc::new(ModuleGraph::new()),
        }
    }

    /// Evaluate a full stylesheet, producing the plain-CSS tree. This
    /// consumes the evaluator since it owns the one tree being built;
    /// compiling multiple entrypoints means constructing multiple
    /// evaluators (each `@use` import is handled by evaluating the
    /// imported module's own statements into the current tree/env, not
    /// by nesting evaluators).
    pub fn compile(mut self, stylesheet: &Stylesheet) -> SassResult<CssTree> {
        let env = Environment::new();
        let root = self.tree.root();
        self.exec_block(&stylesheet.statements, &env, root)?;
        self.extensions.check_all_matched()?;
        self.apply_extends()?;
        Ok(self.tree)
    }

    /// Rewrite every style rule's selector in place using the
    /// registered `@extend`s, now that the whole stylesheet (and hence
    /// every extension) has been collected.
    fn apply_extends(&mut self) -> SassResult<()> {
        let ids: Vec<_> = self.tree.iter_all().collect();
        for id in ids {
            let needs_extend = matches!(
                self.tree.get(id).map(|n| &n.node),
                Some(sass_ast::CssNode::StyleRule { .. })
            );
            if !needs_extend {
                continue;
            }
            let Some(sass_ast::CssNode::StyleRule { selector }) = self.tree.get(id).map(|n| n.node.clone()) else {
                continue;
            };
            if !crate::selector::has_any_target(&selector, &self.extensions) {
                continue;
            }
            let extended = crate::selector::extend(&selector, &self.extensions)?;
            self.tree.set_selector(id, extended);
        }
        Ok(())
    }

    /// Push a call-stack frame for the duration of a mixin/function
    /// invocation, enforcing [`MAX_CALL_DEPTH`].
    pub(crate) fn enter_call(&mut self, name: impl Into<String>, span: Span) -> SassResult<()> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(SassError::new(
                ErrorKind::InvalidArgument(format!("call depth exceeded {MAX_CALL_DEPTH}; likely infinite recursion")),
                span,
            ));
        }
        self.depth += 1;
        self.call_stack.push(StackFrame { name: name.into(), span });
        Ok(())
    }

    pub(crate) fn exit_call(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.call_stack.pop();
    }

    /// Attach the current call stack to an error as it propagates
    /// outward, matching the "errors carry the full call stack" policy.
    pub(crate) fn attach_stack(&self, mut err: SassError) -> SassError {
        for frame in self.call_stack.iter().rev() {
            err.call_stack.push(frame.clone());
        }
        err
    }
}
