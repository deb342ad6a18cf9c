//! Statement execution (spec §4.4): building the plain-CSS tree from
//! the Sass AST.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use sass_ast::{
    CompoundSelector, ComplexSelector, CssNode, CssNodeId, EachBinding, ForwardVisibility, IfClause, MediaQuery,
    SelectorList, SimpleSelector, Statement, Stylesheet, SupportsCondition, UseAlias,
};
use sass_common::{ErrorKind, SassError, SassResult, Span};

use super::{ContentBlock, Evaluator};
use crate::env::{Environment, Importer, Module, Visibility};
use crate::selector::{concat_complex, unify_compound, ExtendMode};
use crate::value::{Number, Value};

impl Evaluator {
    /// Execute a sequence of statements against `parent`, building
    /// whatever CSS nodes they produce.
    pub(crate) fn exec_block(&mut self, stmts: &[Statement], env: &Environment, parent: CssNodeId) -> SassResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt, env, parent)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Statement, env: &Environment, parent: CssNodeId) -> SassResult<()> {
        match stmt {
            Statement::VariableDecl { name, value, is_default, is_global, .. } => {
                let v = self.eval_expr(value, env)?;
                if *is_default {
                    env.set_default(name, v);
                } else if *is_global {
                    env.set_global(name.clone(), v);
                } else {
                    env.reassign(name, v);
                }
                Ok(())
            }
            Statement::StyleRule { selector, body, span } => self.exec_style_rule(selector, body, env, parent, span.clone()),
            Statement::AtRule { name, value, body, span } => self.exec_at_rule(name, value, body.as_deref(), env, parent, span.clone()),
            Statement::Declaration { name, value, important, body, span } => {
                self.exec_declaration(name, value.as_ref(), *important, body, env, parent, span.clone(), None)
            }
            Statement::FunctionDecl { name, parameters: _, body: _, .. } => {
                env.declare_function(name.clone(), Rc::new(stmt.clone()));
                Ok(())
            }
            Statement::MixinDecl { name, .. } => {
                env.declare_mixin(name.clone(), Rc::new(stmt.clone()));
                Ok(())
            }
            Statement::Include { namespace, name, args, content_block, span } => {
                self.exec_include(namespace.as_deref(), name, args, content_block.as_deref(), env, parent, span.clone())
            }
            Statement::ContentBlock { span } => self.exec_content(env, parent, span.clone()),
            Statement::If { clauses, else_body, .. } => self.exec_if(clauses, else_body.as_deref(), env, parent),
            Statement::Each { bindings, list, body, span } => self.exec_each(bindings, list, body, env, parent, span.clone()),
            Statement::For { variable, from, to, inclusive, body, span } => {
                self.exec_for(variable, from, to, *inclusive, body, env, parent, span.clone())
            }
            Statement::While { condition, body, .. } => self.exec_while(condition, body, env, parent),
            Statement::Extend { selector, optional, span } => self.exec_extend(selector, *optional, env, span.clone()),
            Statement::AtRoot { query, body, span } => self.exec_at_root(query.as_ref(), body, env, parent, span.clone()),
            Statement::Media { query, body, span } => self.exec_media(query, body, env, parent, span.clone()),
            Statement::Supports { condition, body, span } => self.exec_supports(condition, body, env, parent, span.clone()),
            Statement::Import { targets, span } => {
                for target in targets {
                    let url = self.eval_interpolation(target, env)?;
                    let module = self.load_and_build_module(&url, &[], env, span)?;
                    merge_module_into_env(env, &module, &Visibility::All, "");
                }
                Ok(())
            }
            Statement::Use { url, alias, configuration, span } => {
                let module = self.load_and_build_module(url, configuration, env, span)?;
                match alias {
                    Some(UseAlias::Wildcard) => merge_module_into_env(env, &module, &Visibility::All, ""),
                    Some(UseAlias::Named(namespace)) => env.bind_module(namespace.clone(), module),
                    None => env.bind_module(default_namespace(url), module),
                }
                Ok(())
            }
            Statement::Forward { url, prefix, visibility, configuration, span } => {
                let module = self.load_and_build_module(url, configuration, env, span)?;
                let vis = match visibility {
                    Some(ForwardVisibility::Show(names)) => Visibility::Show(names.iter().cloned().collect()),
                    Some(ForwardVisibility::Hide(names)) => Visibility::Hide(names.iter().cloned().collect()),
                    None => Visibility::All,
                };
                merge_module_into_env(env, &module, &vis, prefix.as_deref().unwrap_or(""));
                Ok(())
            }
            Statement::Return { span, .. } => Err(SassError::new(
                ErrorKind::InvalidNesting("@return is only allowed inside a function body".to_string()),
                span.clone(),
            )),
            Statement::Warn { message, span } => {
                let v = self.eval_expr(message, env)?;
                let stack: Vec<String> = self.call_stack.iter().map(|f| f.name.clone()).collect();
                self.logger.warn(&v.to_css(), span, &stack);
                Ok(())
            }
            Statement::Error { message, span } => {
                let v = self.eval_expr(message, env)?;
                Err(SassError::new(ErrorKind::UserError(v.to_css()), span.clone()))
            }
            Statement::Debug { message, span } => {
                let v = self.eval_expr(message, env)?;
                self.logger.debug(&v.to_css(), span);
                Ok(())
            }
            Statement::LoudComment { text, span } => {
                self.tree_append(parent, CssNode::Comment { text: text.clone() }, span.clone());
                Ok(())
            }
            Statement::SilentComment { .. } => Ok(()),
        }
    }

    /// Execute statements inside a function body, returning the first
    /// `@return`ed value encountered, or `None` if control fell off the
    /// end without returning.
    pub(crate) fn exec_function_body(&mut self, stmts: &[Statement], env: &Environment) -> SassResult<Option<Value>> {
        for stmt in stmts {
            match stmt {
                Statement::Return { value, .. } => return Ok(Some(self.eval_expr(value, env)?)),
                Statement::VariableDecl { name, value, is_default, is_global, .. } => {
                    let v = self.eval_expr(value, env)?;
                    if *is_default {
                        env.set_default(name, v);
                    } else if *is_global {
                        env.set_global(name.clone(), v);
                    } else {
                        env.reassign(name, v);
                    }
                }
                Statement::If { clauses, else_body, .. } => {
                    if let Some(result) = self.exec_function_if(clauses, else_body.as_deref(), env)? {
                        return Ok(Some(result));
                    }
                }
                Statement::Each { bindings, list, body, span } => {
                    let list_value = self.eval_expr(list, env)?;
                    for item in list_value.as_list_contents() {
                        let loop_env = env.push_scope();
                        bind_each_names(&loop_env, bindings, item, span.clone());
                        if let Some(result) = self.exec_function_body(body, &loop_env)? {
                            return Ok(Some(result));
                        }
                    }
                }
                Statement::For { variable, from, to, inclusive, body, span } => {
                    let (start, end) = self.eval_for_bounds(from, to, env, span.clone())?;
                    let last = if *inclusive { end } else if start <= end { end - 1 } else { end + 1 };
                    let mut i = start;
                    loop {
                        let done = if start <= end { i > last } else { i < last };
                        if done {
                            break;
                        }
                        let loop_env = env.push_scope();
                        loop_env.set_local(variable.clone(), Value::Number(Number::unitless(i as f64)));
                        if let Some(result) = self.exec_function_body(body, &loop_env)? {
                            return Ok(Some(result));
                        }
                        if start <= end {
                            i += 1;
                        } else {
                            i -= 1;
                        }
                    }
                }
                Statement::While { condition, body, .. } => {
                    let mut guard = 0usize;
                    while self.eval_expr(condition, env)?.is_truthy() {
                        if let Some(result) = self.exec_function_body(body, env)? {
                            return Ok(Some(result));
                        }
                        guard += 1;
                        if guard > super::MAX_CALL_DEPTH * 10 {
                            return Err(SassError::new(
                                ErrorKind::InvalidArgument("@while loop did not terminate".to_string()),
                                Span::synthetic(),
                            ));
                        }
                    }
                }
                Statement::Warn { message, span } => {
                    let v = self.eval_expr(message, env)?;
                    let stack: Vec<String> = self.call_stack.iter().map(|f| f.name.clone()).collect();
                    self.logger.warn(&v.to_css(), span, &stack);
                }
                Statement::Error { message, span } => {
                    let v = self.eval_expr(message, env)?;
                    return Err(SassError::new(ErrorKind::UserError(v.to_css()), span.clone()));
                }
                Statement::Debug { message, span } => {
                    let v = self.eval_expr(message, env)?;
                    self.logger.debug(&v.to_css(), span);
                }
                Statement::FunctionDecl { name, .. } => env.declare_function(name.clone(), Rc::new(stmt.clone())),
                Statement::MixinDecl { name, .. } => env.declare_mixin(name.clone(), Rc::new(stmt.clone())),
                other => {
                    return Err(SassError::new(
                        ErrorKind::InvalidNesting(format!("{other:?} is not allowed inside a function body")),
                        other.span().clone(),
                    ));
                }
            }
        }
        Ok(None)
    }

    fn exec_function_if(&mut self, clauses: &[IfClause], else_body: Option<&[Statement]>, env: &Environment) -> SassResult<Option<Value>> {
        for clause in clauses {
            if self.eval_expr(&clause.condition, env)?.is_truthy() {
                let branch_env = env.push_scope();
                return self.exec_function_body(&clause.body, &branch_env);
            }
        }
        if let Some(body) = else_body {
            let branch_env = env.push_scope();
            return self.exec_function_body(body, &branch_env);
        }
        Ok(None)
    }

    fn eval_for_bounds(&mut self, from: &sass_ast::Expression, to: &sass_ast::Expression, env: &Environment, span: Span) -> SassResult<(i64, i64)> {
        let from_v = self.eval_expr(from, env)?;
        let to_v = self.eval_expr(to, env)?;
        let (Value::Number(a), Value::Number(b)) = (&from_v, &to_v) else {
            return Err(SassError::new(ErrorKind::TypeError("@for bounds must be numbers".to_string()), span));
        };
        Ok((a.value().round() as i64, b.value().round() as i64))
    }

    fn tree_append(&mut self, parent: CssNodeId, node: CssNode, span: Span) -> CssNodeId {
        let id = self.tree.alloc(node, span);
        self.tree.append_child(parent, id);
        id
    }

    fn exec_style_rule(&mut self, selector: &sass_ast::Interpolation, body: &[Statement], env: &Environment, parent: CssNodeId, span: Span) -> SassResult<()> {
        let text = self.eval_interpolation(selector, env)?;
        let parsed = crate::selector::parse(&text, span.clone())?;
        let resolved = match &self.current_selector {
            Some(outer) => nest_selectors(outer, &parsed),
            None => parsed,
        };
        let node_id = self.tree_append(parent, CssNode::StyleRule { selector: resolved.clone() }, span);
        let previous = self.current_selector.replace(resolved);
        self.exec_block(body, env, node_id)?;
        self.current_selector = previous;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn exec_declaration(
        &mut self,
        name: &sass_ast::Interpolation,
        value: Option<&sass_ast::Expression>,
        important: bool,
        body: &[Statement],
        env: &Environment,
        parent: CssNodeId,
        span: Span,
        name_prefix: Option<&str>,
    ) -> SassResult<()> {
        let mut resolved_name = self.eval_interpolation(name, env)?;
        if let Some(prefix) = name_prefix {
            resolved_name = format!("{prefix}-{resolved_name}");
        }
        let is_custom_property = resolved_name.starts_with("--");
        if let Some(value_expr) = value {
            let v = self.eval_expr(value_expr, env)?;
            if !matches!(v, Value::Null) {
                let mut css = v.to_css();
                if important {
                    css.push_str(" !important");
                }
                self.tree_append(parent, CssNode::Declaration { name: resolved_name.clone(), value: css, is_custom_property }, span);
            }
        }
        for nested in body {
            if let Statement::Declaration { name: nested_name, value: nested_value, important: nested_important, body: nested_body, span: nested_span } = nested {
                self.exec_declaration(nested_name, nested_value.as_ref(), *nested_important, nested_body, env, parent, nested_span.clone(), Some(&resolved_name))?;
            }
        }
        Ok(())
    }

    fn exec_at_rule(
        &mut self,
        name: &str,
        value: &sass_ast::Interpolation,
        body: Option<&[Statement]>,
        env: &Environment,
        parent: CssNodeId,
        span: Span,
    ) -> SassResult<()> {
        let text = self.eval_interpolation(value, env)?;
        let has_block = body.is_some();
        let node_id = self.tree_append(parent, CssNode::AtRule { name: name.to_string(), value: text, has_block }, span);
        if let Some(body) = body {
            self.exec_block(body, env, node_id)?;
        }
        Ok(())
    }

    fn exec_include(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        args: &sass_ast::ArgumentInvocation,
        content_block: Option<&[Statement]>,
        env: &Environment,
        parent: CssNodeId,
        span: Span,
    ) -> SassResult<()> {
        let decl = match namespace {
            Some(ns) => {
                let module = env
                    .module(ns)
                    .ok_or_else(|| SassError::new(ErrorKind::UndefinedMixin(format!("{ns}.{name}")), span.clone()))?;
                module
                    .mixins
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SassError::new(ErrorKind::UndefinedMixin(format!("{ns}.{name}")), span.clone()))?
            }
            None => env.mixin(name).ok_or_else(|| SassError::new(ErrorKind::UndefinedMixin(name.to_string()), span.clone()))?,
        };
        let Statement::MixinDecl { parameters, body, accepts_content, .. } = decl.as_ref() else {
            return Err(SassError::new(ErrorKind::UndefinedMixin(name.to_string()), span));
        };
        if content_block.is_some() && !accepts_content {
            return Err(SassError::new(
                ErrorKind::InvalidNesting(format!("mixin {name} does not accept a content block")),
                span,
            ));
        }
        let mixin_env = env.push_scope();
        let bindings = self.resolve_arguments(parameters, args, env, &mixin_env, span.clone())?;
        self.enter_call(name.to_string(), span)?;
        for (param_name, value) in bindings {
            mixin_env.set_local(param_name, value);
        }
        let content = content_block.map(|body| ContentBlock { body: Rc::from(body.to_vec()), env: env.clone() });
        self.content_stack.push(content);
        let result = self.exec_block(body, &mixin_env, parent);
        self.content_stack.pop();
        self.exit_call();
        result.map_err(|e| self.attach_stack(e))
    }

    /// Resolve and load `url` through the configured [`Importer`],
    /// evaluating its body (with `configuration` applied to its
    /// `!default` variables first) exactly once per canonical URL and
    /// caching the result in the module graph (spec §4.3). With no
    /// importer configured, returns an empty module so `@use`/
    /// `@forward`/`@import` degrade to a no-op rather than erroring.
    fn load_and_build_module(
        &mut self,
        url: &str,
        configuration: &[(String, sass_ast::Expression)],
        calling_env: &Environment,
        span: &Span,
    ) -> SassResult<Rc<Module>> {
        let Some(importer) = self.importer.clone() else {
            return Ok(Rc::new(Module::new(url)));
        };
        let canonical = importer
            .canonicalize(url, None)
            .ok_or_else(|| SassError::new(ErrorKind::ImportNotFound(url.to_string()), span.clone()))?;
        if let Some(cached) = self.module_graph.get(&canonical) {
            if configuration.is_empty() {
                return Ok(cached);
            }
            return Err(SassError::new(
                ErrorKind::InvalidArgument(format!("{canonical} was already loaded, so it can no longer be configured")),
                span.clone(),
            ));
        }
        self.module_graph.start_loading(&canonical)?;
        let built = self.load_and_build_module_inner(importer.as_ref(), &canonical, configuration, calling_env, span);
        self.module_graph.finish_loading(&canonical);
        let module = Rc::new(built?);
        self.module_graph.insert(canonical, module.clone());
        Ok(module)
    }

    fn load_and_build_module_inner(
        &mut self,
        importer: &dyn Importer,
        canonical: &str,
        configuration: &[(String, sass_ast::Expression)],
        calling_env: &Environment,
        span: &Span,
    ) -> SassResult<Module> {
        let loaded = importer.load(canonical)?;
        let stylesheet: Stylesheet = serde_json::from_str(&loaded.contents)
            .map_err(|err| SassError::new(ErrorKind::SyntaxError(format!("{canonical}: {err}")), span.clone()))?;
        let configurable = collect_configurable(&stylesheet.statements);
        let mut config_values = IndexMap::new();
        for (name, expr) in configuration {
            if !configurable.contains(name) {
                return Err(SassError::new(
                    ErrorKind::InvalidArgument(format!("{name} is not a configurable variable in {canonical}")),
                    span.clone(),
                ));
            }
            let value = self.eval_expr(expr, calling_env)?;
            config_values.insert(name.clone(), value);
        }
        let module_env = Environment::new();
        for (name, value) in &config_values {
            module_env.set_local(name.clone(), value.clone());
        }
        let root = self.tree.root();
        self.exec_block(&stylesheet.statements, &module_env, root)?;
        let mut module = module_env.snapshot_module(canonical.to_string());
        module.configurable = configurable;
        Ok(module)
    }

    fn exec_content(&mut self, _env: &Environment, parent: CssNodeId, span: Span) -> SassResult<()> {
        let Some(Some(content)) = self.content_stack.last().cloned() else {
            return Err(SassError::new(ErrorKind::ContentOutsideMixin, span));
        };
        let body = content.body.to_vec();
        self.exec_block(&body, &content.env, parent)
    }

    fn exec_if(&mut self, clauses: &[IfClause], else_body: Option<&[Statement]>, env: &Environment, parent: CssNodeId) -> SassResult<()> {
        for clause in clauses {
            if self.eval_expr(&clause.condition, env)?.is_truthy() {
                let branch_env = env.push_scope();
                return self.exec_block(&clause.body, &branch_env, parent);
            }
        }
        if let Some(body) = else_body {
            let branch_env = env.push_scope();
            return self.exec_block(body, &branch_env, parent);
        }
        Ok(())
    }

    fn exec_each(&mut self, bindings: &EachBinding, list: &sass_ast::Expression, body: &[Statement], env: &Environment, parent: CssNodeId, span: Span) -> SassResult<()> {
        let list_value = self.eval_expr(list, env)?;
        for item in list_value.as_list_contents() {
            let loop_env = env.push_scope();
            bind_each_names(&loop_env, bindings, item, span.clone());
            self.exec_block(body, &loop_env, parent)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn exec_for(
        &mut self,
        variable: &str,
        from: &sass_ast::Expression,
        to: &sass_ast::Expression,
        inclusive: bool,
        body: &[Statement],
        env: &Environment,
        parent: CssNodeId,
        span: Span,
    ) -> SassResult<()> {
        let (start, end) = self.eval_for_bounds(from, to, env, span)?;
        let last = if inclusive { end } else if start <= end { end - 1 } else { end + 1 };
        let mut i = start;
        loop {
            let done = if start <= end { i > last } else { i < last };
            if done {
                break;
            }
            let loop_env = env.push_scope();
            loop_env.set_local(variable.to_string(), Value::Number(Number::unitless(i as f64)));
            self.exec_block(body, &loop_env, parent)?;
            if start <= end {
                i += 1;
            } else {
                i -= 1;
            }
        }
        Ok(())
    }

    fn exec_while(&mut self, condition: &sass_ast::Expression, body: &[Statement], env: &Environment, parent: CssNodeId) -> SassResult<()> {
        let mut guard = 0usize;
        while self.eval_expr(condition, env)?.is_truthy() {
            self.exec_block(body, env, parent)?;
            guard += 1;
            if guard > super::MAX_CALL_DEPTH * 10 {
                return Err(SassError::new(
                    ErrorKind::InvalidArgument("@while loop did not terminate".to_string()),
                    Span::synthetic(),
                ));
            }
        }
        Ok(())
    }

    fn exec_extend(&mut self, selector: &sass_ast::Interpolation, optional: bool, env: &Environment, span: Span) -> SassResult<()> {
        let Some(current) = self.current_selector.clone() else {
            return Err(SassError::new(
                ErrorKind::InvalidNesting("@extend may only be used inside a style rule".to_string()),
                span,
            ));
        };
        let text = self.eval_interpolation(selector, env)?;
        let target_list = crate::selector::parse(&text, span.clone())?;
        for complex in &target_list.complexes {
            if complex.components.len() != 1 || complex.components[0].simples.len() != 1 {
                return Err(SassError::new(
                    ErrorKind::InvalidSelector("@extend target must be a single simple selector".to_string()),
                    span.clone(),
                ));
            }
            let target = complex.components[0].simples[0].clone();
            let mode = if optional { ExtendMode::Optional } else { ExtendMode::Normal };
            self.extensions.add(target, current.clone(), mode, span.clone());
        }
        Ok(())
    }

    /// `@at-root`: lift `body` out to the stylesheet root, escaping any
    /// enclosing style rule. A query expression (`@at-root (with: ...)`)
    /// would let callers keep some ancestor contexts (e.g. `@media`);
    /// this always escapes all of them, the common case of a bare
    /// `@at-root { ... }`.
    fn exec_at_root(&mut self, query: Option<&sass_ast::Expression>, body: &[Statement], env: &Environment, parent: CssNodeId, span: Span) -> SassResult<()> {
        let _ = (query, parent, span);
        let root = self.tree.root();
        let previous_selector = self.current_selector.take();
        let result = self.exec_block(body, env, root);
        self.current_selector = previous_selector;
        result
    }

    fn exec_media(&mut self, query: &sass_ast::Interpolation, body: &[Statement], env: &Environment, parent: CssNodeId, span: Span) -> SassResult<()> {
        let text = self.eval_interpolation(query, env)?;
        let queries = vec![MediaQuery { text }];
        let node_id = self.tree_append(parent, CssNode::Media { queries }, span);
        self.exec_block(body, env, node_id)
    }

    fn exec_supports(&mut self, condition: &SupportsCondition, body: &[Statement], env: &Environment, parent: CssNodeId, span: Span) -> SassResult<()> {
        let text = self.supports_condition_to_css(condition, env)?;
        let node_id = self.tree_append(parent, CssNode::Supports { condition: text }, span);
        self.exec_block(body, env, node_id)
    }

    pub(crate) fn supports_condition_to_css(&mut self, condition: &SupportsCondition, env: &Environment) -> SassResult<String> {
        Ok(match condition {
            SupportsCondition::Declaration { name, value } => {
                format!("({}: {})", self.eval_interpolation(name, env)?, self.eval_interpolation(value, env)?)
            }
            SupportsCondition::Function { name, args } => format!("{name}({})", self.eval_interpolation(args, env)?),
            SupportsCondition::Not(inner) => format!("not {}", self.supports_condition_to_css(inner, env)?),
            SupportsCondition::And(parts) => {
                let mut rendered = Vec::with_capacity(parts.len());
                for p in parts {
                    rendered.push(self.supports_condition_to_css(p, env)?);
                }
                rendered.join(" and ")
            }
            SupportsCondition::Or(parts) => {
                let mut rendered = Vec::with_capacity(parts.len());
                for p in parts {
                    rendered.push(self.supports_condition_to_css(p, env)?);
                }
                rendered.join(" or ")
            }
            SupportsCondition::Paren(inner) => format!("({})", self.supports_condition_to_css(inner, env)?),
            SupportsCondition::Interpolated(interp) => self.eval_interpolation(interp, env)?,
        })
    }
}

/// Collect the names of every top-level `!default` variable, the set a
/// `@use ... with (...)`/`@forward ... with (...)` configuration is
/// allowed to override (spec §4.3).
fn collect_configurable(statements: &[Statement]) -> HashSet<String> {
    statements
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::VariableDecl { name, is_default: true, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// `@use`'s default namespace when no `as ...` clause is given: the
/// URL's final path segment, minus its extension and any leading
/// partial-file underscore.
fn default_namespace(url: &str) -> String {
    let base = url.rsplit('/').next().unwrap_or(url);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    stem.strip_prefix('_').unwrap_or(stem).to_string()
}

/// Bind a loaded module's members directly into `env`'s current scope,
/// applying a visibility filter and name prefix (`@forward`'s own
/// semantics, and `@use as *`/legacy `@import`'s unprefixed merge).
fn merge_module_into_env(env: &Environment, module: &Module, visibility: &Visibility, prefix: &str) {
    for (name, value) in &module.variables {
        if visibility.allows(name) {
            env.set_local(format!("{prefix}{name}"), value.clone());
        }
    }
    for (name, decl) in &module.functions {
        if visibility.allows(name) {
            env.declare_function(format!("{prefix}{name}"), decl.clone());
        }
    }
    for (name, decl) in &module.mixins {
        if visibility.allows(name) {
            env.declare_mixin(format!("{prefix}{name}"), decl.clone());
        }
    }
}

fn bind_each_names(env: &Environment, bindings: &EachBinding, item: Value, span: Span) {
    let _ = span;
    if bindings.names.len() == 1 {
        env.set_local(bindings.names[0].clone(), item);
        return;
    }
    let parts = item.as_list_contents();
    for (i, name) in bindings.names.iter().enumerate() {
        env.set_local(name.clone(), parts.get(i).cloned().unwrap_or(Value::Null));
    }
}

/// Resolve `&` references in `inner` against the enclosing `outer`
/// selector list, producing the cartesian combination of every outer
/// complex selector with every inner one (spec §4.4's nesting
/// algorithm). A compound made up solely of `&` splices the whole outer
/// complex selector in; a compound mixing `&` with other simple
/// selectors (`&.active`) unifies the outer selector's trailing compound
/// with the rest of that compound instead.
fn nest_selectors(outer: &SelectorList, inner: &SelectorList) -> SelectorList {
    let mut complexes = Vec::new();
    for inner_complex in &inner.complexes {
        if !inner_complex.has_parent_ref() {
            for outer_complex in &outer.complexes {
                complexes.push(concat_complex(outer_complex, inner_complex));
            }
            continue;
        }
        for outer_complex in &outer.complexes {
            if let Some(spliced) = splice_parent_refs(outer_complex, inner_complex) {
                complexes.push(spliced);
            }
        }
    }
    SelectorList::new(complexes)
}

fn splice_parent_refs(outer: &ComplexSelector, inner: &ComplexSelector) -> Option<ComplexSelector> {
    let mut components = Vec::new();
    let mut combinators = Vec::new();
    for (i, compound) in inner.components.iter().enumerate() {
        if i > 0 {
            combinators.push(inner.combinators[i - 1]);
        }
        if compound.has_parent_ref() {
            if compound.simples.len() == 1 {
                if !components.is_empty() {
                    combinators.pop();
                }
                for (j, outer_compound) in outer.components.iter().enumerate() {
                    if j > 0 {
                        combinators.push(outer.combinators[j - 1]);
                    }
                    components.push(outer_compound.clone());
                }
            } else {
                let remainder = CompoundSelector::new(compound.simples.iter().filter(|s| !matches!(s, SimpleSelector::Parent)).cloned().collect());
                let outer_last = outer.components.last()?;
                let unified = unify_compound(outer_last, &remainder)?;
                if !components.is_empty() {
                    combinators.pop();
                }
                for (j, outer_compound) in outer.components[..outer.components.len() - 1].iter().enumerate() {
                    if j > 0 {
                        combinators.push(outer.combinators[j - 1]);
                    }
                    components.push(outer_compound.clone());
                }
                if outer.components.len() > 1 {
                    combinators.push(outer.combinators[outer.components.len() - 2]);
                }
                components.push(unified);
            }
        } else {
            components.push(compound.clone());
        }
    }
    Some(ComplexSelector::new(components, combinators))
}
