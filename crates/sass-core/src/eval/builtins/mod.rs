//! Built-in Sass functions (spec §4.1's value operations exposed as
//! callable functions, grouped the way the language documents them:
//! `math.*`, `color.*`, `list.*`, `map.*`, `string.*`, `meta.*`, plus
//! `selector.*`).
//!
//! Sass resolves `math.min(...)` and a bare legacy `min(...)` to the
//! same built-in; this evaluator doesn't track which module a call site
//! imported its namespace from (no `@use as` aliasing table is built),
//! so every built-in lives in one flat name table regardless of the
//! namespace it was called through. A name collision between modules
//! (there are none in the subset implemented here) would need that
//! table split by namespace; documented in the ledger as a
//! simplification rather than a missing feature.

mod color;
mod list;
mod map;
mod math;
mod meta;
mod selector;
mod string;

use indexmap::IndexMap;
use sass_ast::ArgumentInvocation;
use sass_common::{ErrorKind, SassError, SassResult, Span};

use super::Evaluator;
use crate::env::Environment;
use crate::value::{ListSeparator, SassList, Value};

/// Evaluated, still-unmatched call-site arguments for a built-in.
/// Unlike [`super::args::resolve_arguments`], there's no declared
/// [`sass_ast::ParameterList`] to bind against, so callers pull
/// arguments out positionally-or-by-name themselves via [`Args::get`].
pub(super) struct Args {
    positional: Vec<Value>,
    named: IndexMap<String, Value>,
    span: Span,
}

impl Args {
    /// The argument at positional index `index`, or named `name` if it
    /// wasn't supplied positionally.
    fn get(&mut self, index: usize, name: &str) -> Option<Value> {
        if let Some(v) = self.positional.get(index).cloned() {
            return Some(v);
        }
        self.named.shift_remove(name)
    }

    /// An argument that's only ever passed by name (the per-channel
    /// arguments to `color.change`/`color.adjust`/`color.scale`).
    fn named(&mut self, name: &str) -> Option<Value> {
        self.named.shift_remove(name)
    }

    /// Like [`Self::get`], but an absent argument is an error.
    fn required(&mut self, index: usize, name: &str, fn_name: &str) -> SassResult<Value> {
        self.get(index, name)
            .ok_or_else(|| SassError::new(ErrorKind::MissingArgument(format!("${name} in {fn_name}()")), self.span.clone()))
    }

    fn type_error(&self, message: impl Into<String>) -> SassError {
        SassError::new(ErrorKind::TypeError(message.into()), self.span.clone())
    }

    fn invalid_argument(&self, message: impl Into<String>) -> SassError {
        SassError::new(ErrorKind::InvalidArgument(message.into()), self.span.clone())
    }

    fn number(&self, value: Value, context: &str) -> SassResult<crate::value::Number> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(self.type_error(format!("{context} must be a number, was {}", other.to_css()))),
        }
    }

    fn string_text(&self, value: Value, context: &str) -> SassResult<String> {
        match value {
            Value::String(s) => Ok(s.as_str().to_string()),
            other => Err(self.type_error(format!("{context} must be a string, was {}", other.to_css()))),
        }
    }

    fn color(&self, value: Value, context: &str) -> SassResult<crate::value::Color> {
        match value {
            Value::Color(c) => Ok(c),
            other => Err(self.type_error(format!("{context} must be a color, was {}", other.to_css()))),
        }
    }

    fn list(&self, value: Value) -> SassList {
        match value {
            Value::List(list) => *list,
            Value::ArgList(args) => args.positional,
            other => SassList::new(vec![other], ListSeparator::Undecided, false),
        }
    }
}

impl Evaluator {
    /// Evaluate a call site's arguments without binding them against any
    /// declared parameter list, for dispatch to a built-in.
    fn eval_builtin_args(&mut self, args: &ArgumentInvocation, env: &Environment, span: &Span) -> SassResult<Args> {
        let mut positional = Vec::with_capacity(args.positional.len());
        for expr in &args.positional {
            positional.push(self.eval_expr(expr, env)?);
        }
        let mut named = IndexMap::new();
        for (name, expr) in &args.named {
            named.insert(name.clone(), self.eval_expr(expr, env)?);
        }
        if let Some(rest_expr) = &args.rest {
            match self.eval_expr(rest_expr, env)? {
                Value::List(list) => positional.extend(list.contents().iter().cloned()),
                Value::ArgList(arg_list) => {
                    positional.extend(arg_list.positional.contents().iter().cloned());
                    for (k, v) in &arg_list.keywords {
                        named.insert(k.clone(), v.clone());
                    }
                }
                other => positional.push(other),
            }
        }
        if let Some(kw_rest_expr) = &args.keyword_rest {
            if let Value::Map(map) = self.eval_expr(kw_rest_expr, env)? {
                for (k, v) in map.iter() {
                    if let Value::String(key) = k {
                        named.insert(key.as_str().to_string(), v.clone());
                    }
                }
            }
        }
        Ok(Args { positional, named, span: span.clone() })
    }

    /// Dispatch a call to a built-in function by name. Returns `Ok(None)`
    /// for a name this evaluator doesn't recognize, letting the caller
    /// fall back to rendering a plain-CSS function call.
    pub(crate) fn call_builtin_function(
        &mut self,
        name: &str,
        args: &ArgumentInvocation,
        env: &Environment,
        span: Span,
    ) -> SassResult<Option<Value>> {
        // `meta.call`/`variable-exists` etc. need the raw environment and
        // unevaluated invocation (to look up names before resolving
        // values), so meta dispatch happens before the shared
        // argument-evaluation pass the other modules use.
        if let Some(value) = meta::dispatch(self, name, args, env, &span)? {
            return Ok(Some(value));
        }
        let mut resolved = self.eval_builtin_args(args, env, &span)?;
        if let Some(value) = math::dispatch(name, &mut resolved)? {
            return Ok(Some(value));
        }
        if let Some(value) = color::dispatch(name, &mut resolved)? {
            return Ok(Some(value));
        }
        if let Some(value) = list::dispatch(name, &mut resolved)? {
            return Ok(Some(value));
        }
        if let Some(value) = map::dispatch(name, &mut resolved)? {
            return Ok(Some(value));
        }
        if let Some(value) = string::dispatch(name, &mut resolved)? {
            return Ok(Some(value));
        }
        if let Some(value) = selector::dispatch(name, &mut resolved, &span)? {
            return Ok(Some(value));
        }
        Ok(None)
    }
}
