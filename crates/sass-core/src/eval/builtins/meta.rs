//! `meta.*` built-ins (spec §4.1 introspection: `type-of`/`inspect`/
//! `variable-exists`/`function-exists`/`mixin-exists`/`get-function`/
//! `call`).
//!
//! Unlike the other built-in groups, these need the raw environment and
//! (for `call`) access to the evaluator's own call machinery, so they
//! dispatch before arguments are eagerly evaluated into the generic
//! [`super::Args`] shape the other modules share.

use sass_ast::ArgumentInvocation;
use sass_common::{ErrorKind, SassError, SassResult, Span};

use super::super::Evaluator;
use crate::env::Environment;
use crate::value::{FunctionRef, SassString, Value};

fn nth_expr<'a>(args: &'a ArgumentInvocation, index: usize, name: &str, fn_name: &str, span: &Span) -> SassResult<&'a sass_ast::Expression> {
    args.positional
        .get(index)
        .or_else(|| args.named.iter().find(|(n, _)| n == name).map(|(_, e)| e))
        .ok_or_else(|| SassError::new(ErrorKind::MissingArgument(format!("${name} in {fn_name}()")), span.clone()))
}

pub(super) fn dispatch(
    evaluator: &mut Evaluator,
    name: &str,
    args: &ArgumentInvocation,
    env: &Environment,
    span: &Span,
) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "type-of" => {
            let v = evaluator.eval_expr(nth_expr(args, 0, "value", name, span)?, env)?;
            Value::String(SassString::unquoted(v.type_name()))
        }
        "inspect" => {
            let v = evaluator.eval_expr(nth_expr(args, 0, "value", name, span)?, env)?;
            Value::String(SassString::unquoted(v.to_css()))
        }
        "variable-exists" => {
            let n = string_arg(evaluator.eval_expr(nth_expr(args, 0, "name", name, span)?, env)?, span)?;
            Value::Boolean(env.variable(&n).is_some())
        }
        "global-variable-exists" => {
            let n = string_arg(evaluator.eval_expr(nth_expr(args, 0, "name", name, span)?, env)?, span)?;
            Value::Boolean(env.global_variable(&n).is_some())
        }
        "function-exists" => {
            let n = string_arg(evaluator.eval_expr(nth_expr(args, 0, "name", name, span)?, env)?, span)?;
            Value::Boolean(env.function(&n).is_some())
        }
        "mixin-exists" => {
            let n = string_arg(evaluator.eval_expr(nth_expr(args, 0, "name", name, span)?, env)?, span)?;
            Value::Boolean(env.mixin(&n).is_some())
        }
        "feature-exists" => Value::Boolean(false),
        "content-exists" => Value::Boolean(evaluator.content_stack.last().is_some_and(Option::is_some)),
        "get-function" => {
            let n = string_arg(evaluator.eval_expr(nth_expr(args, 0, "name", name, span)?, env)?, span)?;
            let decl = env
                .function(&n)
                .ok_or_else(|| SassError::new(ErrorKind::UndefinedFunction(n.clone()), span.clone()))?;
            Value::Function(FunctionRef { name: n.into(), declaration: decl, closure: std::rc::Rc::new(env.clone()) })
        }
        "call" => {
            let target = evaluator.eval_expr(nth_expr(args, 0, "function", name, span)?, env)?;
            let Value::Function(fref) = target else {
                return Err(SassError::new(ErrorKind::TypeError("meta.call() expects a function reference".to_string()), span.clone()));
            };
            let mut positional = Vec::new();
            for expr in args.positional.iter().skip(1) {
                positional.push(evaluator.eval_expr(expr, env)?);
            }
            let mut named = Vec::new();
            for (key, expr) in &args.named {
                named.push((key.clone(), evaluator.eval_expr(expr, env)?));
            }
            evaluator.invoke_function_ref(&fref, positional, named, span.clone())?
        }
        _ => return Ok(None),
    }))
}

fn string_arg(value: Value, span: &Span) -> SassResult<String> {
    match value {
        Value::String(s) => Ok(s.as_str().to_string()),
        other => Err(SassError::new(ErrorKind::TypeError(format!("{} is not a string", other.to_css())), span.clone())),
    }
}
