//! Argument binding: resolving a call site's [`ArgumentInvocation`]
//! against a declared [`ParameterList`] (spec §4.4 "Positional and
//! named arguments").

use indexmap::IndexMap;
use sass_ast::{ArgumentInvocation, FunctionDecl, ParameterList, Statement};
use sass_common::{ErrorKind, SassError, SassResult, Span};

use super::Evaluator;
use crate::env::Environment;
use crate::value::{ArgList, FunctionRef, ListSeparator, SassList, Value};

impl Evaluator {
    /// Evaluate a call site's arguments and bind them against `params`,
    /// returning `(name, value)` pairs ready to be declared as locals in
    /// the callee's environment. `default_env` is the scope a parameter's
    /// default expression is evaluated against — the callee's own new
    /// scope, with earlier parameters already bound into it, so a default
    /// like `$b: $a + 1` can see the sibling parameter `$a`.
    pub(crate) fn resolve_arguments(
        &mut self,
        params: &ParameterList,
        args: &ArgumentInvocation,
        call_env: &Environment,
        default_env: &Environment,
        call_span: Span,
    ) -> SassResult<Vec<(String, Value)>> {
        let mut positional = Vec::new();
        for expr in &args.positional {
            positional.push(self.eval_expr(expr, call_env)?);
        }
        let mut named: IndexMap<String, Value> = IndexMap::new();
        for (name, expr) in &args.named {
            let value = self.eval_expr(expr, call_env)?;
            named.insert(name.clone(), value);
        }
        if let Some(rest_expr) = &args.rest {
            match self.eval_expr(rest_expr, call_env)? {
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
            match self.eval_expr(kw_rest_expr, call_env)? {
                Value::Map(map) => {
                    for (k, v) in map.iter() {
                        let Value::String(key) = k else {
                            return Err(SassError::new(
                                ErrorKind::InvalidArgument("keyword argument map keys must be strings".to_string()),
                                call_span,
                            ));
                        };
                        named.insert(key.as_str().to_string(), v.clone());
                    }
                }
                _ => {
                    return Err(SassError::new(
                        ErrorKind::InvalidArgument("only a map can be passed as keyword arguments with ...".to_string()),
                        call_span,
                    ));
                }
            }
        }

        let mut bindings = Vec::with_capacity(params.parameters.len());
        let mut positional_iter = positional.into_iter();
        for param in &params.parameters {
            if param.is_rest {
                break;
            }
            let value = if let Some(v) = positional_iter.next() {
                if named.shift_remove(&param.name).is_some() {
                    return Err(SassError::new(ErrorKind::DuplicateArgument(format!("${}", param.name)), call_span));
                }
                v
            } else if let Some(v) = named.shift_remove(&param.name) {
                v
            } else if let Some(default) = &param.default {
                self.eval_expr(default, default_env)?
            } else {
                return Err(SassError::new(ErrorKind::MissingArgument(format!("${}", param.name)), call_span));
            };
            default_env.set_local(param.name.clone(), value.clone());
            bindings.push((param.name.clone(), value));
        }

        let leftover_positional: Vec<Value> = positional_iter.collect();
        if let Some(rest_param) = params.parameters.iter().find(|p| p.is_rest) {
            let arg_list = ArgList {
                positional: SassList::new(leftover_positional, ListSeparator::Comma, false),
                keywords: named,
            };
            bindings.push((rest_param.name.clone(), Value::ArgList(Box::new(arg_list))));
        } else {
            if !leftover_positional.is_empty() {
                return Err(SassError::new(
                    ErrorKind::InvalidArgument(format!("{} extra positional argument(s) passed", leftover_positional.len())),
                    call_span,
                ));
            }
            if let Some((name, _)) = named.iter().next() {
                return Err(SassError::new(ErrorKind::InvalidArgument(format!("no parameter named ${name}")), call_span));
            }
        }

        Ok(bindings)
    }

    /// Invoke a user-defined function: bind arguments into a fresh
    /// scope rooted at the function's closure environment, execute its
    /// body, and require a `@return`.
    pub(crate) fn call_user_function(
        &mut self,
        name: &str,
        decl: &FunctionDecl,
        args: &ArgumentInvocation,
        call_env: &Environment,
        call_span: Span,
    ) -> SassResult<Value> {
        let Statement::FunctionDecl { parameters, body, .. } = decl else {
            return Err(SassError::new(ErrorKind::UndefinedFunction(name.to_string()), call_span));
        };
        let fn_env = call_env.push_scope();
        let bindings = self.resolve_arguments(parameters, args, call_env, &fn_env, call_span.clone())?;
        self.enter_call(name.to_string(), call_span.clone())?;
        for (param_name, value) in bindings {
            fn_env.set_local(param_name, value);
        }
        let result = self.exec_function_body(body, &fn_env);
        self.exit_call();
        result.map_err(|e| self.attach_stack(e)).and_then(|opt| {
            opt.ok_or_else(|| SassError::new(ErrorKind::MissingReturn, call_span))
        })
    }

    /// `meta.call()`: invoke an already-resolved [`FunctionRef`] against
    /// a caller-supplied, already-evaluated argument list, binding them
    /// into the function's closure environment the same way
    /// [`Self::call_user_function`] binds a direct call site.
    ///
    /// Unlike a direct call, the arguments here are plain `Value`s
    /// rather than unevaluated `Expression`s, so this binds them by hand
    /// instead of going through `resolve_arguments`; forwarding a rest
    /// argument list or keyword map straight through `...` into the
    /// target function is not supported.
    pub(crate) fn invoke_function_ref(
        &mut self,
        fref: &FunctionRef,
        mut positional: Vec<Value>,
        named: Vec<(String, Value)>,
        call_span: Span,
    ) -> SassResult<Value> {
        let Statement::FunctionDecl { parameters, body, .. } = fref.declaration.as_ref() else {
            return Err(SassError::new(ErrorKind::UndefinedFunction(fref.name.to_string()), call_span));
        };
        let mut named: IndexMap<String, Value> = named.into_iter().collect();
        let fn_env = fref.closure.push_scope();
        let mut bindings = Vec::with_capacity(parameters.parameters.len());
        let mut positional_iter = positional.drain(..);
        for param in &parameters.parameters {
            if param.is_rest {
                break;
            }
            let value = if let Some(v) = positional_iter.next() {
                if named.shift_remove(&param.name).is_some() {
                    return Err(SassError::new(ErrorKind::DuplicateArgument(format!("${}", param.name)), call_span));
                }
                v
            } else if let Some(v) = named.shift_remove(&param.name) {
                v
            } else if let Some(default) = &param.default {
                self.eval_expr(default, &fn_env)?
            } else {
                return Err(SassError::new(ErrorKind::MissingArgument(format!("${}", param.name)), call_span));
            };
            fn_env.set_local(param.name.clone(), value.clone());
            bindings.push((param.name.clone(), value));
        }
        let leftover: Vec<Value> = positional_iter.collect();
        if let Some(rest_param) = parameters.parameters.iter().find(|p| p.is_rest) {
            let arg_list = ArgList { positional: SassList::new(leftover, ListSeparator::Comma, false), keywords: named };
            bindings.push((rest_param.name.clone(), Value::ArgList(Box::new(arg_list))));
        } else if !leftover.is_empty() {
            return Err(SassError::new(
                ErrorKind::InvalidArgument(format!("{} extra positional argument(s) passed to {}()", leftover.len(), fref.name)),
                call_span,
            ));
        }

        self.enter_call(fref.name.to_string(), call_span.clone())?;
        for (name, value) in bindings {
            fn_env.set_local(name, value);
        }
        let result = self.exec_function_body(body, &fn_env);
        self.exit_call();
        result.map_err(|e| self.attach_stack(e)).and_then(|opt| {
            opt.ok_or_else(|| SassError::new(ErrorKind::MissingReturn, call_span))
        })
    }
}
