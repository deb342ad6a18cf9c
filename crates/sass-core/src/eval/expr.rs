//! SassScript expression evaluation (spec §3.3/§4.1/§4.4).

use sass_ast::{ArgumentInvocation, BinaryOp, CalcOperand, Expression, Interpolation, InterpolationSegment, ListSeparatorLit, UnaryOp};
use sass_common::{ErrorKind, SassError, SassResult};

use super::color_literal;
use super::Evaluator;
use crate::env::Environment;
use crate::value::{Calculation, ListSeparator, Number, SassList, SassMap, SassString, Value};

impl Evaluator {
    /// Evaluate a standalone SassScript expression against an
    /// environment (spec §4.4's `evaluate_expression(expr, environment)
    /// → Value` boundary operation), for callers that already hold a
    /// parsed expression and an environment from some other source
    /// (e.g. a custom function implementation evaluating a default
    /// argument).
    ///
    /// # Errors
    ///
    /// Returns any [`SassError`] the expression raises (undefined
    /// variable, type error, division by zero, and so on).
    pub fn evaluate_expression(&mut self, expr: &Expression, env: &Environment) -> SassResult<Value> {
        self.eval_expr(expr, env)
    }

    /// Invoke a named function — user-defined first, then built-in,
    /// falling back to a plain-CSS function call for anything neither
    /// recognizes (spec §4.4's `call_function(name, arg_invocation,
    /// environment) → Value` boundary operation).
    ///
    /// # Errors
    ///
    /// Returns any [`SassError`] the call raises (missing/extra
    /// arguments, a type error inside the function body, and so on).
    pub fn call_function(
        &mut self,
        name: &str,
        args: &ArgumentInvocation,
        env: &Environment,
        span: sass_common::Span,
    ) -> SassResult<Value> {
        self.eval_function_call(None, name, args, env, span)
    }

    /// Evaluate an interpolation to its string form; every expression
    /// segment is evaluated and rendered with [`Value::to_css`].
    pub(crate) fn eval_interpolation(&mut self, interp: &Interpolation, env: &Environment) -> SassResult<String> {
        if let Some(plain) = interp.as_plain() {
            return Ok(plain.to_string());
        }
        let mut out = String::new();
        for segment in interp.segments() {
            match segment {
                InterpolationSegment::Plain(text) => out.push_str(text),
                InterpolationSegment::Expr(expr) => {
                    let value = self.eval_expr(expr, env)?;
                    out.push_str(&value.to_css());
                }
            }
        }
        Ok(out)
    }

    /// Evaluate a SassScript expression to a value.
    pub(crate) fn eval_expr(&mut self, expr: &Expression, env: &Environment) -> SassResult<Value> {
        match expr {
            Expression::Number { value, unit, .. } => Ok(Value::Number(match unit {
                Some(u) => Number::with_unit(*value, u.clone()),
                None => Number::unitless(*value),
            })),
            Expression::Color { text, span } => color_literal::resolve(text)
                .map(Value::Color)
                .ok_or_else(|| SassError::new(ErrorKind::InvalidArgument(format!("invalid color literal: {text}")), span.clone())),
            Expression::Boolean(b, _) => Ok(Value::Boolean(*b)),
            Expression::Null(_) => Ok(Value::Null),
            Expression::Str { quoted, contents, .. } => {
                let text = self.eval_interpolation(contents, env)?;
                Ok(Value::String(if *quoted { SassString::quoted(text) } else { SassString::unquoted(text) }))
            }
            Expression::ListExpr { elements, separator, brackets, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, env)?);
                }
                let sep = match separator {
                    ListSeparatorLit::Comma => ListSeparator::Comma,
                    ListSeparatorLit::Space => ListSeparator::Space,
                    ListSeparatorLit::Slash => ListSeparator::Slash,
                    ListSeparatorLit::Undecided => ListSeparator::Undecided,
                };
                Ok(Value::List(Box::new(SassList::new(values, sep, *brackets))))
            }
            Expression::MapExpr { entries, span } => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = self.eval_expr(k, env)?;
                    if pairs.iter().any(|(existing, _): &(Value, Value)| existing.fuzzy_eq(&key)) {
                        return Err(SassError::new(
                            ErrorKind::InvalidArgument(format!("duplicate map key {}", key.to_css())),
                            span.clone(),
                        ));
                    }
                    let value = self.eval_expr(v, env)?;
                    pairs.push((key, value));
                }
                Ok(Value::Map(Box::new(SassMap::from_pairs(pairs))))
            }
            Expression::Variable { namespace, name, span } => {
                if let Some(ns) = namespace {
                    let module = env
                        .module(ns)
                        .ok_or_else(|| SassError::new(ErrorKind::UndefinedVariable(format!("${ns}.{name}")), span.clone()))?;
                    return module
                        .variables
                        .get(name)
                        .cloned()
                        .ok_or_else(|| SassError::new(ErrorKind::UndefinedVariable(format!("${ns}.{name}")), span.clone()));
                }
                env.variable(name)
                    .ok_or_else(|| SassError::new(ErrorKind::UndefinedVariable(format!("${name}")), span.clone()))
            }
            Expression::FunctionCall { namespace, name, args, span } => {
                let fn_name = self.eval_interpolation(name, env)?;
                self.eval_function_call(namespace.as_deref(), &fn_name, args, env, span.clone())
            }
            Expression::Unary { op, operand, span } => self.eval_unary(*op, operand, env, span.clone()),
            Expression::Binary { op, left, right, span } => self.eval_binary(*op, left, right, env, span.clone()),
            Expression::Paren(inner, _) => self.eval_expr(inner, env),
            Expression::If { condition, if_true, if_false, .. } => {
                if self.eval_expr(condition, env)?.is_truthy() {
                    self.eval_expr(if_true, env)
                } else {
                    self.eval_expr(if_false, env)
                }
            }
            Expression::ParentSelector(span) => match &self.current_selector {
                Some(sel) => Ok(Value::String(SassString::unquoted(crate::serialize::selector_to_css(sel)))),
                None => Err(SassError::new(
                    ErrorKind::InvalidNesting("& used outside a style rule".to_string()),
                    span.clone(),
                )),
            },
            Expression::Supports(condition, env_span) => {
                let text = self.supports_condition_to_css(condition, env)?;
                let _ = env_span;
                Ok(Value::String(SassString::unquoted(text)))
            }
            Expression::Calculation { name, args, span } => self.eval_calculation(name, args, env, span.clone()),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expression, env: &Environment, span: sass_common::Span) -> SassResult<Value> {
        let value = self.eval_expr(operand, env)?;
        match (op, &value) {
            (UnaryOp::Not, _) => Ok(Value::Boolean(!value.is_truthy())),
            (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(Number::unitless(0.0).sub(n).map_err(|e| to_type_error(e, span))?)),
            (UnaryOp::Plus, Value::Number(_)) => Ok(value),
            (UnaryOp::Negate | UnaryOp::Plus, _) => {
                Err(SassError::new(ErrorKind::TypeError(format!("{} is not a number", value.to_css())), span))
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        env: &Environment,
        span: sass_common::Span,
    ) -> SassResult<Value> {
        // `and`/`or` short-circuit, so the right operand is only
        // evaluated when it can affect the result.
        if op == BinaryOp::And {
            let l = self.eval_expr(left, env)?;
            return if l.is_truthy() { self.eval_expr(right, env) } else { Ok(l) };
        }
        if op == BinaryOp::Or {
            let l = self.eval_expr(left, env)?;
            return if l.is_truthy() { Ok(l) } else { self.eval_expr(right, env) };
        }

        let l = self.eval_expr(left, env)?;
        let r = self.eval_expr(right, env)?;
        match op {
            BinaryOp::Equal => Ok(Value::Boolean(l.fuzzy_eq(&r))),
            BinaryOp::NotEqual => Ok(Value::Boolean(!l.fuzzy_eq(&r))),
            BinaryOp::LessThan | BinaryOp::LessThanOrEqual | BinaryOp::GreaterThan | BinaryOp::GreaterThanOrEqual => {
                let (Value::Number(a), Value::Number(b)) = (&l, &r) else {
                    return Err(SassError::new(
                        ErrorKind::TypeError(format!("{} and {} are not both numbers", l.to_css(), r.to_css())),
                        span,
                    ));
                };
                let ord = a
                    .fuzzy_cmp(b)
                    .ok_or_else(|| SassError::new(ErrorKind::IncompatibleUnits(format!("{a} and {b} have incompatible units")), span))?;
                let result = match op {
                    BinaryOp::LessThan => ord == std::cmp::Ordering::Less,
                    BinaryOp::LessThanOrEqual => ord != std::cmp::Ordering::Greater,
                    BinaryOp::GreaterThan => ord == std::cmp::Ordering::Greater,
                    BinaryOp::GreaterThanOrEqual => ord != std::cmp::Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(Value::Boolean(result))
            }
            BinaryOp::Add => l.add(&r).map_err(|e| to_type_error(e, span)),
            BinaryOp::Subtract => match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.sub(b).map_err(|e| to_type_error(e, span))?)),
                _ => Ok(Value::String(SassString::unquoted(format!("{}-{}", l.to_css(), r.to_css())))),
            },
            BinaryOp::Multiply => match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.mul(b))),
                _ => Err(SassError::new(ErrorKind::TypeError(format!("{} and {} are not both numbers", l.to_css(), r.to_css())), span)),
            },
            BinaryOp::Divide => match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => {
                    if b.is_zero() {
                        return Err(SassError::new(ErrorKind::DivisionByZero, span));
                    }
                    Ok(Value::Number(a.div(b)))
                }
                _ => Ok(Value::String(SassString::unquoted(format!("{}/{}", l.to_css(), r.to_css())))),
            },
            BinaryOp::Modulo => match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.modulo(b).map_err(|e| to_type_error(e, span))?)),
                _ => Err(SassError::new(ErrorKind::TypeError(format!("{} and {} are not both numbers", l.to_css(), r.to_css())), span)),
            },
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_calculation(&mut self, name: &str, args: &[CalcOperand], env: &Environment, span: sass_common::Span) -> SassResult<Value> {
        use crate::value::CalcOperand as VCalcOperand;
        let mut operands = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                CalcOperand::Expr(expr) => {
                    let value = self.eval_expr(expr, env)?;
                    match value {
                        Value::Number(n) => operands.push(VCalcOperand::Number(n)),
                        Value::Calculation(c) => operands.push(VCalcOperand::Nested(c)),
                        other => operands.push(VCalcOperand::Value(Box::new(other))),
                    }
                }
                CalcOperand::Raw(text) => operands.push(VCalcOperand::Interpolated(text.clone())),
            }
        }
        // `calc()` with every operand a plain compatible number folds to
        // a single number; everything else stays an unevaluated
        // calculation tree for the serializer to emit verbatim.
        if name == "calc" {
            if let [VCalcOperand::Number(n)] = operands.as_slice() {
                return Ok(Value::Number(n.clone()));
            }
        }
        let _ = span;
        Ok(Value::Calculation(Box::new(Calculation::new(name, operands))))
    }

    fn eval_function_call(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        args: &ArgumentInvocation,
        env: &Environment,
        span: sass_common::Span,
    ) -> SassResult<Value> {
        let user_decl = match namespace {
            Some(ns) => env.module(ns).and_then(|module| module.functions.get(name).cloned()),
            None => env.function(name),
        };
        if let Some(decl) = user_decl {
            return self.call_user_function(name, &decl, args, env, span);
        }
        if let Some(result) = self.call_builtin_function(name, args, env, span)? {
            return Ok(result);
        }
        // A call to a name the evaluator doesn't recognize as a Sass
        // function is treated as a plain-CSS function (`rgb()`-alikes
        // with unresolvable arguments, vendor functions, etc.): render
        // it back out textually rather than failing.
        self.render_plain_css_call(name, args, env)
    }

    fn render_plain_css_call(&mut self, name: &str, args: &ArgumentInvocation, env: &Environment) -> SassResult<Value> {
        let mut rendered = Vec::with_capacity(args.positional.len());
        for arg in &args.positional {
            rendered.push(self.eval_expr(arg, env)?.to_css());
        }
        for (key, value_expr) in &args.named {
            let value = self.eval_expr(value_expr, env)?;
            rendered.push(format!("${key}: {}", value.to_css()));
        }
        Ok(Value::String(SassString::unquoted(format!("{name}({})", rendered.join(", ")))))
    }
}

fn to_type_error(err: crate::value::UnitError, span: sass_common::Span) -> SassError {
    SassError::new(ErrorKind::IncompatibleUnits(err.0), span)
}
