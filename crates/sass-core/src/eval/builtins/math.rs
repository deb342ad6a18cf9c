//! `math.*` built-ins (spec §4.1 numeric operations exposed as
//! callable functions: `math.min`/`max`/`abs`/`ceil`/`floor`/`round`,
//! plus `percentage`/`math.sqrt`/`math.pow`/`math.div`/`math.compatible`).

use sass_common::SassResult;

use super::Args;
use crate::value::{Number, Value};

fn same_units(n: &Number, value: f64) -> Number {
    Number::with_units(value, n.numerator_units().iter().cloned().collect(), n.denominator_units().iter().cloned().collect())
}

pub(super) fn dispatch(name: &str, args: &mut Args) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "min" => {
            let mut best = args.number(args.required(0, "number1", "min")?, "number1")?;
            let mut i = 1;
            while let Some(v) = args.get(i, &format!("number{}", i + 1)) {
                let candidate = args.number(v, "min argument")?;
                match best.fuzzy_cmp(&candidate) {
                    Some(ord) if ord == std::cmp::Ordering::Greater => best = candidate,
                    Some(_) => {}
                    None => return Err(args.invalid_argument(format!("{best} and {candidate} are incompatible"))),
                }
                i += 1;
            }
            Value::Number(best)
        }
        "max" => {
            let mut best = args.number(args.required(0, "number1", "max")?, "number1")?;
            let mut i = 1;
            while let Some(v) = args.get(i, &format!("number{}", i + 1)) {
                let candidate = args.number(v, "max argument")?;
                match best.fuzzy_cmp(&candidate) {
                    Some(ord) if ord == std::cmp::Ordering::Less => best = candidate,
                    Some(_) => {}
                    None => return Err(args.invalid_argument(format!("{best} and {candidate} are incompatible"))),
                }
                i += 1;
            }
            Value::Number(best)
        }
        "abs" => {
            let n = args.number(args.required(0, "number", "abs")?, "number")?;
            Value::Number(same_units(&n, n.value().abs()))
        }
        "ceil" => {
            let n = args.number(args.required(0, "number", "ceil")?, "number")?;
            Value::Number(same_units(&n, n.value().ceil()))
        }
        "floor" => {
            let n = args.number(args.required(0, "number", "floor")?, "number")?;
            Value::Number(same_units(&n, n.value().floor()))
        }
        "round" => {
            let n = args.number(args.required(0, "number", "round")?, "number")?;
            Value::Number(same_units(&n, n.value().round()))
        }
        "sqrt" => {
            let n = args.number(args.required(0, "number", "sqrt")?, "number")?;
            if !n.is_unitless() {
                return Err(args.invalid_argument(format!("{n} is not unitless; math.sqrt expects a unitless number")));
            }
            Value::Number(Number::unitless(n.value().sqrt()))
        }
        "pow" => {
            let base = args.number(args.required(0, "base", "pow")?, "base")?;
            let exponent = args.number(args.required(1, "exponent", "pow")?, "exponent")?;
            if !base.is_unitless() || !exponent.is_unitless() {
                return Err(args.invalid_argument("math.pow's arguments must be unitless".to_string()));
            }
            Value::Number(Number::unitless(base.value().powf(exponent.value())))
        }
        "div" => {
            let a = args.number(args.required(0, "number1", "div")?, "number1")?;
            let b = args.number(args.required(1, "number2", "div")?, "number2")?;
            Value::Number(a.div(&b))
        }
        "compatible" => {
            let a = args.number(args.required(0, "number1", "compatible")?, "number1")?;
            let b = args.number(args.required(1, "number2", "compatible")?, "number2")?;
            Value::Boolean(a.fuzzy_cmp(&b).is_some())
        }
        "percentage" => {
            let n = args.number(args.required(0, "number", "percentage")?, "number")?;
            if !n.is_unitless() {
                return Err(args.invalid_argument(format!("{n} is not unitless; percentage() expects a unitless number")));
            }
            Value::Number(Number::with_unit(n.value() * 100.0, "%"))
        }
        "unit" => {
            let n = args.number(args.required(0, "number", "unit")?, "number")?;
            let mut text = String::new();
            if !n.numerator_units().is_empty() {
                text.push_str(&n.numerator_units().join("*"));
            }
            if !n.denominator_units().is_empty() {
                text.push('/');
                text.push_str(&n.denominator_units().join("/"));
            }
            Value::String(crate::value::SassString::quoted(text))
        }
        "is-unitless" => {
            let n = args.number(args.required(0, "number", "is-unitless")?, "number")?;
            Value::Boolean(n.is_unitless())
        }
        _ => return Ok(None),
    }))
}
