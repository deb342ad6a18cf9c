//! Unevaluated `calc()`/`clamp()`/`min()`/`max()` trees (spec §3.1,
//! §4.1): these survive as values rather than being folded to a number
//! whenever an operand can't be resolved at compile time (e.g. one
//! operand has units that only the browser can reconcile, or involves
//! a CSS custom property).

use super::number::Number;
use super::Value;

/// One operand of a calculation: either a nested calculation expression
/// or a terminal value.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcOperand {
    /// A literal number (with or without units).
    Number(Number),
    /// Any other value interpolated in verbatim (a string, a variable
    /// that resolved to non-numeric CSS, etc).
    Value(Box<Value>),
    /// A nested calculation, e.g. the inner `calc()` in
    /// `calc(1px + calc(2px * 3))`.
    Nested(Box<Calculation>),
    /// A parenthesized sub-expression kept for round-tripping, e.g. the
    /// `(1px + 2px)` in `calc((1px + 2px) * 2)`.
    Interpolated(String),
}

/// A named calculation with its operand list (spec §3.1). `name` is one
/// of `"calc"`, `"min"`, `"max"`, `"clamp"`, or a custom function name
/// for forward-compatible math functions the compiler doesn't evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    name: String,
    arguments: Vec<CalcOperand>,
}

impl Calculation {
    /// Build a calculation from its function name and operands.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Vec<CalcOperand>) -> Self {
        Self { name: name.into(), arguments }
    }

    /// The calculation's function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operand list.
    #[must_use]
    pub fn arguments(&self) -> &[CalcOperand] {
        &self.arguments
    }

    /// Serialize back to CSS `calc()` syntax. Plain-CSS output always
    /// keeps calculations unevaluated, matching upstream's policy of
    /// never resolving `calc()` at compile time unless every operand is
    /// a plain number with compatible units (handled by the evaluator
    /// before a `Calculation` value is ever constructed).
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = format!("{}(", self.name);
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(if self.name == "calc" { " + " } else { ", " });
            }
            out.push_str(&operand_to_css(arg));
        }
        out.push(')');
        out
    }
}

fn operand_to_css(operand: &CalcOperand) -> String {
    match operand {
        CalcOperand::Number(n) => n.to_string(),
        CalcOperand::Value(v) => v.to_css(),
        CalcOperand::Nested(c) => c.to_css(),
        CalcOperand::Interpolated(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_serializes_with_plus_separator() {
        let calc = Calculation::new(
            "calc",
            vec![CalcOperand::Number(Number::with_unit(1.0, "px")), CalcOperand::Number(Number::with_unit(2.0, "em"))],
        );
        assert_eq!(calc.to_css(), "calc(1px + 2em)");
    }

    #[test]
    fn clamp_serializes_with_comma_separator() {
        let calc = Calculation::new(
            "clamp",
            vec![
                CalcOperand::Number(Number::with_unit(0.0, "px")),
                CalcOperand::Number(Number::with_unit(10.0, "px")),
                CalcOperand::Number(Number::with_unit(20.0, "px")),
            ],
        );
        assert_eq!(calc.to_css(), "clamp(0px, 10px, 20px)");
    }
}
