//! Numbers with units (spec §3.1, §4.1).
//!
//! A number's units are two *multisets* of unit tokens (numerator and
//! denominator); `1px*1/s` is representable. Identical tokens in both
//! multisets cancel. Known-dimension tokens (length, angle, time,
//! frequency, resolution) convert against each other lazily, only when
//! an operation actually needs to compare or combine across units.

use smallvec::SmallVec;
use std::fmt;

/// Absolute fuzzy-equality tolerance used throughout the value system
/// (spec glossary "Fuzzy equality", §4.1).
pub const EPSILON: f64 = 1e-11;

/// A short run of unit tokens. Almost every number has 0 or 1 units in
/// each position, so this is stack-allocated for the common case,
/// mirroring the pack's use of `smallvec` for short token runs.
pub type Units = SmallVec<[String; 2]>;

/// The dimension a unit belongs to, used to decide whether two units can
/// be converted against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
    Unknown,
}

/// Conversion factor to the dimension's canonical unit (px, deg, s, Hz, dppx).
fn unit_info(unit: &str) -> (Dimension, f64) {
    match unit {
        "px" => (Dimension::Length, 1.0),
        "cm" => (Dimension::Length, 96.0 / 2.54),
        "mm" => (Dimension::Length, 96.0 / 25.4),
        "q" | "Q" => (Dimension::Length, 96.0 / 101.6),
        "in" => (Dimension::Length, 96.0),
        "pt" => (Dimension::Length, 96.0 / 72.0),
        "pc" => (Dimension::Length, 16.0),
        "deg" => (Dimension::Angle, 1.0),
        "grad" => (Dimension::Angle, 360.0 / 400.0),
        "rad" => (Dimension::Angle, 180.0 / std::f64::consts::PI),
        "turn" => (Dimension::Angle, 360.0),
        "s" => (Dimension::Time, 1.0),
        "ms" => (Dimension::Time, 1.0 / 1000.0),
        "Hz" => (Dimension::Frequency, 1.0),
        "kHz" => (Dimension::Frequency, 1000.0),
        "dpi" => (Dimension::Resolution, 1.0 / 96.0),
        "dpcm" => (Dimension::Resolution, 2.54 / 96.0),
        "dppx" | "x" => (Dimension::Resolution, 1.0),
        _ => (Dimension::Unknown, 1.0),
    }
}

/// Factor to multiply a value in `from` by to get the equivalent value in
/// `to`. `None` if the units aren't convertible (different dimension, or
/// either is unknown and they aren't textually identical).
fn conversion_factor(from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    let (from_dim, from_factor) = unit_info(from);
    let (to_dim, to_factor) = unit_info(to);
    if from_dim == Dimension::Unknown || to_dim == Dimension::Unknown || from_dim != to_dim {
        return None;
    }
    Some(from_factor / to_factor)
}

/// A Sass number: a magnitude plus numerator/denominator unit multisets
/// (spec §3.1).
#[derive(Debug, Clone)]
pub struct Number {
    value: f64,
    numerator: Units,
    denominator: Units,
}

impl Number {
    /// A plain unitless number.
    #[must_use]
    pub fn unitless(value: f64) -> Self {
        Self { value, numerator: Units::new(), denominator: Units::new() }
    }

    /// A number with a single numerator unit, e.g. `10px`.
    #[must_use]
    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        let mut numerator = Units::new();
        numerator.push(unit.into());
        Self { value, numerator, denominator: Units::new() }
    }

    /// Build from explicit numerator/denominator unit multisets, with
    /// identical tokens in both canceling immediately (an invariant: "no
    /// zero-length tokens", spec §3.1, is upheld by dropping empties too).
    #[must_use]
    pub fn with_units(value: f64, mut numerator: Units, mut denominator: Units) -> Self {
        numerator.retain(|u| !u.is_empty());
        denominator.retain(|u| !u.is_empty());
        cancel_units(&mut numerator, &mut denominator);
        Self { value, numerator, denominator }
    }

    /// The raw magnitude, ignoring units.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Numerator unit tokens.
    #[must_use]
    pub fn numerator_units(&self) -> &[String] {
        &self.numerator
    }

    /// Denominator unit tokens.
    #[must_use]
    pub fn denominator_units(&self) -> &[String] {
        &self.denominator
    }

    /// True if this number has no units at all.
    #[must_use]
    pub fn is_unitless(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    /// True if this number has exactly one numerator unit and no
    /// denominator units, with that unit equal to `unit`.
    #[must_use]
    pub fn has_unit(&self, unit: &str) -> bool {
        self.numerator.len() == 1 && self.denominator.is_empty() && self.numerator[0] == unit
    }

    /// Convert this number to the given single numerator unit, if the
    /// units are compatible (same dimension). Returns `None` for
    /// incompatible units, mirroring the lazy-conversion design in §4.1.
    #[must_use]
    pub fn convert_to(&self, unit: &str) -> Option<Self> {
        if self.denominator.is_empty() && self.numerator.is_empty() && unit.is_empty() {
            return Some(self.clone());
        }
        if self.numerator.len() != 1 || !self.denominator.is_empty() {
            return None;
        }
        let factor = conversion_factor(&self.numerator[0], unit)?;
        Some(Self::with_unit(self.value * factor, unit))
    }

    /// Fuzzy equality (spec glossary): absolute difference at most
    /// [`EPSILON`] after unit normalization. Numbers with incompatible
    /// units are never equal.
    #[must_use]
    pub fn fuzzy_eq(&self, other: &Self) -> bool {
        match self.comparable_value(other) {
            Some((a, b)) => (a - b).abs() <= EPSILON,
            None => false,
        }
    }

    /// Fuzzy-aware total order; `None` if the units are incompatible.
    #[must_use]
    pub fn fuzzy_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let (a, b) = self.comparable_value(other)?;
        if (a - b).abs() <= EPSILON {
            Some(std::cmp::Ordering::Equal)
        } else {
            a.partial_cmp(&b)
        }
    }

    /// Convert both numbers to a common representation for comparison:
    /// same units structurally, returning `(self_value, other_value_in_self_units)`.
    fn comparable_value(&self, other: &Self) -> Option<(f64, f64)> {
        if self.numerator.len() == other.numerator.len()
            && self.denominator.len() == other.denominator.len()
            && units_equal_unordered(&self.numerator, &other.numerator)
            && units_equal_unordered(&self.denominator, &other.denominator)
        {
            return Some((self.value, other.value));
        }
        // Single-unit conversion case: both numbers have exactly one
        // numerator unit and no denominator.
        if self.numerator.len() == 1
            && self.denominator.is_empty()
            && other.numerator.len() == 1
            && other.denominator.is_empty()
        {
            let factor = conversion_factor(&other.numerator[0], &self.numerator[0])?;
            return Some((self.value, other.value * factor));
        }
        if self.is_unitless() && other.is_unitless() {
            return Some((self.value, other.value));
        }
        None
    }

    /// `a + b`: units must match (after conversion); result keeps `a`'s units.
    pub fn add(&self, other: &Self) -> Result<Self, UnitError> {
        self.elementwise(other, |a, b| a + b)
    }

    /// `a - b`.
    pub fn sub(&self, other: &Self) -> Result<Self, UnitError> {
        self.elementwise(other, |a, b| a - b)
    }

    /// `a % b` (CSS/Sass modulo keeps the sign of `b`... actually Sass
    /// keeps the sign of the dividend's conventional mod; we follow the
    /// documented Sass behavior of `fmod`-like truncation then
    /// sign-adjustment to match `b`'s sign when non-zero, matching the
    /// upstream language semantics referenced in spec §4.1).
    pub fn modulo(&self, other: &Self) -> Result<Self, UnitError> {
        self.elementwise(other, |a, b| {
            if b == 0.0 {
                f64::NAN
            } else {
                let m = a % b;
                if m != 0.0 && (m < 0.0) != (b < 0.0) {
                    m + b
                } else {
                    m
                }
            }
        })
    }

    fn elementwise(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self, UnitError> {
        let (a, b) = self
            .comparable_value(other)
            .ok_or_else(|| UnitError(format!("{self} and {other} have incompatible units")))?;
        Ok(Self { value: f(a, b), numerator: self.numerator.clone(), denominator: self.denominator.clone() })
    }

    /// `a * b`: units multiply (numerators/denominators concatenate),
    /// then identical tokens across numerator/denominator cancel.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut numerator: Units = self.numerator.iter().cloned().collect();
        numerator.extend(other.numerator.iter().cloned());
        let mut denominator: Units = self.denominator.iter().cloned().collect();
        denominator.extend(other.denominator.iter().cloned());
        cancel_units(&mut numerator, &mut denominator);
        Self { value: self.value * other.value, numerator, denominator }
    }

    /// `a / b`: units divide (the divisor's numerator becomes part of
    /// the denominator and vice versa). Division by a zero magnitude
    /// yields `±infinity`/`NaN` per CSS `calc()` conventions (spec §4.1);
    /// it is the caller's job to reject that outside a `calc()` context.
    #[must_use]
    pub fn div(&self, other: &Self) -> Self {
        let mut numerator: Units = self.numerator.iter().cloned().collect();
        numerator.extend(other.denominator.iter().cloned());
        let mut denominator: Units = self.denominator.iter().cloned().collect();
        denominator.extend(other.numerator.iter().cloned());
        cancel_units(&mut numerator, &mut denominator);
        Self { value: self.value / other.value, numerator, denominator }
    }

    /// True if dividing by this number would be well-defined division by
    /// zero outside calc (spec §4.6 `DivisionByZero`).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Saturate to `±infinity` if the magnitude overflows, per §4.1's
    /// "arithmetic overflow is saturated to ±infinity" rule.
    #[must_use]
    pub fn saturated(mut self) -> Self {
        if self.value.is_nan() {
            return self;
        }
        if self.value > f64::MAX {
            self.value = f64::INFINITY;
        } else if self.value < f64::MIN {
            self.value = f64::NEG_INFINITY;
        }
        self
    }
}

/// A unit-compatibility failure from an arithmetic operation (spec
/// §4.1's `IncompatibleUnits`); callers wrap this into a full
/// `SassError` with the relevant span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitError(pub String);

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.fuzzy_eq(other)
    }
}

fn units_equal_unordered(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut b_remaining: Vec<&String> = b.iter().collect();
    for unit in a {
        if let Some(pos) = b_remaining.iter().position(|u| *u == unit) {
            b_remaining.remove(pos);
        } else {
            return false;
        }
    }
    true
}

/// Cancel identical unit tokens appearing in both the numerator and
/// denominator multisets, e.g. `px*s/s` -> `px`.
fn cancel_units(numerator: &mut Units, denominator: &mut Units) {
    let mut i = 0;
    while i < numerator.len() {
        if let Some(pos) = denominator.iter().position(|u| *u == numerator[i]) {
            denominator.remove(pos);
            numerator.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Format a finite magnitude the way CSS output requires (spec §4.5):
/// up to 10 significant decimal digits, trailing zeros trimmed, `-0`
/// emitted as `0`, integers with no decimal point, and `NaN`/infinities
/// spelled out for `calc()` contexts to wrap.
#[must_use]
pub fn format_magnitude(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "infinity".to_string() } else { "-infinity".to_string() };
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut text = format!("{value:.10}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_magnitude(self.value))?;
        if !self.numerator.is_empty() {
            write!(f, "{}", self.numerator.join("*"))?;
        }
        if !self.denominator.is_empty() {
            write!(f, "/{}", self.denominator.join("/"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_units_add() {
        let a = Number::with_unit(1.0, "px");
        let b = Number::with_unit(2.0, "px");
        assert_eq!(a.add(&b).unwrap().value(), 3.0);
    }

    #[test]
    fn compatible_units_convert_before_adding() {
        let a = Number::with_unit(1.0, "in");
        let b = Number::with_unit(2.0, "cm");
        let sum = a.add(&b).unwrap();
        // 1in + 2cm == 1.7874015748in
        assert!((sum.value() - 1.787_401_574_8).abs() < 1e-9);
        assert!(sum.has_unit("in"));
    }

    #[test]
    fn incompatible_units_reject_addition() {
        let a = Number::with_unit(1.0, "px");
        let b = Number::with_unit(2.0, "s");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn multiply_tracks_two_dimensional_units() {
        let a = Number::with_unit(2.0, "px");
        let b = Number::with_unit(3.0, "s");
        let product = a.mul(&b);
        assert_eq!(product.value(), 6.0);
        assert_eq!(product.numerator_units(), &["px".to_string(), "s".to_string()]);
    }

    #[test]
    fn division_by_same_unit_cancels() {
        let a = Number::with_unit(10.0, "px");
        let b = Number::with_unit(2.0, "px");
        let quotient = a.div(&b);
        assert_eq!(quotient.value(), 5.0);
        assert!(quotient.is_unitless());
    }

    #[test]
    fn adding_zero_in_other_unit_is_identity() {
        let a = Number::with_unit(5.0, "px");
        let zero = Number::with_unit(0.0, "cm");
        let sum = a.add(&zero).unwrap();
        assert!(sum.fuzzy_eq(&Number::with_unit(5.0, "px")));
    }

    #[test]
    fn fuzzy_eq_within_epsilon() {
        let a = Number::unitless(1.000_000_000_001);
        let b = Number::unitless(1.0);
        assert!(a.fuzzy_eq(&b));
    }
}
