//! `color.*` built-ins (spec §4.1/§3.2): channel inspection, the
//! `lighten`/`darken`/`saturate`/`adjust-hue`/`mix`/`complement`/
//! `invert`/`grayscale` transform functions, plus `color.change`/
//! `color.adjust`.

use sass_common::SassResult;

use super::Args;
use crate::value::{Channel, Color, ColorSpace, Number, Value};

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.clamp(lo, hi)
}

fn percent_arg(args: &mut Args, index: usize, name: &str, fn_name: &str) -> SassResult<f64> {
    Ok(args.number(args.required(index, name, fn_name)?, name)?.value())
}

/// Apply `delta` to the HSL lightness channel, converting back to the
/// color's original space.
fn shift_lightness(color: Color, delta: f64) -> Color {
    let hsl = color.to_space(ColorSpace::Hsl);
    let l = hsl.channel_named("lightness").unwrap_or(Channel::Value(0.0)).value_or_zero();
    let adjusted = hsl.with_channel(2, Channel::Value(clamp(l + delta, 0.0, 100.0)));
    adjusted.to_space(color.space()).with_alpha(color.alpha())
}

fn shift_saturation(color: Color, delta: f64) -> Color {
    let hsl = color.to_space(ColorSpace::Hsl);
    let s = hsl.channel_named("saturation").unwrap_or(Channel::Value(0.0)).value_or_zero();
    let adjusted = hsl.with_channel(1, Channel::Value(clamp(s + delta, 0.0, 100.0)));
    adjusted.to_space(color.space()).with_alpha(color.alpha())
}

pub(super) fn dispatch(name: &str, args: &mut Args) -> SassResult<Option<Value>> {
    Ok(Some(match name {
        "rgb" | "rgba" => {
            let r = args.number(args.required(0, "red", name)?, "red")?.value();
            let g = args.number(args.required(1, "green", name)?, "green")?.value();
            let b = args.number(args.required(2, "blue", name)?, "blue")?.value();
            let alpha = match args.get(3, "alpha") {
                Some(v) => args.number(v, "alpha")?.value(),
                None => 1.0,
            };
            Value::Color(Color::new(ColorSpace::Rgb, [Channel::Value(r), Channel::Value(g), Channel::Value(b)], Channel::Value(alpha)))
        }
        "red" => Value::Number(Number::unitless(channel(args, name, "red")?)),
        "green" => Value::Number(Number::unitless(channel(args, name, "green")?)),
        "blue" => Value::Number(Number::unitless(channel(args, name, "blue")?)),
        "hue" => Value::Number(Number::with_unit(channel(args, name, "hue")?, "deg")),
        "saturation" => Value::Number(Number::with_unit(channel(args, name, "saturation")?, "%")),
        "lightness" => Value::Number(Number::with_unit(channel(args, name, "lightness")?, "%")),
        "alpha" | "opacity" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            Value::Number(Number::unitless(c.alpha_or_opaque()))
        }
        "lighten" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let amount = percent_arg(args, 1, "amount", name)?;
            Value::Color(shift_lightness(c, amount))
        }
        "darken" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let amount = percent_arg(args, 1, "amount", name)?;
            Value::Color(shift_lightness(c, -amount))
        }
        "saturate" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let amount = percent_arg(args, 1, "amount", name)?;
            Value::Color(shift_saturation(c, amount))
        }
        "desaturate" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let amount = percent_arg(args, 1, "amount", name)?;
            Value::Color(shift_saturation(c, -amount))
        }
        "grayscale" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            Value::Color(shift_saturation(c, -100.0))
        }
        "adjust-hue" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let degrees = args.number(args.required(1, "degrees", name)?, "degrees")?.value();
            let hsl = c.to_space(ColorSpace::Hsl);
            let h = hsl.channel_named("hue").unwrap_or(Channel::Value(0.0)).value_or_zero();
            let adjusted = hsl.with_channel(0, Channel::Value((h + degrees).rem_euclid(360.0)));
            Value::Color(adjusted.to_space(c.space()).with_alpha(c.alpha()))
        }
        "complement" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let hsl = c.to_space(ColorSpace::Hsl);
            let h = hsl.channel_named("hue").unwrap_or(Channel::Value(0.0)).value_or_zero();
            let adjusted = hsl.with_channel(0, Channel::Value((h + 180.0).rem_euclid(360.0)));
            Value::Color(adjusted.to_space(c.space()).with_alpha(c.alpha()))
        }
        "invert" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            let rgb = c.to_space(ColorSpace::Rgb);
            let [r, g, b] = rgb.channels();
            let inverted = Color::new(
                ColorSpace::Rgb,
                [
                    Channel::Value(255.0 - r.value_or_zero()),
                    Channel::Value(255.0 - g.value_or_zero()),
                    Channel::Value(255.0 - b.value_or_zero()),
                ],
                rgb.alpha(),
            );
            Value::Color(inverted.to_space(c.space()))
        }
        "mix" => {
            let a = args.color(args.required(0, "color1", name)?, "color1")?.to_space(ColorSpace::Rgb);
            let b = args.color(args.required(1, "color2", name)?, "color2")?.to_space(ColorSpace::Rgb);
            let weight = match args.get(2, "weight") {
                Some(v) => args.number(v, "weight")?.value(),
                None => 50.0,
            } / 100.0;
            let [ar, ag, ab] = a.channels();
            let [br, bg, bb] = b.channels();
            let lerp = |x: f64, y: f64| x * weight + y * (1.0 - weight);
            let alpha = a.alpha_or_opaque() * weight + b.alpha_or_opaque() * (1.0 - weight);
            Value::Color(Color::new(
                ColorSpace::Rgb,
                [
                    Channel::Value(lerp(ar.value_or_zero(), br.value_or_zero())),
                    Channel::Value(lerp(ag.value_or_zero(), bg.value_or_zero())),
                    Channel::Value(lerp(ab.value_or_zero(), bb.value_or_zero())),
                ],
                Channel::Value(alpha),
            ))
        }
        "change" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            Value::Color(apply_named_channels(args, c, |_old, new| new)?)
        }
        "adjust" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            Value::Color(apply_named_channels(args, c, |old, delta| old + delta)?)
        }
        "scale" => {
            let c = args.color(args.required(0, "color", name)?, "color")?;
            Value::Color(apply_named_channels(args, c, |old, pct| {
                if pct >= 0.0 { old + (255.0 - old) * (pct / 100.0) } else { old + old * (pct / 100.0) }
            })?)
        }
        _ => return Ok(None),
    }))
}

fn channel(args: &mut Args, fn_name: &str, channel_name: &str) -> SassResult<f64> {
    let c = args.color(args.required(0, "color", fn_name)?, "color")?;
    Ok(c.channel_named(channel_name).map(Channel::value_or_zero).unwrap_or(0.0))
}

/// Shared plumbing for `color.change`/`color.adjust`/`color.scale`: pull
/// any named argument matching one of the color's channel names (or
/// `alpha`) and fold it into the current value with `combine`.
fn apply_named_channels(args: &mut Args, color: Color, combine: impl Fn(f64, f64) -> f64) -> SassResult<Color> {
    let mut result = color;
    for (i, channel_name) in color.space().channel_names().iter().enumerate() {
        if let Some(v) = args.named(channel_name) {
            let delta = args.number(v, channel_name)?.value();
            let current = result.channels()[i].value_or_zero();
            result = result.with_channel(i, Channel::Value(combine(current, delta)));
        }
    }
    if let Some(v) = args.named("alpha") {
        let delta = args.number(v, "alpha")?.value();
        result = result.with_alpha(Channel::Value(combine(result.alpha_or_opaque(), delta)));
    }
    Ok(result)
}
