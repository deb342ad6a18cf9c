//! Colors across the CSS Color 4 color spaces (spec §3.2, §4.1).
//!
//! A color carries a space tag and up to three channel values plus
//! alpha. Channels can be "missing" (the `none` keyword), which
//! participates specially in interpolation and is `powerless` in some
//! spaces; legacy colors (`rgb`/`hsl`/named/hex) are distinguished from
//! color-4 spaces because only legacy colors serialize without a
//! `color()`/space-function wrapper.

use std::fmt;

use super::number::{format_magnitude, EPSILON};

/// The color space a [`Color`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// `rgb()`/`rgba()`/hex/named colors; channels are 0-255.
    Rgb,
    /// `hsl()`/`hsla()`; channels are (hue deg, saturation %, lightness %).
    Hsl,
    /// `hwb()`; channels are (hue deg, whiteness %, blackness %).
    Hwb,
    /// `lab()`; CIE Lab.
    Lab,
    /// `lch()`; CIE LCH.
    Lch,
    /// `oklab()`.
    Oklab,
    /// `oklch()`.
    Oklch,
    /// `color(srgb ...)`.
    Srgb,
    /// `color(srgb-linear ...)`.
    SrgbLinear,
    /// `color(display-p3 ...)`.
    DisplayP3,
    /// `color(a98-rgb ...)`.
    A98Rgb,
    /// `color(prophoto-rgb ...)`.
    ProphotoRgb,
    /// `color(rec2020 ...)`.
    Rec2020,
    /// `color(xyz ...)`/`color(xyz-d65 ...)`.
    XyzD65,
    /// `color(xyz-d50 ...)`.
    XyzD50,
    /// The LMS cone-response space CSS Color 4 uses as an interchange
    /// format for Oklab/Oklch conversion; never produced by a
    /// stylesheet color literal, only reachable via explicit space
    /// conversion (spec §3.2).
    Lms,
}

impl ColorSpace {
    /// True for the spaces reachable only through legacy syntax
    /// (`rgb()`, `hsl()`, hex, named) rather than `color()`/`lab()`/etc.
    /// Legacy colors never have missing channels and serialize without a
    /// space function wrapper (spec §3.2).
    #[must_use]
    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Rgb | Self::Hsl | Self::Hwb)
    }

    /// The CSS function/keyword name used to serialize this space inside
    /// `color(...)`, for the non-legacy, non-lab/lch/oklab/oklch spaces.
    #[must_use]
    pub fn color_fn_name(self) -> Option<&'static str> {
        match self {
            Self::Srgb => Some("srgb"),
            Self::SrgbLinear => Some("srgb-linear"),
            Self::DisplayP3 => Some("display-p3"),
            Self::A98Rgb => Some("a98-rgb"),
            Self::ProphotoRgb => Some("prophoto-rgb"),
            Self::Rec2020 => Some("rec2020"),
            Self::XyzD65 => Some("xyz-d65"),
            Self::XyzD50 => Some("xyz-d50"),
            Self::Lms => Some("lms"),
            _ => None,
        }
    }

    /// The channel names for this space, in canonical order, used for
    /// `color.channel()` lookups and error messages.
    #[must_use]
    pub fn channel_names(self) -> [&'static str; 3] {
        match self {
            Self::Rgb => ["red", "green", "blue"],
            Self::Hsl => ["hue", "saturation", "lightness"],
            Self::Hwb => ["hue", "whiteness", "blackness"],
            Self::Lab => ["lightness", "a", "b"],
            Self::Lch => ["lightness", "chroma", "hue"],
            Self::Oklab => ["lightness", "a", "b"],
            Self::Oklch => ["lightness", "chroma", "hue"],
            Self::Srgb | Self::SrgbLinear | Self::DisplayP3 | Self::A98Rgb | Self::ProphotoRgb | Self::Rec2020 => {
                ["red", "green", "blue"]
            }
            Self::XyzD65 | Self::XyzD50 => ["x", "y", "z"],
            Self::Lms => ["l", "m", "s"],
        }
    }

    /// True if hue (channel index 2 for Hwb, 0 for Hsl, 2 for Lch/Oklch)
    /// wraps modulo 360 rather than clamping. Used by interpolation's hue
    /// adjustment strategies (`shorter`/`longer`/`increasing`/`decreasing`).
    #[must_use]
    pub fn hue_channel_index(self) -> Option<usize> {
        match self {
            Self::Hsl | Self::Hwb => Some(0),
            Self::Lch | Self::Oklch => Some(2),
            _ => None,
        }
    }
}

/// A single color channel, which may be present or explicitly `none`
/// (spec §3.2 "missing components").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    /// A present numeric value.
    Value(f64),
    /// The `none` keyword: powerless, participates in interpolation as
    /// "inherit the other color's value".
    Missing,
}

impl Channel {
    /// The numeric value, treating a missing channel as `0.0` (the
    /// convention used for arithmetic and serialization fallback).
    #[must_use]
    pub fn value_or_zero(self) -> f64 {
        match self {
            Self::Value(v) => v,
            Self::Missing => 0.0,
        }
    }

    /// True if this is a missing channel.
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    fn fuzzy_eq(self, other: Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Value(a), Self::Value(b)) => (a - b).abs() <= EPSILON,
            _ => false,
        }
    }
}

impl From<f64> for Channel {
    fn from(v: f64) -> Self {
        Self::Value(v)
    }
}

/// A color in one of the CSS Color 4 color spaces (spec §3.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    space: ColorSpace,
    channels: [Channel; 3],
    alpha: Channel,
}

impl Color {
    /// Construct a color from explicit channels and alpha.
    #[must_use]
    pub fn new(space: ColorSpace, channels: [Channel; 3], alpha: Channel) -> Self {
        Self { space, channels, alpha }
    }

    /// A fully-opaque legacy RGB color, the common case for hex/named
    /// literals.
    #[must_use]
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { space: ColorSpace::Rgb, channels: [Channel::Value(r), Channel::Value(g), Channel::Value(b)], alpha: Channel::Value(1.0) }
    }

    /// `transparent`: `rgba(0, 0, 0, 0)`.
    #[must_use]
    pub fn transparent() -> Self {
        Self { space: ColorSpace::Rgb, channels: [Channel::Value(0.0); 3], alpha: Channel::Value(0.0) }
    }

    /// This color's space tag.
    #[must_use]
    pub fn space(self) -> ColorSpace {
        self.space
    }

    /// Channel values in this color's own space, in canonical order.
    #[must_use]
    pub fn channels(self) -> [Channel; 3] {
        self.channels
    }

    /// Alpha channel (`0.0..=1.0`, or missing).
    #[must_use]
    pub fn alpha(self) -> Channel {
        self.alpha
    }

    /// Alpha as a plain number, treating missing as fully opaque is
    /// *not* correct per spec; missing alpha means "none", but for the
    /// purposes of blending/serialization fallback we use `1.0`.
    #[must_use]
    pub fn alpha_or_opaque(self) -> f64 {
        match self.alpha {
            Channel::Value(a) => a,
            Channel::Missing => 1.0,
        }
    }

    /// Look up a channel (including alpha via the literal name `"alpha"`)
    /// by name, for `color.channel()`. Returns `None` for an unknown name
    /// in this color's space.
    #[must_use]
    pub fn channel_named(self, name: &str) -> Option<Channel> {
        if name == "alpha" {
            return Some(self.alpha);
        }
        let names = self.space.channel_names();
        names.iter().position(|n| *n == name).map(|i| self.channels[i])
    }

    /// Return a copy of this color with one channel replaced, for
    /// `color.change()`.
    #[must_use]
    pub fn with_channel(mut self, index: usize, value: Channel) -> Self {
        self.channels[index] = value;
        self
    }

    /// Return a copy with alpha replaced.
    #[must_use]
    pub fn with_alpha(mut self, alpha: Channel) -> Self {
        self.alpha = alpha;
        self
    }

    /// Fuzzy equality across channels and alpha; colors in different
    /// spaces are converted to a common space (sRGB) first, matching the
    /// "colors are equal if they represent the same point in color space"
    /// rule (spec §4.1).
    #[must_use]
    pub fn fuzzy_eq(&self, other: &Self) -> bool {
        if self.space == other.space {
            return self.channels.iter().zip(other.channels.iter()).all(|(a, b)| a.fuzzy_eq(*b))
                && self.alpha.fuzzy_eq(other.alpha);
        }
        let a = self.to_space(ColorSpace::Srgb);
        let b = other.to_space(ColorSpace::Srgb);
        a.channels.iter().zip(b.channels.iter()).all(|(x, y)| x.fuzzy_eq(*y)) && a.alpha.fuzzy_eq(b.alpha)
    }

    /// Convert to another color space using the CSS Color 4 conversion
    /// graph (sRGB <-> linear-sRGB <-> XYZ D65 <-> XYZ D50 <-> Lab/LCH,
    /// with Oklab/Oklch routed through XYZ D65 and HSL/HWB routed through
    /// sRGB), matching spec §3.2/§4.1.
    #[must_use]
    pub fn to_space(self, target: ColorSpace) -> Self {
        if self.space == target {
            return self;
        }
        let xyz_d65 = self.to_xyz_d65();
        let channels = from_xyz_d65(xyz_d65, target);
        Self { space: target, channels, alpha: self.alpha }
    }

    fn to_xyz_d65(self) -> [f64; 3] {
        let rgb = match self.space {
            ColorSpace::Rgb => {
                [self.channels[0].value_or_zero() / 255.0, self.channels[1].value_or_zero() / 255.0, self.channels[2].value_or_zero() / 255.0]
            }
            ColorSpace::Hsl => hsl_to_srgb(
                self.channels[0].value_or_zero(),
                self.channels[1].value_or_zero() / 100.0,
                self.channels[2].value_or_zero() / 100.0,
            ),
            ColorSpace::Hwb => hwb_to_srgb(
                self.channels[0].value_or_zero(),
                self.channels[1].value_or_zero() / 100.0,
                self.channels[2].value_or_zero() / 100.0,
            ),
            ColorSpace::Srgb => [self.channels[0].value_or_zero(), self.channels[1].value_or_zero(), self.channels[2].value_or_zero()],
            _ => [self.channels[0].value_or_zero(), self.channels[1].value_or_zero(), self.channels[2].value_or_zero()],
        };
        match self.space {
            ColorSpace::Rgb | ColorSpace::Hsl | ColorSpace::Hwb | ColorSpace::Srgb => srgb_to_xyz_d65(rgb),
            ColorSpace::SrgbLinear => linear_srgb_to_xyz_d65(rgb),
            ColorSpace::XyzD65 => rgb,
            ColorSpace::XyzD50 => xyz_d50_to_d65(rgb),
            ColorSpace::Lab => lab_to_xyz_d50_then_d65(rgb),
            ColorSpace::Lch => lab_to_xyz_d50_then_d65(lch_to_lab(rgb)),
            ColorSpace::Oklab => oklab_to_xyz_d65(rgb),
            ColorSpace::Oklch => oklab_to_xyz_d65(lch_to_lab(rgb)),
            ColorSpace::DisplayP3 => linear_p3_to_xyz_d65(srgb_to_linear_srgb(rgb)),
            ColorSpace::A98Rgb => linear_a98_to_xyz_d65(a98_to_linear(rgb)),
            ColorSpace::ProphotoRgb => xyz_d50_to_d65(linear_prophoto_to_xyz_d50(prophoto_to_linear(rgb))),
            ColorSpace::Rec2020 => linear_rec2020_to_xyz_d65(rec2020_to_linear(rgb)),
            ColorSpace::Lms => lms_to_xyz_d65(rgb),
        }
    }
}

fn from_xyz_d65(xyz: [f64; 3], target: ColorSpace) -> [Channel; 3] {
    let v = match target {
        ColorSpace::Rgb | ColorSpace::Srgb => {
            let rgb = xyz_d65_to_srgb(xyz);
            if target == ColorSpace::Rgb {
                [rgb[0] * 255.0, rgb[1] * 255.0, rgb[2] * 255.0]
            } else {
                rgb
            }
        }
        ColorSpace::Hsl => srgb_to_hsl(xyz_d65_to_srgb(xyz)),
        ColorSpace::Hwb => srgb_to_hwb(xyz_d65_to_srgb(xyz)),
        ColorSpace::SrgbLinear => xyz_d65_to_linear_srgb(xyz),
        ColorSpace::XyzD65 => xyz,
        ColorSpace::XyzD50 => xyz_d65_to_d50(xyz),
        ColorSpace::Lab => xyz_d65_to_lab_d50(xyz),
        ColorSpace::Lch => lab_to_lch(xyz_d65_to_lab_d50(xyz)),
        ColorSpace::Oklab => xyz_d65_to_oklab(xyz),
        ColorSpace::Oklch => lab_to_lch(xyz_d65_to_oklab(xyz)),
        ColorSpace::DisplayP3 => linear_srgb_to_srgb(xyz_d65_to_linear_p3(xyz)),
        ColorSpace::A98Rgb => linear_to_a98(xyz_d65_to_linear_a98(xyz)),
        ColorSpace::ProphotoRgb => linear_to_prophoto(xyz_d65_to_linear_prophoto(xyz_d65_to_d50(xyz))),
        ColorSpace::Rec2020 => linear_to_rec2020(xyz_d65_to_linear_rec2020(xyz)),
        ColorSpace::Lms => xyz_d65_to_lms(xyz),
    };
    [Channel::Value(v[0]), Channel::Value(v[1]), Channel::Value(v[2])]
}

fn srgb_channel_to_linear(c: f64) -> f64 {
    if c.abs() <= 0.040_45 {
        c / 12.92
    } else {
        c.signum() * ((c.abs() + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_channel_to_srgb(c: f64) -> f64 {
    if c.abs() <= 0.003_130_8 {
        c * 12.92
    } else {
        c.signum() * (1.055 * c.abs().powf(1.0 / 2.4) - 0.055)
    }
}

fn srgb_to_linear_srgb(rgb: [f64; 3]) -> [f64; 3] {
    [srgb_channel_to_linear(rgb[0]), srgb_channel_to_linear(rgb[1]), srgb_channel_to_linear(rgb[2])]
}

fn linear_srgb_to_srgb(rgb: [f64; 3]) -> [f64; 3] {
    [linear_channel_to_srgb(rgb[0]), linear_channel_to_srgb(rgb[1]), linear_channel_to_srgb(rgb[2])]
}

/// sRGB linear -> XYZ D65, the standard matrix from the CSS Color 4 spec.
fn linear_srgb_to_xyz_d65(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    [
        0.412_390_8 * r + 0.357_584_3 * g + 0.180_480_8 * b,
        0.212_639_0 * r + 0.715_168_7 * g + 0.072_192_3 * b,
        0.019_330_8 * r + 0.119_194_8 * g + 0.950_532_1 * b,
    ]
}

fn xyz_d65_to_linear_srgb(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        3.240_969_9 * x - 1.537_383_2 * y - 0.498_610_8 * z,
        -0.969_243_6 * x + 1.875_967_5 * y + 0.041_555_1 * z,
        0.055_630_1 * x - 0.203_976_9 * y + 1.056_971_5 * z,
    ]
}

fn srgb_to_xyz_d65(rgb: [f64; 3]) -> [f64; 3] {
    linear_srgb_to_xyz_d65(srgb_to_linear_srgb(rgb))
}

fn xyz_d65_to_srgb(xyz: [f64; 3]) -> [f64; 3] {
    linear_srgb_to_srgb(xyz_d65_to_linear_srgb(xyz))
}

/// Display-P3 shares sRGB's transfer curve; only its primaries differ,
/// so only the linear RGB <-> XYZ D65 matrices below are specific to it.
fn linear_p3_to_xyz_d65(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    [
        0.486_570_95 * r + 0.265_667_69 * g + 0.198_217_29 * b,
        0.228_974_56 * r + 0.691_738_52 * g + 0.079_286_91 * b,
        0.0 * r + 0.045_113_38 * g + 1.043_944_37 * b,
    ]
}

fn xyz_d65_to_linear_p3(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        2.493_496_91 * x - 0.931_383_62 * y - 0.402_710_78 * z,
        -0.829_488_97 * x + 1.762_664_06 * y + 0.023_624_69 * z,
        0.035_845_83 * x - 0.076_172_39 * y + 0.956_884_52 * z,
    ]
}

/// Adobe RGB (1998); a plain power-law transfer curve, no linear toe.
fn a98_to_linear(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(|c| c.signum() * c.abs().powf(563.0 / 256.0))
}

fn linear_to_a98(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(|c| c.signum() * c.abs().powf(256.0 / 563.0))
}

fn linear_a98_to_xyz_d65(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    [
        0.576_669_04 * r + 0.185_558_24 * g + 0.188_228_65 * b,
        0.297_344_98 * r + 0.627_363_57 * g + 0.075_291_46 * b,
        0.027_031_36 * r + 0.070_688_85 * g + 0.991_337_54 * b,
    ]
}

fn xyz_d65_to_linear_a98(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        2.041_587_90 * x - 0.565_006_97 * y - 0.344_731_35 * z,
        -0.969_243_64 * x + 1.875_967_50 * y + 0.041_555_06 * z,
        0.013_444_28 * x - 0.118_362_39 * y + 1.015_174_99 * z,
    ]
}

/// ProPhoto RGB; a power-law curve with a small linear toe, natively
/// referenced to the D50 white point (so conversion to/from XYZ D65
/// routes through [`xyz_d50_to_d65`]/[`xyz_d65_to_d50`]).
fn prophoto_to_linear(rgb: [f64; 3]) -> [f64; 3] {
    const ET2: f64 = 16.0 / 512.0;
    rgb.map(|c| if c.abs() <= ET2 { c / 16.0 } else { c.signum() * c.abs().powf(1.8) })
}

fn linear_to_prophoto(rgb: [f64; 3]) -> [f64; 3] {
    const ET: f64 = 1.0 / 512.0;
    rgb.map(|c| if c.abs() >= ET { c.signum() * c.abs().powf(1.0 / 1.8) } else { 16.0 * c })
}

fn linear_prophoto_to_xyz_d50(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    [
        0.797_760_49 * r + 0.135_185_84 * g + 0.031_349_35 * b,
        0.288_071_13 * r + 0.711_843_22 * g + 0.000_085_65 * b,
        0.0 * r + 0.0 * g + 0.825_104_60 * b,
    ]
}

fn xyz_d65_to_linear_prophoto(xyz_d50: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz_d50;
    [
        1.345_798_97 * x - 0.255_580_10 * y - 0.051_106_29 * z,
        -0.544_622_49 * x + 1.508_232_74 * y + 0.020_536_03 * z,
        0.0 * x + 0.0 * y + 1.211_967_55 * z,
    ]
}

/// Rec. 2020; a power-law curve with a linear toe scaled by `alpha`.
fn rec2020_to_linear(rgb: [f64; 3]) -> [f64; 3] {
    const ALPHA: f64 = 1.099_296_826_809_44;
    const BETA: f64 = 0.018_053_968_510_807;
    rgb.map(|c| {
        let abs = c.abs();
        if abs < BETA * 4.5 {
            c / 4.5
        } else {
            c.signum() * ((abs + ALPHA - 1.0) / ALPHA).powf(1.0 / 0.45)
        }
    })
}

fn linear_to_rec2020(rgb: [f64; 3]) -> [f64; 3] {
    const ALPHA: f64 = 1.099_296_826_809_44;
    const BETA: f64 = 0.018_053_968_510_807;
    rgb.map(|c| {
        let abs = c.abs();
        if abs > BETA {
            c.signum() * (ALPHA * abs.powf(0.45) - (ALPHA - 1.0))
        } else {
            4.5 * c
        }
    })
}

fn linear_rec2020_to_xyz_d65(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    [
        0.636_958_05 * r + 0.144_616_90 * g + 0.168_880_98 * b,
        0.262_700_21 * r + 0.677_998_07 * g + 0.059_301_72 * b,
        0.0 * r + 0.028_072_69 * g + 1.060_985_06 * b,
    ]
}

fn xyz_d65_to_linear_rec2020(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        1.716_651_19 * x - 0.355_670_78 * y - 0.253_366_28 * z,
        -0.666_684_35 * x + 1.616_481_24 * y + 0.015_768_55 * z,
        0.017_639_86 * x - 0.042_770_61 * y + 0.942_103_12 * z,
    ]
}

/// XYZ D65 <-> LMS, the cone-response matrices Oklab's conversion
/// pipeline uses internally (CSS Color 4 §11).
fn xyz_d65_to_lms(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        0.819_022_44 * x + 0.361_906_26 * y - 0.128_873_79 * z,
        0.032_983_67 * x + 0.929_286_85 * y + 0.036_144_67 * z,
        0.048_177_20 * x + 0.264_239_52 * y + 0.633_547_83 * z,
    ]
}

fn lms_to_xyz_d65(lms: [f64; 3]) -> [f64; 3] {
    let [l, m, s] = lms;
    [
        1.226_879_87 * l - 0.557_814_997 * m + 0.281_391_05 * s,
        -0.040_575_76 * l + 1.112_286_83 * m - 0.071_711_07 * s,
        -0.076_372_95 * l - 0.421_493_32 * m + 1.586_924_02 * s,
    ]
}

/// Bradford chromatic adaptation matrices between D65 and D50 white
/// points, as specified by CSS Color 4.
fn xyz_d65_to_d50(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        1.047_886_4 * x + 0.022_928_6 * y - 0.050_154_8 * z,
        0.029_627_7 * x + 0.990_434_4 * y - 0.017_073_5 * z,
        -0.009_243_0 * x + 0.015_055_3 * y + 0.751_998_9 * z,
    ]
}

fn xyz_d50_to_d65(xyz: [f64; 3]) -> [f64; 3] {
    let [x, y, z] = xyz;
    [
        0.955_473_4 * x - 0.023_098_3 * y + 0.063_325_4 * z,
        -0.028_369_3 * x + 1.009_995_0 * y + 0.021_041_4 * z,
        0.012_314_9 * x - 0.020_507_7 * y + 1.330_23 * z,
    ]
}

const LAB_EPSILON: f64 = 216.0 / 24389.0;
const LAB_KAPPA: f64 = 24389.0 / 27.0;
const D50_WHITE: [f64; 3] = [0.964_56, 1.0, 0.825_21];

fn xyz_d65_to_lab_d50(xyz: [f64; 3]) -> [f64; 3] {
    let xyz50 = xyz_d65_to_d50(xyz);
    let f = |v: f64, w: f64| {
        let r = v / w;
        if r > LAB_EPSILON {
            r.cbrt()
        } else {
            (LAB_KAPPA * r + 16.0) / 116.0
        }
    };
    let fx = f(xyz50[0], D50_WHITE[0]);
    let fy = f(xyz50[1], D50_WHITE[1]);
    let fz = f(xyz50[2], D50_WHITE[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn lab_to_xyz_d50_then_d65(lab: [f64; 3]) -> [f64; 3] {
    let [l, a, b] = lab;
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let finv = |f: f64| if f.powi(3) > LAB_EPSILON { f.powi(3) } else { (116.0 * f - 16.0) / LAB_KAPPA };
    let xyz50 = [finv(fx) * D50_WHITE[0], if l > 8.0 { fy.powi(3) } else { l / LAB_KAPPA } * D50_WHITE[1], finv(fz) * D50_WHITE[2]];
    xyz_d50_to_d65(xyz50)
}

fn lab_to_lch(lab: [f64; 3]) -> [f64; 3] {
    let [l, a, b] = lab;
    let c = a.hypot(b);
    let mut h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h += 360.0;
    }
    [l, c, h]
}

fn lch_to_lab(lch: [f64; 3]) -> [f64; 3] {
    let [l, c, h] = lch;
    let rad = h.to_radians();
    [l, c * rad.cos(), c * rad.sin()]
}

fn oklab_nonlinear_to_linear_srgb(lab: [f64; 3]) -> [f64; 3] {
    let [l, a, b] = lab;
    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548 * b;
    let l3 = l_.powi(3);
    let m3 = m_.powi(3);
    let s3 = s_.powi(3);
    [
        4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3,
        -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3,
        -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701 * s3,
    ]
}

fn linear_srgb_to_oklab_nonlinear(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    let l = 0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b;
    let m = 0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b;
    let s = 0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b;
    let l_ = l.cbrt();
    let m_ = m.cbrt();
    let s_ = s.cbrt();
    [
        0.210_454_255_3 * l_ + 0.793_617_785 * m_ - 0.004_072_046_8 * s_,
        1.977_998_495_1 * l_ - 2.428_592_205 * m_ + 0.450_593_709_9 * s_,
        0.025_904_037_1 * l_ + 0.782_771_766_2 * m_ - 0.808_675_766 * s_,
    ]
}

fn oklab_to_xyz_d65(lab: [f64; 3]) -> [f64; 3] {
    linear_srgb_to_xyz_d65(oklab_nonlinear_to_linear_srgb(lab))
}

fn xyz_d65_to_oklab(xyz: [f64; 3]) -> [f64; 3] {
    linear_srgb_to_oklab_nonlinear(xyz_d65_to_linear_srgb(xyz))
}

fn hsl_to_srgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    if s == 0.0 {
        return [l; 3];
    }
    let h = h.rem_euclid(360.0) / 360.0;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [hue_to_rgb(p, q, h + 1.0 / 3.0), hue_to_rgb(p, q, h), hue_to_rgb(p, q, h - 1.0 / 3.0)]
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn srgb_to_hsl(rgb: [f64; 3]) -> [f64; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return [0.0, 0.0, l * 100.0];
    }
    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let mut h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h *= 60.0;
    [h, s * 100.0, l * 100.0]
}

fn hwb_to_srgb(h: f64, w: f64, b: f64) -> [f64; 3] {
    if w + b >= 1.0 {
        let gray = w / (w + b);
        return [gray; 3];
    }
    let rgb = hsl_to_srgb(h, 1.0, 0.5);
    rgb.map(|c| c * (1.0 - w - b) + w)
}

fn srgb_to_hwb(rgb: [f64; 3]) -> [f64; 3] {
    let [h, _, _] = srgb_to_hsl(rgb);
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    [h, min * 100.0, (1.0 - max) * 100.0]
}

impl fmt::Display for Color {
    /// Render the CSS text for this color (spec §3.2/§4.5, example
    /// scenario 4): legacy spaces (`rgb`/`hsl`/`hwb`) always serialize
    /// through their sRGB-hex (or `rgb(... / a)` with transparency)
    /// legacy form regardless of which one the value was constructed
    /// in; non-legacy spaces go through the generic `color(<space> ...)`
    /// syntax, or the dedicated `lab()`/`lch()`/`oklab()`/`oklch()`
    /// functions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = |c: Channel| match c {
            Channel::Value(v) => format_magnitude(v),
            Channel::Missing => "none".to_string(),
        };
        let alpha_suffix = |alpha: Channel| -> String {
            match alpha {
                Channel::Value(a) if (a - 1.0).abs() <= EPSILON => String::new(),
                other => format!(" / {}", ch(other)),
            }
        };
        if self.space.is_legacy() {
            let rgb = self.to_space(ColorSpace::Rgb);
            let [r, g, b] = rgb.channels;
            return match rgb.alpha {
                Channel::Value(a) if (a - 1.0).abs() <= EPSILON => {
                    write!(
                        f,
                        "#{:02x}{:02x}{:02x}",
                        r.value_or_zero().round().clamp(0.0, 255.0) as u8,
                        g.value_or_zero().round().clamp(0.0, 255.0) as u8,
                        b.value_or_zero().round().clamp(0.0, 255.0) as u8,
                    )
                }
                other => write!(f, "rgb({} {} {}{})", ch(r), ch(g), ch(b), alpha_suffix(other)),
            };
        }
        match self.space {
            ColorSpace::Lab => {
                let [l, a, b] = self.channels;
                write!(f, "lab({} {} {}{})", ch(l), ch(a), ch(b), alpha_suffix(self.alpha))
            }
            ColorSpace::Lch => {
                let [l, c, h] = self.channels;
                write!(f, "lch({} {} {}{})", ch(l), ch(c), ch(h), alpha_suffix(self.alpha))
            }
            ColorSpace::Oklab => {
                let [l, a, b] = self.channels;
                write!(f, "oklab({} {} {}{})", ch(l), ch(a), ch(b), alpha_suffix(self.alpha))
            }
            ColorSpace::Oklch => {
                let [l, c, h] = self.channels;
                write!(f, "oklch({} {} {}{})", ch(l), ch(c), ch(h), alpha_suffix(self.alpha))
            }
            _ => {
                let name = self.space.color_fn_name().unwrap_or("srgb");
                let [a, b, c] = self.channels;
                write!(f, "color({} {} {} {}{})", name, ch(a), ch(b), ch(c), alpha_suffix(self.alpha))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_round_trips_rgb_to_hsl_and_back() {
        let white = Color::rgb(255.0, 255.0, 255.0);
        let hsl = white.to_space(ColorSpace::Hsl);
        let back = hsl.to_space(ColorSpace::Rgb);
        assert!(back.fuzzy_eq(&white));
    }

    #[test]
    fn black_has_zero_lightness_in_lab() {
        let black = Color::rgb(0.0, 0.0, 0.0);
        let lab = black.to_space(ColorSpace::Lab);
        assert!(lab.channels()[0].value_or_zero().abs() < 1e-6);
    }

    #[test]
    fn missing_channel_survives_space_tag() {
        let c = Color::new(ColorSpace::Hsl, [Channel::Missing, Channel::Value(50.0), Channel::Value(50.0)], Channel::Value(1.0));
        assert!(c.channels()[0].is_missing());
    }

    #[test]
    fn transparent_has_zero_alpha() {
        assert_eq!(Color::transparent().alpha_or_opaque(), 0.0);
    }

    #[test]
    fn channel_named_looks_up_by_space() {
        let c = Color::rgb(10.0, 20.0, 30.0);
        assert_eq!(c.channel_named("green"), Some(Channel::Value(20.0)));
        assert_eq!(c.channel_named("hue"), None);
    }

    #[test]
    fn red_round_trips_through_oklch() {
        let red = Color::rgb(255.0, 0.0, 0.0);
        let oklch = red.to_space(ColorSpace::Oklch);
        let back = oklch.to_space(ColorSpace::Rgb);
        assert!(back.fuzzy_eq(&red));
    }
}
