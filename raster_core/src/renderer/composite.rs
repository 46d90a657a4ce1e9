// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: Porter-Duff compositing and W3C blend modes
//!
//! Pixels are premultiplied RGBA8. Blend modes are evaluated on
//! non-premultiplied color per W3C Compositing and Blending Level 1, then the
//! result goes through the composite mode's blend factors.

use serde::{Deserialize, Serialize};

use crate::types::mul_div_255;

/// Porter-Duff composite operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum CompositeMode {
    Copy,
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Xor,
    Lighter,
}

impl CompositeMode {
    pub const ALL: [CompositeMode; 11] = [
        CompositeMode::Copy,
        CompositeMode::SourceOver,
        CompositeMode::SourceIn,
        CompositeMode::SourceOut,
        CompositeMode::SourceAtop,
        CompositeMode::DestinationOver,
        CompositeMode::DestinationIn,
        CompositeMode::DestinationOut,
        CompositeMode::DestinationAtop,
        CompositeMode::Xor,
        CompositeMode::Lighter,
    ];
}

/// Multiplier applied to a premultiplied color in a composite equation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    /// Source alpha
    Src,
    /// Destination alpha
    Dst,
    OneMinusSrc,
    OneMinusDst,
}

impl BlendFactor {
    fn eval(self, sa: f32, da: f32) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => 1.0,
            BlendFactor::Src => sa,
            BlendFactor::Dst => da,
            BlendFactor::OneMinusSrc => 1.0 - sa,
            BlendFactor::OneMinusDst => 1.0 - da,
        }
    }
}

/// `result = src * src_factor + dst * dst_factor`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CompositeOperation {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

/// Blend factors of a composite mode.
pub fn get_blend_factors(mode: CompositeMode) -> CompositeOperation {
    use BlendFactor::*;
    let (src, dst) = match mode {
        CompositeMode::Copy => (One, Zero),
        CompositeMode::SourceOver => (One, OneMinusSrc),
        CompositeMode::SourceIn => (Dst, Zero),
        CompositeMode::SourceOut => (OneMinusDst, Zero),
        CompositeMode::SourceAtop => (Dst, OneMinusSrc),
        CompositeMode::DestinationOver => (OneMinusDst, One),
        CompositeMode::DestinationIn => (Zero, Src),
        CompositeMode::DestinationOut => (Zero, OneMinusSrc),
        CompositeMode::DestinationAtop => (OneMinusDst, Src),
        CompositeMode::Xor => (OneMinusDst, OneMinusSrc),
        CompositeMode::Lighter => (One, One),
    };
    CompositeOperation { src, dst }
}

/// W3C blend mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub const ALL: [BlendMode; 16] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Color,
        BlendMode::Luminosity,
    ];

    /// `B(cb, cs)` on non-premultiplied backdrop and source colors in 0..1.
    pub fn blend(self, cb: [f32; 3], cs: [f32; 3]) -> [f32; 3] {
        match self {
            BlendMode::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
            BlendMode::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
            BlendMode::Color => set_lum(cs, lum(cb)),
            BlendMode::Luminosity => set_lum(cb, lum(cs)),
            _ => [
                self.blend_channel(cb[0], cs[0]),
                self.blend_channel(cb[1], cs[1]),
                self.blend_channel(cb[2], cs[2]),
            ],
        }
    }

    fn blend_channel(self, cb: f32, cs: f32) -> f32 {
        match self {
            BlendMode::Normal => cs,
            BlendMode::Multiply => cb * cs,
            BlendMode::Screen => screen(cb, cs),
            BlendMode::Overlay => hard_light(cs, cb),
            BlendMode::Darken => cb.min(cs),
            BlendMode::Lighten => cb.max(cs),
            BlendMode::ColorDodge => {
                if cb == 0.0 {
                    0.0
                } else if cs >= 1.0 {
                    1.0
                } else {
                    (cb / (1.0 - cs)).min(1.0)
                }
            }
            BlendMode::ColorBurn => {
                if cb >= 1.0 {
                    1.0
                } else if cs == 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - cb) / cs).min(1.0)
                }
            }
            BlendMode::HardLight => hard_light(cb, cs),
            BlendMode::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
            BlendMode::Difference => (cb - cs).abs(),
            BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
            BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Luminosity => cs,
        }
    }
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max <= min {
        return [0.0; 3];
    }
    let scale = s / (max - min);
    [(c[0] - min) * scale, (c[1] - min) * scale, (c[2] - min) * scale]
}

fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

fn lerp_byte(a: u8, b: u8, t: u8) -> u8 {
    let t = t as u32;
    (mul_div_255(a as u32, 255 - t) as u32 + mul_div_255(b as u32, t) as u32).min(255) as u8
}

/// Composite the premultiplied `src` onto `dst` with `coverage` (0..=255)
/// weighting the result against the untouched destination.
pub fn composite_pixel(
    dst: [u8; 4],
    src: [u8; 4],
    mode: CompositeMode,
    blend: BlendMode,
    coverage: u8,
) -> [u8; 4] {
    if coverage == 0 {
        return dst;
    }
    if mode == CompositeMode::SourceOver && blend == BlendMode::Normal {
        let src = if coverage == 255 {
            src
        } else {
            src.map(|c| mul_div_255(c as u32, coverage as u32))
        };
        let inv = 255 - src[3] as u32;
        return [0, 1, 2, 3].map(|i| src[i].saturating_add(mul_div_255(dst[i] as u32, inv)));
    }

    let sa = to_unit(src[3]);
    let da = to_unit(dst[3]);
    let sp = [to_unit(src[0]), to_unit(src[1]), to_unit(src[2])];
    let dp = [to_unit(dst[0]), to_unit(dst[1]), to_unit(dst[2])];

    let sp = if blend == BlendMode::Normal || sa == 0.0 {
        sp
    } else {
        let cs = sp.map(|c| (c / sa).min(1.0));
        let cb = if da > 0.0 {
            dp.map(|c| (c / da).min(1.0))
        } else {
            [0.0; 3]
        };
        let b = blend.blend(cb, cs);
        [0, 1, 2].map(|i| sa * ((1.0 - da) * cs[i] + da * b[i].clamp(0.0, 1.0)))
    };

    let op = get_blend_factors(mode);
    let fs = op.src.eval(sa, da);
    let fd = op.dst.eval(sa, da);
    let a = (sa * fs + da * fd).min(1.0);
    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = to_byte((sp[i] * fs + dp[i] * fd).min(a));
    }
    out[3] = to_byte(a);

    if coverage == 255 {
        out
    } else {
        [0, 1, 2, 3].map(|i| lerp_byte(dst[i], out[i], coverage))
    }
}
