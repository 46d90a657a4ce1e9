// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: brush plotters
//!
//! A [`Shader`] is a brush resolved against the current transform into a
//! function from device pixel to premultiplied color. [`BrushPlotter`]
//! receives rasterizer coverage and composites shader colors into a
//! bitmap.

use super::bitmap::Bitmap;
use super::composite::{composite_pixel, BlendMode, CompositeMode};
use crate::geometry::Matrix;
use crate::raster::Plotter;
use crate::types::{Brush, Color, GradientStop, Rect, Vec2};

/// Number of entries in a baked gradient.
pub const GRADIENT_LUT_SIZE: usize = 256;

/// Gradient stops baked into premultiplied colors. Owned by the paint
/// engine and rebaked in place for every gradient draw.
#[derive(Debug, Clone)]
pub struct GradientLut {
    colors: Box<[[u8; 4]; GRADIENT_LUT_SIZE]>,
}

impl Default for GradientLut {
    fn default() -> Self {
        Self {
            colors: Box::new([[0; 4]; GRADIENT_LUT_SIZE]),
        }
    }
}

impl GradientLut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpolate `stops` in non-premultiplied space. No stops bakes
    /// transparent; one stop bakes a constant.
    pub fn bake(&mut self, stops: &[GradientStop]) {
        for (i, slot) in self.colors.iter_mut().enumerate() {
            let t = i as f32 / (GRADIENT_LUT_SIZE - 1) as f32;
            *slot = sample_stops(stops, t).premultiply();
        }
    }

    /// Color at `t`, padded outside 0..1.
    pub fn lookup(&self, t: f32) -> [u8; 4] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.colors[(t * (GRADIENT_LUT_SIZE - 1) as f32 + 0.5) as usize]
    }
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let l = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t + 0.5) as u8;
    Color::rgba(l(a.r, b.r), l(a.g, b.g), l(a.b, b.b), l(a.a, b.a))
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Color {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for win in stops.windows(2) {
        let (s0, s1) = (win[0], win[1]);
        if t <= s1.offset {
            let span = s1.offset - s0.offset;
            if span <= 0.0 {
                return s1.color;
            }
            return lerp_color(s0.color, s1.color, (t - s0.offset) / span);
        }
    }
    last.color
}

/// Brush resolved for one draw call.
#[derive(Debug, Clone)]
pub enum Shader<'a> {
    Solid([u8; 4]),
    Linear {
        inverse: Matrix,
        start: Vec2,
        /// Gradient direction divided by its squared length.
        axis: Vec2,
        lut: &'a GradientLut,
    },
    Radial {
        inverse: Matrix,
        center: Vec2,
        inv_radius: f32,
        lut: &'a GradientLut,
    },
    Pattern {
        inverse: Matrix,
        image: &'a Bitmap,
        /// Sampled part of `image`; repeat and clamp act on it.
        region: Rect,
        repeat: bool,
    },
}

impl<'a> Shader<'a> {
    /// Resolve `brush` drawn under `matrix` (user to device). Returns
    /// `None` when the transform cannot be inverted, which leaves nothing
    /// to sample.
    pub fn new(brush: &'a Brush, matrix: &Matrix, lut: &'a mut GradientLut) -> Option<Shader<'a>> {
        match brush {
            Brush::Solid(c) => Some(Shader::Solid(c.premultiply())),
            Brush::Linear(g) => {
                let inverse = matrix.invert()?;
                let d = g.end - g.start;
                let len_sq = d.length_sq();
                let axis = if len_sq > 0.0 { d * (1.0 / len_sq) } else { Vec2::default() };
                lut.bake(&g.stops);
                Some(Shader::Linear {
                    inverse,
                    start: g.start,
                    axis,
                    lut,
                })
            }
            Brush::Radial(g) => {
                let inverse = matrix.invert()?;
                lut.bake(&g.stops);
                Some(Shader::Radial {
                    inverse,
                    center: g.center,
                    inv_radius: if g.radius > 0.0 { 1.0 / g.radius } else { 0.0 },
                    lut,
                })
            }
            Brush::Pattern(p) => {
                let to_device = p.transform.then(matrix);
                Shader::image(&p.image, p.image.bounds(), &to_device, p.repeat)
            }
        }
    }

    /// Sample `region` of `image`, whose pixels `to_device` maps into
    /// device space.
    pub fn image(
        image: &'a Bitmap,
        region: Rect,
        to_device: &Matrix,
        repeat: bool,
    ) -> Option<Shader<'a>> {
        let region = region.intersect(&image.bounds());
        Some(Shader::Pattern {
            inverse: to_device.invert()?,
            image,
            region,
            repeat,
        })
    }

    /// Opaque solid colors allow direct writes.
    fn solid_opaque(&self) -> Option<[u8; 4]> {
        match self {
            Shader::Solid(px) if px[3] == 255 => Some(*px),
            _ => None,
        }
    }

    /// Premultiplied color of device pixel `(x, y)`, sampled at its center.
    pub fn color_at(&self, x: i32, y: i32) -> [u8; 4] {
        let device = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        match self {
            Shader::Solid(px) => *px,
            Shader::Linear {
                inverse,
                start,
                axis,
                lut,
            } => {
                let p = inverse.map_point(device);
                lut.lookup((p - *start).dot(*axis))
            }
            Shader::Radial {
                inverse,
                center,
                inv_radius,
                lut,
            } => {
                let p = inverse.map_point(device);
                let t = if *inv_radius > 0.0 {
                    (p - *center).length() * inv_radius
                } else {
                    1.0
                };
                lut.lookup(t)
            }
            Shader::Pattern {
                inverse,
                image,
                region,
                repeat,
            } => {
                if region.is_empty() {
                    return [0; 4];
                }
                let p = inverse.map_point(device);
                if !(p.x.is_finite() && p.y.is_finite()) {
                    return [0; 4];
                }
                let (sx, sy) = (p.x.floor() as i32, p.y.floor() as i32);
                let (sx, sy) = if *repeat {
                    (
                        region.left + (sx - region.left).rem_euclid(region.width()),
                        region.top + (sy - region.top).rem_euclid(region.height()),
                    )
                } else {
                    (
                        sx.clamp(region.left, region.right - 1),
                        sy.clamp(region.top, region.bottom - 1),
                    )
                };
                image.pixel(sx, sy)
            }
        }
    }
}

/// Plotter compositing shader colors into a bitmap. Device pixel `(x, y)`
/// lands on bitmap pixel `(x - origin.0, y - origin.1)`; pixels outside
/// the bitmap are dropped.
pub struct BrushPlotter<'s, 'a> {
    target: &'s mut Bitmap,
    origin: (i32, i32),
    shader: &'s Shader<'a>,
    mode: CompositeMode,
    blend: BlendMode,
    direct: Option<[u8; 4]>,
}

impl<'s, 'a> BrushPlotter<'s, 'a> {
    pub fn new(
        target: &'s mut Bitmap,
        origin: (i32, i32),
        shader: &'s Shader<'a>,
        mode: CompositeMode,
        blend: BlendMode,
    ) -> Self {
        let direct = match (mode, blend) {
            (CompositeMode::Copy, _) => shader.solid_opaque(),
            (CompositeMode::SourceOver, BlendMode::Normal) => shader.solid_opaque(),
            _ => None,
        };
        Self {
            target,
            origin,
            shader,
            mode,
            blend,
            direct,
        }
    }

    fn write_span(&mut self, x0: i32, x1: i32, y: i32, alpha: u8) {
        let (ox, oy) = self.origin;
        let bx0 = (x0 - ox).max(0);
        let row = self.target.row_mut(y - oy, bx0, x1 - ox);
        if row.is_empty() {
            return;
        }
        let start = bx0 + ox;
        if let (Some(px), 255) = (self.direct, alpha) {
            for dst in row.chunks_exact_mut(4) {
                dst.copy_from_slice(&px);
            }
            return;
        }
        for (i, dst) in row.chunks_exact_mut(4).enumerate() {
            let src = self.shader.color_at(start + i as i32, y);
            let d = [dst[0], dst[1], dst[2], dst[3]];
            dst.copy_from_slice(&composite_pixel(d, src, self.mode, self.blend, alpha));
        }
    }
}

impl Plotter for BrushPlotter<'_, '_> {
    fn set_pixel(&mut self, x: i32, y: i32) {
        self.write_span(x, x + 1, y, 255);
    }

    fn mix_pixel(&mut self, x: i32, y: i32, alpha: u8) {
        self.write_span(x, x + 1, y, alpha);
    }

    fn set_scan_line(&mut self, x0: i32, x1: i32, y: i32) {
        self.write_span(x0, x1, y, 255);
    }

    fn mix_scan_line(&mut self, x0: i32, x1: i32, y: i32, alpha: u8) {
        self.write_span(x0, x1, y, alpha);
    }
}
