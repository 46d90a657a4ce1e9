// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: scanline rasterizer
//!
//! Converts polygon sets, trapezoid chains and line segments into pixel
//! coverage delivered through a [`Plotter`]. The rasterizer never touches
//! a surface directly and never allocates per call once its scratch
//! buffers have grown; a [`Rasterizer`] is owned by one paint session.

mod clip;
mod edge;
mod line;
mod mask;
mod polygon;
mod trapezoid;

pub use clip::{clip_line, clip_polygon, PolygonClip};
pub use edge::{sort_edges, Edge};
pub use line::rasterize_line;
pub use mask::AlphaMask;
pub use trapezoid::Accumulator;

use crate::types::{FillRule, Rect, Vec2};
use edge::ActiveList;

/// Pixel sink for the rasterizer. Scan lines cover `[x0, x1)`.
pub trait Plotter {
    /// Fully covered pixel.
    fn set_pixel(&mut self, x: i32, y: i32);
    /// Partially covered pixel; `alpha` is the coverage in 1..=254.
    fn mix_pixel(&mut self, x: i32, y: i32, alpha: u8);
    /// Run of fully covered pixels.
    fn set_scan_line(&mut self, x0: i32, x1: i32, y: i32);
    /// Run of pixels sharing one partial coverage.
    fn mix_scan_line(&mut self, x0: i32, x1: i32, y: i32, alpha: u8);
}

impl<P: Plotter + ?Sized> Plotter for &mut P {
    fn set_pixel(&mut self, x: i32, y: i32) {
        (**self).set_pixel(x, y)
    }

    fn mix_pixel(&mut self, x: i32, y: i32, alpha: u8) {
        (**self).mix_pixel(x, y, alpha)
    }

    fn set_scan_line(&mut self, x0: i32, x1: i32, y: i32) {
        (**self).set_scan_line(x0, x1, y)
    }

    fn mix_scan_line(&mut self, x0: i32, x1: i32, y: i32, alpha: u8) {
        (**self).mix_scan_line(x0, x1, y, alpha)
    }
}

/// Parameters shared by every rasterizer entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RastParams {
    pub antialias: bool,
    /// Destination clip box; nothing outside it is ever plotted.
    pub clip: Rect,
    pub fill_rule: FillRule,
}

impl RastParams {
    pub fn new(clip: Rect) -> Self {
        Self {
            antialias: true,
            clip,
            fill_rule: FillRule::NonZero,
        }
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }
}

/// Per-session rasterizer scratch state. Buffers are cleared between calls,
/// never shrunk.
#[derive(Debug, Default)]
pub struct Rasterizer {
    edges: Vec<Edge>,
    active: ActiveList,
    crossings: Vec<(f32, i32)>,
    clipped: Vec<Vec2>,
    clip_scratch: Vec<Vec2>,
    area: Vec<f32>,
    fill: Vec<f32>,
    accumulator: Accumulator,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Quantize a coverage value to 8 bits.
pub(crate) fn coverage_to_alpha(coverage: f32) -> u8 {
    (coverage.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Plot the pixels of row `y` whose centers lie in `[a, b)`, clamped to
/// `[left, right)`.
pub(crate) fn center_span<P: Plotter + ?Sized>(
    plotter: &mut P,
    a: f32,
    b: f32,
    y: i32,
    left: i32,
    right: i32,
) {
    let x0 = ((a - 0.5).ceil() as i32).max(left);
    let x1 = ((b - 0.5).ceil() as i32).min(right);
    if x0 < x1 {
        plotter.set_scan_line(x0, x1, y);
    }
}

/// Emits one row of per-pixel alphas, merging opaque pixels into spans.
/// Pixels must be pushed left to right.
pub(crate) struct RowWriter {
    y: i32,
    run: Option<(i32, i32)>,
}

impl RowWriter {
    pub(crate) fn new(y: i32) -> Self {
        Self { y, run: None }
    }

    pub(crate) fn push<P: Plotter + ?Sized>(&mut self, plotter: &mut P, x: i32, alpha: u8) {
        match alpha {
            0 => self.flush(plotter),
            255 => match self.run {
                Some((start, end)) if end == x => self.run = Some((start, x + 1)),
                _ => {
                    self.flush(plotter);
                    self.run = Some((x, x + 1));
                }
            },
            a => {
                self.flush(plotter);
                plotter.mix_pixel(x, self.y, a);
            }
        }
    }

    /// Push a run of opaque pixels `[x0, x1)`.
    pub(crate) fn push_span<P: Plotter + ?Sized>(&mut self, plotter: &mut P, x0: i32, x1: i32) {
        if x0 >= x1 {
            return;
        }
        match self.run {
            Some((start, end)) if end == x0 => self.run = Some((start, x1)),
            _ => {
                self.flush(plotter);
                self.run = Some((x0, x1));
            }
        }
    }

    pub(crate) fn flush<P: Plotter + ?Sized>(&mut self, plotter: &mut P) {
        if let Some((x0, x1)) = self.run.take() {
            if x1 - x0 == 1 {
                plotter.set_pixel(x0, self.y);
            } else {
                plotter.set_scan_line(x0, x1, self.y);
            }
        }
    }
}
