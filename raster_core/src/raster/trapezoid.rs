// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: trapezoid chain rasterization
//!
//! Consecutive [`HorizEdge`] rows form trapezoids. Rows fully inside a
//! trapezoid are written directly: the fully covered middle as one span and
//! only the slanted edge columns with computed coverage. Rows cut by a
//! fractional trapezoid top or bottom go through the [`Accumulator`], which
//! sums the contributions of every trapezoid touching that row before the
//! row is emitted, so chain hand-offs inside a pixel row never double
//! count.

use super::{center_span, coverage_to_alpha, Plotter, RastParams, Rasterizer, RowWriter};
use crate::geometry::{is_valid_trapezoid, HorizEdge};
use crate::types::Rect;

/// Coverage cells for one pixel row.
#[derive(Debug, Default)]
pub struct Accumulator {
    row: Option<i32>,
    left: i32,
    cells: Vec<f32>,
    touched: Option<(usize, usize)>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any pending row and size the cells for `clip`.
    pub fn reset(&mut self, clip: Rect) {
        self.row = None;
        self.left = clip.left;
        self.cells.clear();
        self.cells.resize(clip.width().max(0) as usize, 0.0);
        self.touched = None;
    }

    /// Row currently being accumulated.
    pub fn row(&self) -> Option<i32> {
        self.row
    }

    /// Make `y` the pending row, flushing a different pending row first.
    pub fn begin_row<P: Plotter + ?Sized>(&mut self, y: i32, plotter: &mut P) {
        if self.row != Some(y) {
            self.flush(plotter);
            self.row = Some(y);
        }
    }

    /// Add coverage to column `x` of the pending row. Columns outside the
    /// clip are ignored.
    pub fn add(&mut self, x: i32, coverage: f32) {
        let i = x - self.left;
        if i < 0 || i as usize >= self.cells.len() {
            return;
        }
        let i = i as usize;
        self.cells[i] += coverage;
        self.touched = Some(match self.touched {
            Some((lo, hi)) => (lo.min(i), hi.max(i)),
            None => (i, i),
        });
    }

    /// Emit the pending row and clear it.
    pub fn flush<P: Plotter + ?Sized>(&mut self, plotter: &mut P) {
        let Some(y) = self.row.take() else {
            return;
        };
        if let Some((lo, hi)) = self.touched.take() {
            let mut row = RowWriter::new(y);
            for i in lo..=hi {
                row.push(plotter, self.left + i as i32, coverage_to_alpha(self.cells[i]));
                self.cells[i] = 0.0;
            }
            row.flush(plotter);
        }
    }
}

/// Integral of the fraction of a unit column right of `x`, with `t` the
/// position of `x` relative to the column's left side.
fn integral(t: f32) -> f32 {
    if t <= 0.0 {
        t
    } else if t >= 1.0 {
        0.5
    } else {
        t - t * t * 0.5
    }
}

/// Fraction of column `c` lying right of an edge whose x moves linearly
/// between `a` and `b`, averaged over the band.
fn right_fraction(a: f32, b: f32, c: f32) -> f32 {
    let (lo, hi) = if a <= b { (a - c, b - c) } else { (b - c, a - c) };
    if hi - lo < 1e-3 {
        return (1.0 - (lo + hi) * 0.5).clamp(0.0, 1.0);
    }
    (integral(hi) - integral(lo)) / (hi - lo)
}

/// Coverage of column `c` over a band of height `h` between a left edge
/// moving from `l0` to `l1` and a right edge moving from `r0` to `r1`.
fn column_coverage(c: i32, h: f32, l0: f32, l1: f32, r0: f32, r1: f32) -> f32 {
    let c = c as f32;
    (h * (right_fraction(l0, l1, c) - right_fraction(r0, r1, c))).max(0.0)
}

struct Band {
    l0: f32,
    l1: f32,
    r0: f32,
    r1: f32,
}

impl Band {
    fn columns(&self, clip: &Rect) -> (i32, i32) {
        let lo = (self.l0.min(self.l1).floor() as i32).max(clip.left);
        let hi = (self.r0.max(self.r1).ceil() as i32).min(clip.right);
        (lo, hi)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Rasterizer {
    /// Fill the chain of trapezoids formed by consecutive rows of `chain`.
    /// Pairs that are not a valid trapezoid with positive height act as
    /// chain breaks.
    ///
    /// # Panics
    ///
    /// When the clip box is empty or the fill rule is complementary; a chain
    /// only describes the inside of a shape.
    pub fn rasterize_trapezoid_chain<P: Plotter + ?Sized>(
        &mut self,
        chain: &[HorizEdge],
        params: &RastParams,
        plotter: &mut P,
    ) {
        assert!(!params.clip.is_empty(), "rasterizer called with an empty clip box");
        assert!(
            !params.fill_rule.is_complementary(),
            "trapezoid chains cannot be filled with a complementary rule"
        );
        let clip = params.clip;
        self.accumulator.reset(clip);
        for pair in chain.windows(2) {
            let (top, bot) = (&pair[0], &pair[1]);
            let finite = [top.left, top.right, top.y, bot.left, bot.right, bot.y]
                .iter()
                .all(|v| v.is_finite());
            if !finite || !(bot.y > top.y) || !is_valid_trapezoid(top, bot) {
                continue;
            }
            if params.antialias {
                trapezoid_aa(&mut self.accumulator, top, bot, &clip, plotter);
            } else {
                trapezoid_center(top, bot, &clip, plotter);
            }
        }
        self.accumulator.flush(plotter);
    }
}

fn trapezoid_center<P: Plotter + ?Sized>(
    top: &HorizEdge,
    bot: &HorizEdge,
    clip: &Rect,
    plotter: &mut P,
) {
    let first = ((top.y - 0.5).ceil() as i32).max(clip.top);
    let last = ((bot.y - 0.5).ceil() as i32).min(clip.bottom);
    let dy = bot.y - top.y;
    for y in first..last {
        let t = (y as f32 + 0.5 - top.y) / dy;
        let xl = lerp(top.left, bot.left, t);
        let xr = lerp(top.right, bot.right, t);
        center_span(plotter, xl, xr, y, clip.left, clip.right);
    }
}

fn trapezoid_aa<P: Plotter + ?Sized>(
    acc: &mut Accumulator,
    top: &HorizEdge,
    bot: &HorizEdge,
    clip: &Rect,
    plotter: &mut P,
) {
    let y_a = top.y.max(clip.top as f32);
    let y_b = bot.y.min(clip.bottom as f32);
    if y_b <= y_a {
        return;
    }
    let dy = bot.y - top.y;
    let at = |y: f32| {
        let t = (y - top.y) / dy;
        (lerp(top.left, bot.left, t), lerp(top.right, bot.right, t))
    };

    for r in (y_a.floor() as i32)..(y_b.ceil() as i32) {
        let b0 = (r as f32).max(y_a);
        let b1 = ((r + 1) as f32).min(y_b);
        if b1 <= b0 {
            continue;
        }
        let (l0, r0) = at(b0);
        let (l1, r1) = at(b1);
        let band = Band { l0, l1, r0, r1 };
        let full = b0 == r as f32 && b1 == (r + 1) as f32;
        if full {
            acc.flush(plotter);
            fill_row(r, &band, clip, plotter);
        } else {
            acc.begin_row(r, plotter);
            let h = b1 - b0;
            let (lo, hi) = band.columns(clip);
            for c in lo..hi {
                acc.add(c, column_coverage(c, h, l0, l1, r0, r1));
            }
        }
    }
}

/// Full-height row: opaque middle span plus computed edge columns.
fn fill_row<P: Plotter + ?Sized>(y: i32, band: &Band, clip: &Rect, plotter: &mut P) {
    let (outer_l, outer_r) = band.columns(clip);
    if outer_l >= outer_r {
        return;
    }
    let inner_l = (band.l0.max(band.l1).ceil() as i32).clamp(outer_l, outer_r);
    let inner_r = (band.r0.min(band.r1).floor() as i32).clamp(outer_l, outer_r);
    let mut row = RowWriter::new(y);
    let edge_columns = |row: &mut RowWriter, plotter: &mut P, from: i32, to: i32| {
        for c in from..to {
            let cov = column_coverage(c, 1.0, band.l0, band.l1, band.r0, band.r1);
            row.push(plotter, c, coverage_to_alpha(cov));
        }
    };
    if inner_l < inner_r {
        edge_columns(&mut row, &mut *plotter, outer_l, inner_l);
        row.push_span(plotter, inner_l, inner_r);
        edge_columns(&mut row, &mut *plotter, inner_r, outer_r);
    } else {
        edge_columns(&mut row, &mut *plotter, outer_l, outer_r);
    }
    row.flush(plotter);
}
