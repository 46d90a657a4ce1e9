// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: polygon analysis
//!
//! Bounding boxes, convexity, convex hulls and the decomposition of
//! y-monotone polygons into chains of horizontal trapezoids.

use serde::{Deserialize, Serialize};

use crate::types::{RectF, Vec2};

/// One horizontal row of a trapezoid chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct HorizEdge {
    pub left: f32,
    pub right: f32,
    pub y: f32,
}

impl HorizEdge {
    pub const fn new(left: f32, right: f32, y: f32) -> Self {
        Self { left, right, y }
    }
}

/// A pair of rows forms a trapezoid when the top is not below the bottom
/// and at least one of the rows has positive width.
pub fn is_valid_trapezoid(top: &HorizEdge, bot: &HorizEdge) -> bool {
    top.y <= bot.y && (top.right > top.left || bot.right > bot.left)
}

/// Widen `initial` to include every point.
pub fn compute_bounding_box(points: &[Vec2], initial: RectF) -> RectF {
    points.iter().fold(initial, |mut acc, &p| {
        acc.include(p);
        acc
    })
}

fn sign(v: f32) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Convexity test. Edge vectors of a convex polygon flip sign at most twice
/// per axis and all turn the same way.
pub fn is_convex(polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    if n <= 3 {
        return true;
    }
    let (mut x_sign, mut y_sign, mut winding) = (0i8, 0i8, 0i8);
    let (mut x_flips, mut y_flips) = (0u32, 0u32);
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let c = polygon[(i + 2) % n];
        let e = b - a;
        let next = c - b;

        let sx = sign(e.x);
        if sx != 0 {
            if x_sign != 0 && sx != x_sign {
                x_flips += 1;
                if x_flips > 2 {
                    return false;
                }
            }
            x_sign = sx;
        }
        let sy = sign(e.y);
        if sy != 0 {
            if y_sign != 0 && sy != y_sign {
                y_flips += 1;
                if y_flips > 2 {
                    return false;
                }
            }
            y_sign = sy;
        }

        let turn = sign(e.cross(next));
        if turn != 0 {
            if winding == 0 {
                winding = turn;
            } else if turn != winding {
                return false;
            }
        }
    }
    true
}

fn turn(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).cross(b - o)
}

/// Andrew's monotone chain. Appends the hull of `polygon` to `output`,
/// clockwise on screen (y pointing down). Collinear points are dropped.
pub fn compute_convex_hull(polygon: &[Vec2], output: &mut Vec<Vec2>) {
    if polygon.len() < 3 {
        output.extend_from_slice(polygon);
        return;
    }
    let mut sorted = polygon.to_vec();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    sorted.dedup();
    if sorted.len() < 3 {
        output.extend_from_slice(&sorted);
        return;
    }

    let base = output.len();
    // lower hull
    for &p in &sorted {
        while output.len() >= base + 2
            && turn(output[output.len() - 2], output[output.len() - 1], p) <= 0.0
        {
            output.pop();
        }
        output.push(p);
    }
    // upper hull
    let lower_len = output.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while output.len() >= lower_len
            && turn(output[output.len() - 2], output[output.len() - 1], p) <= 0.0
        {
            output.pop();
        }
        output.push(p);
    }
    // last point repeats the first
    output.pop();
}

/// Cursor walking one boundary chain of a y-monotone polygon from its top
/// vertex to its bottom vertex.
struct Chain<'a> {
    poly: &'a [Vec2],
    start: usize,
    len: usize,
    forward: bool,
    /// Chain vertex at or above the last visited level.
    k: usize,
}

impl<'a> Chain<'a> {
    fn new(poly: &'a [Vec2], start: usize, len: usize, forward: bool) -> Self {
        Self {
            poly,
            start,
            len,
            forward,
            k: 0,
        }
    }

    fn at(&self, i: usize) -> Vec2 {
        let n = self.poly.len();
        if self.forward {
            self.poly[(self.start + i) % n]
        } else {
            self.poly[(self.start + n - i) % n]
        }
    }

    fn is_monotone(&self) -> bool {
        (1..self.len).all(|i| self.at(i).y >= self.at(i - 1).y)
    }

    /// X of the chain where it enters and where it leaves height `y`. The
    /// two differ when the chain runs along a horizontal edge at `y`.
    /// Levels must be visited top to bottom.
    fn span_at(&mut self, y: f32) -> (f32, f32) {
        while self.k + 1 < self.len && self.at(self.k + 1).y < y {
            self.k += 1;
        }
        let mut j = self.k;
        if self.at(j).y < y && j + 1 < self.len {
            j += 1;
        }
        let p = self.at(j);
        if p.y != y {
            let a = self.at(self.k);
            if j == self.k {
                return (p.x, p.x);
            }
            let x = a.x + (p.x - a.x) * ((y - a.y) / (p.y - a.y));
            return (x, x);
        }
        let mut last = j;
        while last + 1 < self.len && self.at(last + 1).y == y {
            last += 1;
        }
        self.k = last;
        (p.x, self.at(last).x)
    }

    /// First vertex height strictly below `y`.
    fn next_level(&self, y: f32) -> Option<f32> {
        (self.k..self.len).map(|i| self.at(i).y).find(|&v| v > y)
    }
}

fn count_local_minima(poly: &[Vec2]) -> usize {
    let n = poly.len();
    let mut last = 0i8;
    // seed with the last non-horizontal edge so the walk is cyclic
    for i in (0..n).rev() {
        let s = sign(poly[(i + 1) % n].y - poly[i].y);
        if s != 0 {
            last = s;
            break;
        }
    }
    if last == 0 {
        return 0;
    }
    let mut minima = 0;
    for i in 0..n {
        let s = sign(poly[(i + 1) % n].y - poly[i].y);
        if s == 0 {
            continue;
        }
        if last < 0 && s > 0 {
            minima += 1;
        }
        last = s;
    }
    minima
}

/// Decompose a y-monotone polygon into a chain of horizontal rows appended
/// to `output`. Consecutive rows bound one trapezoid; a pair of rows at the
/// same height is a break between sub-regions.
///
/// Returns `false` and leaves `output` as it was when the polygon is not
/// y-monotone, crosses itself or is degenerate. The caller then falls back
/// to the general polygon rasterizer.
pub fn split_into_trapezoids(poly: &[Vec2], output: &mut Vec<HorizEdge>) -> bool {
    let start_len = output.len();
    if split_inner(poly, output) {
        true
    } else {
        output.truncate(start_len);
        false
    }
}

fn split_inner(poly: &[Vec2], output: &mut Vec<HorizEdge>) -> bool {
    let n = poly.len();
    if n < 3 || poly.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return false;
    }
    if count_local_minima(poly) != 1 {
        return false;
    }
    let by_y = |a: &usize, b: &usize| poly[*a].y.total_cmp(&poly[*b].y);
    let top = (0..n)
        .min_by(|a, b| by_y(a, b).then(poly[*a].x.total_cmp(&poly[*b].x)))
        .unwrap_or(0);
    let bottom = (0..n).max_by(by_y).unwrap_or(0);

    let mut fwd = Chain::new(poly, top, (bottom + n - top) % n + 1, true);
    let mut bwd = Chain::new(poly, top, (top + n - bottom) % n + 1, false);
    if !fwd.is_monotone() || !bwd.is_monotone() {
        return false;
    }

    // sign of fwd x - bwd x; the chains must never swap sides
    let mut orientation = 0i8;
    let mut y = poly[top].y;
    let mut first = true;
    loop {
        let (f_enter, f_leave) = fwd.span_at(y);
        let (b_enter, b_leave) = bwd.span_at(y);
        let next = match (fwd.next_level(y), bwd.next_level(y)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if !first {
            // bottom row of the trapezoid above
            if !same_side(&mut orientation, f_enter - b_enter) {
                return false;
            }
            push_row(output, f_enter, b_enter, y);
        }
        let Some(next) = next else { break };
        // top row of the trapezoid below; a different row at the same
        // height starts a new sub-region
        if !same_side(&mut orientation, f_leave - b_leave) {
            return false;
        }
        if first || (f_leave, b_leave) != (f_enter, b_enter) {
            push_row(output, f_leave, b_leave, y);
        }
        y = next;
        first = false;
    }
    output.len() >= 2
}

fn same_side(orientation: &mut i8, d: f32) -> bool {
    let s = sign(d);
    if s == 0 {
        return true;
    }
    if *orientation == 0 {
        *orientation = s;
    }
    s == *orientation
}

fn push_row(output: &mut Vec<HorizEdge>, a: f32, b: f32, y: f32) {
    output.push(HorizEdge::new(a.min(b), a.max(b), y));
}
