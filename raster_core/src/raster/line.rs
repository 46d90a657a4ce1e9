// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: line rasterization
//!
//! Coordinates name pixel centers: the point `(3.0, 4.0)` is the center of
//! pixel `(3, 4)`. Lines are one pixel wide.

use super::clip::clip_line;
use super::{coverage_to_alpha, Plotter, RastParams};
use crate::types::{Rect, RectF, Vec2};

/// Draw the segment `p0 -> p1`. Antialiased lines use Xiaolin Wu's
/// algorithm, aliased ones Bresenham's. Nothing outside the clip box is
/// plotted.
///
/// # Panics
///
/// When the clip box is empty.
pub fn rasterize_line<P: Plotter + ?Sized>(
    p0: Vec2,
    p1: Vec2,
    params: &RastParams,
    plotter: &mut P,
) {
    assert!(!params.clip.is_empty(), "rasterizer called with an empty clip box");
    let clip = params.clip;
    let centers = RectF::new(
        clip.left as f32,
        clip.top as f32,
        (clip.right - 1) as f32,
        (clip.bottom - 1) as f32,
    );

    let axis_aligned = p0.x == p1.x || p0.y == p1.y;
    let integral = [p0.x, p0.y, p1.x, p1.y].iter().all(|v| v.fract() == 0.0);

    if !params.antialias || (axis_aligned && integral) {
        let Some((a, b)) = clip_line(p0, p1, &centers) else {
            return;
        };
        bresenham(
            a.x.round() as i32,
            a.y.round() as i32,
            b.x.round() as i32,
            b.y.round() as i32,
            &clip,
            plotter,
        );
        return;
    }

    // keep the antialiased fringe of lines running along the clip border
    let padded = RectF::new(
        centers.left - 1.0,
        centers.top - 1.0,
        centers.right + 1.0,
        centers.bottom + 1.0,
    );
    let Some((a, b)) = clip_line(p0, p1, &padded) else {
        return;
    };
    if (b.x - a.x).abs() >= (b.y - a.y).abs() {
        wu(a, b, &clip, plotter, false);
    } else {
        wu(Vec2::new(a.y, a.x), Vec2::new(b.y, b.x), &clip, plotter, true);
    }
}

fn bresenham<P: Plotter + ?Sized>(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    clip: &Rect,
    plotter: &mut P,
) {
    if y0 == y1 {
        let (a, b) = (x0.min(x1).max(clip.left), (x0.max(x1) + 1).min(clip.right));
        if a < b && y0 >= clip.top && y0 < clip.bottom {
            plotter.set_scan_line(a, b, y0);
        }
        return;
    }
    if x0 == x1 {
        if x0 < clip.left || x0 >= clip.right {
            return;
        }
        for y in y0.min(y1).max(clip.top)..(y0.max(y1) + 1).min(clip.bottom) {
            plotter.set_pixel(x0, y);
        }
        return;
    }

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        if clip.contains(x, y) {
            plotter.set_pixel(x, y);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn plot<P: Plotter + ?Sized>(
    plotter: &mut P,
    clip: &Rect,
    steep: bool,
    x: i32,
    y: i32,
    coverage: f32,
) {
    let (x, y) = if steep { (y, x) } else { (x, y) };
    if !clip.contains(x, y) {
        return;
    }
    match coverage_to_alpha(coverage) {
        0 => {}
        255 => plotter.set_pixel(x, y),
        a => plotter.mix_pixel(x, y, a),
    }
}

fn fpart(v: f32) -> f32 {
    v - v.floor()
}

fn rfpart(v: f32) -> f32 {
    1.0 - fpart(v)
}

/// Wu's algorithm for an x-major line; `steep` swaps the axes back when
/// plotting.
fn wu<P: Plotter + ?Sized>(mut a: Vec2, mut b: Vec2, clip: &Rect, plotter: &mut P, steep: bool) {
    if a.x > b.x {
        std::mem::swap(&mut a, &mut b);
    }
    let dx = b.x - a.x;
    let gradient = if dx == 0.0 { 1.0 } else { (b.y - a.y) / dx };

    let xend = (a.x + 0.5).floor();
    let yend = a.y + gradient * (xend - a.x);
    let xgap = rfpart(a.x + 0.5);
    let xpx1 = xend as i32;
    let ypx1 = yend.floor() as i32;
    plot(plotter, clip, steep, xpx1, ypx1, rfpart(yend) * xgap);
    plot(plotter, clip, steep, xpx1, ypx1 + 1, fpart(yend) * xgap);
    let mut intery = yend + gradient;

    let xend = (b.x + 0.5).floor();
    let yend = b.y + gradient * (xend - b.x);
    let xgap = fpart(b.x + 0.5);
    let xpx2 = xend as i32;
    let ypx2 = yend.floor() as i32;
    if xpx2 != xpx1 {
        plot(plotter, clip, steep, xpx2, ypx2, rfpart(yend) * xgap);
        plot(plotter, clip, steep, xpx2, ypx2 + 1, fpart(yend) * xgap);
    }

    for x in xpx1 + 1..xpx2 {
        let y = intery.floor() as i32;
        plot(plotter, clip, steep, x, y, rfpart(intery));
        plot(plotter, clip, steep, x, y + 1, fpart(intery));
        intery += gradient;
    }
}
