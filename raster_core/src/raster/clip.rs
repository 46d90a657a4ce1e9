// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: rectangle clipping for lines and polygons

use crate::types::{RectF, Vec2};

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn outcode(p: Vec2, r: &RectF) -> u8 {
    let mut code = 0;
    if p.x < r.left {
        code |= LEFT;
    } else if p.x > r.right {
        code |= RIGHT;
    }
    if p.y < r.top {
        code |= TOP;
    } else if p.y > r.bottom {
        code |= BOTTOM;
    }
    code
}

/// Cohen–Sutherland clip of the segment `p0 -> p1` against the closed box
/// `clip`. Returns `None` when no part of the segment is visible. Endpoints
/// moved by the clip land exactly on the box edge.
pub fn clip_line(mut p0: Vec2, mut p1: Vec2, clip: &RectF) -> Option<(Vec2, Vec2)> {
    if !(p0.x.is_finite() && p0.y.is_finite() && p1.x.is_finite() && p1.y.is_finite()) {
        return None;
    }
    let mut c0 = outcode(p0, clip);
    let mut c1 = outcode(p1, clip);
    // each pass moves one endpoint onto a boundary; four passes always suffice
    for _ in 0..8 {
        if c0 | c1 == 0 {
            return Some((p0, p1));
        }
        if c0 & c1 != 0 {
            return None;
        }
        let out = if c0 != 0 { c0 } else { c1 };
        let d = p1 - p0;
        let p = if out & TOP != 0 {
            Vec2::new(p0.x + d.x * (clip.top - p0.y) / d.y, clip.top)
        } else if out & BOTTOM != 0 {
            Vec2::new(p0.x + d.x * (clip.bottom - p0.y) / d.y, clip.bottom)
        } else if out & RIGHT != 0 {
            Vec2::new(clip.right, p0.y + d.y * (clip.right - p0.x) / d.x)
        } else {
            Vec2::new(clip.left, p0.y + d.y * (clip.left - p0.x) / d.x)
        };
        if out == c0 {
            p0 = p;
            c0 = outcode(p0, clip);
        } else {
            p1 = p;
            c1 = outcode(p1, clip);
        }
    }
    None
}

/// Outcome of [`clip_polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonClip {
    /// Entirely outside; nothing was written.
    Outside,
    /// Entirely inside; use the input unchanged.
    Inside,
    /// Clipped polygon written to the output buffer.
    Clipped,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    fn inside(self, p: Vec2, v: f32) -> bool {
        match self {
            Side::Left => p.x >= v,
            Side::Right => p.x <= v,
            Side::Top => p.y >= v,
            Side::Bottom => p.y <= v,
        }
    }

    fn intersect(self, a: Vec2, b: Vec2, v: f32) -> Vec2 {
        match self {
            Side::Left | Side::Right => {
                let t = (v - a.x) / (b.x - a.x);
                Vec2::new(v, a.y + (b.y - a.y) * t)
            }
            Side::Top | Side::Bottom => {
                let t = (v - a.y) / (b.y - a.y);
                Vec2::new(a.x + (b.x - a.x) * t, v)
            }
        }
    }
}

fn push_distinct(out: &mut Vec<Vec2>, p: Vec2) {
    if let Some(&last) = out.last() {
        if (last.x - p.x).abs() <= 1e-6 && (last.y - p.y).abs() <= 1e-6 {
            return;
        }
    }
    out.push(p);
}

fn clip_side(input: &[Vec2], out: &mut Vec<Vec2>, side: Side, v: f32) {
    out.clear();
    let n = input.len();
    if n == 0 {
        return;
    }
    let mut prev = input[n - 1];
    let mut prev_in = side.inside(prev, v);
    for &cur in input {
        let cur_in = side.inside(cur, v);
        if cur_in != prev_in {
            push_distinct(out, side.intersect(prev, cur, v));
        }
        if cur_in {
            push_distinct(out, cur);
        }
        prev = cur;
        prev_in = cur_in;
    }
    if out.len() > 1 {
        let first = out[0];
        if let Some(&last) = out.last() {
            if (last.x - first.x).abs() <= 1e-6 && (last.y - first.y).abs() <= 1e-6 {
                out.pop();
            }
        }
    }
}

/// Sutherland–Hodgman clip of a closed polygon whose bounding box is `bbox`
/// against `clip`. Only the sides the box crosses are clipped. On
/// [`PolygonClip::Clipped`] the result is in `out` and has at least three
/// points; `scratch` is working storage.
pub fn clip_polygon(
    poly: &[Vec2],
    bbox: &RectF,
    clip: &RectF,
    out: &mut Vec<Vec2>,
    scratch: &mut Vec<Vec2>,
) -> PolygonClip {
    if bbox.right <= clip.left
        || bbox.left >= clip.right
        || bbox.bottom <= clip.top
        || bbox.top >= clip.bottom
    {
        return PolygonClip::Outside;
    }
    let mut sides = [None; 4];
    if bbox.left < clip.left {
        sides[0] = Some((Side::Left, clip.left));
    }
    if bbox.right > clip.right {
        sides[1] = Some((Side::Right, clip.right));
    }
    if bbox.top < clip.top {
        sides[2] = Some((Side::Top, clip.top));
    }
    if bbox.bottom > clip.bottom {
        sides[3] = Some((Side::Bottom, clip.bottom));
    }
    if sides.iter().all(Option::is_none) {
        return PolygonClip::Inside;
    }

    out.clear();
    out.extend_from_slice(poly);
    for (side, v) in sides.into_iter().flatten() {
        clip_side(out, scratch, side, v);
        std::mem::swap(out, scratch);
        if out.len() < 3 {
            out.clear();
            return PolygonClip::Outside;
        }
    }
    PolygonClip::Clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::compute_bounding_box;

    const CLIP: RectF = RectF::new(0.0, 0.0, 10.0, 10.0);

    #[test]
    fn line_outside_is_rejected() {
        assert!(clip_line(Vec2::new(-5.0, -1.0), Vec2::new(20.0, -3.0), &CLIP).is_none());
        assert!(clip_line(Vec2::new(11.0, 0.0), Vec2::new(15.0, 10.0), &CLIP).is_none());
    }

    #[test]
    fn line_crossing_one_edge_snaps_onto_it() {
        let (a, b) = clip_line(Vec2::new(-10.0, 5.0), Vec2::new(5.0, 5.0), &CLIP).unwrap();
        assert_eq!(a, Vec2::new(0.0, 5.0));
        assert_eq!(b, Vec2::new(5.0, 5.0));

        let (a, b) = clip_line(Vec2::new(4.0, 3.0), Vec2::new(4.0, 25.0), &CLIP).unwrap();
        assert_eq!(a, Vec2::new(4.0, 3.0));
        assert_eq!(b.y, 10.0);
    }

    #[test]
    fn diagonal_line_clipped_on_two_sides() {
        let (a, b) = clip_line(Vec2::new(-5.0, -5.0), Vec2::new(15.0, 15.0), &CLIP).unwrap();
        assert!((a.x).abs() < 1e-5 && (a.y).abs() < 1e-5);
        assert!((b.x - 10.0).abs() < 1e-5 && (b.y - 10.0).abs() < 1e-5);
    }

    fn clip(poly: &[Vec2]) -> (PolygonClip, Vec<Vec2>) {
        let bbox = compute_bounding_box(poly, RectF::EMPTY);
        let mut out = Vec::new();
        let mut scratch = Vec::new();
        let r = clip_polygon(poly, &bbox, &CLIP, &mut out, &mut scratch);
        (r, out)
    }

    #[test]
    fn polygon_inside_and_outside() {
        let inside = [Vec2::new(1.0, 1.0), Vec2::new(9.0, 1.0), Vec2::new(5.0, 9.0)];
        assert_eq!(clip(&inside).0, PolygonClip::Inside);
        let outside = [Vec2::new(11.0, 1.0), Vec2::new(19.0, 1.0), Vec2::new(15.0, 9.0)];
        assert_eq!(clip(&outside).0, PolygonClip::Outside);
    }

    #[test]
    fn polygon_crossing_right_edge() {
        let poly = [
            Vec2::new(5.0, 2.0),
            Vec2::new(15.0, 2.0),
            Vec2::new(15.0, 8.0),
            Vec2::new(5.0, 8.0),
        ];
        let (r, out) = clip(&poly);
        assert_eq!(r, PolygonClip::Clipped);
        let b = compute_bounding_box(&out, RectF::EMPTY);
        assert_eq!(b, RectF::new(5.0, 2.0, 10.0, 8.0));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn corner_overlap_keeps_no_duplicates() {
        let poly = [
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ];
        let (r, out) = clip(&poly);
        assert_eq!(r, PolygonClip::Clipped);
        assert_eq!(out.len(), 4);
        for w in out.windows(2) {
            assert_ne!(w[0], w[1]);
        }
    }
}
