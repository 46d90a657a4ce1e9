// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: stroke expansion
//!
//! Turns flattened contours and a [`Pen`] into fillable geometry. The
//! expander emits a "rail" of left/right point pairs; consecutive pairs
//! bound one quad of the stroke body unless a strip break separates them.
//! Round joins and caps are emitted as fans around a center point.

use std::f32::consts::PI;

use crate::geometry::path::arc_steps;
use crate::types::{Contour, LineCap, LineJoin, Pen, Vec2};

const MIN_WIDTH: f32 = 0.01;
const MAX_WIDTH: f32 = 1000.0;
const MIN_MITER: f32 = 0.01;
const MAX_MITER: f32 = 100.0;
/// Joins whose normals' cosine is this close to +/-1 are treated as flat.
const FLAT_EPS: f32 = 1e-4;

/// Consumer of stroke geometry.
pub trait StrokeBuilder {
    /// Start of one contour's output.
    fn begin_contour(&mut self);
    /// End of one contour's output.
    fn end_contour(&mut self);
    /// Push one rail pair.
    fn add(&mut self, left: Vec2, right: Vec2);
    /// Start a fan on the left side; the stroker pushes arc points into the
    /// returned buffer.
    fn begin_fan_left(&mut self, center: Vec2) -> &mut Vec<Vec2>;
    /// Start a fan on the right side.
    fn begin_fan_right(&mut self, center: Vec2) -> &mut Vec<Vec2>;
    /// Finish the fan started by `begin_fan_left`/`begin_fan_right`.
    fn end_fan(&mut self);
    /// The next rail pair must not be connected to the previous one.
    fn break_strip(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Stroke expander with reusable scratch storage.
#[derive(Debug, Clone)]
pub struct Stroker {
    /// Arc flattening tolerance.
    pub tolerance: f32,
    points: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Default for Stroker {
    fn default() -> Self {
        Self::new(0.25)
    }
}

/// Expand `contours` with a default [`Stroker`].
pub fn expand_strokes<I, B>(contours: I, pen: &Pen, builder: &mut B)
where
    I: IntoIterator<Item = Contour>,
    B: StrokeBuilder + ?Sized,
{
    Stroker::default().expand(contours, pen, builder);
}

/// Resolved pen parameters for one expansion.
struct Style {
    r: f32,
    miter_limit: f32,
    cap: LineCap,
    join: LineJoin,
    tolerance: f32,
}

impl Stroker {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance: tolerance.max(1e-3),
            points: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Pull contours one at a time and emit their stroke outlines.
    pub fn expand<I, B>(&mut self, contours: I, pen: &Pen, builder: &mut B)
    where
        I: IntoIterator<Item = Contour>,
        B: StrokeBuilder + ?Sized,
    {
        if !(pen.width >= MIN_WIDTH) {
            return;
        }
        let style = Style {
            r: pen.width.clamp(MIN_WIDTH, MAX_WIDTH) * 0.5,
            miter_limit: if pen.miter_limit.is_nan() {
                MIN_MITER
            } else {
                pen.miter_limit.clamp(MIN_MITER, MAX_MITER)
            },
            cap: pen.cap,
            join: pen.join,
            tolerance: self.tolerance,
        };
        for contour in contours {
            self.points.clear();
            for &p in contour.points.iter() {
                if !(p.x.is_finite() && p.y.is_finite()) {
                    continue;
                }
                if self.points.last().map_or(true, |&q| (p - q).length_sq() > 1e-12) {
                    self.points.push(p);
                }
            }
            if contour.closed && self.points.len() > 2 {
                if let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) {
                    if (first - last).length_sq() <= 1e-12 {
                        self.points.pop();
                    }
                }
            }
            if self.points.is_empty() {
                continue;
            }
            builder.begin_contour();
            match self.points.len() {
                1 => stroke_dot(self.points[0], &style, builder),
                n if n >= 3 && contour.closed => {
                    stroke_closed(&self.points, &mut self.normals, &style, builder)
                }
                _ => stroke_open(&self.points, &mut self.normals, &style, builder),
            }
            builder.end_contour();
        }
    }
}

fn segment_normal(a: Vec2, b: Vec2) -> Vec2 {
    (b - a).normalized().perp()
}

fn fill_normals(points: &[Vec2], closed: bool, normals: &mut Vec<Vec2>) {
    normals.clear();
    let n = points.len();
    let segs = if closed { n } else { n - 1 };
    for i in 0..segs {
        normals.push(segment_normal(points[i], points[(i + 1) % n]));
    }
}

/// Push arc points around `center` starting at `center + start` and turning
/// by `sweep` radians.
fn push_arc(
    buf: &mut Vec<Vec2>,
    center: Vec2,
    start: Vec2,
    sweep: f32,
    radius: f32,
    tolerance: f32,
) {
    let steps = arc_steps(radius, sweep, tolerance);
    for k in 0..=steps {
        buf.push(center + start.rotated(sweep * k as f32 / steps as f32));
    }
}

fn stroke_dot<B: StrokeBuilder + ?Sized>(p: Vec2, style: &Style, builder: &mut B) {
    let r = style.r;
    match style.cap {
        LineCap::Butt => {}
        LineCap::Round => {
            let up = Vec2::new(0.0, -r);
            let buf = builder.begin_fan_left(p);
            push_arc(buf, p, up, PI, r, style.tolerance);
            builder.end_fan();
            let buf = builder.begin_fan_right(p);
            push_arc(buf, p, -up, PI, r, style.tolerance);
            builder.end_fan();
        }
        LineCap::Square => {
            builder.add(p + Vec2::new(-r, -r), p + Vec2::new(-r, r));
            builder.add(p + Vec2::new(r, -r), p + Vec2::new(r, r));
        }
    }
}

fn stroke_open<B: StrokeBuilder + ?Sized>(
    points: &[Vec2],
    normals: &mut Vec<Vec2>,
    style: &Style,
    builder: &mut B,
) {
    fill_normals(points, false, normals);
    let r = style.r;
    let n = points.len();
    let first = points[0];
    let n0 = normals[0];
    let d0 = -n0.perp();
    let last = points[n - 1];
    let nl = normals[n - 2];
    let dl = -nl.perp();

    let (start, end) = match style.cap {
        LineCap::Square => (first - d0 * r, last + dl * r),
        LineCap::Round => {
            let buf = builder.begin_fan_left(first);
            push_arc(buf, first, n0 * r, PI, r, style.tolerance);
            builder.end_fan();
            (first, last)
        }
        LineCap::Butt => (first, last),
    };

    builder.add(start + n0 * r, start - n0 * r);
    for i in 1..n - 1 {
        make_join(points[i], normals[i - 1], normals[i], style, builder);
    }
    builder.add(end + nl * r, end - nl * r);

    if style.cap == LineCap::Round {
        builder.break_strip();
        let buf = builder.begin_fan_right(last);
        push_arc(buf, last, nl * r, -PI, r, style.tolerance);
        builder.end_fan();
    }
}

fn stroke_closed<B: StrokeBuilder + ?Sized>(
    points: &[Vec2],
    normals: &mut Vec<Vec2>,
    style: &Style,
    builder: &mut B,
) {
    fill_normals(points, true, normals);
    let n = points.len();
    for i in 0..n {
        make_join(points[i], normals[(i + n - 1) % n], normals[i], style, builder);
    }
    let closing = normals[n - 1];
    builder.add(points[0] + closing * style.r, points[0] - closing * style.r);
}

/// Join the segment ending at `p` (normal `n0`) to the one starting there
/// (normal `n1`). Emits the incoming segment's end pair, the join geometry
/// and the outgoing segment's start pair.
fn make_join<B: StrokeBuilder + ?Sized>(
    p: Vec2,
    n0: Vec2,
    n1: Vec2,
    style: &Style,
    builder: &mut B,
) {
    let r = style.r;
    let cos = n0.dot(n1).clamp(-1.0, 1.0);

    if cos > 1.0 - FLAT_EPS {
        let n = (n0 + n1).normalized();
        builder.add(p + n * r, p - n * r);
        return;
    }

    builder.add(p + n0 * r, p - n0 * r);
    builder.break_strip();

    if cos < -1.0 + FLAT_EPS {
        // path doubles back: only a round join has area, the rails swap sides
        if style.join == LineJoin::Round {
            let buf = builder.begin_fan_left(p);
            push_arc(buf, p, n0 * r, -PI, r, style.tolerance);
            builder.end_fan();
        }
        builder.add(p + n1 * r, p - n1 * r);
        return;
    }

    let cross = n0.cross(n1);
    // turning toward the left normal puts the outer corner on the right rail
    let (side, s) = if cross > 0.0 {
        (Side::Right, -1.0)
    } else {
        (Side::Left, 1.0)
    };
    let o0 = p + n0 * (s * r);
    let o1 = p + n1 * (s * r);

    match style.join {
        LineJoin::Round => {
            let sweep = cos.acos().copysign(cross);
            let buf = match side {
                Side::Left => builder.begin_fan_left(p),
                Side::Right => builder.begin_fan_right(p),
            };
            push_arc(buf, p, n0 * (s * r), sweep, r, style.tolerance);
            builder.end_fan();
        }
        LineJoin::Miter | LineJoin::Bevel => {
            let sum = n0 + n1;
            let miter = sum * (2.0 * r / sum.length_sq());
            let limit = style.miter_limit * r;
            let rail = |builder: &mut B, outer: Vec2| match side {
                Side::Left => builder.add(outer, p),
                Side::Right => builder.add(p, outer),
            };
            rail(&mut *builder, o0);
            if style.join == LineJoin::Miter && miter.length_sq() <= limit * limit {
                rail(&mut *builder, p + miter * s);
            }
            rail(&mut *builder, o1);
        }
    }

    builder.break_strip();
    builder.add(p + n1 * r, p - n1 * r);
}

/// [`StrokeBuilder`] collecting the stroke as a polygon set: every rail quad
/// and every fan becomes its own contour, all with positive orientation, so
/// the union fills correctly under the nonzero rule.
#[derive(Debug, Clone, Default)]
pub struct StrokePolygons {
    /// Flat vertex buffer of all contours.
    pub points: Vec<Vec2>,
    /// Vertex count of each contour in `points`.
    pub lengths: Vec<usize>,
    prev: Option<(Vec2, Vec2)>,
    fan: Vec<Vec2>,
}

impl StrokePolygons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop collected geometry, keeping the allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        self.lengths.clear();
        self.prev = None;
        self.fan.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    fn begin_fan(&mut self, center: Vec2) -> &mut Vec<Vec2> {
        self.fan.clear();
        self.fan.push(center);
        &mut self.fan
    }
}

fn signed_area(poly: &[Vec2]) -> f32 {
    let n = poly.len();
    let mut area = 0.0;
    for i in 0..n {
        area += poly[i].cross(poly[(i + 1) % n]);
    }
    area * 0.5
}

fn push_oriented(points: &mut Vec<Vec2>, lengths: &mut Vec<usize>, poly: &[Vec2]) {
    let area = signed_area(poly);
    if area.abs() <= 1e-9 || !area.is_finite() {
        return;
    }
    if area > 0.0 {
        points.extend_from_slice(poly);
    } else {
        points.extend(poly.iter().rev());
    }
    lengths.push(poly.len());
}

impl StrokeBuilder for StrokePolygons {
    fn begin_contour(&mut self) {
        self.prev = None;
    }

    fn end_contour(&mut self) {
        self.prev = None;
    }

    fn add(&mut self, left: Vec2, right: Vec2) {
        if let Some((pl, pr)) = self.prev {
            push_oriented(&mut self.points, &mut self.lengths, &[pl, pr, right, left]);
        }
        self.prev = Some((left, right));
    }

    fn begin_fan_left(&mut self, center: Vec2) -> &mut Vec<Vec2> {
        self.begin_fan(center)
    }

    fn begin_fan_right(&mut self, center: Vec2) -> &mut Vec<Vec2> {
        self.begin_fan(center)
    }

    fn end_fan(&mut self) {
        push_oriented(&mut self.points, &mut self.lengths, &self.fan);
        self.fan.clear();
    }

    fn break_strip(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::compute_bounding_box;
    use crate::types::RectF;

    fn stroke(points: &[Vec2], closed: bool, pen: Pen) -> StrokePolygons {
        let mut out = StrokePolygons::new();
        Stroker::new(0.05).expand([Contour::new(points, closed)], &pen, &mut out);
        out
    }

    fn bbox(out: &StrokePolygons) -> RectF {
        compute_bounding_box(&out.points, RectF::EMPTY)
    }

    #[test]
    fn thin_pen_emits_nothing() {
        let out = stroke(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)], false, Pen::new(0.001));
        assert!(out.is_empty());
        let out = stroke(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)], false, Pen::new(f32::NAN));
        assert!(out.is_empty());
    }

    #[test]
    fn butt_segment_is_exact_rectangle() {
        let out = stroke(&[Vec2::new(10.0, 20.0), Vec2::new(60.0, 20.0)], false, Pen::new(8.0));
        assert_eq!(out.lengths, vec![4]);
        assert_eq!(bbox(&out), RectF::new(10.0, 16.0, 60.0, 24.0));
    }

    #[test]
    fn square_caps_extend_by_half_width() {
        let pen = Pen::new(8.0).with_cap(LineCap::Square);
        let out = stroke(&[Vec2::new(10.0, 20.0), Vec2::new(60.0, 20.0)], false, pen);
        assert_eq!(bbox(&out), RectF::new(6.0, 16.0, 64.0, 24.0));
    }

    #[test]
    fn round_caps_extend_by_half_width() {
        let pen = Pen::new(8.0).with_cap(LineCap::Round);
        let out = stroke(&[Vec2::new(10.0, 20.0), Vec2::new(60.0, 20.0)], false, pen);
        let b = bbox(&out);
        assert!((b.left - 6.0).abs() < 0.1, "{b:?}");
        assert!((b.right - 64.0).abs() < 0.1, "{b:?}");
        assert!((b.top - 16.0).abs() < 1e-4);
        assert!((b.bottom - 24.0).abs() < 1e-4);
        // body plus two fans
        assert_eq!(out.lengths.len(), 3);
    }

    #[test]
    fn miter_reaches_corner() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let out = stroke(&pts, false, Pen::new(2.0));
        let b = bbox(&out);
        assert!((b.right - 11.0).abs() < 1e-4);
        assert!((b.top + 1.0).abs() < 1e-4);
        assert!(out.points.contains(&Vec2::new(11.0, -1.0)));
    }

    #[test]
    fn bevel_cuts_corner() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let out = stroke(&pts, false, Pen::new(2.0).with_join(LineJoin::Bevel));
        assert!(!out.points.contains(&Vec2::new(11.0, -1.0)));
    }

    #[test]
    fn miter_limit_falls_back_to_bevel() {
        // very sharp turn
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 1.0)];
        let out = stroke(&pts, false, Pen::new(2.0).with_miter_limit(2.0));
        assert!(bbox(&out).right < 22.0);
    }

    #[test]
    fn every_polygon_is_positive() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(12.0, 8.0),
            Vec2::new(3.0, 4.0),
        ];
        for join in [LineJoin::Miter, LineJoin::Bevel, LineJoin::Round] {
            let out = stroke(&pts, true, Pen::new(3.0).with_join(join));
            let mut offset = 0;
            for &len in &out.lengths {
                assert!(signed_area(&out.points[offset..offset + len]) > 0.0);
                offset += len;
            }
            assert_eq!(offset, out.points.len());
        }
    }

    #[test]
    fn dots() {
        let p = [Vec2::new(5.0, 5.0)];
        assert!(stroke(&p, false, Pen::new(4.0)).is_empty());
        let sq = stroke(&p, false, Pen::new(4.0).with_cap(LineCap::Square));
        assert_eq!(bbox(&sq), RectF::new(3.0, 3.0, 7.0, 7.0));
        let round = stroke(&p, false, Pen::new(4.0).with_cap(LineCap::Round));
        assert_eq!(round.lengths.len(), 2);
        let b = bbox(&round);
        assert!((b.width() - 4.0).abs() < 0.05 && (b.height() - 4.0).abs() < 0.05);
    }

    #[test]
    fn reversal_does_not_bowtie() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(2.0, 0.0)];
        let out = stroke(&pts, false, Pen::new(2.0));
        assert!(!out.is_empty());
        let mut offset = 0;
        for &len in &out.lengths {
            assert!(signed_area(&out.points[offset..offset + len]) > 0.0);
            offset += len;
        }
    }
}
