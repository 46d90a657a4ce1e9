// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: vector path representation and flattening

use std::f32::consts::{FRAC_PI_2, PI};

use crate::types::{Contour, RectF, Vec2};

/// Cubic approximation constant for a quarter circle.
const KAPPA: f32 = 0.552_284_8;
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Basic path drawing commands.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSeg {
    /// Move to absolute position.
    MoveTo(Vec2),
    /// Line to absolute position.
    LineTo(Vec2),
    /// Quadratic Bézier curve with one control point and end point.
    Quad(Vec2, Vec2),
    /// Cubic Bézier curve with two control points and end point.
    Cubic(Vec2, Vec2, Vec2),
    /// Elliptic arc around `center`, starting at `start` radians and
    /// sweeping `sweep` radians. Connected to the current point by a line.
    Arc {
        center: Vec2,
        radii: Vec2,
        start: f32,
        sweep: f32,
    },
    /// Close current sub-path.
    Close,
}

/// A sequence of [`PathSeg`] items forming a vector path.
#[derive(Debug, Default, Clone)]
pub struct Path {
    /// Ordered list of path segments
    pub segments: Vec<PathSeg>,
}

impl Path {
    /// Create a new empty path.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append a move command.
    pub fn move_to(&mut self, p: Vec2) {
        self.segments.push(PathSeg::MoveTo(p));
    }

    /// Append a line command.
    pub fn line_to(&mut self, p: Vec2) {
        self.segments.push(PathSeg::LineTo(p));
    }

    /// Append a quadratic Bézier curve command.
    pub fn quad_to(&mut self, c: Vec2, p: Vec2) {
        self.segments.push(PathSeg::Quad(c, p));
    }

    /// Append a cubic Bézier curve command.
    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) {
        self.segments.push(PathSeg::Cubic(c1, c2, p));
    }

    /// Append an elliptic arc.
    pub fn arc(&mut self, center: Vec2, radii: Vec2, start: f32, sweep: f32) {
        self.segments.push(PathSeg::Arc {
            center,
            radii,
            start,
            sweep,
        });
    }

    /// Close the current sub-path.
    pub fn close(&mut self) {
        self.segments.push(PathSeg::Close);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Closed axis-aligned rectangle.
    pub fn rect(r: RectF) -> Self {
        let mut path = Path::new();
        path.move_to(Vec2::new(r.left, r.top));
        path.line_to(Vec2::new(r.right, r.top));
        path.line_to(Vec2::new(r.right, r.bottom));
        path.line_to(Vec2::new(r.left, r.bottom));
        path.close();
        path
    }

    /// Rectangle with cubic quarter-circle corners. The radius is clamped to
    /// half the shorter side; a radius of zero or less yields [`Path::rect`].
    pub fn rounded_rect(r: RectF, radius: f32) -> Self {
        let radius = radius.min(r.width() * 0.5).min(r.height() * 0.5);
        if radius <= 0.0 || radius.is_nan() {
            return Self::rect(r);
        }
        let k = radius * KAPPA;
        let (l, t, rt, b) = (r.left, r.top, r.right, r.bottom);
        let mut path = Path::new();
        path.move_to(Vec2::new(l + radius, t));
        path.line_to(Vec2::new(rt - radius, t));
        path.cubic_to(
            Vec2::new(rt - radius + k, t),
            Vec2::new(rt, t + radius - k),
            Vec2::new(rt, t + radius),
        );
        path.line_to(Vec2::new(rt, b - radius));
        path.cubic_to(
            Vec2::new(rt, b - radius + k),
            Vec2::new(rt - radius + k, b),
            Vec2::new(rt - radius, b),
        );
        path.line_to(Vec2::new(l + radius, b));
        path.cubic_to(
            Vec2::new(l + radius - k, b),
            Vec2::new(l, b - radius + k),
            Vec2::new(l, b - radius),
        );
        path.line_to(Vec2::new(l, t + radius));
        path.cubic_to(
            Vec2::new(l, t + radius - k),
            Vec2::new(l + radius - k, t),
            Vec2::new(l + radius, t),
        );
        path.close();
        path
    }

    /// Full ellipse as a closed arc.
    pub fn ellipse(center: Vec2, radii: Vec2) -> Self {
        let mut path = Path::new();
        path.move_to(Vec2::new(center.x + radii.x, center.y));
        path.arc(center, radii, 0.0, 2.0 * PI);
        path.close();
        path
    }

    /// Flatten the path lazily, one contour at a time. The iterator is
    /// finite and cheap to clone; calling `contours` again restarts it.
    pub fn contours(&self, tolerance: f32) -> Contours<'_> {
        Contours {
            segments: &self.segments,
            pos: 0,
            tolerance: tolerance.max(1e-3),
            current: Vec2::default(),
        }
    }
}

/// Lazy contour iterator returned by [`Path::contours`].
#[derive(Debug, Clone)]
pub struct Contours<'a> {
    segments: &'a [PathSeg],
    pos: usize,
    tolerance: f32,
    current: Vec2,
}

impl Iterator for Contours<'_> {
    type Item = Contour;

    fn next(&mut self) -> Option<Contour> {
        let segments = self.segments;
        while self.pos < segments.len() {
            let mut contour = Contour::default();
            let mut started = false;
            let mut drew = false;
            while self.pos < segments.len() {
                let seg = &segments[self.pos];
                if matches!(seg, PathSeg::MoveTo(_)) && started {
                    break;
                }
                self.pos += 1;
                if !started && !matches!(seg, PathSeg::MoveTo(_) | PathSeg::Close) {
                    push_point(&mut contour, self.current);
                }
                match *seg {
                    PathSeg::MoveTo(p) => {
                        self.current = p;
                        push_point(&mut contour, p);
                    }
                    PathSeg::LineTo(p) => {
                        push_point(&mut contour, p);
                        self.current = p;
                        drew = true;
                    }
                    PathSeg::Quad(c, p) => {
                        let p0 = self.current;
                        let c1 = p0 + (c - p0) * (2.0 / 3.0);
                        let c2 = p + (c - p) * (2.0 / 3.0);
                        flatten_cubic(p0, c1, c2, p, self.tolerance, 0, &mut contour);
                        self.current = p;
                        drew = true;
                    }
                    PathSeg::Cubic(c1, c2, p) => {
                        flatten_cubic(self.current, c1, c2, p, self.tolerance, 0, &mut contour);
                        self.current = p;
                        drew = true;
                    }
                    PathSeg::Arc {
                        center,
                        radii,
                        start,
                        sweep,
                    } => {
                        self.current =
                            flatten_arc(center, radii, start, sweep, self.tolerance, &mut contour);
                        drew = true;
                    }
                    PathSeg::Close => {
                        contour.closed = true;
                        if let Some(&first) = contour.points.first() {
                            self.current = first;
                        }
                        break;
                    }
                }
                started = true;
            }
            if contour.closed
                && contour.points.len() > 1
                && contour.points.last() == contour.points.first()
            {
                contour.points.pop();
            }
            // a bare move-to draws nothing; a closed single point is a dot
            if !contour.points.is_empty() && (drew || contour.closed) {
                return Some(contour);
            }
        }
        None
    }
}

fn push_point(contour: &mut Contour, p: Vec2) {
    if contour.points.last() != Some(&p) {
        contour.points.push(p);
    }
}

fn flatten_cubic(
    p0: Vec2,
    c1: Vec2,
    c2: Vec2,
    p3: Vec2,
    tolerance: f32,
    depth: u32,
    out: &mut Contour,
) {
    if depth >= MAX_SUBDIVISION_DEPTH || cubic_flat_enough(p0, c1, c2, p3, tolerance) {
        push_point(out, p3);
    } else {
        let (p0a, c1a, c2a, p3a, p0b, c1b, c2b, p3b) = split_cubic(p0, c1, c2, p3);
        flatten_cubic(p0a, c1a, c2a, p3a, tolerance, depth + 1, out);
        flatten_cubic(p0b, c1b, c2b, p3b, tolerance, depth + 1, out);
    }
}

fn cubic_flat_enough(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, tol: f32) -> bool {
    let d1 = point_line_distance_sq(c1, p0, p3);
    let d2 = point_line_distance_sq(c2, p0, p3);
    d1 <= tol * tol && d2 <= tol * tol
}

fn point_line_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let v = b - a;
    let len_sq = v.length_sq();
    if len_sq <= f32::EPSILON {
        return (p - a).length_sq();
    }
    let u = (p - a).dot(v) / len_sq;
    let d = a + v * u - p;
    d.length_sq()
}

fn split_cubic(
    p0: Vec2,
    c1: Vec2,
    c2: Vec2,
    p3: Vec2,
) -> (Vec2, Vec2, Vec2, Vec2, Vec2, Vec2, Vec2, Vec2) {
    let m1 = mid(p0, c1);
    let m2 = mid(c1, c2);
    let m3 = mid(c2, p3);
    let m4 = mid(m1, m2);
    let m5 = mid(m2, m3);
    let m6 = mid(m4, m5);
    (
        p0, m1, m4, m6, // first half
        m6, m5, m3, p3, // second half
    )
}

fn mid(a: Vec2, b: Vec2) -> Vec2 {
    Vec2 {
        x: (a.x + b.x) * 0.5,
        y: (a.y + b.y) * 0.5,
    }
}

/// Number of chords needed to keep an arc of `radius` within `tolerance`.
pub(crate) fn arc_steps(radius: f32, angle: f32, tolerance: f32) -> usize {
    let angle = angle.abs();
    if radius <= tolerance || angle <= 0.0 {
        return ((angle / FRAC_PI_2).ceil() as usize).clamp(1, 1024);
    }
    let step = 2.0 * (1.0 - tolerance / radius).acos();
    ((angle / step).ceil() as usize).clamp(1, 1024)
}

fn flatten_arc(
    center: Vec2,
    radii: Vec2,
    start: f32,
    sweep: f32,
    tolerance: f32,
    out: &mut Contour,
) -> Vec2 {
    let steps = arc_steps(radii.x.abs().max(radii.y.abs()), sweep, tolerance);
    let mut last = center;
    for i in 0..=steps {
        let a = start + sweep * i as f32 / steps as f32;
        let (s, c) = a.sin_cos();
        last = Vec2::new(center.x + radii.x * c, center.y + radii.y * s);
        push_point(out, last);
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_arc_with_huge_sweep_is_bounded() {
        assert_eq!(arc_steps(0.1, 1.0e9, 0.25), 1024);
        assert_eq!(arc_steps(0.1, 0.0, 0.25), 1);
        let mut path = Path::new();
        path.move_to(Vec2::new(5.01, 5.0));
        path.arc(Vec2::new(5.0, 5.0), Vec2::new(0.01, 0.01), 0.0, 1.0e6);
        let points: usize = path.contours(0.25).map(|c| c.points.len()).sum();
        assert!(points <= 1026, "{points}");
    }

    #[test]
    fn path_build_and_flatten() {
        let mut path = Path::new();
        path.move_to(Vec2 { x: 0.0, y: 0.0 });
        path.line_to(Vec2 { x: 1.0, y: 0.0 });
        path.cubic_to(
            Vec2 { x: 1.0, y: 1.0 },
            Vec2 { x: 0.0, y: 1.0 },
            Vec2 { x: 0.0, y: 0.0 },
        );
        path.close();
        let contours: Vec<_> = path.contours(0.01).collect();
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.closed);
        assert!(c.points.len() > 3);
        assert_eq!(c.points[0], Vec2 { x: 0.0, y: 0.0 });
        assert_eq!(c.points[1], Vec2 { x: 1.0, y: 0.0 });
        // closing point duplicates the start and is dropped
        assert_ne!(c.points.last(), c.points.first());
    }

    #[test]
    fn contours_split_on_move_and_restart() {
        let mut path = Path::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(5.0, 0.0));
        path.move_to(Vec2::new(0.0, 5.0));
        path.line_to(Vec2::new(5.0, 5.0));
        path.line_to(Vec2::new(5.0, 9.0));
        path.close();
        let iter = path.contours(0.25);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(!first[0].closed);
        assert_eq!(first[0].points.len(), 2);
        assert!(first[1].closed);
        assert_eq!(first[1].points.len(), 3);
    }

    #[test]
    fn degenerate_cubic_terminates() {
        let p = Vec2::new(3.0, 3.0);
        let mut path = Path::new();
        path.move_to(p);
        path.cubic_to(p, p, p);
        let contours: Vec<_> = path.contours(0.25).collect();
        assert_eq!(contours[0].points.len(), 1);
    }

    #[test]
    fn zero_radius_rounded_rect_is_rect() {
        let r = RectF::new(1.0, 2.0, 11.0, 8.0);
        let c: Vec<_> = Path::rounded_rect(r, 0.0).contours(0.25).collect();
        assert_eq!(c[0].points.len(), 4);
    }

    #[test]
    fn ellipse_stays_within_tolerance() {
        let path = Path::ellipse(Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0));
        let c: Vec<_> = path.contours(0.25).collect();
        assert!(c[0].closed);
        for w in c[0].points.windows(2) {
            let m = mid(w[0], w[1]);
            assert!(50.0 - m.length() <= 0.26);
        }
    }
}
