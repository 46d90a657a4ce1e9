// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: polygon set rasterization
//!
//! Two sweeps share one edge table. Without antialiasing each scanline is
//! sampled at its center and spans are produced by walking x-sorted edge
//! crossings. With antialiasing every edge deposits its exact signed area
//! into a per-row accumulator (`area`) plus a carry (`fill`) that a running
//! sum spreads to every pixel right of the edge.

use super::clip::{clip_polygon, PolygonClip};
use super::edge::{build_edges, sort_edges};
use super::{center_span, coverage_to_alpha, Plotter, RastParams, Rasterizer, RowWriter};
use crate::geometry::compute_bounding_box;
use crate::types::{FillRule, RectF, Vec2};

/// Active edge counts below this are ordered with an insertion sort.
const SMALL_ACTIVE: usize = 20;

impl Rasterizer {
    /// Fill the polygon set given as a flat point buffer and per-contour
    /// point counts. Contours are implicitly closed; contours with fewer
    /// than three points contribute nothing.
    ///
    /// # Panics
    ///
    /// When the clip box is empty or `lengths` addresses more points than
    /// `points` holds.
    pub fn rasterize_polygons<P: Plotter + ?Sized>(
        &mut self,
        points: &[Vec2],
        lengths: &[usize],
        params: &RastParams,
        plotter: &mut P,
    ) {
        assert!(!params.clip.is_empty(), "rasterizer called with an empty clip box");
        assert!(
            lengths.iter().sum::<usize>() <= points.len(),
            "contour lengths exceed the point buffer"
        );

        let clip = params.clip.to_rectf();
        self.edges.clear();
        let mut bounds = RectF::EMPTY;
        let mut offset = 0;
        for &len in lengths {
            let poly = &points[offset..offset + len];
            offset += len;
            if len < 3 || !poly.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
                continue;
            }
            let bbox = compute_bounding_box(poly, RectF::EMPTY);
            match clip_polygon(poly, &bbox, &clip, &mut self.clipped, &mut self.clip_scratch) {
                PolygonClip::Outside => continue,
                PolygonClip::Inside => build_edges(poly, &mut self.edges),
                PolygonClip::Clipped => build_edges(&self.clipped, &mut self.edges),
            }
            bounds.include(Vec2::new(bbox.left, bbox.top));
            bounds.include(Vec2::new(bbox.right, bbox.bottom));
        }

        let complementary = params.fill_rule.is_complementary();
        if self.edges.is_empty() && !complementary {
            return;
        }
        sort_edges(&mut self.edges);

        let (y_start, y_end) = if complementary {
            (params.clip.top, params.clip.bottom)
        } else {
            let rows = bounds.round_out();
            (
                rows.top.max(params.clip.top),
                rows.bottom.min(params.clip.bottom),
            )
        };

        if params.antialias {
            self.sweep_aa(y_start, y_end, params, plotter);
        } else {
            self.sweep_center(y_start, y_end, params, plotter);
        }
    }

    fn sweep_center<P: Plotter + ?Sized>(
        &mut self,
        y_start: i32,
        y_end: i32,
        params: &RastParams,
        plotter: &mut P,
    ) {
        let rule = params.fill_rule;
        let clip = params.clip;
        self.active.clear();
        let mut next = 0;
        for y in y_start..y_end {
            let sy = y as f32 + 0.5;
            while next < self.edges.len() && self.edges[next].y0 <= sy {
                let e = self.edges[next];
                next += 1;
                if e.y1 > sy {
                    self.active.insert(e);
                }
            }
            self.active.retain(|n| n.edge.y1 > sy);

            self.crossings.clear();
            for n in self.active.iter() {
                let x = n.edge.x0 + (sy - n.edge.y0) * n.dxdy;
                self.crossings.push((x, n.edge.winding()));
            }
            if self.crossings.len() < SMALL_ACTIVE {
                insertion_sort_by_x(&mut self.crossings);
            } else {
                self.crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
            }

            let mut winding = 0;
            let mut inside = rule.is_inside(0);
            let mut start = f32::NEG_INFINITY;
            for &(x, w) in &self.crossings {
                winding += w;
                let now = rule.is_inside(winding);
                if now != inside {
                    if now {
                        start = x;
                    } else {
                        center_span(plotter, start, x, y, clip.left, clip.right);
                    }
                    inside = now;
                }
            }
            if inside {
                center_span(plotter, start, f32::INFINITY, y, clip.left, clip.right);
            }

            if next >= self.edges.len() && self.active.len() == 0 && !rule.is_complementary() {
                break;
            }
        }
    }

    fn sweep_aa<P: Plotter + ?Sized>(
        &mut self,
        y_start: i32,
        y_end: i32,
        params: &RastParams,
        plotter: &mut P,
    ) {
        let rule = params.fill_rule;
        let clip = params.clip;
        let width = clip.width() as usize;
        self.area.clear();
        self.area.resize(width + 1, 0.0);
        self.fill.clear();
        self.fill.resize(width + 2, 0.0);
        self.active.clear();

        let left = clip.left as f32;
        let mut next = 0;
        for y in y_start..y_end {
            let top = y as f32;
            let bottom = top + 1.0;
            while next < self.edges.len() && self.edges[next].y0 < bottom {
                let e = self.edges[next];
                next += 1;
                if e.y1 > top {
                    self.active.insert(e);
                }
            }
            self.active.retain(|n| n.edge.y1 > top);

            let mut touched = (usize::MAX, 0usize);
            for n in self.active.iter() {
                let e = &n.edge;
                let y0 = e.y0.max(top);
                let y1 = e.y1.min(bottom);
                if y1 <= y0 {
                    continue;
                }
                let xa = (e.x_at(y0) - left).clamp(0.0, width as f32);
                let xb = (e.x_at(y1) - left).clamp(0.0, width as f32);
                let h = (y1 - y0) * e.winding() as f32;
                let span = accumulate(&mut self.area, &mut self.fill, xa, xb, h);
                touched.0 = touched.0.min(span.0);
                touched.1 = touched.1.max(span.1);
            }

            let (from, to) = if rule.is_complementary() {
                (0, width)
            } else if touched.0 == usize::MAX {
                continue;
            } else {
                (touched.0, (touched.1 + 1).min(width))
            };
            emit_row(&self.area, &self.fill, from, to, y, clip.left, rule, plotter);

            if rule.is_complementary() {
                self.area.iter_mut().for_each(|v| *v = 0.0);
                self.fill.iter_mut().for_each(|v| *v = 0.0);
            } else {
                self.area[touched.0..=touched.1.min(width)].iter_mut().for_each(|v| *v = 0.0);
                self.fill[touched.0..=(touched.1 + 1).min(width + 1)]
                    .iter_mut()
                    .for_each(|v| *v = 0.0);
            }
        }
    }
}

fn insertion_sort_by_x(v: &mut [(f32, i32)]) {
    for i in 1..v.len() {
        let t = v[i];
        let mut j = i;
        while j > 0 && t.0 < v[j - 1].0 {
            v[j] = v[j - 1];
            j -= 1;
        }
        v[j] = t;
    }
}

/// Deposit the signed area of one edge piece crossing a row band. `xa`/`xb`
/// are the piece's x at the band top/bottom relative to the clip, `h` its
/// signed height. Returns the first and last column written.
fn accumulate(area: &mut [f32], fill: &mut [f32], xa: f32, xb: f32, h: f32) -> (usize, usize) {
    let max_col = area.len() - 1;
    let (lo, hi) = if xa <= xb { (xa, xb) } else { (xb, xa) };
    let first = (lo.floor() as usize).min(max_col);
    if hi - lo < 1e-6 || hi <= (first + 1) as f32 {
        let mid = (lo + hi) * 0.5;
        area[first] += h * ((first + 1) as f32 - mid);
        fill[first + 1] += h;
        return (first, first);
    }
    let per_x = h / (hi - lo);
    let last = ((hi.ceil() as usize).max(1) - 1).min(max_col);
    let mut x = lo;
    for c in first..=last {
        let nx = ((c + 1) as f32).min(hi);
        let ph = (nx - x) * per_x;
        let mid = (x + nx) * 0.5;
        area[c] += ph * ((c + 1) as f32 - mid);
        fill[c + 1] += ph;
        x = nx;
    }
    (first, last)
}

#[allow(clippy::too_many_arguments)]
fn emit_row<P: Plotter + ?Sized>(
    area: &[f32],
    fill: &[f32],
    from: usize,
    to: usize,
    y: i32,
    left: i32,
    rule: FillRule,
    plotter: &mut P,
) {
    let mut acc: f32 = fill[..=from].iter().sum();
    let mut row = RowWriter::new(y);
    for i in from..to {
        if i > from {
            acc += fill[i];
        }
        let alpha = coverage_to_alpha(rule.coverage(area[i] + acc));
        row.push(plotter, left + i as i32, alpha);
    }
    row.flush(plotter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::AlphaMask;
    use crate::types::Rect;

    fn rect(l: f32, t: f32, r: f32, b: f32) -> [Vec2; 4] {
        [Vec2::new(l, t), Vec2::new(r, t), Vec2::new(r, b), Vec2::new(l, b)]
    }

    fn fill(points: &[Vec2], lengths: &[usize], params: RastParams) -> AlphaMask {
        let mut mask = AlphaMask::new(params.clip.width() as u32, params.clip.height() as u32);
        Rasterizer::new().rasterize_polygons(points, lengths, &params, &mut mask);
        mask
    }

    #[test]
    fn accumulate_single_column() {
        let mut area = vec![0.0; 5];
        let mut fill = vec![0.0; 6];
        accumulate(&mut area, &mut fill, 1.25, 1.75, 1.0);
        assert!((area[1] - 0.5).abs() < 1e-6);
        assert_eq!(fill[2], 1.0);
    }

    #[test]
    fn accumulate_spanning_columns() {
        let mut area = vec![0.0; 6];
        let mut fill = vec![0.0; 7];
        accumulate(&mut area, &mut fill, 0.5, 3.5, 1.0);
        let total: f32 = fill.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        let mut acc = 0.0;
        let coverage: Vec<f32> = (0..5)
            .map(|i| {
                acc += fill[i];
                area[i] + acc
            })
            .collect();
        let expected = [1.0 / 24.0, 1.0 / 3.0, 2.0 / 3.0, 23.0 / 24.0, 1.0];
        for (got, want) in coverage.iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "{coverage:?}");
        }
    }

    #[test]
    fn aa_integer_rectangle_is_opaque() {
        let params = RastParams::new(Rect::from_size(10, 10));
        let mask = fill(&rect(2.0, 3.0, 7.0, 6.0), &[4], params);
        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..7).contains(&x) && (3..6).contains(&y);
                assert_eq!(mask.get(x, y), if inside { 255 } else { 0 }, "{x},{y}");
            }
        }
    }

    #[test]
    fn aa_half_pixel_edges() {
        let params = RastParams::new(Rect::from_size(10, 10));
        let mask = fill(&rect(2.5, 3.0, 7.5, 6.0), &[4], params);
        assert_eq!(mask.get(2, 4), 128);
        assert_eq!(mask.get(7, 4), 128);
        assert_eq!(mask.get(5, 4), 255);
        assert_eq!(mask.get(1, 4), 0);
    }

    #[test]
    fn complementary_fills_outside() {
        let params = RastParams::new(Rect::from_size(8, 8)).with_fill_rule(FillRule::Zero);
        let mask = fill(&rect(2.0, 2.0, 6.0, 6.0), &[4], params);
        assert_eq!(mask.get(0, 0), 255);
        assert_eq!(mask.get(3, 3), 0);
        assert_eq!(mask.get(7, 7), 255);

        let centered = params.with_antialias(false);
        let mask = fill(&rect(2.0, 2.0, 6.0, 6.0), &[4], centered);
        assert_eq!(mask.get(0, 3), 255);
        assert_eq!(mask.get(3, 3), 0);
    }

    #[test]
    fn complementary_with_no_edges_fills_clip() {
        let params = RastParams::new(Rect::new(1, 1, 4, 3)).with_fill_rule(FillRule::Even);
        let mut mask = AlphaMask::new(6, 6);
        Rasterizer::new().rasterize_polygons(&[], &[], &params, &mut mask);
        assert_eq!(mask.count_nonzero(), 6);
    }

    #[test]
    fn shape_outside_clip_draws_nothing() {
        let params = RastParams::new(Rect::from_size(10, 10));
        let mask = fill(&rect(20.0, 20.0, 30.0, 30.0), &[4], params);
        assert_eq!(mask.count_nonzero(), 0);
    }

    #[test]
    fn clipped_shape_stays_in_clip() {
        let params = RastParams::new(Rect::new(2, 2, 6, 6));
        let mut mask = AlphaMask::new(10, 10);
        let big = rect(-5.0, -5.0, 20.0, 20.0);
        Rasterizer::new().rasterize_polygons(&big, &[4], &params, &mut mask);
        assert_eq!(mask.count_nonzero(), 16);
        assert_eq!(mask.get(1, 3), 0);
        assert_eq!(mask.get(2, 2), 255);
    }

    #[test]
    #[should_panic(expected = "empty clip")]
    fn empty_clip_panics() {
        let params = RastParams::new(Rect::new(4, 4, 4, 9));
        let mut mask = AlphaMask::new(10, 10);
        Rasterizer::new().rasterize_polygons(&rect(0.0, 0.0, 5.0, 5.0), &[4], &params, &mut mask);
    }
}
