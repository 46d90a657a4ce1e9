// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Stroke expansion through the builder contract and the paint engine.

use raster_core::geometry::{compute_bounding_box, Path, StrokeBuilder, StrokePolygons, Stroker};
use raster_core::types::{Brush, Color, FillRule, LineCap, LineJoin, Pen, RectF, Vec2};
use raster_core::renderer::PaintEngine;

mod util;

#[derive(Default)]
struct Events {
    log: Vec<&'static str>,
    fan: Vec<Vec2>,
    pairs: usize,
}

impl StrokeBuilder for Events {
    fn begin_contour(&mut self) {
        self.log.push("begin");
    }
    fn end_contour(&mut self) {
        self.log.push("end");
    }
    fn add(&mut self, _left: Vec2, _right: Vec2) {
        self.pairs += 1;
    }
    fn begin_fan_left(&mut self, center: Vec2) -> &mut Vec<Vec2> {
        self.log.push("fan");
        self.fan.clear();
        self.fan.push(center);
        &mut self.fan
    }
    fn begin_fan_right(&mut self, center: Vec2) -> &mut Vec<Vec2> {
        self.begin_fan_left(center)
    }
    fn end_fan(&mut self) {
        self.log.push("end_fan");
    }
    fn break_strip(&mut self) {
        self.log.push("break");
    }
}

fn black() -> Brush {
    Brush::Solid(Color::BLACK)
}

fn polyline(points: &[Vec2], closed: bool) -> Path {
    let mut path = Path::new();
    path.move_to(points[0]);
    for &p in &points[1..] {
        path.line_to(p);
    }
    if closed {
        path.close();
    }
    path
}

#[test]
fn contours_are_bracketed() {
    let mut path = polyline(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)], false);
    path.move_to(Vec2::new(0.0, 10.0));
    path.line_to(Vec2::new(10.0, 10.0));
    path.line_to(Vec2::new(10.0, 20.0));
    let mut events = Events::default();
    let pen = Pen::new(2.0).with_join(LineJoin::Round).with_cap(LineCap::Round);
    Stroker::new(0.25).expand(path.contours(0.25), &pen, &mut events);
    let begins = events.log.iter().filter(|e| **e == "begin").count();
    let ends = events.log.iter().filter(|e| **e == "end").count();
    assert_eq!(begins, 2);
    assert_eq!(ends, 2);
    let fans = events.log.iter().filter(|e| **e == "fan").count();
    let fan_ends = events.log.iter().filter(|e| **e == "end_fan").count();
    assert_eq!(fans, fan_ends);
    // two caps per contour plus one round join
    assert!(fans >= 5, "{:?}", events.log);
    assert!(events.pairs >= 5);
}

#[test]
fn butt_stroke_area_is_length_times_width() {
    let mut engine = PaintEngine::new(64, 32);
    let path = polyline(&[Vec2::new(10.0, 16.0), Vec2::new(50.0, 16.0)], false);
    let mask_before = engine.coverage_mask(&path, FillRule::NonZero);
    assert_eq!(mask_before.count_nonzero(), 0);

    let mut out = StrokePolygons::new();
    Stroker::new(0.25).expand(path.contours(0.25), &Pen::new(6.0), &mut out);
    let bbox = compute_bounding_box(&out.points, RectF::EMPTY);
    assert_eq!(bbox, RectF::new(10.0, 13.0, 50.0, 19.0));

    engine.stroke_path(&path, &Pen::new(6.0), &black());
    let covered: f32 = engine.target().data().chunks_exact(4).map(|p| p[3] as f32 / 255.0).sum();
    assert!((covered - 240.0).abs() < 0.5, "{covered}");
}

#[test]
fn round_caps_add_a_disc() {
    let mut engine = PaintEngine::new(64, 32);
    let path = polyline(&[Vec2::new(15.0, 16.0), Vec2::new(45.0, 16.0)], false);
    let pen = Pen::new(8.0).with_cap(LineCap::Round);
    engine.stroke_path(&path, &pen, &black());
    let covered: f32 = engine.target().data().chunks_exact(4).map(|p| p[3] as f32 / 255.0).sum();
    let disc = std::f32::consts::PI * 16.0;
    // flattened arcs are inscribed, so slightly smaller than the true disc
    assert!(covered <= 240.0 + disc + 0.5 && covered > 240.0 + disc - 6.0, "{covered}");
    assert_eq!(engine.target().pixel(12, 16)[3], 255);
    assert_eq!(engine.target().pixel(9, 16)[3], 0);
}

#[test]
fn closed_miter_square_fills_corners() {
    let mut engine = PaintEngine::new(40, 40);
    let path = polyline(
        &[
            Vec2::new(10.0, 10.0),
            Vec2::new(30.0, 10.0),
            Vec2::new(30.0, 30.0),
            Vec2::new(10.0, 30.0),
        ],
        true,
    );
    engine.stroke_path(&path, &Pen::new(4.0), &black());
    let t = engine.target();
    // miter corners reach the outer square
    assert_eq!(t.pixel(8, 8)[3], 255);
    assert_eq!(t.pixel(31, 31)[3], 255);
    assert_eq!(t.pixel(20, 20)[3], 0);
    // outer minus inner square
    let covered: f32 = t.data().chunks_exact(4).map(|p| p[3] as f32 / 255.0).sum();
    assert!((covered - (24.0 * 24.0 - 16.0 * 16.0)).abs() < 0.5, "{covered}");
    util::dump_png(t, "closed_miter_square");
}

#[test]
fn bevel_leaves_corner_triangle() {
    let mut miter = PaintEngine::new(40, 40);
    let mut bevel = PaintEngine::new(40, 40);
    let path = polyline(
        &[Vec2::new(10.0, 30.0), Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0)],
        false,
    );
    let pen = Pen::new(6.0);
    miter.stroke_path(&path, &pen, &black());
    bevel.stroke_path(&path, &pen.with_join(LineJoin::Bevel), &black());
    assert_eq!(miter.target().pixel(7, 7)[3], 255);
    assert_eq!(bevel.target().pixel(7, 7)[3], 0);
    assert_eq!(bevel.target().pixel(10, 10)[3], 255);
}
