// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Winding rule checks against hand-computed winding numbers.

use raster_core::raster::{AlphaMask, RastParams, Rasterizer};
use raster_core::types::{FillRule, Rect, Vec2};

mod util;

/// Five-pointed star drawn as one self-crossing contour. The pentagon in
/// the middle is wound twice, the arms once.
fn star() -> Vec<Vec2> {
    (0..5)
        .map(|k| {
            let a = (-90.0f32 + 144.0 * k as f32).to_radians();
            Vec2::new(50.0 + 40.0 * a.cos(), 50.0 + 40.0 * a.sin())
        })
        .collect()
}

fn fill(points: &[Vec2], lengths: &[usize], rule: FillRule, antialias: bool) -> AlphaMask {
    let params = RastParams::new(Rect::from_size(100, 100))
        .with_fill_rule(rule)
        .with_antialias(antialias);
    let mut mask = AlphaMask::new(100, 100);
    Rasterizer::new().rasterize_polygons(points, lengths, &params, &mut mask);
    mask
}

// (pixel, winding number)
const STAR_SAMPLES: [((i32, i32), i32); 3] = [((50, 50), 2), ((49, 18), 1), ((5, 5), 0)];

#[test]
fn star_winding_per_rule() {
    let poly = star();
    for antialias in [false, true] {
        for rule in [FillRule::NonZero, FillRule::Odd, FillRule::Zero, FillRule::Even] {
            let mask = fill(&poly, &[5], rule, antialias);
            for ((x, y), winding) in STAR_SAMPLES {
                let expect = if rule.is_inside(winding) { 255 } else { 0 };
                assert_eq!(mask.get(x, y), expect, "{rule:?} aa={antialias} at ({x},{y})");
            }
        }
    }
}

#[test]
fn nested_same_direction_squares() {
    let points = [
        Vec2::new(10.0, 10.0),
        Vec2::new(90.0, 10.0),
        Vec2::new(90.0, 90.0),
        Vec2::new(10.0, 90.0),
        Vec2::new(30.0, 30.0),
        Vec2::new(70.0, 30.0),
        Vec2::new(70.0, 70.0),
        Vec2::new(30.0, 70.0),
    ];
    let nonzero = fill(&points, &[4, 4], FillRule::NonZero, true);
    let odd = fill(&points, &[4, 4], FillRule::Odd, true);
    assert_eq!(nonzero.get(50, 50), 255);
    assert_eq!(odd.get(50, 50), 0);
    assert_eq!(odd.get(20, 50), 255);
    // ring area plus hole area
    assert_eq!(nonzero.count_nonzero(), 80 * 80);
    assert_eq!(odd.count_nonzero(), 80 * 80 - 40 * 40);
}

#[test]
fn opposite_direction_hole_is_empty_under_both_rules() {
    let points = [
        Vec2::new(10.0, 10.0),
        Vec2::new(90.0, 10.0),
        Vec2::new(90.0, 90.0),
        Vec2::new(10.0, 90.0),
        Vec2::new(30.0, 30.0),
        Vec2::new(30.0, 70.0),
        Vec2::new(70.0, 70.0),
        Vec2::new(70.0, 30.0),
    ];
    for rule in [FillRule::NonZero, FillRule::Odd] {
        let mask = fill(&points, &[4, 4], rule, false);
        assert_eq!(mask.get(50, 50), 0);
        assert_eq!(mask.get(15, 15), 255);
    }
}

#[test]
fn complementary_rule_partial_edges() {
    // left edge halfway through column 20
    let points = [
        Vec2::new(20.5, 0.0),
        Vec2::new(60.0, 0.0),
        Vec2::new(60.0, 100.0),
        Vec2::new(20.5, 100.0),
    ];
    let inside = fill(&points, &[4], FillRule::NonZero, true);
    let outside = fill(&points, &[4], FillRule::Zero, true);
    assert_eq!(inside.get(20, 40), 128);
    assert_eq!(outside.get(20, 40), 128);
    assert_eq!(outside.get(0, 40), 255);
    assert_eq!(outside.get(40, 40), 0);
    let total = util::coverage_sum(&inside) + util::coverage_sum(&outside);
    assert!((total - 10_000.0).abs() < 1.0);
}
