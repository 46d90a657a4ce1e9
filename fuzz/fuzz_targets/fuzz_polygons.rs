// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
#![no_main]
use libfuzzer_sys::fuzz_target;
use raster_core::geometry::split_into_trapezoids;
use raster_core::raster::{AlphaMask, RastParams, Rasterizer};
use raster_core::types::{FillRule, Rect, Vec2};

const RULES: [FillRule; 4] = [FillRule::NonZero, FillRule::Odd, FillRule::Zero, FillRule::Even];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let rule = RULES[(data[0] & 3) as usize];
    let antialias = data[0] & 4 != 0;
    let points: Vec<Vec2> = data[1..]
        .chunks_exact(2)
        .map(|c| Vec2::new(c[0] as f32 * 0.25 - 8.0, c[1] as f32 * 0.25 - 8.0))
        .collect();
    let split = (data[1] as usize % (points.len() + 1)).min(points.len());
    let lengths = [split, points.len() - split];

    let mut mask = AlphaMask::new(48, 48);
    let params = RastParams::new(Rect::new(0, 0, 48, 48))
        .with_antialias(antialias)
        .with_fill_rule(rule);
    Rasterizer::new().rasterize_polygons(&points, &lengths, &params, &mut mask);

    let mut trapezoids = Vec::new();
    if split_into_trapezoids(&points, &mut trapezoids) {
        let params = params.with_fill_rule(FillRule::NonZero);
        Rasterizer::new().rasterize_trapezoid_chain(&trapezoids, &params, &mut mask);
    }
});
