// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Gradient brushes drawn through the paint engine.

use raster_core::geometry::{Matrix, Path};
use raster_core::renderer::PaintEngine;
use raster_core::types::{
    Brush, Color, FillRule, GradientStop, LayerOp, LinearGradient, RadialGradient, RectF, Vec2,
};

mod util;

fn stops(from: Color, to: Color) -> Vec<GradientStop> {
    vec![
        GradientStop {
            offset: 0.0,
            color: from,
        },
        GradientStop {
            offset: 1.0,
            color: to,
        },
    ]
}

fn horizontal(width: f32) -> Brush {
    Brush::Linear(LinearGradient {
        start: Vec2::new(0.0, 0.0),
        end: Vec2::new(width, 0.0),
        stops: stops(Color::BLACK, Color::rgb(255, 0, 0)),
    })
}

#[test]
fn linear_ramp_is_monotonic() {
    let mut engine = PaintEngine::new(100, 4);
    let rect = Path::rect(RectF::new(0.0, 0.0, 100.0, 4.0));
    engine.fill_path(&rect, &horizontal(100.0), FillRule::NonZero);
    let bmp = engine.target();
    let row: Vec<u8> = (0..100).map(|x| bmp.pixel(x, 2)[0]).collect();
    assert!(row.windows(2).all(|w| w[0] <= w[1]));
    assert!(row[0] < 5, "{}", row[0]);
    assert!(row[99] > 250, "{}", row[99]);
    assert!((0..100).all(|x| bmp.pixel(x, 2)[3] == 255));
    util::dump_png(bmp, "gradient_linear");
}

#[test]
fn linear_follows_transform() {
    let mut engine = PaintEngine::new(200, 2);
    engine.set_transform(Matrix::scale(2.0, 1.0));
    let rect = Path::rect(RectF::new(0.0, 0.0, 100.0, 2.0));
    engine.fill_path(&rect, &horizontal(100.0), FillRule::NonZero);
    let mid = engine.target().pixel(99, 0)[0];
    assert!((mid as i32 - 127).abs() <= 2, "{mid}");
    assert!(engine.target().pixel(199, 0)[0] > 250);
}

#[test]
fn radial_pads_outside_radius() {
    let brush = Brush::Radial(RadialGradient {
        center: Vec2::new(32.0, 32.0),
        radius: 16.0,
        stops: stops(Color::WHITE, Color::rgb(0, 0, 255)),
    });
    let mut engine = PaintEngine::new(64, 64);
    engine.fill_path(&Path::rect(RectF::new(0.0, 0.0, 64.0, 64.0)), &brush, FillRule::NonZero);
    let bmp = engine.target();
    let center = bmp.pixel(32, 32);
    assert!(center[0] > 240 && center[1] > 240);
    assert_eq!(bmp.pixel(0, 0), [0, 0, 255, 255]);
    assert_eq!(bmp.pixel(63, 40), [0, 0, 255, 255]);
}

#[test]
fn gradient_in_layer_samples_device_space() {
    let rect = Path::rect(RectF::new(50.0, 0.0, 100.0, 4.0));
    let mut direct = PaintEngine::new(100, 4);
    direct.fill_path(&rect, &horizontal(100.0), FillRule::NonZero);

    let mut layered = PaintEngine::new(100, 4);
    layered.begin_layer(RectF::new(50.0, 0.0, 100.0, 4.0), LayerOp::default());
    layered.fill_path(&rect, &horizontal(100.0), FillRule::NonZero);
    layered.compose_layer().unwrap();

    assert_eq!(util::bitmap_hash(direct.target()), util::bitmap_hash(layered.target()));
}

#[test]
fn transparent_stop_fades_alpha() {
    let brush = Brush::Linear(LinearGradient {
        start: Vec2::new(0.0, 0.0),
        end: Vec2::new(64.0, 0.0),
        stops: stops(Color::rgba(0, 128, 0, 255), Color::rgba(0, 128, 0, 0)),
    });
    let mut engine = PaintEngine::new(64, 1);
    engine.fill_path(&Path::rect(RectF::new(0.0, 0.0, 64.0, 1.0)), &brush, FillRule::NonZero);
    let bmp = engine.target();
    assert!(bmp.pixel(0, 0)[3] > 250);
    assert!(bmp.pixel(63, 0)[3] < 5);
    // premultiplied: color never exceeds alpha
    assert!((0..64).all(|x| {
        let p = bmp.pixel(x, 0);
        p[1] <= p[3]
    }));
}
