// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Layer stack compositing through the paint engine.

use raster_core::geometry::Path;
use raster_core::renderer::{BlendMode, CompositeMode, PaintEngine};
use raster_core::types::{Brush, Color, FillRule, LayerOp, Rect, RectF};
use raster_core::Error;

const RED: Color = Color::rgb(255, 0, 0);
const GREEN: Color = Color::rgb(0, 255, 0);

#[test]
fn group_opacity_is_not_per_draw() {
    // overlapping draws inside a half opaque layer stay uniform
    let mut engine = PaintEngine::new(16, 16);
    engine.begin_layer(RectF::new(0.0, 0.0, 16.0, 16.0), LayerOp::with_opacity(0.5));
    engine.fill_path(
        &Path::rect(RectF::new(0.0, 0.0, 10.0, 16.0)),
        &Brush::Solid(RED),
        FillRule::NonZero,
    );
    engine.fill_path(
        &Path::rect(RectF::new(6.0, 0.0, 16.0, 16.0)),
        &Brush::Solid(RED),
        FillRule::NonZero,
    );
    engine.compose_layer().unwrap();
    let t = engine.target();
    assert_eq!(t.pixel(2, 2), t.pixel(8, 2));
    assert_eq!(t.pixel(8, 2), t.pixel(14, 2));
    assert_eq!(t.pixel(8, 2)[3], 128);
}

#[test]
fn layer_blend_mode_multiplies_backdrop() {
    let mut engine = PaintEngine::new(8, 8);
    engine.clear(Color::rgb(255, 255, 0));
    let op = LayerOp {
        opacity: 1.0,
        blend: BlendMode::Multiply,
        composite: CompositeMode::SourceOver,
    };
    engine
        .with_layer(RectF::new(0.0, 0.0, 8.0, 8.0), op, |e| {
            e.clear(Color::rgb(0, 255, 255));
        })
        .unwrap();
    assert_eq!(engine.target().pixel(3, 3), [0, 255, 0, 255]);
}

#[test]
fn destination_in_layer_masks_parent() {
    let mut engine = PaintEngine::new(8, 8);
    engine.clear(GREEN);
    let op = LayerOp {
        opacity: 1.0,
        blend: BlendMode::Normal,
        composite: CompositeMode::DestinationIn,
    };
    engine.begin_layer(RectF::new(0.0, 0.0, 8.0, 8.0), op);
    engine.fill_path(
        &Path::rect(RectF::new(0.0, 0.0, 4.0, 8.0)),
        &Brush::Solid(Color::BLACK),
        FillRule::NonZero,
    );
    engine.compose_layer().unwrap();
    assert_eq!(engine.target().pixel(1, 1), [0, 255, 0, 255]);
    assert_eq!(engine.target().pixel(6, 1), [0; 4]);
}

#[test]
fn unbalanced_compose_is_reported() {
    let mut engine = PaintEngine::new(4, 4);
    engine.begin_layer(RectF::new(0.0, 0.0, 4.0, 4.0), LayerOp::default());
    assert!(engine.compose_layer().is_ok());
    assert!(matches!(engine.compose_layer(), Err(Error::NoActiveLayer)));
}

#[test]
fn layer_clip_is_restored_after_compose() {
    let mut engine = PaintEngine::new(16, 16);
    engine.begin_layer(RectF::new(4.0, 4.0, 8.0, 8.0), LayerOp::default());
    assert_eq!(engine.clip(), Rect::new(4, 4, 8, 8));
    engine.compose_layer().unwrap();
    assert_eq!(engine.clip(), Rect::from_size(16, 16));
    engine.fill_path(
        &Path::rect(RectF::new(0.0, 0.0, 16.0, 16.0)),
        &Brush::Solid(RED),
        FillRule::NonZero,
    );
    assert_eq!(engine.target().pixel(0, 0), [255, 0, 0, 255]);
}
