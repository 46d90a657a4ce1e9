// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Paints a small UI mock-up and writes it as PNG.
//!
//! Usage: `raster_demos [output.png] [config.json]`

use std::fs::File;

use log::{info, warn};
use raster_core::geometry::{Matrix, Path};
use raster_core::renderer::{Bitmap, BlendMode, CompositeMode, Insets, PaintEngine};
use raster_core::types::{
    Brush, Color, FillRule, GradientStop, LayerOp, LineCap, LineJoin, LinearGradient, Pen,
    RadialGradient, RectF, Vec2,
};
use raster_core::RenderConfig;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn stop(offset: f32, color: Color) -> GradientStop {
    GradientStop { offset, color }
}

/// Button skin for the nine patch: rounded border around a flat face.
fn button_skin() -> Bitmap {
    let mut engine = PaintEngine::new(24, 24);
    let frame = Path::rounded_rect(RectF::new(0.5, 0.5, 23.5, 23.5), 6.0);
    engine.fill_path(&frame, &Brush::Solid(Color::rgb(235, 238, 245)), FillRule::NonZero);
    engine.stroke_path(&frame, &Pen::new(1.0), &Brush::Solid(Color::rgb(90, 100, 130)));
    engine.into_target()
}

fn paint(engine: &mut PaintEngine) {
    engine.clear(Color::WHITE);

    let header = Brush::Linear(LinearGradient {
        start: Vec2::new(0.0, 0.0),
        end: Vec2::new(0.0, 48.0),
        stops: vec![stop(0.0, Color::rgb(60, 90, 170)), stop(1.0, Color::rgb(30, 50, 110))],
    });
    let band = Path::rect(RectF::new(0.0, 0.0, WIDTH as f32, 48.0));
    engine.fill_path(&band, &header, FillRule::NonZero);

    let skin = button_skin();
    let insets = Insets {
        left: 8,
        top: 8,
        right: 8,
        bottom: 8,
    };
    for (i, label_width) in [96.0, 64.0, 120.0].into_iter().enumerate() {
        let y = 70.0 + i as f32 * 44.0;
        engine.draw_nine_patch(&skin, insets, RectF::new(20.0, y, 20.0 + label_width, y + 32.0));
    }

    let pen = Pen::new(6.0).with_cap(LineCap::Round).with_join(LineJoin::Round);
    let mut chart = Path::new();
    chart.move_to(Vec2::new(170.0, 200.0));
    for (i, v) in [40.0, 90.0, 70.0, 130.0, 110.0].into_iter().enumerate() {
        chart.line_to(Vec2::new(190.0 + i as f32 * 26.0, 200.0 - v));
    }
    engine.stroke_path(&chart, &pen, &Brush::Solid(Color::rgb(220, 80, 60)));

    glow(engine, RectF::new(200.0, 50.0, 320.0, 170.0));

    engine.save();
    engine.clip_rect(RectF::new(0.0, 0.0, WIDTH as f32, 48.0));
    engine.transform(&Matrix::rotate(0.4).then(&Matrix::translate(280.0, 24.0)));
    let mut badge = Path::new();
    badge.arc(Vec2::new(0.0, 0.0), Vec2::new(14.0, 14.0), 0.0, std::f32::consts::TAU);
    badge.close();
    engine.fill_path(&badge, &Brush::Solid(Color::rgba(255, 200, 40, 230)), FillRule::NonZero);
    engine.restore();
}

/// Radial glow painted through a multiply layer.
fn glow(engine: &mut PaintEngine, bounds: RectF) {
    let brush = Brush::Radial(RadialGradient {
        center: Vec2::new(260.0, 110.0),
        radius: 60.0,
        stops: vec![stop(0.0, Color::rgb(120, 200, 255)), stop(1.0, Color::rgba(120, 200, 255, 0))],
    });
    let op = LayerOp {
        opacity: 0.8,
        blend: BlendMode::Multiply,
        composite: CompositeMode::SourceOver,
    };
    let result = engine.with_layer(bounds, op, |engine| {
        engine.fill_path(&Path::rect(bounds), &brush, FillRule::NonZero);
    });
    if let Err(err) = result {
        warn!("glow layer skipped: {err}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "demo.png".to_owned());
    let config = match args.next() {
        Some(path) => RenderConfig::from_reader(File::open(path)?)?,
        None => RenderConfig::default(),
    };
    info!("rendering {WIDTH}x{HEIGHT} with {config:?}");

    let mut engine = PaintEngine::with_config(Bitmap::new(WIDTH, HEIGHT), config);
    paint(&mut engine);
    engine.into_target().to_image().save(&output)?;
    info!("wrote {output}");
    Ok(())
}
