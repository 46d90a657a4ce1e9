// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: wasm canvas export

use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::ImageData;

use super::bitmap::unpremultiply;
use super::cpu::{DrawSurface, PaintEngine};
use crate::geometry::Path;
use crate::types::{Brush, Color, FillRule, Pen, RectF, Vec2};

/// Paint engine exposed to JavaScript. Pixels are exported as canvas
/// `ImageData` (straight alpha).
#[wasm_bindgen]
pub struct CanvasSurface {
    engine: PaintEngine,
    buffer: Vec<u8>,
}

fn color(rgba: u32) -> Color {
    let [r, g, b, a] = rgba.to_be_bytes();
    Color::rgba(r, g, b, a)
}

#[wasm_bindgen]
impl CanvasSurface {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> CanvasSurface {
        Self {
            engine: PaintEngine::new(width, height),
            buffer: Vec::new(),
        }
    }

    /// Colors are packed `0xRRGGBBAA`.
    pub fn clear(&mut self, rgba: u32) {
        self.engine.clear(color(rgba));
    }

    #[wasm_bindgen(js_name = fillRect)]
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgba: u32) {
        self.engine
            .fill_rect(RectF::new(x, y, x + w, y + h), &Brush::Solid(color(rgba)));
    }

    #[wasm_bindgen(js_name = fillEllipse)]
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rgba: u32) {
        let path = Path::ellipse(Vec2::new(cx, cy), Vec2::new(rx, ry));
        self.engine
            .fill_path(&path, &Brush::Solid(color(rgba)), FillRule::NonZero);
    }

    #[wasm_bindgen(js_name = strokeLine)]
    pub fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, rgba: u32) {
        let mut path = Path::new();
        path.move_to(Vec2::new(x0, y0));
        path.line_to(Vec2::new(x1, y1));
        self.engine
            .stroke_path(&path, &Pen::new(width), &Brush::Solid(color(rgba)));
    }

    /// Snapshot of the surface for `putImageData`.
    #[wasm_bindgen(js_name = imageData)]
    pub fn image_data(&mut self) -> Result<ImageData, JsValue> {
        let target = self.engine.target();
        self.buffer.clear();
        for px in target.data().chunks_exact(4) {
            self.buffer.extend_from_slice(&unpremultiply(px));
        }
        ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&self.buffer),
            target.width(),
            target.height(),
        )
    }
}
