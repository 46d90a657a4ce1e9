// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: software paint backend
//!
//! Compositing tables, the RGBA8 bitmap surface, brush plotters, glyph
//! runs and the [`PaintEngine`] that drives the rasterizer.

pub mod bitmap;
pub mod cache;
pub mod composite;
pub mod cpu;
pub mod plotter;
pub mod text;

pub use bitmap::Bitmap;
pub use cache::ImageCache;
pub use composite::{
    composite_pixel, get_blend_factors, BlendFactor, BlendMode, CompositeMode, CompositeOperation,
};
pub use cpu::{DrawSurface, Insets, PaintEngine};
pub use plotter::{BrushPlotter, GradientLut, Shader};
pub use text::{layout_text, GlyphBitmap, GlyphFormat, GlyphRun, PositionedGlyph};

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;
