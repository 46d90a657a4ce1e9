// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: glyph coverage bitmaps and runs
//!
//! The engine treats glyphs as opaque coverage buffers positioned in user
//! space. [`layout_text`] produces them from a `fontdue` font.

use std::collections::HashMap;
use std::sync::Arc;

use fontdue::Font;

use crate::error::{Error, Result};
use crate::types::Vec2;

/// Layout of the coverage bytes of a [`GlyphBitmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphFormat {
    /// One coverage byte per pixel.
    Alpha,
    /// Three coverage bytes (R, G, B subpixels) per pixel.
    Subpixel,
}

/// Coverage bitmap of a single glyph's black box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    width: u32,
    height: u32,
    format: GlyphFormat,
    data: Vec<u8>,
}

impl GlyphBitmap {
    pub fn new(width: u32, height: u32, format: GlyphFormat, data: Vec<u8>) -> Result<Self> {
        let per_pixel = match format {
            GlyphFormat::Alpha => 1,
            GlyphFormat::Subpixel => 3,
        };
        if data.len() != width as usize * height as usize * per_pixel {
            return Err(Error::InvalidBitmap {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> GlyphFormat {
        self.format
    }

    /// Coverage at `(x, y)`. Subpixel triples are averaged.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let i = y as usize * self.width as usize + x as usize;
        match self.format {
            GlyphFormat::Alpha => self.data[i],
            GlyphFormat::Subpixel => {
                let s = &self.data[i * 3..i * 3 + 3];
                ((s[0] as u32 + s[1] as u32 + s[2] as u32 + 1) / 3) as u8
            }
        }
    }
}

/// A glyph placed with its black box top-left corner at `position`.
#[derive(Debug, Clone)]
pub struct PositionedGlyph {
    pub position: Vec2,
    pub bitmap: Arc<GlyphBitmap>,
}

/// Glyphs drawn together with one color.
#[derive(Debug, Clone, Default)]
pub struct GlyphRun {
    pub glyphs: Vec<PositionedGlyph>,
    /// Pen position after the last glyph.
    pub advance: Vec2,
}

impl GlyphRun {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Lay out `text` on a single baseline starting at `origin`. Repeated
/// characters share one rasterized bitmap.
pub fn layout_text(font: &Font, text: &str, size: f32, origin: Vec2, subpixel: bool) -> GlyphRun {
    let mut rasterized: HashMap<char, (fontdue::Metrics, Option<Arc<GlyphBitmap>>)> =
        HashMap::new();
    let mut run = GlyphRun::default();
    let mut cursor_x = origin.x;
    for ch in text.chars() {
        let (metrics, bitmap) = rasterized
            .entry(ch)
            .or_insert_with(|| {
                let (metrics, format, data) = if subpixel {
                    let (m, d) = font.rasterize_subpixel(ch, size);
                    (m, GlyphFormat::Subpixel, d)
                } else {
                    let (m, d) = font.rasterize(ch, size);
                    (m, GlyphFormat::Alpha, d)
                };
                let (w, h) = (metrics.width as u32, metrics.height as u32);
                let bitmap = GlyphBitmap::new(w, h, format, data)
                    .ok()
                    .filter(|b| b.width > 0 && b.height > 0)
                    .map(Arc::new);
                (metrics, bitmap)
            })
            .clone();
        if let Some(bitmap) = bitmap {
            let x0 = cursor_x + metrics.xmin as f32;
            let y0 = origin.y - metrics.height as f32 - metrics.ymin as f32;
            run.glyphs.push(PositionedGlyph {
                position: Vec2::new(x0, y0),
                bitmap,
            });
        }
        cursor_x += metrics.advance_width;
    }
    run.advance = Vec2::new(cursor_x, origin.y);
    run
}
