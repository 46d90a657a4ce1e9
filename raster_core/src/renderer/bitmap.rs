// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: premultiplied RGBA8 pixel buffer

use image::RgbaImage;

use crate::error::{Error, Result};
use crate::types::{mul_div_255, Color, Rect};

/// Row-major premultiplied RGBA8 bitmap. Draw target of the paint engine
/// and source of image brushes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap premultiplied RGBA8 bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(Error::InvalidBitmap {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Convert a straight-alpha image.
    pub fn from_image(img: &RgbaImage) -> Self {
        let mut data = Vec::with_capacity(img.as_raw().len());
        for p in img.pixels() {
            let [r, g, b, a] = p.0;
            data.extend_from_slice(&Color::rgba(r, g, b, a).premultiply());
        }
        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    /// Straight-alpha copy, e.g. for writing a PNG.
    pub fn to_image(&self) -> RgbaImage {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&unpremultiply(px));
        }
        // dimensions match the buffer by construction
        RgbaImage::from_raw(self.width, self.height, out).unwrap_or_default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Premultiplied pixel at `(x, y)`, transparent outside the bitmap.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return [0; 4];
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Bytes of row `y` from column `x0` to `x1` (exclusive), clamped to the
    /// bitmap. Empty when the row is outside.
    pub fn row_mut(&mut self, y: i32, x0: i32, x1: i32) -> &mut [u8] {
        if y < 0 || y >= self.height as i32 {
            return &mut [];
        }
        let x0 = x0.clamp(0, self.width as i32) as usize;
        let x1 = x1.clamp(0, self.width as i32) as usize;
        if x0 >= x1 {
            return &mut [];
        }
        let row = y as usize * self.width as usize;
        &mut self.data[(row + x0) * 4..(row + x1) * 4]
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Color) {
        let px = color.premultiply();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Resize to `width` x `height` and clear, keeping the allocation.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize * 4, 0);
    }
}

pub(crate) fn unpremultiply(px: &[u8]) -> [u8; 4] {
    let a = px[3] as u32;
    if a == 0 {
        return [0; 4];
    }
    let un = |c: u8| ((c as u32 * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Scale a premultiplied pixel by `alpha`.
pub(crate) fn scale_pixel(px: [u8; 4], alpha: u8) -> [u8; 4] {
    px.map(|c| mul_div_255(c as u32, alpha as u32))
}
