// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
#![allow(dead_code)]

use raster_core::raster::{AlphaMask, Plotter};
use raster_core::renderer::Bitmap;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of a byte buffer.
pub fn hash_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn bitmap_hash(bitmap: &Bitmap) -> String {
    hash_hex(bitmap.data())
}

/// Write `bitmap` as PNG when `RASTER_DUMP_DIR` is set, for eyeballing
/// failures.
pub fn dump_png(bitmap: &Bitmap, name: &str) {
    if let Ok(dir) = std::env::var("RASTER_DUMP_DIR") {
        let path = std::path::Path::new(&dir).join(format!("{name}.png"));
        bitmap.to_image().save(path).unwrap();
    }
}

/// Coverage of a mask as floats in 0..=1.
pub fn coverage_sum(mask: &AlphaMask) -> f32 {
    mask.data().iter().map(|&a| a as f32 / 255.0).sum()
}

/// Plotter recording what kind of write each pixel received.
#[derive(Debug, Default)]
pub struct Recorder {
    pub set: Vec<(i32, i32)>,
    pub mixed: Vec<(i32, i32, u8)>,
}

impl Plotter for Recorder {
    fn set_pixel(&mut self, x: i32, y: i32) {
        self.set.push((x, y));
    }

    fn mix_pixel(&mut self, x: i32, y: i32, alpha: u8) {
        self.mixed.push((x, y, alpha));
    }

    fn set_scan_line(&mut self, x0: i32, x1: i32, y: i32) {
        self.set.extend((x0..x1).map(|x| (x, y)));
    }

    fn mix_scan_line(&mut self, x0: i32, x1: i32, y: i32, alpha: u8) {
        self.mixed.extend((x0..x1).map(|x| (x, y, alpha)));
    }
}
