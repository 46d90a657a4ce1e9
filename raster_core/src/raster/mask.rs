// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: 8-bit coverage mask

use super::Plotter;
use crate::types::{mul_div_255, Rect};

/// Plotter recording coverage into an 8-bit buffer. Overlapping partial
/// writes combine like alpha "over"; writes outside the mask are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
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

    /// Row-major coverage values.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Coverage at `(x, y)`, zero outside the mask.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.data[i])
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&a| a != 0).count()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn row_range(&self, x0: i32, x1: i32, y: i32) -> Option<std::ops::Range<usize>> {
        if y < 0 || y >= self.height as i32 {
            return None;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32);
        if x0 >= x1 {
            return None;
        }
        let row = y as usize * self.width as usize;
        Some(row + x0 as usize..row + x1 as usize)
    }
}

fn over(dst: u8, alpha: u8) -> u8 {
    alpha.saturating_add(mul_div_255(dst as u32, 255 - alpha as u32))
}

impl Plotter for AlphaMask {
    fn set_pixel(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = 255;
        }
    }

    fn mix_pixel(&mut self, x: i32, y: i32, alpha: u8) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = over(self.data[i], alpha);
        }
    }

    fn set_scan_line(&mut self, x0: i32, x1: i32, y: i32) {
        if let Some(range) = self.row_range(x0, x1, y) {
            self.data[range].fill(255);
        }
    }

    fn mix_scan_line(&mut self, x0: i32, x1: i32, y: i32, alpha: u8) {
        if let Some(range) = self.row_range(x0, x1, y) {
            for a in &mut self.data[range] {
                *a = over(*a, alpha);
            }
        }
    }
}
