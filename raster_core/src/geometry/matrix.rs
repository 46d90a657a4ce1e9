// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: 2D affine transforms

use serde::{Deserialize, Serialize};

use crate::types::{RectF, Vec2};

/// Affine transform mapping `(x, y)` to
/// `(m11 * x + m21 * y + dx, m12 * x + m22 * y + dy)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Matrix {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m11: sx,
            m22: sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `angle` radians (clockwise on screen, y pointing down).
    pub fn rotate(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m11: c,
            m12: s,
            m21: -s,
            m22: c,
            dx: 0.0,
            dy: 0.0,
        }
    }

    /// Transform applying `self` first, then `then`.
    pub fn then(&self, then: &Matrix) -> Matrix {
        Matrix {
            m11: self.m11 * then.m11 + self.m12 * then.m21,
            m12: self.m11 * then.m12 + self.m12 * then.m22,
            m21: self.m21 * then.m11 + self.m22 * then.m21,
            m22: self.m21 * then.m12 + self.m22 * then.m22,
            dx: self.dx * then.m11 + self.dy * then.m21 + then.dx,
            dy: self.dx * then.m12 + self.dy * then.m22 + then.dy,
        }
    }

    pub fn determinant(&self) -> f32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Matrix {
            m11: self.m22 * inv,
            m12: -self.m12 * inv,
            m21: -self.m21 * inv,
            m22: self.m11 * inv,
            dx: (self.m21 * self.dy - self.m22 * self.dx) * inv,
            dy: (self.m12 * self.dx - self.m11 * self.dy) * inv,
        })
    }

    pub fn map_point(&self, p: Vec2) -> Vec2 {
        Vec2 {
            x: self.m11 * p.x + self.m21 * p.y + self.dx,
            y: self.m12 * p.x + self.m22 * p.y + self.dy,
        }
    }

    /// Map every point of `points` in place.
    pub fn map_points(&self, points: &mut [Vec2]) {
        if *self == Self::IDENTITY {
            return;
        }
        for p in points {
            *p = self.map_point(*p);
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when axis-aligned boxes stay axis-aligned boxes.
    pub fn is_axis_aligned(&self) -> bool {
        self.m12 == 0.0 && self.m21 == 0.0
    }

    /// Bounding box of a mapped rectangle.
    pub fn map_rect(&self, r: &RectF) -> RectF {
        let mut out = RectF::EMPTY;
        for p in [
            Vec2::new(r.left, r.top),
            Vec2::new(r.right, r.top),
            Vec2::new(r.right, r.bottom),
            Vec2::new(r.left, r.bottom),
        ] {
            out.include(self.map_point(p));
        }
        out
    }

    /// Geometric mean of the axis scales; converts device tolerances into
    /// user space.
    pub fn scale_factor(&self) -> f32 {
        self.determinant().abs().sqrt()
    }
}
