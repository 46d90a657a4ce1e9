// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: type definitions shared by geometry, rasterizer and renderer

use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Matrix;
use crate::renderer::{Bitmap, BlendMode, CompositeMode};

/// 2D vector used throughout the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vec2 {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Vec2 {
    /// Construct a vector from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product.
    pub fn dot(self, o: Vec2) -> f32 {
        self.x * o.x + self.y * o.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, o: Vec2) -> f32 {
        self.x * o.y - self.y * o.x
    }

    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::default()
        }
    }

    /// Vector rotated by +90 degrees.
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Rotate by `angle` radians.
    pub fn rotated(self, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    pub fn lerp(self, o: Vec2, t: f32) -> Vec2 {
        Vec2::new(self.x + (o.x - self.x) * t, self.y + (o.y - self.y) * t)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Non-premultiplied RGBA8 color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Premultiplied RGBA8 bytes.
    pub fn premultiply(self) -> [u8; 4] {
        let a = self.a as u32;
        [
            mul_div_255(self.r as u32, a),
            mul_div_255(self.g as u32, a),
            mul_div_255(self.b as u32, a),
            self.a,
        ]
    }
}

/// `a * b / 255` with rounding, for 8-bit channel math.
pub(crate) fn mul_div_255(a: u32, b: u32) -> u8 {
    let t = a * b + 128;
    (((t >> 8) + t) >> 8) as u8
}

/// Integer box with exclusive right/bottom edges. Used for clip rectangles
/// and layer placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box anchored at the origin with the given size.
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Intersection; the result may be empty.
    pub fn intersect(&self, o: &Rect) -> Rect {
        Rect::new(
            self.left.max(o.left),
            self.top.max(o.top),
            self.right.min(o.right),
            self.bottom.min(o.bottom),
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn to_rectf(&self) -> RectF {
        RectF::new(
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        )
    }
}

/// Floating point box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// An inverted box that any point widens; the seed for bounding box folds.
    pub const EMPTY: RectF = RectF::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        !(self.right > self.left && self.bottom > self.top)
    }

    pub fn include(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.top = self.top.min(p.y);
        self.right = self.right.max(p.x);
        self.bottom = self.bottom.max(p.y);
    }

    /// Smallest integer box covering this one.
    pub fn round_out(&self) -> Rect {
        Rect::new(
            self.left.floor() as i32,
            self.top.floor() as i32,
            self.right.ceil() as i32,
            self.bottom.ceil() as i32,
        )
    }
}

/// Winding rule deciding which regions of a polygon set are inside.
///
/// `Zero` and `Even` are the complements of `NonZero` and `Odd`: they fill
/// everything within the clip box that the positive rule leaves empty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    #[default]
    NonZero,
    Odd,
    Zero,
    Even,
}

impl FillRule {
    /// Whether an integer winding number counts as inside.
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::Odd => winding & 1 != 0,
            FillRule::Zero => winding == 0,
            FillRule::Even => winding & 1 == 0,
        }
    }

    /// True for the rules that fill the outside of the described region.
    pub fn is_complementary(self) -> bool {
        matches!(self, FillRule::Zero | FillRule::Even)
    }

    /// Pixel coverage for an accumulated (fractional) winding value.
    pub fn coverage(self, winding: f32) -> f32 {
        match self {
            FillRule::NonZero => winding.abs().min(1.0),
            FillRule::Odd => odd_coverage(winding),
            FillRule::Zero => 1.0 - winding.abs().min(1.0),
            FillRule::Even => 1.0 - odd_coverage(winding),
        }
    }
}

// Distance from the nearest even integer.
fn odd_coverage(winding: f32) -> f32 {
    let t = winding.abs() % 2.0;
    if t > 1.0 {
        2.0 - t
    } else {
        t
    }
}

/// Shape drawn at the open ends of a stroked contour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Shape drawn where two stroked segments meet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    #[default]
    Miter,
    Bevel,
    Round,
}

/// Stroke style.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pen {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Maximum miter length as a multiple of half the stroke width.
    pub miter_limit: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
        }
    }
}

impl Pen {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit;
        self
    }
}

/// Gradient color stop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, 0..1
    pub offset: f32,
    pub color: Color,
}

/// Linear gradient brush parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<GradientStop>,
}

/// Radial gradient brush parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

/// Bitmap pattern brush.
#[derive(Debug, Clone)]
pub struct ImagePattern {
    pub image: Arc<Bitmap>,
    /// Maps pattern pixels into user space.
    pub transform: Matrix,
    /// Tile the image; otherwise edge pixels are extended.
    pub repeat: bool,
}

/// What a fill or stroke is painted with.
#[derive(Debug, Clone)]
pub enum Brush {
    Solid(Color),
    Linear(LinearGradient),
    Radial(RadialGradient),
    Pattern(ImagePattern),
}

impl From<Color> for Brush {
    fn from(c: Color) -> Self {
        Brush::Solid(c)
    }
}

/// How a layer is merged into its parent by `compose_layer`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayerOp {
    pub opacity: f32,
    pub blend: BlendMode,
    pub composite: CompositeMode,
}

impl Default for LayerOp {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            blend: BlendMode::Normal,
            composite: CompositeMode::SourceOver,
        }
    }
}

impl LayerOp {
    pub fn with_opacity(opacity: f32) -> Self {
        Self {
            opacity,
            ..Self::default()
        }
    }
}

/// One flattened sub-path: a polyline, implicitly closed when `closed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: SmallVec<[Vec2; 32]>,
    pub closed: bool,
}

impl Contour {
    pub fn new(points: &[Vec2], closed: bool) -> Self {
        Self {
            points: SmallVec::from_slice(points),
            closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rule_integer_winding() {
        assert!(FillRule::NonZero.is_inside(-2));
        assert!(!FillRule::Odd.is_inside(2));
        assert!(FillRule::Zero.is_inside(0));
        assert!(FillRule::Even.is_inside(-2));
        assert!(!FillRule::Even.is_inside(1));
    }

    #[test]
    fn odd_coverage_folds_around_even_integers() {
        assert!((FillRule::Odd.coverage(0.25) - 0.25).abs() < 1e-6);
        assert!((FillRule::Odd.coverage(1.75) - 0.25).abs() < 1e-6);
        assert!((FillRule::Odd.coverage(-2.0)).abs() < 1e-6);
        assert!((FillRule::Even.coverage(2.0) - 1.0).abs() < 1e-6);
        assert!((FillRule::NonZero.coverage(-3.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn premultiply_half_alpha() {
        assert_eq!(Color::rgba(255, 0, 128, 128).premultiply(), [128, 0, 64, 128]);
        assert_eq!(Color::WHITE.premultiply(), [255, 255, 255, 255]);
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 20, 5);
        assert_eq!(a.intersect(&b), Rect::new(5, 0, 10, 5));
        assert!(a.intersect(&Rect::new(20, 20, 30, 30)).is_empty());
    }
}
