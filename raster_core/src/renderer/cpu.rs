// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: software paint engine
//!
//! [`PaintEngine`] owns a destination [`Bitmap`], the transform and clip
//! state, the layer stack and every scratch buffer used while painting.
//! Fills try the trapezoid path for single contours and fall back to the
//! polygon rasterizer; strokes are expanded into polygons first.

use log::{debug, trace, warn};

use super::bitmap::Bitmap;
use super::composite::{composite_pixel, BlendMode, CompositeMode};
use super::plotter::{BrushPlotter, GradientLut, Shader};
use super::text::{GlyphBitmap, GlyphRun};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::geometry::{split_into_trapezoids, HorizEdge, Matrix, Path, StrokePolygons, Stroker};
use crate::raster::{
    coverage_to_alpha, rasterize_line, AlphaMask, RastParams, Rasterizer, RowWriter,
};
use crate::types::{Brush, Color, FillRule, LayerOp, Pen, Rect, RectF, Vec2};

/// Narrow drawing capability shared by paint backends.
pub trait DrawSurface {
    /// Fill an axis-aligned rectangle in user space.
    fn fill_rect(&mut self, rect: RectF, brush: &Brush);
    /// Blit a glyph coverage bitmap with its top-left corner at `position`.
    fn draw_glyph(&mut self, position: Vec2, glyph: &GlyphBitmap, color: Color);
    /// Draw the `src` part of `image` stretched over `dst`.
    fn draw_textured_rect(&mut self, dst: RectF, image: &Bitmap, src: Rect);
    /// One pixel wide line between pixel centers.
    fn draw_line(&mut self, p0: Vec2, p1: Vec2, color: Color);
}

/// Fixed borders of a nine-patch image, in image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, Copy)]
struct State {
    matrix: Matrix,
    clip: Rect,
    composite: CompositeMode,
    blend: BlendMode,
}

#[derive(Debug)]
struct Layer {
    bitmap: Bitmap,
    /// Device box covered by `bitmap`.
    bounds: Rect,
    op: LayerOp,
    parent_clip: Rect,
}

enum Source<'a> {
    Brush(&'a Brush),
    /// Image pixels mapped into user space by the matrix.
    Image(&'a Bitmap, Rect, Matrix),
}

enum Job<'a> {
    Polygons(FillRule),
    Trapezoids,
    Line(Vec2, Vec2),
    Glyph(Vec2, &'a GlyphBitmap),
}

/// Software paint session.
#[derive(Debug)]
pub struct PaintEngine {
    config: RenderConfig,
    target: Bitmap,
    state: State,
    saved: Vec<State>,
    layers: Vec<Layer>,
    pool: Vec<Bitmap>,
    rasterizer: Rasterizer,
    stroker: Stroker,
    stroke: StrokePolygons,
    points: Vec<Vec2>,
    lengths: Vec<usize>,
    trapezoids: Vec<HorizEdge>,
    lut: GradientLut,
}

impl PaintEngine {
    /// Engine drawing into a transparent `width` x `height` bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(Bitmap::new(width, height), RenderConfig::default())
    }

    pub fn with_config(target: Bitmap, config: RenderConfig) -> Self {
        let state = State {
            matrix: Matrix::IDENTITY,
            clip: target.bounds(),
            composite: CompositeMode::SourceOver,
            blend: BlendMode::Normal,
        };
        Self {
            config,
            target,
            state,
            saved: Vec::new(),
            layers: Vec::new(),
            pool: Vec::new(),
            rasterizer: Rasterizer::new(),
            stroker: Stroker::new(config.tolerance),
            stroke: StrokePolygons::new(),
            points: Vec::new(),
            lengths: Vec::new(),
            trapezoids: Vec::new(),
            lut: GradientLut::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn target(&self) -> &Bitmap {
        &self.target
    }

    pub fn into_target(self) -> Bitmap {
        self.target
    }

    /// Replace the user to device transform.
    pub fn set_transform(&mut self, matrix: Matrix) {
        self.state.matrix = matrix;
    }

    /// Apply `matrix` in user space before the current transform.
    pub fn transform(&mut self, matrix: &Matrix) {
        self.state.matrix = matrix.then(&self.state.matrix);
    }

    pub fn matrix(&self) -> Matrix {
        self.state.matrix
    }

    /// Device clip box.
    pub fn clip(&self) -> Rect {
        self.state.clip
    }

    /// Intersect the clip with `rect` mapped to device space. Edges are
    /// rounded to the nearest pixel boundary.
    pub fn clip_rect(&mut self, rect: RectF) {
        let r = self.state.matrix.map_rect(&rect);
        let device = Rect::new(
            r.left.round() as i32,
            r.top.round() as i32,
            r.right.round() as i32,
            r.bottom.round() as i32,
        );
        self.state.clip = self.state.clip.intersect(&device);
    }

    /// Push transform, clip and composite state.
    pub fn save(&mut self) {
        self.saved.push(self.state);
    }

    /// Pop the state pushed by the matching [`save`](Self::save). Without
    /// one this does nothing.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    /// Composite and blend mode used by subsequent draws.
    pub fn set_composite(&mut self, composite: CompositeMode, blend: BlendMode) {
        self.state.composite = composite;
        self.state.blend = blend;
    }

    /// Overwrite the clipped area of the current surface with `color`.
    pub fn clear(&mut self, color: Color) {
        let clip = self.state.clip;
        let px = color.premultiply();
        let (surface, (ox, oy)) = current_surface(&mut self.layers, &mut self.target);
        for y in clip.top..clip.bottom {
            let row = surface.row_mut(y - oy, clip.left - ox, clip.right - ox);
            for dst in row.chunks_exact_mut(4) {
                dst.copy_from_slice(&px);
            }
        }
    }

    /// Flattening tolerance in user space.
    fn tolerance(&self) -> f32 {
        let scale = self.state.matrix.scale_factor();
        if scale > 1e-6 && scale.is_finite() {
            self.config.tolerance / scale
        } else {
            self.config.tolerance
        }
    }

    /// Flatten `path` into the device space point buffer. Contours with
    /// fewer than three points are dropped.
    fn load_fill(&mut self, path: &Path) {
        let tolerance = self.tolerance();
        self.points.clear();
        self.lengths.clear();
        for contour in path.contours(tolerance) {
            if contour.points.len() < 3 {
                continue;
            }
            let start = self.points.len();
            self.points.extend_from_slice(&contour.points);
            self.state.matrix.map_points(&mut self.points[start..]);
            self.lengths.push(contour.points.len());
        }
    }

    pub fn fill_path(&mut self, path: &Path, brush: &Brush, rule: FillRule) {
        if self.state.clip.is_empty() {
            return;
        }
        self.load_fill(path);
        trace!(
            "fill_path: {} contours, {} points",
            self.lengths.len(),
            self.points.len()
        );
        self.fill_loaded(Source::Brush(brush), rule);
    }

    /// Fill the contours in `points`/`lengths`, preferring trapezoids for a
    /// single contour under a positive rule.
    fn fill_loaded(&mut self, source: Source<'_>, rule: FillRule) {
        if self.lengths.is_empty() && !rule.is_complementary() {
            return;
        }
        if self.config.prefer_trapezoids && self.lengths.len() == 1 && !rule.is_complementary() {
            self.trapezoids.clear();
            if split_into_trapezoids(&self.points, &mut self.trapezoids) {
                self.render(source, Job::Trapezoids);
                return;
            }
            debug!(
                "trapezoid decomposition rejected {} points, using polygon rasterizer",
                self.points.len()
            );
        }
        self.render(source, Job::Polygons(rule));
    }

    pub fn stroke_path(&mut self, path: &Path, pen: &Pen, brush: &Brush) {
        if self.state.clip.is_empty() {
            return;
        }
        let tolerance = self.tolerance();
        self.stroke.clear();
        self.stroker.tolerance = tolerance;
        self.stroker.expand(path.contours(tolerance), pen, &mut self.stroke);
        if self.stroke.is_empty() {
            return;
        }
        self.points.clear();
        self.points.extend_from_slice(&self.stroke.points);
        self.state.matrix.map_points(&mut self.points);
        self.lengths.clear();
        self.lengths.extend_from_slice(&self.stroke.lengths);
        trace!(
            "stroke_path: {} polygons, {} points",
            self.lengths.len(),
            self.points.len()
        );
        self.render(Source::Brush(brush), Job::Polygons(FillRule::NonZero));
    }

    /// Draw `image` at its natural size with its top-left corner at
    /// `position`.
    pub fn draw_image(&mut self, image: &Bitmap, position: Vec2) {
        let dst = RectF::new(
            position.x,
            position.y,
            position.x + image.width() as f32,
            position.y + image.height() as f32,
        );
        self.draw_textured_rect(dst, image, image.bounds());
    }

    /// Stretch `image` over `dst` keeping the `insets` borders unscaled.
    /// Borders wider than `dst` shrink proportionally.
    pub fn draw_nine_patch(&mut self, image: &Bitmap, insets: Insets, dst: RectF) {
        let (w, h) = (image.width() as i32, image.height() as i32);
        let l = (insets.left as i32).min(w);
        let r = (insets.right as i32).min(w - l);
        let t = (insets.top as i32).min(h);
        let b = (insets.bottom as i32).min(h - t);
        let src_x = [0, l, w - r, w];
        let src_y = [0, t, h - b, h];
        let dst_x = nine_patch_cuts(dst.left, dst.right, l as f32, r as f32);
        let dst_y = nine_patch_cuts(dst.top, dst.bottom, t as f32, b as f32);
        for row in 0..3 {
            for col in 0..3 {
                let src = Rect::new(src_x[col], src_y[row], src_x[col + 1], src_y[row + 1]);
                let cell = RectF::new(dst_x[col], dst_y[row], dst_x[col + 1], dst_y[row + 1]);
                if !src.is_empty() && !cell.is_empty() {
                    self.draw_textured_rect(cell, image, src);
                }
            }
        }
    }

    pub fn draw_glyph_run(&mut self, run: &GlyphRun, color: Color) {
        for glyph in &run.glyphs {
            self.draw_glyph(glyph.position, &glyph.bitmap, color);
        }
    }

    /// Rasterize the coverage of `path` into a mask the size of the
    /// destination, honoring the current transform and clip.
    pub fn coverage_mask(&mut self, path: &Path, rule: FillRule) -> AlphaMask {
        let mut mask = AlphaMask::new(self.target.width(), self.target.height());
        let clip = self.state.clip.intersect(&mask.bounds());
        if clip.is_empty() {
            return mask;
        }
        self.load_fill(path);
        let params = RastParams::new(clip)
            .with_antialias(self.config.antialias)
            .with_fill_rule(rule);
        self.rasterizer
            .rasterize_polygons(&self.points, &self.lengths, &params, &mut mask);
        mask
    }

    /// Number of open layers.
    pub fn layer_depth(&self) -> usize {
        self.layers.len()
    }

    /// Start drawing into an offscreen layer covering `bounds` (user
    /// space) within the current clip. Bounds outside the clip still push
    /// an empty layer so the matching [`compose_layer`](Self::compose_layer)
    /// stays paired.
    pub fn begin_layer(&mut self, bounds: RectF, op: LayerOp) {
        let _ = self.try_begin_layer(bounds, op);
    }

    /// Like [`begin_layer`](Self::begin_layer), reporting
    /// [`Error::EmptyLayerBounds`] when nothing of the layer is visible.
    pub fn try_begin_layer(&mut self, bounds: RectF, op: LayerOp) -> Result<()> {
        let device = self
            .state
            .matrix
            .map_rect(&bounds)
            .round_out()
            .intersect(&self.state.clip);
        let (device, bitmap) = if device.is_empty() {
            (Rect::default(), Bitmap::default())
        } else {
            let (w, h) = (device.width() as u32, device.height() as u32);
            let bitmap = match self.pool.pop() {
                Some(mut bitmap) => {
                    debug!("layer {w}x{h}: reusing pooled bitmap");
                    bitmap.reset(w, h);
                    bitmap
                }
                None => {
                    debug!("layer {w}x{h}: allocating bitmap");
                    Bitmap::new(w, h)
                }
            };
            (device, bitmap)
        };
        self.layers.push(Layer {
            bitmap,
            bounds: device,
            op,
            parent_clip: self.state.clip,
        });
        self.state.clip = device;
        if device.is_empty() {
            Err(Error::EmptyLayerBounds)
        } else {
            Ok(())
        }
    }

    /// Merge the top layer into its parent with the layer's opacity, blend
    /// and composite mode, then release its bitmap to the pool.
    pub fn compose_layer(&mut self) -> Result<()> {
        let Some(layer) = self.layers.pop() else {
            warn!("compose_layer called without an active layer");
            return Err(Error::NoActiveLayer);
        };
        self.state.clip = layer.parent_clip;
        let bounds = layer.bounds;
        let opacity = if layer.op.opacity.is_nan() {
            0.0
        } else {
            layer.op.opacity
        };
        let coverage = coverage_to_alpha(opacity);
        if !bounds.is_empty() && coverage > 0 {
            let (parent, (ox, oy)) = current_surface(&mut self.layers, &mut self.target);
            for y in bounds.top..bounds.bottom {
                let x0 = (bounds.left - ox).max(0);
                let row = parent.row_mut(y - oy, x0, bounds.right - ox);
                for (i, dst) in row.chunks_exact_mut(4).enumerate() {
                    let src = layer
                        .bitmap
                        .pixel(x0 + ox + i as i32 - bounds.left, y - bounds.top);
                    let d = [dst[0], dst[1], dst[2], dst[3]];
                    dst.copy_from_slice(&composite_pixel(
                        d,
                        src,
                        layer.op.composite,
                        layer.op.blend,
                        coverage,
                    ));
                }
            }
        }
        if self.pool.len() < self.config.layer_pool_capacity && layer.bitmap.width() > 0 {
            self.pool.push(layer.bitmap);
        }
        Ok(())
    }

    /// Run `f` inside a layer and compose it afterwards.
    pub fn with_layer<R>(
        &mut self,
        bounds: RectF,
        op: LayerOp,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Result<R> {
        self.begin_layer(bounds, op);
        let out = f(self);
        self.compose_layer()?;
        Ok(out)
    }

    fn render(&mut self, source: Source<'_>, job: Job<'_>) {
        let Self {
            config,
            target,
            state,
            layers,
            rasterizer,
            points,
            lengths,
            trapezoids,
            lut,
            ..
        } = self;
        let clip = state.clip;
        if clip.is_empty() {
            return;
        }
        let shader = match source {
            Source::Brush(brush) => Shader::new(brush, &state.matrix, lut),
            Source::Image(image, region, to_user) => {
                Shader::image(image, region, &to_user.then(&state.matrix), false)
            }
        };
        let Some(shader) = shader else {
            return;
        };
        let (surface, origin) = current_surface(layers, target);
        let mut plotter = BrushPlotter::new(surface, origin, &shader, state.composite, state.blend);
        let params = RastParams::new(clip).with_antialias(config.antialias);
        match job {
            Job::Polygons(rule) => rasterizer.rasterize_polygons(
                points.as_slice(),
                lengths.as_slice(),
                &params.with_fill_rule(rule),
                &mut plotter,
            ),
            Job::Trapezoids => {
                rasterizer.rasterize_trapezoid_chain(trapezoids.as_slice(), &params, &mut plotter)
            }
            Job::Line(a, b) => rasterize_line(a, b, &params, &mut plotter),
            Job::Glyph(position, glyph) => {
                let gx = position.x.round() as i32;
                let gy = position.y.round() as i32;
                let x0 = gx.max(clip.left);
                let x1 = (gx + glyph.width() as i32).min(clip.right);
                let y0 = gy.max(clip.top);
                let y1 = (gy + glyph.height() as i32).min(clip.bottom);
                for y in y0..y1 {
                    let mut row = RowWriter::new(y);
                    for x in x0..x1 {
                        let coverage = glyph.coverage((x - gx) as u32, (y - gy) as u32);
                        row.push(&mut plotter, x, coverage);
                    }
                    row.flush(&mut plotter);
                }
            }
        }
    }
}

fn current_surface<'a>(
    layers: &'a mut [Layer],
    target: &'a mut Bitmap,
) -> (&'a mut Bitmap, (i32, i32)) {
    match layers.last_mut() {
        Some(layer) => (&mut layer.bitmap, (layer.bounds.left, layer.bounds.top)),
        None => (target, (0, 0)),
    }
}

/// Destination cut positions of one nine-patch axis.
fn nine_patch_cuts(start: f32, end: f32, head: f32, tail: f32) -> [f32; 4] {
    let len = (end - start).max(0.0);
    let fixed = head + tail;
    let scale = if fixed > len && fixed > 0.0 { len / fixed } else { 1.0 };
    [start, start + head * scale, end - tail * scale, end]
}

impl DrawSurface for PaintEngine {
    fn fill_rect(&mut self, rect: RectF, brush: &Brush) {
        self.fill_path(&Path::rect(rect), brush, FillRule::NonZero);
    }

    fn draw_glyph(&mut self, position: Vec2, glyph: &GlyphBitmap, color: Color) {
        let device = self.state.matrix.map_point(position);
        self.render(Source::Brush(&Brush::Solid(color)), Job::Glyph(device, glyph));
    }

    fn draw_textured_rect(&mut self, dst: RectF, image: &Bitmap, src: Rect) {
        let src = src.intersect(&image.bounds());
        if src.is_empty() || dst.is_empty() || self.state.clip.is_empty() {
            return;
        }
        let to_user = Matrix::translate(-src.left as f32, -src.top as f32)
            .then(&Matrix::scale(
                dst.width() / src.width() as f32,
                dst.height() / src.height() as f32,
            ))
            .then(&Matrix::translate(dst.left, dst.top));
        self.points.clear();
        self.points.extend_from_slice(&[
            Vec2::new(dst.left, dst.top),
            Vec2::new(dst.right, dst.top),
            Vec2::new(dst.right, dst.bottom),
            Vec2::new(dst.left, dst.bottom),
        ]);
        self.state.matrix.map_points(&mut self.points);
        self.lengths.clear();
        self.lengths.push(4);
        self.fill_loaded(Source::Image(image, src, to_user), FillRule::NonZero);
    }

    fn draw_line(&mut self, p0: Vec2, p1: Vec2, color: Color) {
        let a = self.state.matrix.map_point(p0);
        let b = self.state.matrix.map_point(p1);
        self.render(Source::Brush(&Brush::Solid(color)), Job::Line(a, b));
    }
}
