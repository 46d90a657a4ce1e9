// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: geometry primitives
//!
//! Transforms, path construction and flattening, polygon analysis and
//! stroke expansion. Everything here works in floating point user or
//! device space; nothing touches pixels.

mod matrix;
mod path;
mod polygon;
mod stroke;

pub use matrix::Matrix;
pub use path::{Contours, Path, PathSeg};
pub(crate) use path::arc_steps;
pub use polygon::{
    compute_bounding_box, compute_convex_hull, is_convex, is_valid_trapezoid, split_into_trapezoids,
    HorizEdge,
};
pub use stroke::{expand_strokes, StrokeBuilder, StrokePolygons, Stroker};
