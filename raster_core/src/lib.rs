// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: raster_core library
//!
//! Software 2D painting: path flattening and stroking, a scanline polygon
//! and trapezoid rasterizer with antialiasing, Porter-Duff and W3C blend
//! compositing, and a paint engine with a layer stack.

pub mod config;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod renderer;
pub mod types;

pub use config::RenderConfig;
pub use error::{Error, Result};
