// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: error types
//!
//! Rasterizer entry points do not fail: invalid geometry falls back to a
//! slower path and degenerate input is a no-op. The errors here cover the
//! surrounding surface: configuration loading, raw bitmap construction and
//! layer stack misuse.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Configuration JSON could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading configuration failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw pixel data does not match the requested dimensions.
    #[error("bitmap {width}x{height} does not match {len} bytes of pixel data")]
    InvalidBitmap { width: u32, height: u32, len: usize },

    /// `compose_layer` was called with no layer on the stack.
    #[error("no active layer to compose")]
    NoActiveLayer,

    /// `begin_layer` bounds do not intersect the current clip.
    #[error("layer bounds are outside the current clip")]
    EmptyLayerBounds,
}
