// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: render configuration

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables of a [`PaintEngine`](crate::renderer::PaintEngine) session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Antialias fills, strokes and lines.
    pub antialias: bool,
    /// Curve flattening tolerance in device pixels.
    pub tolerance: f32,
    /// Try trapezoid decomposition for single-contour fills before the
    /// general polygon rasterizer.
    pub prefer_trapezoids: bool,
    /// Layer bitmaps kept for reuse after `compose_layer`.
    pub layer_pool_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            tolerance: 0.25,
            prefer_trapezoids: true,
            layer_pool_capacity: 4,
        }
    }
}

impl RenderConfig {
    /// Load a configuration from a reader containing JSON. Missing fields
    /// keep their defaults.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut s = String::new();
        reader.read_to_string(&mut s)?;
        let mut config: RenderConfig = serde_json::from_str(&s)?;
        config.sanitize();
        Ok(config)
    }

    /// Load a configuration directly from a byte slice containing JSON.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let cursor = std::io::Cursor::new(data);
        Self::from_reader(cursor)
    }

    fn sanitize(&mut self) {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            self.tolerance = Self::default().tolerance;
        }
        self.tolerance = self.tolerance.clamp(0.01, 10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;

    fn fixture() -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../tests/data/render.json")
    }

    #[test]
    fn parse_fixture() {
        let config = RenderConfig::from_reader(File::open(fixture()).unwrap()).unwrap();
        assert!(!config.antialias);
        assert!(!config.prefer_trapezoids);
        assert_eq!(config.layer_pool_capacity, 2);
        assert!((config.tolerance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn from_slice_matches_reader() {
        let mut bytes = Vec::new();
        File::open(fixture()).unwrap().read_to_end(&mut bytes).unwrap();
        let a = RenderConfig::from_reader(File::open(fixture()).unwrap()).unwrap();
        let b = RenderConfig::from_slice(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_fields_default() {
        let config = RenderConfig::from_slice(br#"{"antialias": false}"#).unwrap();
        assert!(!config.antialias);
        assert_eq!(config.layer_pool_capacity, 4);
    }

    #[test]
    fn bad_tolerance_is_replaced() {
        let config = RenderConfig::from_slice(br#"{"tolerance": -1.0}"#).unwrap();
        assert!((config.tolerance - 0.25).abs() < 1e-6);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = RenderConfig::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
