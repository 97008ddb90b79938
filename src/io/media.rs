// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Inspection image loading.
//!
//! This module decodes photographs into RGBA pixels for display. The
//! annotation code only ever sees the resulting natural dimensions.

use crate::models::image::Dimensions;
use anyhow::{Context, Result};
use std::path::Path;

/// A decoded image ready to upload as a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// Unmultiplied RGBA8, row-major
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Decode an image file from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
