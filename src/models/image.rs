// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-image display context.
//!
//! An [`ImageContext`] pairs the intrinsic pixel size of the active image
//! with the size it is currently rendered at. It is rebuilt whenever the
//! active image changes and owns no annotations.

use crate::util::geometry::{self, FrameSize};
use serde::{Deserialize, Serialize};

/// Intrinsic pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.25;

/// Natural and rendered dimensions of the active image.
///
/// The frame is the fitted (or natural) size multiplied by the user zoom,
/// so a single uniform scale still maps natural to frame space.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContext {
    natural: Dimensions,
    frame: Option<FrameSize>,
    zoom: f64,
}

impl ImageContext {
    pub fn new(natural: Dimensions) -> Self {
        Self {
            natural,
            frame: None,
            zoom: 1.0,
        }
    }

    pub fn natural(&self) -> Dimensions {
        self.natural
    }

    /// Rendered size, or `None` until a usable container has been observed.
    pub fn frame(&self) -> Option<FrameSize> {
        self.frame
    }

    /// Refit the frame into the available container space.
    pub fn fit_to(&mut self, container: FrameSize) {
        self.frame = geometry::fit_frame(self.natural, container).map(|f| self.zoomed(f));
        if self.frame.is_none() {
            log::debug!(
                "Transform not ready: image {}x{}, container {:.1}x{:.1}",
                self.natural.width,
                self.natural.height,
                container.width,
                container.height
            );
        }
    }

    /// Render at natural size, times the zoom.
    pub fn show_unscaled(&mut self) {
        self.frame = if self.natural.is_empty() {
            None
        } else {
            Some(self.zoomed(FrameSize::new(
                f64::from(self.natural.width),
                f64::from(self.natural.height),
            )))
        };
    }

    fn zoomed(&self, frame: FrameSize) -> FrameSize {
        FrameSize::new(frame.width * self.zoom, frame.height * self.zoom)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Step the zoom up, up to [`MAX_ZOOM`]. Takes effect on the next fit.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    /// Step the zoom down, down to [`MIN_ZOOM`]. Takes effect on the next fit.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// Uniform natural-to-frame scale factor.
    pub fn scale(&self) -> Option<f64> {
        let frame = self.frame?;
        Some(frame.width / f64::from(self.natural.width))
    }

    pub fn is_ready(&self) -> bool {
        self.scale().is_some()
    }
}
