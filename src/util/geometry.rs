// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the transform between natural-image pixel
//! coordinates and the coordinates of the rendered (letterboxed) frame.
//! Scaling is always uniform, so one factor describes both axes.

use crate::models::annotation::BoxGeom;
use crate::models::image::Dimensions;

/// Size of the rendered frame or of the container it is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl FrameSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A pointer position in frame space, relative to the frame's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePoint {
    pub x: f64,
    pub y: f64,
}

impl FramePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in natural-image space. Fractional until committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalPoint {
    pub x: f64,
    pub y: f64,
}

impl NaturalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A box projected into frame space, in whole frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl FrameRect {
    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    pub fn contains(&self, point: FramePoint) -> bool {
        point.x >= self.x as f64
            && point.x <= self.right() as f64
            && point.y >= self.y as f64
            && point.y <= self.bottom() as f64
    }
}

/// Round half up (`2.5 -> 3`, `-2.5 -> -2`).
///
/// Compares the fractional part directly, since `value + 0.5` can itself
/// round up (`0.49999999999999994 + 0.5 == 1.0`).
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        (floor as i64).saturating_add(1)
    } else {
        floor as i64
    }
}

/// Fit an image into a container, preserving aspect ratio.
///
/// Returns `None` when either size is zero, negative or non-finite.
pub fn fit_frame(natural: Dimensions, container: FrameSize) -> Option<FrameSize> {
    if natural.is_empty() || !container.is_usable() {
        return None;
    }

    let image_aspect = f64::from(natural.width) / f64::from(natural.height);
    let container_aspect = container.width / container.height;

    let frame = if container_aspect > image_aspect {
        // Height is limiting
        FrameSize::new(container.height * image_aspect, container.height)
    } else {
        FrameSize::new(container.width, container.width / image_aspect)
    };
    Some(frame)
}

/// Project a natural-space box into frame space.
pub fn to_frame(geometry: &BoxGeom, scale: f64) -> FrameRect {
    FrameRect {
        x: round_half_up(geometry.x as f64 * scale).max(0),
        y: round_half_up(geometry.y as f64 * scale).max(0),
        width: round_half_up(geometry.width as f64 * scale),
        height: round_half_up(geometry.height as f64 * scale),
    }
}

/// Map a frame-space pointer position back into natural space.
pub fn to_natural(point: FramePoint, scale: f64) -> NaturalPoint {
    NaturalPoint {
        x: point.x / scale,
        y: point.y / scale,
    }
}

/// Convert a positive-extent frame rectangle into a committed natural box.
pub fn frame_box_to_natural(origin: FramePoint, width: f64, height: f64, scale: f64) -> BoxGeom {
    let top_left = to_natural(origin, scale);
    BoxGeom {
        x: round_half_up(top_left.x).max(0),
        y: round_half_up(top_left.y).max(0),
        width: round_half_up(width / scale),
        height: round_half_up(height / scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_round_half_up_just_below_half() {
        let below_half = 0.49999999999999994_f64;
        assert!(below_half < 0.5);
        assert_eq!(round_half_up(below_half), 0);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-0.5 - f64::EPSILON), -1);
        assert_eq!(round_half_up(f64::MAX), i64::MAX);
        assert_eq!(round_half_up(4503599627370495.5), 4503599627370496);
    }

    #[test]
    fn test_fit_wide_container_is_height_limited() {
        let frame = fit_frame(Dimensions::new(800, 600), FrameSize::new(1000.0, 300.0)).unwrap();
        assert_eq!(frame.height, 300.0);
        assert!((frame.width - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_tall_container_is_width_limited() {
        let frame = fit_frame(Dimensions::new(800, 600), FrameSize::new(400.0, 1000.0)).unwrap();
        assert_eq!(frame.width, 400.0);
        assert!((frame.height - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_consistency_and_containment() {
        let images = [(1, 1), (800, 600), (600, 800), (1920, 1080), (3, 2000), (4032, 3024)];
        let containers = [(1.0, 1.0), (640.0, 480.0), (1280.5, 300.0), (200.0, 900.0), (37.0, 41.0)];

        for &(nw, nh) in &images {
            for &(cw, ch) in &containers {
                let natural = Dimensions::new(nw, nh);
                let frame = fit_frame(natural, FrameSize::new(cw, ch)).unwrap();
                let sx = frame.width / f64::from(nw);
                let sy = frame.height / f64::from(nh);
                assert!((sx - sy).abs() < 1e-9, "{}x{} in {}x{}: {} vs {}", nw, nh, cw, ch, sx, sy);
                assert!(frame.width <= cw + 1e-9);
                assert!(frame.height <= ch + 1e-9);
            }
        }
    }

    #[test]
    fn test_fit_rejects_empty_inputs() {
        assert!(fit_frame(Dimensions::new(0, 600), FrameSize::new(100.0, 100.0)).is_none());
        assert!(fit_frame(Dimensions::new(800, 0), FrameSize::new(100.0, 100.0)).is_none());
        assert!(fit_frame(Dimensions::new(800, 600), FrameSize::new(0.0, 100.0)).is_none());
        assert!(fit_frame(Dimensions::new(800, 600), FrameSize::new(100.0, 0.0)).is_none());
        assert!(fit_frame(Dimensions::new(800, 600), FrameSize::new(f64::NAN, 100.0)).is_none());
    }

    #[test]
    fn test_to_frame_rounds_and_clamps_origin() {
        let rect = to_frame(&BoxGeom::new(3, -4, 5, 7), 0.5);
        assert_eq!(rect, FrameRect { x: 2, y: 0, width: 3, height: 4 });
    }

    #[test]
    fn test_forward_inverse_within_one_frame_pixel() {
        let scales = [0.1, 0.25, 0.333, 0.5, 0.77, 1.0, 1.5, 2.0, 3.7];
        let boxes = [
            BoxGeom::new(0, 0, 1, 1),
            BoxGeom::new(3, 7, 11, 13),
            BoxGeom::new(100, 150, 100, 100),
            BoxGeom::new(1234, 987, 640, 33),
        ];

        for &scale in &scales {
            for geometry in &boxes {
                let rect = to_frame(geometry, scale);
                let origin = to_natural(FramePoint::new(rect.x as f64, rect.y as f64), scale);
                let corner = to_natural(
                    FramePoint::new(rect.right() as f64, rect.bottom() as f64),
                    scale,
                );

                assert!((origin.x - geometry.x as f64).abs() * scale <= 1.0 + 1e-9);
                assert!((origin.y - geometry.y as f64).abs() * scale <= 1.0 + 1e-9);
                assert!((corner.x - geometry.x2() as f64).abs() * scale <= 1.0 + 1e-9);
                assert!((corner.y - geometry.y2() as f64).abs() * scale <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_frame_box_to_natural() {
        let geometry = frame_box_to_natural(FramePoint::new(10.0, 10.0), 100.0, 50.0, 0.5);
        assert_eq!(geometry, BoxGeom::new(20, 20, 200, 100));
    }
}
