// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay projection for the annotation canvas.
//!
//! [`render`] maps the records of the active image into frame-space shapes
//! with a color and label per damage type. It is a pure function of its
//! inputs; painting is left to the canvas. The same output drives
//! [`hit_test`], so what is hit is exactly what is drawn.

use crate::models::annotation::{AnnotationRecord, DamageType, RecordId};
use crate::models::image::ImageContext;
use crate::session::drawing::{DraftBox, DrawingSession, Handle, Hit};
use crate::util::geometry::{self, FramePoint, FrameRect, FrameSize};

/// Display color of a damage box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl OverlayColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            OverlayColor::Green => [0x22, 0xc5, 0x5e],
            OverlayColor::Yellow => [0xea, 0xb3, 0x08],
            OverlayColor::Red => [0xef, 0x44, 0x44],
            OverlayColor::Gray => [0x9c, 0xa3, 0xaf],
        }
    }
}

/// Color and label for a damage type.
pub fn damage_style(damage_type: DamageType) -> (OverlayColor, String) {
    match damage_type {
        DamageType::Scratch => (OverlayColor::Green, "Scratch".to_string()),
        DamageType::Dent => (OverlayColor::Yellow, "Dent".to_string()),
        DamageType::Broken => (OverlayColor::Red, "Broken".to_string()),
        other => (OverlayColor::Gray, format!("Type {}", other.code())),
    }
}

/// One box ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayShape {
    pub id: RecordId,
    pub rect: FrameRect,
    pub color: OverlayColor,
    pub label: String,
    pub selected: bool,
    /// Extends past an edge of the image
    pub out_of_frame: bool,
    /// Resize handles, only for the selected box when editing is enabled
    pub handles: Vec<(Handle, FramePoint)>,
}

/// Renderer output for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// No usable transform yet; show a loading placeholder
    NotReady,
    Ready {
        frame: FrameSize,
        shapes: Vec<OverlayShape>,
        draft: Option<DraftBox>,
        /// Records not drawn because they have no positive area
        skipped: Vec<RecordId>,
    },
}

impl Overlay {
    pub fn shapes(&self) -> &[OverlayShape] {
        match self {
            Overlay::Ready { shapes, .. } => shapes,
            Overlay::NotReady => &[],
        }
    }

    /// Log data-quality flags. Call when the records or frame change, not per paint.
    pub fn log_flags(&self) {
        let Overlay::Ready { shapes, skipped, .. } = self else {
            return;
        };
        for id in skipped {
            log::warn!("Annotation {} has no positive area, not drawn", id);
        }
        for shape in shapes.iter().filter(|s| s.out_of_frame) {
            log::warn!("Annotation {} extends past the image: {:?}", shape.id, shape.rect);
        }
    }
}

/// Project records into frame space for the current session state.
pub fn render(
    records: &[AnnotationRecord],
    image: &ImageContext,
    session: &DrawingSession,
) -> Overlay {
    let (Some(scale), Some(frame)) = (image.scale(), image.frame()) else {
        return Overlay::NotReady;
    };
    let natural = image.natural();
    let capabilities = session.capabilities();
    let preview = session.preview();

    let mut shapes = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        let geometry = match preview {
            Some((id, geometry)) if id == record.id => geometry,
            _ => record.geometry,
        };
        if geometry.is_degenerate() {
            skipped.push(record.id);
            continue;
        }

        let rect = geometry::to_frame(&geometry, scale);
        let (color, label) = damage_style(record.damage_type);
        let selected = capabilities.interactive && session.selected() == Some(record.id);
        let handles = if selected {
            Handle::ALL.iter().map(|&h| (h, h.position(&rect))).collect()
        } else {
            Vec::new()
        };

        shapes.push(OverlayShape {
            id: record.id,
            rect,
            color,
            label,
            selected,
            // Natural space, before frame rounding and the origin clamp
            out_of_frame: !geometry.fits_within(natural.width, natural.height),
            handles,
        });
    }

    let draft = if capabilities.drawable {
        session.draft()
    } else {
        None
    };

    Overlay::Ready {
        frame,
        shapes,
        draft,
        skipped,
    }
}

/// Find what lies under a frame-space point.
///
/// Handles win over bodies; among overlapping bodies the last drawn wins.
pub fn hit_test(shapes: &[OverlayShape], point: FramePoint, handle_radius: f64) -> Option<Hit> {
    for shape in shapes.iter().rev() {
        for &(handle, at) in &shape.handles {
            if (at.x - point.x).abs() <= handle_radius && (at.y - point.y).abs() <= handle_radius {
                return Some(Hit::Handle(shape.id, handle));
            }
        }
    }

    shapes
        .iter()
        .rev()
        .find(|shape| shape.rect.contains(point))
        .map(|shape| Hit::Body(shape.id))
}
