// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive box editing.
//!
//! [`DrawingSession`] turns frame-space pointer events into creations,
//! moves and resizes of [`AnnotationRecord`]s. It holds no records itself:
//! callers pass the record list and the image context on every event.
//!
//! Drag and resize previews live in the session until pointer-up, so an
//! aborted interaction never touches the committed list.

use crate::models::annotation::{find, find_mut, AnnotationRecord, BoxGeom, RecordId};
use crate::models::image::ImageContext;
use crate::util::geometry::{self, round_half_up, FramePoint, FrameRect, NaturalPoint};

/// Resize handle on a box outline, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    /// Where this handle sits on a frame-space rectangle.
    pub fn position(self, rect: &FrameRect) -> FramePoint {
        let left = rect.x as f64;
        let top = rect.y as f64;
        let right = rect.right() as f64;
        let bottom = rect.bottom() as f64;
        let mid_x = (left + right) / 2.0;
        let mid_y = (top + bottom) / 2.0;

        match self {
            Handle::NW => FramePoint::new(left, top),
            Handle::N => FramePoint::new(mid_x, top),
            Handle::NE => FramePoint::new(right, top),
            Handle::E => FramePoint::new(right, mid_y),
            Handle::SE => FramePoint::new(right, bottom),
            Handle::S => FramePoint::new(mid_x, bottom),
            Handle::SW => FramePoint::new(left, bottom),
            Handle::W => FramePoint::new(left, mid_y),
        }
    }

    /// Fixed edges while this handle is dragged, taken from the box.
    fn anchor(self, g: &BoxGeom) -> Anchor {
        let x = match self {
            Handle::NW | Handle::W | Handle::SW => Some(g.x2()),
            Handle::NE | Handle::E | Handle::SE => Some(g.x),
            Handle::N | Handle::S => None,
        };
        let y = match self {
            Handle::NW | Handle::N | Handle::NE => Some(g.y2()),
            Handle::SW | Handle::S | Handle::SE => Some(g.y),
            Handle::E | Handle::W => None,
        };
        Anchor { x, y }
    }
}

/// The edge coordinates held still during a resize. `None` leaves that axis alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: Option<i64>,
    pub y: Option<i64>,
}

/// What the pointer is over, as reported by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Body(RecordId),
    Handle(RecordId, Handle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer event in frame space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: FramePoint,
    pub hit: Option<Hit>,
}

impl PointerEvent {
    pub fn down(position: FramePoint, hit: Option<Hit>) -> Self {
        Self {
            kind: PointerKind::Down,
            position,
            hit,
        }
    }

    pub fn moved(position: FramePoint) -> Self {
        Self {
            kind: PointerKind::Move,
            position,
            hit: None,
        }
    }

    pub fn up(position: FramePoint) -> Self {
        Self {
            kind: PointerKind::Up,
            position,
            hit: None,
        }
    }
}

/// Which renderer and editing features are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Fit the image to the container instead of showing natural size
    pub scaled: bool,
    /// Allow selecting, moving and resizing boxes
    pub interactive: bool,
    /// Allow drawing new boxes on empty canvas
    pub drawable: bool,
}

impl Capabilities {
    pub const VIEW: Capabilities = Capabilities {
        scaled: true,
        interactive: false,
        drawable: false,
    };
    pub const EDIT: Capabilities = Capabilities {
        scaled: true,
        interactive: true,
        drawable: false,
    };
    pub const DRAW: Capabilities = Capabilities {
        scaled: true,
        interactive: true,
        drawable: true,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::EDIT
    }
}

/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    Drawing {
        origin: FramePoint,
        current: FramePoint,
    },
    Dragging {
        id: RecordId,
        /// Pointer minus box origin, natural space
        grab_offset: NaturalPoint,
        original: BoxGeom,
        preview: BoxGeom,
    },
    Resizing {
        id: RecordId,
        anchor: Anchor,
        original: BoxGeom,
        preview: BoxGeom,
    },
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    None,
    /// Transform not ready or interaction disabled
    Ignored,
    Selected(RecordId),
    Deselected,
    /// A new record was appended and awaits classification
    Created(RecordId),
    DraftDiscarded,
    Moved(RecordId),
    Resized(RecordId),
}

/// A draft rectangle in frame space with positive extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DraftBox {
    fn between(a: FramePoint, b: FramePoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }
}

pub struct DrawingSession {
    state: SessionState,
    selected: Option<RecordId>,
    next_draft: u64,
    min_extent: i64,
    capabilities: Capabilities,
}

impl DrawingSession {
    pub fn new(min_extent: i64) -> Self {
        Self {
            state: SessionState::Idle,
            selected: None,
            next_draft: 1,
            min_extent: min_extent.max(1),
            capabilities: Capabilities::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn selected(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Change the enabled features. Aborts any interaction they no longer allow.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
        if !capabilities.interactive {
            self.cancel();
            self.selected = None;
        } else if !capabilities.drawable && matches!(self.state, SessionState::Drawing { .. }) {
            self.cancel();
        }
    }

    pub fn select(&mut self, id: Option<RecordId>) {
        self.selected = id;
    }

    /// Drop all interaction state, e.g. when the active image changes.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.selected = None;
    }

    /// Abort the active draw, drag or resize without touching any record.
    pub fn cancel(&mut self) -> bool {
        if self.state == SessionState::Idle {
            return false;
        }
        log::debug!("Cancelled {:?}", self.state);
        self.state = SessionState::Idle;
        true
    }

    /// The in-progress draft, in frame space.
    pub fn draft(&self) -> Option<DraftBox> {
        match self.state {
            SessionState::Drawing { origin, current } => Some(DraftBox::between(origin, current)),
            _ => None,
        }
    }

    /// Uncommitted geometry of the record being dragged or resized.
    pub fn preview(&self) -> Option<(RecordId, BoxGeom)> {
        match self.state {
            SessionState::Dragging { id, preview, .. } | SessionState::Resizing { id, preview, .. } => {
                Some((id, preview))
            }
            _ => None,
        }
    }

    /// Remove a record by id.
    pub fn delete(
        &mut self,
        records: &mut Vec<AnnotationRecord>,
        id: RecordId,
    ) -> Option<AnnotationRecord> {
        let index = records.iter().position(|r| r.id == id)?;
        if self.preview().is_some_and(|(active, _)| active == id) {
            self.cancel();
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        let removed = records.remove(index);
        log::info!("Deleted annotation {}, total: {}", id, records.len());
        Some(removed)
    }

    /// Process one pointer event.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        records: &mut Vec<AnnotationRecord>,
        image: &ImageContext,
    ) -> SessionOutcome {
        let Some(scale) = image.scale() else {
            log::debug!("Ignoring {:?}: transform not ready", event.kind);
            return SessionOutcome::Ignored;
        };
        if !self.capabilities.interactive {
            return SessionOutcome::Ignored;
        }

        let natural = geometry::to_natural(event.position, scale);

        match (self.state, event.kind) {
            (SessionState::Idle, PointerKind::Down) => self.begin(event, natural, records),
            (SessionState::Idle, _) => SessionOutcome::None,

            (SessionState::Drawing { origin, .. }, PointerKind::Move) => {
                self.state = SessionState::Drawing {
                    origin,
                    current: event.position,
                };
                SessionOutcome::None
            }
            (SessionState::Drawing { origin, .. }, PointerKind::Up) => {
                self.state = SessionState::Idle;
                self.commit_draft(DraftBox::between(origin, event.position), scale, records)
            }

            (
                SessionState::Dragging {
                    id,
                    grab_offset,
                    original,
                    ..
                },
                kind @ (PointerKind::Move | PointerKind::Up),
            ) => {
                let preview = BoxGeom {
                    x: round_half_up(natural.x - grab_offset.x).max(0),
                    y: round_half_up(natural.y - grab_offset.y).max(0),
                    ..original
                };
                if kind == PointerKind::Move {
                    self.state = SessionState::Dragging {
                        id,
                        grab_offset,
                        original,
                        preview,
                    };
                    return SessionOutcome::None;
                }
                self.state = SessionState::Idle;
                self.commit_geometry(id, original, preview, records, SessionOutcome::Moved(id))
            }

            (
                SessionState::Resizing {
                    id,
                    anchor,
                    original,
                    ..
                },
                kind @ (PointerKind::Move | PointerKind::Up),
            ) => {
                let preview = resize(&original, anchor, natural, self.min_extent);
                if kind == PointerKind::Move {
                    self.state = SessionState::Resizing {
                        id,
                        anchor,
                        original,
                        preview,
                    };
                    return SessionOutcome::None;
                }
                self.state = SessionState::Idle;
                self.commit_geometry(id, original, preview, records, SessionOutcome::Resized(id))
            }

            // A second press while one is active: single cursor only
            (_, PointerKind::Down) => SessionOutcome::None,
        }
    }

    fn begin(
        &mut self,
        event: PointerEvent,
        natural: NaturalPoint,
        records: &[AnnotationRecord],
    ) -> SessionOutcome {
        let target = event
            .hit
            .and_then(|hit| {
                let id = match hit {
                    Hit::Body(id) | Hit::Handle(id, _) => id,
                };
                find(records, id).map(|record| (hit, record.geometry))
            });

        match target {
            Some((Hit::Handle(id, handle), geometry)) => {
                self.selected = Some(id);
                self.state = SessionState::Resizing {
                    id,
                    anchor: handle.anchor(&geometry),
                    original: geometry,
                    preview: geometry,
                };
                SessionOutcome::Selected(id)
            }
            Some((Hit::Body(id), geometry)) => {
                self.selected = Some(id);
                self.state = SessionState::Dragging {
                    id,
                    grab_offset: NaturalPoint::new(
                        natural.x - geometry.x as f64,
                        natural.y - geometry.y as f64,
                    ),
                    original: geometry,
                    preview: geometry,
                };
                SessionOutcome::Selected(id)
            }
            None => {
                let had_selection = self.selected.take().is_some();
                if self.capabilities.drawable {
                    self.state = SessionState::Drawing {
                        origin: event.position,
                        current: event.position,
                    };
                }
                if had_selection {
                    SessionOutcome::Deselected
                } else {
                    SessionOutcome::None
                }
            }
        }
    }

    fn commit_draft(
        &mut self,
        draft: DraftBox,
        scale: f64,
        records: &mut Vec<AnnotationRecord>,
    ) -> SessionOutcome {
        if draft.width == 0.0 && draft.height == 0.0 {
            log::debug!("Discarded click without drag");
            return SessionOutcome::DraftDiscarded;
        }

        let geometry = geometry::frame_box_to_natural(
            FramePoint::new(draft.x, draft.y),
            draft.width,
            draft.height,
            scale,
        );
        if geometry.is_degenerate() {
            log::debug!("Discarded degenerate draft {:?}", geometry);
            return SessionOutcome::DraftDiscarded;
        }

        let id = RecordId::Draft(self.next_draft);
        self.next_draft += 1;
        records.push(AnnotationRecord::draft(id, geometry));
        self.selected = Some(id);
        log::info!("Created annotation {} at {:?}, total: {}", id, geometry, records.len());
        SessionOutcome::Created(id)
    }

    fn commit_geometry(
        &mut self,
        id: RecordId,
        original: BoxGeom,
        preview: BoxGeom,
        records: &mut [AnnotationRecord],
        outcome: SessionOutcome,
    ) -> SessionOutcome {
        if preview == original {
            return SessionOutcome::None;
        }
        match find_mut(records, id) {
            Some(record) => {
                record.geometry = preview;
                log::info!("{:?}: {:?} -> {:?}", outcome, original, preview);
                outcome
            }
            None => {
                log::warn!("Annotation {} vanished during edit, dropping change", id);
                SessionOutcome::None
            }
        }
    }
}

/// New geometry for a resize towards `pointer`, keeping the anchored edges.
fn resize(original: &BoxGeom, anchor: Anchor, pointer: NaturalPoint, min: i64) -> BoxGeom {
    let px = round_half_up(pointer.x).max(0);
    let py = round_half_up(pointer.y).max(0);

    let (x, width) = match anchor.x {
        Some(fixed) => span(fixed, px, min),
        None => (original.x, original.width),
    };
    let (y, height) = match anchor.y {
        Some(fixed) => span(fixed, py, min),
        None => (original.y, original.height),
    };
    BoxGeom { x, y, width, height }
}

/// Start and extent between a fixed edge and the pointer, at least `min` long.
fn span(fixed: i64, pointer: i64, min: i64) -> (i64, i64) {
    if pointer >= fixed {
        (fixed, (pointer - fixed).max(min))
    } else {
        let start = (fixed - (fixed - pointer).max(min)).max(0);
        (start, (fixed - start).max(min))
    }
}
