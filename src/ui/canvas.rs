// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and annotation.
//!
//! This module paints the active photograph with its damage overlay and
//! translates egui pointer input into frame-space session events. It never
//! mutates records; the caller applies the returned actions.

use crate::models::annotation::{AnnotationRecord, RecordId};
use crate::models::image::ImageContext;
use crate::session::drawing::{DrawingSession, Handle, Hit, PointerEvent};
use crate::ui::overlay::{self, Overlay, OverlayShape};
use crate::util::geometry::{FramePoint, FrameSize};

/// Result of canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    Pointer(PointerEvent),
    Delete(RecordId),
    /// Pointer left the frame during an interaction
    Cancel,
}

/// Everything the canvas produced this frame.
#[derive(Default)]
pub struct CanvasOutput {
    pub actions: Vec<CanvasAction>,
    /// The overlay that was painted, when an image is shown
    pub overlay: Option<Overlay>,
}

/// Display the main canvas area and collect pointer interactions.
#[allow(clippy::too_many_arguments)]
pub fn show(
    ui: &mut egui::Ui,
    image: Option<&mut ImageContext>,
    image_texture: &Option<egui::TextureHandle>,
    records: &[AnnotationRecord],
    session: &DrawingSession,
    handle_radius: f32,
    has_reference: bool,
) -> CanvasOutput {
    let mut output = CanvasOutput::default();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(image)) = (image_texture, image) else {
            if has_reference {
                placeholder(ui, "No image selected");
            } else {
                welcome(ui);
            }
            return;
        };

        let area = ui.available_rect_before_wrap();
        if session.capabilities().scaled {
            image.fit_to(FrameSize::new(area.width() as f64, area.height() as f64));
        } else {
            image.show_unscaled();
        }

        let overlay = overlay::render(records, image, session);
        let Overlay::Ready { frame, draft, .. } = &overlay else {
            placeholder(ui, "Loading image...");
            return;
        };

        let size = egui::vec2(frame.width as f32, frame.height as f32);
        let radius = f64::from(handle_radius);

        // Zoomed frames larger than the container scroll; wheel only, since
        // pointer drags belong to the session
        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .drag_to_scroll(false)
            .show(ui, |ui| {
                let (canvas_rect, _) =
                    ui.allocate_exact_size(size.max(ui.available_size()), egui::Sense::hover());
                let image_rect = egui::Rect::from_center_size(canvas_rect.center(), size);
                let visible = image_rect.intersect(ui.clip_rect());
                let painter = ui.painter().clone();

                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let response = ui.interact(
                    image_rect,
                    ui.id().with("image_canvas"),
                    egui::Sense::click_and_drag(),
                );
                let to_frame = |pos: egui::Pos2| {
                    FramePoint::new(
                        (pos.x - image_rect.min.x) as f64,
                        (pos.y - image_rect.min.y) as f64,
                    )
                };
                let latest = ui.input(|i| i.pointer.latest_pos());

                if response.drag_started() {
                    if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                        let at = to_frame(origin);
                        let hit = overlay::hit_test(overlay.shapes(), at, radius);
                        output.actions.push(CanvasAction::Pointer(PointerEvent::down(at, hit)));
                    }
                }
                if response.dragged() {
                    match latest {
                        Some(pos) if !visible.contains(pos) => {
                            output.actions.push(CanvasAction::Cancel)
                        }
                        Some(pos) => output
                            .actions
                            .push(CanvasAction::Pointer(PointerEvent::moved(to_frame(pos)))),
                        None => {}
                    }
                }
                if response.drag_stopped() {
                    if let Some(pos) = latest {
                        output
                            .actions
                            .push(CanvasAction::Pointer(PointerEvent::up(to_frame(pos))));
                    }
                }

                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let at = to_frame(pos);
                        let hit = overlay::hit_test(overlay.shapes(), at, radius);
                        output.actions.push(CanvasAction::Pointer(PointerEvent::down(at, hit)));
                        output.actions.push(CanvasAction::Pointer(PointerEvent::up(at)));
                    }
                }
                if response.double_clicked() && session.capabilities().interactive {
                    if let Some(pos) = response.interact_pointer_pos() {
                        if let Some(Hit::Body(id)) =
                            overlay::hit_test(overlay.shapes(), to_frame(pos), radius)
                        {
                            output.actions.push(CanvasAction::Delete(id));
                        }
                    }
                }

                if response.hovered() && session.capabilities().interactive {
                    let hit = latest
                        .and_then(|pos| overlay::hit_test(overlay.shapes(), to_frame(pos), radius));
                    ui.ctx().set_cursor_icon(cursor_for(hit, session));
                }

                for shape in overlay.shapes() {
                    draw_shape(&painter, shape, image_rect.min);
                }

                if let Some(draft) = draft {
                    let rect = egui::Rect::from_min_size(
                        image_rect.min + egui::vec2(draft.x as f32, draft.y as f32),
                        egui::vec2(draft.width as f32, draft.height as f32),
                    );
                    painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE));
                }
            });

        output.overlay = Some(overlay);
    });

    output
}

fn cursor_for(hit: Option<Hit>, session: &DrawingSession) -> egui::CursorIcon {
    match hit {
        Some(Hit::Handle(_, handle)) => match handle {
            Handle::NW | Handle::SE => egui::CursorIcon::ResizeNwSe,
            Handle::NE | Handle::SW => egui::CursorIcon::ResizeNeSw,
            Handle::N | Handle::S => egui::CursorIcon::ResizeVertical,
            Handle::E | Handle::W => egui::CursorIcon::ResizeHorizontal,
        },
        Some(Hit::Body(_)) => egui::CursorIcon::Grab,
        None if session.capabilities().drawable => egui::CursorIcon::Crosshair,
        None => egui::CursorIcon::Default,
    }
}

/// Draw one damage box with its label and, when selected, its handles.
fn draw_shape(painter: &egui::Painter, shape: &OverlayShape, origin: egui::Pos2) {
    let [r, g, b] = shape.color.rgb();
    let color = egui::Color32::from_rgb(r, g, b);

    let rect = egui::Rect::from_min_size(
        origin + egui::vec2(shape.rect.x as f32, shape.rect.y as f32),
        egui::vec2(shape.rect.width as f32, shape.rect.height as f32),
    );
    let stroke_width = if shape.selected { 3.0 } else { 2.0 };
    painter.rect_stroke(rect, 0.0, egui::Stroke::new(stroke_width, color));

    // Label chip under the box: colored dot + name
    let galley = painter.layout_no_wrap(
        shape.label.clone(),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
    let chip = egui::Rect::from_min_size(
        rect.left_bottom() + egui::vec2(0.0, 4.0),
        galley.size() + egui::vec2(20.0, 4.0),
    );
    painter.rect_filled(chip, 4.0, egui::Color32::from_black_alpha(190));
    painter.circle_filled(chip.left_center() + egui::vec2(8.0, 0.0), 4.0, color);
    painter.galley(chip.min + egui::vec2(16.0, 2.0), galley, egui::Color32::WHITE);

    for (_, at) in &shape.handles {
        let center = origin + egui::vec2(at.x as f32, at.y as f32);
        let handle = egui::Rect::from_center_size(center, egui::vec2(8.0, 8.0));
        painter.rect_filled(handle, 0.0, egui::Color32::WHITE);
        painter.rect_stroke(handle, 0.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }
}

fn placeholder(ui: &mut egui::Ui, message: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
    });
}

fn welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Damage Review")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Inspect and correct vehicle damage annotations")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Pick a reference number to begin reviewing")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Store Folder...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
