// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for choosing how the canvas behaves:
//! view only, edit existing boxes, or draw new ones. It also carries the
//! zoom controls for the displayed photograph.

use crate::app::Tool;

/// Zoom request raised by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolbarAction {
    #[default]
    None,
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

/// Display the toolbar with tool selection buttons.
///
/// `zoom` is the current image zoom, or `None` when no image is shown.
pub fn show(
    ui: &mut egui::Ui,
    current_tool: &mut Tool,
    fit_to_window: &mut bool,
    zoom: Option<f64>,
    busy: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        // Switching tools mid-drag would strand the interaction
        ui.add_enabled_ui(!busy, |ui| {
            if ui.selectable_label(*current_tool == Tool::View, "👁 View").clicked() {
                *current_tool = Tool::View;
            }

            if ui.selectable_label(*current_tool == Tool::Edit, "⬆ Edit").clicked() {
                *current_tool = Tool::Edit;
            }

            if ui.selectable_label(*current_tool == Tool::Draw, "▭ Draw").clicked() {
                *current_tool = Tool::Draw;
            }

            ui.separator();

            ui.checkbox(fit_to_window, "Fit to window");

            ui.separator();

            ui.add_enabled_ui(zoom.is_some(), |ui| {
                if ui.button("🔍-").on_hover_text("Zoom out").clicked() {
                    action = ToolbarAction::ZoomOut;
                }

                let percent = zoom.map_or(100.0, |z| z * 100.0);
                ui.label(format!("{percent:.0}%"));

                if ui.button("🔍+").on_hover_text("Zoom in").clicked() {
                    action = ToolbarAction::ZoomIn;
                }

                if ui.button("⟲").on_hover_text("Reset zoom").clicked() {
                    action = ToolbarAction::ResetZoom;
                }
            });
        });

        ui.separator();

        let tool_text = match current_tool {
            Tool::View => "Inspect damage boxes without changing them",
            Tool::Edit => "Click a box to select it, drag to move, drag handles to resize",
            Tool::Draw => "Drag on empty image area to draw a new box",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
