// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Reference and image navigation panel.

use crate::io::store::ImageEntry;

/// Result of navigator interaction.
pub enum NavigatorAction {
    None,
    SelectReference(String),
    SelectImage(usize),
    RefreshCatalog,
}

/// Display the reference picker and the image list of the active reference.
pub fn show(
    ui: &mut egui::Ui,
    references: &[String],
    reference: Option<&str>,
    images: &[ImageEntry],
    current_image: Option<usize>,
    locked: bool,
) -> NavigatorAction {
    let mut action = NavigatorAction::None;

    ui.heading("Inspection");
    ui.add_enabled_ui(!locked, |ui| {
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_source("reference_picker")
                .selected_text(reference.unwrap_or("Select reference"))
                .width(150.0)
                .show_ui(ui, |ui| {
                    for r in references {
                        if ui.selectable_label(reference == Some(r.as_str()), r.as_str()).clicked() {
                            action = NavigatorAction::SelectReference(r.clone());
                        }
                    }
                });
            if ui.small_button("⟳").on_hover_text("Reload references").clicked() {
                action = NavigatorAction::RefreshCatalog;
            }
        });

        if reference.is_none() {
            return;
        }
        ui.separator();

        if images.is_empty() {
            ui.label(egui::RichText::new("No images for this reference").weak());
            return;
        }

        ui.horizontal(|ui| {
            let index = current_image.unwrap_or(0);
            if ui
                .add_enabled(index > 0, egui::Button::new("◀"))
                .clicked()
            {
                action = NavigatorAction::SelectImage(index - 1);
            }
            ui.label(format!("Image {} of {}", current_image.map_or(0, |i| i + 1), images.len()));
            if ui
                .add_enabled(index + 1 < images.len(), egui::Button::new("▶"))
                .clicked()
            {
                action = NavigatorAction::SelectImage(index + 1);
            }
        });

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (i, entry) in images.iter().enumerate() {
                if ui
                    .selectable_label(current_image == Some(i), entry.file_name.as_str())
                    .clicked()
                {
                    action = NavigatorAction::SelectImage(i);
                }
            }
        });
    });

    action
}
