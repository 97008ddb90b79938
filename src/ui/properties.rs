// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! This module lists the damage boxes of the active image and provides the
//! classification form (damage type and repair details) for the selected one.

use crate::models::annotation::{
    AnnotationRecord, DamageType, PartType, RecordId, RepairAction, RepairMeta,
};
use crate::models::image::Dimensions;
use crate::ui::overlay::damage_style;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectAnnotation(RecordId),
    DeleteAnnotation(RecordId),
    Classify {
        id: RecordId,
        damage_type: DamageType,
        repair: RepairMeta,
    },
}

/// Display the annotation list and the form for the selected annotation.
pub fn show(
    ui: &mut egui::Ui,
    records: &[AnnotationRecord],
    selected: Option<RecordId>,
    natural: Option<Dimensions>,
    editable: bool,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Annotations");
    ui.label(format!("{} boxes", records.len()));
    ui.separator();

    egui::ScrollArea::vertical()
        .max_height(ui.available_height() * 0.5)
        .show(ui, |ui| {
            for record in records {
                let (color, label) = damage_style(record.damage_type);
                let [r, g, b] = color.rgb();
                let is_selected = selected == Some(record.id);

                ui.horizontal(|ui| {
                    let (dot, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                    ui.painter()
                        .circle_filled(dot.center(), 4.0, egui::Color32::from_rgb(r, g, b));

                    let mut text = format!("{} ({})", label, record.id);
                    if record.is_new {
                        text.push_str(" *");
                    }
                    if ui.selectable_label(is_selected, text).clicked() {
                        action = PropertiesAction::SelectAnnotation(record.id);
                    }

                    if editable && ui.small_button("🗑").on_hover_text("Delete").clicked() {
                        action = PropertiesAction::DeleteAnnotation(record.id);
                    }
                });

                let g = &record.geometry;
                let mut geometry = format!("  {},{} {}×{}", g.x, g.y, g.width, g.height);
                if natural.is_some_and(|d| !g.fits_within(d.width, d.height)) {
                    geometry.push_str("  ⚠ outside image");
                }
                ui.label(egui::RichText::new(geometry).small().weak());
            }
        });

    ui.separator();

    let Some(record) = selected.and_then(|id| records.iter().find(|r| r.id == id)) else {
        ui.label(egui::RichText::new("Select a box to classify it").weak());
        return action;
    };

    ui.heading("Classification");
    ui.add_enabled_ui(editable, |ui| {
        let mut damage_type = record.damage_type;
        let mut repair = record.repair.clone();

        egui::Grid::new("classification_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Damage type");
                egui::ComboBox::from_id_source("damage_type")
                    .selected_text(damage_type.name())
                    .show_ui(ui, |ui| {
                        for choice in DamageType::CHOICES {
                            ui.selectable_value(&mut damage_type, choice, choice.name());
                        }
                    });
                ui.end_row();

                ui.label("Repair");
                egui::ComboBox::from_id_source("repair_action")
                    .selected_text(repair.action.name())
                    .show_ui(ui, |ui| {
                        for choice in RepairAction::CHOICES {
                            ui.selectable_value(&mut repair.action, choice, choice.name());
                        }
                    });
                ui.end_row();

                ui.label("Part type");
                egui::ComboBox::from_id_source("part_type")
                    .selected_text(repair.part_type.name())
                    .show_ui(ui, |ui| {
                        for choice in PartType::CHOICES {
                            ui.selectable_value(&mut repair.part_type, choice, choice.name());
                        }
                    });
                ui.end_row();

                ui.label("Part");
                let mut part = repair.part_id.clone().unwrap_or_default();
                if ui.text_edit_singleline(&mut part).changed() {
                    repair.part_id = (!part.trim().is_empty()).then_some(part);
                }
                ui.end_row();

                ui.label("Cost");
                ui.horizontal(|ui| {
                    let mut known = repair.cost.is_some();
                    ui.checkbox(&mut known, "");
                    let mut cost = repair.cost.unwrap_or(0.0);
                    ui.add_enabled(
                        known,
                        egui::DragValue::new(&mut cost).speed(1.0).clamp_range(0.0..=f64::MAX),
                    );
                    repair.cost = known.then_some(cost);
                });
                ui.end_row();
            });

        if damage_type != record.damage_type || repair != record.repair {
            action = PropertiesAction::Classify {
                id: record.id,
                damage_type,
                repair,
            };
        }
    });

    action
}
