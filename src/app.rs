// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! [`ReviewApp`] owns the explicit review context (store, active reference,
//! image list, active image and its records) and coordinates the drawing
//! session, undo history and UI panels. Image loading and saving run on a
//! single store worker that reports back over a channel. Closing the window
//! writes any unsaved records before the process exits.

use crate::config::AppConfig;
use crate::io::serialization::{self, ExportDocument};
use crate::io::store::{self, AnnotationStore, FsStore, ImageEntry, ReferenceCatalog};
use crate::io::worker::{Job, Reply, SaveResult, StoreWorker};
use crate::models::annotation::{self, AnnotationRecord, DamageType, RecordId, RepairMeta};
use crate::models::image::ImageContext;
use crate::session::drawing::{
    Capabilities, DrawingSession, PointerEvent, PointerKind, SessionOutcome,
};
use crate::session::history::History;
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::navigator::{self, NavigatorAction};
use crate::ui::overlay::Overlay;
use crate::ui::properties::{self, PropertiesAction};
use crate::ui::toolbar::{self, ToolbarAction};
use std::path::PathBuf;
use std::sync::Arc;

/// Current canvas tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    View,
    Edit,
    Draw,
}

impl Tool {
    /// Renderer capability set for this tool.
    pub fn capabilities(self, fit_to_window: bool) -> Capabilities {
        let base = match self {
            Tool::View => Capabilities::VIEW,
            Tool::Edit => Capabilities::EDIT,
            Tool::Draw => Capabilities::DRAW,
        };
        Capabilities {
            scaled: fit_to_window,
            ..base
        }
    }
}

/// Main application state.
pub struct ReviewApp {
    config: AppConfig,
    store: Arc<FsStore>,

    current_tool: Tool,
    fit_to_window: bool,

    references: Vec<String>,
    reference: Option<String>,
    images: Vec<ImageEntry>,
    current_image: Option<usize>,

    /// Display context of the active image, once decoded
    image: Option<ImageContext>,
    image_texture: Option<egui::TextureHandle>,

    /// Records of the active image
    records: Vec<AnnotationRecord>,
    session: DrawingSession,
    history: History,

    /// Bumped on every change to `records`
    revision: u64,
    /// Revision last written to the store
    saved_revision: u64,
    /// Record whose form edits are coalesced into one undo step
    last_classified: Option<RecordId>,
    /// (revision, frame) the quality flags were last logged for
    flagged: Option<(u64, u64, u64)>,

    /// Serves loads and saves in submission order
    worker: StoreWorker,
    /// Ticket of the load the app is waiting for
    load_ticket: u64,

    /// Loading state message
    loading_message: Option<String>,
    status: String,
}

impl ReviewApp {
    /// Create the application and list the references of the configured store.
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(FsStore::new(
            config.store.root.clone(),
            config.store.image_extensions.clone(),
        ));
        let mut app = Self {
            session: DrawingSession::new(config.editor.min_box_extent),
            history: History::new(config.editor.history_limit),
            config,
            store,
            current_tool: Tool::Edit,
            fit_to_window: true,
            references: Vec::new(),
            reference: None,
            images: Vec::new(),
            current_image: None,
            image: None,
            image_texture: None,
            records: Vec::new(),
            revision: 0,
            saved_revision: 0,
            last_classified: None,
            flagged: None,
            worker: StoreWorker::spawn(),
            load_ticket: 0,
            loading_message: None,
            status: String::new(),
        };
        app.apply_tool();
        app.refresh_catalog();
        app
    }

    fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    fn apply_tool(&mut self) {
        self.session
            .set_capabilities(self.current_tool.capabilities(self.fit_to_window));
    }

    /// Note a change to `records`. Form edits keep coalescing only while
    /// `keep_form` is set.
    fn mark_changed(&mut self, keep_form: bool) {
        self.revision += 1;
        if !keep_form {
            self.last_classified = None;
        }
    }

    /// Point the app at a different store root.
    fn open_store(&mut self, root: PathBuf) {
        self.save_if_dirty();
        log::info!("Opening store at {}", root.display());
        self.store = Arc::new(FsStore::new(root, self.config.store.image_extensions.clone()));
        self.reference = None;
        self.images.clear();
        self.clear_image();
        self.current_image = None;
        self.refresh_catalog();
    }

    fn refresh_catalog(&mut self) {
        match self.store.references() {
            Ok(references) => {
                log::info!(
                    "Found {} references under {}",
                    references.len(),
                    self.store.root().display()
                );
                self.status = format!("{} references", references.len());
                self.references = references;
            }
            Err(e) => {
                log::warn!("Failed to list references: {}", e);
                self.status = format!("Failed to list references: {}", e);
                self.references.clear();
            }
        }
    }

    fn select_reference(&mut self, reference: String) {
        if self.reference.as_deref() == Some(reference.as_str()) {
            return;
        }
        self.save_if_dirty();
        self.clear_image();
        self.current_image = None;

        match self.store.images(&reference) {
            Ok(images) => {
                log::info!("Reference {} has {} images", reference, images.len());
                self.images = images;
            }
            Err(e) => {
                log::warn!("Failed to list images of {}: {}", reference, e);
                self.status = format!("Failed to list images: {}", e);
                self.images.clear();
            }
        }
        self.reference = Some(reference);

        if !self.images.is_empty() {
            self.open_image(0);
        }
    }

    /// Drop everything tied to the active image.
    fn clear_image(&mut self) {
        self.image = None;
        self.image_texture = None;
        self.records.clear();
        self.session.reset();
        self.history.clear();
        self.last_classified = None;
        self.flagged = None;
        self.revision += 1;
        self.saved_revision = self.revision;
        // Any load still in flight is for an image no longer shown
        self.load_ticket += 1;
        self.loading_message = None;
    }

    /// Switch to the image at `index` and load it in the background.
    fn open_image(&mut self, index: usize) {
        if self.current_image == Some(index) && self.image.is_some() {
            return;
        }
        let (Some(reference), Some(entry)) = (self.reference.clone(), self.images.get(index).cloned())
        else {
            return;
        };

        self.save_if_dirty();
        self.clear_image();
        self.current_image = Some(index);

        // Queued behind the save above, so it reads what was just written
        self.loading_message = Some(format!("Loading {}...", entry.file_name));
        self.worker.submit(Job::Load {
            ticket: self.load_ticket,
            reference,
            index,
            entry,
            store: self.annotation_store(),
        });
    }

    fn step_image(&mut self, forward: bool) {
        let Some(index) = self.current_image else {
            return;
        };
        let next = if forward {
            index + 1
        } else {
            match index.checked_sub(1) {
                Some(i) => i,
                None => return,
            }
        };
        if next < self.images.len() {
            self.open_image(next);
        }
    }

    fn annotation_store(&self) -> Arc<dyn AnnotationStore> {
        Arc::clone(&self.store) as Arc<dyn AnnotationStore>
    }

    fn current_entry(&self) -> Option<(&str, &ImageEntry)> {
        let reference = self.reference.as_deref()?;
        let entry = self.images.get(self.current_image?)?;
        Some((reference, entry))
    }

    fn save_if_dirty(&mut self) {
        if self.is_dirty() {
            self.save();
        }
    }

    /// Queue the records for writing on the store worker.
    fn save(&mut self) {
        if self.image.is_none() {
            return;
        }
        let Some((reference, entry)) = self.current_entry() else {
            return;
        };
        let (reference, image) = (reference.to_string(), entry.id.clone());
        self.status = format!("Saving {}...", image);
        let job = Job::Save {
            reference,
            image,
            revision: self.revision,
            records: self.records.clone(),
            store: self.annotation_store(),
        };
        self.worker.submit(job);
    }

    /// Write unsaved records before returning, after every queued save.
    fn save_now(&mut self) {
        // Loads no longer matter once the window is closing
        for reply in self.worker.flush() {
            if let Reply::Saved(result) = reply {
                self.finish_save(result);
            }
        }

        if !self.is_dirty() || self.image.is_none() {
            return;
        }
        let Some((reference, entry)) = self.current_entry() else {
            return;
        };
        let (reference, image) = (reference.to_string(), entry.id.clone());

        match store::save_annotations(self.store.as_ref(), &reference, &image, &self.records) {
            Ok(()) => {
                log::info!(
                    "Saved {} annotations for {}/{} on exit",
                    self.records.len(),
                    reference,
                    image
                );
                self.mark_saved();
            }
            Err(e) => log::error!("Failed to save {}/{} on exit: {}", reference, image, e),
        }
    }

    fn mark_saved(&mut self) {
        self.saved_revision = self.revision;
        for record in &mut self.records {
            record.is_new = false;
        }
    }

    fn export(&mut self, path: PathBuf) {
        let (Some(image), Some((reference, entry))) = (&self.image, self.current_entry()) else {
            return;
        };
        let doc = ExportDocument {
            reference,
            image: &entry.id,
            natural: image.natural(),
            annotations: &self.records,
        };
        match serialization::export(&doc, &path) {
            Ok(()) => {
                log::info!("Exported annotations to {}", path.display());
                self.status = format!("Exported to {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to export annotations: {:#}", e);
                self.status = format!("Export failed: {:#}", e);
            }
        }
    }

    fn poll_worker(&mut self, ctx: &egui::Context) {
        for reply in self.worker.try_recv_all() {
            match reply {
                Reply::Loaded { ticket, .. } if ticket != self.load_ticket => {
                    log::debug!("Dropping stale load {}", ticket);
                }
                Reply::Loaded { result, .. } => {
                    self.loading_message = None;
                    match result {
                        Ok(loaded) => {
                            let size = [loaded.natural.width as usize, loaded.natural.height as usize];
                            let color_image =
                                egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                            let texture = ctx.load_texture(
                                "inspection_image",
                                color_image,
                                egui::TextureOptions::LINEAR,
                            );

                            self.image_texture = Some(texture);
                            self.image = Some(ImageContext::new(loaded.natural));
                            self.current_image = Some(loaded.index);
                            self.records = loaded.records;
                            self.revision += 1;
                            self.saved_revision = self.revision;
                            self.status = format!("{} annotations", self.records.len());
                        }
                        Err(e) => {
                            log::error!("{}", e);
                            self.status = e;
                        }
                    }
                }
                Reply::Saved(result) => self.finish_save(result),
            }
        }
    }

    fn finish_save(&mut self, result: SaveResult) {
        match result.outcome {
            Ok(()) => {
                let still_current = self.current_entry().is_some_and(|(reference, entry)| {
                    reference == result.reference && entry.id == result.image
                });
                if still_current && result.revision == self.revision {
                    self.mark_saved();
                }
                self.status = format!("Saved {}", result.image);
            }
            Err(e) => {
                self.status = format!("Save of {} failed: {}", result.image, e);
            }
        }
    }

    fn apply_toolbar(&mut self, action: ToolbarAction) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        match action {
            ToolbarAction::ZoomIn => image.zoom_in(),
            ToolbarAction::ZoomOut => image.zoom_out(),
            ToolbarAction::ResetZoom => image.reset_zoom(),
            ToolbarAction::None => return,
        }
        log::debug!("Zoom {:.2}", image.zoom());
    }

    fn apply_pointer(&mut self, event: PointerEvent) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        // Only pointer-up commits
        let before = (event.kind == PointerKind::Up).then(|| self.records.clone());

        let outcome = self.session.handle(event, &mut self.records, image);
        match outcome {
            SessionOutcome::Created(id) | SessionOutcome::Moved(id) | SessionOutcome::Resized(id) => {
                if let Some(before) = before {
                    self.history.push(&before);
                }
                self.mark_changed(false);
                if matches!(outcome, SessionOutcome::Created(_)) {
                    self.status = format!("Created {}: classify it in the panel", id);
                }
            }
            SessionOutcome::Selected(id) => {
                self.status = format!("Selected {}", id);
            }
            SessionOutcome::Deselected | SessionOutcome::DraftDiscarded => {
                self.status.clear();
            }
            SessionOutcome::None | SessionOutcome::Ignored => {}
        }
    }

    fn delete_annotation(&mut self, id: RecordId) {
        if !self.session.capabilities().interactive || annotation::find(&self.records, id).is_none() {
            return;
        }
        self.history.push(&self.records);
        if self.session.delete(&mut self.records, id).is_some() {
            self.mark_changed(false);
            self.status = format!("Deleted {}", id);
        }
    }

    fn classify(&mut self, id: RecordId, damage_type: DamageType, repair: RepairMeta) {
        if annotation::find(&self.records, id).is_none() {
            return;
        }
        if self.last_classified != Some(id) {
            self.history.push(&self.records);
        }
        if let Some(record) = annotation::find_mut(&mut self.records, id) {
            if record.damage_type != damage_type {
                log::info!("Classified {} as {}", id, damage_type.name());
            }
            record.damage_type = damage_type;
            record.repair = repair;
        }
        self.mark_changed(true);
        self.last_classified = Some(id);
    }

    fn undo(&mut self) {
        if self.session.is_active() {
            return;
        }
        if let Some(previous) = self.history.undo(self.records.clone()) {
            self.records = previous;
            self.session.select(None);
            self.mark_changed(false);
            log::info!("Undo, {} annotations", self.records.len());
        }
    }

    fn redo(&mut self) {
        if self.session.is_active() {
            return;
        }
        if let Some(next) = self.history.redo(self.records.clone()) {
            self.records = next;
            self.session.select(None);
            self.mark_changed(false);
            log::info!("Redo, {} annotations", self.records.len());
        }
    }

    fn escape(&mut self) {
        if !self.session.cancel() {
            self.session.select(None);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.escape();
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save();
        }

        // Leave editing keys to a focused text field
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(id) = self.session.selected() {
                self.delete_annotation(id);
            }
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }

        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }

        if !self.session.is_active() {
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.step_image(false);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.step_image(true);
            }
        }
    }

    /// Log quality flags once per change of records or frame.
    fn log_overlay_flags(&mut self, overlay: &Overlay) {
        let Overlay::Ready { frame, .. } = overlay else {
            return;
        };
        let key = (self.revision, frame.width.to_bits(), frame.height.to_bits());
        if self.flagged != Some(key) {
            overlay.log_flags();
            self.flagged = Some(key);
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Store Folder...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_directory(self.store.root())
                        .pick_folder()
                    {
                        self.open_store(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                let has_image = self.image.is_some();
                if ui
                    .add_enabled(has_image, egui::Button::new("Save (Ctrl+S)"))
                    .clicked()
                {
                    self.save();
                    ui.close_menu();
                }
                ui.add_enabled_ui(has_image, |ui| {
                    ui.menu_button("Export Annotations", |ui| {
                        let stem = self
                            .current_entry()
                            .map(|(_, entry)| entry.id.clone())
                            .unwrap_or_else(|| "annotations".to_string());
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name(format!("{}.yaml", stem))
                                .save_file()
                            {
                                self.export(path);
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name(format!("{}.json", stem))
                                .save_file()
                            {
                                self.export(path);
                            }
                            ui.close_menu();
                        }
                    });
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    self.save_now();
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let idle = !self.session.is_active();
                if ui
                    .add_enabled(idle && self.history.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(
                        idle && self.history.can_redo(),
                        egui::Button::new("Redo (Ctrl+Shift+Z)"),
                    )
                    .clicked()
                {
                    self.redo();
                    ui.close_menu();
                }

                ui.separator();

                let selected = self
                    .session
                    .selected()
                    .filter(|_| self.session.capabilities().interactive);
                if ui
                    .add_enabled(selected.is_some(), egui::Button::new("Delete Selected"))
                    .clicked()
                {
                    if let Some(id) = selected {
                        self.delete_annotation(id);
                    }
                    ui.close_menu();
                }
            });
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.current_entry() {
                Some((reference, entry)) => {
                    ui.label(format!("{} / {}", reference, entry.file_name));
                }
                None => {
                    ui.label(format!("Store: {}", self.store.root().display()));
                }
            }
            if let Some(natural) = self.image.as_ref().map(|i| i.natural()) {
                ui.separator();
                ui.label(format!("{}×{}", natural.width, natural.height));
            }
            if let Some(scale) = self.image.as_ref().and_then(|i| i.scale()) {
                ui.separator();
                ui.label(format!("{:.0}%", scale * 100.0));
            }
            if self.is_dirty() {
                ui.separator();
                ui.label(egui::RichText::new("● unsaved").color(egui::Color32::YELLOW));
            }
            if !self.status.is_empty() {
                ui.separator();
                ui.label(egui::RichText::new(&self.status).weak());
            }
        });
    }
}

impl eframe::App for ReviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker(ctx);

        // Request repaint while background work is pending
        if self.loading_message.is_some() || self.worker.pending_saves() > 0 {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ui));

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            let (tool, fit) = (self.current_tool, self.fit_to_window);
            let action = toolbar::show(
                ui,
                &mut self.current_tool,
                &mut self.fit_to_window,
                self.image.as_ref().map(|i| i.zoom()),
                self.session.is_active(),
            );
            if tool != self.current_tool || fit != self.fit_to_window {
                self.apply_tool();
            }
            self.apply_toolbar(action);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_bar(ui));

        let navigator_action = egui::SidePanel::left("navigator")
            .default_width(200.0)
            .show(ctx, |ui| {
                navigator::show(
                    ui,
                    &self.references,
                    self.reference.as_deref(),
                    &self.images,
                    self.current_image,
                    self.session.is_active(),
                )
            })
            .inner;

        match navigator_action {
            NavigatorAction::SelectReference(reference) => self.select_reference(reference),
            NavigatorAction::SelectImage(index) => self.open_image(index),
            NavigatorAction::RefreshCatalog => self.refresh_catalog(),
            NavigatorAction::None => {}
        }

        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                let editable = self.session.capabilities().interactive && !self.session.is_active();
                properties::show(
                    ui,
                    &self.records,
                    self.session.selected(),
                    self.image.as_ref().map(|i| i.natural()),
                    editable,
                )
            })
            .inner;

        match properties_action {
            PropertiesAction::SelectAnnotation(id) => {
                if !self.session.is_active() {
                    self.session.select(Some(id));
                }
            }
            PropertiesAction::DeleteAnnotation(id) => self.delete_annotation(id),
            PropertiesAction::Classify {
                id,
                damage_type,
                repair,
            } => self.classify(id, damage_type, repair),
            PropertiesAction::None => {}
        }

        self.handle_keyboard(ctx);

        let output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(message) = &self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasOutput::default()
                } else {
                    canvas::show(
                        ui,
                        self.image.as_mut(),
                        &self.image_texture,
                        &self.records,
                        &self.session,
                        self.config.editor.handle_radius,
                        self.reference.is_some(),
                    )
                }
            })
            .inner;

        if let Some(overlay) = &output.overlay {
            self.log_overlay_flags(overlay);
        }

        for action in output.actions {
            match action {
                CanvasAction::Pointer(event) => self.apply_pointer(event),
                CanvasAction::Delete(id) => self.delete_annotation(id),
                CanvasAction::Cancel => {
                    if self.session.cancel() {
                        self.status = "Cancelled: pointer left the image".to_string();
                    }
                }
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::BoxGeom;
    use crate::models::image::Dimensions;
    use std::path::Path;

    /// App over a temporary store with REF1/front.png active and decoded.
    fn app_with_image(root: &Path) -> ReviewApp {
        let images = root.join("REF1/images");
        std::fs::create_dir_all(&images).unwrap();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]))
            .save(images.join("front.png"))
            .unwrap();

        let mut config = AppConfig::default();
        config.store.root = root.to_path_buf();
        let mut app = ReviewApp::new(config);
        app.reference = Some("REF1".to_string());
        app.images = app.store.images("REF1").unwrap();
        app.current_image = Some(0);
        app.image = Some(ImageContext::new(Dimensions::new(4, 4)));
        app
    }

    fn add_box(app: &mut ReviewApp, extent: i64) {
        app.records.push(AnnotationRecord::stored(
            app.records.len() as u32,
            DamageType::Scratch,
            BoxGeom::new(0, 0, extent, extent),
        ));
        app.mark_changed(false);
    }

    fn on_disk(root: &Path) -> String {
        std::fs::read_to_string(root.join("REF1/coordinates/front.txt")).unwrap()
    }

    #[test]
    fn test_save_now_writes_unsaved_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_image(dir.path());
        add_box(&mut app, 3);
        assert!(app.is_dirty());

        app.save_now();

        assert!(!app.is_dirty());
        assert_eq!(on_disk(dir.path()), "0 0,0,3,3");
    }

    #[test]
    fn test_save_now_lands_after_queued_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_image(dir.path());

        add_box(&mut app, 2);
        app.save();
        add_box(&mut app, 5);
        app.save();
        add_box(&mut app, 7);

        app.save_now();

        assert!(!app.is_dirty());
        assert_eq!(app.worker.pending_saves(), 0);
        assert_eq!(on_disk(dir.path()), "0 0,0,2,2\n0 0,0,5,5\n0 0,0,7,7");
    }

    #[test]
    fn test_zoom_actions_need_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_image(dir.path());

        app.apply_toolbar(ToolbarAction::ZoomIn);
        assert_eq!(app.image.as_ref().map(|i| i.zoom()), Some(1.25));
        app.apply_toolbar(ToolbarAction::ResetZoom);
        assert_eq!(app.image.as_ref().map(|i| i.zoom()), Some(1.0));

        app.image = None;
        app.apply_toolbar(ToolbarAction::ZoomOut);
        assert!(app.image.is_none());
    }

    #[test]
    fn test_tool_capabilities() {
        assert_eq!(Tool::View.capabilities(true), Capabilities::VIEW);
        assert_eq!(Tool::Edit.capabilities(true), Capabilities::EDIT);
        assert_eq!(Tool::Draw.capabilities(true), Capabilities::DRAW);

        let unscaled = Tool::Draw.capabilities(false);
        assert!(!unscaled.scaled);
        assert!(unscaled.interactive && unscaled.drawable);
    }
}
