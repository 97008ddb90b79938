// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Damage Review
//!
//! A desktop application for inspecting and correcting the damage bounding
//! boxes detected on vehicle inspection photographs.

mod app;
mod config;
mod io;
mod models;
mod session;
mod ui;
mod util;

use anyhow::Result;
use app::ReviewApp;
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load_default()?;
    log::info!("Using store at {}", config.store.root.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 860.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Damage Review"),
        ..Default::default()
    };

    eframe::run_native(
        "Damage Review",
        options,
        Box::new(|_cc| Ok(Box::new(ReviewApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
