// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the damage review application.

pub mod canvas;
pub mod navigator;
pub mod overlay;
pub mod properties;
pub mod toolbar;
