// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session: pointer-driven box editing and undo history.

pub mod drawing;
pub mod history;
