// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Utility modules for the damage review application.

pub mod geometry;
