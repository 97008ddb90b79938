// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for damage annotations and the active image.

pub mod annotation;
pub mod image;
