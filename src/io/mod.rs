// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: the annotation text format, the store, images, exports and
//! the background worker that serves the store.

pub mod codec;
pub mod media;
pub mod serialization;
pub mod store;
pub mod worker;
