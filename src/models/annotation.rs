// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the damage box record and its classification
//! metadata. All geometry is in natural-image pixel coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a damage box.
///
/// Stored as a small integer code. Codes outside the known set are kept
/// as [`DamageType::Other`] so that stored data survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum DamageType {
    Scratch,
    Dent,
    Broken,
    Unclassified,
    Other(u32),
}

impl DamageType {
    /// Types offered by the classification form.
    pub const CHOICES: [DamageType; 4] = [
        DamageType::Scratch,
        DamageType::Dent,
        DamageType::Broken,
        DamageType::Unclassified,
    ];

    pub fn from_code(code: u32) -> Self {
        match code {
            0 => DamageType::Scratch,
            1 => DamageType::Dent,
            2 => DamageType::Broken,
            3 => DamageType::Unclassified,
            n => DamageType::Other(n),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            DamageType::Scratch => 0,
            DamageType::Dent => 1,
            DamageType::Broken => 2,
            DamageType::Unclassified => 3,
            DamageType::Other(n) => n,
        }
    }

    /// Name shown in the classification form.
    pub fn name(self) -> String {
        match self {
            DamageType::Scratch => "Scratch".to_string(),
            DamageType::Dent => "Dent".to_string(),
            DamageType::Broken => "Broken".to_string(),
            DamageType::Unclassified => "NA".to_string(),
            DamageType::Other(n) => format!("Type {}", n),
        }
    }
}

impl Default for DamageType {
    fn default() -> Self {
        DamageType::Unclassified
    }
}

impl From<u32> for DamageType {
    fn from(code: u32) -> Self {
        DamageType::from_code(code)
    }
}

impl From<DamageType> for u32 {
    fn from(damage_type: DamageType) -> Self {
        damage_type.code()
    }
}

/// Identifier of a record within one image's annotation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RecordId {
    /// Loaded from the store, numbered in line order.
    Stored(u32),
    /// Created locally by the drawing session.
    Draft(u64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Stored(n) => write!(f, "stored-{}", n),
            RecordId::Draft(n) => write!(f, "new-{}", n),
        }
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(n) = s.strip_prefix("stored-") {
            n.parse().map(RecordId::Stored).map_err(|e| e.to_string())
        } else if let Some(n) = s.strip_prefix("new-") {
            n.parse().map(RecordId::Draft).map_err(|e| e.to_string())
        } else {
            Err(format!("unrecognised record id: {:?}", s))
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RecordId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Axis-aligned box in natural-image pixels.
///
/// Width and height may be negative when loaded from stored data with an
/// inverted coordinate pair; nothing here reorders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxGeom {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl BoxGeom {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from a top-left / bottom-right pair as stored on disk.
    ///
    /// Returns `None` when an extent does not fit in an `i64`.
    pub fn from_corners(x: i64, y: i64, x2: i64, y2: i64) -> Option<Self> {
        Some(Self {
            x,
            y,
            width: x2.checked_sub(x)?,
            height: y2.checked_sub(y)?,
        })
    }

    /// Right edge, saturating at the `i64` range.
    pub fn x2(&self) -> i64 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge, saturating at the `i64` range.
    pub fn y2(&self) -> i64 {
        self.y.saturating_add(self.height)
    }

    /// True when the box has no positive area.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check the soft bounds invariant against the image size.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x2() <= i64::from(width)
            && self.y2() <= i64::from(height)
    }
}

/// Repair-vs-replace decision recorded by the classification form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairAction {
    Repair,
    Replace,
    #[default]
    Na,
}

impl RepairAction {
    pub const CHOICES: [RepairAction; 3] =
        [RepairAction::Repair, RepairAction::Replace, RepairAction::Na];

    pub fn name(self) -> &'static str {
        match self {
            RepairAction::Repair => "Repair",
            RepairAction::Replace => "Replace",
            RepairAction::Na => "NA",
        }
    }
}

/// Material of the damaged part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    #[default]
    Metal,
    Plastic,
}

impl PartType {
    pub const CHOICES: [PartType; 2] = [PartType::Metal, PartType::Plastic];

    pub fn name(self) -> &'static str {
        match self {
            PartType::Metal => "Metal",
            PartType::Plastic => "Plastic",
        }
    }
}

/// Repair metadata carried through the record untouched by the geometry code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepairMeta {
    pub part_id: Option<String>,
    pub action: RepairAction,
    pub part_type: PartType,
    pub cost: Option<f64>,
}

/// One damage box plus its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: RecordId,
    pub damage_type: DamageType,
    #[serde(rename = "box")]
    pub geometry: BoxGeom,
    /// Created locally and not yet persisted.
    #[serde(skip)]
    pub is_new: bool,
    #[serde(default)]
    pub repair: RepairMeta,
}

impl AnnotationRecord {
    /// A record read back from persisted text.
    pub fn stored(index: u32, damage_type: DamageType, geometry: BoxGeom) -> Self {
        Self {
            id: RecordId::Stored(index),
            damage_type,
            geometry,
            is_new: false,
            repair: RepairMeta::default(),
        }
    }

    /// A freshly drawn record awaiting classification.
    pub fn draft(id: RecordId, geometry: BoxGeom) -> Self {
        Self {
            id,
            damage_type: DamageType::Unclassified,
            geometry,
            is_new: true,
            repair: RepairMeta::default(),
        }
    }
}

/// Find a record by id.
pub fn find(records: &[AnnotationRecord], id: RecordId) -> Option<&AnnotationRecord> {
    records.iter().find(|r| r.id == id)
}

/// Find a record by id for mutation.
pub fn find_mut(records: &mut [AnnotationRecord], id: RecordId) -> Option<&mut AnnotationRecord> {
    records.iter_mut().find(|r| r.id == id)
}
