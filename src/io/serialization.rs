// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation export.
//!
//! This module writes an image's full annotation set, including repair
//! metadata that the line format does not carry, to YAML or JSON.

use crate::models::annotation::AnnotationRecord;
use crate::models::image::Dimensions;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;

/// Everything known about one reviewed image.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument<'a> {
    pub reference: &'a str,
    pub image: &'a str,
    pub natural: Dimensions,
    pub annotations: &'a [AnnotationRecord],
}

/// Export to YAML format.
pub fn export_yaml(doc: &ExportDocument<'_>, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(doc)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export to JSON format.
pub fn export_json(doc: &ExportDocument<'_>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Export choosing the format from the file extension.
pub fn export(doc: &ExportDocument<'_>, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(doc, path),
        Some("json") => export_json(doc, path),
        other => bail!("Unsupported export extension: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{BoxGeom, DamageType, RecordId, RepairAction};

    fn records() -> Vec<AnnotationRecord> {
        let mut drawn = AnnotationRecord::draft(RecordId::Draft(4), BoxGeom::new(1, 2, 3, 4));
        drawn.damage_type = DamageType::Dent;
        drawn.repair.action = RepairAction::Replace;
        drawn.repair.cost = Some(120.5);
        vec![
            AnnotationRecord::stored(0, DamageType::Scratch, BoxGeom::new(10, 10, 5, 5)),
            drawn,
        ]
    }

    #[test]
    fn test_json_export_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let records = records();
        let doc = ExportDocument {
            reference: "REF9",
            image: "front",
            natural: Dimensions::new(640, 480),
            annotations: &records,
        };

        export(&doc, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["reference"], "REF9");
        assert_eq!(value["natural"]["width"], 640);
        assert_eq!(value["annotations"][0]["id"], "stored-0");
        assert_eq!(value["annotations"][0]["damage_type"], 0);
        assert_eq!(value["annotations"][1]["id"], "new-4");
        assert_eq!(value["annotations"][1]["box"]["height"], 4);
        assert_eq!(value["annotations"][1]["repair"]["action"], "replace");
        assert_eq!(value["annotations"][1]["repair"]["cost"], 120.5);
        assert!(value["annotations"][1].get("is_new").is_none());
    }

    #[test]
    fn test_yaml_export_reads_back_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yml");
        let records = records();
        let doc = ExportDocument {
            reference: "REF9",
            image: "front",
            natural: Dimensions::new(640, 480),
            annotations: &records,
        };

        export(&doc, &path).unwrap();

        #[derive(serde::Deserialize)]
        struct Back {
            annotations: Vec<AnnotationRecord>,
        }
        let back: Back = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.annotations.len(), 2);
        assert_eq!(back.annotations[1].id, RecordId::Draft(4));
        assert_eq!(back.annotations[1].repair, records[1].repair);
        assert!(!back.annotations[1].is_new);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let records = records();
        let doc = ExportDocument {
            reference: "REF9",
            image: "front",
            natural: Dimensions::new(1, 1),
            annotations: &records,
        };
        assert!(export(&doc, Path::new("out.csv")).is_err());
    }
}
