// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistence boundary for annotations and inspection images.
//!
//! Annotations are stored as opaque text blobs keyed by
//! `(reference, image)`. The filesystem implementation lays them out as:
//!
//! ```text
//! <root>/<reference>/images/<file>
//! <root>/<reference>/coordinates/<image>.txt
//! ```
//!
//! A missing annotation blob is not an error for callers of
//! [`load_annotations`]: it decodes to an empty list.

use crate::io::codec;
use crate::models::annotation::AnnotationRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

const IMAGES_DIR: &str = "images";
const COORDINATES_DIR: &str = "coordinates";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no object stored at {0}")]
    NotFound(String),
    #[error("invalid key component {0:?}")]
    InvalidKey(String),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Get/put of serialized annotation text.
pub trait AnnotationStore: Send + Sync {
    fn get(&self, reference: &str, image: &str) -> Result<String, StoreError>;
    fn put(&self, reference: &str, image: &str, text: &str) -> Result<(), StoreError>;
}

/// Read-only listing of inspection references and their images.
pub trait ReferenceCatalog: Send + Sync {
    fn references(&self) -> Result<Vec<String>, StoreError>;
    fn images(&self, reference: &str) -> Result<Vec<ImageEntry>, StoreError>;
}

/// One inspection photograph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Key used for the annotation blob (file stem)
    pub id: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// Fetch and decode the annotations for one image.
pub fn load_annotations(
    store: &dyn AnnotationStore,
    reference: &str,
    image: &str,
) -> Result<Vec<AnnotationRecord>, StoreError> {
    match store.get(reference, image) {
        Ok(text) => Ok(codec::decode(&text)),
        Err(StoreError::NotFound(key)) => {
            log::debug!("No annotations at {}, starting empty", key);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Encode and store the annotations for one image.
pub fn save_annotations(
    store: &dyn AnnotationStore,
    reference: &str,
    image: &str,
    records: &[AnnotationRecord],
) -> Result<(), StoreError> {
    store.put(reference, image, &codec::encode(records))
}

/// Store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    image_extensions: Vec<String>,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>, image_extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            image_extensions,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn annotation_path(&self, reference: &str, image: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(key_component(reference)?)
            .join(COORDINATES_DIR)
            .join(format!("{}.txt", key_component(image)?)))
    }

    fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| self.image_extensions.contains(&e))
    }
}

fn key_component(component: &str) -> Result<&str, StoreError> {
    let bad = component.is_empty()
        || component == "."
        || component == ".."
        || component.contains(['/', '\\']);
    if bad {
        Err(StoreError::InvalidKey(component.to_string()))
    } else {
        Ok(component)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    if source.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(path.display().to_string())
    } else {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut paths = std::fs::read_dir(dir)
        .map_err(|e| io_error(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| io_error(dir, e)))
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

impl AnnotationStore for FsStore {
    fn get(&self, reference: &str, image: &str) -> Result<String, StoreError> {
        let path = self.annotation_path(reference, image)?;
        std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))
    }

    fn put(&self, reference: &str, image: &str, text: &str) -> Result<(), StoreError> {
        let path = self.annotation_path(reference, image)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        std::fs::write(&path, text).map_err(|e| io_error(&path, e))?;
        log::info!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

impl ReferenceCatalog for FsStore {
    fn references(&self) -> Result<Vec<String>, StoreError> {
        Ok(sorted_entries(&self.root)?
            .into_iter()
            .filter(|p| p.is_dir())
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect())
    }

    /// Images sharing a file stem would share one annotation blob, so only
    /// the first of them (in sorted order) is listed.
    fn images(&self, reference: &str) -> Result<Vec<ImageEntry>, StoreError> {
        let dir = self.root.join(key_component(reference)?).join(IMAGES_DIR);
        let mut entries: Vec<ImageEntry> = Vec::new();

        for path in sorted_entries(&dir)? {
            if !path.is_file() || !self.is_image(&path) {
                continue;
            }
            let (Some(id), Some(file_name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            if let Some(first) = entries.iter().find(|e| e.id == id) {
                log::warn!(
                    "Skipping {} in {}: annotation key {:?} already used by {}",
                    file_name,
                    reference,
                    id,
                    first.file_name
                );
                continue;
            }
            entries.push(ImageEntry {
                id: id.to_string(),
                file_name: file_name.to_string(),
                path: path.clone(),
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{BoxGeom, DamageType};

    fn store(dir: &Path) -> FsStore {
        FsStore::new(dir, vec!["jpg".to_string(), "png".to_string()])
    }

    #[test]
    fn test_missing_blob_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(matches!(store.get("REF1", "img"), Err(StoreError::NotFound(_))));
        assert!(load_annotations(&store, "REF1", "img").unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let records = vec![
            AnnotationRecord::stored(0, DamageType::Broken, BoxGeom::new(5, 6, 7, 8)),
            AnnotationRecord::stored(1, DamageType::Scratch, BoxGeom::new(0, 0, 1, 1)),
        ];

        save_annotations(&store, "REF1", "front", &records).unwrap();

        let on_disk =
            std::fs::read_to_string(dir.path().join("REF1/coordinates/front.txt")).unwrap();
        assert_eq!(on_disk, "2 5,6,12,14\n0 0,0,1,1");

        let loaded = load_annotations(&store, "REF1", "front").unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for bad in ["", "..", "a/b", "a\\b"] {
            assert!(matches!(
                store.put(bad, "img", "0 1,1,2,2"),
                Err(StoreError::InvalidKey(_))
            ));
            assert!(matches!(store.get("REF", bad), Err(StoreError::InvalidKey(_))));
        }
    }

    #[test]
    fn test_catalog_listing() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("REF2/images");
        std::fs::create_dir_all(&images).unwrap();
        std::fs::create_dir_all(dir.path().join("REF1")).unwrap();
        std::fs::write(dir.path().join("stray.txt"), "").unwrap();
        for name in ["rear.PNG", "front.jpg", "notes.txt"] {
            std::fs::write(images.join(name), b"").unwrap();
        }

        let store = store(dir.path());
        assert_eq!(store.references().unwrap(), vec!["REF1", "REF2"]);

        let entries = store.images("REF2").unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["front", "rear"]);
        assert_eq!(entries[1].file_name, "rear.PNG");

        assert!(matches!(store.images("REF1"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_shared_stem_listed_once() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("REF3/images");
        std::fs::create_dir_all(&images).unwrap();
        for name in ["front.png", "front.jpg", "side.jpg"] {
            std::fs::write(images.join(name), b"").unwrap();
        }

        let entries = store(dir.path()).images("REF3").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["front.jpg", "side.jpg"]);
    }
}
