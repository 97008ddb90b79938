// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background store worker.
//!
//! One long-lived thread serves image loads and annotation saves in the
//! order they were submitted, so a load queued behind a save of the same
//! key reads what that save wrote. A load that a later load has already
//! replaced is skipped. Saves are never skipped.

use crate::io::media;
use crate::io::store::{self, AnnotationStore, ImageEntry};
use crate::models::annotation::AnnotationRecord;
use crate::models::image::Dimensions;
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A decoded image with its records.
pub struct LoadedImageData {
    pub index: usize,
    pub natural: Dimensions,
    pub pixels: Vec<u8>,
    pub records: Vec<AnnotationRecord>,
}

/// Outcome of one save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveResult {
    pub reference: String,
    pub image: String,
    pub revision: u64,
    pub outcome: Result<(), String>,
}

/// Work sent to the worker thread.
pub enum Job {
    Load {
        /// Echoed back so the caller can drop replies it no longer wants
        ticket: u64,
        reference: String,
        index: usize,
        entry: ImageEntry,
        store: Arc<dyn AnnotationStore>,
    },
    Save {
        reference: String,
        image: String,
        revision: u64,
        records: Vec<AnnotationRecord>,
        store: Arc<dyn AnnotationStore>,
    },
    /// Answers once every job before it has finished
    Barrier(Sender<()>),
}

/// Reply from the worker thread.
pub enum Reply {
    Loaded {
        ticket: u64,
        result: Result<LoadedImageData, String>,
    },
    Saved(SaveResult),
}

/// Handle to the worker thread. Dropping it waits for queued jobs.
pub struct StoreWorker {
    jobs: Option<Sender<Job>>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
    /// Saves submitted but not yet answered
    pending_saves: usize,
}

impl StoreWorker {
    pub fn spawn() -> Self {
        let (jobs, job_receiver) = channel();
        let (reply_sender, replies) = channel();
        let handle = std::thread::Builder::new()
            .name("store-worker".to_string())
            .spawn(move || run(job_receiver, reply_sender));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start store worker: {}", e);
                None
            }
        };

        Self {
            jobs: Some(jobs),
            replies,
            handle,
            pending_saves: 0,
        }
    }

    /// Queue a job. Returns false if the worker is gone.
    pub fn submit(&mut self, job: Job) -> bool {
        let is_save = matches!(job, Job::Save { .. });
        let sent = self.jobs.as_ref().is_some_and(|jobs| jobs.send(job).is_ok());
        if !sent {
            log::error!("Store worker is not running");
        } else if is_save {
            self.pending_saves += 1;
        }
        sent
    }

    pub fn pending_saves(&self) -> usize {
        self.pending_saves
    }

    /// Every reply that has arrived, in order.
    pub fn try_recv_all(&mut self) -> Vec<Reply> {
        let replies: Vec<Reply> = self.replies.try_iter().collect();
        self.count_saves(&replies);
        replies
    }

    /// Block until every job queued so far has finished, then return all
    /// outstanding replies.
    pub fn flush(&mut self) -> Vec<Reply> {
        let (sender, receiver) = channel();
        if self.submit(Job::Barrier(sender)) && receiver.recv().is_err() {
            log::warn!("Store worker stopped before finishing its queue");
        }
        self.try_recv_all()
    }

    fn count_saves(&mut self, replies: &[Reply]) {
        let saved = replies.iter().filter(|r| matches!(r, Reply::Saved(_))).count();
        self.pending_saves = self.pending_saves.saturating_sub(saved);
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        // Closing the queue ends the loop once it is drained
        self.jobs = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Store worker panicked");
            }
        }
    }
}

fn run(jobs: Receiver<Job>, replies: Sender<Reply>) {
    let mut queue = VecDeque::new();
    while let Ok(job) = jobs.recv() {
        queue.push_back(job);
        queue.extend(jobs.try_iter());

        while let Some(job) = next_job(&mut queue) {
            let reply = match job {
                Job::Load {
                    ticket,
                    reference,
                    index,
                    entry,
                    store,
                } => Reply::Loaded {
                    ticket,
                    result: load(store.as_ref(), &reference, index, &entry),
                },
                Job::Save {
                    reference,
                    image,
                    revision,
                    records,
                    store,
                } => {
                    let outcome = store::save_annotations(store.as_ref(), &reference, &image, &records)
                        .map_err(|e| e.to_string());
                    match &outcome {
                        Ok(()) => log::info!(
                            "Saved {} annotations for {}/{}",
                            records.len(),
                            reference,
                            image
                        ),
                        Err(e) => log::warn!("Failed to save {}/{}: {}", reference, image, e),
                    }
                    Reply::Saved(SaveResult {
                        reference,
                        image,
                        revision,
                        outcome,
                    })
                }
                Job::Barrier(done) => {
                    let _ = done.send(());
                    continue;
                }
            };

            if replies.send(reply).is_err() {
                return;
            }
        }
    }
}

/// Pop the next job worth running, skipping loads with a later load queued.
fn next_job(queue: &mut VecDeque<Job>) -> Option<Job> {
    while let Some(job) = queue.pop_front() {
        if let Job::Load { ticket, .. } = &job {
            if queue.iter().any(|later| matches!(later, Job::Load { .. })) {
                log::debug!("Skipping superseded load {}", ticket);
                continue;
            }
        }
        return Some(job);
    }
    None
}

fn load(
    store: &dyn AnnotationStore,
    reference: &str,
    index: usize,
    entry: &ImageEntry,
) -> Result<LoadedImageData, String> {
    let loaded =
        media::load_image(&entry.path).map_err(|e| format!("Failed to load image: {:#}", e))?;
    let records = store::load_annotations(store, reference, &entry.id)
        .map_err(|e| format!("Failed to load annotations: {}", e))?;

    log::info!(
        "Loaded {} ({}x{}) with {} annotations",
        entry.path.display(),
        loaded.width,
        loaded.height,
        records.len()
    );

    Ok(LoadedImageData {
        index,
        natural: loaded.dimensions(),
        pixels: loaded.pixels,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::FsStore;
    use crate::models::annotation::{BoxGeom, DamageType};
    use std::path::Path;

    fn fs_store(dir: &Path) -> Arc<dyn AnnotationStore> {
        Arc::new(FsStore::new(dir, vec!["png".to_string()]))
    }

    fn save_job(store: &Arc<dyn AnnotationStore>, revision: u64, extent: i64) -> Job {
        Job::Save {
            reference: "REF1".to_string(),
            image: "front".to_string(),
            revision,
            records: vec![AnnotationRecord::stored(
                0,
                DamageType::Dent,
                BoxGeom::new(0, 0, extent, extent),
            )],
            store: Arc::clone(store),
        }
    }

    fn entry(dir: &Path) -> ImageEntry {
        let path = dir.join("REF1/images/front.png");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(4, 3, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();
        ImageEntry {
            id: "front".to_string(),
            file_name: "front.png".to_string(),
            path,
        }
    }

    fn load_job(store: &Arc<dyn AnnotationStore>, ticket: u64, entry: &ImageEntry) -> Job {
        Job::Load {
            ticket,
            reference: "REF1".to_string(),
            index: 0,
            entry: entry.clone(),
            store: Arc::clone(store),
        }
    }

    fn saved(replies: &[Reply]) -> Vec<&SaveResult> {
        replies
            .iter()
            .filter_map(|r| match r {
                Reply::Saved(result) => Some(result),
                Reply::Loaded { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_saves_run_in_order_and_all_report() {
        let dir = tempfile::tempdir().unwrap();
        let store = fs_store(dir.path());
        let mut worker = StoreWorker::spawn();

        for revision in 1..=20 {
            assert!(worker.submit(save_job(&store, revision, revision as i64)));
        }
        let replies = worker.flush();

        let revisions: Vec<u64> = saved(&replies).iter().map(|r| r.revision).collect();
        assert_eq!(revisions, (1..=20).collect::<Vec<_>>());
        assert!(saved(&replies).iter().all(|r| r.outcome.is_ok()));
        assert_eq!(worker.pending_saves(), 0);

        let on_disk =
            std::fs::read_to_string(dir.path().join("REF1/coordinates/front.txt")).unwrap();
        assert_eq!(on_disk, "1 0,0,20,20");
    }

    #[test]
    fn test_load_after_save_reads_saved_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = fs_store(dir.path());
        let entry = entry(dir.path());
        let mut worker = StoreWorker::spawn();

        worker.submit(save_job(&store, 1, 9));
        worker.submit(load_job(&store, 7, &entry));
        let replies = worker.flush();

        let loaded = replies.iter().find_map(|r| match r {
            Reply::Loaded { ticket, result } => Some((*ticket, result)),
            Reply::Saved(_) => None,
        });
        let Some((7, Ok(data))) = loaded else {
            panic!("expected a successful load");
        };
        assert_eq!(data.natural, Dimensions::new(4, 3));
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].geometry, BoxGeom::new(0, 0, 9, 9));
    }

    #[test]
    fn test_failed_save_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = fs_store(dir.path());
        let mut worker = StoreWorker::spawn();

        worker.submit(Job::Save {
            reference: "..".to_string(),
            image: "front".to_string(),
            revision: 3,
            records: Vec::new(),
            store,
        });
        let replies = worker.flush();

        let results = saved(&replies);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].revision, 3);
        assert!(results[0].outcome.is_err());
    }

    #[test]
    fn test_drop_finishes_queued_saves() {
        let dir = tempfile::tempdir().unwrap();
        let store = fs_store(dir.path());

        let mut worker = StoreWorker::spawn();
        worker.submit(save_job(&store, 1, 5));
        drop(worker);

        assert!(dir.path().join("REF1/coordinates/front.txt").exists());
    }

    #[test]
    fn test_superseded_loads_skipped_but_saves_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = fs_store(dir.path());
        let entry = entry(dir.path());

        let mut queue = VecDeque::from([
            load_job(&store, 1, &entry),
            save_job(&store, 1, 5),
            load_job(&store, 2, &entry),
            save_job(&store, 2, 6),
        ]);

        let mut order = Vec::new();
        while let Some(job) = next_job(&mut queue) {
            order.push(match job {
                Job::Load { ticket, .. } => format!("load {ticket}"),
                Job::Save { revision, .. } => format!("save {revision}"),
                Job::Barrier(_) => "barrier".to_string(),
            });
        }
        assert_eq!(order, ["save 1", "load 2", "save 2"]);
    }
}
