// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo of committed annotation lists.

use crate::models::annotation::AnnotationRecord;

/// Snapshot history of one image's annotation list.
pub struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<AnnotationRecord>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<AnnotationRecord>>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Save the current list before making a change
    pub fn push(&mut self, records: &[AnnotationRecord]) {
        self.undo_stack.push(records.to_vec());
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // A new change invalidates the redo branch
        self.redo_stack.clear();
    }

    /// Restore the previous list, stashing `current` for redo.
    pub fn undo(&mut self, current: Vec<AnnotationRecord>) -> Option<Vec<AnnotationRecord>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Restore the next list, stashing `current` for undo.
    pub fn redo(&mut self, current: Vec<AnnotationRecord>) -> Option<Vec<AnnotationRecord>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{BoxGeom, DamageType};

    fn list(n: u32) -> Vec<AnnotationRecord> {
        (0..n)
            .map(|i| AnnotationRecord::stored(i, DamageType::Scratch, BoxGeom::new(0, 0, 1, 1)))
            .collect()
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new(10);
        assert!(!history.can_undo());

        history.push(&list(0));
        let restored = history.undo(list(1)).unwrap();
        assert!(restored.is_empty());
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again.len(), 1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(10);
        history.push(&list(0));
        history.undo(list(1));
        history.push(&list(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_bounded_depth() {
        let mut history = History::new(2);
        history.push(&list(1));
        history.push(&list(2));
        history.push(&list(3));

        assert_eq!(history.undo(list(4)).unwrap().len(), 3);
        assert_eq!(history.undo(list(3)).unwrap().len(), 2);
        assert!(history.undo(list(2)).is_none());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(5);
        history.push(&list(1));
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
