//! Ordered selection of files for multi-file jobs.
//!
//! Order is part of the job's meaning (merge concatenates in this order), so
//! every mutation other than `append`, `remove` and `clear` is a pure
//! permutation.

use crate::error::ValidationError;
use crate::types::file::{FileId, SelectedFile};
use crate::validation::ValidationPolicy;

#[derive(Debug, Clone, Default)]
pub struct OrderedCollection {
    items: Vec<SelectedFile>,
    drag_source: Option<usize>,
}

impl OrderedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a batch. A single rejection admits none of it.
    /// Returns the number of files added.
    pub fn append(
        &mut self,
        files: Vec<SelectedFile>,
        policy: &ValidationPolicy,
    ) -> Result<usize, ValidationError> {
        let admitted = policy.admit_batch(files)?;
        let added = admitted.len();
        self.items.extend(admitted);
        tracing::debug!("Appended {} file(s), collection now holds {}", added, self.items.len());
        Ok(added)
    }

    /// Make an already admitted file the only item
    pub(crate) fn replace_with(&mut self, file: SelectedFile) {
        self.items.clear();
        self.items.push(file);
        self.drag_source = None;
    }

    /// Remove by identity. Absent ids are a no-op.
    pub fn remove(&mut self, id: FileId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.items.remove(index);
                self.drag_source = None;
                true
            }
            None => false,
        }
    }

    /// Move an item to `new_index`, clamped into the valid range
    pub fn move_to(&mut self, id: FileId, new_index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let to = new_index.min(self.items.len() - 1);
        if from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Swap two positions; out-of-range indices are ignored
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        if i >= self.items.len() || j >= self.items.len() || i == j {
            return false;
        }
        self.items.swap(i, j);
        true
    }

    /// Swap with the previous item; no-op at the top
    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.swap(index, index - 1)
    }

    /// Swap with the next item; no-op at the bottom
    pub fn move_down(&mut self, index: usize) -> bool {
        self.swap(index, index + 1)
    }

    /// Start a drag at `source`
    pub fn begin_drag(&mut self, source: usize) -> bool {
        if source >= self.items.len() {
            return false;
        }
        self.drag_source = Some(source);
        true
    }

    /// Finish the drag over `target`.
    ///
    /// The item is spliced out first, so when moving down the insertion point
    /// shifts up by one.
    pub fn drop_at(&mut self, target: usize) -> bool {
        let Some(source) = self.drag_source.take() else {
            return false;
        };
        if source == target || source >= self.items.len() {
            return false;
        }
        let item = self.items.remove(source);
        let insert_at = if target > source { target - 1 } else { target };
        self.items.insert(insert_at.min(self.items.len()), item);
        true
    }

    pub fn cancel_drag(&mut self) {
        self.drag_source = None;
    }

    pub fn drag_source(&self) -> Option<usize> {
        self.drag_source
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.drag_source = None;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SelectedFile> {
        self.items.get(index)
    }

    pub fn position(&self, id: FileId) -> Option<usize> {
        self.items.iter().position(|f| f.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<FileId> {
        self.items.iter().map(SelectedFile::id).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.items.iter().map(SelectedFile::size_bytes).sum()
    }

    /// Snapshot of the current order, for submission
    pub fn to_vec(&self) -> Vec<SelectedFile> {
        self.items.clone()
    }
}
