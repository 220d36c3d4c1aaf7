//! Per-byte difference map between two pages

use super::window::FileWindow;

/// Result of comparing two pages
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DiffStatus {
    /// Pages compared; `count` may be zero
    Ok,
    /// Neither page holds any data (both windows are past end of file)
    BothEmpty,
    /// Only one file is open and its page has data; nothing was compared
    SingleFile,
}

/// Which positions of the displayed pages differ
#[derive(Debug, Clone)]
pub struct DiffMap {
    marks: Vec<bool>,
    count: usize,
}

impl DiffMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            marks: vec![false; capacity],
            count: 0,
        }
    }

    /// Number of page positions the map covers
    pub fn capacity(&self) -> usize {
        self.marks.len()
    }

    /// Reallocate for a new page capacity; all marks are cleared
    pub fn resize(&mut self, capacity: usize) {
        self.marks = vec![false; capacity];
        self.count = 0;
    }

    /// Number of differing positions from the last `compute`
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether page position `index` differs; false past the map
    pub fn is_marked(&self, index: usize) -> bool {
        self.marks.get(index).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub fn marks(&self) -> &[bool] {
        &self.marks
    }

    /// Recompute the map from the current pages of `a` and `b`
    ///
    /// Positions where only one page has data always count as different.
    pub fn compute(&mut self, a: &FileWindow, b: Option<&FileWindow>) -> DiffStatus {
        self.marks.fill(false);
        self.count = 0;

        let Some(b) = b else {
            return if a.valid_len() > 0 {
                DiffStatus::SingleFile
            } else {
                DiffStatus::BothEmpty
            };
        };

        let (left, right) = (a.bytes(), b.bytes());
        let shared = left.len().min(right.len());
        let longest = left.len().max(right.len()).min(self.marks.len());

        for (i, (x, y)) in left.iter().zip(right).enumerate().take(longest) {
            if x != y {
                self.marks[i] = true;
                self.count += 1;
            }
        }
        for mark in &mut self.marks[shared.min(longest)..longest] {
            *mark = true;
            self.count += 1;
        }

        if longest == 0 {
            DiffStatus::BothEmpty
        } else {
            DiffStatus::Ok
        }
    }
}
