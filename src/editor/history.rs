//! Entry history for the interactive prompts

/// Maximum number of entries kept per history
pub const MAX_HISTORY_SIZE: usize = 2000;

/// Previously accepted prompt values, oldest first
///
/// Values are unique: re-entering an existing value moves it to the end.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    limit: usize,
}

impl History {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY_SIZE)
    }

    /// Empty history holding at most `limit` entries (at least one)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record an accepted value as the most recent entry
    ///
    /// An identical entry is moved rather than duplicated; at the size limit
    /// the oldest entry is dropped.
    pub fn push(&mut self, value: String) {
        if let Some(pos) = self.entries.iter().position(|e| *e == value) {
            let existing = self.entries.remove(pos);
            self.entries.push(existing);
            return;
        }

        if self.entries.len() >= self.limit {
            self.entries.remove(0);
        }
        self.entries.push(value);
    }

    /// Entry at `index`, oldest first
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
