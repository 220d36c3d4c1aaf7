//! Forward pattern search over a whole file
//!
//! The search reads the file directly in fixed-size blocks rather than
//! going through a `FileWindow`, since a match can be anywhere past the
//! displayed page. Two adjacent blocks are kept in one scratch buffer; when
//! the scan runs out of lookahead in the second block, that block slides
//! down into the first slot and the second slot is refilled from the file.
//! Any candidate that straddles the block boundary is therefore still whole
//! in the buffer when it is compared.
//!
//! Candidates are skipped Quick Search style: after a mismatch at
//! alignment `i`, the byte at `i + len` decides how far to advance.

use std::io::{self, Read, Seek, SeekFrom};

use super::display_table::DisplayTable;
use super::window::read_up_to;

/// Default size of one scan block
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// How the pattern was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Space-separated hex bytes (e.g., "FF D8 FF")
    #[default]
    Hex,
    /// Literal text, encoded through the active display table
    Text,
}

/// A non-empty byte sequence to search for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    bytes: Vec<u8>,
    mode: SearchMode,
}

impl SearchPattern {
    /// Returns None for an empty pattern
    pub fn new(bytes: Vec<u8>, mode: SearchMode) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self { bytes, mode })
    }

    /// Pattern from split-hex input such as "DE AD BE EF"
    pub fn from_hex(input: &str) -> Result<Self, String> {
        let bytes = pack_hex(input)?;
        Self::new(bytes, SearchMode::Hex).ok_or_else(|| "Empty pattern".to_string())
    }

    /// Pattern from typed text, translated into the display table's encoding
    pub fn from_text(input: &str, table: DisplayTable) -> Option<Self> {
        let bytes = input.bytes().map(|b| table.encode(b)).collect();
        Self::new(bytes, SearchMode::Text)
    }

    /// Bytes to match, already translated through the display table
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pattern length, never zero
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the pattern was typed as hex or as text
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Short human-readable form for status lines
    pub fn describe(&self, table: DisplayTable) -> String {
        match self.mode {
            SearchMode::Hex => self
                .bytes
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" "),
            SearchMode::Text => self.bytes.iter().map(|&b| table.glyph(b)).collect(),
        }
    }
}

/// Parse whitespace-separated hex bytes ("1A 2B 3" → [0x1A, 0x2B, 0x03])
pub fn pack_hex(input: &str) -> Result<Vec<u8>, String> {
    input
        .split_whitespace()
        .map(|token| {
            if token.len() > 2 {
                return Err(format!("Invalid hex byte: '{}'", token));
            }
            u8::from_str_radix(token, 16).map_err(|_| format!("Invalid hex byte: '{}'", token))
        })
        .collect()
}

/// Shift table: distance to advance given the byte just past a candidate
fn skip_table(pattern: &[u8]) -> [usize; 256] {
    let len = pattern.len();
    let mut skip = [len + 1; 256];
    for (i, &b) in pattern.iter().enumerate() {
        skip[b as usize] = len - i;
    }
    skip
}

/// Block-buffered Quick Search
#[derive(Debug, Clone)]
pub struct PatternSearcher {
    block_size: usize,
}

impl Default for PatternSearcher {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

impl PatternSearcher {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    #[cfg(test)]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// File offset of the first match starting after `start_exclusive`
    ///
    /// The scan begins at `start_exclusive + 1`, so searching again from a
    /// match position finds the next occurrence. Returns `Ok(None)` when the
    /// rest of the file does not contain the pattern.
    pub fn find<R: Read + Seek>(
        &self,
        file: &mut R,
        start_exclusive: u64,
        pattern: &SearchPattern,
    ) -> io::Result<Option<u64>> {
        let needle = pattern.bytes();
        let len = needle.len();
        let skip = skip_table(needle);

        // A block must hold at least one whole candidate
        let block = self.block_size.max(len);
        let mut buf = vec![0u8; 2 * block];

        let mut base = start_exclusive + 1;
        file.seek(SeekFrom::Start(base))?;
        let mut avail = read_up_to(file, &mut buf);
        let mut at_eof = avail < buf.len();
        let mut i = 0usize;

        loop {
            // Candidates with a lookahead byte available
            while i + len < avail {
                if &buf[i..i + len] == needle {
                    return Ok(Some(base + i as u64));
                }
                i += skip[buf[i + len] as usize];
            }

            if at_eof {
                // The final alignment has no lookahead but can still match
                if i + len == avail && &buf[i..avail] == needle {
                    return Ok(Some(base + i as u64));
                }
                log::debug!("Pattern not found after {:#x}", start_exclusive);
                return Ok(None);
            }

            // The buffer is full and i + len >= 2 * block, so i >= block:
            // everything from i onward lives in the second block.
            buf.copy_within(block..avail, 0);
            avail -= block;
            i -= block;
            base += block as u64;

            let read = read_up_to(file, &mut buf[avail..]);
            avail += read;
            at_eof = avail < buf.len();
        }
    }
}
