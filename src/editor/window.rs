//! Paged file access: one fixed-capacity buffer positioned at a file offset
//!
//! A `FileWindow` never holds more than one page of its file. Navigation
//! re-reads the page from disk; the byte editor mutates the page in place
//! and writes it back on commit.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::search::{PatternSearcher, SearchPattern};

/// Number of bytes displayed per row
pub const LINE_WIDTH: usize = 16;

/// Read until `buf` is full or the reader runs dry
///
/// Read errors end the read early and are logged; callers see them as
/// end-of-file.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("Read failed after {} bytes, treating as end of file: {}", filled, e);
                break;
            }
        }
    }
    filled
}

/// Write all of `bytes` at `offset`; a short write is an error
fn write_at<W: Write + Seek>(writer: &mut W, offset: u64, bytes: &[u8]) -> io::Result<()> {
    writer.seek(SeekFrom::Start(offset))?;
    writer.write_all(bytes)?;
    writer.flush()
}

/// Round toward zero to a multiple of the line width
fn align_to_line(pos: i64) -> i64 {
    pos - pos % LINE_WIDTH as i64
}

/// One page of an open file
pub struct FileWindow {
    /// Path the handle was opened from (needed to reopen writable)
    path: PathBuf,

    file: File,

    /// Whether `file` was opened read-write
    writable: bool,

    /// File position of `page[0]`
    offset: u64,

    /// Page storage; its length is the window capacity
    page: Vec<u8>,

    /// Number of bytes in `page` that hold file data
    valid: usize,
}

impl FileWindow {
    /// Open `path` and fill the first page
    pub fn open(path: &Path, capacity: usize, writable: bool) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(writable).open(path)?;
        let mut window = Self {
            path: path.to_path_buf(),
            file,
            writable,
            offset: 0,
            page: vec![0; capacity],
            valid: 0,
        };
        window.seek_and_fill(0)?;
        log::info!("Opened {} ({} byte page)", path.display(), capacity);
        Ok(window)
    }

    /// Path the window was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File offset of the first byte of the page
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Page size in bytes
    pub fn capacity(&self) -> usize {
        self.page.len()
    }

    /// Number of rows in a page
    pub fn rows(&self) -> usize {
        self.page.len() / LINE_WIDTH
    }

    /// Bytes of the page that hold file data
    pub fn valid_len(&self) -> usize {
        self.valid
    }

    /// Whether the handle has been opened for writing
    #[cfg(test)]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// The valid part of the page
    pub fn bytes(&self) -> &[u8] {
        &self.page[..self.valid]
    }

    /// The whole page, including stale bytes past `valid_len`
    pub fn page(&self) -> &[u8] {
        &self.page
    }

    pub(crate) fn page_mut(&mut self) -> &mut [u8] {
        &mut self.page
    }

    pub(crate) fn set_valid_len(&mut self, valid: usize) {
        self.valid = valid.min(self.page.len());
    }

    /// Byte at a grid position, if it holds file data
    pub fn byte_at(&self, row: usize, col: usize) -> Option<u8> {
        self.bytes().get(row * LINE_WIDTH + col).copied()
    }

    /// Position the window at `offset` and read one page
    ///
    /// A failed seek leaves the window untouched.
    pub fn seek_and_fill(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.offset = offset;
        self.valid = read_up_to(&mut self.file, &mut self.page);
        log::debug!(
            "{}: page at {:#x}, {} valid bytes",
            self.path.display(),
            offset,
            self.valid
        );
        Ok(())
    }

    /// Like `seek_and_fill`, but negative positions clamp to 0
    fn seek_clamped(&mut self, offset: i64) -> io::Result<()> {
        self.seek_and_fill(offset.max(0) as u64)
    }

    /// Move the window by `delta` bytes, stopping at the start of the file
    pub fn move_by(&mut self, delta: i64) -> io::Result<()> {
        self.seek_and_fill(self.offset.saturating_add_signed(delta))
    }

    /// Current length of the file
    pub fn file_len(&mut self) -> io::Result<u64> {
        self.file.seek(SeekFrom::End(0))
    }

    /// Bytes moved by one page-down: a page less one line of overlap
    pub fn page_step(&self) -> usize {
        self.capacity().saturating_sub(LINE_WIDTH)
    }

    /// Show the last full page of the file
    ///
    /// With `other`, both windows move and keep their current distance; the
    /// end used is that of whichever file runs out first.
    pub fn move_to_end(&mut self, other: Option<&mut FileWindow>) -> io::Result<()> {
        let step = self.page_step() as i64;
        let end = self.file_len()? as i64;

        match other {
            Some(other) => {
                let distance = other.offset as i64 - self.offset as i64;
                let end = end.min(other.file_len()? as i64 - distance);
                let end = align_to_line(end - step);
                self.seek_clamped(end)?;
                other.seek_clamped(end + distance)
            }
            None => self.seek_clamped(align_to_line(end - step)),
        }
    }

    /// Change the page capacity and re-read at the current offset
    pub fn resize(&mut self, capacity: usize) -> io::Result<()> {
        if capacity == self.page.len() {
            return Ok(());
        }
        self.page = vec![0; capacity];
        self.valid = 0;
        self.seek_and_fill(self.offset)
    }

    /// Upgrade the handle to read-write; a no-op if it already is
    ///
    /// On failure the window stays read-only.
    pub fn reopen_writable(&mut self) -> io::Result<()> {
        if self.writable {
            return Ok(());
        }
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        self.file = file;
        self.writable = true;
        log::info!("Reopened {} for writing", self.path.display());
        Ok(())
    }

    /// Write the valid part of the page back at the window offset
    pub fn commit_page(&mut self) -> io::Result<()> {
        write_at(&mut self.file, self.offset, &self.page[..self.valid])?;
        log::info!(
            "Saved {} bytes to {} at {:#x}",
            self.valid,
            self.path.display(),
            self.offset
        );
        Ok(())
    }

    /// Search forward from just past the window offset and move to the match
    ///
    /// Returns false, without moving, when the pattern does not occur.
    pub fn find(&mut self, searcher: &PatternSearcher, pattern: &SearchPattern) -> io::Result<bool> {
        match searcher.find(&mut self.file, self.offset, pattern)? {
            Some(pos) => {
                self.seek_and_fill(pos)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
