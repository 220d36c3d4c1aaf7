//! In-place byte editing of one window's page
//!
//! An edit session moves a grid cursor over the page, types bytes in hex
//! or through the display table, and can copy the byte at the same spot
//! from the paired window. Bytes past the end of the file can be written;
//! the gap up to them is zero-filled and the window's valid length grows.
//! Leaving the session asks whether to write the page back to disk.

use std::fmt;
use std::io;

use super::cursor::{EditCursor, NibblePosition};
use super::display_table::DisplayTable;
use super::key::Key;
#[cfg(test)]
use super::key::KeySource;
use super::modes::EditMode;
use super::window::FileWindow;

/// Why an edit session could not start
#[derive(Debug)]
pub enum EditError {
    /// The window sits past end-of-file with no bytes to anchor an edit
    PastEnd,
    /// The file could not be reopened for writing
    WriteDenied(io::Error),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::PastEnd => write!(f, "cannot edit past the end of the file"),
            EditError::WriteDenied(e) => write!(f, "file is not writable: {}", e),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditError::PastEnd => None,
            EditError::WriteDenied(e) => Some(e),
        }
    }
}

/// How an edit session ended
#[derive(Debug)]
pub enum EditOutcome {
    /// Nothing was typed
    Unchanged,
    /// The page was written back to the file
    Saved,
    /// Changes were thrown away and the page re-read
    Discarded,
    /// The write failed; the edited page is still in memory
    SaveFailed(io::Error),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EditPhase {
    Navigate,
    /// Waiting for the answer to "Save changes (Y/N)"
    ConfirmSave,
}

/// Result of feeding one key to the editor
#[derive(Debug)]
pub enum EditStep {
    Continue,
    Finished(EditOutcome),
}

/// Modal editor over one `FileWindow`
pub struct ByteEditor {
    cursor: EditCursor,
    phase: EditPhase,
    table: DisplayTable,
    /// Page positions whose value changed this session
    edited: Vec<bool>,
}

impl ByteEditor {
    /// Start a session on `window`, upgrading it to read-write
    pub fn begin(window: &mut FileWindow, table: DisplayTable) -> Result<Self, EditError> {
        if window.valid_len() == 0 && window.offset() > 0 {
            return Err(EditError::PastEnd);
        }

        if let Err(e) = window.reopen_writable() {
            log::warn!("Cannot edit {}: {}", window.path().display(), e);
            return Err(EditError::WriteDenied(e));
        }

        // Past-the-end bytes start out as zero, so hex entry builds on 0x00
        let valid = window.valid_len();
        window.page_mut()[valid..].fill(0);

        Ok(Self {
            cursor: EditCursor::new(window.rows()),
            phase: EditPhase::Navigate,
            table,
            edited: vec![false; window.capacity()],
        })
    }

    /// Cursor position and entry mode
    pub fn cursor(&self) -> &EditCursor {
        &self.cursor
    }

    /// Whether the session is navigating or waiting for Y/N
    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Whether the page byte at `index` was changed this session
    pub fn is_edited(&self, index: usize) -> bool {
        self.edited.get(index).copied().unwrap_or(false)
    }

    /// Drive the session until it finishes
    #[cfg(test)]
    pub fn run<K: KeySource>(
        &mut self,
        keys: &mut K,
        window: &mut FileWindow,
        other: Option<&FileWindow>,
    ) -> io::Result<EditOutcome> {
        loop {
            let key = keys.read_key()?;
            if let EditStep::Finished(outcome) = self.handle_key(key, window, other) {
                return Ok(outcome);
            }
        }
    }

    /// Feed one key to the session
    pub fn handle_key(&mut self, key: Key, window: &mut FileWindow, other: Option<&FileWindow>) -> EditStep {
        match self.phase {
            EditPhase::Navigate => self.navigate(key, window, other),
            EditPhase::ConfirmSave => {
                let save = matches!(key, Key::Char(b'y') | Key::Char(b'Y'));
                EditStep::Finished(self.finish(save, window))
            }
        }
    }

    fn navigate(&mut self, key: Key, window: &mut FileWindow, other: Option<&FileWindow>) -> EditStep {
        match key {
            Key::Escape => {
                if !self.cursor.is_dirty() {
                    return EditStep::Finished(EditOutcome::Unchanged);
                }
                self.phase = EditPhase::ConfirmSave;
            }
            Key::Tab => self.cursor.toggle_mode(),
            Key::Left | Key::Backspace | Key::Delete => self.cursor.left(),
            Key::Right => self.cursor.right(),
            Key::Up => self.cursor.up(),
            Key::Down => self.cursor.down(),
            Key::Return => {
                let copied = other.and_then(|o| o.byte_at(self.cursor.row(), self.cursor.col()));
                if let Some(value) = copied {
                    self.write_byte(window, self.cursor.index(), value);
                    self.cursor.next_byte();
                }
            }
            _ => {
                if let Some(value) = self.typed_value(key, window) {
                    self.write_byte(window, self.cursor.index(), value);
                    self.cursor.right();
                }
            }
        }
        EditStep::Continue
    }

    /// New value for the byte under the cursor, if `key` is valid input
    fn typed_value(&self, key: Key, window: &FileWindow) -> Option<u8> {
        let ch = key.printable()?;
        match self.cursor.mode() {
            EditMode::Char => Some(self.table.encode(ch)),
            EditMode::Hex => {
                let digit = (ch as char).to_digit(16)? as u8;
                let current = window.page()[self.cursor.index()];
                Some(match self.cursor.nibble() {
                    NibblePosition::High => (digit << 4) | (current & 0x0F),
                    NibblePosition::Low => (current & 0xF0) | digit,
                })
            }
        }
    }

    /// Store `value` at page position `index`, extending the valid length
    ///
    /// Every byte between the old end and `index` is written as zero first.
    /// Newly valid bytes are seeded with a value that differs from the one
    /// being stored, so each registers as changed.
    pub fn write_byte(&mut self, window: &mut FileWindow, index: usize, value: u8) {
        self.cursor.mark_dirty();

        let mut valid = window.valid_len();
        while valid <= index {
            let target = if valid == index { value } else { 0 };
            window.page_mut()[valid] = target ^ 1;
            window.set_valid_len(valid + 1);
            self.store(window, valid, target);
            valid += 1;
        }
        self.store(window, index, value);
    }

    fn store(&mut self, window: &mut FileWindow, index: usize, value: u8) {
        let page = window.page_mut();
        if page[index] != value {
            page[index] = value;
            self.edited[index] = true;
        }
    }

    fn finish(&mut self, save: bool, window: &mut FileWindow) -> EditOutcome {
        if !save {
            if let Err(e) = window.seek_and_fill(window.offset()) {
                log::warn!("Failed to re-read {}: {}", window.path().display(), e);
            }
            return EditOutcome::Discarded;
        }

        let written = window.reopen_writable().and_then(|()| window.commit_page());
        match written {
            Ok(()) => EditOutcome::Saved,
            Err(e) => {
                log::warn!("Failed to save {}: {}", window.path().display(), e);
                EditOutcome::SaveFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::key::ScriptedKeys;
    use crate::editor::window::tests::{counting_bytes, create_fixture};
    use crate::editor::window::LINE_WIDTH;

    fn open(data: &[u8], capacity: usize) -> (tempfile::NamedTempFile, FileWindow) {
        let f = create_fixture(data);
        let w = FileWindow::open(f.path(), capacity, false).unwrap();
        (f, w)
    }

    fn press(editor: &mut ByteEditor, window: &mut FileWindow, keys: &[Key]) {
        for &key in keys {
            assert!(matches!(editor.handle_key(key, window, None), EditStep::Continue));
        }
    }

    #[test]
    fn test_begin_refused_when_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = FileWindow::open(dir.path(), 32, false).unwrap();

        let result = ByteEditor::begin(&mut w, DisplayTable::Ascii);
        assert!(matches!(result, Err(EditError::WriteDenied(_))));
        assert!(!w.is_writable());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_save_keeps_edited_page() {
        // Every write to /dev/full fails with ENOSPC
        let mut w = FileWindow::open(std::path::Path::new("/dev/full"), 32, false).unwrap();
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Char(b'4'), Key::Char(b'1'), Key::Escape]);
        assert_eq!(editor.phase(), EditPhase::ConfirmSave);

        let step = editor.handle_key(Key::Char(b'y'), &mut w, None);
        assert!(matches!(step, EditStep::Finished(EditOutcome::SaveFailed(_))));
        assert_eq!(w.bytes()[0], 0x41);
    }

    #[test]
    fn test_begin_upgrades_to_writable() {
        let (_f, mut w) = open(b"abcd", 32);
        assert!(!w.is_writable());
        let editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        assert!(w.is_writable());
        assert_eq!(editor.phase(), EditPhase::Navigate);
        assert!(w.page()[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_begin_refused_past_end() {
        let (_f, mut w) = open(b"abcd", 32);
        w.seek_and_fill(100).unwrap();
        assert!(matches!(ByteEditor::begin(&mut w, DisplayTable::Ascii), Err(EditError::PastEnd)));
        assert!(!w.is_writable());
    }

    #[test]
    fn test_empty_file_at_origin_is_editable() {
        let (f, mut w) = open(b"", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Char(b'4'), Key::Char(b'2'), Key::Escape]);
        assert!(matches!(editor.handle_key(Key::Char(b'y'), &mut w, None), EditStep::Finished(EditOutcome::Saved)));
        assert_eq!(std::fs::read(f.path()).unwrap(), vec![0x42]);
    }

    #[test]
    fn test_hex_entry_two_nibbles() {
        let (_f, mut w) = open(&[0x00, 0x11, 0x22], 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        press(&mut editor, &mut w, &[Key::Char(b'a')]);
        assert_eq!(w.bytes()[0], 0xA0);
        assert_eq!(editor.cursor().nibble(), NibblePosition::Low);

        press(&mut editor, &mut w, &[Key::Char(b'5')]);
        assert_eq!(w.bytes()[0], 0xA5);
        assert_eq!(editor.cursor().index(), 1);

        // High nibble keeps the existing low nibble
        press(&mut editor, &mut w, &[Key::Char(b'F')]);
        assert_eq!(w.bytes()[1], 0xF1);
        assert!(editor.is_edited(0));
        assert!(editor.is_edited(1));
        assert!(!editor.is_edited(2));
    }

    #[test]
    fn test_invalid_hex_digit_ignored() {
        let (_f, mut w) = open(&[0x00], 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Char(b'g'), Key::Ctrl(b'A')]);
        assert_eq!(editor.cursor().index(), 0);
        assert!(!editor.cursor().is_dirty());
    }

    #[test]
    fn test_char_entry_uses_display_table() {
        let (_f, mut w) = open(b"....", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ebcdic).unwrap();
        press(&mut editor, &mut w, &[Key::Tab, Key::Char(b'A'), Key::Char(b'1')]);
        assert_eq!(&w.bytes()[..2], &[0xC1, 0xF1]);
        assert_eq!(editor.cursor().index(), 2);
    }

    #[test]
    fn test_write_past_end_zero_fills_gap() {
        let (_f, mut w) = open(b"abcd", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        editor.write_byte(&mut w, 9, b'Z');
        assert_eq!(w.valid_len(), 10);
        assert_eq!(&w.bytes()[..4], b"abcd");
        assert!(w.bytes()[4..9].iter().all(|&b| b == 0));
        assert_eq!(w.bytes()[9], b'Z');
        assert!((4..10).all(|i| editor.is_edited(i)));
    }

    #[test]
    fn test_write_zero_just_past_end_still_marks_change() {
        let (_f, mut w) = open(b"abcd", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        editor.write_byte(&mut w, 4, 0);
        assert_eq!(w.valid_len(), 5);
        assert_eq!(w.bytes()[4], 0);
        assert!(editor.is_edited(4));
    }

    #[test]
    fn test_typing_past_end_across_rows() {
        let (_f, mut w) = open(&counting_bytes(3), 48);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        press(&mut editor, &mut w, &[Key::Down, Key::Tab, Key::Right, Key::Char(b'x')]);
        assert_eq!(w.valid_len(), LINE_WIDTH + 2);
        assert!(w.bytes()[3..LINE_WIDTH + 1].iter().all(|&b| b == 0));
        assert_eq!(w.bytes()[LINE_WIDTH + 1], b'x');
    }

    #[test]
    fn test_copy_from_other_window() {
        let (_fa, mut a) = open(b"aaaa", 32);
        let (_fb, b) = open(b"bb", 32);
        let mut editor = ByteEditor::begin(&mut a, DisplayTable::Ascii).unwrap();

        assert!(matches!(editor.handle_key(Key::Return, &mut a, Some(&b)), EditStep::Continue));
        assert_eq!(a.bytes(), b"baaa");
        assert_eq!(editor.cursor().index(), 1);
        assert_eq!(editor.cursor().nibble(), NibblePosition::High);

        editor.handle_key(Key::Return, &mut a, Some(&b));
        assert_eq!(a.bytes(), b"bbaa");

        // Nothing to copy at index 2
        editor.handle_key(Key::Return, &mut a, Some(&b));
        assert_eq!(a.bytes(), b"bbaa");
        assert_eq!(editor.cursor().index(), 2);
    }

    #[test]
    fn test_return_without_other_does_nothing() {
        let (_f, mut w) = open(b"ab", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Return]);
        assert_eq!(editor.cursor().index(), 0);
        assert!(!editor.cursor().is_dirty());
    }

    #[test]
    fn test_escape_without_changes() {
        let (_f, mut w) = open(b"ab", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Right, Key::Down]);
        assert!(matches!(
            editor.handle_key(Key::Escape, &mut w, None),
            EditStep::Finished(EditOutcome::Unchanged)
        ));
    }

    #[test]
    fn test_save_writes_page_at_offset() {
        let data = counting_bytes(64);
        let (f, mut w) = open(&data, 32);
        w.seek_and_fill(16).unwrap();
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        let mut keys = ScriptedKeys::typing("ffee");
        keys.push(Key::Escape);
        keys.push(Key::Char(b'Y'));
        let outcome = editor.run(&mut keys, &mut w, None).unwrap();

        assert!(matches!(outcome, EditOutcome::Saved));
        let on_disk = std::fs::read(f.path()).unwrap();
        assert_eq!(&on_disk[16..18], &[0xFF, 0xEE]);
        assert_eq!(&on_disk[18..], &data[18..]);
        assert_eq!(&on_disk[..16], &data[..16]);
    }

    #[test]
    fn test_save_extended_page_grows_file() {
        let (f, mut w) = open(b"ab", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        let mut keys = ScriptedKeys::new([Key::Tab, Key::Right, Key::Right, Key::Right]);
        keys.push(Key::Char(b'!'));
        keys.push(Key::Escape);
        keys.push(Key::Char(b'y'));
        editor.run(&mut keys, &mut w, None).unwrap();

        assert_eq!(std::fs::read(f.path()).unwrap(), b"ab\0!");
    }

    #[test]
    fn test_decline_save_rereads_page() {
        let (f, mut w) = open(b"abcd", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();

        let mut keys = ScriptedKeys::new([Key::Tab]);
        for b in b"xyzzy" {
            keys.push(Key::Char(*b));
        }
        keys.push(Key::Escape);
        keys.push(Key::Char(b'n'));
        let outcome = editor.run(&mut keys, &mut w, None).unwrap();

        assert!(matches!(outcome, EditOutcome::Discarded));
        assert_eq!(w.bytes(), b"abcd");
        assert_eq!(std::fs::read(f.path()).unwrap(), b"abcd");
    }

    #[test]
    fn test_confirm_phase_after_changes() {
        let (_f, mut w) = open(b"ab", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Char(b'0'), Key::Escape]);
        assert_eq!(editor.phase(), EditPhase::ConfirmSave);
    }

    #[test]
    fn test_backspace_moves_left_with_wrap() {
        let (_f, mut w) = open(b"ab", 32);
        let mut editor = ByteEditor::begin(&mut w, DisplayTable::Ascii).unwrap();
        press(&mut editor, &mut w, &[Key::Backspace]);
        assert_eq!(editor.cursor().row(), 1);
        assert_eq!(editor.cursor().col(), LINE_WIDTH - 1);
        assert_eq!(editor.cursor().nibble(), NibblePosition::Low);
    }
}
