//! Grid cursor for the byte editor

use super::modes::EditMode;
use super::window::LINE_WIDTH;

/// Which nibble (half-byte) is currently being edited
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum NibblePosition {
    /// High nibble (first hex digit, bits 7-4)
    #[default]
    High,
    /// Low nibble (second hex digit, bits 3-0)
    Low,
}

/// Cursor over a page of `rows` x `LINE_WIDTH` bytes
///
/// All movement wraps: past the last column onto the next row, past the
/// last row back to the first, and the same in reverse.
#[derive(Clone, Debug)]
pub struct EditCursor {
    row: usize,
    col: usize,
    rows: usize,
    nibble: NibblePosition,
    mode: EditMode,
    /// Set once any byte has been written this session
    dirty: bool,
}

impl EditCursor {
    pub fn new(rows: usize) -> Self {
        Self {
            row: 0,
            col: 0,
            rows: rows.max(1),
            nibble: NibblePosition::High,
            mode: EditMode::Hex,
            dirty: false,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Position in the flat page buffer
    pub fn index(&self) -> usize {
        self.row * LINE_WIDTH + self.col
    }

    /// Half of the byte the next hex digit replaces
    pub fn nibble(&self) -> NibblePosition {
        self.nibble
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Whether any byte was written this session
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Switch between hex and character entry; always lands on the high nibble
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.nibble = NibblePosition::High;
    }

    pub fn up(&mut self) {
        self.row = (self.row + self.rows - 1) % self.rows;
    }

    pub fn down(&mut self) {
        self.row = (self.row + 1) % self.rows;
    }

    /// One step right: the low nibble in hex mode, else the next byte
    pub fn right(&mut self) {
        if self.mode == EditMode::Hex && self.nibble == NibblePosition::High {
            self.nibble = NibblePosition::Low;
        } else {
            self.next_byte();
        }
    }

    /// One step left: back to the high nibble, else the previous byte
    ///
    /// In hex mode stepping onto the previous byte lands on its low nibble.
    pub fn left(&mut self) {
        if self.nibble == NibblePosition::Low {
            self.nibble = NibblePosition::High;
            return;
        }
        if self.mode == EditMode::Hex {
            self.nibble = NibblePosition::Low;
        }
        if self.col == 0 {
            self.col = LINE_WIDTH - 1;
            self.up();
        } else {
            self.col -= 1;
        }
    }

    /// Move to the high nibble of the following byte
    pub fn next_byte(&mut self) {
        self.nibble = NibblePosition::High;
        self.col += 1;
        if self.col == LINE_WIDTH {
            self.col = 0;
            self.down();
        }
    }
}
