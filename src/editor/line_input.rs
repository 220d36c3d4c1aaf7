//! Single-line text entry used by the goto and find prompts
//!
//! The buffer has a fixed width and is kept padded with spaces. In split-hex
//! mode the text is laid out as two-digit groups separated by one space
//! ("DE AD BE"); the cursor never rests on a separator, and a group left
//! with one digit is padded to "0D" when the cursor moves away from it.
//!
//! History recall keeps an overlay of what was typed over each history
//! slot, so going back and forth through the history does not lose edits.
//! The overlay lives only as long as this `LineInput`.

use std::collections::BTreeMap;

use super::history::History;
use super::key::Key;
#[cfg(test)]
use super::key::KeySource;
use super::modes::WriteMode;

/// How a prompt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted(String),
    Cancelled,
}

/// Result of feeding one key to the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputStep {
    Continue,
    /// The key could not be applied (no more history in that direction)
    Beep,
    Finished(InputOutcome),
}

/// Editable fixed-width line
#[derive(Debug, Clone)]
pub struct LineInput {
    buf: Vec<u8>,
    len: usize,
    pos: usize,
    write_mode: WriteMode,
    /// If set, only these characters are accepted
    restrict: Option<String>,
    upcase: bool,
    split_hex: bool,
    history_pos: usize,
    overlay: BTreeMap<usize, String>,
}

impl LineInput {
    /// Empty input of `max_len` characters, positioned after the last history entry
    pub fn new(max_len: usize, history: &History) -> Self {
        Self {
            buf: vec![b' '; max_len],
            len: 0,
            pos: 0,
            write_mode: WriteMode::Insert,
            restrict: None,
            upcase: false,
            split_hex: false,
            history_pos: history.len(),
            overlay: BTreeMap::new(),
        }
    }

    /// Accept only characters from `chars` (checked after upper-casing)
    pub fn restrict_to(mut self, chars: &str) -> Self {
        self.restrict = Some(chars.to_string());
        self
    }

    /// Convert typed letters to upper case
    pub fn upcase(mut self) -> Self {
        self.upcase = true;
        self
    }

    /// Group input as space-separated hex byte pairs
    pub fn split_hex(mut self) -> Self {
        self.split_hex = true;
        // Only whole "XX " groups fit; a trailing single column is unusable
        if self.buf.len() % 3 == 1 {
            self.buf.pop();
        }
        self
    }

    #[cfg(test)]
    pub fn max_len(&self) -> usize {
        self.buf.len()
    }

    /// Cursor column within the buffer
    pub fn cursor(&self) -> usize {
        self.pos
    }

    /// Insert or overwrite, toggled with Insert
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// The entered text (up to the logical length)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf[..self.len]).into_owned()
    }

    /// The full padded buffer, as shown in the input box
    pub fn display(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// Drive the prompt until it is accepted or cancelled
    #[cfg(test)]
    pub fn run<K: KeySource>(&mut self, keys: &mut K, history: &mut History) -> std::io::Result<InputOutcome> {
        loop {
            let key = keys.read_key()?;
            match self.handle_key(key, history) {
                InputStep::Finished(outcome) => return Ok(outcome),
                InputStep::Beep => log::debug!("No more history"),
                InputStep::Continue => {}
            }
        }
    }

    /// Feed one key to the input
    pub fn handle_key(&mut self, key: Key, history: &mut History) -> InputStep {
        let key = match key {
            Key::Char(c) if self.upcase => Key::Char(c.to_ascii_uppercase()),
            Key::Ctrl(b'A') => Key::Home,
            Key::Ctrl(b'E') => Key::End,
            Key::Ctrl(b'B') => Key::Left,
            Key::Ctrl(b'F') => Key::Right,
            Key::Ctrl(b'D') => Key::Delete,
            Key::Ctrl(b'H') => Key::Backspace,
            Key::Ctrl(b'P') => Key::Up,
            Key::Ctrl(b'N') => Key::Down,
            other => other,
        };

        match key {
            Key::Escape => {
                self.buf.fill(b' ');
                self.len = 0;
                self.pos = 0;
                return InputStep::Finished(InputOutcome::Cancelled);
            }
            Key::Return => {
                self.normalize(self.pos);
                let value = self.text();
                if !value.is_empty() {
                    history.push(value.clone());
                }
                return InputStep::Finished(InputOutcome::Accepted(value));
            }
            Key::Backspace => self.delete_left(),
            Key::Delete => self.delete_right(),
            Key::Insert => self.write_mode = self.write_mode.toggled(),
            Key::Left => self.move_left(),
            Key::Right => self.move_right(),
            Key::Ctrl(b'K') => {
                if self.len > self.pos {
                    self.buf[self.pos..self.len].fill(b' ');
                    self.len = self.pos;
                }
            }
            Key::Home => {
                self.normalize(self.pos);
                self.pos = 0;
            }
            Key::End => {
                if self.split_hex && self.pos < self.len {
                    self.normalize(self.pos);
                }
                self.pos = self.len;
            }
            Key::Up => {
                if self.history_pos == 0 {
                    return InputStep::Beep;
                }
                self.use_history(-1, history);
            }
            Key::Down => {
                if self.history_pos >= history.len() {
                    return InputStep::Beep;
                }
                self.use_history(1, history);
            }
            Key::Char(c) => self.type_char(c),
            _ => {}
        }
        InputStep::Continue
    }

    /// Pad a lone hex digit around `pos` to two digits
    ///
    /// Returns true if the buffer changed. Does nothing outside split-hex mode.
    fn normalize(&mut self, pos: usize) -> bool {
        if !self.split_hex {
            return false;
        }
        let max = self.buf.len();

        // "D_" becomes "0D"
        if pos % 3 == 1 && pos < max && self.buf[pos] == b' ' && self.buf[pos - 1] != b' ' {
            self.buf[pos] = self.buf[pos - 1];
            self.buf[pos - 1] = b'0';
            if pos == self.len {
                self.len = (self.len + 2).min(max);
            }
            return true;
        }

        // "_D" becomes "0D"
        if pos % 3 == 0 && pos < self.len && pos + 1 < max && self.buf[pos] == b' ' && self.buf[pos + 1] != b' ' {
            self.buf[pos] = b'0';
            return true;
        }

        false
    }

    /// Remove `count` columns at `at`, pulling the rest left
    fn remove(&mut self, at: usize, count: usize) {
        let max = self.buf.len();
        let end = (at + count).min(max);
        self.buf.copy_within(end..max, at);
        let tail = max - (end - at);
        self.buf[tail..].fill(b' ');
    }

    /// Open `count` columns at `at`, pushing the rest right (the overflow is lost)
    fn open_gap(&mut self, at: usize, count: usize) {
        let max = self.buf.len();
        if at + count < max {
            self.buf.copy_within(at..max - count, at + count);
        }
    }

    fn delete_left(&mut self) {
        if self.pos == 0 {
            return;
        }

        if !self.split_hex {
            self.remove(self.pos - 1, 1);
            self.len -= 1;
            self.pos -= 1;
            return;
        }

        if self.pos % 3 == 0 {
            // At the start of a group: erase the last digit of the previous one
            if self.pos == self.len {
                self.len -= 2;
            }
            self.pos -= 2;
            self.buf[self.pos] = b' ';
        } else if self.pos < self.len && self.buf[self.pos] != b' ' {
            // On a second digit: erase the first
            self.pos -= 1;
            self.buf[self.pos] = b' ';
        } else {
            // On a blank second digit: drop the whole group
            self.pos -= 1;
            self.buf[self.pos] = b' ';
            self.remove(self.pos, 3);
            self.len = self.len.saturating_sub(3).max(self.pos);
        }
    }

    fn delete_right(&mut self) {
        if self.pos >= self.len {
            return;
        }

        if self.split_hex {
            self.pos -= self.pos % 3;
            self.remove(self.pos, 3);
            self.len = self.len.saturating_sub(3).max(self.pos);
        } else {
            self.remove(self.pos, 1);
            self.len -= 1;
        }
    }

    fn move_left(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.pos -= 1;
        if self.split_hex {
            self.normalize(self.pos + 1);
            if self.pos % 3 == 2 {
                self.pos -= 1;
            }
        }
    }

    fn move_right(&mut self) {
        if self.pos >= self.len {
            return;
        }
        self.pos += 1;
        if self.split_hex {
            self.normalize(self.pos - 1);
            if self.pos < self.buf.len() && self.pos % 3 == 2 {
                self.pos += 1;
            }
        }
    }

    fn type_char(&mut self, c: u8) {
        if !(0x20..=0x7E).contains(&c) {
            return;
        }
        if let Some(allowed) = &self.restrict {
            if !allowed.as_bytes().contains(&c) {
                return;
            }
        }

        let max = self.buf.len();
        if self.pos >= max {
            return;
        }

        if self.write_mode == WriteMode::Insert {
            if self.split_hex {
                if self.buf[self.pos] != b' ' {
                    // Typing onto an existing group starts a new group before it
                    if self.len >= max {
                        return;
                    }
                    self.pos -= self.pos % 3;
                    self.open_gap(self.pos, 3);
                    self.buf[self.pos + 1] = b' ';
                    if self.pos + 2 < max {
                        self.buf[self.pos + 2] = b' ';
                    }
                    self.len = (self.len + 3).min(max);
                }
            } else {
                if self.len >= max {
                    return;
                }
                self.open_gap(self.pos, 1);
                self.len += 1;
            }
        }

        self.buf[self.pos] = c;
        self.pos += 1;
        if self.split_hex && self.pos < max && self.pos % 3 == 2 {
            self.pos += 1;
        }
        if self.pos > self.len {
            self.len = self.pos;
        }
    }

    /// Swap the line for the history entry `delta` steps away
    fn use_history(&mut self, delta: isize, history: &History) {
        self.normalize(self.pos);

        // The slot past the end is the fresh line; always keep it
        if self.len > 0 || self.history_pos == history.len() {
            self.overlay.insert(self.history_pos, self.text());
        }

        self.history_pos = self.history_pos.saturating_add_signed(delta);
        let value = self
            .overlay
            .get(&self.history_pos)
            .map(String::as_str)
            .or_else(|| history.get(self.history_pos))
            .unwrap_or("")
            .to_string();

        self.buf.fill(b' ');
        let n = value.len().min(self.buf.len());
        self.buf[..n].copy_from_slice(&value.as_bytes()[..n]);
        self.len = n;
        self.pos = n;
    }
}
