//! Session state: the open windows, their diff, and the prompt histories
//!
//! Every browse command goes through here. The front end drives the
//! interactive parts (prompts, edit sessions) one key at a time. Tests
//! drive the same steps through the blocking `execute` and `run`.

use std::io;
use std::path::Path;

use anyhow::Context;

use super::commands::{Command, Step};
#[cfg(test)]
use super::commands::{command_for_key, find_choice, FindChoice};
use crate::editor::byte_editor::{ByteEditor, EditError, EditOutcome, EditStep};
use crate::editor::diff::{DiffMap, DiffStatus};
use crate::editor::display_table::DisplayTable;
use crate::editor::go_to_offset::{parse_offset, GOTO_INPUT_WIDTH, HEX_DIGITS};
use crate::editor::history::History;
use crate::editor::key::Key;
#[cfg(test)]
use crate::editor::key::KeySource;
#[cfg(test)]
use crate::editor::line_input::InputOutcome;
use crate::editor::line_input::LineInput;
use crate::editor::search::{PatternSearcher, SearchMode, SearchPattern};
use crate::editor::window::{FileWindow, LINE_WIDTH};

/// Lines reserved for the prompt area below the panes
pub const PROMPT_HEIGHT: usize = 4;

/// Width of the find input box
pub const FIND_INPUT_WIDTH: usize = 76;

/// Which window, if any, is held still while the other moves
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LockState {
    #[default]
    Neither,
    TopLocked,
    BottomLocked,
}

/// Windows affected by movement, goto and find
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Targets {
    pub top: bool,
    pub bottom: bool,
}

/// Which history backs a prompt
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HistoryKind {
    Position,
    HexSearch,
    TextSearch,
}

/// Result of a search command
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FindResult {
    Found,
    /// At least one targeted window has no further match
    NotFound,
    /// Nothing to search for
    NoPattern,
}

/// Whether the command loop keeps going
#[cfg(test)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Quit,
}

/// Sizes that do not change once the session is open
#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    pub capacity: usize,
    pub search_block_size: usize,
    pub history_limit: usize,
}

/// Lines per pane and the spare line between panes for a screen `screen_lines` tall
pub fn window_lines(screen_lines: usize, single_file: bool) -> (usize, usize) {
    let headers = if single_file { 1 } else { 2 };
    let lines = screen_lines.saturating_sub(PROMPT_HEIGHT + headers);
    let (lines, between) = if single_file {
        (lines, 0)
    } else {
        let between = lines % 2;
        ((lines - between) / 2, between)
    };
    (lines.max(1), between)
}

pub struct Session {
    top: FileWindow,
    bottom: Option<FileWindow>,
    diffs: DiffMap,
    status: DiffStatus,
    lock: LockState,
    table: DisplayTable,
    searcher: PatternSearcher,
    last_search: Option<SearchPattern>,
    position_history: History,
    hex_history: History,
    text_history: History,
    /// Message for the user from the last command
    notice: Option<String>,
}

impl Session {
    /// Open one or two files read-only; failure here ends the program
    pub fn open(top: &Path, bottom: Option<&Path>, options: SessionOptions) -> anyhow::Result<Self> {
        let capacity = options.capacity.max(LINE_WIDTH);
        let top_window = FileWindow::open(top, capacity, false)
            .with_context(|| format!("failed to open {}", top.display()))?;
        log::info!("Opened {}", top.display());

        let bottom_window = match bottom {
            Some(path) => {
                let window = FileWindow::open(path, capacity, false)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                log::info!("Opened {}", path.display());
                Some(window)
            }
            None => None,
        };

        let mut session = Self {
            top: top_window,
            bottom: bottom_window,
            diffs: DiffMap::new(capacity),
            status: DiffStatus::BothEmpty,
            lock: LockState::Neither,
            table: DisplayTable::Ascii,
            searcher: PatternSearcher::new(options.search_block_size),
            last_search: None,
            position_history: History::with_limit(options.history_limit),
            hex_history: History::with_limit(options.history_limit),
            text_history: History::with_limit(options.history_limit),
            notice: None,
        };
        session.refresh_diff();
        Ok(session)
    }

    /// Window shown in the top pane
    pub fn top(&self) -> &FileWindow {
        &self.top
    }

    /// Window shown in the bottom pane; None in single-file mode
    pub fn bottom(&self) -> Option<&FileWindow> {
        self.bottom.as_ref()
    }

    pub fn is_single_file(&self) -> bool {
        self.bottom.is_none()
    }

    /// Differences between the current pages
    pub fn diffs(&self) -> &DiffMap {
        &self.diffs
    }

    #[cfg(test)]
    pub fn diff_status(&self) -> DiffStatus {
        self.status
    }

    pub fn lock(&self) -> LockState {
        self.lock
    }

    pub fn table(&self) -> DisplayTable {
        self.table
    }

    /// Pattern repeated by "next match"
    pub fn last_search(&self) -> Option<&SearchPattern> {
        self.last_search.as_ref()
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Message left by the last command, cleared on read
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    #[cfg(test)]
    pub fn history(&self, kind: HistoryKind) -> &History {
        match kind {
            HistoryKind::Position => &self.position_history,
            HistoryKind::HexSearch => &self.hex_history,
            HistoryKind::TextSearch => &self.text_history,
        }
    }

    /// History backing the prompt of the given kind
    pub fn history_mut(&mut self, kind: HistoryKind) -> &mut History {
        match kind {
            HistoryKind::Position => &mut self.position_history,
            HistoryKind::HexSearch => &mut self.hex_history,
            HistoryKind::TextSearch => &mut self.text_history,
        }
    }

    /// Windows that movement, goto and find apply to under the current lock
    pub fn targets(&self) -> Targets {
        Targets {
            top: self.lock != LockState::TopLocked,
            bottom: self.bottom.is_some() && self.lock != LockState::BottomLocked,
        }
    }

    /// Whether edits go to the bottom window
    pub fn edits_bottom(&self) -> bool {
        self.lock == LockState::TopLocked && self.bottom.is_some()
    }

    /// Recompare the current pages
    pub fn refresh_diff(&mut self) -> DiffStatus {
        self.status = self.diffs.compute(&self.top, self.bottom.as_ref());
        self.status
    }

    /// Back both windows off until at least one shows data
    ///
    /// Run after every command so that no command can leave the display
    /// entirely past the end of both files.
    pub fn settle(&mut self) -> io::Result<DiffStatus> {
        let step = self.top.page_step().max(LINE_WIDTH) as i64;
        loop {
            let status = self.refresh_diff();
            if status != DiffStatus::BothEmpty {
                return Ok(status);
            }
            let at_start = self.top.offset() == 0 && self.bottom.as_ref().map_or(true, |b| b.offset() == 0);
            if at_start {
                return Ok(status);
            }
            log::debug!("Past the end of both files, backing off {} bytes", step);
            self.top.move_by(-step)?;
            if let Some(bottom) = &mut self.bottom {
                bottom.move_by(-step)?;
            }
        }
    }

    /// Move the targeted windows
    pub fn move_windows(&mut self, step: Step, forward: bool) -> io::Result<()> {
        let targets = self.targets();

        if step == Step::All {
            if !forward {
                if targets.top {
                    self.top.seek_and_fill(0)?;
                }
                if let Some(bottom) = self.bottom.as_mut().filter(|_| targets.bottom) {
                    bottom.seek_and_fill(0)?;
                }
            } else if targets.top {
                let paired = self.bottom.as_mut().filter(|_| targets.bottom);
                self.top.move_to_end(paired)?;
            } else if let Some(bottom) = self.bottom.as_mut().filter(|_| targets.bottom) {
                bottom.move_to_end(None)?;
            }
            return Ok(());
        }

        let distance = match step {
            Step::Byte => 1,
            Step::Line => LINE_WIDTH,
            Step::Page => self.top.page_step(),
            Step::All => 0,
        } as i64;
        let delta = if forward { distance } else { -distance };

        if targets.top {
            self.top.move_by(delta)?;
        }
        if let Some(bottom) = self.bottom.as_mut().filter(|_| targets.bottom) {
            bottom.move_by(delta)?;
        }
        Ok(())
    }

    /// Page both windows forward until their pages differ
    ///
    /// Clears any lock first. Stops at the end of the data as well.
    pub fn next_difference(&mut self) -> io::Result<DiffStatus> {
        self.lock = LockState::Neither;
        let capacity = self.top.capacity() as i64;
        loop {
            self.top.move_by(capacity)?;
            if let Some(bottom) = &mut self.bottom {
                bottom.move_by(capacity)?;
            }
            let status = self.refresh_diff();
            if status != DiffStatus::Ok || self.diffs.count() > 0 {
                log::debug!("Next difference: {:?} at {:#x}", status, self.top.offset());
                return Ok(status);
            }
        }
    }

    /// `T`: move the top file only, or release that lock
    pub fn use_top(&mut self) {
        if self.is_single_file() {
            return;
        }
        self.lock = if self.lock == LockState::BottomLocked {
            LockState::Neither
        } else {
            LockState::BottomLocked
        };
    }

    /// `B`: move the bottom file only, or release that lock
    pub fn use_bottom(&mut self) {
        if self.is_single_file() {
            return;
        }
        self.lock = if self.lock == LockState::TopLocked {
            LockState::Neither
        } else {
            LockState::TopLocked
        };
    }

    /// `C`: switch between ASCII and EBCDIC
    pub fn toggle_table(&mut self) {
        self.table = self.table.toggled();
    }

    /// Change the page size to `lines` rows and re-read both windows
    pub fn resize(&mut self, lines: usize) -> io::Result<()> {
        let capacity = lines.max(1) * LINE_WIDTH;
        if capacity == self.top.capacity() {
            return Ok(());
        }
        log::debug!("Resizing pages to {} lines", lines);
        self.top.resize(capacity)?;
        if let Some(bottom) = &mut self.bottom {
            bottom.resize(capacity)?;
        }
        self.diffs.resize(capacity);
        self.settle().map(|_| ())
    }

    /// Prompt used by the goto command
    pub fn goto_input(&self) -> LineInput {
        LineInput::new(GOTO_INPUT_WIDTH, &self.position_history)
            .restrict_to(HEX_DIGITS)
            .upcase()
    }

    /// Move the targeted windows to the hex offset in `text`; empty is a no-op
    pub fn goto_position(&mut self, text: &str) -> io::Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let offset = match parse_offset(text) {
            Ok(offset) => offset,
            Err(e) => {
                self.notice = Some(e);
                return Ok(());
            }
        };

        let targets = self.targets();
        if targets.top {
            self.top.seek_and_fill(offset)?;
        }
        if let Some(bottom) = self.bottom.as_mut().filter(|_| targets.bottom) {
            bottom.seek_and_fill(offset)?;
        }
        Ok(())
    }

    /// Prompt used to enter a search pattern
    pub fn find_input(&self, mode: SearchMode) -> LineInput {
        match mode {
            SearchMode::Hex => LineInput::new(FIND_INPUT_WIDTH, &self.hex_history)
                .restrict_to(HEX_DIGITS)
                .upcase()
                .split_hex(),
            SearchMode::Text => LineInput::new(FIND_INPUT_WIDTH, &self.text_history),
        }
    }

    /// Search for the pattern entered as `text` and remember it for "next match"
    pub fn search(&mut self, mode: SearchMode, text: &str) -> io::Result<FindResult> {
        let pattern = match mode {
            SearchMode::Hex => match SearchPattern::from_hex(text) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::debug!("No search: {}", e);
                    None
                }
            },
            SearchMode::Text => SearchPattern::from_text(text, self.table),
        };
        let Some(pattern) = pattern else {
            return Ok(FindResult::NoPattern);
        };

        self.last_search = Some(pattern);
        self.find_next()
    }

    /// Repeat the last search from just past the current offsets
    pub fn find_next(&mut self) -> io::Result<FindResult> {
        let Some(pattern) = self.last_search.clone() else {
            return Ok(FindResult::NoPattern);
        };
        log::debug!("Searching for {}", pattern.describe(self.table));

        let targets = self.targets();
        let mut found = true;
        if targets.top {
            found &= self.top.find(&self.searcher, &pattern)?;
        }
        if let Some(bottom) = self.bottom.as_mut().filter(|_| targets.bottom) {
            found &= bottom.find(&self.searcher, &pattern)?;
        }

        if found {
            Ok(FindResult::Found)
        } else {
            self.notice = Some("Not found".to_string());
            Ok(FindResult::NotFound)
        }
    }

    /// Run `f` on the window being edited and its partner
    fn with_edit_windows<R>(&mut self, f: impl FnOnce(&mut FileWindow, Option<&FileWindow>) -> R) -> R {
        match (self.lock, &mut self.bottom) {
            (LockState::TopLocked, Some(bottom)) => f(bottom, Some(&self.top)),
            (_, bottom) => f(&mut self.top, bottom.as_ref()),
        }
    }

    /// Start editing the top window, or the bottom one when the top is locked
    pub fn begin_edit(&mut self) -> Result<ByteEditor, EditError> {
        let table = self.table;
        let result = self.with_edit_windows(|window, _| ByteEditor::begin(window, table));
        if let Err(e) = &result {
            self.notice = Some(format!("Cannot edit: {}", e));
        }
        result
    }

    /// Feed one key to an edit session started by `begin_edit`
    pub fn edit_key(&mut self, editor: &mut ByteEditor, key: Key) -> EditStep {
        let step = self.with_edit_windows(|window, other| editor.handle_key(key, window, other));
        if let EditStep::Finished(outcome) = &step {
            self.report_edit(outcome);
        }
        step
    }

    fn report_edit(&mut self, outcome: &EditOutcome) {
        match outcome {
            EditOutcome::Unchanged | EditOutcome::Saved => {}
            EditOutcome::Discarded => log::debug!("Edit discarded"),
            EditOutcome::SaveFailed(e) => self.notice = Some(format!("Save failed: {}", e)),
        }
    }

    /// Blocking edit session
    #[cfg(test)]
    pub fn edit<K: KeySource>(&mut self, keys: &mut K) -> io::Result<Option<EditOutcome>> {
        let Ok(mut editor) = self.begin_edit() else {
            return Ok(None);
        };
        let outcome = self.with_edit_windows(|window, other| editor.run(keys, window, other))?;
        self.report_edit(&outcome);
        Ok(Some(outcome))
    }

    /// Carry out a command that needs no further input
    ///
    /// Goto, find, edit and quit need a prompt or the front end and are
    /// ignored here. Does not settle.
    pub fn apply(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Move { step, forward } => self.move_windows(step, forward)?,
            Command::NextDifference => {
                self.next_difference()?;
            }
            Command::ToggleTable => self.toggle_table(),
            Command::UseTop => self.use_top(),
            Command::UseBottom => self.use_bottom(),
            Command::Goto | Command::Find | Command::Edit | Command::Quit => {}
        }
        Ok(())
    }

    /// Carry out one command, reading any prompt input from `keys`
    #[cfg(test)]
    pub fn execute<K: KeySource>(&mut self, command: Command, keys: &mut K) -> io::Result<Flow> {
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Goto => {
                let mut input = self.goto_input();
                if let InputOutcome::Accepted(text) = input.run(keys, &mut self.position_history)? {
                    self.goto_position(&text)?;
                }
            }
            Command::Find => {
                let choice = find_choice(keys.read_key()?, self.last_search.is_some());
                let mode = match choice {
                    FindChoice::Cancel => None,
                    FindChoice::Next => {
                        self.find_next()?;
                        None
                    }
                    FindChoice::Hex => Some((SearchMode::Hex, HistoryKind::HexSearch)),
                    FindChoice::Text => Some((SearchMode::Text, HistoryKind::TextSearch)),
                };
                if let Some((mode, kind)) = mode {
                    let mut input = self.find_input(mode);
                    if let InputOutcome::Accepted(text) = input.run(keys, self.history_mut(kind))? {
                        self.search(mode, &text)?;
                    }
                }
            }
            Command::Edit => {
                self.edit(keys)?;
            }
            other => self.apply(other)?,
        }
        self.settle()?;
        Ok(Flow::Continue)
    }

    /// Read and execute commands until quit
    #[cfg(test)]
    pub fn run<K: KeySource>(&mut self, keys: &mut K) -> io::Result<()> {
        loop {
            let key = keys.read_key()?;
            let Some(command) = command_for_key(key, self.is_single_file()) else {
                continue;
            };
            if self.execute(command, keys)? == Flow::Quit {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::key::ScriptedKeys;
    use crate::editor::window::tests::{counting_bytes, create_fixture};
    use tempfile::NamedTempFile;

    const OPTIONS: SessionOptions = SessionOptions {
        capacity: 64,
        search_block_size: 32,
        history_limit: 10,
    };

    fn pair(a: &[u8], b: &[u8], capacity: usize) -> (Session, NamedTempFile, NamedTempFile) {
        let fa = create_fixture(a);
        let fb = create_fixture(b);
        let options = SessionOptions { capacity, ..OPTIONS };
        let session = Session::open(fa.path(), Some(fb.path()), options).unwrap();
        (session, fa, fb)
    }

    fn offsets(session: &Session) -> (u64, u64) {
        (session.top().offset(), session.bottom().map_or(0, |b| b.offset()))
    }

    fn script(text: &str, tail: &[Key]) -> ScriptedKeys {
        let mut keys = ScriptedKeys::typing(text);
        for &key in tail {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn test_open_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");
        let err = Session::open(&missing, None, OPTIONS).err().unwrap();
        assert!(err.to_string().contains("missing.bin"));
    }

    #[test]
    fn test_window_lines() {
        // 25 - 4 - 2 = 19 lines split over two panes
        assert_eq!(window_lines(25, false), (9, 1));
        assert_eq!(window_lines(26, false), (10, 0));
        assert_eq!(window_lines(25, true), (20, 0));
        assert_eq!(window_lines(3, false), (1, 0));
    }

    #[test]
    fn test_next_difference_lands_once() {
        let a = counting_bytes(8192);
        let mut b = a.clone();
        b[0x1020] ^= 0x55;
        let (mut session, _fa, _fb) = pair(&a, &b, 144);
        assert_eq!(session.diffs().count(), 0);

        let mut keys = ScriptedKeys::default();
        session.execute(Command::NextDifference, &mut keys).unwrap();
        assert_eq!(offsets(&session), (4032, 4032));
        assert_eq!(session.diffs().count(), 1);
        let marked: Vec<usize> = (0..144).filter(|&i| session.diffs().is_marked(i)).collect();
        assert_eq!(marked, vec![0x1020 - 4032]);

        // The next run finds nothing else and settles on the last data
        session.execute(Command::NextDifference, &mut keys).unwrap();
        assert_eq!(session.diffs().count(), 0);
        assert_eq!(session.diff_status(), DiffStatus::Ok);
        assert_eq!(offsets(&session), (8080, 8080));
    }

    #[test]
    fn test_next_difference_clears_lock() {
        let a = counting_bytes(256);
        let mut b = a.clone();
        b[200] = 0;
        let (mut session, _fa, _fb) = pair(&a, &b, 64);

        session.use_top();
        assert_eq!(session.lock(), LockState::BottomLocked);
        session.next_difference().unwrap();
        assert_eq!(session.lock(), LockState::Neither);
        assert_eq!(offsets(&session), (192, 192));
    }

    #[test]
    fn test_settle_backs_off_past_end() {
        let data = counting_bytes(1000);
        let (mut session, _fa, _fb) = pair(&data, &data, 64);

        session.goto_position("1388").unwrap();
        assert_eq!(session.refresh_diff(), DiffStatus::BothEmpty);

        // Backs off 48 bytes at a time from 5000
        assert_eq!(session.settle().unwrap(), DiffStatus::Ok);
        assert_eq!(offsets(&session), (968, 968));
        assert_eq!(session.top().valid_len(), 32);
    }

    #[test]
    fn test_settle_stops_for_empty_files() {
        let (mut session, _fa, _fb) = pair(b"", b"", 64);
        assert_eq!(session.settle().unwrap(), DiffStatus::BothEmpty);
        assert_eq!(offsets(&session), (0, 0));

        let mut keys = ScriptedKeys::default();
        session.execute(Command::NextDifference, &mut keys).unwrap();
        assert_eq!(offsets(&session), (0, 0));
    }

    #[test]
    fn test_lock_moves_one_window() {
        let data = counting_bytes(1000);
        let (mut session, _fa, _fb) = pair(&data, &data, 64);

        session.use_top();
        session.move_windows(Step::Line, true).unwrap();
        assert_eq!(offsets(&session), (16, 0));

        session.use_bottom();
        assert_eq!(session.lock(), LockState::TopLocked);
        session.move_windows(Step::Page, true).unwrap();
        assert_eq!(offsets(&session), (16, 48));

        session.use_bottom();
        assert_eq!(session.lock(), LockState::Neither);
        session.move_windows(Step::Byte, false).unwrap();
        assert_eq!(offsets(&session), (15, 47));
    }

    #[test]
    fn test_move_all() {
        let (mut session, _fa, _fb) = pair(&counting_bytes(1000), &counting_bytes(600), 64);
        session.move_windows(Step::Page, true).unwrap();

        session.move_windows(Step::All, true).unwrap();
        // The shorter file decides: 600 - 48 = 552
        assert_eq!(offsets(&session), (544, 544));

        session.move_windows(Step::All, false).unwrap();
        assert_eq!(offsets(&session), (0, 0));

        // Bottom only
        session.use_bottom();
        session.move_windows(Step::All, true).unwrap();
        assert_eq!(offsets(&session), (0, 544));
    }

    #[test]
    fn test_goto_prompt() {
        let data = counting_bytes(1000);
        let (mut session, _fa, _fb) = pair(&data, &data, 64);

        let mut keys = script("g1f0", &[Key::Return, Key::Char(b'q')]);
        session.run(&mut keys).unwrap();
        assert_eq!(offsets(&session), (0x1F0, 0x1F0));
        assert_eq!(session.history(HistoryKind::Position).entries(), &["1F0".to_string()]);
        assert_eq!(keys.remaining(), 0);
    }

    #[test]
    fn test_goto_cancel_and_empty_are_noops() {
        let data = counting_bytes(1000);
        let (mut session, _fa, _fb) = pair(&data, &data, 64);

        let mut keys = script("g12", &[Key::Escape]);
        keys.push(Key::Char(b'g'));
        keys.push(Key::Return);
        keys.push(Key::Char(b'q'));
        session.run(&mut keys).unwrap();
        assert_eq!(offsets(&session), (0, 0));
        assert!(session.history(HistoryKind::Position).is_empty());
    }

    #[test]
    fn test_hex_find_in_both_files() {
        let mut a = vec![0u8; 1000];
        let mut b = vec![0u8; 1000];
        a[300..302].copy_from_slice(&[0xDE, 0xAD]);
        b[400..402].copy_from_slice(&[0xDE, 0xAD]);
        let (mut session, _fa, _fb) = pair(&a, &b, 64);

        let mut keys = script("fhdead", &[Key::Return, Key::Char(b'q')]);
        session.run(&mut keys).unwrap();
        assert_eq!(offsets(&session), (300, 400));
        assert_eq!(session.last_search().unwrap().bytes(), &[0xDE, 0xAD]);
        assert_eq!(session.history(HistoryKind::HexSearch).entries(), &["DE AD ".to_string()]);
        assert_eq!(session.take_notice(), None);
    }

    #[test]
    fn test_find_next_and_not_found() {
        let mut data = vec![b'.'; 500];
        data[100..103].copy_from_slice(b"abc");
        data[350..353].copy_from_slice(b"abc");
        let f = create_fixture(&data);
        let mut session = Session::open(f.path(), None, OPTIONS).unwrap();

        let mut keys = script("tabc", &[Key::Return]);
        session.execute(Command::Find, &mut keys).unwrap();
        assert_eq!(session.top().offset(), 100);

        let mut keys = ScriptedKeys::typing("n");
        session.execute(Command::Find, &mut keys).unwrap();
        assert_eq!(session.top().offset(), 350);

        assert_eq!(session.find_next().unwrap(), FindResult::NotFound);
        assert_eq!(session.top().offset(), 350);
        assert_eq!(session.take_notice().as_deref(), Some("Not found"));
    }

    #[test]
    fn test_text_find_uses_display_table() {
        let mut data = vec![0u8; 300];
        // "HI" in EBCDIC
        data[200..202].copy_from_slice(&[0xC8, 0xC9]);
        let f = create_fixture(&data);
        let mut session = Session::open(f.path(), None, OPTIONS).unwrap();

        assert_eq!(session.search(SearchMode::Text, "HI").unwrap(), FindResult::NotFound);
        session.toggle_table();
        assert_eq!(session.search(SearchMode::Text, "HI").unwrap(), FindResult::Found);
        assert_eq!(session.top().offset(), 200);
        assert_eq!(session.search(SearchMode::Text, "").unwrap(), FindResult::NoPattern);
    }

    #[test]
    fn test_edit_and_save_top() {
        let (mut session, fa, fb) = pair(b"abcd", b"abcd", 64);

        let mut keys = ScriptedKeys::new([Key::Char(b'e'), Key::Tab, Key::Char(b'x')]);
        keys.push(Key::Escape);
        keys.push(Key::Char(b'y'));
        keys.push(Key::Char(b'q'));
        session.run(&mut keys).unwrap();

        assert_eq!(std::fs::read(fa.path()).unwrap(), b"xbcd");
        assert_eq!(std::fs::read(fb.path()).unwrap(), b"abcd");
        assert_eq!(session.diffs().count(), 1);
    }

    #[test]
    fn test_edit_bottom_when_top_locked() {
        let (mut session, fa, fb) = pair(b"abcd", b"wxyz", 64);
        session.use_bottom();
        assert!(session.edits_bottom());

        // Return copies the top byte into the bottom file
        let mut keys = ScriptedKeys::new([Key::Return, Key::Escape, Key::Char(b'Y')]);
        let outcome = session.edit(&mut keys).unwrap();
        assert!(matches!(outcome, Some(EditOutcome::Saved)));
        assert_eq!(std::fs::read(fb.path()).unwrap(), b"axyz");
        assert_eq!(std::fs::read(fa.path()).unwrap(), b"abcd");
    }

    #[test]
    fn test_edit_refused_past_end() {
        let (mut session, _fa, _fb) = pair(&counting_bytes(10), &counting_bytes(1000), 64);
        session.goto_position("100").unwrap();
        assert_eq!(session.settle().unwrap(), DiffStatus::Ok);

        assert!(matches!(session.begin_edit(), Err(EditError::PastEnd)));
        assert!(session.notice().is_some_and(|n| n.starts_with("Cannot edit")));
    }

    #[test]
    fn test_edit_key_step_api() {
        let (mut session, fa, _fb) = pair(b"abcd", b"abcd", 64);
        let mut editor = session.begin_edit().unwrap();
        for key in [Key::Char(b'4'), Key::Char(b'1'), Key::Escape] {
            assert!(matches!(session.edit_key(&mut editor, key), EditStep::Continue));
        }
        assert!(matches!(
            session.edit_key(&mut editor, Key::Char(b'n')),
            EditStep::Finished(EditOutcome::Discarded)
        ));
        assert_eq!(std::fs::read(fa.path()).unwrap(), b"abcd");
        assert_eq!(session.top().bytes(), b"abcd");
    }

    #[test]
    fn test_single_file_mode() {
        let f = create_fixture(&counting_bytes(200));
        let mut session = Session::open(f.path(), None, OPTIONS).unwrap();
        assert!(session.is_single_file());
        assert_eq!(session.diff_status(), DiffStatus::SingleFile);

        session.use_top();
        assert_eq!(session.lock(), LockState::Neither);

        session.next_difference().unwrap();
        assert_eq!(session.top().offset(), 64);
    }

    #[test]
    fn test_resize_refills() {
        let data = counting_bytes(1000);
        let (mut session, _fa, _fb) = pair(&data, &data, 64);
        session.move_windows(Step::Line, true).unwrap();

        session.resize(10).unwrap();
        assert_eq!(session.top().capacity(), 160);
        assert_eq!(session.diffs().capacity(), 160);
        assert_eq!(session.bottom().unwrap().bytes(), &data[16..176]);
    }

    #[test]
    fn test_toggle_table_command() {
        let f = create_fixture(b"x");
        let mut session = Session::open(f.path(), None, OPTIONS).unwrap();
        let mut keys = ScriptedKeys::typing("cq");
        session.run(&mut keys).unwrap();
        assert_eq!(session.table(), DisplayTable::Ebcdic);
    }
}
