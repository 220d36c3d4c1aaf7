//! Main application state and egui integration

pub mod commands;
mod input;
pub mod session;

use std::io;

use eframe::egui::{self, TextStyle};

use crate::editor::byte_editor::{ByteEditor, EditPhase, EditStep};
use crate::editor::key::Key;
use crate::editor::line_input::{InputOutcome, InputStep, LineInput};
use crate::editor::search::SearchMode;
use crate::settings::AppSettings;
use crate::ui::file_pane::{self, PaneView};
use crate::ui::prompt;
use commands::{command_for_key, find_choice, Command, FindChoice};
use session::{window_lines, HistoryKind, Session, PROMPT_HEIGHT};

/// What the keyboard is currently driving
enum Mode {
    Browse,
    Goto(LineInput),
    /// Waiting for H, T or N after "F"
    FindChoice,
    Find { mode: SearchMode, input: LineInput },
    Edit(ByteEditor),
}

/// Main application state for bytediff
///
/// All file state lives in the `Session`; this type only tracks which
/// prompt has the keyboard and what to show in the prompt area.
pub struct DiffApp {
    session: Session,
    mode: Mode,

    /// Message from the last command, cleared by the next browse key
    notice: Option<String>,

    /// Blank lines drawn between the two panes
    lines_between: usize,

    quit: bool,
}

impl DiffApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: Session, settings: &AppSettings) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style
            .text_styles
            .insert(TextStyle::Monospace, egui::FontId::monospace(settings.font_size));
        cc.egui_ctx.set_style(style);

        Self::with_session(session)
    }

    fn with_session(session: Session) -> Self {
        Self {
            session,
            mode: Mode::Browse,
            notice: None,
            lines_between: 1,
            quit: false,
        }
    }

    /// Route one key to whatever currently has the keyboard
    fn handle_key(&mut self, key: Key) {
        let mode = std::mem::replace(&mut self.mode, Mode::Browse);
        self.mode = match mode {
            Mode::Browse => self.browse_key(key),
            Mode::Goto(mut input) => {
                match input.handle_key(key, self.session.history_mut(HistoryKind::Position)) {
                    InputStep::Finished(outcome) => {
                        if let InputOutcome::Accepted(text) = outcome {
                            let result = self.session.goto_position(&text);
                            self.check(result);
                        }
                        self.finish_command();
                        Mode::Browse
                    }
                    InputStep::Continue | InputStep::Beep => Mode::Goto(input),
                }
            }
            Mode::FindChoice => self.find_choice_key(key),
            Mode::Find { mode, mut input } => {
                let kind = match mode {
                    SearchMode::Hex => HistoryKind::HexSearch,
                    SearchMode::Text => HistoryKind::TextSearch,
                };
                match input.handle_key(key, self.session.history_mut(kind)) {
                    InputStep::Finished(outcome) => {
                        if let InputOutcome::Accepted(text) = outcome {
                            let result = self.session.search(mode, &text).map(|_| ());
                            self.check(result);
                        }
                        self.finish_command();
                        Mode::Browse
                    }
                    InputStep::Continue | InputStep::Beep => Mode::Find { mode, input },
                }
            }
            Mode::Edit(mut editor) => match self.session.edit_key(&mut editor, key) {
                EditStep::Continue => Mode::Edit(editor),
                EditStep::Finished(_) => {
                    self.finish_command();
                    Mode::Browse
                }
            },
        };
    }

    fn browse_key(&mut self, key: Key) -> Mode {
        self.notice = None;
        let Some(command) = command_for_key(key, self.session.is_single_file()) else {
            return Mode::Browse;
        };

        match command {
            Command::Quit => {
                self.quit = true;
                Mode::Browse
            }
            Command::Goto => Mode::Goto(self.session.goto_input()),
            Command::Find => Mode::FindChoice,
            Command::Edit => match self.session.begin_edit() {
                Ok(editor) => Mode::Edit(editor),
                Err(_) => {
                    self.finish_command();
                    Mode::Browse
                }
            },
            other => {
                let result = self.session.apply(other);
                self.check(result);
                self.finish_command();
                Mode::Browse
            }
        }
    }

    fn find_choice_key(&mut self, key: Key) -> Mode {
        match find_choice(key, self.session.last_search().is_some()) {
            FindChoice::Cancel => {
                self.finish_command();
                Mode::Browse
            }
            FindChoice::Next => {
                let result = self.session.find_next().map(|_| ());
                self.check(result);
                self.finish_command();
                Mode::Browse
            }
            FindChoice::Hex => Mode::Find {
                mode: SearchMode::Hex,
                input: self.session.find_input(SearchMode::Hex),
            },
            FindChoice::Text => Mode::Find {
                mode: SearchMode::Text,
                input: self.session.find_input(SearchMode::Text),
            },
        }
    }

    /// Settle the windows and pick up any message the command left
    fn finish_command(&mut self) {
        let result = self.session.settle().map(|_| ());
        self.check(result);
        if let Some(notice) = self.session.take_notice() {
            self.notice = Some(notice);
        }
    }

    fn check(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            log::error!("I/O error: {}", e);
            self.notice = Some(format!("Error: {}", e));
        }
    }

    /// Resize the pages to fill a screen `screen_lines` rows tall
    ///
    /// Skipped while a prompt or edit is open so their page stays put.
    fn fit_to(&mut self, screen_lines: usize) {
        if !matches!(self.mode, Mode::Browse) {
            return;
        }
        let (lines, between) = window_lines(screen_lines, self.session.is_single_file());
        self.lines_between = between;
        if lines != self.session.top().rows() {
            let result = self.session.resize(lines);
            self.check(result);
        }
    }

    /// Render the prompt area
    fn render_prompt(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("prompt").show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 0.0;
            match &self.mode {
                Mode::Browse => prompt::show_help(
                    ui,
                    self.session.table(),
                    self.session.lock(),
                    self.session.is_single_file(),
                ),
                Mode::Goto(input) => prompt::show_input(ui, " Goto ", input),
                Mode::FindChoice => prompt::show_find_choice(ui, self.session.last_search().is_some()),
                Mode::Find { mode, input } => {
                    let title = match mode {
                        SearchMode::Hex => " Find Hex Bytes",
                        SearchMode::Text => " Find Text ",
                    };
                    prompt::show_input(ui, title, input);
                }
                Mode::Edit(editor) => {
                    if editor.phase() == EditPhase::ConfirmSave {
                        prompt::show_confirm_save(ui);
                    } else {
                        prompt::show_edit_help(ui);
                    }
                }
            }
            if let Some(notice) = &self.notice {
                prompt::show_notice(ui, notice);
            }
        });
    }

    /// Render the file panes
    fn render_panes(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 0.0;
            let row_height = ui.text_style_height(&TextStyle::Monospace);
            let rows = (ui.available_height() / row_height).floor().max(0.0) as usize;
            self.fit_to(rows + PROMPT_HEIGHT);

            let session = &self.session;
            let targets = session.targets();
            let editor = match &self.mode {
                Mode::Edit(editor) => Some(editor),
                _ => None,
            };
            let edits_bottom = session.edits_bottom();

            file_pane::show(
                ui,
                &PaneView {
                    window: session.top(),
                    diffs: session.bottom().map(|_| session.diffs()),
                    table: session.table(),
                    editor: editor.filter(|_| !edits_bottom),
                    moving: targets.top,
                },
            );

            if let Some(bottom) = session.bottom() {
                for _ in 0..self.lines_between {
                    ui.label(" ");
                }
                file_pane::show(
                    ui,
                    &PaneView {
                        window: bottom,
                        diffs: Some(session.diffs()),
                        table: session.table(),
                        editor: editor.filter(|_| edits_bottom),
                        moving: targets.bottom,
                    },
                );
            }
        });
    }
}

impl eframe::App for DiffApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for key in self.read_keys(ctx) {
            self.handle_key(key);
            if self.quit {
                break;
            }
        }

        if self.quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.render_prompt(ctx);
        self.render_panes(ctx);
    }
}
