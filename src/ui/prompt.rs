//! Prompt area: key help, mode indicators, and the input boxes

use eframe::egui::{self, text::LayoutJob, Color32, FontId, TextFormat, TextStyle};

use crate::app::session::LockState;
use crate::editor::display_table::DisplayTable;
use crate::editor::line_input::LineInput;
use crate::editor::modes::WriteMode;

const KEY_COLOR: Color32 = Color32::from_rgb(255, 255, 120);
const TEXT_COLOR: Color32 = Color32::from_rgb(200, 200, 200);
const ACTIVE_BG: Color32 = Color32::from_rgb(40, 110, 40);
const CURSOR_BG: Color32 = Color32::from_rgb(80, 80, 160);
const INPUT_BG: Color32 = Color32::from_rgb(25, 25, 50);
const NOTICE_COLOR: Color32 = Color32::from_rgb(255, 140, 80);

/// A run of prompt text
enum Piece<'a> {
    Key(&'a str),
    Text(&'a str),
    /// Text drawn as an indicator, highlighted while `true`
    Flag(&'a str, bool),
}

fn line_job(pieces: &[Piece<'_>], font: &FontId) -> LayoutJob {
    let mut job = LayoutJob::default();
    for piece in pieces {
        match piece {
            Piece::Key(text) => job.append(text, 0.0, TextFormat::simple(font.clone(), KEY_COLOR)),
            Piece::Text(text) => job.append(text, 0.0, TextFormat::simple(font.clone(), TEXT_COLOR)),
            Piece::Flag(text, on) => {
                let mut format = TextFormat::simple(font.clone(), TEXT_COLOR);
                if *on {
                    format.color = Color32::WHITE;
                    format.background = ACTIVE_BG;
                }
                job.append(text, 0.0, format);
            }
        }
    }
    job
}

/// The two help lines shown while browsing
pub fn show_help(ui: &mut egui::Ui, table: DisplayTable, lock: LockState, single_file: bool) {
    let font = TextStyle::Monospace.resolve(ui.style());

    let mut first = vec![
        Piece::Key("Arrow keys"),
        Piece::Text(" move  "),
        Piece::Key("F"),
        Piece::Text(" find      "),
        Piece::Key("RET"),
        Piece::Text(" next difference  "),
        Piece::Key("ESC"),
        Piece::Text(" quit  "),
    ];
    let mut second = vec![
        Piece::Key("C"),
        Piece::Text(" "),
        Piece::Flag("ASCII", table == DisplayTable::Ascii),
        Piece::Text("/"),
        Piece::Flag("EBCDIC", table == DisplayTable::Ebcdic),
        Piece::Text("   "),
        Piece::Key("E"),
        Piece::Text(" edit file   "),
        Piece::Key("G"),
        Piece::Text(" goto position      "),
        Piece::Key("Q"),
        Piece::Text(" quit  "),
    ];
    if !single_file {
        first.push(Piece::Flag("T move top", lock == LockState::BottomLocked));
        second.push(Piece::Flag("B move bottom", lock == LockState::TopLocked));
    }

    ui.label(line_job(&first, &font));
    ui.label(line_job(&second, &font));
}

/// Help shown while an edit session is running
pub fn show_edit_help(ui: &mut egui::Ui) {
    let font = TextStyle::Monospace.resolve(ui.style());
    ui.label(line_job(
        &[
            Piece::Key("Arrow keys"),
            Piece::Text(" move cursor        "),
            Piece::Key("TAB"),
            Piece::Text(" hex<->char     "),
            Piece::Key("ESC"),
            Piece::Text(" done"),
        ],
        &font,
    ));
    ui.label(line_job(
        &[
            Piece::Key("RET"),
            Piece::Text(" use this byte from other file"),
        ],
        &font,
    ));
}

/// "Save changes (Y/N):"
pub fn show_confirm_save(ui: &mut egui::Ui) {
    let font = TextStyle::Monospace.resolve(ui.style());
    ui.label(line_job(
        &[
            Piece::Text("Save changes ("),
            Piece::Key("Y"),
            Piece::Text("/"),
            Piece::Key("N"),
            Piece::Text("): "),
        ],
        &font,
    ));
}

/// Find chooser; "N" is offered only when there is a previous search
pub fn show_find_choice(ui: &mut egui::Ui, have_previous: bool) {
    let font = TextStyle::Monospace.resolve(ui.style());
    let mut pieces = vec![
        Piece::Text(" Find:  "),
        Piece::Key("H"),
        Piece::Text(" Hex search   "),
        Piece::Key("T"),
        Piece::Text(" Text search"),
    ];
    if have_previous {
        pieces.push(Piece::Text("   "));
        pieces.push(Piece::Key("N"));
        pieces.push(Piece::Text(" Next match"));
    }
    ui.label(line_job(&pieces, &font));
}

/// Titled input box with the cursor position highlighted
pub fn show_input(ui: &mut egui::Ui, title: &str, input: &LineInput) {
    let font = TextStyle::Monospace.resolve(ui.style());

    let mode = match input.write_mode() {
        WriteMode::Insert => "INS",
        WriteMode::Overwrite => "OVR",
    };
    ui.label(line_job(&[Piece::Text(title), Piece::Text("  "), Piece::Key(mode)], &font));

    // One extra column so the cursor can sit past the last character
    let mut text = input.display();
    text.push(' ');
    let cursor = input.cursor().min(text.len() - 1);

    let mut plain = TextFormat::simple(font.clone(), Color32::WHITE);
    plain.background = INPUT_BG;
    let mut highlighted = plain.clone();
    highlighted.background = CURSOR_BG;

    let mut job = LayoutJob::default();
    job.append(&text[..cursor], 0.0, plain.clone());
    job.append(&text[cursor..cursor + 1], 0.0, highlighted);
    job.append(&text[cursor + 1..], 0.0, plain);
    ui.label(job);
}

/// One-line message left by the last command
pub fn show_notice(ui: &mut egui::Ui, notice: &str) {
    let font = TextStyle::Monospace.resolve(ui.style());
    let mut job = LayoutJob::default();
    job.append(notice, 0.0, TextFormat::simple(font, NOTICE_COLOR));
    ui.label(job);
}
