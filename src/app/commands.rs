//! Browse-mode commands and their key bindings

use crate::editor::key::Key;

/// Distance covered by a move command
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Byte,
    Line,
    Page,
    /// To the start or the end of the file
    All,
}

/// One browse-mode action
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move { step: Step, forward: bool },
    NextDifference,
    Goto,
    Find,
    Edit,
    ToggleTable,
    /// Move the top file only (locks the bottom one)
    UseTop,
    /// Move the bottom file only (locks the top one)
    UseBottom,
    Quit,
}

/// Map a key pressed while browsing to its command
///
/// Letters are case-insensitive. The lock commands exist only when two
/// files are shown.
pub fn command_for_key(key: Key, single_file: bool) -> Option<Command> {
    let command = match key {
        Key::Return | Key::Char(b' ') => Command::NextDifference,
        Key::Escape | Key::Ctrl(b'C') => Command::Quit,
        Key::Down => Command::Move { step: Step::Line, forward: true },
        Key::Up => Command::Move { step: Step::Line, forward: false },
        Key::Right => Command::Move { step: Step::Byte, forward: true },
        Key::Left => Command::Move { step: Step::Byte, forward: false },
        Key::PageDown => Command::Move { step: Step::Page, forward: true },
        Key::PageUp => Command::Move { step: Step::Page, forward: false },
        Key::End => Command::Move { step: Step::All, forward: true },
        Key::Home => Command::Move { step: Step::All, forward: false },
        Key::Char(c) => match c.to_ascii_uppercase() {
            b'E' => Command::Edit,
            b'F' => Command::Find,
            b'G' => Command::Goto,
            b'Q' => Command::Quit,
            b'C' => Command::ToggleTable,
            b'T' if !single_file => Command::UseTop,
            b'B' if !single_file => Command::UseBottom,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}

/// Choice made at the find prompt
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FindChoice {
    Hex,
    Text,
    /// Repeat the previous search
    Next,
    Cancel,
}

/// Interpret the key pressed at the find chooser
///
/// Anything other than escape, H, or N (when there is a previous search)
/// starts a text search.
pub fn find_choice(key: Key, have_previous: bool) -> FindChoice {
    match key {
        Key::Escape => FindChoice::Cancel,
        Key::Char(c) if c.eq_ignore_ascii_case(&b'H') => FindChoice::Hex,
        Key::Char(c) if c.eq_ignore_ascii_case(&b'N') && have_previous => FindChoice::Next,
        _ => FindChoice::Text,
    }
}
