use eframe::egui;

use super::DiffApp;
use crate::editor::key::Key;

/// Translate one egui input event into logical keys
///
/// Text events can carry several characters (paste, IME), so this returns
/// a list. Only printable ASCII survives as `Key::Char`.
pub fn translate_event(event: &egui::Event) -> Vec<Key> {
    match event {
        egui::Event::Text(text) | egui::Event::Paste(text) => text
            .bytes()
            .filter(|b| (0x20..=0x7E).contains(b))
            .map(Key::Char)
            .collect(),
        // egui turns Ctrl+C into a copy event
        egui::Event::Copy => vec![Key::Ctrl(b'C')],
        egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => {
            if modifiers.ctrl {
                return control_letter(*key).map(Key::Ctrl).into_iter().collect();
            }
            named_key(*key).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

fn named_key(key: egui::Key) -> Option<Key> {
    let mapped = match key {
        egui::Key::Escape => Key::Escape,
        egui::Key::Tab => Key::Tab,
        egui::Key::Enter => Key::Return,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Delete => Key::Delete,
        egui::Key::Insert => Key::Insert,
        egui::Key::ArrowUp => Key::Up,
        egui::Key::ArrowDown => Key::Down,
        egui::Key::ArrowLeft => Key::Left,
        egui::Key::ArrowRight => Key::Right,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::PageDown => Key::PageDown,
        _ => return None,
    };
    Some(mapped)
}

/// Upper-case letter for a Ctrl+letter chord
fn control_letter(key: egui::Key) -> Option<u8> {
    let name = key.name();
    match name.as_bytes() {
        [letter] if letter.is_ascii_uppercase() => Some(*letter),
        _ => None,
    }
}

impl DiffApp {
    /// Keys pressed since the last frame, in order
    pub(super) fn read_keys(&self, ctx: &egui::Context) -> Vec<Key> {
        ctx.input(|i| i.events.iter().flat_map(translate_event).collect())
    }
}
