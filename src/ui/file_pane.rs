//! One file's page: offset column, hex bytes, and display-table glyphs

use eframe::egui::{self, text::LayoutJob, Color32, FontId, TextFormat, TextStyle};

use crate::editor::byte_editor::{ByteEditor, EditPhase};
use crate::editor::cursor::NibblePosition;
use crate::editor::diff::DiffMap;
use crate::editor::display_table::DisplayTable;
use crate::editor::modes::EditMode;
use crate::editor::window::{FileWindow, LINE_WIDTH};

/// Bytes per hex group; an extra space separates groups
const GROUP_SIZE: usize = 8;

const OFFSET_COLOR: Color32 = Color32::from_rgb(150, 150, 150);
const TEXT_COLOR: Color32 = Color32::from_rgb(220, 220, 220);
const DIFF_COLOR: Color32 = Color32::from_rgb(255, 110, 90);
const EDITED_COLOR: Color32 = Color32::from_rgb(255, 210, 60);
const CURSOR_BG: Color32 = Color32::from_rgb(80, 80, 160);
const SHADOW_BG: Color32 = Color32::from_rgb(45, 45, 80);
const HEADER_BG: Color32 = Color32::from_rgb(30, 60, 90);
const LOCKED_HEADER_BG: Color32 = Color32::from_rgb(70, 70, 70);

/// Everything needed to draw one pane
pub struct PaneView<'a> {
    pub window: &'a FileWindow,
    /// None in single-file mode
    pub diffs: Option<&'a DiffMap>,
    pub table: DisplayTable,
    /// The running edit session, if it targets this pane
    pub editor: Option<&'a ByteEditor>,
    /// Whether navigation currently moves this pane
    pub moving: bool,
}

/// What a piece of a row shows
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Segment {
    Offset,
    Space,
    /// Two hex digits of page byte `index`
    Hex(usize),
    /// Display glyph of page byte `index`
    Glyph(usize),
}

/// Offset column text, e.g. "0 0001 2340:"
pub fn offset_label(offset: u64) -> String {
    format!(
        "{:X} {:04X} {:04X}:",
        offset >> 32,
        (offset >> 16) & 0xFFFF,
        offset & 0xFFFF
    )
}

/// Layout of one row of `len` bytes starting at page index `start`
///
/// Short rows keep the glyph column aligned with full rows.
pub fn row_segments(start: usize, len: usize) -> Vec<(Segment, String)> {
    let mut segments = vec![(Segment::Offset, String::new())];
    for j in 0..LINE_WIDTH {
        if j % GROUP_SIZE == 0 {
            segments.push((Segment::Space, " ".to_string()));
        }
        if j < len {
            segments.push((Segment::Hex(start + j), String::new()));
            segments.push((Segment::Space, " ".to_string()));
        } else {
            segments.push((Segment::Space, "   ".to_string()));
        }
    }
    segments.push((Segment::Space, " ".to_string()));
    for j in 0..len {
        if j > 0 && j % GROUP_SIZE == 0 {
            segments.push((Segment::Space, " ".to_string()));
        }
        segments.push((Segment::Glyph(start + j), String::new()));
    }
    segments
}

/// Plain text of a row, as laid out by `row_segments`
#[cfg(test)]
pub fn row_text(window: &FileWindow, row: usize, table: DisplayTable) -> String {
    let start = row * LINE_WIDTH;
    let len = window.valid_len().saturating_sub(start).min(LINE_WIDTH);
    let line_offset = window.offset() + start as u64;
    row_segments(start, len)
        .into_iter()
        .map(|(segment, text)| match segment {
            Segment::Offset => offset_label(line_offset),
            Segment::Space => text,
            Segment::Hex(i) => format!("{:02X}", window.page()[i]),
            Segment::Glyph(i) => table.glyph(window.page()[i]).to_string(),
        })
        .collect()
}

/// Show the pane header and its rows
pub fn show(ui: &mut egui::Ui, view: &PaneView<'_>) {
    let font = TextStyle::Monospace.resolve(ui.style());
    show_header(ui, view, &font);

    for row in 0..view.window.rows() {
        ui.label(row_job(view, row, &font));
    }
}

fn show_header(ui: &mut egui::Ui, view: &PaneView<'_>, font: &FontId) {
    let name = view
        .window
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| view.window.path().display().to_string());

    let mut title = format!(" {}", name);
    if view.editor.is_some() {
        title.push_str("  [editing]");
    }

    let mut format = TextFormat::simple(font.clone(), Color32::WHITE);
    format.background = if view.moving { HEADER_BG } else { LOCKED_HEADER_BG };

    let mut job = LayoutJob::default();
    job.append(&title, 0.0, format);
    ui.label(job);
}

fn row_job(view: &PaneView<'_>, row: usize, font: &FontId) -> LayoutJob {
    let window = view.window;
    let start = row * LINE_WIDTH;
    let page = window.page();

    let cursor = view
        .editor
        .filter(|e| e.phase() == EditPhase::Navigate)
        .map(|e| e.cursor());

    // A cursor past the end of the file still gets a cell to sit in
    let mut len = window.valid_len().saturating_sub(start).min(LINE_WIDTH);
    if let Some(c) = cursor.filter(|c| c.row() == row) {
        len = len.max(c.col() + 1);
    }

    let plain = TextFormat::simple(font.clone(), TEXT_COLOR);
    let mut job = LayoutJob::default();

    for (segment, text) in row_segments(start, len) {
        match segment {
            Segment::Offset => {
                let label = offset_label(window.offset() + start as u64);
                job.append(&label, 0.0, TextFormat::simple(font.clone(), OFFSET_COLOR));
            }
            Segment::Space => job.append(&text, 0.0, plain.clone()),
            Segment::Hex(i) => {
                let format = byte_format(view, i, font);
                let hex = format!("{:02X}", page[i]);
                match cursor.filter(|c| c.index() == i) {
                    Some(c) if c.mode() == EditMode::Hex => {
                        let (high, low) = hex.split_at(1);
                        let mut high_format = format.clone();
                        let mut low_format = format;
                        match c.nibble() {
                            NibblePosition::High => high_format.background = CURSOR_BG,
                            NibblePosition::Low => low_format.background = CURSOR_BG,
                        }
                        job.append(high, 0.0, high_format);
                        job.append(low, 0.0, low_format);
                    }
                    Some(_) => {
                        let mut shadow = format;
                        shadow.background = SHADOW_BG;
                        job.append(&hex, 0.0, shadow);
                    }
                    None => job.append(&hex, 0.0, format),
                }
            }
            Segment::Glyph(i) => {
                let mut format = byte_format(view, i, font);
                if let Some(c) = cursor.filter(|c| c.index() == i) {
                    format.background = if c.mode() == EditMode::Char {
                        CURSOR_BG
                    } else {
                        SHADOW_BG
                    };
                }
                job.append(&view.table.glyph(page[i]).to_string(), 0.0, format);
            }
        }
    }
    job
}

/// Colour for page byte `index`: edited beats different beats plain
fn byte_format(view: &PaneView<'_>, index: usize, font: &FontId) -> TextFormat {
    let edited = view.editor.is_some_and(|e| e.is_edited(index));
    let differs = view.diffs.is_some_and(|d| d.is_marked(index));
    let color = if edited {
        EDITED_COLOR
    } else if differs {
        DIFF_COLOR
    } else {
        TEXT_COLOR
    };
    TextFormat::simple(font.clone(), color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::window::tests::create_fixture;

    #[test]
    fn test_offset_label() {
        assert_eq!(offset_label(0), "0 0000 0000:");
        assert_eq!(offset_label(0x1_2345_6789), "1 2345 6789:");
        assert_eq!(offset_label(0xAB_0000_0010), "AB 0000 0010:");
    }

    #[test]
    fn test_full_row_text() {
        let data: Vec<u8> = (b'A'..b'A' + 16).collect();
        let f = create_fixture(&data);
        let w = FileWindow::open(f.path(), 32, false).unwrap();

        assert_eq!(
            row_text(&w, 0, DisplayTable::Ascii),
            "0 0000 0000: 41 42 43 44 45 46 47 48  49 4A 4B 4C 4D 4E 4F 50  ABCDEFGH IJKLMNOP"
        );
    }

    #[test]
    fn test_short_row_keeps_columns() {
        let f = create_fixture(b"\x00hi");
        let w = FileWindow::open(f.path(), 32, false).unwrap();

        let full_width = offset_label(0).len() + 2 + LINE_WIDTH * 3 + 1;
        let text = row_text(&w, 0, DisplayTable::Ascii);
        assert_eq!(&text[full_width..], ".hi");
        assert!(text.starts_with("0 0000 0000: 00 68 69 "));

        // Past the data the row is just the offset and padding
        let empty = row_text(&w, 1, DisplayTable::Ascii);
        assert!(empty.starts_with("0 0000 0010:"));
        assert_eq!(empty.trim_end(), "0 0000 0010:");
    }

    #[test]
    fn test_row_segments_indices() {
        let segments = row_segments(16, 2);
        let indices: Vec<Segment> = segments
            .iter()
            .map(|(s, _)| *s)
            .filter(|s| matches!(s, Segment::Hex(_) | Segment::Glyph(_)))
            .collect();
        assert_eq!(
            indices,
            vec![Segment::Hex(16), Segment::Hex(17), Segment::Glyph(16), Segment::Glyph(17)]
        );
    }
}
