//! Byte engine: paged file windows, diffing, search, and the interactive
//! editing state machines

pub mod byte_editor;
pub mod cursor;
pub mod diff;
pub mod display_table;
pub mod go_to_offset;
pub mod history;
pub mod key;
pub mod line_input;
pub mod modes;
pub mod search;
pub mod window;
