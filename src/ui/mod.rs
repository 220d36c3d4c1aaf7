//! UI components for bytediff

pub mod file_pane;
pub mod prompt;
