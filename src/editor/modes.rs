//! Entry modes shared by the byte editor and the line input

/// Which column the byte editor types into
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum EditMode {
    /// Hex column: two keystrokes per byte (nibble-level)
    #[default]
    Hex,
    /// Character column: one keystroke per byte
    Char,
}

impl EditMode {
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Hex => EditMode::Char,
            EditMode::Char => EditMode::Hex,
        }
    }
}

/// Whether typing inserts new characters or overwrites existing ones
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum WriteMode {
    /// Typing shifts the rest of the text right
    #[default]
    Insert,
    /// Typing replaces the character under the cursor
    Overwrite,
}

impl WriteMode {
    pub fn toggled(self) -> Self {
        match self {
            WriteMode::Insert => WriteMode::Overwrite,
            WriteMode::Overwrite => WriteMode::Insert,
        }
    }
}
