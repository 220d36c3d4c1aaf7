//! Byte-to-glyph display tables (ASCII and EBCDIC)

/// Glyph shown for bytes with no printable representation
pub const UNPRINTABLE: char = '.';

/// Character set used for the glyph column and for typed text
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DisplayTable {
    #[default]
    Ascii,
    /// IBM code page 037
    Ebcdic,
}

/// Printable ASCII equivalent of a CP037 byte
const fn ebcdic_to_ascii(b: u8) -> Option<u8> {
    let a = match b {
        0x40 => b' ',
        0x4B => b'.',
        0x4C => b'<',
        0x4D => b'(',
        0x4E => b'+',
        0x4F => b'|',
        0x50 => b'&',
        0x5A => b'!',
        0x5B => b'$',
        0x5C => b'*',
        0x5D => b')',
        0x5E => b';',
        0x60 => b'-',
        0x61 => b'/',
        0x6B => b',',
        0x6C => b'%',
        0x6D => b'_',
        0x6E => b'>',
        0x6F => b'?',
        0x79 => b'`',
        0x7A => b':',
        0x7B => b'#',
        0x7C => b'@',
        0x7D => b'\'',
        0x7E => b'=',
        0x7F => b'"',
        0x81..=0x89 => b'a' + (b - 0x81),
        0x91..=0x99 => b'j' + (b - 0x91),
        0xA1 => b'~',
        0xA2..=0xA9 => b's' + (b - 0xA2),
        0xB0 => b'^',
        0xBA => b'[',
        0xBB => b']',
        0xC0 => b'{',
        0xC1..=0xC9 => b'A' + (b - 0xC1),
        0xD0 => b'}',
        0xD1..=0xD9 => b'J' + (b - 0xD1),
        0xE0 => b'\\',
        0xE2..=0xE9 => b'S' + (b - 0xE2),
        0xF0..=0xF9 => b'0' + (b - 0xF0),
        _ => return None,
    };
    Some(a)
}

const fn build_ascii_to_ebcdic() -> [u8; 256] {
    // Identity for anything without an EBCDIC equivalent
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    let mut e = 0;
    while e < 256 {
        if let Some(a) = ebcdic_to_ascii(e as u8) {
            table[a as usize] = e as u8;
        }
        e += 1;
    }
    table
}

const ASCII_TO_EBCDIC: [u8; 256] = build_ascii_to_ebcdic();

impl DisplayTable {
    /// Glyph shown in the character column for `byte`
    pub fn glyph(self, byte: u8) -> char {
        let printable = match self {
            DisplayTable::Ascii => (0x20..=0x7E).contains(&byte).then_some(byte),
            DisplayTable::Ebcdic => ebcdic_to_ascii(byte),
        };
        printable.map_or(UNPRINTABLE, char::from)
    }

    /// Byte stored when the user types the ASCII character `ch`
    pub fn encode(self, ch: u8) -> u8 {
        match self {
            DisplayTable::Ascii => ch,
            DisplayTable::Ebcdic => ASCII_TO_EBCDIC[ch as usize],
        }
    }

    /// The other table
    pub fn toggled(self) -> Self {
        match self {
            DisplayTable::Ascii => DisplayTable::Ebcdic,
            DisplayTable::Ebcdic => DisplayTable::Ascii,
        }
    }

    /// Label shown in the help bar
    pub fn name(self) -> &'static str {
        match self {
            DisplayTable::Ascii => "ASCII",
            DisplayTable::Ebcdic => "EBCDIC",
        }
    }
}
