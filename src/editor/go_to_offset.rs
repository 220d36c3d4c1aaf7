//! Parsing for the "Goto" prompt

/// Width of the goto input box: 9 hex digits covers 64 GiB
pub const GOTO_INPUT_WIDTH: usize = 9;

/// Characters accepted by the goto prompt
pub const HEX_DIGITS: &str = "0123456789ABCDEF";

/// Parse a hexadecimal file offset, with or without a 0x/0X prefix
///
/// # Examples
/// - "400" -> Ok(1024)
/// - "0x400" -> Ok(1024)
/// - "invalid" -> Err(...)
pub fn parse_offset(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("Please enter an offset".to_string());
    }

    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err("Invalid hex value: missing digits after 0x".to_string());
    }

    u64::from_str_radix(digits, 16).map_err(|_| format!("Invalid hex offset: {}", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_offset("0"), Ok(0));
        assert_eq!(parse_offset("400"), Ok(1024));
        assert_eq!(parse_offset("1020"), Ok(0x1020));
        assert_eq!(parse_offset("0x400"), Ok(1024));
        assert_eq!(parse_offset("0X400"), Ok(1024));
        assert_eq!(parse_offset("ff"), Ok(255));
        assert_eq!(parse_offset("  ABCD  "), Ok(0xABCD));
        assert_eq!(parse_offset("FFFFFFFFF"), Ok(0xF_FFFF_FFFF));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_offset("").is_err());
        assert!(parse_offset("   ").is_err());
        assert!(parse_offset("0x").is_err());
        assert!(parse_offset("0xGGG").is_err());
        assert!(parse_offset("-1").is_err());
        assert!(parse_offset("12 34").is_err());
    }
}
