//! Character classification used by the scanner.

/// Check if a byte is horizontal whitespace (newlines are significant).
#[inline]
pub fn is_white_space_single_line(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r')
}

/// Value of `ch` as a digit in any base up to 16, or 16 if it is not one.
#[inline]
pub fn digit_value(ch: char) -> u32 {
    ch.to_digit(16).unwrap_or(16)
}

/// Check if a character can start an identifier.
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_'
        || ch.is_ascii_alphabetic()
        || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

/// Check if a character can be part of an identifier.
pub fn is_identifier_part(ch: char) -> bool {
    ch == '_'
        || ch.is_ascii_alphanumeric()
        || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}
