//! Text cleanup for the export path.
//!
//! The PDF fonts are the standard Helvetica faces with a single-byte Latin
//! encoding, so every string written to a document passes through here first.

/// Substitute for characters outside the single-byte repertoire
pub const PLACEHOLDER: char = '?';

pub fn is_representable(c: char) -> bool {
    (c as u32) <= 0xFF
}

/// Replaces every character above U+00FF with [`PLACEHOLDER`]
pub fn latin1_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if is_representable(c) { c } else { PLACEHOLDER })
        .collect()
}

/// Encodes text as single-byte Latin, one byte per character
pub fn to_latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            if is_representable(c) {
                c as u32 as u8
            } else {
                PLACEHOLDER as u8
            }
        })
        .collect()
}

/// Normalizes whitespace for single-line cells: tabs and line breaks become spaces
pub fn single_line(text: &str) -> String {
    latin1_lossy(text)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
