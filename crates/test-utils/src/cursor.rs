// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Cursor marker helpers
//!
//! Tests write the caret position inline as `|`, e.g.
//! `SELECT | FROM dbo.Orders`. Offsets are character offsets, matching the
//! token model.

/// Marker character standing for the caret
pub const CURSOR_MARKER: char = '|';

/// Character offset of the cursor marker
pub fn get_cursor_position(input: &str) -> Option<usize> {
    input.chars().position(|c| c == CURSOR_MARKER)
}

/// Remove the cursor marker from input SQL
pub fn remove_cursor_marker(input: &str) -> String {
    input.replacen(CURSOR_MARKER, "", 1)
}

/// Split marked input into clean text and caret offset
pub fn split_cursor(input: &str) -> Option<(String, usize)> {
    let offset = get_cursor_position(input)?;
    Some((remove_cursor_marker(input), offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cursor() {
        let (text, offset) = split_cursor("SELECT | FROM t").unwrap();
        assert_eq!(text, "SELECT  FROM t");
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_char_offsets() {
        assert_eq!(get_cursor_position("N'é'|"), Some(4));
        assert!(split_cursor("SELECT 1").is_none());
    }
}
