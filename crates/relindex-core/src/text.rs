//! Text utilities: bounded literal search and line:column conversion.
//!
//! ## Coordinate Conventions
//!
//! - Byte offsets are **0-indexed**
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count Unicode scalar values, not bytes
//!
//! ## Bounded Search
//!
//! [`find_in_window`] locates a literal token inside a half-open byte window.
//! It is purely textual: occurrences inside comments or string literals that
//! fall within the window are matched like any other text.

// ============================================================================
// Bounded Search
// ============================================================================

/// Find the first occurrence of `needle` within `source[start..end)`.
///
/// Returns the absolute byte offset of the match. The whole match must lie
/// inside the window; a match that would extend past `end` is not found.
/// Returns `None` for an empty needle, an inverted window, a window past the
/// end of the source, or window bounds that are not on char boundaries.
pub fn find_in_window(source: &str, needle: &str, start: usize, end: usize) -> Option<usize> {
    if needle.is_empty() || start > end {
        return None;
    }
    let window = source.get(start..end)?;
    window.find(needle).map(|relative| start + relative)
}

// ============================================================================
// Position Conversion
// ============================================================================

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    let mut current_offset = 0usize;

    for ch in content.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/// Extract the text of `[offset, offset + length)`.
///
/// Returns `None` if the span extends beyond the content or splits a char.
pub fn extract(content: &str, offset: usize, length: usize) -> Option<&str> {
    content.get(offset..offset.checked_add(length)?)
}
