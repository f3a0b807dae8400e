//! Line wrapping: split overflowing text into column-width lines.
//!
//! Breaks prefer the last space at or before the column limit. The space
//! consumed as a break point is dropped, not carried onto either line.
//! With no space to break on, the text is hard-cut at the limit and one
//! more character is consumed after the cut, which guarantees every pass
//! shrinks the remaining text.
//!
//! All lengths are counted in extended grapheme clusters.

use unicode_segmentation::UnicodeSegmentation;

/// Number of characters (grapheme clusters) in `text`.
#[inline]
pub fn char_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset of the character at index `n`, or `text.len()` past the end.
pub(crate) fn byte_offset(text: &str, n: usize) -> usize {
    text.grapheme_indices(true)
        .nth(n)
        .map_or(text.len(), |(offset, _)| offset)
}

/// Wrap `text` to lines of at most `width` characters.
///
/// Text that already fits is returned unchanged as a single line, even if
/// it contains spaces. The final line is pushed as-is; a hard cut that
/// lands exactly on the end of the text leaves an empty final line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= width {
        return vec![text.to_owned()];
    }

    let mut lines = Vec::new();
    let mut rest = graphemes.as_slice();

    while rest.len() > width {
        let (line, consumed) = match break_point(rest, width) {
            Some(space) => (&rest[..space], space + 1),
            None => (&rest[..width], width + 1),
        };
        lines.push(line.concat());
        rest = &rest[consumed..];
    }

    lines.push(rest.concat());
    lines
}

/// Index of the last space in `rest[1..=width]`.
///
/// Requires `rest.len() > width`.
fn break_point(rest: &[&str], width: usize) -> Option<usize> {
    (1..=width).rev().find(|&i| rest[i] == " ")
}
