//! Word-wrap break opportunities from UAX #29 word boundaries.

use crate::text::OBJECT_MARKER;
use unicode_segmentation::UnicodeSegmentation;

/// Whether a line may break after a segment ending in `last`.
fn breaks_after(last: char) -> bool {
    last.is_whitespace() || (!last.is_alphanumeric() && last != OBJECT_MARKER)
}

/// Char offsets (relative to `text`, never 0) where a line may break.
///
/// A word boundary is a break opportunity when the segment before it ends
/// in whitespace or punctuation, or when an embedded object marker starts
/// right after it. The boundary right after a marker is never one.
pub fn break_opportunities(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut offset = 0usize;
    let mut previous_last: Option<char> = None;
    text.split_word_bounds().filter_map(move |segment| {
        let start = offset;
        offset += segment.chars().count();
        let before_object = segment.starts_with(OBJECT_MARKER);
        let allowed = start > 0 && (before_object || previous_last.is_some_and(breaks_after));
        previous_last = segment.chars().next_back();
        allowed.then_some(start)
    })
}

/// The last break opportunity at or before `limit` chars.
#[must_use]
pub fn last_break_opportunity(text: &str, limit: usize) -> Option<usize> {
    break_opportunities(text)
        .take_while(|&offset| offset <= limit)
        .last()
}
