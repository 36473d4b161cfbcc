//! Change descriptors returned by buffer edits.

/// What an edit touched, in the coordinates of the text *before* the edit.
///
/// `edit_begin..edit_end` is the replaced character range. The layout range
/// is at least as wide and also covers trailing text whose paragraph or base
/// style changed as a side effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextChange {
    pub edit_begin: usize,
    pub edit_end: usize,
    pub layout_begin: usize,
    pub layout_end: usize,
    /// New length minus old length.
    pub length_delta: isize,
    /// The cached layout cannot be patched and must be rebuilt.
    pub full_relayout: bool,
    /// Paragraph metrics (indents, spacing, heading) may have changed.
    pub paragraph_style_changed: bool,
    /// No character was inserted or removed.
    pub style_only: bool,
}

impl TextChange {
    /// A change that only restyled `begin..end`.
    #[must_use]
    pub const fn restyle(begin: usize, end: usize) -> Self {
        Self {
            edit_begin: begin,
            edit_end: end,
            layout_begin: begin,
            layout_end: end,
            length_delta: 0,
            full_relayout: false,
            paragraph_style_changed: false,
            style_only: true,
        }
    }

    /// A restyle of the whole `len` characters that needs a full relayout.
    #[must_use]
    pub const fn full(len: usize) -> Self {
        Self {
            full_relayout: true,
            ..Self::restyle(0, len)
        }
    }

    /// End of the replacement in post-edit coordinates.
    #[must_use]
    pub const fn new_edit_end(&self) -> usize {
        self.edit_end.saturating_add_signed(self.length_delta)
    }
}
