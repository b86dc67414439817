//! Offset vocabulary shared across the engine.
//!
//! Three coordinate systems coexist and must not be mixed up:
//!
//! - **Absolute unformatted offsets** (`TextOffset`): index into the
//!   concatenation of all lines joined by a single `'\n'`.
//! - **Absolute formatted offsets**: same, but over the tag-stripped
//!   concatenation.
//! - **Line-relative offsets** (`CharOffset`): index within a single line,
//!   0-based, counted in code points.

/// Length of a text range, counted in code points.
pub type TextLength = usize;

/// Absolute character offset into the buffer.
pub type TextOffset = usize;

/// Index of a line within the buffer.
pub type LineIndex = usize;

/// Character offset within a single line.
pub type CharOffset = usize;

/// Signed offset delta applied when anchors are shifted by an edit.
pub type ShiftOffset = isize;

/// Sentinel line index meaning "append at the end" in insertion APIs.
pub const LAST_LINE: LineIndex = LineIndex::MAX;

/// Line index of a line that is not (or no longer) part of a buffer.
pub const INVALID_LINE_INDEX: LineIndex = LineIndex::MAX;

/// Sentinel character offset meaning "at the end of the line".
pub const LAST_CHAR: CharOffset = CharOffset::MAX;

/// Sentinel length meaning "to the end of the range".
pub const UNTIL_THE_END: TextLength = TextLength::MAX;

/// Sentinel absolute offset meaning "end of the text".
pub const END_OF_TEXT: TextOffset = TextOffset::MAX;

/// Applies a signed delta to an unsigned offset, saturating at zero.
pub(crate) fn shift_offset(offset: TextOffset, delta: ShiftOffset) -> TextOffset {
    offset.saturating_add_signed(delta)
}
