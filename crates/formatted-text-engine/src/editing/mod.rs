//! The editing core: lines, anchors and the edit engine.
//!
//! A [`FormattedText`] buffer is an ordered sequence of [`FormattedLine`]s.
//! Each line keeps two parallel views of its content: the *unformatted*
//! view with every character the caller inserted, and a lazily regenerated
//! *formatted* view with all recognized tag tokens elided. Edits originate
//! at the buffer, delegate to the affected lines, re-run the tag engine
//! over the modified range, shift the downstream line-start anchors and
//! finally dispatch callbacks and mark the derived caches dirty.
//!
//! Positions handed out as [`AnchorPoint`]s survive edits: insertions and
//! deletions shift them, deleting their text invalidates them, and an
//! invalid anchor keeps answering queries with `None` for as long as a
//! handle exists. The line-start anchors form a doubly-linked chain through
//! the buffer, which is how a single edit propagates an offset shift to
//! every subsequent line.

pub mod anchor;
pub mod events;
pub mod line;
pub mod text;
pub mod text_line;

pub use anchor::AnchorPoint;
pub use events::Callbacks;
pub use line::FormattedLine;
pub use text::FormattedText;
pub use text_line::{CharFlags, TextLine};

use crate::types::{CharOffset, LineIndex, TextOffset};

/// Failures reported by the fallible edit operations.
///
/// Structural precondition failures are reported through this enum and
/// leave the buffer unchanged; a failure inside a composite operation (see
/// [`FormattedText::move_text`]) reports the step that failed without
/// rolling back already-committed sub-operations. Programmer-error
/// impossibilities (a line erase failing after `can_erase` succeeded,
/// anchors parenting themselves) panic instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("line index {0} is out of bounds")]
    LineOutOfBounds(LineIndex),
    #[error("character offset {offset} is out of bounds in line {line}")]
    CharOutOfBounds { line: LineIndex, offset: CharOffset },
    #[error("offset {0} is outside the text range")]
    OffsetOutOfBounds(TextOffset),
    #[error("move target lies inside the moved range")]
    MoveTargetInSource,
    #[error("move target became invalid during the move")]
    MoveTargetLost,
}
