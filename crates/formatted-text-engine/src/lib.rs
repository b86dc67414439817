//! Line-oriented text buffer maintaining two parallel views of its
//! content: the raw *unformatted* text and a *formatted* projection with
//! all recognized `{[…]}` tag tokens elided. Supports point insertions,
//! range deletions, cross-line moves, persistent anchor points that
//! survive edits, and lazy tag parsing with open/close pairing.

pub mod editing;
pub mod tags;
pub mod types;

// Re-export key types for easier usage
pub use editing::{
    AnchorPoint, Callbacks, CharFlags, EditError, FormattedLine, FormattedText, TextLine,
};
pub use tags::{TAG_POSTFIX, TAG_PREFIX, Tag, TagComponent, TagComponentKind};
pub use types::{
    CharOffset, END_OF_TEXT, INVALID_LINE_INDEX, LAST_CHAR, LAST_LINE, LineIndex, ShiftOffset,
    TextLength, TextOffset, UNTIL_THE_END,
};
