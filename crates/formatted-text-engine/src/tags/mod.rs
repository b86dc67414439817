//! Inline markup tags.
//!
//! A tag token is the two-character prefix `{[`, a component body and the
//! two-character postfix `]}`. The body grammar is
//! `('/')? TagName ('#' Label)? (':' Arg (',' Arg)*)?`; reserved tokens
//! inside an argument must be wrapped in a matched `"` pair, which disables
//! token recognition until the closing quote.
//!
//! - **`parser`**: the component state machine (one `{[…]}` token).
//! - **`component`**: [`TagComponent`], a parsed token anchored into the
//!   buffer, opening or closing.
//! - **`tag`**: [`Tag`], an opening component paired with an optional
//!   closing component of the same name.
//! - **`engine`**: re-parsing after edits, open/close pairing, empty-tag
//!   removal.

pub mod component;
pub(crate) mod engine;
pub(crate) mod parser;
pub mod tag;

pub use component::{TagComponent, TagComponentKind};
pub use tag::Tag;

/// Two-character sequence opening a tag component.
pub const TAG_PREFIX: &str = "{[";

/// Two-character sequence closing a tag component.
pub const TAG_POSTFIX: &str = "]}";
