use std::fmt;

use crate::editing::line::FormattedLine;
use crate::tags::Tag;

/// Mutation notifications emitted by a [`FormattedText`] buffer.
///
/// Every primitive mutation dispatches at most one callback of the matching
/// kind. Callbacks are consumers, not validators: they return nothing and
/// cannot veto or fail an operation.
///
/// [`FormattedText`]: crate::editing::FormattedText
#[derive(Default)]
pub struct Callbacks {
    /// A line was inserted and indexed.
    pub on_line_added: Option<Box<dyn FnMut(&FormattedLine)>>,
    /// A line was removed. Fires before any tag-preservation reinsertion.
    pub on_line_removed: Option<Box<dyn FnMut(&FormattedLine)>>,
    /// Content within an existing line changed.
    pub on_line_changed: Option<Box<dyn FnMut(&FormattedLine)>>,
    /// The whole buffer was cleared.
    pub on_text_cleared: Option<Box<dyn FnMut()>>,
    /// A tag was created by pairing.
    pub on_tag_added: Option<Box<dyn FnMut(&Tag)>>,
    /// A tag was dissolved or purged.
    pub on_tag_removed: Option<Box<dyn FnMut(&Tag)>>,
    /// All tags were dropped together with the text.
    pub on_tags_cleared: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_line_added", &self.on_line_added.is_some())
            .field("on_line_removed", &self.on_line_removed.is_some())
            .field("on_line_changed", &self.on_line_changed.is_some())
            .field("on_text_cleared", &self.on_text_cleared.is_some())
            .field("on_tag_added", &self.on_tag_added.is_some())
            .field("on_tag_removed", &self.on_tag_removed.is_some())
            .field("on_tags_cleared", &self.on_tags_cleared.is_some())
            .finish()
    }
}
