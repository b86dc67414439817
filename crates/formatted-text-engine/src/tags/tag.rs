use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::editing::text::FormattedText;
use crate::tags::component::TagComponent;
use crate::types::{TextLength, TextOffset, UNTIL_THE_END};

struct TagData {
    opening: TagComponent,
    closing: Option<TagComponent>,
}

/// An opening tag component paired with an optional closing component of
/// the same name.
///
/// `Tag` is a cloneable handle; the buffer's tag list and callers share the
/// same pairing. A tag is valid while its opening component is, and closed
/// while it additionally holds a valid closing component. The *outer* range
/// spans the whole tagged region including both components; the *inner*
/// range is the content strictly between them. Both extend to the end of
/// the text ([`UNTIL_THE_END`]) for unclosed tags.
#[derive(Clone)]
pub struct Tag {
    data: Rc<RefCell<TagData>>,
}

impl Tag {
    pub(crate) fn new(opening: TagComponent) -> Self {
        Self {
            data: Rc::new(RefCell::new(TagData {
                opening,
                closing: None,
            })),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.data.borrow().opening.is_valid()
    }

    pub fn is_closed(&self) -> bool {
        self.data
            .borrow()
            .closing
            .as_ref()
            .is_some_and(TagComponent::is_valid)
    }

    /// The tag name used for pairing (the opening component's name).
    pub fn name(&self) -> String {
        self.data.borrow().opening.name().to_string()
    }

    pub fn opening(&self) -> TagComponent {
        self.data.borrow().opening.clone()
    }

    pub fn closing(&self) -> Option<TagComponent> {
        self.data.borrow().closing.clone()
    }

    pub(crate) fn set_closing(&self, closing: TagComponent) {
        self.data.borrow_mut().closing = Some(closing);
    }

    /// Absolute range strictly between the opening and closing components,
    /// `None` when the tag is invalid or nothing lies between them.
    pub fn inner_range(&self) -> Option<(TextOffset, TextLength)> {
        if !self.is_valid() {
            return None;
        }
        let start = self.opening().end_offset()? + 1;
        if !self.is_closed() {
            return Some((start, UNTIL_THE_END));
        }
        let end = self.closing()?.start_offset()?;
        let len = end.checked_sub(start)?;
        if len == 0 {
            return None;
        }
        Some((start, len))
    }

    /// Absolute range from the opening component's first character to the
    /// closing component's last, `None` when the tag is invalid or its
    /// components are out of order.
    pub fn outer_range(&self) -> Option<(TextOffset, TextLength)> {
        if !self.is_valid() {
            return None;
        }
        let start = self.opening().start_offset()?;
        if !self.is_closed() {
            return Some((start, UNTIL_THE_END));
        }
        let end = self.closing()?.end_offset()?;
        Some((start, end.checked_sub(start)? + 1))
    }

    /// Text between the components, or an empty string.
    pub fn contents(&self, text: &FormattedText) -> String {
        match self.inner_range() {
            Some((start, len)) => text.substr(start, len),
            None => String::new(),
        }
    }

    /// The whole tagged region including both components.
    pub fn tag_string(&self, text: &FormattedText) -> String {
        match self.outer_range() {
            Some((start, len)) => text.substr(start, len),
            None => String::new(),
        }
    }

    pub fn opening_string(&self, text: &FormattedText) -> String {
        self.opening().tag_string(text)
    }

    pub fn closing_string(&self, text: &FormattedText) -> String {
        self.closing()
            .map(|closing| closing.tag_string(text))
            .unwrap_or_default()
    }

    pub fn label(&self) -> Option<String> {
        self.opening().label().map(str::to_string)
    }

    pub fn attributes(&self) -> Option<Vec<String>> {
        self.opening().attributes().map(<[String]>::to_vec)
    }

    /// Whether two handles refer to the same tag.
    pub fn ptr_eq(a: &Tag, b: &Tag) -> bool {
        Rc::ptr_eq(&a.data, &b.data)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("name", &self.name())
            .field("closed", &self.is_closed())
            .field("outer", &self.outer_range())
            .finish()
    }
}
