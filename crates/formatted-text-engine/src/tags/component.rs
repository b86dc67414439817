use std::fmt;
use std::rc::Rc;

use crate::editing::anchor::AnchorPoint;
use crate::editing::text::FormattedText;
use crate::tags::parser::ParsedComponent;
use crate::types::{TextLength, TextOffset};

/// The two component variants. Only opening components carry a label and
/// attributes; a closing component is bare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagComponentKind {
    Opening {
        label: String,
        attributes: Vec<String>,
    },
    Closing,
}

struct ComponentData {
    name: String,
    kind: TagComponentKind,
    start: AnchorPoint,
    end: AnchorPoint,
}

/// One parsed `{[…]}` token, anchored at its first and last character.
///
/// Components exclusively own their endpoint anchors; the owning line and
/// any [`Tag`] share the component itself. A component stays valid while
/// both anchors are valid and the end anchor resolves strictly after the
/// start anchor.
///
/// [`Tag`]: crate::tags::Tag
#[derive(Clone)]
pub struct TagComponent {
    data: Rc<ComponentData>,
}

impl TagComponent {
    pub(crate) fn new(parsed: ParsedComponent, start: AnchorPoint, end: AnchorPoint) -> Self {
        let kind = if parsed.closing {
            TagComponentKind::Closing
        } else {
            TagComponentKind::Opening {
                label: parsed.label,
                attributes: parsed.attributes,
            }
        };
        Self {
            data: Rc::new(ComponentData {
                name: parsed.name,
                kind,
                start,
                end,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn kind(&self) -> &TagComponentKind {
        &self.data.kind
    }

    pub fn is_opening(&self) -> bool {
        matches!(self.data.kind, TagComponentKind::Opening { .. })
    }

    pub fn is_closing(&self) -> bool {
        !self.is_opening()
    }

    /// Label of an opening component; `None` on closing components.
    pub fn label(&self) -> Option<&str> {
        match &self.data.kind {
            TagComponentKind::Opening { label, .. } => Some(label),
            TagComponentKind::Closing => None,
        }
    }

    /// Attributes of an opening component; `None` on closing components.
    pub fn attributes(&self) -> Option<&[String]> {
        match &self.data.kind {
            TagComponentKind::Opening { attributes, .. } => Some(attributes),
            TagComponentKind::Closing => None,
        }
    }

    pub fn start_anchor(&self) -> &AnchorPoint {
        &self.data.start
    }

    pub fn end_anchor(&self) -> &AnchorPoint {
        &self.data.end
    }

    /// Absolute offset of the component's first character.
    pub fn start_offset(&self) -> Option<TextOffset> {
        self.data.start.offset()
    }

    /// Absolute offset of the component's last character.
    pub fn end_offset(&self) -> Option<TextOffset> {
        self.data.end.offset()
    }

    pub fn is_valid(&self) -> bool {
        self.data.start.is_valid()
            && self.data.end.is_valid()
            && self.data.end.resolved_offset() > self.data.start.resolved_offset()
    }

    /// Component length in code points, `None` when the component is no
    /// longer anchored to live text.
    pub fn len(&self) -> Option<TextLength> {
        let start = self.start_offset()?;
        let end = self.end_offset()?;
        end.checked_sub(start).map(|len| len + 1)
    }

    /// The component's text as currently present in the buffer, or an empty
    /// string when invalid.
    pub fn tag_string(&self, text: &FormattedText) -> String {
        let (Some(start), Some(end)) = (self.start_offset(), self.end_offset()) else {
            return String::new();
        };
        if end <= start {
            return String::new();
        }
        text.substr(start, end - start + 1)
    }

    /// Drops the component's anchors out of the buffer, expiring it for
    /// every holder. Used when an edit forces a re-parse of its range.
    pub(crate) fn invalidate(&self) {
        for anchor in [&self.data.start, &self.data.end] {
            anchor.clear_line();
            anchor.clear_parent();
        }
    }

    /// Whether two handles refer to the same component.
    pub fn ptr_eq(a: &TagComponent, b: &TagComponent) -> bool {
        Rc::ptr_eq(&a.data, &b.data)
    }
}

impl fmt::Debug for TagComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagComponent")
            .field("name", &self.data.name)
            .field("kind", &self.data.kind)
            .field("range", &(self.start_offset(), self.end_offset()))
            .finish()
    }
}
