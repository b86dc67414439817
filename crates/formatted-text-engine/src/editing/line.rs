use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::editing::anchor::AnchorPoint;
use crate::editing::text_line::{CharFlags, TextLine};
use crate::tags::TagComponent;
use crate::tags::parser::ParsedComponent;
use crate::types::{
    CharOffset, INVALID_LINE_INDEX, LAST_CHAR, LineIndex, ShiftOffset, TextLength, TextOffset,
    UNTIL_THE_END, shift_offset,
};

pub(crate) struct LineData {
    unformatted: TextLine,
    formatted: TextLine,
    formatted_dirty: bool,
    formatted_start_offset: TextOffset,
    /// Per-char maps between the two views, rebuilt with the projection.
    /// `unf_to_fmt[i]` is the number of visible characters before
    /// unformatted index `i`; `fmt_to_unf[j]` is the unformatted index of
    /// the `j`-th visible character.
    unf_to_fmt: Vec<CharOffset>,
    fmt_to_unf: Vec<CharOffset>,
    index: LineIndex,
    start_anchor: AnchorPoint,
    /// Tag components on this line, ordered by start offset.
    components: Vec<TagComponent>,
    /// Registry of every anchor attached to this line (including the
    /// line-start anchor). Weak: holders decide anchor lifetime.
    anchors: Vec<Weak<RefCell<crate::editing::anchor::AnchorData>>>,
}

/// One line of a [`FormattedText`] buffer: the raw text, its tag components,
/// its anchors and the lazily regenerated formatted projection.
///
/// `FormattedLine` is a cloneable handle. Mutation goes through the owning
/// buffer so that offsets, anchors and tags stay consistent; the handle
/// itself only exposes queries.
///
/// [`FormattedText`]: crate::editing::FormattedText
#[derive(Clone)]
pub struct FormattedLine {
    data: Rc<RefCell<LineData>>,
}

impl FormattedLine {
    pub(crate) fn new(text: &str) -> Self {
        debug_assert!(!text.contains('\n'), "line text must not contain newlines");
        let start_anchor = AnchorPoint::new_line_start();
        let line = Self {
            data: Rc::new(RefCell::new(LineData {
                unformatted: TextLine::new(text),
                formatted: TextLine::default(),
                formatted_dirty: true,
                formatted_start_offset: 0,
                unf_to_fmt: Vec::new(),
                fmt_to_unf: Vec::new(),
                index: INVALID_LINE_INDEX,
                start_anchor: start_anchor.clone(),
                components: Vec::new(),
                anchors: Vec::new(),
            })),
        };
        start_anchor.set_line(&line);
        line
    }

    pub(crate) fn from_data(data: Rc<RefCell<LineData>>) -> Self {
        Self { data }
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<LineData>> {
        Rc::downgrade(&self.data)
    }

    /// Whether two handles refer to the same line.
    pub fn ptr_eq(a: &FormattedLine, b: &FormattedLine) -> bool {
        Rc::ptr_eq(&a.data, &b.data)
    }

    // ---- queries -----------------------------------------------------

    pub fn index(&self) -> LineIndex {
        self.data.borrow().index
    }

    /// Code-point length of the line, excluding the implicit newline.
    pub fn len(&self) -> TextLength {
        self.data.borrow().unformatted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().unformatted.is_empty()
    }

    /// Length including the implicit trailing newline.
    pub fn abs_len(&self) -> TextLength {
        self.data.borrow().unformatted.abs_len()
    }

    /// Absolute offset of the line's first character.
    pub fn start_offset(&self) -> TextOffset {
        self.start_anchor().resolved_offset()
    }

    /// Absolute offset of the line's last character, or `None` for an empty
    /// line.
    pub fn end_offset(&self) -> Option<TextOffset> {
        (!self.is_empty()).then(|| self.start_offset() + self.len() - 1)
    }

    /// Absolute offset of the implicit newline terminating the line.
    pub fn abs_end_offset(&self) -> TextOffset {
        self.start_offset() + self.abs_len() - 1
    }

    pub fn text(&self) -> String {
        self.data.borrow().unformatted.text()
    }

    pub fn char_at(&self, offset: CharOffset) -> Option<char> {
        self.data.borrow().unformatted.char_at(offset)
    }

    /// Flags of the character at `offset`; tag flags are refreshed together
    /// with the formatted projection.
    pub fn char_flags(&self, offset: CharOffset) -> Option<CharFlags> {
        self.format();
        self.data.borrow().unformatted.flags_at(offset)
    }

    pub fn substr(&self, offset: CharOffset, len: TextLength) -> String {
        self.data.borrow().unformatted.substr(offset, len)
    }

    /// Converts an absolute offset to a line-relative one, when it falls
    /// inside this line (the implicit newline included).
    pub fn relative_offset(&self, offset: TextOffset) -> Option<CharOffset> {
        self.is_in_range(offset, 1)
            .then(|| offset - self.start_offset())
    }

    /// Whether `[offset, offset + len)` lies within this line, the implicit
    /// newline included.
    pub fn is_in_range(&self, offset: TextOffset, len: TextLength) -> bool {
        len > 0
            && offset >= self.start_offset()
            && offset.saturating_add(len - 1) <= self.abs_end_offset()
    }

    pub fn start_anchor(&self) -> AnchorPoint {
        self.data.borrow().start_anchor.clone()
    }

    /// Tag components on this line, ordered by start offset.
    pub fn components(&self) -> Vec<TagComponent> {
        self.data.borrow().components.clone()
    }

    /// Live anchors currently attached to this line.
    pub fn anchors(&self) -> Vec<AnchorPoint> {
        self.data
            .borrow()
            .anchors
            .iter()
            .filter_map(Weak::upgrade)
            .map(AnchorPoint::from_data)
            .collect()
    }

    // ---- formatted projection ----------------------------------------

    /// Visible (tag-stripped) length of the line.
    pub fn formatted_len(&self) -> TextLength {
        self.format();
        self.data.borrow().formatted.len()
    }

    pub fn abs_formatted_len(&self) -> TextLength {
        self.formatted_len() + 1
    }

    pub fn formatted_text(&self) -> String {
        self.format();
        self.data.borrow().formatted.text()
    }

    pub fn formatted_start_offset(&self) -> TextOffset {
        self.data.borrow().formatted_start_offset
    }

    pub(crate) fn set_formatted_start_offset(&self, offset: TextOffset) {
        self.data.borrow_mut().formatted_start_offset = offset;
    }

    /// Line-relative unformatted offset → line-relative formatted offset.
    /// Characters inside a tag map to the position where the tag collapses.
    pub fn formatted_char_offset(&self, offset: CharOffset) -> CharOffset {
        self.format();
        let data = self.data.borrow();
        data.unf_to_fmt
            .get(offset)
            .copied()
            .unwrap_or(data.fmt_to_unf.len())
    }

    /// Line-relative formatted offset → line-relative unformatted offset.
    pub fn unformatted_char_offset(&self, offset: CharOffset) -> CharOffset {
        self.format();
        let data = self.data.borrow();
        data.fmt_to_unf
            .get(offset)
            .copied()
            .unwrap_or(data.unf_to_fmt.len())
    }

    /// Regenerates the formatted projection if the line changed: every
    /// character covered by a valid tag component is elided, the offset maps
    /// are rebuilt and tag flags are restamped.
    fn format(&self) {
        let mut data = self.data.borrow_mut();
        if !data.formatted_dirty {
            return;
        }
        data.formatted_dirty = false;

        let line_start = data.start_anchor.resolved_offset();
        let ranges: Vec<(CharOffset, CharOffset)> = data
            .components
            .iter()
            .filter(|component| component.is_valid())
            .filter_map(|component| {
                let start = component.start_offset()?.checked_sub(line_start)?;
                let end = component.end_offset()?.checked_sub(line_start)?;
                Some((start, end))
            })
            .collect();

        let data = &mut *data;
        data.formatted.clear();
        data.unf_to_fmt.clear();
        data.fmt_to_unf.clear();
        let chars = data.unformatted.chars().to_vec();
        let mut range_idx = 0;
        for (i, &c) in chars.iter().enumerate() {
            while range_idx < ranges.len() && i > ranges[range_idx].1 {
                range_idx += 1;
            }
            let in_tag =
                range_idx < ranges.len() && i >= ranges[range_idx].0 && i <= ranges[range_idx].1;
            data.unf_to_fmt.push(data.formatted.len());
            if in_tag {
                data.unformatted.set_flags(i, CharFlags::TAG);
            } else {
                data.unformatted.set_flags(i, CharFlags::NONE);
                data.fmt_to_unf.push(i);
                data.formatted.push(c);
            }
        }
    }

    pub(crate) fn mark_formatted_dirty(&self) {
        self.data.borrow_mut().formatted_dirty = true;
    }

    // ---- mutation (buffer-internal) ----------------------------------

    pub(crate) fn set_index(&self, index: LineIndex) {
        self.data.borrow_mut().index = index;
    }

    /// Inserts `s` at `char_offset` (or at the end for [`LAST_CHAR`]),
    /// shifting anchors strictly behind the insertion point and the next
    /// line-start chain by the inserted length. Anchors exactly at the
    /// insertion point stay put.
    pub(crate) fn insert_str(&self, s: &str, char_offset: CharOffset) -> Option<CharOffset> {
        let char_offset = if char_offset == LAST_CHAR {
            self.len()
        } else {
            char_offset
        };
        let inserted = s.chars().count();
        {
            let mut data = self.data.borrow_mut();
            if !data.unformatted.insert(s, char_offset) {
                return None;
            }
            data.formatted_dirty = true;
        }
        self.shift_anchors_for_insert(char_offset, inserted);
        Some(char_offset)
    }

    /// Appends `s` and returns the offset it was appended at.
    pub(crate) fn append_str(&self, s: &str) -> CharOffset {
        let offset = self.len();
        let appended = self.insert_str(s, offset);
        debug_assert!(appended.is_some());
        offset
    }

    /// Erases `[start_offset, start_offset + len)`, invalidating anchors in
    /// the erased range (unless out-of-bounds is allowed) and shifting the
    /// rest back. Returns the number of characters actually erased.
    pub(crate) fn erase(&self, start_offset: CharOffset, len: TextLength) -> Option<TextLength> {
        let erased = {
            let mut data = self.data.borrow_mut();
            let erased = data.unformatted.erase(start_offset, len)?;
            data.formatted_dirty = true;
            erased
        };
        self.shift_anchors_for_erase(start_offset, erased);
        Some(erased)
    }

    pub(crate) fn can_erase(&self, start_offset: CharOffset, len: TextLength) -> bool {
        self.data.borrow().unformatted.can_erase(start_offset, len)
    }

    fn shift_anchors_for_insert(&self, char_offset: CharOffset, len: TextLength) {
        if len == 0 {
            return;
        }
        let abs_at = self.start_offset() + char_offset;
        let start_anchor = self.start_anchor();
        for child in start_anchor.children() {
            if child.resolved_offset() > abs_at {
                child.shift_by(len as ShiftOffset);
            }
        }
        if let Some(next) = start_anchor.next_line_start() {
            next.shift_by(len as ShiftOffset);
        }
    }

    fn shift_anchors_for_erase(&self, start_offset: CharOffset, erased: TextLength) {
        if erased == 0 {
            return;
        }
        let abs_start = self.start_offset() + start_offset;
        let abs_end = abs_start + erased;
        let start_anchor = self.start_anchor();
        for child in start_anchor.children() {
            let offset = child.resolved_offset();
            if offset >= abs_start && offset < abs_end {
                if !child.allow_out_of_bounds() {
                    child.clear_line();
                    child.clear_parent();
                }
            } else if offset >= abs_end {
                child.shift_by(-(erased as ShiftOffset));
            }
        }
        if let Some(next) = start_anchor.next_line_start() {
            next.shift_by(-(erased as ShiftOffset));
        }
    }

    /// Detaches the child anchors inside `[start_offset, start_offset +
    /// len)` from this line and returns owning handles; offsets stay at the
    /// last resolved position.
    pub(crate) fn detach_anchor_points(
        &self,
        start_offset: CharOffset,
        len: TextLength,
    ) -> Vec<AnchorPoint> {
        let len = if len == UNTIL_THE_END {
            self.abs_len().saturating_sub(start_offset)
        } else {
            len
        };
        let abs_start = self.start_offset() + start_offset;
        let mut detached = Vec::new();
        for child in self.start_anchor().children() {
            if !child.is_in_range(abs_start, len) {
                continue;
            }
            child.clear_line();
            child.clear_parent();
            detached.push(child);
        }
        detached
    }

    /// Re-attaches previously detached anchors under this line's line-start,
    /// shifting each one's offset by `shift`.
    pub(crate) fn attach_anchor_points(&self, anchors: &[AnchorPoint], shift: ShiftOffset) {
        let start_anchor = self.start_anchor();
        for anchor in anchors {
            let offset = anchor.raw_offset();
            anchor.set_parent(&start_anchor);
            anchor.set_line(self);
            anchor.set_offset(shift_offset(offset, shift));
        }
    }

    /// Creates an anchor at `char_offset`. Fails when the offset lies past
    /// the last character and out-of-bounds is not allowed.
    pub fn create_anchor(
        &self,
        char_offset: CharOffset,
        allow_out_of_bounds: bool,
    ) -> Option<AnchorPoint> {
        if !allow_out_of_bounds && char_offset >= self.len() {
            return None;
        }
        let anchor = AnchorPoint::new(allow_out_of_bounds);
        anchor.set_line(self);
        anchor.set_parent(&self.start_anchor());
        anchor.set_offset(self.start_offset() + char_offset);
        Some(anchor)
    }

    /// Builds a tag component from a successful parse at `char_offset`,
    /// anchoring it at its two endpoint characters.
    pub(crate) fn make_component(
        &self,
        char_offset: CharOffset,
        parsed: ParsedComponent,
    ) -> Option<TagComponent> {
        let start = self.create_anchor(char_offset, false)?;
        let end = self.create_anchor(char_offset + parsed.len - 1, false)?;
        Some(TagComponent::new(parsed, start, end))
    }

    pub(crate) fn retain_components(&self, mut keep: impl FnMut(&TagComponent) -> bool) {
        self.data.borrow_mut().components.retain(|c| keep(c));
    }

    /// Inserts a component keeping the list ordered by start offset.
    pub(crate) fn insert_component_sorted(&self, component: TagComponent) {
        let offset = component.start_offset().unwrap_or(TextOffset::MAX);
        let mut data = self.data.borrow_mut();
        let at = data
            .components
            .iter()
            .position(|c| c.start_offset().unwrap_or(TextOffset::MAX) > offset)
            .unwrap_or(data.components.len());
        data.components.insert(at, component);
        data.formatted_dirty = true;
    }

    /// Invalidates every anchor attached to this line. Used when the line is
    /// removed from the buffer: external holders keep their handles but see
    /// them expire.
    pub(crate) fn invalidate_anchors(&self) {
        for anchor in self.anchors() {
            anchor.clear_line();
            anchor.clear_parent();
        }
        self.data.borrow_mut().anchors.clear();
    }

    // ---- anchor registry ---------------------------------------------

    pub(crate) fn attach_anchor(&self, anchor: &AnchorPoint) {
        let mut data = self.data.borrow_mut();
        data.anchors.push(anchor.downgrade_data());
    }

    pub(crate) fn detach_anchor(&self, anchor: &AnchorPoint) {
        let target = anchor.downgrade_data();
        let mut data = self.data.borrow_mut();
        data.anchors
            .retain(|weak| weak.strong_count() > 0 && !weak.ptr_eq(&target));
    }
}

impl fmt::Debug for FormattedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormattedLine")
            .field("index", &self.index())
            .field("text", &self.text())
            .finish()
    }
}
