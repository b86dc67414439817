use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::editing::line::{FormattedLine, LineData};
use crate::types::{LineIndex, ShiftOffset, TextLength, TextOffset, UNTIL_THE_END, shift_offset};

/// Neighbour links and children of a line-start anchor.
#[derive(Default)]
pub(crate) struct LineStartLinks {
    prev: Weak<RefCell<AnchorData>>,
    next: Weak<RefCell<AnchorData>>,
    /// Anchors whose parent is this line-start. Weak: the buffer never keeps
    /// an anchor alive on its own.
    children: Vec<Weak<RefCell<AnchorData>>>,
}

/// The only behavioural split between anchors: line-starts cascade their
/// shifts down the chain of subsequent line-starts.
pub(crate) enum AnchorRole {
    Plain,
    LineStart(LineStartLinks),
}

pub(crate) struct AnchorData {
    /// Stored offset. Parent-relative when `parent` is set (the parent is
    /// always the owning line's line-start anchor), absolute otherwise.
    offset: TextOffset,
    allow_out_of_bounds: bool,
    line: Weak<RefCell<LineData>>,
    parent: Weak<RefCell<AnchorData>>,
    role: AnchorRole,
}

/// A persistent positional reference into a [`FormattedText`] buffer.
///
/// `AnchorPoint` is a cheap cloneable handle; all clones observe the same
/// position. The buffer adjusts anchors on every edit: insertions shift
/// anchors behind the insertion point, deletions invalidate anchors inside
/// the deleted range and shift the rest, and line removal invalidates every
/// anchor on the dying line. An anchor whose line is gone stays alive for as
/// long as any handle exists, but reports itself invalid: `offset`,
/// `line_index` and `line` all return `None`.
///
/// [`FormattedText`]: crate::editing::FormattedText
#[derive(Clone)]
pub struct AnchorPoint {
    data: Rc<RefCell<AnchorData>>,
}

impl AnchorPoint {
    pub(crate) fn new(allow_out_of_bounds: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(AnchorData {
                offset: 0,
                allow_out_of_bounds,
                line: Weak::new(),
                parent: Weak::new(),
                role: AnchorRole::Plain,
            })),
        }
    }

    pub(crate) fn new_line_start() -> Self {
        Self {
            data: Rc::new(RefCell::new(AnchorData {
                offset: 0,
                allow_out_of_bounds: false,
                line: Weak::new(),
                parent: Weak::new(),
                role: AnchorRole::LineStart(LineStartLinks::default()),
            })),
        }
    }

    /// An anchor is valid while the line it points into is alive.
    pub fn is_valid(&self) -> bool {
        self.data.borrow().line.strong_count() > 0
    }

    pub fn allow_out_of_bounds(&self) -> bool {
        self.data.borrow().allow_out_of_bounds
    }

    pub fn is_line_start(&self) -> bool {
        matches!(self.data.borrow().role, AnchorRole::LineStart(_))
    }

    /// Resolved absolute character offset, or `None` when invalid.
    pub fn offset(&self) -> Option<TextOffset> {
        self.is_valid().then(|| self.resolved_offset())
    }

    /// Index of the line this anchor is attached to, or `None` when invalid.
    pub fn line_index(&self) -> Option<LineIndex> {
        self.line().map(|line| line.index())
    }

    pub fn line(&self) -> Option<FormattedLine> {
        self.data
            .borrow()
            .line
            .upgrade()
            .map(FormattedLine::from_data)
    }

    /// Whether the resolved offset lies in `[start, start + len)`.
    /// Invalid anchors are in no range.
    pub fn is_in_range(&self, start: TextOffset, len: TextLength) -> bool {
        if len == 0 || !self.is_valid() {
            return false;
        }
        let offset = self.resolved_offset();
        offset >= start && (len == UNTIL_THE_END || offset < start + len)
    }

    /// Adjusts the resolved offset by `delta`. On a line-start anchor the
    /// delta additionally cascades to every subsequent line-start in the
    /// chain; their children follow implicitly because child offsets are
    /// stored parent-relative.
    pub fn shift_by(&self, delta: ShiftOffset) {
        {
            let mut data = self.data.borrow_mut();
            data.offset = shift_offset(data.offset, delta);
        }
        let mut next = self.next_weak();
        while let Some(anchor) = next.upgrade() {
            {
                let mut data = anchor.borrow_mut();
                data.offset = shift_offset(data.offset, delta);
            }
            next = match &anchor.borrow().role {
                AnchorRole::LineStart(links) => links.next.clone(),
                AnchorRole::Plain => Weak::new(),
            };
        }
    }

    /// Moves the anchor so that its resolved offset becomes `offset`,
    /// cascading like [`AnchorPoint::shift_by`].
    pub fn shift_to(&self, offset: TextOffset) {
        let delta = offset as ShiftOffset - self.resolved_offset() as ShiftOffset;
        self.shift_by(delta);
    }

    /// Sets the resolved absolute offset without cascading. With a parent
    /// set, the stored value becomes `offset - parent.offset()`.
    pub fn set_offset(&self, offset: TextOffset) {
        let parent_offset = self.parent().map_or(0, |p| p.resolved_offset());
        self.data.borrow_mut().offset = offset.saturating_sub(parent_offset);
    }

    /// Detaches the anchor from its line; it then reports invalid.
    pub fn clear_line(&self) {
        let line = self.data.borrow().line.upgrade();
        if let Some(line) = line {
            FormattedLine::from_data(line).detach_anchor(self);
        }
        self.data.borrow_mut().line = Weak::new();
    }

    // ---- crate-internal bookkeeping ----------------------------------

    pub(crate) fn from_data(data: Rc<RefCell<AnchorData>>) -> Self {
        Self { data }
    }

    pub(crate) fn downgrade_data(&self) -> Weak<RefCell<AnchorData>> {
        Rc::downgrade(&self.data)
    }

    /// Stored offset without parent resolution. Meaningful on detached
    /// anchors, where `clear_parent` has re-absolutized the value.
    pub(crate) fn raw_offset(&self) -> TextOffset {
        self.data.borrow().offset
    }

    /// Resolved offset regardless of validity.
    pub(crate) fn resolved_offset(&self) -> TextOffset {
        let mut total = self.data.borrow().offset;
        let mut parent = self.data.borrow().parent.upgrade();
        while let Some(p) = parent {
            let data = p.borrow();
            total += data.offset;
            parent = data.parent.upgrade();
        }
        total
    }

    pub(crate) fn set_line(&self, line: &FormattedLine) {
        self.clear_line();
        line.attach_anchor(self);
        self.data.borrow_mut().line = line.downgrade();
    }

    /// The line-start anchor this anchor is parented to, if any.
    pub fn parent(&self) -> Option<AnchorPoint> {
        self.data
            .borrow()
            .parent
            .upgrade()
            .map(|data| AnchorPoint { data })
    }

    /// Enrolls this anchor as a child of `parent` (a line-start anchor).
    /// The stored offset is left untouched; callers follow up with
    /// [`AnchorPoint::set_offset`] to fix the resolved position.
    pub(crate) fn set_parent(&self, parent: &AnchorPoint) {
        if Rc::ptr_eq(&self.data, &parent.data) {
            panic!("anchor cannot be the parent of itself");
        }
        debug_assert!(parent.is_line_start());
        self.clear_parent_link();
        parent.add_child(self);
        self.data.borrow_mut().parent = Rc::downgrade(&parent.data);
    }

    /// Removes the anchor from its parent. The stored offset is
    /// re-absolutized first so the anchor keeps reporting its last resolved
    /// position while detached.
    pub(crate) fn clear_parent(&self) {
        let resolved = self.resolved_offset();
        self.clear_parent_link();
        self.data.borrow_mut().offset = resolved;
    }

    fn clear_parent_link(&self) {
        let parent = self.data.borrow().parent.upgrade();
        if let Some(parent) = parent {
            AnchorPoint { data: parent }.remove_child(self);
        }
        self.data.borrow_mut().parent = Weak::new();
    }

    fn add_child(&self, child: &AnchorPoint) {
        let mut data = self.data.borrow_mut();
        if let AnchorRole::LineStart(links) = &mut data.role {
            links.children.push(Rc::downgrade(&child.data));
        }
    }

    fn remove_child(&self, child: &AnchorPoint) {
        let mut data = self.data.borrow_mut();
        if let AnchorRole::LineStart(links) = &mut data.role {
            links
                .children
                .retain(|weak| weak.strong_count() > 0 && !weak.ptr_eq(&Rc::downgrade(&child.data)));
        }
    }

    /// Snapshot of the currently live children of a line-start anchor.
    pub fn children(&self) -> Vec<AnchorPoint> {
        match &self.data.borrow().role {
            AnchorRole::LineStart(links) => links
                .children
                .iter()
                .filter_map(Weak::upgrade)
                .map(|data| AnchorPoint { data })
                .collect(),
            AnchorRole::Plain => Vec::new(),
        }
    }

    fn next_weak(&self) -> Weak<RefCell<AnchorData>> {
        match &self.data.borrow().role {
            AnchorRole::LineStart(links) => links.next.clone(),
            AnchorRole::Plain => Weak::new(),
        }
    }

    fn prev_weak(&self) -> Weak<RefCell<AnchorData>> {
        match &self.data.borrow().role {
            AnchorRole::LineStart(links) => links.prev.clone(),
            AnchorRole::Plain => Weak::new(),
        }
    }

    /// The next line's line-start anchor in the chain.
    pub fn next_line_start(&self) -> Option<AnchorPoint> {
        self.next_weak().upgrade().map(|data| AnchorPoint { data })
    }

    /// The previous line's line-start anchor in the chain.
    pub fn prev_line_start(&self) -> Option<AnchorPoint> {
        self.prev_weak().upgrade().map(|data| AnchorPoint { data })
    }

    fn set_next_weak(&self, next: Weak<RefCell<AnchorData>>) {
        let mut data = self.data.borrow_mut();
        if let AnchorRole::LineStart(links) = &mut data.role {
            links.next = next;
        }
    }

    fn set_prev_weak(&self, prev: Weak<RefCell<AnchorData>>) {
        let mut data = self.data.borrow_mut();
        if let AnchorRole::LineStart(links) = &mut data.role {
            links.prev = prev;
        }
    }

    /// Severs this line-start's forward link (and the neighbour's matching
    /// back link).
    pub(crate) fn clear_next_line_start(&self) {
        if let Some(next) = self.next_line_start()
            && next.prev_weak().ptr_eq(&Rc::downgrade(&self.data))
        {
            next.set_prev_weak(Weak::new());
        }
        self.set_next_weak(Weak::new());
    }

    pub(crate) fn clear_prev_line_start(&self) {
        if let Some(prev) = self.prev_line_start()
            && prev.next_weak().ptr_eq(&Rc::downgrade(&self.data))
        {
            prev.set_next_weak(Weak::new());
        }
        self.set_prev_weak(Weak::new());
    }

    /// Whether two handles refer to the same anchor.
    pub fn ptr_eq(a: &AnchorPoint, b: &AnchorPoint) -> bool {
        Rc::ptr_eq(&a.data, &b.data)
    }
}

/// Reciprocally connects two line-start anchors as chain neighbours.
pub(crate) fn link_line_starts(prev: &AnchorPoint, next: &AnchorPoint) {
    if AnchorPoint::ptr_eq(prev, next) {
        panic!("line-start anchor cannot neighbour itself");
    }
    debug_assert!(prev.is_line_start() && next.is_line_start());
    prev.set_next_weak(Rc::downgrade(&next.data));
    next.set_prev_weak(Rc::downgrade(&prev.data));
}

impl PartialEq for AnchorPoint {
    /// Anchors are equal when both are valid and resolve to the same offset.
    fn eq(&self, other: &Self) -> bool {
        self.is_valid() && other.is_valid() && self.resolved_offset() == other.resolved_offset()
    }
}

impl PartialOrd for AnchorPoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        (self.is_valid() && other.is_valid())
            .then(|| self.resolved_offset().cmp(&other.resolved_offset()))
    }
}

impl fmt::Debug for AnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorPoint")
            .field("valid", &self.is_valid())
            .field("offset", &self.offset())
            .field("line", &self.line_index())
            .field("line_start", &self.is_line_start())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::line::FormattedLine;

    fn line_with(text: &str) -> FormattedLine {
        let line = FormattedLine::new(text);
        line.start_anchor().set_offset(0);
        line.set_index(0);
        line
    }

    #[test]
    fn anchor_resolves_through_parent() {
        let line = line_with("abcdef");
        let anchor = line.create_anchor(3, false).unwrap();
        assert_eq!(anchor.offset(), Some(3));

        // Shifting the line-start shifts every child with it.
        line.start_anchor().shift_by(10);
        assert_eq!(anchor.offset(), Some(13));
    }

    #[test]
    fn clear_line_invalidates() {
        let line = line_with("abc");
        let anchor = line.create_anchor(1, false).unwrap();
        assert!(anchor.is_valid());
        anchor.clear_line();
        assert!(!anchor.is_valid());
        assert_eq!(anchor.offset(), None);
        assert_eq!(anchor.line_index(), None);
    }

    #[test]
    fn clear_parent_keeps_resolved_offset() {
        let line = line_with("abcdef");
        line.start_anchor().shift_by(4);
        let anchor = line.create_anchor(2, false).unwrap();
        assert_eq!(anchor.offset(), Some(6));
        anchor.clear_parent();
        assert_eq!(anchor.raw_offset(), 6);
    }

    #[test]
    fn line_start_shift_cascades_down_the_chain() {
        let first = line_with("aaaa");
        let second = FormattedLine::new("bbb");
        second.start_anchor().set_offset(5);
        link_line_starts(&first.start_anchor(), &second.start_anchor());
        let on_second = second.create_anchor(1, false).unwrap();

        first.start_anchor().shift_by(2);
        assert_eq!(second.start_anchor().resolved_offset(), 7);
        assert_eq!(on_second.resolved_offset(), 8);
    }

    #[test]
    fn plain_shift_does_not_cascade() {
        let line = line_with("abcdef");
        let a = line.create_anchor(1, false).unwrap();
        let b = line.create_anchor(4, false).unwrap();
        a.shift_by(2);
        assert_eq!(a.offset(), Some(3));
        assert_eq!(b.offset(), Some(4));
    }

    #[test]
    fn comparisons_require_validity() {
        let line = line_with("abcdef");
        let a = line.create_anchor(1, false).unwrap();
        let b = line.create_anchor(1, false).unwrap();
        let c = line.create_anchor(4, false).unwrap();
        assert_eq!(a, b);
        assert!(a < c);
        b.clear_line();
        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn is_in_range_half_open() {
        let line = line_with("abcdef");
        let anchor = line.create_anchor(3, false).unwrap();
        assert!(anchor.is_in_range(3, 1));
        assert!(anchor.is_in_range(0, UNTIL_THE_END));
        assert!(!anchor.is_in_range(0, 3));
        assert!(!anchor.is_in_range(4, 2));
        assert!(!anchor.is_in_range(3, 0));
    }

    #[test]
    #[should_panic(expected = "parent of itself")]
    fn self_parenting_is_a_logic_error() {
        let anchor = AnchorPoint::new_line_start();
        anchor.set_parent(&anchor.clone());
    }

    #[test]
    #[should_panic(expected = "neighbour itself")]
    fn self_neighbouring_is_a_logic_error() {
        let anchor = AnchorPoint::new_line_start();
        link_line_starts(&anchor, &anchor.clone());
    }
}
