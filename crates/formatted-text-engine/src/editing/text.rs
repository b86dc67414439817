use std::cell::{Cell, RefCell};
use std::fmt;

use crate::editing::EditError;
use crate::editing::anchor::{AnchorPoint, link_line_starts};
use crate::editing::events::Callbacks;
use crate::editing::line::FormattedLine;
use crate::tags::Tag;
use crate::types::{
    CharOffset, LAST_CHAR, LAST_LINE, LineIndex, ShiftOffset, TextLength, TextOffset,
    UNTIL_THE_END,
};

#[derive(Default)]
struct TextInfo {
    line_count: usize,
    char_count: TextLength,
    unformatted: String,
    formatted: String,
}

/// An editable, line-oriented text buffer with two parallel views.
///
/// The *unformatted* view contains every character that was inserted,
/// including `{[…]}` tag tokens; the *formatted* view elides all recognized
/// tag components, leaving only the visible characters. Both views are
/// derived caches over the ordered sequence of [`FormattedLine`]s and are
/// recomputed on demand.
///
/// Edit operations keep three things consistent at every step:
///
/// - **Anchors** ([`AnchorPoint`]): positions handed out to callers shift
///   with insertions and deletions, and expire when their text or line is
///   deleted. The line-start anchors form a chain through the buffer, so a
///   single edit shifts every subsequent line in one cascade.
/// - **Tags**: after each line mutation the tag engine re-parses the
///   modified range, re-pairs opening and closing components and drops
///   tags whose components were edited away.
/// - **Derived state**: two offset→line lookup tables for O(1) absolute
///   offset resolution, plus the cached concatenated views.
///
/// The buffer is single-owner: handles use `Rc` internally and the type is
/// deliberately not `Send`/`Sync`.
///
/// ```
/// use formatted_text_engine::FormattedText;
///
/// let mut text = FormattedText::new();
/// text.append_text("abc{[c]}def{[/c]}ghi");
/// assert_eq!(text.formatted_text(), "abcdefghi");
///
/// let anchor = text.create_anchor(0, 12, false).unwrap();
/// text.insert_text("...", 0, 0).unwrap();
/// assert_eq!(anchor.offset(), Some(15));
/// ```
pub struct FormattedText {
    pub(crate) lines: Vec<FormattedLine>,
    /// Tags ordered by their opening component's start offset.
    pub(crate) tags: Vec<Tag>,
    unformatted_offset_to_line: Vec<LineIndex>,
    formatted_offset_to_line: Vec<LineIndex>,
    info: RefCell<TextInfo>,
    dirty: Cell<bool>,
    pub(crate) tags_enabled: bool,
    preserve_tags_on_line_removal: bool,
    pub(crate) callbacks: Callbacks,
    /// Guard against `remove_empty_tags` re-entering itself through the
    /// `remove_text_at` calls it issues.
    pub(crate) removing_empty_tags: bool,
}

impl FormattedText {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            tags: Vec::new(),
            unformatted_offset_to_line: Vec::new(),
            formatted_offset_to_line: Vec::new(),
            info: RefCell::new(TextInfo::default()),
            dirty: Cell::new(true),
            tags_enabled: true,
            preserve_tags_on_line_removal: true,
            callbacks: Callbacks::default(),
            removing_empty_tags: false,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.append_text(text);
        buffer
    }

    // ---- flags & callbacks -------------------------------------------

    pub fn tags_enabled(&self) -> bool {
        self.tags_enabled
    }

    /// When disabled, edits no longer run the tag engine and no new tag
    /// components are created; existing components are left as they are.
    pub fn set_tags_enabled(&mut self, enabled: bool) {
        self.tags_enabled = enabled;
    }

    pub fn preserve_tags_on_line_removal(&self) -> bool {
        self.preserve_tags_on_line_removal
    }

    /// When enabled, removing a line migrates its tag-component text into
    /// the neighbouring line instead of dropping it.
    pub fn set_preserve_tags_on_line_removal(&mut self, preserve: bool) {
        self.preserve_tags_on_line_removal = preserve;
    }

    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    // ---- queries -----------------------------------------------------

    pub fn lines(&self) -> &[FormattedLine] {
        &self.lines
    }

    pub fn line(&self, line_idx: LineIndex) -> Option<&FormattedLine> {
        self.lines.get(line_idx)
    }

    /// All tags, ordered by opening component start offset. Tags whose
    /// components were edited away linger as invalid entries until the next
    /// parse touches them.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn unformatted_text(&self) -> String {
        self.update_text_info();
        self.info.borrow().unformatted.clone()
    }

    pub fn formatted_text(&self) -> String {
        self.update_text_info();
        self.info.borrow().formatted.clone()
    }

    pub fn line_count(&self) -> usize {
        self.update_text_info();
        self.info.borrow().line_count
    }

    /// Total character count, each line's implicit trailing newline
    /// included.
    pub fn char_count(&self) -> TextLength {
        self.update_text_info();
        self.info.borrow().char_count
    }

    /// Extracts `len` characters starting at an absolute offset, crossing
    /// line boundaries; each boundary contributes one `'\n'`.
    pub fn substr(&self, offset: TextOffset, len: TextLength) -> String {
        let Some((mut line_idx, mut char_offset)) = self.relative_offset(offset) else {
            return String::new();
        };
        let mut remaining = len;
        let mut result = String::new();
        let mut first = true;
        while line_idx < self.lines.len() && remaining > 0 {
            if first {
                first = false;
            } else {
                remaining -= 1;
                result.push('\n');
            }
            let piece = self.lines[line_idx].substr(char_offset, remaining);
            remaining = remaining.saturating_sub(piece.chars().count());
            result.push_str(&piece);
            char_offset = 0;
            line_idx += 1;
        }
        result
    }

    pub fn char_at(&self, line_idx: LineIndex, char_offset: CharOffset) -> Option<char> {
        self.lines.get(line_idx)?.char_at(char_offset)
    }

    pub fn char_at_offset(&self, offset: TextOffset) -> Option<char> {
        let (line_idx, char_offset) = self.relative_offset(offset)?;
        self.char_at(line_idx, char_offset)
    }

    /// Absolute unformatted offset → (line index, line-relative offset).
    pub fn relative_offset(&self, offset: TextOffset) -> Option<(LineIndex, CharOffset)> {
        let line_idx = *self.unformatted_offset_to_line.get(offset)?;
        let line = self.lines.get(line_idx)?;
        Some((line_idx, offset - line.start_offset()))
    }

    /// (line index, line-relative offset) → absolute unformatted offset.
    /// The line's implicit newline is addressable.
    pub fn text_char_offset(
        &self,
        line_idx: LineIndex,
        char_offset: CharOffset,
    ) -> Option<TextOffset> {
        let line = self.lines.get(line_idx)?;
        if char_offset >= line.abs_len() {
            return None;
        }
        Some(line.start_offset() + char_offset)
    }

    /// Absolute unformatted offset → absolute formatted offset. Characters
    /// inside a tag map to the position where the tag collapses.
    pub fn formatted_offset(&self, offset: TextOffset) -> Option<TextOffset> {
        let (line_idx, char_offset) = self.relative_offset(offset)?;
        let line = &self.lines[line_idx];
        Some(line.formatted_start_offset() + line.formatted_char_offset(char_offset))
    }

    /// Absolute formatted offset → absolute unformatted offset.
    pub fn unformatted_offset(&self, offset: TextOffset) -> Option<TextOffset> {
        let line_idx = *self.formatted_offset_to_line.get(offset)?;
        let line = self.lines.get(line_idx)?;
        let formatted_rel = offset - line.formatted_start_offset();
        Some(line.start_offset() + line.unformatted_char_offset(formatted_rel))
    }

    // ---- anchors -----------------------------------------------------

    /// Creates an anchor at a line-relative position. `None` when the line
    /// does not exist, or the offset points past the last character and
    /// out-of-bounds is not allowed.
    pub fn create_anchor(
        &self,
        line_idx: LineIndex,
        char_offset: CharOffset,
        allow_out_of_bounds: bool,
    ) -> Option<AnchorPoint> {
        self.lines
            .get(line_idx)?
            .create_anchor(char_offset, allow_out_of_bounds)
    }

    /// Creates an anchor at an absolute unformatted offset.
    pub fn create_anchor_at(
        &self,
        offset: TextOffset,
        allow_out_of_bounds: bool,
    ) -> Option<AnchorPoint> {
        let (line_idx, char_offset) = self.relative_offset(offset)?;
        self.create_anchor(line_idx, char_offset, allow_out_of_bounds)
    }

    // ---- edit operations ---------------------------------------------

    /// Appends `text` at the very end of the buffer.
    pub fn append_text(&mut self, text: &str) {
        let line_idx = if self.lines.is_empty() {
            LAST_LINE
        } else {
            self.lines.len() - 1
        };
        let _ = self.insert_text(text, line_idx, LAST_CHAR);
    }

    /// Appends `text` as one new line at the end of the buffer.
    pub fn append_line(&mut self, text: &str) {
        if self.lines.is_empty() {
            let _ = self.insert_text(text, LAST_LINE, LAST_CHAR);
        } else {
            let text = format!("\n{text}");
            let _ = self.insert_text(&text, self.lines.len() - 1, LAST_CHAR);
        }
    }

    pub fn pop_front_line(&mut self) {
        let _ = self.remove_line(0);
    }

    pub fn pop_back_line(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let _ = self.remove_line(self.lines.len() - 1);
    }

    /// Inserts `text` at the given position. `text` may span lines: it is
    /// partitioned at `'\n'` into proto-lines, the first of which lands at
    /// the insertion point while the rest become new lines. The suffix of
    /// the target line moves to the last inserted line, its anchors shifted
    /// by the full insertion length.
    pub fn insert_text(
        &mut self,
        text: &str,
        line_idx: LineIndex,
        char_offset: CharOffset,
    ) -> Result<(), EditError> {
        if text.is_empty() {
            return Ok(());
        }
        let line_idx = if line_idx == LAST_LINE {
            self.lines.len()
        } else {
            line_idx
        };
        if line_idx > self.lines.len() || (line_idx == self.lines.len() && char_offset != LAST_CHAR)
        {
            return Err(EditError::LineOutOfBounds(line_idx));
        }
        if line_idx == self.lines.len() {
            self.insert_line(FormattedLine::new(""), LAST_LINE);
        }
        let target = self.lines[line_idx].clone();
        let char_offset = if char_offset == LAST_CHAR {
            target.len()
        } else {
            char_offset
        };
        if char_offset > target.len() {
            return Err(EditError::CharOutOfBounds {
                line: line_idx,
                offset: char_offset,
            });
        }

        let protos: Vec<&str> = text.split('\n').collect();

        // Split the target line: everything from the insertion point on is
        // carried over to the last inserted line, anchors included.
        let postfix = target.substr(char_offset, UNTIL_THE_END);
        let detached = target.detach_anchor_points(char_offset, UNTIL_THE_END);
        let _ = target.erase(char_offset, UNTIL_THE_END);
        self.dirty.set(true);

        if target.insert_str(protos[0], char_offset).is_none() {
            unreachable!("line insert failed after bounds check");
        }
        self.update_text_offsets(line_idx);
        self.parse_tags(line_idx, 0, UNTIL_THE_END);
        self.emit_line_changed(&target);

        for (i, proto) in protos.iter().enumerate().skip(1) {
            self.insert_line(FormattedLine::new(proto), line_idx + i);
        }

        let last_idx = line_idx + protos.len() - 1;
        let last_line = self.lines[last_idx].clone();
        let insert_offset = last_line.append_str(&postfix);
        last_line.attach_anchor_points(&detached, text.chars().count() as ShiftOffset);
        if !postfix.is_empty() {
            self.update_text_offsets(last_idx);
        }
        self.parse_tags(last_idx, insert_offset, UNTIL_THE_END);
        self.emit_line_changed(&last_line);
        Ok(())
    }

    /// Inserts a detached line at `line_idx`, wiring it into the
    /// line-start chain and shifting every subsequent line.
    fn insert_line(&mut self, line: FormattedLine, line_idx: LineIndex) -> LineIndex {
        let line_idx = line_idx.min(self.lines.len());
        line.set_index(line_idx);
        let start = line.start_anchor();
        if line_idx > 0 {
            let prev = self.lines[line_idx - 1].clone();
            link_line_starts(&prev.start_anchor(), &start);
            start.set_offset(prev.abs_end_offset() + 1);
        } else {
            start.clear_prev_line_start();
            start.set_offset(0);
        }
        if line_idx < self.lines.len() {
            let next = self.lines[line_idx].clone();
            link_line_starts(&start, &next.start_anchor());
            next.start_anchor().shift_to(line.abs_end_offset() + 1);
        }
        self.lines.insert(line_idx, line.clone());
        for (i, l) in self.lines.iter().enumerate().skip(line_idx + 1) {
            l.set_index(i);
        }
        self.update_text_offsets(line_idx);
        self.parse_tags(line_idx, 0, UNTIL_THE_END);
        self.dirty.set(true);
        self.emit_line_added(&line);
        line_idx
    }

    /// Removes a whole line. With tag preservation enabled, the line's tag
    /// component text migrates to the start of the next line (or the end of
    /// the previous one for the last line).
    pub fn remove_line(&mut self, line_idx: LineIndex) -> Result<(), EditError> {
        self.remove_line_impl(line_idx, true)
    }

    pub(crate) fn remove_line_impl(
        &mut self,
        line_idx: LineIndex,
        preserve_tags: bool,
    ) -> Result<(), EditError> {
        if line_idx >= self.lines.len() {
            return Err(EditError::LineOutOfBounds(line_idx));
        }
        let line = self.lines[line_idx].clone();
        let abs_len = line.abs_len();
        let next = (line_idx + 1 < self.lines.len()).then(|| self.lines[line_idx + 1].clone());
        let prev = (line_idx > 0).then(|| self.lines[line_idx - 1].clone());

        // Collect the dying line's tag text while offsets are still intact.
        let mut preserved = String::new();
        if preserve_tags && self.preserve_tags_on_line_removal {
            for component in line.components() {
                preserved.push_str(&component.tag_string(self));
            }
            // The migrated string is opaque, but a stray leading newline
            // would split lines during reinsertion and never terminate.
            while preserved.starts_with('\n') {
                preserved.remove(0);
            }
        }

        self.lines.remove(line_idx);
        for (i, l) in self.lines.iter().enumerate().skip(line_idx) {
            l.set_index(i);
        }

        // Unlink the dying line from the chain, then expire everything
        // attached to it. External holders keep invalid handles.
        let start = line.start_anchor();
        start.clear_prev_line_start();
        start.clear_next_line_start();
        line.invalidate_anchors();

        if let Some(next) = &next {
            let next_start = next.start_anchor();
            next_start.shift_by(-(abs_len as ShiftOffset));
            match &prev {
                Some(prev) => link_line_starts(&prev.start_anchor(), &next_start),
                None => next_start.clear_prev_line_start(),
            }
        } else if let Some(prev) = &prev {
            prev.start_anchor().clear_next_line_start();
        }

        self.update_text_offsets(line_idx);
        self.dirty.set(true);
        self.emit_line_removed(&line);

        if preserved.is_empty() {
            return Ok(());
        }
        log::debug!(
            "migrating {} chars of tag text from removed line {line_idx}",
            preserved.chars().count()
        );
        if next.is_some() {
            let _ = self.insert_text(&preserved, line_idx, 0);
            self.remove_empty_tags(line_idx, false);
        } else if line_idx > 0 {
            let prev_idx = line_idx - 1;
            let _ = self.insert_text(&preserved, prev_idx, LAST_CHAR);
            self.remove_empty_tags(prev_idx, true);
        }
        // First and only line: no text remains, so the tags go with it.
        Ok(())
    }

    /// Removes `[char_offset, char_offset + len)` from a line. A range that
    /// reaches the line's terminating newline either removes the whole line
    /// (when it starts at offset 0) or deletes the tail and pulls the next
    /// line up into this one.
    pub fn remove_text(
        &mut self,
        line_idx: LineIndex,
        char_offset: CharOffset,
        len: TextLength,
    ) -> Result<(), EditError> {
        let Some(line) = self.lines.get(line_idx).cloned() else {
            return Err(EditError::LineOutOfBounds(line_idx));
        };
        if char_offset >= line.len() || !line.can_erase(char_offset, len) {
            return Err(EditError::CharOutOfBounds {
                line: line_idx,
                offset: char_offset,
            });
        }
        let len = if len == UNTIL_THE_END {
            line.abs_len() - char_offset
        } else {
            len
        };
        if char_offset.saturating_add(len) >= line.abs_len() {
            // The range covers the terminating newline.
            if char_offset == 0 {
                return self.remove_line_impl(line_idx, false);
            }
            let line_len = line.len();
            if char_offset < line_len {
                self.remove_text(line_idx, char_offset, line_len - char_offset)?;
            }
            let next_idx = line_idx + 1;
            if next_idx >= self.lines.len() {
                return Ok(());
            }
            let next_abs_len = self.lines[next_idx].abs_len();
            return self.move_text(next_idx, 0, next_abs_len, line_idx, char_offset);
        }

        if line.erase(char_offset, len).is_none() {
            unreachable!("line erase failed after can_erase succeeded");
        }
        self.update_text_offsets(line_idx);
        self.parse_tags(line_idx, char_offset, 1);
        self.dirty.set(true);
        self.emit_line_changed(&line);
        Ok(())
    }

    /// Removes `[offset, offset + len)` in absolute coordinates, deleting
    /// whole intermediate lines, the end line's prefix and finally the
    /// start line's range.
    pub fn remove_text_at(&mut self, offset: TextOffset, len: TextLength) -> Result<(), EditError> {
        if len == 0 {
            return Ok(());
        }
        let end_offset = if len == UNTIL_THE_END {
            self.unformatted_offset_to_line.len().saturating_sub(1)
        } else {
            offset + len - 1
        };
        let (start_line, start_char) = self
            .relative_offset(offset)
            .ok_or(EditError::OffsetOutOfBounds(offset))?;
        let (end_line, end_char) = self
            .relative_offset(end_offset)
            .ok_or(EditError::OffsetOutOfBounds(end_offset))?;

        let mut end_line_idx = end_line;
        for _ in start_line + 1..end_line {
            self.remove_line_impl(start_line + 1, false)?;
            end_line_idx -= 1;
        }
        if end_line_idx != start_line {
            self.remove_text(end_line_idx, 0, end_char + 1)?;
        }
        self.remove_text(start_line, start_char, len)
    }

    /// Atomically relocates `[start_offset, start_offset + len)` of
    /// `line_idx` to `(target_line_idx, target_char_offset)`, carrying the
    /// anchors inside the range along with the text.
    pub fn move_text(
        &mut self,
        line_idx: LineIndex,
        start_offset: CharOffset,
        len: TextLength,
        target_line_idx: LineIndex,
        target_char_offset: CharOffset,
    ) -> Result<(), EditError> {
        if len == 0 {
            return Ok(());
        }
        if line_idx >= self.lines.len() {
            return Err(EditError::LineOutOfBounds(line_idx));
        }
        if target_line_idx >= self.lines.len() {
            return Err(EditError::LineOutOfBounds(target_line_idx));
        }
        let len = if len == UNTIL_THE_END {
            self.lines[line_idx].abs_len().saturating_sub(start_offset)
        } else {
            len
        };
        if len == 0 {
            return Ok(());
        }
        let target_char_offset = if target_char_offset == LAST_CHAR {
            self.lines[target_line_idx].len()
        } else {
            target_char_offset
        };
        if line_idx == target_line_idx
            && target_char_offset > start_offset
            && target_char_offset <= start_offset + len - 1
        {
            return Err(EditError::MoveTargetInSource);
        }
        log::trace!(
            "moving {len} chars from ({line_idx},{start_offset}) to ({target_line_idx},{target_char_offset})"
        );

        // Track the target line through the intermediate edits with a
        // throwaway out-of-bounds anchor at its first character.
        let target_anchor = self
            .create_anchor(target_line_idx, 0, true)
            .ok_or(EditError::LineOutOfBounds(target_line_idx))?;
        let src = self.lines[line_idx].clone();

        let abs_start = self
            .text_char_offset(line_idx, start_offset)
            .ok_or(EditError::CharOutOfBounds {
                line: line_idx,
                offset: start_offset,
            })?;
        let detached = src.detach_anchor_points(start_offset, len);
        let relative: Vec<TextOffset> = detached
            .iter()
            .map(|anchor| anchor.raw_offset() - abs_start)
            .collect();
        let text = src.substr(start_offset, len);
        let target_offset_before = target_anchor.resolved_offset();

        self.remove_text(line_idx, start_offset, len)?;
        if !target_anchor.is_valid() {
            return Err(EditError::MoveTargetLost);
        }
        let target_char_offset = if target_line_idx == line_idx && target_char_offset > start_offset
        {
            // The deletion happened in front of the target.
            target_char_offset - len
        } else {
            target_char_offset
        };
        let target_line_idx = target_anchor.line_index().ok_or(EditError::MoveTargetLost)?;

        self.insert_text(&text, target_line_idx, target_char_offset)?;
        if !target_anchor.is_valid() {
            return Err(EditError::MoveTargetLost);
        }
        let target_line = target_anchor.line().ok_or(EditError::MoveTargetLost)?;

        let shift =
            target_anchor.resolved_offset() as ShiftOffset - target_offset_before as ShiftOffset;
        target_line.attach_anchor_points(&detached, shift);

        let new_abs_start = self
            .text_char_offset(target_line_idx, target_char_offset)
            .ok_or(EditError::MoveTargetLost)?;
        for (anchor, relative_offset) in detached.iter().zip(&relative) {
            anchor.set_offset(new_abs_start + relative_offset);
        }
        Ok(())
    }

    /// Replaces the whole buffer content.
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.append_text(text);
    }

    /// Drops every line, tag and anchor. Outstanding anchor handles expire.
    pub fn clear(&mut self) {
        for line in &self.lines {
            line.invalidate_anchors();
        }
        self.lines.clear();
        self.tags.clear();
        self.unformatted_offset_to_line.clear();
        self.formatted_offset_to_line.clear();
        self.dirty.set(true);
        if let Some(on_text_cleared) = self.callbacks.on_text_cleared.as_mut() {
            on_text_cleared();
        }
        if let Some(on_tags_cleared) = self.callbacks.on_tags_cleared.as_mut() {
            on_tags_cleared();
        }
    }

    // ---- derived state -----------------------------------------------

    /// Rebuilds the offset→line lookup tables and per-line formatted start
    /// offsets from `line_start_idx` on. Line-start anchors are
    /// authoritative for the unformatted offsets.
    pub(crate) fn update_text_offsets(&mut self, line_start_idx: LineIndex) {
        let (mut unformatted_offset, mut formatted_offset) = if line_start_idx > 0 {
            let prev = &self.lines[line_start_idx - 1];
            (
                prev.start_offset() + prev.abs_len(),
                prev.formatted_start_offset() + prev.abs_formatted_len(),
            )
        } else {
            (0, 0)
        };
        for line_idx in line_start_idx..self.lines.len() {
            let line = self.lines[line_idx].clone();
            line.set_formatted_start_offset(formatted_offset);
            let formatted_end = formatted_offset + line.abs_formatted_len();
            if self.formatted_offset_to_line.len() < formatted_end {
                self.formatted_offset_to_line.resize(formatted_end, 0);
            }
            self.formatted_offset_to_line[formatted_offset..formatted_end].fill(line_idx);
            formatted_offset = formatted_end;

            let start_offset = line.start_offset();
            let end = start_offset + line.abs_len();
            if self.unformatted_offset_to_line.len() < end {
                self.unformatted_offset_to_line.resize(end, 0);
            }
            self.unformatted_offset_to_line[start_offset..end].fill(line_idx);
            unformatted_offset += line.abs_len();
        }
        self.formatted_offset_to_line.truncate(formatted_offset);
        self.unformatted_offset_to_line.truncate(unformatted_offset);
    }

    fn update_text_info(&self) {
        if !self.dirty.get() {
            return;
        }
        self.dirty.set(false);
        let mut info = self.info.borrow_mut();
        info.line_count = self.lines.len();
        info.char_count = 0;
        info.unformatted.clear();
        info.formatted.clear();
        for (i, line) in self.lines.iter().enumerate() {
            info.char_count += line.abs_len();
            info.unformatted.push_str(&line.text());
            info.formatted.push_str(&line.formatted_text());
            if i + 1 != self.lines.len() {
                info.unformatted.push('\n');
                info.formatted.push('\n');
            }
        }
    }

    // ---- callback dispatch -------------------------------------------

    pub(crate) fn emit_line_added(&mut self, line: &FormattedLine) {
        if let Some(on_line_added) = self.callbacks.on_line_added.as_mut() {
            on_line_added(line);
        }
    }

    pub(crate) fn emit_line_removed(&mut self, line: &FormattedLine) {
        if let Some(on_line_removed) = self.callbacks.on_line_removed.as_mut() {
            on_line_removed(line);
        }
    }

    pub(crate) fn emit_line_changed(&mut self, line: &FormattedLine) {
        if let Some(on_line_changed) = self.callbacks.on_line_changed.as_mut() {
            on_line_changed(line);
        }
    }

    pub(crate) fn emit_tag_added(&mut self, tag: &Tag) {
        if let Some(on_tag_added) = self.callbacks.on_tag_added.as_mut() {
            on_tag_added(tag);
        }
    }

    pub(crate) fn emit_tag_removed(&mut self, tag: &Tag) {
        if let Some(on_tag_removed) = self.callbacks.on_tag_removed.as_mut() {
            on_tag_removed(tag);
        }
    }
}

impl Default for FormattedText {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormattedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unformatted_text())
    }
}

impl PartialEq<str> for FormattedText {
    fn eq(&self, other: &str) -> bool {
        self.unformatted_text() == other
    }
}

impl PartialEq<&str> for FormattedText {
    fn eq(&self, other: &&str) -> bool {
        self.unformatted_text() == *other
    }
}
