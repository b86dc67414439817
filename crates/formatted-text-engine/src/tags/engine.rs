//! Re-parsing, pairing and garbage collection of tags after edits.

use crate::editing::text::FormattedText;
use crate::tags::component::TagComponent;
use crate::tags::parser;
use crate::tags::tag::Tag;
use crate::types::{
    CharOffset, LAST_CHAR, LineIndex, TextLength, TextOffset, UNTIL_THE_END,
};

fn insert_sorted(components: &mut Vec<TagComponent>, component: TagComponent) {
    let offset = component.start_offset().unwrap_or(TextOffset::MAX);
    let at = components
        .iter()
        .position(|c| c.start_offset().unwrap_or(TextOffset::MAX) > offset)
        .unwrap_or(components.len());
    components.insert(at, component);
}

fn contains_component(components: &[TagComponent], component: &TagComponent) -> bool {
    components
        .iter()
        .any(|c| TagComponent::ptr_eq(c, component))
}

impl FormattedText {
    /// Re-parses tag components over a modified range of one line and
    /// re-pairs the affected tags.
    ///
    /// The working range is widened to fully cover every component it
    /// touches, so a component straddling the edit is re-parsed from the
    /// new text as a whole. Tags lying entirely before or after the
    /// widened range are preserved untouched; everything else is dissolved
    /// and its surviving components re-enter pairing together with the
    /// freshly parsed ones.
    pub(crate) fn parse_tags(
        &mut self,
        line_idx: LineIndex,
        char_offset: CharOffset,
        len: TextLength,
    ) {
        if !self.tags_enabled || line_idx >= self.lines.len() {
            return;
        }
        let line = self.lines[line_idx].clone();
        let line_start = line.start_offset();
        let line_abs_len = line.abs_len();
        let char_offset = if char_offset == LAST_CHAR {
            line.len()
        } else {
            char_offset
        };
        let len = if len == UNTIL_THE_END {
            line_abs_len
        } else {
            len
        };
        let len = len.min(line_abs_len.saturating_sub(char_offset));

        // Working range, absolute and half-open.
        let mut range_start = line_start + char_offset;
        let mut range_end = range_start + len;

        // 1. Drop components that earlier edits expired; absorb components
        //    overlapping the range so they get re-parsed from the new text.
        let mut touched = false;
        for component in line.components() {
            if !component.is_valid() {
                touched = true;
                continue;
            }
            let (Some(start), Some(end)) = (component.start_offset(), component.end_offset())
            else {
                continue;
            };
            if start < range_end && end >= range_start {
                range_start = range_start.min(start);
                range_end = range_end.max(end + 1);
                component.invalidate();
                touched = true;
            }
        }
        if touched {
            line.retain_components(|component| component.is_valid());
            line.mark_formatted_dirty();
        }

        // 2. Parse the widened window; every hit becomes a fresh component
        //    on the line and a pairing candidate.
        let rel_start = (range_start - line_start).min(line_abs_len - 1);
        let rel_end = (range_end - line_start).min(line_abs_len);
        let mut new_components: Vec<TagComponent> = Vec::new();
        let chars: Vec<char> = line.text().chars().collect();
        // Only the widened window is parsed; a token that would reach past
        // it stays unrecognized until an edit touches its remainder.
        let window_end = rel_end.min(chars.len());
        let mut created_any = false;
        let mut i = rel_start;
        while i < window_end {
            let Some(parsed) = parser::parse_component(&chars[i..window_end]) else {
                i += 1;
                continue;
            };
            let parsed_len = parsed.len;
            let Some(component) = line.make_component(i, parsed) else {
                i += 1;
                continue;
            };
            insert_sorted(&mut new_components, component.clone());
            line.insert_component_sorted(component);
            created_any = true;
            i += parsed_len;
        }

        // 3. Tags wholly before or after the widened range survive;
        //    everything else is dissolved and its still-valid components
        //    queued for re-pairing.
        let mut removed_tags: Vec<Tag> = Vec::new();
        let mut kept: Vec<Tag> = Vec::new();
        for tag in std::mem::take(&mut self.tags) {
            let keep = tag.is_valid()
                && match tag.outer_range() {
                    None => false,
                    Some((start, outer_len)) => {
                        start >= range_end
                            || (tag.is_closed()
                                && outer_len != UNTIL_THE_END
                                && start + outer_len <= range_start)
                    }
                };
            if keep {
                kept.push(tag);
                continue;
            }
            let opening = tag.opening();
            if opening.is_valid() && !contains_component(&new_components, &opening) {
                insert_sorted(&mut new_components, opening);
            }
            if let Some(closing) = tag.closing()
                && closing.is_valid()
                && !contains_component(&new_components, &closing)
            {
                insert_sorted(&mut new_components, closing);
            }
            removed_tags.push(tag);
        }
        self.tags = kept;

        // 4. Pair in offset order with a stack of open tags; a closing
        //    component pops the nearest matching unclosed opening, and an
        //    unmatched closing pairs with nothing.
        let mut open_tags: Vec<Tag> = Vec::new();
        let mut added_tags: Vec<Tag> = Vec::new();
        for component in &new_components {
            if !component.is_valid() {
                continue;
            }
            if component.is_opening() {
                let offset = component.start_offset().unwrap_or(TextOffset::MAX);
                let tag = Tag::new(component.clone());
                let at = self
                    .tags
                    .iter()
                    .position(|t| {
                        t.is_valid()
                            && t.opening().start_offset().unwrap_or(TextOffset::MAX) > offset
                    })
                    .unwrap_or(self.tags.len());
                self.tags.insert(at, tag.clone());
                open_tags.push(tag.clone());
                added_tags.push(tag);
            } else {
                let name = component.name().to_string();
                if let Some(open) = open_tags
                    .iter()
                    .rev()
                    .find(|t| t.is_valid() && !t.is_closed() && t.name() == name)
                {
                    open.set_closing(component.clone());
                }
            }
        }

        // The line's component set changed, so its formatted length did
        // too; the formatted lookup table has to follow.
        if touched || created_any {
            self.update_text_offsets(line_idx);
        }

        if !new_components.is_empty() || !removed_tags.is_empty() {
            log::trace!(
                "parse_tags line {line_idx}: range {range_start}..{range_end}, {} candidates, {} dissolved, {} created",
                new_components.len(),
                removed_tags.len(),
                added_tags.len()
            );
        }
        for tag in &removed_tags {
            self.emit_tag_removed(tag);
        }
        for tag in &added_tags {
            self.emit_tag_added(tag);
        }
    }

    /// Sweeps the tag list and removes closed tags with no visible content
    /// in their inner range, dropping the closing component's text before
    /// the opening's. Each removal restarts the sweep because the list
    /// changes underneath it; the per-buffer guard keeps the nested
    /// `remove_text_at` calls from re-entering the sweep.
    pub(crate) fn remove_empty_tags(&mut self, line_idx: LineIndex, from_end: bool) {
        if self.removing_empty_tags || line_idx >= self.lines.len() {
            return;
        }
        'sweep: loop {
            let mut i = 0;
            while i < self.tags.len() {
                let tag = self.tags[i].clone();
                if !tag.is_valid() {
                    self.tags.remove(i);
                    self.emit_tag_removed(&tag);
                    continue;
                }
                if !tag.is_closed() {
                    i += 1;
                    continue;
                }
                let removed = match tag.inner_range() {
                    None => {
                        // Nothing at all between the components.
                        let Some((start, outer_len)) = tag.outer_range() else {
                            i += 1;
                            continue;
                        };
                        self.guarded_remove(start, outer_len)
                    }
                    Some((inner_start, inner_len)) => {
                        // Closed tags have a finite inner range.
                        let inner_end = inner_start + inner_len - 1;
                        // The watched line can disappear when a removal
                        // merges lines; the sweep is done at that point.
                        let Some(line) = self.lines.get(line_idx) else {
                            return;
                        };
                        let line_start = line.start_offset();
                        let visible = self
                            .first_visible_char(line_idx, from_end)
                            .map(|rel| line_start + rel);
                        let empty = match visible {
                            None => true,
                            Some(offset) if from_end => offset < inner_start,
                            Some(offset) => offset > inner_end,
                        };
                        if !empty {
                            i += 1;
                            continue;
                        }
                        let Some(closing) = tag.closing() else {
                            i += 1;
                            continue;
                        };
                        let opening = tag.opening();
                        let (Some(closing_start), Some(closing_end)) =
                            (closing.start_offset(), closing.end_offset())
                        else {
                            i += 1;
                            continue;
                        };
                        let (Some(opening_start), Some(opening_end)) =
                            (opening.start_offset(), opening.end_offset())
                        else {
                            i += 1;
                            continue;
                        };
                        // Closing first: removing the opening first would
                        // slide the closing component out from under us.
                        self.guarded_remove(closing_start, closing_end - closing_start + 1)
                            && self.guarded_remove(opening_start, opening_end - opening_start + 1)
                    }
                };
                if removed {
                    continue 'sweep;
                }
                return;
            }
            break;
        }
    }

    fn guarded_remove(&mut self, offset: TextOffset, len: TextLength) -> bool {
        self.removing_empty_tags = true;
        let result = self.remove_text_at(offset, len).is_ok();
        self.removing_empty_tags = false;
        result
    }

    /// Line-relative offset of the first (or, `from_end`, the last)
    /// character not covered by a tag component, or `None` when the line
    /// has no visible characters.
    pub(crate) fn first_visible_char(
        &self,
        line_idx: LineIndex,
        from_end: bool,
    ) -> Option<CharOffset> {
        let line = self.lines.get(line_idx)?;
        let line_start = line.start_offset();
        let components: Vec<TagComponent> = line
            .components()
            .into_iter()
            .filter(TagComponent::is_valid)
            .collect();
        let len = line.len();
        if !from_end {
            let mut offset: CharOffset = 0;
            let mut idx = 0;
            while offset < len {
                let Some(component) = components.get(idx) else {
                    break;
                };
                let start = component
                    .start_offset()
                    .map(|s| s.saturating_sub(line_start))
                    .unwrap_or(CharOffset::MAX);
                if offset != start {
                    break;
                }
                offset += component.len().unwrap_or(1);
                idx += 1;
            }
            (offset < len).then_some(offset)
        } else {
            if len == 0 {
                return None;
            }
            let mut offset = len - 1;
            let mut idx = components.len();
            loop {
                let Some(component) = idx.checked_sub(1).and_then(|i| components.get(i)) else {
                    break;
                };
                let end = component
                    .end_offset()
                    .map(|e| e.saturating_sub(line_start))
                    .unwrap_or(CharOffset::MAX);
                if offset != end {
                    break;
                }
                let component_len = component.len().unwrap_or(1);
                if component_len > offset {
                    return None;
                }
                offset -= component_len;
                idx -= 1;
            }
            Some(offset)
        }
    }
}
