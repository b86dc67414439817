use formatted_text_engine::{
    AnchorPoint, CharOffset, FormattedText, LineIndex, TagComponent,
};

/// Checks every structural invariant of the buffer. Panics with a
/// description of the first violation.
pub fn validate(text: &FormattedText) {
    let lines = text.lines();
    let mut expected_offset = 0;
    let mut prev_start: Option<AnchorPoint> = None;

    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line.index(), i, "line index does not match its position");
        assert!(
            !line.text().contains('\n'),
            "line {i} contains a newline character"
        );

        let start = line.start_anchor();
        assert!(start.is_line_start());
        assert_eq!(
            start.offset(),
            Some(expected_offset),
            "line {i} start anchor is misplaced"
        );

        match (&prev_start, start.prev_line_start()) {
            (None, prev) => assert!(prev.is_none(), "first line has a previous line-start"),
            (Some(expected), Some(prev)) => assert!(
                AnchorPoint::ptr_eq(expected, &prev),
                "previous link of line {i} points at the wrong anchor"
            ),
            (Some(_), None) => panic!("line {i} lost its previous link"),
        }
        if let Some(prev) = &prev_start {
            let next = prev
                .next_line_start()
                .unwrap_or_else(|| panic!("line {} has no next link", i - 1));
            assert!(
                AnchorPoint::ptr_eq(&next, &start),
                "next link into line {i} points at the wrong anchor"
            );
        }

        for anchor in line.anchors() {
            if !anchor.is_valid() {
                continue;
            }
            if let Some(parent) = anchor.parent() {
                assert!(
                    AnchorPoint::ptr_eq(&parent, &start),
                    "anchor on line {i} is parented to a foreign line-start"
                );
            }
            if !anchor.allow_out_of_bounds() {
                let offset = anchor.offset().unwrap();
                assert!(
                    line.is_in_range(offset, 1),
                    "anchor at {offset} lies outside line {i}"
                );
            }
        }

        let mut next_component_offset = line.start_offset();
        for component in line.components() {
            if !component.is_valid() {
                continue;
            }
            let start = component.start_offset().unwrap();
            let end = component.end_offset().unwrap();
            assert!(end >= start, "component with inverted range on line {i}");
            assert!(
                start >= next_component_offset,
                "components overlap or are out of order on line {i}"
            );
            next_component_offset = end + 1;
        }

        expected_offset += line.abs_len();
        prev_start = Some(start);
    }
    if let Some(last) = lines.last() {
        assert!(
            last.start_anchor().next_line_start().is_none(),
            "last line still has a next link"
        );
    }

    let mut next_tag_offset = 0;
    let mut used_components: Vec<TagComponent> = Vec::new();
    for tag in text.tags() {
        if !tag.is_valid() {
            continue;
        }
        let opening = tag.opening();
        assert!(
            !used_components
                .iter()
                .any(|c| TagComponent::ptr_eq(c, &opening)),
            "opening component is used by more than one tag"
        );
        used_components.push(opening.clone());
        assert!(
            opening.start_offset().unwrap() >= next_tag_offset,
            "tags are not ordered by opening offset"
        );
        if tag.is_closed() {
            let closing = tag.closing().unwrap();
            assert!(
                !used_components
                    .iter()
                    .any(|c| TagComponent::ptr_eq(c, &closing)),
                "closing component is used by more than one tag"
            );
            used_components.push(closing.clone());
            assert!(
                closing.start_offset().unwrap() > opening.end_offset().unwrap(),
                "closing component does not start after the opening ends"
            );
            assert_eq!(opening.name(), closing.name(), "tag name mismatch");
        }
        next_tag_offset = opening.end_offset().unwrap() + 1;
    }

    // Concatenation law: the cache equals the lines joined by newlines.
    let joined = lines
        .iter()
        .map(|line| line.text())
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(
        text.unformatted_text(),
        joined,
        "unformatted cache does not match the line contents"
    );

    // Elision law: the formatted view equals the unformatted view with
    // every valid component range removed.
    let elided = lines
        .iter()
        .map(|line| {
            let line_start = line.start_offset();
            let ranges: Vec<(CharOffset, CharOffset)> = line
                .components()
                .iter()
                .filter(|c| c.is_valid())
                .map(|c| {
                    (
                        c.start_offset().unwrap() - line_start,
                        c.end_offset().unwrap() - line_start,
                    )
                })
                .collect();
            line.text()
                .chars()
                .enumerate()
                .filter(|(i, _)| !ranges.iter().any(|&(s, e)| *i >= s && *i <= e))
                .map(|(_, c)| c)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(
        text.formatted_text(),
        elided,
        "formatted cache does not match the elided text"
    );
}

/// Asserts that `anchor` is valid and resolves to the given line-relative
/// position.
#[allow(dead_code)]
pub fn assert_anchor_at(
    text: &FormattedText,
    anchor: &AnchorPoint,
    line_idx: LineIndex,
    char_offset: CharOffset,
) {
    assert!(anchor.is_valid(), "anchor is invalid");
    assert_eq!(
        anchor.line_index(),
        Some(line_idx),
        "anchor is on the wrong line"
    );
    assert_eq!(
        anchor.offset(),
        text.text_char_offset(line_idx, char_offset),
        "anchor is at the wrong offset"
    );
}
