//! Tag parsing, pairing and lifecycle scenarios against the public API.

mod common;

use common::validate;
use formatted_text_engine::{FormattedText, Tag};
use pretty_assertions::assert_eq;

fn valid_tags(text: &FormattedText) -> Vec<Tag> {
    text.tags()
        .iter()
        .filter(|tag| tag.is_valid())
        .cloned()
        .collect()
}

#[test]
fn a_tag_pair_is_elided_from_the_formatted_view() {
    let mut text = FormattedText::new();
    text.append_text("abc{[c]}def{[/c]}ghi");
    validate(&text);

    assert_eq!(text.unformatted_text(), "abc{[c]}def{[/c]}ghi");
    assert_eq!(text.formatted_text(), "abcdefghi");
    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name(), "c");
    assert!(tags[0].is_closed());
    assert_eq!(tags[0].contents(&text), "def");
    assert_eq!(tags[0].tag_string(&text), "{[c]}def{[/c]}");
    assert_eq!(tags[0].opening_string(&text), "{[c]}");
    assert_eq!(tags[0].closing_string(&text), "{[/c]}");
}

#[test]
fn nested_same_name_tags_close_innermost_first() {
    let mut text = FormattedText::new();
    text.append_text("{[a]}{[a]}x{[/a]}{[/a]}");
    validate(&text);

    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].contents(&text), "{[a]}x{[/a]}");
    assert_eq!(tags[1].contents(&text), "x");
    assert_eq!(text.formatted_text(), "x");
}

#[test]
fn deleting_an_inner_closing_component_rewires_the_pairing() {
    let mut text = FormattedText::new();
    text.append_text("{[a]}{[a]}x{[/a]}{[/a]}");
    validate(&text);

    text.remove_text(0, 5, 1).unwrap();
    validate(&text);
    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name(), "a");
    assert_eq!(tags[0].contents(&text), "[a]}x");
}

#[test]
fn labels_and_attributes_survive_round_trips() {
    let mut text = FormattedText::new();
    text.append_text("{[a#\"#t0:1,2,3\":4,5,6]}{[a#t1:,,a]}{[/a]}{[/a]}");
    validate(&text);

    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].label().as_deref(), Some("#t0:1,2,3"));
    assert_eq!(
        tags[0].attributes(),
        Some(vec!["4".into(), "5".into(), "6".into()])
    );
    assert_eq!(tags[0].contents(&text), "{[a#t1:,,a]}{[/a]}");
    assert_eq!(tags[1].label().as_deref(), Some("t1"));
    assert_eq!(
        tags[1].attributes(),
        Some(vec![String::new(), String::new(), "a".into()])
    );
    assert_eq!(tags[1].contents(&text), "");
}

#[test]
fn tags_span_line_boundaries() {
    let mut text = FormattedText::new();
    text.append_text("{[a]}\n{[a]}\n{[/a]}\nabc{[/a]}");
    validate(&text);

    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].contents(&text), "\n{[a]}\n{[/a]}\nabc");
    assert_eq!(tags[1].contents(&text), "\n");
}

#[test]
fn a_lone_closing_component_creates_no_tag() {
    let mut text = FormattedText::new();
    text.append_text("asdf{[/a]}");
    validate(&text);
    assert!(valid_tags(&text).is_empty());
    assert_eq!(text.formatted_text(), "asdf");
}

#[test]
fn breaking_the_opening_token_invalidates_the_tag() {
    let mut text = FormattedText::new();
    text.append_text("{[a]}asdf{[/a]}");
    validate(&text);
    text.remove_text(0, 0, 2).unwrap();
    validate(&text);
    assert!(valid_tags(&text).is_empty());
}

#[test]
fn removed_line_migrates_tags_to_the_next_line() {
    let mut text = FormattedText::new();
    text.append_text("{[a]}abc\ndef{[/a]}");
    validate(&text);

    text.remove_line(0).unwrap();
    validate(&text);
    assert_eq!(text.unformatted_text(), "{[a]}def{[/a]}");
    assert_eq!(text.formatted_text(), "def");
    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].contents(&text), "def");
}

#[test]
fn removed_last_line_migrates_tags_to_the_previous_line() {
    let mut text = FormattedText::new();
    text.append_text("abc{[a]}\ndef{[/a]}ghi\njkl{[/a]}");
    validate(&text);

    text.remove_line(2).unwrap();
    validate(&text);
    // The closing component of the dying line lands at the end of line 1
    // and closes the still-open tag.
    assert_eq!(text.unformatted_text(), "abc{[a]}\ndef{[/a]}ghi{[/a]}");
    assert_eq!(text.formatted_text(), "abc\ndefghi");
}

#[test]
fn line_removal_without_preservation_drops_the_tokens() {
    let mut text = FormattedText::new();
    text.set_preserve_tags_on_line_removal(false);
    text.append_text("{[a]}abc\ndef{[/a]}");
    validate(&text);

    text.remove_line(0).unwrap();
    validate(&text);
    assert_eq!(text.unformatted_text(), "def{[/a]}");
    assert!(valid_tags(&text).is_empty());

    text.insert_text("{[a]}", 0, 0).unwrap();
    validate(&text);
    let tags = valid_tags(&text);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].contents(&text), "def");
}

#[test]
fn disabled_tag_parsing_keeps_the_views_identical() {
    let mut text = FormattedText::new();
    text.set_tags_enabled(false);
    text.append_text("abc{[c]}def{[/c]}ghi");
    validate(&text);
    assert!(text.tags().is_empty());
    assert_eq!(text.formatted_text(), text.unformatted_text());
}

#[test]
fn formatted_offsets_skip_tag_characters() {
    let mut text = FormattedText::new();
    text.append_text("abc{[c]}def{[/c]}ghi");

    // 'd' sits behind the 5-char opening component.
    assert_eq!(text.formatted_offset(8), Some(3));
    assert_eq!(text.unformatted_offset(3), Some(8));
    // 'a' is unaffected.
    assert_eq!(text.formatted_offset(0), Some(0));
    assert_eq!(text.unformatted_offset(0), Some(0));
    // 'g' follows both components.
    assert_eq!(text.formatted_offset(17), Some(6));
    assert_eq!(text.unformatted_offset(6), Some(17));
    assert_eq!(text.formatted_offset(100), None);
    assert_eq!(text.unformatted_offset(100), None);
}

#[test]
fn formatted_offsets_across_lines() {
    let mut text = FormattedText::new();
    text.append_text("ab{[x]}\ncd{[/x]}ef");
    // Unformatted: line 0 = "ab{[x]}", line 1 = "cd{[/x]}ef".
    // Formatted:   line 0 = "ab",      line 1 = "cdef".
    assert_eq!(text.formatted_text(), "ab\ncdef");
    // 'c' at unformatted offset 8, formatted offset 3.
    assert_eq!(text.formatted_offset(8), Some(3));
    assert_eq!(text.unformatted_offset(3), Some(8));
    // 'e' at unformatted offset 16, formatted offset 5.
    assert_eq!(text.formatted_offset(16), Some(5));
    assert_eq!(text.unformatted_offset(5), Some(16));
}
