//! State machine for a single `{[…]}` tag component.

use crate::types::TextLength;

/// Raw result of parsing one tag component, before it is anchored into a
/// line. `len` is the component's full length in code points, from the
/// opening `{` through the closing `}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedComponent {
    pub name: String,
    pub label: String,
    pub attributes: Vec<String>,
    pub closing: bool,
    pub len: TextLength,
}

#[derive(Clone, Copy, PartialEq)]
enum Stage {
    TagName,
    Label,
    Arguments,
}

/// Attempts to parse a tag component at the start of `s`.
///
/// Returns `None` when `s` does not begin with the tag prefix, ends before
/// the `]}` postfix, or contains an embedded NUL. Reserved tokens (`:`,
/// `#`, `,`, `/`) outside their grammatical position are dropped rather
/// than rejected; a `"` toggles quote mode in which every token except the
/// quote itself is taken verbatim and the postfix is not recognized.
pub(crate) fn parse_component(s: &[char]) -> Option<ParsedComponent> {
    if s.len() < 4 || s[0] != '{' || s[1] != '[' {
        return None;
    }

    let mut stage = Stage::TagName;
    let mut name = String::new();
    let mut label = String::new();
    let mut attributes: Vec<String> = Vec::new();
    let mut closing = false;
    let mut in_quotes = false;

    let start = 2;
    let mut i = start;
    while i < s.len() {
        let token = s[i];
        let control = if in_quotes && token != '\0' && token != '"' {
            // Arbitrary non-reserved token so quoted text reaches the
            // verbatim branch below.
            ' '
        } else {
            token
        };
        match control {
            '\0' => return None,
            ':' => stage = Stage::Arguments,
            '#' => {
                if stage == Stage::TagName {
                    stage = Stage::Label;
                }
            }
            ',' => {
                if stage == Stage::Arguments {
                    if attributes.is_empty() {
                        attributes.push(String::new());
                    }
                    attributes.push(String::new());
                }
            }
            '/' => {
                if i == start {
                    closing = true;
                }
            }
            '"' => in_quotes = !in_quotes,
            _ => {
                if control == ']' && s.get(i + 1) == Some(&'}') {
                    return Some(ParsedComponent {
                        name,
                        label,
                        attributes,
                        closing,
                        len: i + 2,
                    });
                }
                match stage {
                    Stage::TagName => name.push(token),
                    Stage::Label => label.push(token),
                    Stage::Arguments => {
                        if attributes.is_empty() {
                            attributes.push(String::new());
                        }
                        if let Some(last) = attributes.last_mut() {
                            last.push(token);
                        }
                    }
                }
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[rstest]
    #[case("{[abc]}", "abc", false, 7)]
    #[case("{[/abc]}", "abc", true, 8)]
    #[case("{[a]}trailing", "a", false, 5)]
    #[case("{[]}", "", false, 4)]
    fn parses_bare_components(
        #[case] input: &str,
        #[case] name: &str,
        #[case] closing: bool,
        #[case] len: usize,
    ) {
        let parsed = parse_component(&chars(input)).unwrap();
        assert_eq!(parsed.name, name);
        assert_eq!(parsed.closing, closing);
        assert_eq!(parsed.len, len);
        assert!(parsed.label.is_empty());
        assert!(parsed.attributes.is_empty());
    }

    #[test]
    fn parses_label_and_attributes() {
        let parsed = parse_component(&chars("{[color#red:255,0,0]}")).unwrap();
        assert_eq!(parsed.name, "color");
        assert_eq!(parsed.label, "red");
        assert_eq!(parsed.attributes, vec!["255", "0", "0"]);
        assert!(!parsed.closing);
        assert_eq!(parsed.len, 21);
    }

    #[test]
    fn quoted_text_suppresses_token_recognition() {
        let parsed = parse_component(&chars("{[a#\"#t0:1,2,3\":4,5,6]}")).unwrap();
        assert_eq!(parsed.name, "a");
        assert_eq!(parsed.label, "#t0:1,2,3");
        assert_eq!(parsed.attributes, vec!["4", "5", "6"]);
    }

    #[test]
    fn empty_arguments_are_preserved() {
        let parsed = parse_component(&chars("{[a#t1:,,a]}")).unwrap();
        assert_eq!(parsed.name, "a");
        assert_eq!(parsed.label, "t1");
        assert_eq!(parsed.attributes, vec!["", "", "a"]);
    }

    #[rstest]
    #[case("")]
    #[case("{[")]
    #[case("{[a")]
    #[case("plain")]
    #[case("[a]}")]
    #[case("{[a#label:1,2")]
    fn rejects_unterminated_input(#[case] input: &str) {
        assert_eq!(parse_component(&chars(input)), None);
    }

    #[test]
    fn rejects_embedded_nul() {
        assert_eq!(parse_component(&chars("{[a\0]}")), None);
    }

    #[test]
    fn unterminated_quote_swallows_the_postfix() {
        assert_eq!(parse_component(&chars("{[a:\"x]}")), None);
    }

    #[test]
    fn slash_only_marks_closing_right_after_the_prefix() {
        let parsed = parse_component(&chars("{[a/b]}")).unwrap();
        assert!(!parsed.closing);
        // The misplaced slash is dropped from the name.
        assert_eq!(parsed.name, "ab");
    }
}
