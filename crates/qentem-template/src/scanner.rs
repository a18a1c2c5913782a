//! Single forward-pass tag scanner. Everything between tags is literal
//! text; `find_next_tag` walks the template once, byte by byte, and hands
//! back the next recognized tag plus the byte offset it starts at.
//!
//! Brace tags (`{var:…}`, `{raw:…}`, `{math:…}`, `{svar:…}`, `{if …}`) are
//! matched by counting `{`/`}` depth regardless of what's inside — a `}`
//! always closes the nearest open `{`. Block tags (`<loop>…</loop>`,
//! `<if>…</if>`) are matched by counting only same-kind open/close
//! markers, so a `<loop>` nested inside an `<if>` doesn't confuse the
//! `<if>`'s own span, and vice versa.
//!
//! An opening marker with no matching close is not a tag: the scan simply
//! keeps going from the next byte, so any well-formed tag embedded further
//! along in that "malformed frame" is still found and still expands.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Var,
    Raw,
    Math,
    SVar,
    InlineIf,
    Loop,
    If,
}

#[derive(Debug, Clone)]
pub struct Tag<'a> {
    pub kind: TagKind,
    /// The tag's entire source text, delimiters included.
    pub full: &'a str,
    /// What needs further parsing: the path/expr for brace tags, the
    /// attribute text for the inline `if`, or the block body for `loop`/`if`.
    pub body: &'a str,
    /// The opening tag's attribute text for `loop`/`if` (empty for brace
    /// tags, whose `body` already carries everything there is to parse).
    pub attrs: &'a str,
}

const BRACE_PREFIXES: [(&str, TagKind); 5] = [
    ("{var:", TagKind::Var),
    ("{raw:", TagKind::Raw),
    ("{math:", TagKind::Math),
    ("{svar:", TagKind::SVar),
    ("{if ", TagKind::InlineIf),
];

/// Finds the next recognized tag at or after `from`.
pub fn find_next_tag(template: &str, from: usize) -> Option<(usize, Tag<'_>)> {
    let bytes = template.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if let Some(tag) = try_brace_tag(template, i) {
                    return Some((i, tag));
                }
            }
            b'<' => {
                if let Some(tag) = try_block_tag(template, i) {
                    return Some((i, tag));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

pub(crate) fn bytes_at(template: &str, i: usize, pattern: &str) -> bool {
    template.as_bytes()[i..].starts_with(pattern.as_bytes())
}

fn try_brace_tag(template: &str, start: usize) -> Option<Tag<'_>> {
    for (prefix, kind) in BRACE_PREFIXES {
        if bytes_at(template, start, prefix) {
            let body_start = start + prefix.len();
            let close = match_braces(template, body_start)?;
            return Some(Tag {
                kind,
                full: &template[start..=close],
                body: &template[body_start..close],
                attrs: "",
            });
        }
    }
    None
}

/// `body_start` is the byte right after the tag's opening `{`. Returns the
/// index of the matching `}`.
fn match_braces(template: &str, body_start: usize) -> Option<usize> {
    let bytes = template.as_bytes();
    let mut depth = 1i32;
    let mut i = body_start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `word` must be followed by whitespace, `>`, or `/` (a self-closing
/// marker like `<else/>`) — never by more identifier characters, so
/// `<loopback>` doesn't get mistaken for the start of a `<loop>` tag.
pub(crate) fn starts_with_tag_word(template: &str, i: usize, word: &str) -> bool {
    if !bytes_at(template, i, word) {
        return false;
    }
    match template.as_bytes().get(i + word.len()) {
        Some(b) => b.is_ascii_whitespace() || *b == b'>' || *b == b'/',
        None => false,
    }
}

fn try_block_tag(template: &str, start: usize) -> Option<Tag<'_>> {
    let (word, close_word, kind) = if starts_with_tag_word(template, start, "<loop") {
        ("<loop", "</loop>", TagKind::Loop)
    } else if starts_with_tag_word(template, start, "<if") {
        ("<if", "</if>", TagKind::If)
    } else {
        return None;
    };
    let open_end = find_unquoted(template, start + word.len(), b'>')?;
    let body_start = open_end + 1;
    let close_start = match_block_span(template, body_start, word, close_word)?;
    Some(Tag {
        kind,
        full: &template[start..close_start + close_word.len()],
        body: &template[body_start..close_start],
        attrs: template[start + word.len()..open_end].trim(),
    })
}

/// Finds the next unquoted occurrence of `target`, starting from `from`.
/// Quoted spans (`"…"` or `'…'`) are opaque — a `>` inside an attribute
/// value doesn't close the opening tag early.
pub(crate) fn find_unquoted(template: &str, from: usize, target: u8) -> Option<usize> {
    let bytes = template.as_bytes();
    let mut i = from;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let byte = bytes[i];
        match quote {
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if byte == target => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

/// `body_start` is right after the opening tag's `>`. Returns the byte
/// offset where the matching close tag begins.
fn match_block_span(template: &str, body_start: usize, open_word: &str, close_word: &str) -> Option<usize> {
    let len = template.len();
    let mut depth = 1i32;
    let mut i = body_start;
    while i < len {
        if bytes_at(template, i, close_word) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += close_word.len();
            continue;
        }
        if starts_with_tag_word(template, i, open_word) {
            depth += 1;
            i += open_word.len();
            continue;
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_simple_var_tag() {
        let (offset, tag) = find_next_tag("a {var:x} b", 0).unwrap();
        assert_eq!(offset, 2);
        assert_eq!(tag.kind, TagKind::Var);
        assert_eq!(tag.body, "x");
        assert_eq!(tag.full, "{var:x}");
    }

    #[test]
    fn brace_counting_handles_nested_braces_in_math() {
        let (_, tag) = find_next_tag("{math:{var:a}+{var:b}}", 0).unwrap();
        assert_eq!(tag.kind, TagKind::Math);
        assert_eq!(tag.body, "{var:a}+{var:b}");
    }

    #[test]
    fn finds_inline_if() {
        let (_, tag) = find_next_tag(r#"{if case="1==1" true="A" false="B"}"#, 0).unwrap();
        assert_eq!(tag.kind, TagKind::InlineIf);
        assert_eq!(tag.body, r#"case="1==1" true="A" false="B""#);
    }

    #[test]
    fn matches_loop_block_ignoring_nested_if_markers() {
        let template = r#"<loop set="items"><if case="1"><var:x></if></loop>rest"#;
        let (offset, tag) = find_next_tag(template, 0).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(tag.kind, TagKind::Loop);
        assert!(tag.body.contains("<if"));
        assert!(tag.full.ends_with("</loop>"));
    }

    #[test]
    fn matches_nested_loop_of_the_same_kind() {
        let template = "<loop><loop></loop></loop>";
        let (_, tag) = find_next_tag(template, 0).unwrap();
        assert_eq!(tag.body, "<loop></loop>");
    }

    #[test]
    fn if_span_ignores_nested_loop_markers() {
        let template = "<if case=\"1\"><loop set=\"a\"></loop></if>";
        let (_, tag) = find_next_tag(template, 0).unwrap();
        assert_eq!(tag.kind, TagKind::If);
        assert!(tag.body.contains("<loop"));
    }

    #[test]
    fn quoted_angle_bracket_does_not_close_the_opening_tag_early() {
        let template = r#"<loop set="a>b">x</loop>"#;
        let (_, tag) = find_next_tag(template, 0).unwrap();
        assert_eq!(tag.body, "x");
    }

    #[test]
    fn unmatched_opening_tag_falls_back_to_literal_and_scan_continues() {
        let template = "{var:a unterminated {var:b}";
        let (offset, tag) = find_next_tag(template, 0).unwrap();
        assert_eq!(offset, 20);
        assert_eq!(tag.kind, TagKind::Var);
        assert_eq!(tag.body, "b");
    }

    #[test]
    fn loopback_identifier_is_not_mistaken_for_a_loop_tag() {
        assert!(find_next_tag("<loopback>text</loopback>", 0).is_none());
    }
}
