/// HTML-escapes `text` per the five-entity table: `<` `>` `&` `"` `'`.
/// Applied unconditionally by the caller when escaping is enabled — there
/// is no way to tell "already escaped" text apart from incidental
/// ampersands, so double-escaping an already-escaped string is expected
/// behavior, not a bug.
#[must_use]
pub fn html_escape(text: &str) -> String {
    if !text.bytes().any(is_special) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn is_special(byte: u8) -> bool {
    matches!(byte, b'<' | b'>' | b'&' | b'"' | b'\'')
}
