//! `<if case="EXPR">…<elseif case="EXPR">…<else/>…</if>`.
//!
//! The opening tag's own `case` comes from [`Tag::attrs`]; everything else
//! is split out of the body by walking it once, tracking `<if>`/`</if>`
//! nesting so a clause marker that belongs to a nested `if` block doesn't
//! get mistaken for one of ours.

use crate::attrs::parse_attrs;
use crate::error::RenderError;
use crate::expr::evaluate;
use crate::render::{render_fragment, substitute_nested, RenderCtx};
use crate::scanner::{bytes_at, find_unquoted, starts_with_tag_word, Tag};
use crate::sink::Sink;

/// Renders an `<if>` block. Returns `Ok(false)` when the tag is malformed
/// (no `case`, a clause marker missing its own `case`) — the caller then
/// falls back to emitting the whole block verbatim.
pub(crate) fn render_if(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let Some(if_case) = extract_case(tag.attrs) else {
        return Ok(false);
    };
    let Some((first_body, clauses)) = split_clauses(tag.body) else {
        return Ok(false);
    };

    let Some(truth) = eval_case(if_case, ctx) else {
        return Ok(false);
    };
    if truth {
        render_fragment(first_body, ctx, out)?;
        return Ok(true);
    }

    for (marker_case, clause_body) in &clauses {
        match marker_case {
            Some(case_expr) => {
                let Some(truth) = eval_case(case_expr, ctx) else {
                    return Ok(false);
                };
                if truth {
                    render_fragment(clause_body, ctx, out)?;
                    return Ok(true);
                }
            }
            None => {
                render_fragment(clause_body, ctx, out)?;
                return Ok(true);
            }
        }
    }
    Ok(true)
}

fn eval_case(expr: &str, ctx: &mut RenderCtx<'_>) -> Option<bool> {
    let substituted = substitute_nested(expr, ctx)?;
    evaluate(&substituted).ok().map(|value| value.is_truthy())
}

/// Splits an `<if>` tag's body into its `<if>` clause (returned separately,
/// since its `case` lives on the opening tag) and its `<elseif>`/`<else>`
/// clauses in order. `None` on a clause marker with no parseable `case`.
fn split_clauses(body: &str) -> Option<(&str, Vec<(Option<&str>, &str)>)> {
    let mut depth = 0i32;
    let mut i = 0usize;
    let mut segment_start = 0usize;
    let mut first: Option<&str> = None;
    let mut rest: Vec<(Option<&str>, &str)> = Vec::new();
    let mut pending_marker: Option<Option<&str>> = None;

    while i < body.len() {
        if depth == 0 && starts_with_tag_word(body, i, "<elseif") {
            let close = find_unquoted(body, i + "<elseif".len(), b'>')?;
            let attrs_text = body[i + "<elseif".len()..close].trim_end_matches('/').trim();
            let case = extract_case(attrs_text)?;
            close_segment(&mut first, &mut rest, &mut pending_marker, &body[segment_start..i]);
            pending_marker = Some(Some(case));
            i = close + 1;
            segment_start = i;
            continue;
        }
        if depth == 0 && starts_with_tag_word(body, i, "<else") {
            let close = find_unquoted(body, i + "<else".len(), b'>')?;
            close_segment(&mut first, &mut rest, &mut pending_marker, &body[segment_start..i]);
            pending_marker = Some(None);
            i = close + 1;
            segment_start = i;
            continue;
        }
        if starts_with_tag_word(body, i, "<if") {
            depth += 1;
            i += "<if".len();
            continue;
        }
        if bytes_at(body, i, "</if>") {
            depth -= 1;
            i += "</if>".len();
            continue;
        }
        i += 1;
    }
    close_segment(&mut first, &mut rest, &mut pending_marker, &body[segment_start..]);
    Some((first?, rest))
}

fn close_segment<'a>(
    first: &mut Option<&'a str>,
    rest: &mut Vec<(Option<&'a str>, &'a str)>,
    pending_marker: &mut Option<Option<&'a str>>,
    content: &'a str,
) {
    match pending_marker.take() {
        None => *first = Some(content),
        Some(marker) => rest.push((marker, content)),
    }
}

/// Pulls a `case="…"` value out of an attribute-text slice, returning a
/// slice of the same string so callers that borrow from the template body
/// keep that borrow intact.
fn extract_case(attrs_text: &str) -> Option<&str> {
    let key = "case=";
    let after_key = &attrs_text[attrs_text.find(key)? + key.len()..];
    let quote = *after_key.as_bytes().first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &after_key[1..];
    let end = value.find(quote as char)?;
    Some(&value[..end])
}
