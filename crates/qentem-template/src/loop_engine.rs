//! `<loop [set="PATH"] [value="NAME"] [group="KEY"] [sort="ascend"|"descend"]>BODY</loop>`.
//!
//! A name bound by `value=` stays visible (via [`crate::scope::Scope`]) to
//! everything nested inside the loop body, including further loops that
//! reference it as their own `set=` source — that's how grouping's
//! "array of elements sharing a key" gets iterated by an inner loop.

use qentem_value::Value;

use crate::attrs::{attr_value, parse_attrs};
use crate::error::RenderError;
use crate::render::{render_fragment, RenderCtx};
use crate::scanner::Tag;
use crate::sink::Sink;

/// Renders a `<loop>` tag. Returns `Ok(false)` when the attribute list is
/// malformed — the caller then falls back to emitting the tag verbatim.
pub(crate) fn render_loop<'v>(tag: &Tag<'_>, ctx: &mut RenderCtx<'v>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let Some(attrs) = parse_attrs(tag.attrs) else {
        return Ok(false);
    };

    let value_name = attr_value(&attrs, "value").map_or_else(anonymous_name, str::to_string);
    let group_key = attr_value(&attrs, "group");
    let sort_ascending = match attr_value(&attrs, "sort") {
        Some("ascend") => Some(true),
        Some("descend") => Some(false),
        Some(_) => return Ok(false),
        None => None,
    };

    let source = match attr_value(&attrs, "set") {
        Some(path) => ctx.scope.resolve(path, ctx.root).clone(),
        None => ctx.current.clone(),
    };

    match source {
        Value::Array(items) => render_items(tag.body, items, value_name, group_key, sort_ascending, ctx, out)?,
        Value::Object(fields) => {
            let items = fields.values().cloned().collect();
            render_items(tag.body, items, value_name, group_key, sort_ascending, ctx, out)?;
        }
        other => {
            if let Some(text) = other.stringify_scalar(ctx.options.precision) {
                out.append(text.as_bytes())?;
            }
        }
    }
    Ok(true)
}

fn render_items<'v>(
    body: &str,
    items: Vec<Value>,
    value_name: String,
    group_key: Option<&str>,
    sort_ascending: Option<bool>,
    ctx: &mut RenderCtx<'v>,
    out: &mut dyn Sink,
) -> Result<(), RenderError> {
    if let Some(key) = group_key {
        let mut groups = group_by_key(items, key);
        if let Some(ascending) = sort_ascending {
            if ascending {
                groups.sort_by(|a, b| a.0.cmp(&b.0));
            } else {
                groups.sort_by(|a, b| b.0.cmp(&a.0));
            }
        }
        for (_, bucket) in groups {
            bind_and_render(body, &value_name, Value::Array(bucket), ctx, out)?;
        }
    } else {
        let mut items = items;
        if let Some(ascending) = sort_ascending {
            items.sort_by(|a, b| compare_values(a, b, ascending));
        }
        for item in items {
            bind_and_render(body, &value_name, item, ctx, out)?;
        }
    }
    Ok(())
}

fn bind_and_render<'v>(body: &str, name: &str, value: Value, ctx: &mut RenderCtx<'v>, out: &mut dyn Sink) -> Result<(), RenderError> {
    ctx.scope.push(name.to_string(), value.clone());
    let previous_current = std::mem::replace(&mut ctx.current, value);
    let result = render_fragment(body, ctx, out);
    ctx.current = previous_current;
    ctx.scope.pop();
    result
}

fn group_by_key(items: Vec<Value>, key: &str) -> Vec<(String, Vec<Value>)> {
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    for item in items {
        let group_value = item
            .as_object()
            .and_then(|fields| fields.get(key))
            .and_then(|value| value.stringify_scalar(6))
            .unwrap_or_default();
        match groups.iter_mut().find(|(existing, _)| *existing == group_value) {
            Some((_, bucket)) => bucket.push(item),
            None => groups.push((group_value, vec![item])),
        }
    }
    groups
}

fn compare_values(a: &Value, b: &Value, ascending: bool) -> std::cmp::Ordering {
    let ordering = match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => a.stringify_scalar(6).unwrap_or_default().cmp(&b.stringify_scalar(6).unwrap_or_default()),
    };
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::UInt64(n) => Some(*n as f64),
        Value::Int64(n) => Some(*n as f64),
        Value::Real64(n) => Some(*n),
        _ => None,
    }
}

/// A binding name guaranteed never to match a path token written in a
/// template, since templates are ordinary text and can't contain a NUL byte.
fn anonymous_name() -> String {
    "\u{0}anon".to_string()
}
