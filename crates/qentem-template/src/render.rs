//! The main dispatch: scans the template, renders each recognized tag
//! against the value tree, and falls back to verbatim emission for
//! anything lexically or semantically broken (§7 classes 1 and 2). Only a
//! sink failure propagates as an `Err` (class 3).

use qentem_value::Value;

use crate::attrs::{attr_value, parse_attrs};
use crate::error::RenderError;
use crate::escape::html_escape;
use crate::expr::evaluate;
use crate::if_engine;
use crate::loop_engine;
use crate::scanner::{find_next_tag, Tag, TagKind};
use crate::scope::Scope;
use crate::sink::Sink;

/// Toggles that affect rendering without changing the template or value
/// tree. Mirrors the teacher's builder-style resource configuration: an
/// owned struct with chainable `#[must_use]` setters.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    auto_escape_html: bool,
    precision: usize,
    max_recursion_depth: usize,
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self { auto_escape_html: true, precision: 6, max_recursion_depth: 64 }
    }

    /// Controls `{var:…}`/`{svar:…}` HTML escaping. On by default.
    #[must_use]
    pub fn auto_escape_html(mut self, enabled: bool) -> Self {
        self.auto_escape_html = enabled;
        self
    }

    /// Significant digits used by the default real-number format.
    #[must_use]
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Caps re-entrant rendering depth (loop bodies, if clauses, `{svar:…}`
    /// arguments, inline-`if` branches) to bound stack usage on adversarial
    /// or accidentally self-referential templates.
    #[must_use]
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-render mutable state threaded through the recursive descent: the
/// document root, the loop engine's notion of "current value", the active
/// name bindings, and the depth guard.
pub(crate) struct RenderCtx<'v> {
    pub root: &'v Value,
    pub current: Value,
    pub scope: Scope,
    pub options: RenderOptions,
    pub depth: usize,
}

impl<'v> RenderCtx<'v> {
    pub(crate) fn new(root: &'v Value, options: RenderOptions) -> Self {
        Self { root, current: root.clone(), scope: Scope::new(), options, depth: 0 }
    }
}

/// Renders `template` against `root` and returns the result as a `String`.
#[must_use]
pub fn render(template: &str, root: &Value, options: RenderOptions) -> String {
    let mut out = String::new();
    let mut ctx = RenderCtx::new(root, options);
    // A `String` sink's `append` only fails on invalid UTF-8, which cannot
    // happen for bytes produced by `render_fragment` itself.
    render_fragment(template, &mut ctx, &mut out).expect("string sink is infallible for valid UTF-8 output");
    out
}

/// Streaming entry point: renders into any [`Sink`], propagating a sink
/// failure as `Err` per the engine's one fatal error class.
pub fn render_into(template: &str, root: &Value, options: RenderOptions, sink: &mut dyn Sink) -> Result<(), RenderError> {
    let mut ctx = RenderCtx::new(root, options);
    render_fragment(template, &mut ctx, sink)
}

pub(crate) fn render_fragment(template: &str, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<(), RenderError> {
    ctx.depth += 1;
    let result = render_fragment_at_depth(template, ctx, out);
    ctx.depth -= 1;
    result
}

fn render_fragment_at_depth(template: &str, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<(), RenderError> {
    if ctx.depth > ctx.options.max_recursion_depth {
        return out.append(template.as_bytes());
    }

    let mut cursor = 0usize;
    while let Some((offset, tag)) = find_next_tag(template, cursor) {
        out.append(template[cursor..offset].as_bytes())?;
        render_tag(&tag, ctx, out)?;
        cursor = offset + tag.full.len();
    }
    out.append(template[cursor..].as_bytes())
}

fn render_tag(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<(), RenderError> {
    let handled = match tag.kind {
        TagKind::Var => render_var(tag, ctx, out)?,
        TagKind::Raw => render_raw(tag, ctx, out)?,
        TagKind::Math => render_math(tag, ctx, out)?,
        TagKind::SVar => render_svar(tag, ctx, out)?,
        TagKind::InlineIf => render_inline_if(tag, ctx, out)?,
        TagKind::Loop => loop_engine::render_loop(tag, ctx, out)?,
        TagKind::If => if_engine::render_if(tag, ctx, out)?,
    };
    if !handled {
        out.append(tag.full.as_bytes())?;
    }
    Ok(())
}

fn render_var(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let value = ctx.scope.resolve(tag.body, ctx.root);
    match value.stringify_scalar(ctx.options.precision) {
        Some(text) => {
            let text = if ctx.options.auto_escape_html { html_escape(&text) } else { text };
            out.append(text.as_bytes())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn render_raw(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let value = ctx.scope.resolve(tag.body, ctx.root);
    match value.stringify_scalar(ctx.options.precision) {
        Some(text) => {
            out.append(text.as_bytes())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn render_math(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let Some(substituted) = substitute_nested(tag.body, ctx) else {
        return Ok(false);
    };
    match evaluate(&substituted) {
        Ok(value) => {
            out.append(value.stringify_canonical().as_bytes())?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

fn render_svar(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let parts = split_top_level_commas(tag.body);
    let Some((path, arg_exprs)) = parts.split_first() else {
        return Ok(false);
    };

    let fmt_value = ctx.scope.resolve(path.trim(), ctx.root);
    let Value::String(fmt) = fmt_value else {
        return Ok(false);
    };
    let fmt = fmt.clone();

    let mut rendered_args = Vec::with_capacity(arg_exprs.len());
    for arg in arg_exprs {
        let mut buffer = String::new();
        render_fragment(arg.trim(), ctx, &mut buffer)?;
        let rendered = if ctx.options.auto_escape_html { html_escape(&buffer) } else { buffer };
        rendered_args.push(rendered);
    }

    out.append(substitute_placeholders(&fmt, &rendered_args).as_bytes())?;
    Ok(true)
}

/// Substitutes `{0}`..`{11}` in `fmt` with `args[N]`. An index past the end
/// of `args`, or past 11, is left as literal text.
fn substitute_placeholders(fmt: &str, args: &[String]) -> String {
    let mut output = String::with_capacity(fmt.len());
    let mut cursor = 0usize;
    let mut i = 0usize;
    while i < fmt.len() {
        if fmt.as_bytes()[i] == b'{' {
            if let Some(rel_end) = fmt[i + 1..].find('}') {
                let end = i + 1 + rel_end;
                let digits = &fmt[i + 1..end];
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(index) = digits.parse::<usize>() {
                        if index <= 11 {
                            output.push_str(&fmt[cursor..i]);
                            match args.get(index) {
                                Some(arg) => output.push_str(arg),
                                None => output.push_str(&fmt[i..=end]),
                            }
                            cursor = end + 1;
                            i = end + 1;
                            continue;
                        }
                    }
                }
            }
        }
        i += 1;
    }
    output.push_str(&fmt[cursor..]);
    output
}

fn render_inline_if(tag: &Tag<'_>, ctx: &mut RenderCtx<'_>, out: &mut dyn Sink) -> Result<bool, RenderError> {
    let Some(attrs) = parse_attrs(tag.body) else {
        return Ok(false);
    };
    let Some(case) = attr_value(&attrs, "case") else {
        return Ok(false);
    };
    let Some(substituted) = substitute_nested(case, ctx) else {
        return Ok(false);
    };
    let Ok(result) = evaluate(&substituted) else {
        return Ok(false);
    };

    let branch = if result.is_truthy() { attr_value(&attrs, "true") } else { attr_value(&attrs, "false") };
    if let Some(text) = branch {
        render_fragment(text, ctx, out)?;
    }
    Ok(true)
}

/// Replaces every `{var:…}`/`{raw:…}` occurrence in an expression string
/// with its rendered value before the expression is parsed. Returns `None`
/// if any such tag resolves to something unstringifiable (`Undefined` or a
/// container) — that failure propagates up as "the whole expression
/// failed", causing the enclosing tag to fall back to verbatim emission.
pub(crate) fn substitute_nested(expr: &str, ctx: &mut RenderCtx<'_>) -> Option<String> {
    let mut result = String::with_capacity(expr.len());
    let mut cursor = 0usize;
    while let Some((offset, tag)) = find_next_var_or_raw(expr, cursor) {
        result.push_str(&expr[cursor..offset]);
        let value = ctx.scope.resolve(tag.body, ctx.root);
        let rendered = value.stringify_scalar(ctx.options.precision)?;
        if tag.kind == TagKind::Var && ctx.options.auto_escape_html {
            result.push_str(&html_escape(&rendered));
        } else {
            result.push_str(&rendered);
        }
        cursor = offset + tag.full.len();
    }
    result.push_str(&expr[cursor..]);
    Some(result)
}

fn find_next_var_or_raw(text: &str, from: usize) -> Option<(usize, Tag<'_>)> {
    let mut cursor = from;
    loop {
        let (offset, tag) = find_next_tag(text, cursor)?;
        if matches!(tag.kind, TagKind::Var | TagKind::Raw) {
            return Some((offset, tag));
        }
        cursor = offset + 1;
    }
}

/// Splits `{svar:…}`'s body on commas that sit outside any brace nesting,
/// so an argument like `{var:a}` never gets split on a comma it doesn't
/// contain, and (defensively) a bareword argument containing a literal
/// comma inside a nested tag stays whole.
fn split_top_level_commas(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut parts = Vec::new();
    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            b',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use qentem_harray::HArray;

    fn render_default(template: &str, root: &Value) -> String {
        render(template, root, RenderOptions::new())
    }

    // ==== end-to-end scenarios ====

    #[test]
    fn scenario_1_indexes_into_an_array() {
        let root = Value::Array(vec![
            Value::String("A".into()),
            Value::String("abc".into()),
            Value::Bool(true),
            Value::UInt64(456),
            Value::Real64(1.5),
        ]);
        assert_eq!(render_default("{var:0}-{var:2}-{var:3}", &root), "A-true-456");
    }

    #[test]
    fn scenario_2_math_over_two_variables() {
        let mut obj = HArray::new();
        obj.insert("a", Value::UInt64(5));
        obj.insert("b", Value::UInt64(6));
        let root = Value::Object(obj);
        assert_eq!(render_default("{math:{var:a}+{var:b}*2}", &root), "17");
    }

    #[test]
    fn scenario_3_loop_over_current_value() {
        let root = Value::Array(vec![Value::UInt64(0), Value::UInt64(1), Value::UInt64(2), Value::UInt64(3)]);
        assert_eq!(render_default(r#"<loop value="v">{var:v},</loop>"#, &root), "0,1,2,3,");
    }

    #[test]
    fn scenario_4_loop_set_path_with_sub_index() {
        let mut first = HArray::new();
        first.insert("m", Value::UInt64(5));
        let mut second = HArray::new();
        second.insert("m", Value::UInt64(6));
        let mut root_obj = HArray::new();
        root_obj.insert("list", Value::Array(vec![Value::Object(first), Value::Object(second)]));
        let root = Value::Object(root_obj);
        assert_eq!(render_default(r#"<loop set="list" value="r">{var:r[m]} </loop>"#, &root), "5 6 ");
    }

    #[test]
    fn scenario_5_if_block_with_nested_var_in_case() {
        let mut obj = HArray::new();
        obj.insert("x", Value::UInt64(1));
        let root = Value::Object(obj);
        assert_eq!(render_default(r#"<if case="{var:x}==1">yes<else/>no</if>"#, &root), "yes");
    }

    #[test]
    fn scenario_6_svar_substitutes_rendered_argument() {
        let mut obj = HArray::new();
        obj.insert("fmt", Value::String("hi {0}!".into()));
        obj.insert("n", Value::String("world".into()));
        let root = Value::Object(obj);
        assert_eq!(render_default("{svar:fmt,{var:n}}", &root), "hi world!");
    }

    #[test]
    fn scenario_7_and_8_escaped_vs_raw() {
        let mut obj = HArray::new();
        obj.insert("s", Value::String("<b>".into()));
        let root = Value::Object(obj);
        assert_eq!(render_default("{var:s}", &root), "&lt;b&gt;");
        assert_eq!(render_default("{raw:s}", &root), "<b>");
    }

    #[test]
    fn svar_follows_the_auto_escape_html_toggle() {
        let mut obj = HArray::new();
        obj.insert("fmt", Value::String("hi {0}!".into()));
        obj.insert("s", Value::String("<b>".into()));
        let root = Value::Object(obj);

        assert_eq!(render("{svar:fmt,{var:s}}", &root, RenderOptions::new()), "hi &lt;b&gt;!");
        assert_eq!(
            render("{svar:fmt,{var:s}}", &root, RenderOptions::new().auto_escape_html(false)),
            "hi <b>!"
        );
    }

    // ==== fallbacks ====

    #[test]
    fn literal_template_passes_through_unchanged() {
        assert_eq!(render_default("just text, no tags", &Value::Null), "just text, no tags");
    }

    #[test]
    fn var_on_a_container_is_emitted_verbatim() {
        let root = Value::Array(vec![Value::UInt64(1)]);
        assert_eq!(render_default("{var:}", &root), "{var:}");
    }

    #[test]
    fn math_division_by_zero_is_emitted_verbatim() {
        assert_eq!(render_default("{math:1/0}", &Value::Null), "{math:1/0}");
    }

    #[test]
    fn unclosed_tag_is_emitted_verbatim() {
        assert_eq!(render_default("{var:x", &Value::Null), "{var:x");
    }

    #[test]
    fn inline_if_missing_branch_renders_empty() {
        assert_eq!(render_default(r#"{if case="1==1" true="yes"}"#, &Value::Null), "yes");
        assert_eq!(render_default(r#"{if case="1==2" true="yes"}"#, &Value::Null), "");
    }

    #[test]
    fn grouped_and_sorted_loop() {
        let mut a = HArray::new();
        a.insert("m", Value::UInt64(1));
        a.insert("g", Value::String("b".into()));
        let mut b = HArray::new();
        b.insert("m", Value::UInt64(2));
        b.insert("g", Value::String("a".into()));
        let root = Value::Array(vec![Value::Object(a), Value::Object(b)]);
        let template = r#"<loop value="grp" group="g" sort="ascend"><loop set="grp" value="item">{var:item[m]}</loop>,</loop>"#;
        assert_eq!(render_default(template, &root), "2,1,");
    }
}
