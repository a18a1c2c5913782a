//! Properties that must hold for every template/value pair, not just the
//! eight literal scenarios.

use qentem::{json, render, render_into, HArray, RenderOptions, Value};

// =============================================================================
// 1. literal templates pass through untouched
// =============================================================================

#[test]
fn a_template_with_no_tags_renders_as_its_own_literal_text() {
    let root = Value::Null;
    let template = "just some plain text, no braces or angle brackets here.";
    assert_eq!(render(template, &root, RenderOptions::new()), template);
}

// =============================================================================
// 2. determinism
// =============================================================================

#[test]
fn rendering_the_same_inputs_twice_yields_byte_identical_output() {
    let mut fields = HArray::new();
    fields.insert("a", Value::UInt64(1));
    fields.insert("b", Value::from("x"));
    let root = Value::Object(fields);
    let template = r#"<loop value="v">{var:v}</loop>-{math:1+2}"#;

    let first = render(template, &root, RenderOptions::new());
    let second = render(template, &root, RenderOptions::new());
    assert_eq!(first, second);
}

// =============================================================================
// 3. String sink and streaming sink agree
// =============================================================================

#[test]
fn render_and_render_into_produce_the_same_bytes() {
    let root = Value::from("ok");
    let template = "{var:}-{raw:}-literal";

    let via_string = render(template, &root, RenderOptions::new());
    let mut via_sink = Vec::new();
    render_into(template, &root, RenderOptions::new(), &mut via_sink).unwrap();
    assert_eq!(via_string.as_bytes(), via_sink.as_slice());
}

// =============================================================================
// 4. error-class fallbacks never abort the render
// =============================================================================

#[test]
fn an_unclosed_tag_falls_back_to_verbatim_and_scanning_continues() {
    let root = Value::from("z");
    let out = render("{var:x unterminated {var:}", &root, RenderOptions::new());
    assert_eq!(out, "{var:x unterminated z");
}

#[test]
fn a_path_that_resolves_to_undefined_falls_back_to_verbatim() {
    let root = Value::Null;
    assert_eq!(render("{var:missing}", &root, RenderOptions::new()), "{var:missing}");
}

#[test]
fn division_by_zero_inside_math_falls_back_to_verbatim() {
    assert_eq!(render("{math:1/0}", &Value::Null, RenderOptions::new()), "{math:1/0}");
}

// =============================================================================
// 5. JSON round-trips through the facade
// =============================================================================

#[test]
fn json_parse_then_stringify_then_parse_again_is_stable() {
    let document = br#"{"a":1,"b":[true,null,"x"],"c":-3.5}"#;
    let first = json::parse(document).unwrap();
    let text = json::stringify(&first);
    let second = json::parse(text.as_bytes()).unwrap();
    assert_eq!(first, second);
}
