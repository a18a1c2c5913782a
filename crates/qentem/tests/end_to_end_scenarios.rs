//! The eight documented input/output pairs: one array or object literal, one
//! template, one expected string, covering each tag kind once.

use qentem::{render, HArray, RenderOptions, Value};

fn obj(fields: &[(&str, Value)]) -> Value {
    let mut harray = HArray::new();
    for (key, value) in fields {
        harray.insert(*key, value.clone());
    }
    Value::Object(harray)
}

// =============================================================================
// 1. var — array indexing
// =============================================================================

#[test]
fn scenario_1_var_indexes_an_array() {
    let root = Value::Array(vec![
        Value::from("A"),
        Value::from("abc"),
        Value::Bool(true),
        Value::UInt64(456),
        Value::Real64(1.5),
    ]);
    assert_eq!(render("{var:0}-{var:2}-{var:3}", &root, RenderOptions::new()), "A-true-456");
}

// =============================================================================
// 2. math — two variables and an operator
// =============================================================================

#[test]
fn scenario_2_math_combines_two_variables() {
    let root = obj(&[("a", Value::UInt64(5)), ("b", Value::UInt64(6))]);
    assert_eq!(render("{math:{var:a}+{var:b}*2}", &root, RenderOptions::new()), "17");
}

// =============================================================================
// 3-4. loop — plain iteration and set= with a sub-path
// =============================================================================

#[test]
fn scenario_3_loop_iterates_the_current_array() {
    let root = Value::Array(vec![Value::UInt64(0), Value::UInt64(1), Value::UInt64(2), Value::UInt64(3)]);
    assert_eq!(render(r#"<loop value="v">{var:v},</loop>"#, &root, RenderOptions::new()), "0,1,2,3,");
}

#[test]
fn scenario_4_loop_set_resolves_a_path_and_binds_a_sub_index() {
    let list = Value::Array(vec![obj(&[("m", Value::UInt64(5))]), obj(&[("m", Value::UInt64(6))])]);
    let root = obj(&[("list", list)]);
    assert_eq!(
        render(r#"<loop set="list" value="r">{var:r[m]} </loop>"#, &root, RenderOptions::new()),
        "5 6 "
    );
}

// =============================================================================
// 5. if/elseif/else
// =============================================================================

#[test]
fn scenario_5_if_with_nested_var_in_case() {
    let root = obj(&[("x", Value::UInt64(1))]);
    assert_eq!(render(r#"<if case="{var:x}==1">yes<else/>no</if>"#, &root, RenderOptions::new()), "yes");
}

// =============================================================================
// 6. svar — format string substitution
// =============================================================================

#[test]
fn scenario_6_svar_substitutes_a_rendered_argument() {
    let root = obj(&[("fmt", Value::from("hi {0}!")), ("n", Value::from("world"))]);
    assert_eq!(render("{svar:fmt,{var:n}}", &root, RenderOptions::new()), "hi world!");
}

// =============================================================================
// 7-8. var escapes, raw does not
// =============================================================================

#[test]
fn scenario_7_var_html_escapes_by_default() {
    let root = obj(&[("s", Value::from("<b>"))]);
    assert_eq!(render("{var:s}", &root, RenderOptions::new()), "&lt;b&gt;");
}

#[test]
fn scenario_8_raw_passes_the_value_through_unescaped() {
    let root = obj(&[("s", Value::from("<b>"))]);
    assert_eq!(render("{raw:s}", &root, RenderOptions::new()), "<b>");
}
