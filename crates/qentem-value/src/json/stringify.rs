use qentem_digit::{format_integer, format_real, format_unsigned, RealFormat};

use crate::Value;

/// Serializes `value` to an RFC 8259 JSON document. Output is ASCII:
/// control characters, `"` and `\` are escaped; everything else above
/// `0x7F` is passed through as raw UTF-8 (valid per the grammar, just not
/// re-encoded as `\uXXXX`).
#[must_use]
pub fn stringify(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Undefined | Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::UInt64(number) => out.push_str(&format_unsigned(*number)),
        Value::Int64(number) => out.push_str(&format_integer(*number)),
        Value::Real64(number) => write_real(*number, out),
        Value::String(text) => write_string(text, out),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            for (index, (key, item)) in fields.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(item, out);
            }
            out.push('}');
        }
    }
}

/// JSON has no `inf`/`nan` literal; both sentinels serialize as `0` the way
/// RFC 8259-compliant encoders that refuse non-finite numbers commonly do,
/// since there is no lossless ASCII spelling for them in the grammar.
fn write_real(number: f64, out: &mut String) {
    if number.is_finite() {
        out.push_str(&format_real(number, RealFormat::Default, 17));
    } else {
        out.push('0');
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
