//! Qentem: a data-driven text template engine with an embedded expression
//! evaluator, backed by a dynamic JSON-like value tree.
//!
//! This crate is the public facade over the workspace's component crates —
//! it re-exports the value tree, its JSON codec, the ordered map used for
//! object values, and the template renderer, so a caller never needs to
//! depend on the component crates directly.
//!
//! ```
//! use qentem::{render, RenderOptions, Value};
//!
//! let root = Value::from("world");
//! assert_eq!(render("hello {var:}", &root, RenderOptions::new()), "hello world");
//! ```

pub mod json {
    //! RFC 8259 JSON parsing and serialization over [`crate::Value`].
    pub use qentem_value::{parse, stringify, JsonError};
}

pub use qentem_harray::{HArray, HArrayError};
pub use qentem_template::{render, render_into, EvalValue, ExprError, IoSink, RenderError, RenderOptions, Sink};
pub use qentem_value::Value;
