//! Renders a template string against a [`qentem_value::Value`] tree: plain
//! text passes through unchanged, recognized tags are replaced by whatever
//! they resolve to, and anything lexically or semantically broken is
//! emitted verbatim instead of failing the render.
//!
//! The only way this crate returns an `Err` is a sink refusing output (see
//! [`RenderError`]) — everything else falls back to the original text.

mod attrs;
mod error;
mod escape;
mod expr;
mod if_engine;
mod loop_engine;
mod render;
mod scanner;
mod scope;
mod sink;

pub use error::RenderError;
pub use expr::{evaluate, EvalValue, ExprError};
pub use render::{render, render_into, RenderOptions};
pub use sink::{IoSink, Sink};
