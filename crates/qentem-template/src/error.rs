use std::fmt;

/// The engine's one propagated error class — everything lexical or semantic
/// is handled by falling back to verbatim emission instead (see the tag
/// renderer), never by returning `Err`.
#[derive(Debug)]
pub enum RenderError {
    /// The sink refused to accept more bytes (e.g. a wrapped `io::Write`
    /// returned an error). The sink's contents up to this point are
    /// observable but not guaranteed to end on a tag boundary.
    Sink(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sink(message) => write!(f, "sink rejected output: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}
