use crate::RenderError;

/// A byte-appending output. The renderer never builds the whole result in
/// memory on the caller's behalf beyond what the sink itself does — it
/// just calls `append` once per literal run or stringified tag result.
pub trait Sink {
    fn append(&mut self, bytes: &[u8]) -> Result<(), RenderError>;
}

impl Sink for String {
    fn append(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                self.push_str(text);
                Ok(())
            }
            Err(err) => Err(RenderError::Sink(err.to_string())),
        }
    }
}

impl Sink for Vec<u8> {
    fn append(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapts any `std::io::Write` into a [`Sink`], turning I/O failures into
/// the engine's one fatal error class.
pub struct IoSink<W: std::io::Write>(pub W);

impl<W: std::io::Write> Sink for IoSink<W> {
    fn append(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.0.write_all(bytes).map_err(|err| RenderError::Sink(err.to_string()))
    }
}
