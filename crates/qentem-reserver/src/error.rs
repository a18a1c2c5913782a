use std::fmt;

/// Fatal failure from the allocator: the caller's class-3 error per the
/// engine's error handling design (propagated, never swallowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserverError {
    /// The OS-backed block allocation failed (zero-sized request or the
    /// underlying allocation could not be made).
    OutOfMemory,
}

impl fmt::Display for ReserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "reserver: failed to grow a new block"),
        }
    }
}

impl std::error::Error for ReserverError {}
