use std::fmt;

/// Failure from an `HArray` mutation. These are all caller-logic errors
/// (the key was missing, or the target name collided) rather than allocation
/// failures — `HArray` has no fallible-allocation surface of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HArrayError {
    /// `rename` was asked to move a key that isn't present.
    KeyNotFound,
    /// `rename`'s destination name is already taken by another entry.
    KeyAlreadyExists,
}

impl fmt::Display for HArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "key not found"),
            Self::KeyAlreadyExists => write!(f, "destination key already exists"),
        }
    }
}

impl std::error::Error for HArrayError {}
