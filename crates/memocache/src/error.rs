//! Error types for memocache

use std::fmt;

/// Result type alias for memocache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or inspecting a [`Memo`](crate::Memo)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A bounded configuration was given a capacity of zero
    ZeroCapacity,

    /// Store and recency tracker disagree
    Invariant(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Capacity must be greater than 0"),
            Error::Invariant(msg) => write!(f, "Invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
