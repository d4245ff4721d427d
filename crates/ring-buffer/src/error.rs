//! Ring Buffer Error Types

use thiserror::Error;

/// Errors returned by a non-blocking push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError<T> {
    /// Buffer is at capacity; the rejected value is handed back
    #[error("ring buffer full")]
    Full(T),
}

impl<T> PushError<T> {
    /// Recover the value that could not be pushed
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(value) => value,
        }
    }
}
