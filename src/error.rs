//! Error type shared by every manipulation.

use thiserror::Error;

use crate::operation::Outcome;

/// Errors that can occur while building buffers or running manipulations.
///
/// Argument and range errors are raised before any pixel is written, so a
/// failed call never leaves the working buffer half-modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManipError {
    /// Missing, malformed or out-of-range parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Pixel id outside the buffer extent.
    #[error("Pixel index {id} out of range (buffer holds {len} pixels)")]
    IndexOutOfRange { id: usize, len: usize },

    /// Operation requested before a buffer was attached.
    #[error("{0} called before ready; attach a buffer first")]
    NotReady(String),

    /// Sample count does not match `width * height * 4`.
    #[error(
        "Buffer size mismatch for {width}x{height}: expected {expected} samples, got {actual}"
    )]
    ShapeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// A buffer was already attached; initialisation cannot run twice.
    #[error("Session is already initialised")]
    AlreadyReady,
}

impl ManipError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ManipError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ManipError>;

/// A deferred replay that stopped early.
///
/// `completed` holds the outcomes of the operations that ran before the
/// failure, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source} (after {} replayed operations)", .completed.len())]
pub struct ReplayError {
    pub completed: Vec<Outcome>,
    #[source]
    pub source: ManipError,
}

impl From<ManipError> for ReplayError {
    fn from(source: ManipError) -> Self {
        Self {
            completed: Vec::new(),
            source,
        }
    }
}
