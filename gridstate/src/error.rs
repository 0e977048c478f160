//! Error types

use std::error::Error;

/// Error raised when a dotted path string is malformed.
///
/// Path validation happens synchronously at [`Pointer::parse`] time, before
/// the path reaches the engine; a malformed path never participates in a
/// pipeline run.
///
/// [`Pointer::parse`]: crate::pointer::Pointer::parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    /// The path string is empty.
    #[error("empty path")]
    Empty,
    /// The path contains an empty segment (e.g. `foo..bar` or `foo.`).
    #[error("empty segment in path `{0}`")]
    EmptySegment(String),
}

/// Error produced by a pipeline stage during execution.
///
/// Stage errors raised inside a deferred [`exec`] run are caught, published
/// on the event channel as an execution-error event, and suppressed — they
/// never propagate to the caller that triggered the execution. [`eval`]
/// returns them directly instead, since it has no event channel.
///
/// The original error raised by a custom factory is retained and reachable
/// through [`std::error::Error::source`].
///
/// [`exec`]: crate::TableEngine::exec
/// [`eval`]: crate::TableEngine::eval
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StageError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl StageError {
    /// Creates a stage error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error raised by a stage implementation.
    pub fn from_source(source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the stage error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for StageError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for StageError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
