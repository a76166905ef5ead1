//! Error types for binding surfaces and running animation callbacks.

use thiserror::Error;

/// Attaching a surface to a target failed. Nothing is registered.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("requires a canvas element")]
    NotACanvas,

    #[error("2d drawing context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("invalid surface options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Failure raised by an animation callback.
///
/// Returned from [`Surface::start`](crate::Surface::start) when the
/// synchronous first invocation fails; during a tick it is handed to the
/// frame host instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("animation callback failed: {message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result type returned by animation callbacks.
pub type AnimResult = Result<(), CallbackError>;
