//! Error types for Inkpress.
//!
//! Library crates use [`InkpressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Failure modes of a single generation call.
///
/// One attempt per call; there is no retry layer, so each kind is terminal
/// for its unit of work.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Transport failure or a non-auth HTTP error from the endpoint.
    #[error("generation network error: {0}")]
    Network(String),

    /// The endpoint rejected our credentials (HTTP 401/403).
    #[error("generation auth error: {0}")]
    Auth(String),

    /// The endpoint answered but produced no usable text.
    #[error("generation returned an empty response")]
    EmptyResponse,
}

/// Failure modes of a publish call.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The CMS rejected our credentials (HTTP 401/403).
    #[error("publish auth error: {0}")]
    Auth(String),

    /// Transport failure talking to the CMS.
    #[error("publish network error: {0}")]
    Network(String),

    /// The CMS accepted the connection but rejected the payload.
    #[error("publish rejected by remote (HTTP {status}): {message}")]
    RemoteRejected { status: u16, message: String },
}

/// Top-level error type for all Inkpress operations.
#[derive(Debug, thiserror::Error)]
pub enum InkpressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Topic lookup failure (sheet unreachable, malformed, or row missing).
    #[error("topic source error: {message}")]
    Source { message: String },

    /// A generation call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The model output could not be shaped into a usable post.
    #[error("assembly error: {message}")]
    Assembly { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A publish call failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InkpressError>;

impl InkpressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a topic source error from any displayable message.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    /// Create an assembly error from any displayable message.
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
