//! Top-level error types for the Blog Studio pipeline domain.
//!
//! Every stage returns `Result<_, PipelineError>`. Callers branch on
//! [`PipelineError::kind`] rather than inspecting message text, so article
//! content that happens to contain the word "Error:" can never be mistaken for
//! a failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RepoPath;

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Coarse classification of a [`PipelineError`].
///
/// All kinds abort the current run; the kind only decides how the failure is
/// reported and which exit code the CLI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed credentials / target identifiers.
    Configuration,
    /// The topic queue file could not be read or rewritten.
    Queue,
    /// A topic line or generated article did not have the required shape.
    Parse,
    /// A remote service (text/image generation, image search, GitHub) failed.
    Upstream,
    /// The post path already exists in the target repository.
    PublishConflict,
    /// Anything else caught at a stage boundary.
    Unexpected,
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a pipeline run.
///
/// No variant is retried automatically. The run is abandoned and the message is
/// surfaced verbatim to the operator.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineError {
    /// The runtime configuration is invalid.
    ///
    /// Produced at start-up; the pipeline never starts with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The topic queue could not be accessed.
    #[error("Topic queue error ({path}): {message}")]
    Queue {
        /// Queue file location as configured.
        path: String,
        /// Underlying I/O failure.
        message: String,
    },

    /// Input did not have the expected structure.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what was missing or malformed.
        message: String,
    },

    /// A remote service returned an error or an unusable response.
    #[error("{}", upstream_message(.service, .status, .detail))]
    Upstream {
        /// Human-readable service label (e.g. `"OpenAI chat"`, `"GitHub"`).
        service: String,
        /// HTTP status code when the failure came from a response.
        status: Option<u16>,
        /// Upstream detail text (response body, transport error).
        detail: String,
    },

    /// The target path already exists; nothing was overwritten.
    #[error("A file at '{path}' already exists")]
    PublishConflict {
        /// The repository path that collided.
        path: RepoPath,
    },

    /// An unexpected failure caught at a stage boundary.
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
    },
}

fn upstream_message(service: &str, status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("{service} API error (Status: {code}) - {detail}"),
        None => format!("{service} error - {detail}"),
    }
}

impl PipelineError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Queue { .. } => ErrorKind::Queue,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::PublishConflict { .. } => ErrorKind::PublishConflict,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Builds an [`PipelineError::Upstream`] error with no HTTP status
    /// (transport failure or unusable response body).
    pub fn transport(service: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service: service.into(),
            status: None,
            detail: detail.to_string(),
        }
    }

    /// Builds an [`PipelineError::Upstream`] error for a non-success HTTP status.
    pub fn status(service: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn unexpected(message: impl std::fmt::Display) -> Self {
        Self::Unexpected {
            message: message.to_string(),
        }
    }
}
