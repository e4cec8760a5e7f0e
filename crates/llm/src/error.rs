//! Provider-local errors and their mapping onto [`PipelineError`].

use pipeline::PipelineError;
use serde::Deserialize;
use thiserror::Error;

/// Failures of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response contained no {0}")]
    Empty(&'static str),
}

impl ProviderError {
    /// Converts into the domain error, labelled with the service that failed.
    pub fn into_pipeline(self, service: &str) -> PipelineError {
        match self {
            Self::Status { status, message } => PipelineError::status(service, status, message),
            other => PipelineError::transport(service, other),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts `error.message` from an OpenAI error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
