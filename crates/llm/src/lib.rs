//! Blog Studio LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::TextGenerator`] and [`pipeline::ImageSynthesizer`]
//! traits for OpenAI-compatible APIs (`/chat/completions` and
//! `/images/generations`). Additional providers are added as new `impl` blocks
//! in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting and response
//! parsing live here. The [`pipeline`] crate sees only the port traits.
//!
//! No retry or back-off is applied: a failed call is reported once and the run
//! is abandoned by the orchestrator.

mod error;
mod openai;

pub use error::ProviderError;
pub use openai::{OpenAiConfig, OpenAiProvider, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL};
