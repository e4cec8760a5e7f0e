//! Blog Studio pipeline stages and executor.
//!
//! This crate provides the four service-backed stages (article generation,
//! category assignment, image provision, publishing) and the
//! [`PipelineExecutor`] that runs them in order for one queued topic.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between business logic in the
//! [`pipeline`] crate and infrastructure traits (queue, LLM, image services,
//! GitHub). They own prompts and stage parameters but no transport details.

pub mod article;
pub mod category;
pub mod executor;
pub mod image;
pub mod prompts;
pub mod publish;

pub use article::ArticleGenerator;
pub use category::CategoryClassifier;
pub use executor::{PipelineExecutor, RunOutcome, RunReport, RunState, Stage, StageFailure};
pub use image::{GeneratedImageProvider, ImageAsset, ImageProvider, SearchImageProvider};
pub use publish::Publisher;
