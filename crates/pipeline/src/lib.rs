//! Core publishing domain for Blog Studio.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used throughout the pipeline, plus the pure parsing and
//! formatting rules that decide what gets published. Infrastructure crates
//! implement the traits defined in [`ports`]; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineRunId`, `RepoPath`, `RepositoryId`) |
//! | [`types`] | Value types flowing between stages (`TopicLine`, `Article`, `Timestamp`, ...) |
//! | [`errors`] | `PipelineError` and its `ErrorKind` classification |
//! | [`keywords`] | Topic line → primary/secondary keywords |
//! | [`category`] | The fixed category set and model-output matching |
//! | [`format`] | Slugs, filenames, frontmatter, post assembly |
//! | [`ports`] | Traits for the queue, generators, image services, repository, clock |

pub mod category;
pub mod errors;
pub mod format;
pub mod identifiers;
pub mod keywords;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use category::Category;
pub use errors::{ErrorKind, PipelineError};
pub use identifiers::{PipelineRunId, RepoPath, RepositoryId};
pub use ports::{
    Clock, CompletionRequest, ContentRepository, ImageDownloader, ImageHit, ImageQuery,
    ImageSearch, ImageSynthesizer, Orientation, RemoteFile, SynthesisRequest, SystemClock,
    TextGenerator, TopicSource,
};
pub use types::{Article, ParsedTopic, PublishedPost, Timestamp, TopicLine};
