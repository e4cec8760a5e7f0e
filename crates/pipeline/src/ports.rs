//! Port traits implemented by infrastructure crates.
//!
//! Each trait describes one external capability. Stages in the `nodes` crate
//! depend only on these traits, so every stage can be exercised in isolation
//! with in-memory test doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{PipelineError, RepoPath, Timestamp, TopicLine};

// ---------------------------------------------------------------------------
// Topic queue
// ---------------------------------------------------------------------------

/// Destructive FIFO source of topic lines.
pub trait TopicSource: Send + Sync {
    /// Removes and returns the next topic, or `Ok(None)` when the queue is empty.
    fn next_topic(&self) -> Result<Option<TopicLine>, PipelineError>;
}

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

/// One chat-style completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated text, trimmed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError>;
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
        }
    }
}

/// Image-search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageQuery {
    pub term: String,
    /// Content-type filter, e.g. `"photo"`.
    pub image_type: String,
    pub orientation: Orientation,
    pub safe_search: bool,
    pub per_page: u32,
}

/// One image-search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHit {
    /// Download URL of the large rendition, when the service provided one.
    pub url: Option<String>,
    /// Popularity metric used for ranking.
    pub likes: u64,
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Returns the first page of hits in service order.
    async fn search(&self, query: &ImageQuery) -> Result<Vec<ImageHit>, PipelineError>;
}

/// Image-synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub prompt: String,
    /// Resolution as `WIDTHxHEIGHT`.
    pub size: String,
    /// Quality tier, e.g. `"standard"` or `"hd"`.
    pub quality: String,
    pub count: u8,
}

#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Returns URLs of the synthesised images.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<String>, PipelineError>;
}

#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, PipelineError>;
}

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

/// Descriptor of a file stored in the target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub path: RepoPath,
    pub html_url: String,
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Returns `Ok(None)` when no file exists at `path`.
    async fn get_file(&self, path: &RepoPath) -> Result<Option<RemoteFile>, PipelineError>;

    /// Creates a new file.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PublishConflict`] if `path` already exists; the existing
    /// content is left untouched.
    async fn create_file(
        &self,
        path: &RepoPath,
        message: &str,
        content: &[u8],
    ) -> Result<RemoteFile, PipelineError>;
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock [`Clock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
