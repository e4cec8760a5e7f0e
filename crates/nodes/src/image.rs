//! Image Provider stage.
//!
//! Two interchangeable strategies sit behind [`ImageProvider`]:
//!
//! - [`SearchImageProvider`]: stock photo search, most-liked hit wins.
//! - [`GeneratedImageProvider`]: derive a photographic prompt from the article,
//!   then synthesise an image.
//!
//! Both save the bytes to a transient local file owned by an [`ImageAsset`].
//! The asset deletes its file when dropped, so the file is released on every
//! path through the pipeline.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::format::image_file_name;
use pipeline::{
    Article, Clock, CompletionRequest, ImageDownloader, ImageQuery, ImageSearch,
    ImageSynthesizer, Orientation, ParsedTopic, PipelineError, SynthesisRequest, TextGenerator,
};
use tracing::{debug, info, instrument, warn};

use crate::prompts;

// ---------------------------------------------------------------------------
// Transient image file
// ---------------------------------------------------------------------------

/// A locally saved image. The file is removed when the asset is dropped.
#[derive(Debug)]
pub struct ImageAsset {
    path: PathBuf,
    file_name: String,
}

impl ImageAsset {
    /// Writes `bytes` to `dir/file_name`.
    pub async fn save(dir: &Path, file_name: String, bytes: &[u8]) -> Result<Self, PipelineError> {
        let asset = Self {
            path: dir.join(&file_name),
            file_name,
        };
        // A partially written file is cleaned up by `Drop` on the error path.
        tokio::fs::write(&asset.path, bytes).await.map_err(|e| {
            PipelineError::unexpected(format!(
                "failed to save image to {}: {e}",
                asset.path.display()
            ))
        })?;
        debug!(path = %asset.path.display(), bytes = bytes.len(), "Image saved");
        Ok(asset)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub async fn read(&self) -> Result<Vec<u8>, PipelineError> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            PipelineError::unexpected(format!(
                "failed to read image {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl Drop for ImageAsset {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Cleaned up temporary image file"),
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove temporary image file"),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy interface
// ---------------------------------------------------------------------------

/// Produces a cover image for a topic.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short strategy label for logs.
    fn name(&self) -> &'static str;

    async fn provide(
        &self,
        topic: &ParsedTopic,
        article: &Article,
    ) -> Result<ImageAsset, PipelineError>;
}

// ---------------------------------------------------------------------------
// Search strategy
// ---------------------------------------------------------------------------

const SEARCH_SERVICE: &str = "Image search";
const RESULTS_PER_PAGE: u32 = 10;

pub struct SearchImageProvider {
    search: Arc<dyn ImageSearch>,
    downloader: Arc<dyn ImageDownloader>,
    clock: Arc<dyn Clock>,
    dir: PathBuf,
}

impl SearchImageProvider {
    pub fn new(
        search: Arc<dyn ImageSearch>,
        downloader: Arc<dyn ImageDownloader>,
        clock: Arc<dyn Clock>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            search,
            downloader,
            clock,
            dir: dir.into(),
        }
    }

    pub fn query(term: &str) -> ImageQuery {
        ImageQuery {
            term: term.to_string(),
            image_type: "photo".to_string(),
            orientation: Orientation::Horizontal,
            safe_search: true,
            per_page: RESULTS_PER_PAGE,
        }
    }
}

#[async_trait]
impl ImageProvider for SearchImageProvider {
    fn name(&self) -> &'static str {
        "search"
    }

    #[instrument(skip_all, fields(strategy = "search", term = topic.primary()))]
    async fn provide(
        &self,
        topic: &ParsedTopic,
        _article: &Article,
    ) -> Result<ImageAsset, PipelineError> {
        let term = topic.primary();
        let hits = self.search.search(&Self::query(term)).await?;

        // `rev` so that the first of several equally liked hits wins.
        let best = hits
            .into_iter()
            .rev()
            .max_by_key(|hit| hit.likes)
            .ok_or_else(|| {
                PipelineError::transport(SEARCH_SERVICE, format!("no images found for '{term}'"))
            })?;
        let url = best.url.ok_or_else(|| {
            PipelineError::transport(SEARCH_SERVICE, "best result has no image URL")
        })?;
        info!(likes = best.likes, url = %url, "Selected image");

        let bytes = self.downloader.download(&url).await?;
        let file_name = image_file_name(term, self.clock.now(), "jpg");
        ImageAsset::save(&self.dir, file_name, &bytes).await
    }
}

// ---------------------------------------------------------------------------
// Generation strategy
// ---------------------------------------------------------------------------

const SYNTHESIS_SERVICE: &str = "Image generation";
const EXCERPT_CHARS: usize = 1000;
const IMAGE_SIZE: &str = "1792x1024";
const IMAGE_QUALITY: &str = "standard";

pub struct GeneratedImageProvider {
    text: Arc<dyn TextGenerator>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    downloader: Arc<dyn ImageDownloader>,
    clock: Arc<dyn Clock>,
    dir: PathBuf,
}

impl GeneratedImageProvider {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        synthesizer: Arc<dyn ImageSynthesizer>,
        downloader: Arc<dyn ImageDownloader>,
        clock: Arc<dyn Clock>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            text,
            synthesizer,
            downloader,
            clock,
            dir: dir.into(),
        }
    }

    /// The first [`EXCERPT_CHARS`] characters of the article.
    pub fn excerpt(article: &Article) -> &str {
        let raw = article.raw();
        match raw.char_indices().nth(EXCERPT_CHARS) {
            Some((end, _)) => &raw[..end],
            None => raw,
        }
    }

    pub fn prompt_request(topic: &ParsedTopic, article: &Article) -> CompletionRequest {
        CompletionRequest {
            system_prompt: prompts::IMAGE_PROMPT_SYSTEM_PROMPT.to_string(),
            user_prompt: prompts::image_prompt_user_prompt(topic.primary(), Self::excerpt(article)),
            temperature: 0.5,
            max_tokens: 200,
        }
    }
}

#[async_trait]
impl ImageProvider for GeneratedImageProvider {
    fn name(&self) -> &'static str {
        "generate"
    }

    #[instrument(skip_all, fields(strategy = "generate", primary = topic.primary()))]
    async fn provide(
        &self,
        topic: &ParsedTopic,
        article: &Article,
    ) -> Result<ImageAsset, PipelineError> {
        let prompt = self
            .text
            .complete(&Self::prompt_request(topic, article))
            .await?;
        debug!(prompt = %prompt, "Image prompt derived");

        let request = SynthesisRequest {
            prompt,
            size: IMAGE_SIZE.to_string(),
            quality: IMAGE_QUALITY.to_string(),
            count: 1,
        };
        let url = self
            .synthesizer
            .synthesize(&request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::transport(SYNTHESIS_SERVICE, "no image URL returned"))?;

        let bytes = self.downloader.download(&url).await?;
        let file_name = image_file_name(topic.primary(), self.clock.now(), "png");
        ImageAsset::save(&self.dir, file_name, &bytes).await
    }
}
