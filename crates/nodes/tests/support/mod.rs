//! In-memory test doubles for every pipeline port.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pipeline::format::SiteLayout;
use pipeline::{
    Clock, CompletionRequest, ContentRepository, ImageDownloader, ImageHit, ImageQuery,
    ImageSearch, ImageSynthesizer, PipelineError, RemoteFile, RepoPath, SynthesisRequest,
    TextGenerator, Timestamp, TopicLine, TopicSource,
};

use nodes::{
    ArticleGenerator, CategoryClassifier, ImageProvider, PipelineExecutor, Publisher,
    SearchImageProvider,
};

pub const ARTICLE: &str = "\
Seoul After Dark: Where Locals Really Eat
The night-market map my grandmother drew for me

When I was growing up, Friday meant tteokbokki at Gwangjang.

## 🍢 Skip Myeongdong, Head to Mangwon
Insider tip one. Insider tip two.

#SeoulFood #NightMarket #StreetVendor";

pub fn fixed_time() -> Timestamp {
    Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 5, 4, 21, 15, 30).unwrap())
}

// ---------------------------------------------------------------------------

pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryQueue {
    lines: Mutex<VecDeque<String>>,
}

impl MemoryQueue {
    pub fn with(lines: &[&str]) -> Self {
        Self {
            lines: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }
}

impl TopicSource for MemoryQueue {
    fn next_topic(&self) -> Result<Option<TopicLine>, PipelineError> {
        Ok(self
            .lines
            .lock()
            .unwrap()
            .pop_front()
            .and_then(TopicLine::new))
    }
}

// ---------------------------------------------------------------------------

/// Replays canned responses and records every request.
#[derive(Default)]
pub struct ScriptedText {
    responses: Mutex<VecDeque<Result<String, PipelineError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedText {
    pub fn replying(responses: Vec<Result<String, PipelineError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        }
    }

    pub fn ok(text: &str) -> Self {
        Self::replying(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PipelineError::unexpected("no scripted response left")))
    }
}

/// Always answers with the same text (a temperature-0 model).
pub struct ConstantText(pub String);

#[async_trait]
impl TextGenerator for ConstantText {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, PipelineError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------

pub struct FakeSearch {
    pub hits: Result<Vec<ImageHit>, PipelineError>,
    pub queries: Mutex<Vec<ImageQuery>>,
}

impl FakeSearch {
    pub fn with_hits(hits: Vec<(&str, u64)>) -> Self {
        Self {
            hits: Ok(hits
                .into_iter()
                .map(|(url, likes)| ImageHit {
                    url: Some(url.to_string()),
                    likes,
                })
                .collect()),
            queries: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageSearch for FakeSearch {
    async fn search(&self, query: &ImageQuery) -> Result<Vec<ImageHit>, PipelineError> {
        self.queries.lock().unwrap().push(query.clone());
        self.hits.clone()
    }
}

pub struct FakeSynthesizer {
    pub urls: Vec<String>,
    pub requests: Mutex<Vec<SynthesisRequest>>,
}

#[async_trait]
impl ImageSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<String>, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.urls.clone())
    }
}

#[derive(Default)]
pub struct FakeDownloader {
    pub urls: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageDownloader for FakeDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(format!("bytes of {url}").into_bytes())
    }
}

// ---------------------------------------------------------------------------

/// In-memory repository with GitHub's create-if-absent semantics.
#[derive(Default)]
pub struct MemoryRepo {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub creates: Mutex<Vec<String>>,
    /// Makes every `create_file` for a path under this prefix fail.
    pub fail_prefix: Option<String>,
}

impl MemoryRepo {
    pub fn with_file(path: &str, content: &[u8]) -> Self {
        let repo = Self::default();
        repo.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_vec());
        repo
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    fn remote(path: &RepoPath) -> RemoteFile {
        RemoteFile {
            path: path.clone(),
            html_url: format!("https://github.com/octo/blog/blob/main/{path}"),
        }
    }
}

#[async_trait]
impl ContentRepository for MemoryRepo {
    async fn get_file(&self, path: &RepoPath) -> Result<Option<RemoteFile>, PipelineError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .contains_key(path.as_str())
            .then(|| Self::remote(path)))
    }

    async fn create_file(
        &self,
        path: &RepoPath,
        _message: &str,
        content: &[u8],
    ) -> Result<RemoteFile, PipelineError> {
        self.creates.lock().unwrap().push(path.to_string());
        if let Some(prefix) = &self.fail_prefix {
            if path.as_str().starts_with(prefix.as_str()) {
                return Err(PipelineError::status("GitHub", 500, "Server Error"));
            }
        }
        let mut files = self.files.lock().unwrap();
        if files.contains_key(path.as_str()) {
            return Err(PipelineError::PublishConflict { path: path.clone() });
        }
        files.insert(path.to_string(), content.to_vec());
        Ok(Self::remote(path))
    }
}

// ---------------------------------------------------------------------------

/// Every double wired into one executor, kept for assertions.
pub struct Harness {
    pub queue: Arc<MemoryQueue>,
    pub article_text: Arc<ScriptedText>,
    pub category_text: Arc<ScriptedText>,
    pub search: Arc<FakeSearch>,
    pub downloader: Arc<FakeDownloader>,
    pub repo: Arc<MemoryRepo>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new(queue: &[&str], article: ScriptedText, category: ScriptedText) -> Self {
        Self {
            queue: Arc::new(MemoryQueue::with(queue)),
            article_text: Arc::new(article),
            category_text: Arc::new(category),
            search: Arc::new(FakeSearch::with_hits(vec![
                ("https://cdn.example/a.jpg", 3),
                ("https://cdn.example/b.jpg", 9),
            ])),
            downloader: Arc::new(FakeDownloader::default()),
            repo: Arc::new(MemoryRepo::default()),
            clock: Arc::new(FixedClock(fixed_time())),
        }
    }

    pub fn executor(&self, image_dir: &Path) -> PipelineExecutor {
        let images: Arc<dyn ImageProvider> = Arc::new(SearchImageProvider::new(
            self.search.clone(),
            self.downloader.clone(),
            self.clock.clone(),
            image_dir,
        ));
        PipelineExecutor::new(
            self.queue.clone(),
            ArticleGenerator::new(self.article_text.clone()),
            CategoryClassifier::new(self.category_text.clone()),
            Some(images),
            Publisher::new(self.repo.clone(), self.clock.clone(), SiteLayout::Jekyll),
        )
    }

    pub fn service_calls(&self) -> usize {
        self.article_text.calls() + self.category_text.calls() + self.search.calls()
    }
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
