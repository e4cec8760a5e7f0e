//! Blog Studio GitHub infrastructure adapter.
//!
//! Implements [`pipeline::ContentRepository`] over the GitHub REST contents API:
//!
//! - `GET  /repos/{owner}/{repo}/contents/{path}`: existence check (404 → absent)
//! - `PUT  /repos/{owner}/{repo}/contents/{path}`: create (no `sha`, so an
//!   existing file is rejected by GitHub rather than overwritten)
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Authentication,
//! headers, base64 encoding and status mapping are handled here; the
//! [`pipeline`] crate never sees them.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pipeline::{ContentRepository, PipelineError, RemoteFile, RepoPath, RepositoryId};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const SERVICE: &str = "GitHub";
const USER_AGENT: &str = concat!("blog-studio/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Target repository and credentials.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub repository: RepositoryId,
    /// REST API root without trailing slash.
    pub api_url: String,
    /// Branch to commit to; the repository default branch when `None`.
    pub branch: Option<String>,
}

impl GitHubConfig {
    pub fn new(token: impl Into<String>, repository: RepositoryId) -> Self {
        Self {
            token: token.into(),
            repository,
            api_url: DEFAULT_API_URL.to_string(),
            branch: None,
        }
    }
}

/// GitHub contents-API client.
#[derive(Debug, Clone)]
pub struct GitHubContents {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubContents {
    pub fn new(config: GitHubConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: GitHubConfig) -> Self {
        Self { http, config }
    }

    fn contents_url(&self, path: &RepoPath) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.repository.owner(),
            self.config.repository.name(),
            path.as_str().trim_start_matches('/')
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.config.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateFileRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ContentDescriptor {
    path: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateFileResponse {
    content: ContentDescriptor,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl ContentDescriptor {
    fn into_remote(self, requested: &RepoPath) -> RemoteFile {
        RemoteFile {
            path: RepoPath::new(self.path).unwrap_or_else(|| requested.clone()),
            html_url: self.html_url.unwrap_or_default(),
        }
    }
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Maps a failed create response onto the domain error.
///
/// GitHub answers 422 when a file exists and no `sha` was supplied, and 409 on
/// a branch-level conflict. Both mean the post was not written.
fn create_failure(status: StatusCode, body: &str, path: &RepoPath) -> PipelineError {
    match status {
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => PipelineError::PublishConflict {
            path: path.clone(),
        },
        _ => PipelineError::status(SERVICE, status.as_u16(), error_detail(body)),
    }
}

// ---------------------------------------------------------------------------
// ContentRepository
// ---------------------------------------------------------------------------

#[async_trait]
impl ContentRepository for GitHubContents {
    #[instrument(skip(self), fields(repository = %self.config.repository))]
    async fn get_file(&self, path: &RepoPath) -> Result<Option<RemoteFile>, PipelineError> {
        let mut request = self.authorized(self.http.get(self.contents_url(path)));
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::transport(SERVICE, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("File does not exist");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::status(
                SERVICE,
                status.as_u16(),
                error_detail(&body),
            ));
        }

        let descriptor: ContentDescriptor = response
            .json()
            .await
            .map_err(|e| PipelineError::transport(SERVICE, e))?;
        Ok(Some(descriptor.into_remote(path)))
    }

    #[instrument(skip(self, content), fields(repository = %self.config.repository, bytes = content.len()))]
    async fn create_file(
        &self,
        path: &RepoPath,
        message: &str,
        content: &[u8],
    ) -> Result<RemoteFile, PipelineError> {
        let body = CreateFileRequest {
            message,
            content: BASE64.encode(content),
            branch: self.config.branch.as_deref(),
        };
        let response = self
            .authorized(self.http.put(self.contents_url(path)))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(create_failure(status, &body, path));
        }

        let created: CreateFileResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::transport(SERVICE, e))?;
        let remote = created.content.into_remote(path);
        info!(path = %remote.path, url = %remote.html_url, "File created");
        Ok(remote)
    }
}
