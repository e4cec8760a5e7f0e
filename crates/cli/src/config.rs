//! Command-line and environment configuration.
//!
//! Every option is a flag with an environment-variable fallback. Required
//! credentials are declared optional at the clap level so that all missing
//! values are reported together as one [`PipelineError::Configuration`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use github::GitHubConfig;
use llm::OpenAiConfig;
use pipeline::format::SiteLayout;
use pipeline::{PipelineError, RepositoryId};

use crate::telemetry::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "blog-studio")]
#[command(
    version,
    about = "Generate one travel article from the topic queue and publish it to GitHub"
)]
pub struct Args {
    /// API key for the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = llm::DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Chat model used for articles, categories and image prompts.
    #[arg(long, env = "OPENAI_MODEL", default_value = llm::DEFAULT_CHAT_MODEL)]
    pub openai_model: String,

    #[arg(long, env = "OPENAI_IMAGE_MODEL", default_value = llm::DEFAULT_IMAGE_MODEL)]
    pub openai_image_model: String,

    /// Token with contents write access to the blog repository.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Blog repository as `owner/repo`.
    #[arg(long, env = "GITHUB_REPO_NAME")]
    pub github_repo: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Branch to commit to; the repository default branch when unset.
    #[arg(long, env = "GITHUB_BRANCH")]
    pub github_branch: Option<String>,

    #[arg(long, env = "BLOG_IMAGE_SOURCE", value_enum, default_value_t = ImageSource::Search)]
    pub image_source: ImageSource,

    /// Required when `--image-source search`.
    #[arg(long, env = "PIXABAY_API_KEY", hide_env_values = true)]
    pub pixabay_api_key: Option<String>,

    #[arg(long, env = "PIXABAY_API_URL", default_value = images::DEFAULT_PIXABAY_URL)]
    pub pixabay_api_url: String,

    #[arg(long, env = "BLOG_SITE_LAYOUT", value_enum, default_value_t = LayoutArg::Jekyll)]
    pub site_layout: LayoutArg,

    /// Queue file, one topic line per line.
    #[arg(long, env = "BLOG_TOPICS_FILE", default_value = "topics.txt")]
    pub topics_file: PathBuf,

    /// Directory for transient image files. Defaults to the system temp dir.
    #[arg(long, env = "BLOG_IMAGE_DIR")]
    pub image_dir: Option<PathBuf>,

    #[arg(long, env = "BLOG_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; spans are exported only when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

/// Cover image strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageSource {
    /// Stock photo search.
    Search,
    /// Prompt derivation plus image synthesis.
    Generate,
    /// Publish without a cover image.
    #[value(name = "none")]
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Jekyll,
    Hugo,
}

impl From<LayoutArg> for SiteLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Jekyll => SiteLayout::Jekyll,
            LayoutArg::Hugo => SiteLayout::Hugo,
        }
    }
}

/// Resolved image strategy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSettings {
    Search { api_key: String, endpoint: String },
    Generate,
    Disabled,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub github: GitHubConfig,
    pub images: ImageSettings,
    pub layout: SiteLayout,
    pub topics_file: PathBuf,
    pub image_dir: PathBuf,
}

/// Treats blank values as absent.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] naming every missing variable, or
    /// describing a malformed repository name.
    pub fn from_args(args: Args) -> Result<Self, PipelineError> {
        let api_key = present(args.openai_api_key);
        let token = present(args.github_token);
        let repo = present(args.github_repo);
        let pixabay_key = present(args.pixabay_api_key);

        let mut missing = Vec::new();
        if api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if token.is_none() {
            missing.push("GITHUB_TOKEN");
        }
        if repo.is_none() {
            missing.push("GITHUB_REPO_NAME");
        }
        if args.image_source == ImageSource::Search && pixabay_key.is_none() {
            missing.push("PIXABAY_API_KEY");
        }

        let (Some(api_key), Some(token), Some(repo)) = (api_key, token, repo) else {
            return Err(missing_error(&missing));
        };
        let images = match args.image_source {
            ImageSource::Search => ImageSettings::Search {
                api_key: pixabay_key.ok_or_else(|| missing_error(&missing))?,
                endpoint: args.pixabay_api_url,
            },
            ImageSource::Generate => ImageSettings::Generate,
            ImageSource::Disabled => ImageSettings::Disabled,
        };

        let repository = RepositoryId::parse(&repo).ok_or_else(|| {
            PipelineError::configuration(format!(
                "GITHUB_REPO_NAME must have the form 'owner/repo', got '{repo}'"
            ))
        })?;

        Ok(Self {
            openai: OpenAiConfig {
                api_key,
                base_url: args.openai_base_url,
                chat_model: args.openai_model,
                image_model: args.openai_image_model,
            },
            github: GitHubConfig {
                token,
                repository,
                api_url: args.github_api_url.trim_end_matches('/').to_string(),
                branch: present(args.github_branch),
            },
            images,
            layout: args.site_layout.into(),
            topics_file: args.topics_file,
            image_dir: args.image_dir.unwrap_or_else(std::env::temp_dir),
        })
    }
}

fn missing_error(missing: &[&str]) -> PipelineError {
    PipelineError::configuration(format!(
        "missing required configuration: {}",
        missing.join(", ")
    ))
}
