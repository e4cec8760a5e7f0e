//! Blog Studio CLI entry point.
//!
//! This binary is the composition root. Each invocation:
//!
//! 1. **Parses configuration** from flags and environment ([`config::Args`])
//!    and validates it into an [`config::AppConfig`]. A `.env` file in the
//!    working directory (or a parent) is loaded first; variables already set
//!    in the process environment take precedence over it.
//! 2. **Wires observability**: `tracing-subscriber` with a text or JSON layer,
//!    plus an OpenTelemetry OTLP exporter when an endpoint is configured.
//! 3. **Constructs infrastructure** (`FileTopicQueue`, `OpenAiProvider`,
//!    `PixabayClient`, `HttpDownloader`, `GitHubContents`) and injects it into
//!    a [`PipelineExecutor`].
//! 4. **Runs once**: at most one topic is taken from the queue and published.
//!
//! Exit codes: `0` on success or an empty queue, `1` when a stage fails, `2`
//! for configuration errors.

mod config;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use github::GitHubContents;
use images::{HttpDownloader, PixabayClient};
use llm::OpenAiProvider;
use nodes::{
    ArticleGenerator, CategoryClassifier, GeneratedImageProvider, ImageProvider,
    PipelineExecutor, Publisher, RunOutcome, SearchImageProvider,
};
use pipeline::{Clock, SystemClock};
use queue::FileTopicQueue;
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, Args, ImageSettings};

const EXIT_STAGE_FAILURE: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing `.env` is normal; the real environment may hold everything.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    let telemetry = match telemetry::init(args.log_format, args.otlp_endpoint.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let code = run(args).await;
    telemetry.shutdown();
    code
}

async fn run(args: Args) -> ExitCode {
    let config = match AppConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    let executor = match build_executor(&config) {
        Ok(executor) => executor,
        Err(e) => {
            error!(error = %e, "Failed to initialise the pipeline");
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    match executor.run().await {
        Ok(RunOutcome::QueueEmpty) => {
            println!("No topics left to process.");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Published(report)) => {
            info!(run_id = %report.run_id, path = %report.post.path, "Run complete");
            println!("Success: Post was published. URL: {}", report.post.html_url);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("Error: {}: {}", failure.stage, failure.error);
            ExitCode::from(EXIT_STAGE_FAILURE)
        }
    }
}

/// Builds every adapter around one shared HTTP client.
fn build_executor(config: &AppConfig) -> anyhow::Result<PipelineExecutor> {
    std::fs::create_dir_all(&config.image_dir).with_context(|| {
        format!(
            "failed to create image directory {}",
            config.image_dir.display()
        )
    })?;

    let http = reqwest::Client::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let openai = Arc::new(OpenAiProvider::with_client(
        http.clone(),
        config.openai.clone(),
    ));
    let downloader = Arc::new(HttpDownloader::new(http.clone()));

    let images: Option<Arc<dyn ImageProvider>> = match &config.images {
        ImageSettings::Search { api_key, endpoint } => Some(Arc::new(SearchImageProvider::new(
            Arc::new(PixabayClient::with_endpoint(
                http.clone(),
                api_key.clone(),
                endpoint.clone(),
            )),
            downloader,
            clock.clone(),
            config.image_dir.clone(),
        ))),
        ImageSettings::Generate => Some(Arc::new(GeneratedImageProvider::new(
            openai.clone(),
            openai.clone(),
            downloader,
            clock.clone(),
            config.image_dir.clone(),
        ))),
        ImageSettings::Disabled => None,
    };

    let repository = Arc::new(GitHubContents::with_client(http, config.github.clone()));

    Ok(PipelineExecutor::new(
        Arc::new(FileTopicQueue::new(config.topics_file.clone())),
        ArticleGenerator::new(openai.clone()),
        CategoryClassifier::new(openai),
        images,
        Publisher::new(repository, clock, config.layout),
    ))
}
