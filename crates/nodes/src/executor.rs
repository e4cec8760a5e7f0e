//! The `PipelineExecutor`: one topic in, one published post out.
//!
//! ```text
//! Idle → TopicFetched → ArticleGenerated → CategoryAssigned → ImageReady → Published → Done
//!   ╲          ╲                ╲                  ╲               ╲
//!    └──────────┴────────────────┴──────────────────┴───────────────┴──→ Failed
//! ```
//!
//! Each stage is awaited before the next starts. The first failing stage moves
//! the run to `Failed` and its error is returned unchanged inside a
//! [`StageFailure`]. There are no retries and no rollback.

use std::sync::Arc;

use pipeline::keywords::parse_topic;
use pipeline::{Category, ParsedTopic, PipelineError, PipelineRunId, PublishedPost, TopicSource};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};

use crate::article::ArticleGenerator;
use crate::category::CategoryClassifier;
use crate::image::ImageProvider;
use crate::publish::Publisher;

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    TopicFetched,
    ArticleGenerated,
    CategoryAssigned,
    ImageReady,
    Published,
    Done,
    Failed,
}

/// The stage that produced a [`StageFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FetchTopic,
    ParseTopic,
    GenerateArticle,
    AssignCategory,
    ProvideImage,
    Publish,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FetchTopic => "topic fetch",
            Self::ParseTopic => "topic parsing",
            Self::GenerateArticle => "article generation",
            Self::AssignCategory => "category assignment",
            Self::ProvideImage => "image creation",
            Self::Publish => "publishing",
        })
    }
}

/// A run that ended in [`RunState::Failed`].
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub run_id: PipelineRunId,
    pub stage: Stage,
    /// The stage's error, unmodified.
    pub error: PipelineError,
    /// States visited, ending in [`RunState::Failed`].
    pub states: Vec<RunState>,
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: PipelineRunId,
    pub topic: ParsedTopic,
    pub category: Category,
    pub post: PublishedPost,
    /// States visited, ending in [`RunState::Done`].
    pub states: Vec<RunState>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing to do; no service was called.
    QueueEmpty,
    Published(RunReport),
}

/// Records state transitions for one run.
struct RunTracker {
    run_id: PipelineRunId,
    states: Vec<RunState>,
}

impl RunTracker {
    fn new(run_id: PipelineRunId) -> Self {
        Self {
            run_id,
            states: vec![RunState::Idle],
        }
    }

    fn current(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Idle)
    }

    fn advance(&mut self, next: RunState) {
        info!(from = ?self.current(), to = ?next, "Pipeline state transition");
        self.states.push(next);
    }

    /// Passes `Ok` through; on `Err` moves to `Failed` and wraps the error.
    fn check<T>(&mut self, stage: Stage, result: Result<T, PipelineError>) -> Result<T, StageFailure> {
        result.map_err(|error| {
            error!(from = ?self.current(), %stage, kind = ?error.kind(), error = %error, "Pipeline stage failed");
            self.states.push(RunState::Failed);
            StageFailure {
                run_id: self.run_id,
                stage,
                error,
                states: std::mem::take(&mut self.states),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Sequences queue → parser → generator → classifier → image → publisher.
pub struct PipelineExecutor {
    queue: Arc<dyn TopicSource>,
    generator: ArticleGenerator,
    classifier: CategoryClassifier,
    images: Option<Arc<dyn ImageProvider>>,
    publisher: Publisher,
}

impl PipelineExecutor {
    /// `images = None` publishes posts without a cover image.
    pub fn new(
        queue: Arc<dyn TopicSource>,
        generator: ArticleGenerator,
        classifier: CategoryClassifier,
        images: Option<Arc<dyn ImageProvider>>,
        publisher: Publisher,
    ) -> Self {
        Self {
            queue,
            generator,
            classifier,
            images,
            publisher,
        }
    }

    /// Processes at most one topic.
    pub async fn run(&self) -> Result<RunOutcome, StageFailure> {
        let run_id = PipelineRunId::new_random();
        let span = info_span!("pipeline_run", run_id = %run_id);
        self.run_inner(RunTracker::new(run_id)).instrument(span).await
    }

    async fn run_inner(&self, mut run: RunTracker) -> Result<RunOutcome, StageFailure> {
        let Some(line) = run.check(Stage::FetchTopic, self.queue.next_topic())? else {
            info!("No topics left to process");
            run.advance(RunState::Done);
            return Ok(RunOutcome::QueueEmpty);
        };
        run.advance(RunState::TopicFetched);
        let topic = run.check(Stage::ParseTopic, parse_topic(&line))?;

        let article = run.check(Stage::GenerateArticle, self.generator.generate(&topic).await)?;
        run.advance(RunState::ArticleGenerated);

        let category = run.check(
            Stage::AssignCategory,
            self.classifier.classify(topic.primary()).await,
        )?;
        run.advance(RunState::CategoryAssigned);

        let image = match &self.images {
            Some(provider) => {
                info!(strategy = provider.name(), "Providing cover image");
                Some(run.check(Stage::ProvideImage, provider.provide(&topic, &article).await)?)
            }
            None => None,
        };
        run.advance(RunState::ImageReady);

        let post = run.check(
            Stage::Publish,
            self.publisher.publish(&article, category, image).await,
        )?;
        run.advance(RunState::Published);
        run.advance(RunState::Done);

        Ok(RunOutcome::Published(RunReport {
            run_id: run.run_id,
            topic,
            category,
            post,
            states: run.states,
        }))
    }
}
