//! Article Generator stage.

use std::sync::Arc;

use pipeline::{Article, CompletionRequest, ParsedTopic, PipelineError, TextGenerator};
use tracing::{info, instrument};

use crate::prompts;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2500;

/// Drafts a titled Markdown article for a topic with one completion call.
#[derive(Clone)]
pub struct ArticleGenerator {
    text: Arc<dyn TextGenerator>,
}

impl ArticleGenerator {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text }
    }

    pub(crate) fn request(topic: &ParsedTopic) -> CompletionRequest {
        CompletionRequest {
            system_prompt: prompts::ARTICLE_SYSTEM_PROMPT.to_string(),
            user_prompt: prompts::article_user_prompt(topic.primary(), topic.secondary()),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }

    /// # Errors
    ///
    /// Upstream failures are passed through; a completion without a title line
    /// is a [`PipelineError::Parse`].
    #[instrument(skip_all, fields(primary = topic.primary()))]
    pub async fn generate(&self, topic: &ParsedTopic) -> Result<Article, PipelineError> {
        let text = self.text.complete(&Self::request(topic)).await?;
        let article = Article::parse(&text)?;
        info!(
            title = article.title(),
            tagged = article.tags().is_some(),
            "Article generated"
        );
        Ok(article)
    }
}
