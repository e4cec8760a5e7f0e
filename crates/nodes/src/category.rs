//! Category Classifier stage.

use std::sync::Arc;

use pipeline::{Category, CompletionRequest, PipelineError, TextGenerator};
use tracing::{info, instrument, warn};

use crate::prompts;

const MAX_TOKENS: u32 = 50;

/// Assigns exactly one [`Category`] to a topic.
#[derive(Clone)]
pub struct CategoryClassifier {
    text: Arc<dyn TextGenerator>,
}

impl CategoryClassifier {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text }
    }

    /// Unrecognised model output falls back to [`Category::Uncategorized`];
    /// only upstream failures are errors.
    #[instrument(skip(self))]
    pub async fn classify(&self, primary: &str) -> Result<Category, PipelineError> {
        let request = CompletionRequest {
            system_prompt: prompts::category_system_prompt(),
            user_prompt: prompts::category_user_prompt(primary),
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
        };
        let output = self.text.complete(&request).await?;
        let category = Category::from_model_output(&output);
        if category == Category::Uncategorized {
            warn!(output = %output, "Classifier output matched no category");
        }
        info!(category = %category, "Category assigned");
        Ok(category)
    }
}
