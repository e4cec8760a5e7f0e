use async_trait::async_trait;
use pipeline::{
    CompletionRequest, ImageSynthesizer, PipelineError, SynthesisRequest, TextGenerator,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{error_message, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

const CHAT_SERVICE: &str = "OpenAI chat";
const IMAGE_SERVICE: &str = "OpenAI images";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
}

impl OpenAiConfig {
    /// Settings for the public OpenAI API with default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

/// OpenAI-compatible provider for chat completions and image synthesis.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response.json::<R>().await?)
    }

    async fn chat(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatRequest::new(&self.config.chat_model, request);
        let response: ChatResponse = self.post("chat/completions", &body).await?;
        response.into_text()
    }

    async fn images(&self, request: &SynthesisRequest) -> Result<Vec<String>, ProviderError> {
        let body = ImageRequest {
            model: &self.config.image_model,
            prompt: &request.prompt,
            n: request.count,
            size: &request.size,
            quality: &request.quality,
        };
        let response: ImageResponse = self.post("images/generations", &body).await?;
        response.into_urls()
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    #[instrument(
        skip_all,
        fields(model = %self.config.chat_model, temperature = request.temperature, max_tokens = request.max_tokens)
    )]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError> {
        let text = self
            .chat(request)
            .await
            .map_err(|e| e.into_pipeline(CHAT_SERVICE))?;
        debug!(chars = text.len(), "Chat completion received");
        Ok(text)
    }
}

#[async_trait]
impl ImageSynthesizer for OpenAiProvider {
    #[instrument(skip_all, fields(model = %self.config.image_model, size = %request.size))]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<String>, PipelineError> {
        let urls = self
            .images(request)
            .await
            .map_err(|e| e.into_pipeline(IMAGE_SERVICE))?;
        debug!(count = urls.len(), "Image synthesis completed");
        Ok(urls)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::Empty("completion text"))
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
}

impl ImageResponse {
    fn into_urls(self) -> Result<Vec<String>, ProviderError> {
        let urls: Vec<String> = self.data.into_iter().filter_map(|d| d.url).collect();
        if urls.is_empty() {
            Err(ProviderError::Empty("image url"))
        } else {
            Ok(urls)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::ErrorKind;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "persona".to_string(),
            user_prompt: "Primary Keyword: Pho".to_string(),
            temperature: 0.0,
            max_tokens: 50,
        }
    }

    #[test]
    fn chat_request_wire_format() {
        let req = request();
        let body = serde_json::to_value(ChatRequest::new("gpt-4-turbo", &req)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4-turbo",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "Primary Keyword: Pho"}
                ],
                "temperature": 0.0,
                "max_tokens": 50
            })
        );
    }

    #[test]
    fn chat_response_text_is_trimmed() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "\n Street Food & Night Markets \n"}}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Street Food & Night Markets");
    }

    #[test]
    fn empty_chat_response_is_an_error() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(response.into_text(), Err(ProviderError::Empty(_))));

        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(response.into_text().is_err());
    }

    #[test]
    fn image_response_urls() {
        let response: ImageResponse = serde_json::from_value(json!({
            "created": 1,
            "data": [{"url": "https://img.example/a.png", "revised_prompt": "x"}]
        }))
        .unwrap();
        assert_eq!(response.into_urls().unwrap(), vec!["https://img.example/a.png"]);

        let response: ImageResponse = serde_json::from_value(json!({"data": [{}]})).unwrap();
        assert!(response.into_urls().is_err());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let mut config = OpenAiConfig::new("key");
        config.base_url = "http://localhost:8080/v1/".to_string();
        let provider = OpenAiProvider::new(config);
        assert_eq!(
            provider.endpoint("chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_upstream_error() {
        let mut config = OpenAiConfig::new("key");
        config.base_url = "http://127.0.0.1:9/v1".to_string();
        let provider = OpenAiProvider::new(config);

        let err = provider.complete(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().starts_with("OpenAI chat error - transport error"));
    }
}
