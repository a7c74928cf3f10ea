//! OpenAI Chat Completions API provider.
//!
//! Sends one multimodal user message to `/v1/chat/completions`. Also serves
//! OpenRouter, Ollama, and other OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::{Credentials, ModelApi, ModelReply, ProviderError, Usage, VisionProvider, VisionRequest};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Which OpenAI-compatible dialect to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStyle {
    OpenAi,
    OpenRouter,
    Ollama,
}

pub struct OpenAiProvider {
    pub base_url: String,
    pub api_style: ApiStyle,
    provider_id: String,
    site_url: Option<String>,
    app_name: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    fn with_style(base_url: &str, api_style: ApiStyle, provider_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_style,
            provider_id: provider_id.into(),
            site_url: None,
            app_name: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn openai(base_url: Option<&str>) -> Self {
        Self::with_style(base_url.unwrap_or(OPENAI_BASE_URL), ApiStyle::OpenAi, "openai")
    }

    pub fn openrouter(base_url: Option<&str>) -> Self {
        Self::with_style(
            base_url.unwrap_or(OPENROUTER_BASE_URL),
            ApiStyle::OpenRouter,
            "openrouter",
        )
    }

    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::with_style(base_url.unwrap_or(OLLAMA_BASE_URL), ApiStyle::Ollama, "ollama")
    }

    /// OpenRouter attribution headers (`HTTP-Referer`, `X-Title`).
    pub fn with_attribution(mut self, site_url: Option<String>, app_name: Option<String>) -> Self {
        self.site_url = site_url;
        self.app_name = app_name;
        self
    }

    fn build_body(&self, request: &VisionRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model.clone(),
            messages: vec![json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": request.prompt },
                    { "type": "image_url", "image_url": { "url": request.image.as_str() } },
                ],
            })],
            max_tokens: request.max_tokens,
            stream: false,
            temperature: request.temperature,
        }
    }
}

// --- OpenAI request/response types ---

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn id(&self) -> &str {
        &self.provider_id
    }

    fn api(&self) -> ModelApi {
        ModelApi::OpenAiCompletions
    }

    async fn complete(
        &self,
        request: &VisionRequest,
        credentials: &Credentials,
    ) -> Result<ModelReply, ProviderError> {
        let api_key = match (credentials.api_key(), self.api_style) {
            (Some(key), _) => Some(key),
            (None, ApiStyle::Ollama) => None,
            (None, _) => return Err(ProviderError::MissingCredentials(self.provider_id.clone())),
        };

        let body = self.build_body(request);
        debug!(
            model = %body.model,
            base_url = %self.base_url,
            image_bytes = request.image.payload().len(),
            "Calling OpenAI-compatible API"
        );

        let mut req_builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("content-type", "application/json");

        // Auth differs by style
        if let Some(key) = api_key.filter(|_| self.api_style != ApiStyle::Ollama) {
            req_builder = req_builder.header("authorization", format!("Bearer {key}"));
        }
        if self.api_style == ApiStyle::OpenRouter {
            if let Some(site_url) = &self.site_url {
                req_builder = req_builder.header("HTTP-Referer", site_url);
            }
            if let Some(app_name) = &self.app_name {
                req_builder = req_builder.header("X-Title", app_name);
            }
        }

        let response = req_builder.json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        trace!(choices = completion.choices.len(), "Completion received");

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))?;

        Ok(ModelReply {
            content,
            model: completion.model,
            usage: completion.usage.map(|u| Usage {
                input_tokens: Some(u.prompt_tokens),
                output_tokens: Some(u.completion_tokens),
            }),
        })
    }
}
