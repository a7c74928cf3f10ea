//! Vision model provider abstraction.
//!
//! Each provider implements [`VisionProvider`]: one non-streaming completion
//! for a prompt plus a single image. The reply content is handed back untouched
//! so response extraction sees exactly what the model produced.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sketch2code_core::config::ProviderConfig;
use sketch2code_core::types::DataUri;

pub mod google;
pub mod openai;

pub use google::GeminiProvider;
pub use openai::{ApiStyle, OpenAiProvider};

/// Supported model API protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelApi {
    OpenAiCompletions,
    GoogleGenerativeAi,
}

/// Credentials for authenticating with a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Credentials {
    #[serde(rename = "api_key")]
    ApiKey { api_key: String },
    #[serde(rename = "none")]
    None,
}

impl Credentials {
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Credentials::ApiKey { api_key } => Some(api_key),
            Credentials::None => None,
        }
    }
}

/// One prompt plus one image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub model: String,
    pub prompt: String,
    pub image: DataUri,
    pub temperature: Option<f64>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// The model's message content: a string or an array of content parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub content: serde_json::Value,
    pub model: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured (set {0})")]
    MissingCredentials(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Network(e) if e.is_timeout())
    }
}

impl From<ProviderError> for sketch2code_core::error::Sketch2CodeError {
    fn from(err: ProviderError) -> Self {
        sketch2code_core::error::Sketch2CodeError::Provider(err.to_string())
    }
}

/// The core provider trait.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider identifier (e.g., "openrouter", "google").
    fn id(&self) -> &str;

    /// API protocol used by this provider.
    fn api(&self) -> ModelApi;

    /// Run one completion and return the raw message content.
    async fn complete(
        &self,
        request: &VisionRequest,
        credentials: &Credentials,
    ) -> Result<ModelReply, ProviderError>;
}

/// Build the provider named by `config.id`.
pub fn build_provider(config: &ProviderConfig) -> Result<Box<dyn VisionProvider>, ProviderError> {
    let base_url = config.base_url.as_deref();
    let provider: Box<dyn VisionProvider> = match config.id.as_str() {
        "openrouter" => Box::new(
            OpenAiProvider::openrouter(base_url)
                .with_attribution(config.site_url.clone(), Some(config.app_name())),
        ),
        "openai" => Box::new(OpenAiProvider::openai(base_url)),
        "ollama" => Box::new(OpenAiProvider::ollama(base_url)),
        "google" => Box::new(GeminiProvider::new(base_url)),
        other => return Err(ProviderError::UnknownProvider(other.to_string())),
    };
    Ok(provider)
}

/// Resolve credentials for `config`, failing when a required key is missing.
pub fn resolve_credentials(config: &ProviderConfig) -> Result<Credentials, ProviderError> {
    match config.resolve_api_key() {
        Some(api_key) => Ok(Credentials::ApiKey { api_key }),
        None if !config.requires_api_key() => Ok(Credentials::None),
        None => Err(ProviderError::MissingCredentials(
            config
                .api_key_env
                .clone()
                .or_else(|| config.default_api_key_env().map(String::from))
                .unwrap_or_else(|| "provider.api_key".to_string()),
        )),
    }
}

/// Build a [`VisionRequest`] with the model settings from `config`.
pub fn vision_request(config: &ProviderConfig, prompt: String, image: DataUri) -> VisionRequest {
    VisionRequest {
        model: config.model(),
        prompt,
        image,
        temperature: Some(config.temperature()),
        max_tokens: config.max_tokens(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str) -> ProviderConfig {
        ProviderConfig {
            id: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_provider_by_id() {
        assert_eq!(build_provider(&config("openrouter")).unwrap().id(), "openrouter");
        assert_eq!(build_provider(&config("openai")).unwrap().id(), "openai");
        assert_eq!(build_provider(&config("ollama")).unwrap().id(), "ollama");
        let google = build_provider(&config("google")).unwrap();
        assert_eq!(google.id(), "google");
        assert_eq!(google.api(), ModelApi::GoogleGenerativeAi);
        assert!(matches!(
            build_provider(&config("anthropic")),
            Err(ProviderError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_resolve_credentials() {
        let mut cfg = config("openai");
        cfg.api_key = Some("sk-direct".into());
        assert_eq!(resolve_credentials(&cfg).unwrap().api_key(), Some("sk-direct"));

        let ollama = config("ollama");
        assert!(matches!(resolve_credentials(&ollama).unwrap(), Credentials::None));

        let mut missing = config("openai");
        missing.api_key_env = Some("SKETCH2CODE_TEST_NEVER_SET_KEY".into());
        let err = resolve_credentials(&missing).unwrap_err();
        assert!(err.to_string().contains("SKETCH2CODE_TEST_NEVER_SET_KEY"));
    }

    #[test]
    fn test_vision_request_uses_config_defaults() {
        let image = DataUri::from_bytes("image/png", b"png");
        let request = vision_request(&config("openrouter"), "Build it".into(), image);
        assert_eq!(request.model, "openai/gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, 4096);
    }

    #[test]
    fn test_credentials_serde_tag() {
        let creds = Credentials::ApiKey {
            api_key: "k".into(),
        };
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["type"], "api_key");
    }
}
