//! Google Generative AI (Gemini) provider.
//!
//! Calls `generateContent` with the image sent as `inlineData`. Auth is via
//! API key in query parameter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::{Credentials, ModelApi, ModelReply, ProviderError, Usage, VisionProvider, VisionRequest};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    pub base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(base_url: Option<&str>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_body(&self, request: &VisionRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![json!({
                "role": "user",
                "parts": [
                    { "text": request.prompt },
                    {
                        "inlineData": {
                            "mimeType": request.image.mime_type(),
                            "data": request.image.payload(),
                        }
                    },
                ],
            })],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(request.max_tokens),
                temperature: request.temperature,
            }),
        }
    }
}

// --- Gemini request/response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Text parts of the first candidate, as OpenAI-style content parts.
fn candidate_parts(response: &GeminiResponse) -> Option<serde_json::Value> {
    let content = response.candidates.first()?.content.as_ref()?;
    let parts: Vec<serde_json::Value> = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_ref())
        .map(|text| json!({ "type": "text", "text": text }))
        .collect();
    Some(serde_json::Value::Array(parts))
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn id(&self) -> &str {
        "google"
    }

    fn api(&self) -> ModelApi {
        ModelApi::GoogleGenerativeAi
    }

    async fn complete(
        &self,
        request: &VisionRequest,
        credentials: &Credentials,
    ) -> Result<ModelReply, ProviderError> {
        let api_key = credentials
            .api_key()
            .ok_or_else(|| ProviderError::MissingCredentials("GEMINI_API_KEY".into()))?;

        let body = self.build_body(request);
        debug!(model = %request.model, base_url = %self.base_url, "Calling Gemini API");

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, request.model, api_key
        );
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        trace!(candidates = parsed.candidates.len(), "Gemini response received");

        let content = candidate_parts(&parsed)
            .ok_or_else(|| ProviderError::MalformedResponse("no candidates in response".into()))?;

        Ok(ModelReply {
            content,
            model: parsed.model_version,
            usage: parsed.usage_metadata.map(|u| Usage {
                input_tokens: Some(u.prompt_token_count),
                output_tokens: Some(u.candidates_token_count),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch2code_core::types::DataUri;

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new(None);
        assert_eq!(provider.id(), "google");
        assert_eq!(provider.api(), ModelApi::GoogleGenerativeAi);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_body_splits_data_uri_into_inline_data() {
        let provider = GeminiProvider::new(None);
        let request = VisionRequest {
            model: "gemini-1.5-flash".into(),
            prompt: "Card with avatar".into(),
            image: DataUri::parse("data:image/jpeg;base64,/9j/4AAQ").unwrap(),
            temperature: None,
            max_tokens: 1024,
        };
        let body = serde_json::to_value(provider.build_body(&request)).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["text"], "Card with avatar");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/4AAQ");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_candidate_text_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"```json\n"},{"text":"{}\n```"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":5}}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let content = candidate_parts(&response).unwrap();
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "```json\n");
        assert_eq!(content[1]["text"], "{}\n```");
        assert_eq!(response.usage_metadata.unwrap().candidates_token_count, 5);
    }

    #[test]
    fn test_no_candidates() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(candidate_parts(&response).is_none());
    }
}
