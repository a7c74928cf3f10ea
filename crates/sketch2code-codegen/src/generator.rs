//! In-process backend: prompt, model call, extraction.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use sketch2code_core::config::{Config, ProviderConfig};
use sketch2code_core::types::{GenerationRequest, GenerationResult};
use sketch2code_providers::{
    Credentials, ProviderError, VisionProvider, build_provider, resolve_credentials,
    vision_request,
};

use crate::error::GenerationError;
use crate::extract::extract_from_content;
use crate::prompt::{PromptContract, build_prompt_with};

pub struct CodeGenerator {
    provider: Arc<dyn VisionProvider>,
    credentials: Credentials,
    settings: ProviderConfig,
    contract: PromptContract,
}

impl CodeGenerator {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        credentials: Credentials,
        settings: ProviderConfig,
    ) -> Self {
        Self {
            provider,
            credentials,
            settings,
            contract: PromptContract::default(),
        }
    }

    /// Build the provider and credentials named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let settings = config.provider();
        let provider: Arc<dyn VisionProvider> = Arc::from(build_provider(&settings)?);
        let credentials = resolve_credentials(&settings)?;
        let contract = if config.react_output() {
            PromptContract::WithReact
        } else {
            PromptContract::HtmlCss
        };
        Ok(Self::new(provider, credentials, settings).with_contract(contract))
    }

    pub fn with_contract(mut self, contract: PromptContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = build_prompt_with(&request.description, request.component_mode, self.contract);
        let vision = vision_request(&self.settings, prompt, request.image.clone());
        let started = Instant::now();

        let reply = self
            .provider
            .complete(&vision, &self.credentials)
            .await
            .map_err(|e| {
                warn!(provider = %self.provider.id(), error = %e, "Model call failed");
                GenerationError::from(e)
            })?;

        let mut result = extract_from_content(&reply.content).map_err(|e| {
            warn!(
                provider = %self.provider.id(),
                error = %e,
                content = %truncate(&reply.content.to_string(), 500),
                "Could not extract code from model reply"
            );
            GenerationError::Extraction(e)
        })?;

        if self.contract == PromptContract::HtmlCss {
            result.react_component.clear();
            result.react_css.clear();
        }

        info!(
            provider = %self.provider.id(),
            model = %vision.model,
            mode = %request.component_mode,
            html_len = result.html.len(),
            css_len = result.css.len(),
            react = result.has_react(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generated code"
        );
        Ok(result)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
