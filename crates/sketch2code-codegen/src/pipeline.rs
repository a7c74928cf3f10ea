//! Generation request pipeline: validate input, send once, bounded wait.
//!
//! There is no retry and no queue. A failed or timed-out attempt leaves nothing
//! behind; the caller resubmits from its current input.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use sketch2code_core::config::Config;
use sketch2code_core::types::{ComponentMode, DataUri, GenerationRequest, GenerationResult};

use crate::error::{GenerationError, ValidationError};
use crate::generator::CodeGenerator;

/// What the input side holds at submit time.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub canvas_image: Option<DataUri>,
    pub uploaded_image: Option<DataUri>,
    pub description: String,
    pub mode: ComponentMode,
}

impl SubmissionInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_canvas(mut self, image: DataUri) -> Self {
        self.canvas_image = Some(image);
        self
    }

    pub fn with_upload(mut self, image: DataUri) -> Self {
        self.uploaded_image = Some(image);
        self
    }

    pub fn with_mode(mut self, mode: ComponentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the request. An uploaded image wins over the canvas raster.
    pub fn validate(&self) -> Result<GenerationRequest, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let image = self
            .uploaded_image
            .as_ref()
            .or(self.canvas_image.as_ref())
            .ok_or(ValidationError::MissingImage)?;
        GenerationRequest::new(image.clone(), &self.description, self.mode)
            .ok_or(ValidationError::EmptyDescription)
    }
}

/// Carries one request to whatever produces the code.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError>;
}

/// POSTs to a remote `{endpoint}/api/generate`.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    details: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let url = self.url();
        debug!(url = %url, mode = %request.component_mode, "Posting generation request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
            warn!(
                status = status.as_u16(),
                details = parsed.as_ref().and_then(|b| b.details.as_deref()).unwrap_or(&body),
                "Generation endpoint returned an error"
            );
            return Err(match parsed {
                Some(ErrorBody { error, details }) => GenerationError::Rejected {
                    status: status.as_u16(),
                    message: error,
                    details,
                },
                None => GenerationError::Upstream {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let result: GenerationResult = serde_json::from_str(&body)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        if result.html.trim().is_empty() || result.css.trim().is_empty() {
            return Err(GenerationError::InvalidResponse(
                "response is missing html or css".into(),
            ));
        }
        Ok(result)
    }
}

/// Runs the in-process [`CodeGenerator`].
pub struct DirectTransport {
    generator: CodeGenerator,
}

impl DirectTransport {
    pub fn new(generator: CodeGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl GenerationTransport for DirectTransport {
    fn name(&self) -> &str {
        self.generator.provider_id()
    }

    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        self.generator.generate(request).await
    }
}

pub struct GenerationPipeline {
    transport: Arc<dyn GenerationTransport>,
    timeout: Duration,
}

impl GenerationPipeline {
    pub fn new(transport: Arc<dyn GenerationTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// HTTP transport when `generation.endpoint` is set, in-process otherwise.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let timeout = Duration::from_secs(config.timeout_secs());
        let transport: Arc<dyn GenerationTransport> = match config.endpoint() {
            Some(endpoint) => Arc::new(HttpTransport::new(&endpoint)),
            None => Arc::new(DirectTransport::new(CodeGenerator::from_config(config)?)),
        };
        Ok(Self::new(transport, timeout))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and wait at most the configured timeout.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.transport.send(request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    transport = %self.transport.name(),
                    mode = %request.component_mode,
                    elapsed_ms,
                    "Generation succeeded"
                );
                Ok(result)
            }
            Ok(Err(e)) => {
                warn!(transport = %self.transport.name(), error = %e, elapsed_ms, "Generation failed");
                Err(e)
            }
            Err(_) => {
                warn!(transport = %self.transport.name(), timeout_secs = self.timeout.as_secs(), "Generation timed out");
                Err(GenerationError::Timeout(self.timeout))
            }
        }
    }

    /// Validate `input` and generate. Invalid input never reaches the transport.
    pub async fn submit(
        &self,
        input: &SubmissionInput,
    ) -> Result<GenerationResult, GenerationError> {
        let request = input.validate()?;
        self.generate(&request).await
    }
}
