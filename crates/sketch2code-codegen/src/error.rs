use std::time::Duration;

use thiserror::Error;

use sketch2code_providers::ProviderError;

use crate::extract::ExtractionError;

const GENERIC_FAILURE: &str = "Failed to generate code. Please try again.";

/// Input problems caught before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please add a description of your design")]
    EmptyDescription,

    #[error("Please draw on the canvas or upload an image")]
    MissingImage,
}

/// Terminal failure of one generation attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    /// The model API answered with a non-success status.
    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The generation endpoint refused the request; `message` is its `error` field.
    #[error("generation endpoint returned {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Text safe to show the person who submitted the sketch.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(e) => e.to_string(),
            GenerationError::Timeout(_) => {
                "The request took too long. Please try again.".to_string()
            }
            GenerationError::Network(_) => {
                "Could not reach the code generation service. Please try again.".to_string()
            }
            GenerationError::Rejected { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GenerationError::Validation(_))
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Network(e) => GenerationError::Network(e.to_string()),
            ProviderError::Upstream { status, body } => GenerationError::Upstream { status, body },
            other => GenerationError::Provider(other.to_string()),
        }
    }
}

impl From<GenerationError> for sketch2code_core::error::Sketch2CodeError {
    fn from(err: GenerationError) -> Self {
        sketch2code_core::error::Sketch2CodeError::Generation(err.to_string())
    }
}
