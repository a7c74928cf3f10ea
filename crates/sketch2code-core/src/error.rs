use thiserror::Error;

#[derive(Debug, Error)]
pub enum Sketch2CodeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Canvas error: {0}")]
    Canvas(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Sketch2CodeError>;
