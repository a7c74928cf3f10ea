use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("raster encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("font could not be loaded: {0}")]
    Font(String),

    #[error("canvas dimensions must be non-zero")]
    EmptyCanvas,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CanvasError> for sketch2code_core::error::Sketch2CodeError {
    fn from(err: CanvasError) -> Self {
        sketch2code_core::error::Sketch2CodeError::Canvas(err.to_string())
    }
}
