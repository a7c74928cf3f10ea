//! Sketch-to-code generation.
//!
//! [`prompt`] builds the instruction text, a provider answers, [`extract`]
//! recovers the JSON payload, and [`pipeline`] wraps it all behind validation
//! and a bounded wait.

pub mod document;
pub mod error;
pub mod extract;
pub mod generator;
pub mod pipeline;
pub mod prompt;

pub use error::{GenerationError, ValidationError};
pub use extract::{ExtractionError, extract_from_content, extract_result};
pub use generator::CodeGenerator;
pub use pipeline::{
    DirectTransport, GenerationPipeline, GenerationTransport, HttpTransport, SubmissionInput,
};
pub use prompt::{PromptContract, build_prompt, build_prompt_with};
