//! Survey generation: prompt assembly, model call and output parsing.

pub mod extract;
pub mod model;
pub mod prompt;
pub mod service;

pub use extract::{extract_json, ExtractError};
pub use model::{Survey, SurveyQuestion};
pub use prompt::{build_system_prompt, PromptOptions};
pub use service::{GenerationError, GenerationOptions, SurveyService};
