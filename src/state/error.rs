use thiserror::Error;

use crate::llm::ProviderError;
use crate::rag::IndexBuildError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to initialize model provider: {0}")]
    Provider(#[source] ProviderError),

    #[error("Failed to initialize corpus index: {0}")]
    Index(#[source] IndexBuildError),
}
