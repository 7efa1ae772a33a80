use async_trait::async_trait;
use thiserror::Error;

use super::types::ChatRequest;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode provider response: {0}")]
    Decode(String),
    #[error("provider returned an empty completion")]
    EmptyResponse,
    #[error("provider returned {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

/// Chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// the model used for completions
    fn model(&self) -> &str;

    /// chat completion (non-streaming), returns the assistant text
    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError>;
}

/// Text embedding backend.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// identifier persisted alongside the index; a change forces a rebuild
    fn model(&self) -> &str;

    /// embed a batch, one vector per input in input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}
