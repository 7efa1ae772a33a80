pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAiProvider;
pub use provider::{ChatProvider, EmbeddingProvider, ProviderError};
pub use types::{ChatMessage, ChatRequest};
