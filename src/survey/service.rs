use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::extract::{extract_json, ExtractError};
use super::model::Survey;
use super::prompt::{build_system_prompt, PromptOptions};
use crate::core::config::Settings;
use crate::llm::{ChatMessage, ChatProvider, ChatRequest, EmbeddingProvider, ProviderError};
use crate::rag::{format_reference_block, CorpusIndex};

const INTRO_MAX_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] ProviderError),
    #[error("survey generation failed: {0}")]
    Provider(#[source] ProviderError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("survey does not match the expected schema: {0}")]
    Schema(String),
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Retrieval(_) => "retrieval_failed",
            GenerationError::Provider(_) => "provider_failed",
            GenerationError::Extract(ExtractError::NoJson) => "no_json",
            GenerationError::Extract(ExtractError::Malformed(_)) => "malformed_json",
            GenerationError::Schema(_) => "schema_mismatch",
        }
    }
}

/// Tunables applied to every generation request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub top_k: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    pub max_questions: usize,
    pub strict_schema: bool,
}

impl GenerationOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            top_k: settings.retrieval.top_k,
            temperature: settings.llm.temperature,
            max_tokens: settings.llm.max_tokens,
            max_questions: settings.generation.max_questions,
            strict_schema: settings.generation.strict_schema,
        }
    }
}

/// Retrieval, prompt assembly, completion and JSON extraction for one requirement.
pub struct SurveyService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<CorpusIndex>,
    chat: Arc<dyn ChatProvider>,
    options: GenerationOptions,
}

impl SurveyService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<CorpusIndex>,
        chat: Arc<dyn ChatProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
            options,
        }
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// `requirement` must already be trimmed and non-empty.
    pub async fn generate(&self, requirement: &str) -> Result<Value, GenerationError> {
        tracing::info!(
            "Generating survey with {} ({} chars of requirement)",
            self.chat.model(),
            requirement.chars().count()
        );

        let reference = self.retrieve(requirement).await?;
        let system_prompt = build_system_prompt(
            &reference,
            &PromptOptions {
                max_questions: self.options.max_questions,
                intro_max_chars: INTRO_MAX_CHARS,
            },
        );
        tracing::debug!("System prompt is {} chars", system_prompt.chars().count());

        let request = ChatRequest::new(vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(requirement),
        ])
        .with_sampling(self.options.temperature, self.options.max_tokens);

        let raw = self.chat.chat(request).await.map_err(|err| {
            tracing::error!("{} chat call failed: {}", self.chat.name(), err);
            GenerationError::Provider(err)
        })?;

        let parsed = extract_json(&raw).map_err(|err| {
            tracing::warn!("Could not extract JSON from model output: {}", err);
            tracing::debug!("Raw model output: {}", raw);
            GenerationError::from(err)
        })?;

        let data = if self.options.strict_schema {
            let survey = Survey::from_value(parsed, self.options.max_questions)
                .map_err(GenerationError::Schema)?;
            serde_json::to_value(survey).map_err(|e| GenerationError::Schema(e.to_string()))?
        } else {
            tracing::debug!("Survey schema match: {}", Survey::matches_shape(&parsed));
            parsed
        };

        tracing::info!("Survey generated");
        Ok(data)
    }

    async fn retrieve(&self, requirement: &str) -> Result<String, GenerationError> {
        let mut vectors = self
            .embedder
            .embed(&[requirement.to_string()])
            .await
            .map_err(GenerationError::Retrieval)?;
        let query = vectors.pop().ok_or_else(|| {
            GenerationError::Retrieval(ProviderError::CountMismatch {
                expected: 1,
                got: 0,
            })
        })?;

        let expected = self.index.meta().dims;
        if query.len() != expected {
            tracing::warn!(
                "Query embedding from {} has {} dimensions but the index has {}",
                self.embedder.model(),
                query.len(),
                expected
            );
            return Err(GenerationError::Retrieval(ProviderError::Decode(format!(
                "query embedding has {} dimensions, index expects {}",
                query.len(),
                expected
            ))));
        }

        let hits = self.index.similarity_search(&query, self.options.top_k);
        for hit in &hits {
            tracing::debug!("Retrieved {} (score {:.4})", hit.chunk.chunk_id, hit.score);
        }
        Ok(format_reference_block(&hits))
    }
}
